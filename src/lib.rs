pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod fault;
pub mod form;
pub mod models;
pub mod server;
pub mod session;
pub mod view;
