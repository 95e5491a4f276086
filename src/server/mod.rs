//! Demo HTTP surface for the search service.

use axum::{Router, routing::post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::engine::TweetIndex;

pub mod handlers;

pub fn create_router(index: Arc<TweetIndex>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", post(handlers::search_handler))
        .with_state(index)
        .layer(cors)
}
