use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        search_url: get_env_or_default("SEARCH_URL", "http://127.0.0.1:8080/api/search"),
        bind_addr: get_env_or_default("BIND_ADDR", "127.0.0.1:8080"),
        tweets_file: env::var("TWEETS_FILE").ok(),
    }
});

pub struct Config {
    /// Endpoint the search client posts to.
    pub search_url: String,
    /// Address the demo service listens on.
    pub bind_addr: String,
    /// Optional tab-separated corpus; the built-in sample is used without it.
    pub tweets_file: Option<String>,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
