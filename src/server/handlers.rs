use axum::{Json, extract::State};
use std::sync::Arc;

use crate::engine::TweetIndex;
use crate::models::{SearchRequest, SearchResponse};

pub async fn search_handler(
    State(index): State<Arc<TweetIndex>>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let response = index.search(&request);
    log::info!(
        "query {:?}: {} of {} docs in {}ms",
        request.query,
        response.total_hits,
        response.total_docs,
        response.time
    );
    Json(response)
}
