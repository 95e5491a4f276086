//! RPC client for the remote search service.
//!
//! `SearchService` is the seam the session dispatches through; the real
//! transport is `HttpSearchService`, which posts the request as JSON and
//! sorts every failure into a [`TransportFault`] tier.

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::config::CONFIG;
use crate::error::TransportFault;
use crate::models::{SearchRequest, SearchResponse};

/// An async search backend. Object-safe so sessions can hold test doubles
/// behind `Arc<dyn SearchService>`.
pub trait SearchService: Send + Sync {
    fn search(
        &self,
        request: SearchRequest,
    ) -> BoxFuture<'static, Result<SearchResponse, TransportFault>>;
}

/// HTTP transport: one POST per search, JSON both ways.
pub struct HttpSearchService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSearchService {
    pub fn new(endpoint: impl Into<String>) -> HttpSearchService {
        HttpSearchService {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config() -> HttpSearchService {
        HttpSearchService::new(CONFIG.search_url.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SearchService for HttpSearchService {
    fn search(
        &self,
        request: SearchRequest,
    ) -> BoxFuture<'static, Result<SearchResponse, TransportFault>> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        async move {
            let response = client.post(&endpoint).json(&request).send().await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(TransportFault::Service {
                    status: status.as_u16(),
                    message: body,
                });
            }
            serde_json::from_str(&body).map_err(TransportFault::Malformed)
        }
        .boxed()
    }
}
