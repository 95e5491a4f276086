use thiserror::Error;

/// Failure detected by the remote-call machinery itself, as opposed to an
/// anomaly in otherwise well-formed response data. These are the errors the
/// process-wide fault handler receives.
#[derive(Debug, Error)]
pub enum TransportFault {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("malformed search response: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Anomaly in response data discovered while building the results view.
/// Not routed to the fault handler; the render pass aborts instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("hit has no highlight fragment")]
    MissingFragment,
}
