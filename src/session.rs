//! Search dispatch and the single writer of the results page.
//!
//! Every call to [`SearchSession::search`] gets a sequence number. The
//! service call runs on its own task; its completion is queued to one render
//! task that owns the [`ResultsPage`] outright, so concurrent searches can
//! never interleave partial writes. A completion whose number is no longer
//! the latest is discarded, and the dispatch it came from is cancelled as
//! soon as a newer search is issued: the page always shows the most recently
//! issued search that completed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::client::SearchService;
use crate::fault;
use crate::form::QueryForm;
use crate::models::SearchResponse;
use crate::view::ResultsPage;

struct Completion {
    id: u64,
    response: SearchResponse,
}

/// One user's search page. Must live inside a tokio runtime; `new` spawns
/// the render task.
pub struct SearchSession {
    service: Arc<dyn SearchService>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    latest: Arc<AtomicU64>,
    in_flight: Mutex<CancellationToken>,
    page_rx: watch::Receiver<ResultsPage>,
}

impl SearchSession {
    pub fn new(service: Arc<dyn SearchService>) -> SearchSession {
        let (completion_tx, mut completion_rx) = mpsc::unbounded_channel::<Completion>();
        let (page_tx, page_rx) = watch::channel(ResultsPage::new());
        let latest = Arc::new(AtomicU64::new(0));

        let latest_seen = Arc::clone(&latest);
        tokio::spawn(async move {
            let mut page = ResultsPage::new();
            while let Some(done) = completion_rx.recv().await {
                if done.id != latest_seen.load(Ordering::SeqCst) {
                    log::debug!("search {}: discarding superseded result", done.id);
                    continue;
                }
                if let Err(e) = page.handle_search_result(&done.response) {
                    log::error!("search {}: render aborted: {}", done.id, e);
                }
                // Publish whatever state the pass left, complete or partial.
                if page_tx.send(page.clone()).is_err() {
                    break;
                }
            }
        });

        SearchSession {
            service,
            completion_tx,
            latest,
            in_flight: Mutex::new(CancellationToken::new()),
            page_rx,
        }
    }

    /// Collect the query from the form and dispatch it. Returns the search's
    /// sequence number. Any still-running earlier dispatch is cancelled; a
    /// transport fault is routed to the process-wide fault handler and leaves
    /// the page untouched.
    pub fn search(&self, form: &QueryForm) -> u64 {
        let request = form.collect_request();
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let token = CancellationToken::new();
        let superseded = {
            let mut guard = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, token.clone())
        };
        superseded.cancel();

        log::info!("search {}: query {:?}", id, request.query);
        let service = Arc::clone(&self.service);
        let completion_tx = self.completion_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    log::debug!("search {}: superseded before completion", id);
                }
                result = service.search(request) => match result {
                    Ok(response) => {
                        let _ = completion_tx.send(Completion { id, response });
                    }
                    Err(transport_fault) => {
                        log::error!("search {}: {}", id, transport_fault);
                        fault::report(&transport_fault);
                    }
                }
            }
        });
        id
    }

    /// Snapshot of the page as of the last applied completion.
    pub fn page(&self) -> ResultsPage {
        self.page_rx.borrow().clone()
    }

    /// Watch for page updates. Each applied completion publishes once, even
    /// when the render pass aborted partway.
    pub fn subscribe(&self) -> watch::Receiver<ResultsPage> {
        self.page_rx.clone()
    }
}
