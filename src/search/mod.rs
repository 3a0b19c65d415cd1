//! Search-as-you-type state machine.
//!
//! [`SearchMachine`] owns the query and the result list. Every query change
//! cancels the in-flight search; a non-empty query starts a new one on a
//! spawned task. Completed searches commit through the same
//! `watch::Sender` critical section that performs the cancellation, so a
//! superseded search can never overwrite newer state.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::catalog::{CatalogProvider, SearchResult};
use crate::error::CatalogError;


#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchStatus {
    /// Empty query: no results, no error, nothing in flight.
    #[default]
    Idle,
    Loading,
    Loaded(Vec<SearchResult>),
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub status: SearchStatus,
}

impl SearchState {
    pub fn results(&self) -> &[SearchResult] {
        match &self.status {
            SearchStatus::Loaded(results) => results,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SearchStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }
}

pub struct SearchMachine {
    catalog: Arc<dyn CatalogProvider>,
    state: Arc<watch::Sender<SearchState>>,
    in_flight: Option<CancellationToken>,
}

impl SearchMachine {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            catalog,
            state: Arc::new(state),
            in_flight: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn result_count(&self) -> usize {
        self.state.borrow().results().len()
    }

    /// Replace the query. Must be called from within a Tokio runtime.
    ///
    /// A blank query (empty or whitespace only) settles immediately on
    /// [`SearchStatus::Idle`] without touching the catalog.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        let keyword = query.trim().to_string();
        let previous = self.in_flight.take();
        let next = (!keyword.is_empty()).then(CancellationToken::new);

        self.state.send_modify(|state| {
            if let Some(previous) = &previous {
                previous.cancel();
            }
            state.query = query;
            state.status = if next.is_some() {
                SearchStatus::Loading
            } else {
                SearchStatus::Idle
            };
        });

        let Some(token) = next else {
            tracing::debug!("Query cleared");
            return;
        };

        tracing::debug!(keyword = %keyword, "Starting search");
        self.in_flight = Some(token.clone());

        let catalog = Arc::clone(&self.catalog);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let outcome = catalog.search(&keyword, &token).await;
            commit(&state, &token, &keyword, outcome);
        });
    }

    pub fn clear(&mut self) {
        self.set_query("");
    }

    /// Wait until the current search has committed or failed.
    pub async fn settled(&self) -> SearchState {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }
}

impl Drop for SearchMachine {
    fn drop(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

fn commit(
    state: &watch::Sender<SearchState>,
    token: &CancellationToken,
    keyword: &str,
    outcome: Result<Vec<SearchResult>, CatalogError>,
) {
    state.send_if_modified(|state| {
        if token.is_cancelled() {
            tracing::trace!(keyword, "Discarding superseded search");
            return false;
        }

        match outcome {
            Ok(results) => {
                tracing::info!(keyword, count = results.len(), "Search completed");
                state.status = SearchStatus::Loaded(results);
            }
            Err(e) if e.is_cancelled() => return false,
            Err(e) => {
                tracing::warn!(keyword, error = %e, "Search failed");
                state.status = SearchStatus::Failed(e.to_string());
            }
        }
        true
    });
}
