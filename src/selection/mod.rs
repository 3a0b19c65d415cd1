//! The single "open" title and its detail record.
//!
//! [`DetailController`] follows the same discipline as the search machine:
//! each selection owns a [`CancellationToken`], and the fetch commits only
//! if its token is still live inside the `watch` critical section. While a
//! detail is loaded a [`TitleGuard`] keeps the display label on the movie's
//! title; dropping the guard (on close, on re-selection, or when the
//! controller itself goes away) restores the default.

mod title;

pub use title::{TerminalTitle, TitleGuard, TitleSink};

#[cfg(test)]
pub use title::recording::RecordingTitle;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::catalog::{CatalogProvider, MovieDetail};
use crate::error::{AppError, CatalogError};
use crate::watched::{validate_rating, RatingAffordance, WatchedEntry, WatchedList, WatchedStore};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailStatus {
    #[default]
    Closed,
    Loading,
    Loaded(MovieDetail),
    Failed(String),
}

/// Rating picked for the open title but not yet confirmed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingDraft {
    pub rating: Option<u8>,
    pub decisions: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub selected: Option<String>,
    pub status: DetailStatus,
    pub draft: RatingDraft,
}

impl DetailState {
    pub fn detail(&self) -> Option<&MovieDetail> {
        match &self.status {
            DetailStatus::Loaded(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == DetailStatus::Loading
    }

    /// The loaded detail, or the reason there is none to act on.
    pub fn require_detail(&self) -> Result<&MovieDetail, AppError> {
        match &self.status {
            DetailStatus::Closed => Err(AppError::NothingSelected),
            DetailStatus::Loading => Err(AppError::DetailNotLoaded),
            DetailStatus::Failed(_) => Err(AppError::DetailFailed),
            DetailStatus::Loaded(detail) => Ok(detail),
        }
    }
}

struct Shared {
    state: watch::Sender<DetailState>,
    label: Mutex<Option<TitleGuard>>,
    sink: Arc<dyn TitleSink>,
    default_title: String,
}

impl Shared {
    // Lock order: `state` first, then `label`.
    fn label(&self) -> MutexGuard<'_, Option<TitleGuard>> {
        self.label.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct DetailController {
    catalog: Arc<dyn CatalogProvider>,
    shared: Arc<Shared>,
    in_flight: Option<CancellationToken>,
}

impl DetailController {
    pub fn new(catalog: Arc<dyn CatalogProvider>, sink: Arc<dyn TitleSink>, default_title: &str) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            catalog,
            shared: Arc::new(Shared {
                state,
                label: Mutex::new(None),
                sink,
                default_title: default_title.to_string(),
            }),
            in_flight: None,
        }
    }

    pub fn snapshot(&self) -> DetailState {
        self.shared.state.borrow().clone()
    }

    pub fn selected(&self) -> Option<String> {
        self.shared.state.borrow().selected.clone()
    }

    /// Open `imdb_id`. Re-selecting the open title is a no-op unless its
    /// last fetch failed, in which case the fetch is retried.
    pub fn select(&mut self, imdb_id: &str) {
        {
            let state = self.shared.state.borrow();
            if state.selected.as_deref() == Some(imdb_id) && !matches!(state.status, DetailStatus::Failed(_)) {
                return;
            }
        }

        let token = CancellationToken::new();
        self.reset(DetailState {
            selected: Some(imdb_id.to_string()),
            status: DetailStatus::Loading,
            draft: RatingDraft::default(),
        });
        self.in_flight = Some(token.clone());

        tracing::debug!(imdb_id, "Opening title");
        let catalog = Arc::clone(&self.catalog);
        let shared = Arc::clone(&self.shared);
        let imdb_id = imdb_id.to_string();
        tokio::spawn(async move {
            let outcome = catalog.fetch_detail(&imdb_id, &token).await;
            commit(&shared, &token, &imdb_id, outcome);
        });
    }

    pub fn close(&mut self) {
        self.reset(DetailState::default());
    }

    /// Cancel whatever is in flight, drop the label guard, and publish
    /// `next`, all inside one critical section.
    fn reset(&mut self, next: DetailState) {
        let previous = self.in_flight.take();
        let shared = &self.shared;
        shared.state.send_modify(|state| {
            if let Some(previous) = &previous {
                previous.cancel();
            }
            shared.label().take();
            *state = next;
        });
    }

    /// Draft a rating for the open title. A title that is already in
    /// `watched` keeps its confirmed rating and rejects new ones.
    pub fn set_rating(&mut self, rating: u8, watched: &WatchedList) -> Result<(), AppError> {
        let rating = validate_rating(rating)?;
        let mut outcome = Ok(());
        self.shared.state.send_if_modified(|state| {
            let detail = match state.require_detail() {
                Ok(detail) => detail,
                Err(e) => {
                    outcome = Err(e);
                    return false;
                }
            };
            if let RatingAffordance::AlreadyRated(_) = watched.affordance(&detail.imdb_id) {
                outcome = Err(AppError::AlreadyWatched(detail.title.clone()));
                return false;
            }
            if state.draft.rating == Some(rating) {
                return false;
            }
            state.draft.rating = Some(rating);
            state.draft.decisions += 1;
            true
        });
        outcome
    }

    /// Add the open title to `watched` with the drafted rating, then close
    /// the detail view.
    pub fn confirm(&mut self, watched: &mut WatchedStore) -> Result<WatchedEntry, AppError> {
        let state = self.snapshot();
        let detail = state.require_detail()?;

        let entry = WatchedEntry::from_detail(detail, state.draft.rating, state.draft.decisions)?;
        watched.add(entry.clone())?;
        self.close();
        Ok(entry)
    }

    /// Wait until the open title has loaded or failed.
    pub async fn settled(&self) -> DetailState {
        let mut rx = self.shared.state.subscribe();
        let settled = rx
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }
}

impl Drop for DetailController {
    fn drop(&mut self) {
        self.close();
    }
}

fn commit(
    shared: &Shared,
    token: &CancellationToken,
    imdb_id: &str,
    outcome: Result<MovieDetail, CatalogError>,
) {
    shared.state.send_if_modified(|state| {
        if token.is_cancelled() {
            tracing::trace!(imdb_id, "Discarding superseded detail");
            return false;
        }

        match outcome {
            Ok(detail) => {
                tracing::info!(imdb_id, title = %detail.title, "Title loaded");
                let mut label = shared.label();
                label.take();
                *label = Some(TitleGuard::show(
                    Arc::clone(&shared.sink),
                    &detail.title,
                    &shared.default_title,
                ));
                state.status = DetailStatus::Loaded(detail);
            }
            Err(e) if e.is_cancelled() => return false,
            Err(e) => {
                tracing::warn!(imdb_id, error = %e, "Loading title failed");
                state.status = DetailStatus::Failed(e.to_string());
            }
        }
        true
    });
}
