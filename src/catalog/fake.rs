//! Scripted in-memory catalog for controller tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::catalog::{cancellable, CatalogProvider, MovieDetail, SearchResult};
use crate::error::CatalogError;

struct Scripted<T> {
    delay: Duration,
    outcome: Result<T, CatalogError>,
}

#[derive(Default)]
pub struct FakeCatalog {
    searches: Mutex<HashMap<String, Scripted<Vec<SearchResult>>>>,
    details: Mutex<HashMap<String, Scripted<MovieDetail>>>,
    calls: Mutex<Vec<String>>,
    cancelled: Mutex<Vec<String>>,
    ignore_cancel: bool,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(self, keyword: &str, delay_ms: u64, outcome: Result<Vec<SearchResult>, CatalogError>) -> Self {
        self.searches.lock().unwrap().insert(
            keyword.to_string(),
            Scripted { delay: Duration::from_millis(delay_ms), outcome },
        );
        self
    }

    pub fn with_detail(self, imdb_id: &str, delay_ms: u64, outcome: Result<MovieDetail, CatalogError>) -> Self {
        self.details.lock().unwrap().insert(
            imdb_id.to_string(),
            Scripted { delay: Duration::from_millis(delay_ms), outcome },
        );
        self
    }

    /// Responses arrive even after the token fires, like an HTTP reply that
    /// was already on the wire.
    pub fn ignoring_cancellation(mut self) -> Self {
        self.ignore_cancel = true;
        self
    }

    /// Every request made, as `search:<keyword>` or `detail:<id>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Requests that observed their cancellation token.
    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    async fn respond<T: Clone>(
        &self,
        key: String,
        scripted: Option<(Duration, Result<T, CatalogError>)>,
        cancel: &CancellationToken,
    ) -> Result<T, CatalogError> {
        self.calls.lock().unwrap().push(key.clone());
        let (delay, outcome) =
            scripted.unwrap_or((Duration::ZERO, Err(CatalogError::NotFound("Movie not found!".into()))));

        let response = async move {
            tokio::time::sleep(delay).await;
            outcome
        };
        let result = if self.ignore_cancel {
            response.await
        } else {
            cancellable(cancel, response).await
        };

        if matches!(result, Err(CatalogError::Cancelled)) {
            self.cancelled.lock().unwrap().push(key);
        }
        result
    }
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn search(&self, keyword: &str, cancel: &CancellationToken) -> Result<Vec<SearchResult>, CatalogError> {
        let scripted = self
            .searches
            .lock()
            .unwrap()
            .get(keyword)
            .map(|s| (s.delay, s.outcome.clone()));
        self.respond(format!("search:{keyword}"), scripted, cancel).await
    }

    async fn fetch_detail(&self, imdb_id: &str, cancel: &CancellationToken) -> Result<MovieDetail, CatalogError> {
        let scripted = self
            .details
            .lock()
            .unwrap()
            .get(imdb_id)
            .map(|s| (s.delay, s.outcome.clone()));
        self.respond(format!("detail:{imdb_id}"), scripted, cancel).await
    }
}

pub fn result(imdb_id: &str, title: &str) -> SearchResult {
    SearchResult {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "2010".to_string(),
        poster: format!("https://img/{imdb_id}.jpg"),
    }
}

pub fn detail(imdb_id: &str, title: &str, runtime: &str, imdb_rating: &str) -> MovieDetail {
    MovieDetail {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "2010".to_string(),
        poster: format!("https://img/{imdb_id}.jpg"),
        runtime: runtime.to_string(),
        imdb_rating: imdb_rating.to_string(),
        plot: "Plot.".to_string(),
        released: "16 Jul 2010".to_string(),
        actors: "Someone".to_string(),
        director: "Somebody".to_string(),
        genre: "Drama".to_string(),
    }
}
