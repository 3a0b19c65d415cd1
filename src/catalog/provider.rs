use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::catalog::{MovieDetail, SearchResult};
use crate::error::CatalogError;

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Never called with an empty keyword.
    async fn search(
        &self,
        keyword: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, CatalogError>;

    async fn fetch_detail(
        &self,
        imdb_id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, CatalogError>;
}

/// Drive `request` until it finishes or `cancel` fires. On cancellation the
/// request future is dropped, which aborts any HTTP exchange it owns.
pub async fn cancellable<T, F>(cancel: &CancellationToken, request: F) -> Result<T, CatalogError>
where
    F: Future<Output = Result<T, CatalogError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CatalogError::Cancelled),
        result = request => result,
    }
}
