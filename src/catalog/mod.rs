mod clients;
mod models;
mod provider;

#[cfg(test)]
pub mod fake;

pub use clients::OmdbClient;
pub use models::{MovieDetail, SearchResult};
pub use provider::{cancellable, CatalogProvider};
