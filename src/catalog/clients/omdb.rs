use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::{
    catalog::{cancellable, CatalogProvider, MovieDetail, SearchResult},
    config::CatalogConfig,
    error::CatalogError,
};

pub struct OmdbClient {
    client: Client,
    config: CatalogConfig,
}

impl OmdbClient {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let mut builder = Client::builder().user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    async fn get<T: DeserializeOwned>(&self, query: &[(&str, &str)]) -> Result<T, CatalogError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("apikey", self.config.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(CatalogError::Transport(format!(
                "OMDb API error: {}",
                response.status()
            )))
        }
    }

    async fn search_internal(&self, keyword: &str) -> Result<Vec<SearchResult>, CatalogError> {
        let response: OmdbSearchResponse = self.get(&[("s", keyword)]).await?;
        if !response.is_success() {
            return Err(CatalogError::NotFound(response.error.unwrap_or_else(|| format!("No movies match '{keyword}'"))));
        }

        Ok(response.search.into_iter().map(|item| item.into()).collect())
    }

    async fn fetch_detail_internal(&self, imdb_id: &str) -> Result<MovieDetail, CatalogError> {
        let response: OmdbDetailResponse = self.get(&[("i", imdb_id)]).await?;
        if response.response != "True" {
            return Err(CatalogError::NotFound(response.error.unwrap_or_else(|| format!("No movie with id {imdb_id}"))));
        }

        Ok(response.into())
    }
}

#[async_trait]
impl CatalogProvider for OmdbClient {
    fn name(&self) -> &'static str {
        "OMDb"
    }

    async fn search(
        &self,
        keyword: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, CatalogError> {
        tracing::debug!(keyword, "Searching OMDb");
        cancellable(cancel, self.search_internal(keyword)).await
    }

    async fn fetch_detail(
        &self,
        imdb_id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, CatalogError> {
        tracing::debug!(imdb_id, "Fetching OMDb title");
        cancellable(cancel, self.fetch_detail_internal(imdb_id)).await
    }
}

#[derive(Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

impl OmdbSearchResponse {
    fn is_success(&self) -> bool {
        self.response == "True"
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    title: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    poster: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
struct OmdbDetailResponse {
    response: String,
    error: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    title: String,
    year: String,
    poster: String,
    runtime: String,
    #[serde(rename = "imdbRating")]
    imdb_rating: String,
    plot: String,
    released: String,
    actors: String,
    director: String,
    genre: String,
}

impl From<OmdbSearchItem> for SearchResult {
    fn from(item: OmdbSearchItem) -> Self {
        SearchResult {
            imdb_id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster: item.poster,
        }
    }
}

impl From<OmdbDetailResponse> for MovieDetail {
    fn from(details: OmdbDetailResponse) -> Self {
        MovieDetail {
            imdb_id: details.imdb_id,
            title: details.title,
            year: details.year,
            poster: details.poster,
            runtime: details.runtime,
            imdb_rating: details.imdb_rating,
            plot: details.plot,
            released: details.released,
            actors: details.actors,
            director: details.director,
            genre: details.genre,
        }
    }
}
