use serde::{Deserialize, Serialize};

/// One row of a keyword search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
}

/// Full record for a single title. Values are kept as the catalog's text;
/// numeric parsing happens when an entry is added to the watched list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub runtime: String,
    pub imdb_rating: String,
    pub plot: String,
    pub released: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
}
