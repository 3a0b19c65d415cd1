mod storage;
mod store;

pub use storage::{FileStorage, KeyValueStorage};
pub use store::WatchedStore;

#[cfg(test)]
pub use storage::MemoryStorage;

use serde::{Deserialize, Serialize};

use crate::catalog::MovieDetail;
use crate::error::AppError;

/// Highest rating the user can give.
pub const MAX_RATING: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEntry {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    /// `None` when the catalog reports "N/A".
    pub imdb_rating: Option<f64>,
    /// Minutes.
    pub runtime: u32,
    pub user_rating: Option<u8>,
    /// How many times the rating was changed before the entry was added.
    #[serde(default)]
    pub rating_decisions: u32,
}

impl WatchedEntry {
    pub fn from_detail(
        detail: &MovieDetail,
        user_rating: Option<u8>,
        rating_decisions: u32,
    ) -> Result<Self, AppError> {
        if let Some(rating) = user_rating {
            validate_rating(rating)?;
        }

        Ok(Self {
            imdb_id: detail.imdb_id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster: detail.poster.clone(),
            imdb_rating: parse_imdb_rating(&detail.imdb_rating)?,
            runtime: parse_runtime(&detail.runtime)?,
            user_rating,
            rating_decisions,
        })
    }
}

pub fn validate_rating(rating: u8) -> Result<u8, AppError> {
    if (1..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(AppError::InvalidInput(format!(
            "Rating must be between 1 and {MAX_RATING}, got {rating}"
        )))
    }
}

/// Minutes from the first whitespace-delimited token, e.g. `"142 min"`.
pub fn parse_runtime(text: &str) -> Result<u32, AppError> {
    text.split_whitespace()
        .next()
        .and_then(|minutes| minutes.parse().ok())
        .ok_or_else(|| AppError::InvalidInput(format!("Runtime '{text}' does not start with a minute count")))
}

pub fn parse_imdb_rating(text: &str) -> Result<Option<f64>, AppError> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("N/A") {
        return Ok(None);
    }

    text.parse::<f64>()
        .ok()
        .filter(|rating| rating.is_finite())
        .map(Some)
        .ok_or_else(|| AppError::InvalidInput(format!("Rating '{text}' is not a number")))
}

/// Whether the open title can still be rated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingAffordance {
    CanRate,
    AlreadyRated(Option<u8>),
}

/// Ordered watched list. Membership changes only by whole-entry add/remove.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchedList {
    entries: Vec<WatchedEntry>,
}

impl WatchedList {
    pub fn from_entries(entries: Vec<WatchedEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, imdb_id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|entry| entry.imdb_id == imdb_id)
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.get(imdb_id).is_some()
    }

    /// Appends to the end. An id that is already present is rejected and
    /// the list is left untouched.
    pub fn add(&mut self, entry: WatchedEntry) -> Result<(), AppError> {
        if self.contains(&entry.imdb_id) {
            return Err(AppError::AlreadyWatched(entry.title));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Removes every entry with this id and returns how many went.
    pub fn remove(&mut self, imdb_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.imdb_id != imdb_id);
        before - self.entries.len()
    }

    pub fn affordance(&self, imdb_id: &str) -> RatingAffordance {
        match self.get(imdb_id) {
            Some(entry) => RatingAffordance::AlreadyRated(entry.user_rating),
            None => RatingAffordance::CanRate,
        }
    }
}

#[cfg(test)]
pub fn entry(imdb_id: &str, imdb_rating: f64, user_rating: u8, runtime: u32) -> WatchedEntry {
    WatchedEntry {
        imdb_id: imdb_id.to_string(),
        title: format!("Title {imdb_id}"),
        year: "2010".to_string(),
        poster: String::new(),
        imdb_rating: Some(imdb_rating),
        runtime,
        user_rating: Some(user_rating),
        rating_decisions: 1,
    }
}
