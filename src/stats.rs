//! Summary figures for the watched list.

use std::fmt;

use crate::watched::WatchedEntry;

#[derive(Debug, Clone, PartialEq)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: Option<f64>,
    pub avg_user_rating: Option<f64>,
    pub avg_runtime: Option<f64>,
}

impl WatchedSummary {
    /// Each mean only counts the entries that carry that value, so an
    /// unrated entry does not pull the user-rating mean towards zero.
    pub fn from_entries(entries: &[WatchedEntry]) -> Self {
        Self {
            count: entries.len(),
            avg_imdb_rating: mean(entries.iter().filter_map(|e| e.imdb_rating)),
            avg_user_rating: mean(entries.iter().filter_map(|e| e.user_rating.map(f64::from))),
            avg_runtime: mean(entries.iter().map(|e| f64::from(e.runtime))),
        }
    }
}

/// Arithmetic mean; `None` for no values.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

pub fn format_mean(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

impl fmt::Display for WatchedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#️⃣ {} movies  ⭐️ {}  🌟 {}  ⏳ {} min",
            self.count,
            format_mean(self.avg_imdb_rating),
            format_mean(self.avg_user_rating),
            format_mean(self.avg_runtime),
        )
    }
}
