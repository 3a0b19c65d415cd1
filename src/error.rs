use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    CatalogError(#[from] CatalogError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} is already in your watched list")]
    AlreadyWatched(String),

    #[error("No movie is open")]
    NothingSelected,

    #[error("Movie details are still loading")]
    DetailNotLoaded,

    #[error("Movie details could not be loaded, open the movie again to retry")]
    DetailFailed,
}

/// Failures surfaced by a catalog request.
///
/// `Cancelled` only ever reaches the controllers, which swallow it; the
/// other two carry a message meant for the user.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Something went wrong while fetching movies: {0}")]
    Transport(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Request was superseded")]
    Cancelled,
}

impl CatalogError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::Transport(e.to_string())
    }
}
