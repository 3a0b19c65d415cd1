use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::cli::CliArgs;
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com";
pub const DEFAULT_TITLE: &str = "usePopcorn";
pub const DEFAULT_SLOT: &str = "watched";

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub catalog: CatalogConfig,
    #[validate(nested)]
    pub storage: StorageConfig,
    #[validate(nested)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CatalogConfig {
    #[validate(length(min = 1, message = "API key cannot be empty"))]
    pub api_key: String,
    #[validate(url(message = "Base URL must be a valid URL"))]
    pub base_url: String,
    /// Unset means requests never time out on their own.
    #[validate(range(min = 1, message = "Timeout must be at least one second"))]
    pub timeout_secs: Option<u64>,
}

impl CatalogConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct StorageConfig {
    pub dir: PathBuf,
    #[validate(length(min = 1, message = "Storage slot cannot be empty"))]
    pub slot: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct DisplayConfig {
    #[validate(length(min = 1, message = "Default title cannot be empty"))]
    pub default_title: String,
}

impl AppConfig {
    /// Layers, lowest priority first: built-in defaults, `config.toml` in
    /// the working directory, `--config FILE`, `POPCORN__*` environment
    /// variables, then the remaining CLI flags.
    pub fn load_with_cli_args(cli_args: &CliArgs) -> Result<Self, AppError> {
        let mut builder = Config::builder()
            .set_default("catalog.api_key", "")?
            .set_default("catalog.base_url", DEFAULT_BASE_URL)?
            .set_default("storage.dir", ".popcorn")?
            .set_default("storage.slot", DEFAULT_SLOT)?
            .set_default("display.default_title", DEFAULT_TITLE)?
            .add_source(File::with_name("config").required(false));

        if let Some(config_path) = &cli_args.config {
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        builder = builder.add_source(Environment::with_prefix("POPCORN").separator("__"));

        if let Some(api_key) = &cli_args.api_key {
            builder = builder.set_override("catalog.api_key", api_key.as_str())?;
        }
        if let Some(data_dir) = &cli_args.data_dir {
            builder = builder.set_override("storage.dir", data_dir.to_string_lossy().into_owned())?;
        }

        let app_config: AppConfig = builder.build()?.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests(base_url: &str) -> Self {
        Self {
            catalog: CatalogConfig {
                api_key: "test-key".to_string(),
                base_url: base_url.to_string(),
                timeout_secs: None,
            },
            storage: StorageConfig {
                dir: PathBuf::from("."),
                slot: DEFAULT_SLOT.to_string(),
            },
            display: DisplayConfig {
                default_title: DEFAULT_TITLE.to_string(),
            },
        }
    }
}
