use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Catalog (OMDb) API key
    #[arg(short = 'k', long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Directory holding the watched list
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config: None,
            api_key: None,
            data_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl CliArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log level '{}'. Valid levels are: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }

        if matches!(&self.api_key, Some(key) if key.trim().is_empty()) {
            return Err("api-key must not be blank".to_string());
        }

        Ok(())
    }

    pub fn tracing_level(&self) -> tracing::Level {
        match self.log_level.as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::WARN,
        }
    }
}
