// Configuration module

mod models;

pub use models::*;

use crate::error::Result;
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. CLI arguments (highest, applied by the caller)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Defaults (lowest)
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Load configuration, reading an explicit config file when one is given.
    /// The default config file is optional; an explicit one must exist.
    pub fn load_with(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?);

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(
                File::with_name(&Self::default_config_path()).required(false),
            ),
        };

        let config = builder
            // Override with environment variables (prefix: PROMPT2PNG_)
            .add_source(Environment::with_prefix("PROMPT2PNG").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".prompt2png")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}
