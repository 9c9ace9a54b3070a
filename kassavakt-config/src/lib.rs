//! # Kassavakt Configuration System
//!
//! Layered configuration for the `kassavakt` binary: defaults, an optional
//! YAML file and `KASSAVAKT_*` environment variables, validated after merging.

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod session;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use session::{FuzzConfig, PromptConfig};
pub use telemetry::TelemetryConfig;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/kassavakt.yaml";

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct KassavaktConfig {
    /// Logging and metrics.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Interactive request prompt.
    #[validate(nested)]
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Random state generation for fuzz mode.
    #[validate(nested)]
    #[serde(default)]
    pub fuzz: FuzzConfig,
}

impl KassavaktConfig {
    /// Load configuration from the default file and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/kassavakt.yaml`, if present
    /// 3. `KASSAVAKT_*` environment variables (`__` separates sections)
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(KassavaktConfig::default()));
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_CONFIG_PATH));
        }
        Self::extract(figment)
    }

    /// Load configuration from a specific path. The file must exist.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment =
            Figment::from(Serialized::defaults(KassavaktConfig::default())).merge(Yaml::file(path));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed("KASSAVAKT_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
