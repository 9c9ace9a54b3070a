//! Interactive session and fuzzing parameters.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::ConfigError;

/// Interactive prompt configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct PromptConfig {
    /// Offer to test a request after the initial safety check.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

/// Bounds for randomly generated states in fuzz mode.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct FuzzConfig {
    /// Upper bound on the number of processes per state.
    #[validate(range(min = 1, max = 256))]
    #[serde(default = "default_max_processes")]
    pub max_processes: usize,

    /// Upper bound on the number of resource types per state.
    #[validate(range(min = 1, max = 64))]
    #[serde(default = "default_max_resource_types")]
    pub max_resource_types: usize,

    /// Upper bound on any single Max entry.
    #[validate(range(min = 1, max = 1_000_000))]
    #[serde(default = "default_max_units")]
    pub max_units: u32,

    /// States generated when the command line does not say otherwise.
    #[validate(range(min = 1))]
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

fn default_max_processes() -> usize {
    8
}

fn default_max_resource_types() -> usize {
    4
}

fn default_max_units() -> u32 {
    10
}

fn default_iterations() -> usize {
    1000
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            max_processes: default_max_processes(),
            max_resource_types: default_max_resource_types(),
            max_units: default_max_units(),
            iterations: default_iterations(),
        }
    }
}

impl FuzzConfig {
    /// Returns the bounds unchanged if they pass validation.
    pub fn checked(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}
