use thiserror::Error;

use kassavakt_config::ConfigError;
use kassavakt_input::InputError;
use kassavakt_simulator::SimulationError;

/// Anything that ends a run with exit code 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Input(#[from] InputError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Simulation(#[from] SimulationError),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Cannot render report: {0}")]
    Render(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
