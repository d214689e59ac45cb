//! Errors reported by the simulator.

use ril_client::RilError;
use ril_wire::WireError;
use thiserror::Error;

/// Errors that can occur while running a scenario.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scenario parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid scenario: {0}")]
    Scenario(#[from] WireError),

    #[error("client error: {0}")]
    Client(#[from] RilError),

    #[error("no result for {0} within {1:?}")]
    NoResult(&'static str, std::time::Duration),
}
