// ABOUTME: Application-wide error types for ecs-deploy.
// ABOUTME: Uses thiserror for ergonomic error handling and maps errors to exit codes.

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::DeployError;
use crate::plane::PlaneError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Plane(#[from] PlaneError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    /// A listing failed part way; what was fetched has already been printed.
    #[error("{source}")]
    PartialListing { source: PlaneError },

    #[error(
        "deployment timed out with {running}/{desired} tasks running; the rollout may still complete"
    )]
    TimedOut { running: u32, desired: u32 },
}

impl Error {
    /// Process exit code: 2 for a timed-out rollout, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::TimedOut { .. } => 2,
            _ => 1,
        }
    }

    /// Whether the command already printed this error alongside its output.
    pub fn already_reported(&self) -> bool {
        matches!(self, Error::PartialListing { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
