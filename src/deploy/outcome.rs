// ABOUTME: Terminal result of one deployment invocation.
// ABOUTME: Succeeded, TimedOut, or Failed, with the process exit code for each.

use std::fmt;

use crate::types::TaskDefinitionArn;

use super::error::DeployError;

/// How a deployment ended.
#[derive(Debug)]
pub enum DeploymentOutcome {
    /// The new revision reached its desired count with healthy tasks.
    Succeeded { revision: TaskDefinitionArn },

    /// The timeout elapsed first. The rollout may still finish on its own.
    TimedOut { running: u32, desired: u32 },

    Failed { error: DeployError },
}

impl DeploymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeploymentOutcome::Succeeded { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            DeploymentOutcome::Succeeded { .. } => 0,
            DeploymentOutcome::Failed { .. } => 1,
            DeploymentOutcome::TimedOut { .. } => 2,
        }
    }

    pub fn error(&self) -> Option<&DeployError> {
        match self {
            DeploymentOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}

impl From<DeployError> for DeploymentOutcome {
    fn from(error: DeployError) -> Self {
        DeploymentOutcome::Failed { error }
    }
}

impl fmt::Display for DeploymentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentOutcome::Succeeded { revision } => {
                write!(f, "deployed {}", revision.resource())
            }
            DeploymentOutcome::TimedOut { running, desired } => write!(
                f,
                "timed out with {running}/{desired} tasks running; the rollout may still complete"
            ),
            DeploymentOutcome::Failed { error } => write!(f, "{error}"),
        }
    }
}
