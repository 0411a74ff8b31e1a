// ABOUTME: Error types for deployment operations.
// ABOUTME: Covers validation, service resolution, control-plane, transform, and rollout failures.

use std::fmt;

use crate::plane::{DescribeServiceError, PlaneError, RunningTaskSnapshot};

use super::monitor::RolloutFailure;
use super::request::ValidationError;
use super::transform::TransformError;

/// The step of a deployment that issued a failed control-plane call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStep {
    DescribeService,
    DescribeTaskDefinition,
    RegisterTaskDefinition,
    UpdateService,
    Monitor,
}

impl DeployStep {
    /// Whether the step changes remote state.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            DeployStep::RegisterTaskDefinition | DeployStep::UpdateService
        )
    }
}

impl fmt::Display for DeployStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStep::DescribeService => "describe service",
            DeployStep::DescribeTaskDefinition => "describe task definition",
            DeployStep::RegisterTaskDefinition => "register task definition",
            DeployStep::UpdateService => "update service",
            DeployStep::Monitor => "monitor rollout",
        };
        f.write_str(name)
    }
}

/// Errors that end a deployment as `Failed`.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Describe(#[from] DescribeServiceError),

    #[error("{step} failed: {source}")]
    Plane { step: DeployStep, source: PlaneError },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("rollout failed: {failure}{}", format_last(.last))]
    Rollout {
        failure: RolloutFailure,
        last: Option<RunningTaskSnapshot>,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    Validation,
    NotFound,
    Ambiguous,
    Plane,
    Transform,
    Rollout,
}

impl DeployError {
    pub fn plane(step: DeployStep, source: PlaneError) -> Self {
        DeployError::Plane { step, source }
    }

    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Validation(_) => DeployErrorKind::Validation,
            DeployError::Describe(DescribeServiceError::NotFound { .. }) => {
                DeployErrorKind::NotFound
            }
            DeployError::Describe(DescribeServiceError::Ambiguous { .. }) => {
                DeployErrorKind::Ambiguous
            }
            DeployError::Describe(DescribeServiceError::Plane(_)) | DeployError::Plane { .. } => {
                DeployErrorKind::Plane
            }
            DeployError::Transform(_) => DeployErrorKind::Transform,
            DeployError::Rollout { .. } => DeployErrorKind::Rollout,
        }
    }

    /// The step whose control-plane call failed, if any.
    pub fn step(&self) -> Option<DeployStep> {
        match self {
            DeployError::Plane { step, .. } => Some(*step),
            DeployError::Describe(_) => Some(DeployStep::DescribeService),
            _ => None,
        }
    }

    /// The last snapshot observed before a rollout failure.
    pub fn last_snapshot(&self) -> Option<&RunningTaskSnapshot> {
        match self {
            DeployError::Rollout { last, .. } => last.as_ref(),
            _ => None,
        }
    }
}

fn format_last(last: &Option<RunningTaskSnapshot>) -> String {
    match last {
        Some(snapshot) => format!(" (last seen: {snapshot})"),
        None => String::new(),
    }
}
