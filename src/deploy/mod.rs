// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Request validation, image transform, rollout monitoring, and the orchestrator.

mod deployment;
mod error;
mod monitor;
mod orchestrator;
mod outcome;
mod request;
mod retry;
mod state;
mod transform;
mod transitions;

pub use deployment::Deployment;
pub use error::{DeployError, DeployErrorKind, DeployStep};
pub use monitor::{MonitorFailure, MonitorSettings, MonitorState, RolloutFailure, RolloutMonitor};
pub use orchestrator::{Progress, READ_BACKOFF, execute, execute_input};
pub use outcome::DeploymentOutcome;
pub use request::{DeployInput, DeploymentRequest, ValidationError};
pub use retry::{RetryPolicy, Transient, backoff_delay, retry_read};
pub use state::{Initialized, Prepared, Registered, Resolved, Updated};
pub use transform::{ContainerSelector, Selection, TransformError, Transformed, transform};
