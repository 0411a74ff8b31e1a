// ABOUTME: Runs one deployment from validated request to terminal outcome.
// ABOUTME: Sequences the typed state transitions and reports progress per step.

use std::fmt;
use std::time::Duration;

use crate::diagnostics::Diagnostics;
use crate::plane::ControlPlane;

use super::Deployment;
use super::error::DeployError;
use super::monitor::MonitorSettings;
use super::outcome::DeploymentOutcome;
use super::request::{DeployInput, DeploymentRequest};
use super::retry::RetryPolicy;

/// First backoff for retried describe calls.
pub const READ_BACKOFF: Duration = Duration::from_secs(1);

/// A completed step, reported as the deployment advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Resolved { service: String, revision: String },
    Prepared { container: String, image: String },
    Registered { revision: String },
    Updated { timeout: Duration },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Resolved { service, revision } => {
                write!(f, "Service {service} is running {revision}")
            }
            Progress::Prepared { container, image } => {
                write!(f, "Updating container {container} to {image}")
            }
            Progress::Registered { revision } => write!(f, "Registered {revision}"),
            Progress::Updated { timeout } => write!(
                f,
                "Service updated; waiting up to {}s for the rollout",
                timeout.as_secs()
            ),
        }
    }
}

/// Deploy a validated request.
///
/// Writes (register, update) are issued at most once each. Every error
/// ends the deployment as `Failed`; nothing is rolled back.
pub async fn execute<P: ControlPlane>(
    plane: &P,
    request: DeploymentRequest,
    settings: MonitorSettings,
    diag: &mut Diagnostics,
    mut on_step: impl FnMut(&Progress),
) -> DeploymentOutcome {
    let service = request.identity().to_string();
    match run(plane, request, settings, diag, &mut on_step).await {
        Ok(outcome) => {
            tracing::info!(service = %service, outcome = %outcome, "deployment finished");
            outcome
        }
        Err(error) => {
            tracing::warn!(service = %service, error = %error, "deployment failed");
            error.into()
        }
    }
}

/// Validate raw input, then deploy it.
///
/// Invalid input fails before any control-plane call.
pub async fn execute_input<P: ControlPlane>(
    plane: &P,
    input: DeployInput,
    settings: MonitorSettings,
    diag: &mut Diagnostics,
    on_step: impl FnMut(&Progress),
) -> DeploymentOutcome {
    match input.validate(diag) {
        Ok(request) => execute(plane, request, settings, diag, on_step).await,
        Err(error) => DeployError::from(error).into(),
    }
}

async fn run<P, F>(
    plane: &P,
    request: DeploymentRequest,
    settings: MonitorSettings,
    diag: &mut Diagnostics,
    on_step: &mut F,
) -> Result<DeploymentOutcome, DeployError>
where
    P: ControlPlane,
    F: FnMut(&Progress),
{
    let retry = RetryPolicy::new(request.timeout(), READ_BACKOFF, settings.max_backoff);

    let resolved = Deployment::new(request).resolve(plane, &retry, diag).await?;
    on_step(&Progress::Resolved {
        service: resolved.identity().to_string(),
        revision: resolved.current().to_string(),
    });

    let prepared = resolved.prepare(diag)?;
    on_step(&Progress::Prepared {
        container: prepared.transformed().container.clone(),
        image: prepared.image().to_string(),
    });

    let registered = prepared.register(plane).await?;
    on_step(&Progress::Registered {
        revision: registered.registered().to_string(),
    });

    let updated = registered.update_service(plane).await?;
    on_step(&Progress::Updated {
        timeout: updated.request().timeout(),
    });

    Ok(updated.monitor(plane, settings, diag).await)
}
