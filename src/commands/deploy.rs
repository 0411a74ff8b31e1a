// ABOUTME: Deploy command implementation.
// ABOUTME: Validates input, connects to ECS, runs the orchestrator, and reports the outcome.

use ecs_deploy::config::{AwsSettings, DeploySettings};
use ecs_deploy::deploy::{self, DeployError, DeploymentOutcome};
use ecs_deploy::diagnostics::Diagnostics;
use ecs_deploy::error::{Error, Result};
use ecs_deploy::output::Output;
use ecs_deploy::plane::EcsPlane;

/// Deploy one image to one service and wait for the rollout.
pub async fn deploy(settings: DeploySettings, aws: AwsSettings, output: &mut Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    // Bad input must fail before any AWS call
    let request = settings
        .input
        .validate(&mut diag)
        .map_err(DeployError::from)?;

    output.progress(&format!(
        "Deploying {} to {} in {}",
        request.image(),
        request.identity().service,
        aws.region
    ));

    let plane = EcsPlane::connect(aws).await;
    let progress: &Output = output;
    let outcome = deploy::execute(&plane, request, settings.monitor, &mut diag, |step| {
        progress.progress(&format!("  → {step}"));
    })
    .await;

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    match outcome {
        DeploymentOutcome::Succeeded { revision } => {
            output.success(&format!("Deployed {}", revision.resource()));
            Ok(())
        }
        DeploymentOutcome::TimedOut { running, desired } => {
            Err(Error::TimedOut { running, desired })
        }
        DeploymentOutcome::Failed { error } => Err(error.into()),
    }
}
