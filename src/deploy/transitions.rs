// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use crate::diagnostics::{Diagnostics, Warning};
use crate::plane::ControlPlane;

use super::Deployment;
use super::error::{DeployError, DeployStep};
use super::monitor::{MonitorFailure, MonitorSettings, MonitorState, RolloutMonitor};
use super::outcome::DeploymentOutcome;
use super::retry::{RetryPolicy, retry_read};
use super::state::{Initialized, Prepared, Registered, Resolved, Updated};
use super::transform::{ContainerSelector, Selection, transform};

// =============================================================================
// Initialized -> Resolved
// =============================================================================

impl Deployment<Initialized> {
    /// Look up the service and the task definition it currently runs.
    ///
    /// Both calls are reads and are retried on transient errors until the
    /// policy's deadline.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Describe` if the service does not resolve to
    /// exactly one active service, or `DeployError::Plane` if the task
    /// definition cannot be fetched.
    #[must_use = "deployment state must be used"]
    pub async fn resolve<P: ControlPlane>(
        self,
        plane: &P,
        retry: &RetryPolicy,
        diag: &mut Diagnostics,
    ) -> Result<Deployment<Resolved>, DeployError> {
        let identity = self.request.identity();
        let service = retry_read(retry, diag, || plane.describe_service(identity)).await?;

        let current = retry_read(retry, diag, || {
            plane.describe_task_definition(&service.task_definition)
        })
        .await
        .map_err(|e| DeployError::plane(DeployStep::DescribeTaskDefinition, e))?;

        tracing::info!(
            service = %identity,
            revision = %current,
            desired = service.desired_count,
            "resolved service"
        );

        Ok(Deployment {
            request: self.request,
            state: Resolved { service, current },
        })
    }
}

// =============================================================================
// Resolved -> Prepared
// =============================================================================

impl Deployment<Resolved> {
    /// Build the next revision's payload with the new image.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Transform` if no single container can be chosen.
    #[must_use = "deployment state must be used"]
    pub fn prepare(self, diag: &mut Diagnostics) -> Result<Deployment<Prepared>, DeployError> {
        let transformed = transform(
            &self.state.current,
            self.request.image(),
            ContainerSelector::for_request(&self.request),
        )?;

        if transformed.selection == Selection::SoleContainer {
            diag.warn(Warning::container_fallback(format!(
                "{} has no container named `{}`; updating its only container `{}`",
                self.state.current,
                self.request.identity().service.short_name(),
                transformed.container
            )));
        }

        let Resolved { service, current } = self.state;
        Ok(Deployment {
            request: self.request,
            state: Prepared {
                service,
                current,
                transformed,
            },
        })
    }
}

// =============================================================================
// Prepared -> Registered
// =============================================================================

impl Deployment<Prepared> {
    /// Register the new revision. Called once; never retried.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Plane` if registration fails for any reason.
    #[must_use = "deployment state must be used"]
    pub async fn register<P: ControlPlane>(
        self,
        plane: &P,
    ) -> Result<Deployment<Registered>, DeployError> {
        let registered = plane
            .register_task_definition(&self.state.transformed.payload)
            .await
            .map_err(|e| DeployError::plane(DeployStep::RegisterTaskDefinition, e))?;

        tracing::info!(
            previous = %self.state.current,
            registered = %registered,
            "registered task definition"
        );

        Ok(Deployment {
            request: self.request,
            state: Registered {
                service: self.state.service,
                registered,
            },
        })
    }
}

// =============================================================================
// Registered -> Updated
// =============================================================================

impl Deployment<Registered> {
    /// Point the service at the registered revision. Called once; never retried.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Plane` if the update is not accepted.
    #[must_use = "deployment state must be used"]
    pub async fn update_service<P: ControlPlane>(
        self,
        plane: &P,
    ) -> Result<Deployment<Updated>, DeployError> {
        plane
            .update_service(self.request.identity(), self.state.registered.arn())
            .await
            .map_err(|e| DeployError::plane(DeployStep::UpdateService, e))?;

        tracing::info!(
            service = %self.request.identity(),
            revision = %self.state.registered,
            "service update accepted"
        );

        let Registered {
            service,
            registered,
        } = self.state;
        Ok(Deployment {
            request: self.request,
            state: Updated {
                service,
                registered,
            },
        })
    }
}

// =============================================================================
// Updated -> outcome
// =============================================================================

impl Deployment<Updated> {
    /// Wait for the rollout and report how it ended.
    pub async fn monitor<P: ControlPlane>(
        self,
        plane: &P,
        settings: MonitorSettings,
        diag: &mut Diagnostics,
    ) -> DeploymentOutcome {
        let Updated {
            service,
            registered,
        } = self.state;

        let state = RolloutMonitor::new(
            plane,
            self.request.identity(),
            registered.arn(),
            self.request.timeout(),
            settings,
        )
        .run(diag)
        .await;

        match state {
            MonitorState::Succeeded { .. } => DeploymentOutcome::Succeeded {
                revision: registered.arn().clone(),
            },
            MonitorState::TimedOut { last } | MonitorState::Polling { last, .. } => {
                DeploymentOutcome::TimedOut {
                    running: last.as_ref().map_or(0, |s| s.running_count),
                    desired: last
                        .as_ref()
                        .map_or(service.desired_count, |s| s.desired_count),
                }
            }
            MonitorState::Failed {
                failure: MonitorFailure::Rollout(failure),
                last,
            } => DeployError::Rollout { failure, last }.into(),
            MonitorState::Failed {
                failure: MonitorFailure::Plane(error),
                ..
            } => DeployError::plane(DeployStep::Monitor, error).into(),
        }
    }
}
