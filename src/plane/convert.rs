// ABOUTME: Conversions from aws-sdk-ecs response types into domain records.
// ABOUTME: Pure functions so response handling is testable without the network.

use aws_sdk_ecs::types::{Failure, Service, Task};

use super::error::PlaneError;
use super::model::{
    HealthState, RolloutPhase, RunningTaskSnapshot, ServiceFailure, ServiceRecord, TaskState,
    TaskStatus, count,
};
use crate::types::{ServiceArn, TaskArn, TaskDefinitionArn};

/// Map a described service to a record, requiring the fields we act on.
pub fn service_record(
    operation: &'static str,
    service: &Service,
) -> Result<ServiceRecord, PlaneError> {
    let arn = service
        .service_arn()
        .ok_or_else(|| PlaneError::MalformedResponse {
            operation,
            message: "service has no ARN".to_string(),
        })?;
    let task_definition =
        service
            .task_definition()
            .ok_or_else(|| PlaneError::MalformedResponse {
                operation,
                message: format!("service {arn} has no task definition"),
            })?;

    Ok(ServiceRecord {
        arn: ServiceArn::new(arn),
        name: service.service_name().unwrap_or_default().to_string(),
        status: service.status().unwrap_or_default().to_string(),
        task_definition: TaskDefinitionArn::new(task_definition),
        desired_count: count(service.desired_count()),
    })
}

pub fn service_failure(failure: &Failure) -> ServiceFailure {
    let reason = match (failure.reason(), failure.detail()) {
        (Some(reason), Some(detail)) => format!("{reason} ({detail})"),
        (Some(reason), None) => reason.to_string(),
        (None, Some(detail)) => detail.to_string(),
        (None, None) => "unknown failure".to_string(),
    };
    ServiceFailure::new(failure.arn().unwrap_or_default(), reason)
}

/// Whether a task was launched from `revision`.
pub fn runs_revision(task: &Task, revision: &TaskDefinitionArn) -> bool {
    task.task_definition_arn() == Some(revision.as_str())
}

/// Whether ECS is stopping or has stopped a task.
pub fn is_stopped(task: &Task) -> bool {
    task.desired_status() == Some("STOPPED") || task.last_status() == Some("STOPPED")
}

pub fn task_status(task: &Task) -> Option<TaskStatus> {
    let arn = task.task_arn()?;
    Some(TaskStatus {
        task_arn: TaskArn::new(arn),
        last_status: TaskState::parse(task.last_status().unwrap_or_default()),
        health: task
            .health_status()
            .map(|h| HealthState::parse(h.as_str()))
            .unwrap_or(HealthState::Unknown),
        stopped_reason: task.stopped_reason().map(str::to_string),
    })
}

/// Build a snapshot of the deployment running `revision`.
///
/// Until ECS lists a deployment for the revision, nothing of it is
/// running and the service's desired count is the target.
pub fn snapshot(
    service: &Service,
    revision: &TaskDefinitionArn,
    tasks: &[Task],
) -> RunningTaskSnapshot {
    let deployment = service
        .deployments()
        .iter()
        .find(|d| d.task_definition() == Some(revision.as_str()));

    let mut snapshot = match deployment {
        Some(d) => RunningTaskSnapshot {
            desired_count: count(d.desired_count()),
            running_count: count(d.running_count()),
            pending_count: count(d.pending_count()),
            failed_tasks: count(d.failed_tasks()),
            rollout: d
                .rollout_state()
                .and_then(|state| RolloutPhase::parse(state.as_str())),
            rollout_reason: d.rollout_state_reason().map(str::to_string),
            ..Default::default()
        },
        None => RunningTaskSnapshot {
            desired_count: count(service.desired_count()),
            ..Default::default()
        },
    };

    let mut seen = std::collections::HashSet::new();
    for task in tasks.iter().filter(|t| runs_revision(t, revision)) {
        let Some(status) = task_status(task) else {
            continue;
        };
        if !seen.insert(status.task_arn.clone()) {
            continue;
        }
        if is_stopped(task) {
            snapshot.stopped.push(status);
        } else {
            snapshot.tasks.push(status);
        }
    }

    snapshot
}
