// ABOUTME: Domain records returned by and sent to the ECS control plane.
// ABOUTME: Services, task definition revisions, registration payloads, and task snapshots.

use std::fmt;

// Elastic Inference is retired but old definitions may still carry accelerators.
#[allow(deprecated)]
use aws_sdk_ecs::types::InferenceAccelerator;
use aws_sdk_ecs::types::{
    Compatibility, ContainerDefinition, EphemeralStorage, IpcMode, NetworkMode, PidMode,
    ProxyConfiguration, RuntimePlatform, Tag, TaskDefinition, TaskDefinitionPlacementConstraint,
    Volume,
};
use nonempty::NonEmpty;

use super::error::{DescribeServiceError, PlaneError};
use crate::types::{ServiceArn, TaskArn, TaskDefinitionArn};

/// ECS reports `ACTIVE` for services that can be deployed to.
pub const ACTIVE_STATUS: &str = "ACTIVE";

/// Clamp an ECS count to an unsigned value.
///
/// ECS models counts as signed integers; negative values never occur in
/// practice and are treated as zero.
pub(crate) fn count(value: impl Into<Option<i32>>) -> u32 {
    value
        .into()
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

// =============================================================================
// Services
// =============================================================================

/// One failure entry from a describe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub arn: String,
    pub reason: String,
}

impl ServiceFailure {
    pub fn new(arn: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            arn: arn.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}': {}", self.arn, self.reason)
    }
}

/// A live service as ECS describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub arn: ServiceArn,
    pub name: String,
    pub status: String,
    pub task_definition: TaskDefinitionArn,
    pub desired_count: u32,
}

/// The raw answer to a describe-services call for one name.
#[derive(Debug, Clone, Default)]
pub struct ServiceDescription {
    pub services: Vec<ServiceRecord>,
    pub failures: Vec<ServiceFailure>,
}

impl ServiceDescription {
    /// Resolve the description to exactly one active service.
    ///
    /// Any reported failure is fatal, even alongside a returned service.
    pub fn resolve(self, requested: &str) -> Result<ServiceRecord, DescribeServiceError> {
        if let Some(failures) = NonEmpty::from_vec(self.failures) {
            return Err(DescribeServiceError::NotFound { failures });
        }

        let mut services = self.services;
        match services.len() {
            0 => Err(DescribeServiceError::NotFound {
                failures: NonEmpty::new(ServiceFailure::new(requested, "MISSING")),
            }),
            1 => {
                let service = services.remove(0);
                if service.status != ACTIVE_STATUS {
                    return Err(DescribeServiceError::NotFound {
                        failures: NonEmpty::new(ServiceFailure::new(
                            service.arn.as_str(),
                            service.status,
                        )),
                    });
                }
                Ok(service)
            }
            count => Err(DescribeServiceError::Ambiguous { count }),
        }
    }
}

// =============================================================================
// Task definitions
// =============================================================================

/// A registered, immutable task definition revision.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinitionRevision {
    arn: TaskDefinitionArn,
    family: String,
    revision: u32,
    document: TaskDefinition,
    tags: Vec<Tag>,
}

impl TaskDefinitionRevision {
    /// Wrap a task definition document returned by ECS.
    ///
    /// # Errors
    ///
    /// Returns `PlaneError::MalformedResponse` when the document has no ARN
    /// or family.
    pub fn from_document(
        operation: &'static str,
        document: TaskDefinition,
    ) -> Result<Self, PlaneError> {
        let arn = document
            .task_definition_arn()
            .map(TaskDefinitionArn::new)
            .ok_or_else(|| PlaneError::MalformedResponse {
                operation,
                message: "task definition has no ARN".to_string(),
            })?;
        let family = document
            .family()
            .map(str::to_string)
            .ok_or_else(|| PlaneError::MalformedResponse {
                operation,
                message: format!("task definition {arn} has no family"),
            })?;
        let revision = count(document.revision());

        Ok(Self {
            arn,
            family,
            revision,
            document,
            tags: Vec::new(),
        })
    }

    /// Attach the resource tags ECS returns beside the document.
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn arn(&self) -> &TaskDefinitionArn {
        &self.arn
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn containers(&self) -> &[ContainerDefinition] {
        self.document.container_definitions()
    }

    pub fn document(&self) -> &TaskDefinition {
        &self.document
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

impl fmt::Display for TaskDefinitionRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.revision)
    }
}

/// Everything needed to register a new revision of a family.
///
/// Holds the registrable subset of a task definition document. Fields
/// that ECS computes (ARN, revision, status, registration metadata) are
/// not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinitionPayload {
    pub family: String,
    pub container_definitions: Vec<ContainerDefinition>,
    pub task_role_arn: Option<String>,
    pub execution_role_arn: Option<String>,
    pub network_mode: Option<NetworkMode>,
    pub volumes: Vec<Volume>,
    pub placement_constraints: Vec<TaskDefinitionPlacementConstraint>,
    pub requires_compatibilities: Vec<Compatibility>,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub pid_mode: Option<PidMode>,
    pub ipc_mode: Option<IpcMode>,
    pub proxy_configuration: Option<ProxyConfiguration>,
    #[allow(deprecated)]
    pub inference_accelerators: Vec<InferenceAccelerator>,
    pub ephemeral_storage: Option<EphemeralStorage>,
    pub runtime_platform: Option<RuntimePlatform>,
    pub enable_fault_injection: Option<bool>,
    pub tags: Vec<Tag>,
}

impl TaskDefinitionPayload {
    /// Copy every registrable field of an existing revision.
    #[allow(deprecated)]
    pub fn from_revision(revision: &TaskDefinitionRevision) -> Self {
        let doc = revision.document();
        Self {
            family: revision.family().to_string(),
            container_definitions: doc.container_definitions().to_vec(),
            task_role_arn: doc.task_role_arn().map(str::to_string),
            execution_role_arn: doc.execution_role_arn().map(str::to_string),
            network_mode: doc.network_mode().cloned(),
            volumes: doc.volumes().to_vec(),
            placement_constraints: doc.placement_constraints().to_vec(),
            requires_compatibilities: doc.requires_compatibilities().to_vec(),
            cpu: doc.cpu().map(str::to_string),
            memory: doc.memory().map(str::to_string),
            pid_mode: doc.pid_mode().cloned(),
            ipc_mode: doc.ipc_mode().cloned(),
            proxy_configuration: doc.proxy_configuration().cloned(),
            inference_accelerators: doc.inference_accelerators().to_vec(),
            ephemeral_storage: doc.ephemeral_storage().cloned(),
            runtime_platform: doc.runtime_platform().cloned(),
            enable_fault_injection: doc.enable_fault_injection(),
            tags: revision.tags().to_vec(),
        }
    }
}

// =============================================================================
// Running tasks
// =============================================================================

/// Lifecycle status ECS reports for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Provisioning,
    Pending,
    Activating,
    Running,
    Deactivating,
    Stopping,
    Deprovisioning,
    Stopped,
    Other(String),
}

impl TaskState {
    pub fn parse(value: &str) -> Self {
        match value {
            "PROVISIONING" => TaskState::Provisioning,
            "PENDING" => TaskState::Pending,
            "ACTIVATING" => TaskState::Activating,
            "RUNNING" => TaskState::Running,
            "DEACTIVATING" => TaskState::Deactivating,
            "STOPPING" => TaskState::Stopping,
            "DEPROVISIONING" => TaskState::Deprovisioning,
            "STOPPED" => TaskState::Stopped,
            other => TaskState::Other(other.to_string()),
        }
    }
}

/// Container health as aggregated by ECS for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
    /// No health check configured, or not evaluated yet.
    Unknown,
}

impl HealthState {
    pub fn parse(value: &str) -> Self {
        match value {
            "HEALTHY" => HealthState::Healthy,
            "UNHEALTHY" => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

/// One task of the revision being rolled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    pub task_arn: TaskArn,
    pub last_status: TaskState,
    pub health: HealthState,
    pub stopped_reason: Option<String>,
}

impl TaskStatus {
    /// Running and not failing its health check.
    ///
    /// Tasks without a health check report `Unknown` forever, so only an
    /// explicit `Unhealthy` disqualifies a running task.
    pub fn is_healthy(&self) -> bool {
        self.last_status == TaskState::Running && self.health != HealthState::Unhealthy
    }
}

/// Rollout phase ECS reports for a service deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutPhase {
    InProgress,
    Completed,
    Failed,
}

impl RolloutPhase {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "IN_PROGRESS" => Some(RolloutPhase::InProgress),
            "COMPLETED" => Some(RolloutPhase::Completed),
            "FAILED" => Some(RolloutPhase::Failed),
            _ => None,
        }
    }
}

/// What one poll saw of the deployment running the new revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningTaskSnapshot {
    pub desired_count: u32,
    pub running_count: u32,
    pub pending_count: u32,
    /// Tasks ECS counts as failed to launch for this deployment.
    pub failed_tasks: u32,
    pub rollout: Option<RolloutPhase>,
    pub rollout_reason: Option<String>,
    /// Tasks of the new revision that have not stopped.
    pub tasks: Vec<TaskStatus>,
    /// Tasks of the new revision that have stopped.
    pub stopped: Vec<TaskStatus>,
}

impl RunningTaskSnapshot {
    /// Running count has reached desired and every live task is healthy.
    pub fn is_settled(&self) -> bool {
        self.running_count == self.desired_count
            && self.pending_count == 0
            && self.tasks.iter().all(TaskStatus::is_healthy)
    }

    /// The larger of ECS's failed-task counter and the stopped tasks seen.
    pub fn failure_count(&self) -> u32 {
        let stopped = u32::try_from(self.stopped.len()).unwrap_or(u32::MAX);
        self.failed_tasks.max(stopped)
    }

    /// Most recent stop reason reported for a failed task.
    pub fn last_stop_reason(&self) -> Option<&str> {
        self.stopped
            .iter()
            .rev()
            .find_map(|task| task.stopped_reason.as_deref())
    }
}

impl fmt::Display for RunningTaskSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "running {}/{} (pending {}, failed {})",
            self.running_count,
            self.desired_count,
            self.pending_count,
            self.failure_count()
        )
    }
}

// =============================================================================
// Listing
// =============================================================================

/// One page of a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}
