// ABOUTME: Control-plane capability trait consulted by the deployment state machine.
// ABOUTME: Describe, register, update, and poll operations plus paginated listings.

use async_trait::async_trait;

use super::error::{DescribeServiceError, PlaneError};
use super::model::{
    Page, RunningTaskSnapshot, ServiceRecord, TaskDefinitionPayload, TaskDefinitionRevision,
};
use crate::types::{ClusterName, ServiceIdentity, TaskDefinitionArn};

/// The remote operations a deployment needs.
///
/// Reads may be repeated freely. Writes have side effects on the remote
/// side and are issued at most once per call. Implementations never retry.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Resolve a service to its live record.
    async fn describe_service(
        &self,
        identity: &ServiceIdentity,
    ) -> Result<ServiceRecord, DescribeServiceError>;

    /// Fetch the full document of a registered revision.
    async fn describe_task_definition(
        &self,
        arn: &TaskDefinitionArn,
    ) -> Result<TaskDefinitionRevision, PlaneError>;

    /// Register a new immutable revision.
    async fn register_task_definition(
        &self,
        payload: &TaskDefinitionPayload,
    ) -> Result<TaskDefinitionRevision, PlaneError>;

    /// Point the service at a revision. Returns once ECS accepts the change.
    async fn update_service(
        &self,
        identity: &ServiceIdentity,
        revision: &TaskDefinitionArn,
    ) -> Result<(), PlaneError>;

    /// Observe the deployment running `revision`.
    async fn describe_running_tasks(
        &self,
        identity: &ServiceIdentity,
        revision: &TaskDefinitionArn,
    ) -> Result<RunningTaskSnapshot, PlaneError>;

    /// One page of service ARNs in a cluster.
    async fn list_services(
        &self,
        cluster: &ClusterName,
        token: Option<&str>,
    ) -> Result<Page<String>, PlaneError>;

    /// One page of task definition family names.
    async fn list_task_definition_families(
        &self,
        token: Option<&str>,
    ) -> Result<Page<String>, PlaneError>;

    /// One page of revision ARNs in a family, newest first.
    async fn list_task_definitions(
        &self,
        family: &str,
        token: Option<&str>,
    ) -> Result<Page<String>, PlaneError>;
}
