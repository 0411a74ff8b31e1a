// ABOUTME: ControlPlane implementation over the AWS ECS API.
// ABOUTME: Thin adapter around aws-sdk-ecs; classifies errors and never retries.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ecs::Client;
use aws_sdk_ecs::config::Credentials;
use aws_sdk_ecs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ecs::types::{DesiredStatus, SortOrder, Task, TaskDefinitionField};
use nonempty::NonEmpty;

use super::convert;
use super::error::{DescribeServiceError, PlaneError};
use super::model::{
    Page, RunningTaskSnapshot, ServiceDescription, ServiceFailure, ServiceRecord,
    TaskDefinitionPayload, TaskDefinitionRevision,
};
use super::traits::ControlPlane;
use crate::config::AwsSettings;
use crate::types::{ClusterName, ServiceIdentity, TaskDefinitionArn};

/// Page size for list queries.
const LIST_PAGE_SIZE: i32 = 10;

/// ECS caps describe-tasks at 100 ARNs per call.
const DESCRIBE_TASKS_BATCH: usize = 100;

const CREDENTIALS_PROVIDER: &str = "ecs-deploy";

/// ECS control plane reached through the AWS SDK.
#[derive(Debug, Clone)]
pub struct EcsPlane {
    client: Client,
}

impl EcsPlane {
    /// Build a client for the given region and credentials.
    ///
    /// Explicit credentials replace the SDK's default provider chain;
    /// otherwise the environment, profile, and instance metadata apply.
    pub async fn connect(settings: AwsSettings) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(settings.region));

        if let Some(creds) = settings.credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id,
                creds.secret_access_key,
                None,
                None,
                CREDENTIALS_PROVIDER,
            ));
        }

        let config = loader.load().await;
        Self::from_client(Client::new(&config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// All tasks of a service with the given desired status.
    async fn service_tasks(
        &self,
        identity: &ServiceIdentity,
        desired: DesiredStatus,
    ) -> Result<Vec<Task>, PlaneError> {
        const LIST: &str = "ListTasks";
        const DESCRIBE: &str = "DescribeTasks";

        let mut arns = Vec::new();
        let mut token = None;
        loop {
            let output = self
                .client
                .list_tasks()
                .set_cluster(cluster_param(&identity.cluster))
                .service_name(identity.service.as_str())
                .desired_status(desired.clone())
                .set_next_token(token)
                .send()
                .await
                .map_err(|e| classify(LIST, e))?;

            arns.extend(output.task_arns().iter().cloned());
            token = output.next_token().map(str::to_string);
            if token.is_none() {
                break;
            }
        }

        let mut tasks = Vec::with_capacity(arns.len());
        for batch in arns.chunks(DESCRIBE_TASKS_BATCH) {
            let output = self
                .client
                .describe_tasks()
                .set_cluster(cluster_param(&identity.cluster))
                .set_tasks(Some(batch.to_vec()))
                .send()
                .await
                .map_err(|e| classify(DESCRIBE, e))?;
            tasks.extend(output.tasks().iter().cloned());
        }

        Ok(tasks)
    }
}

#[async_trait]
impl ControlPlane for EcsPlane {
    async fn describe_service(
        &self,
        identity: &ServiceIdentity,
    ) -> Result<ServiceRecord, DescribeServiceError> {
        const OP: &str = "DescribeServices";

        let output = match self
            .client
            .describe_services()
            .set_cluster(cluster_param(&identity.cluster))
            .services(identity.service.as_str())
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let err = classify(OP, e);
                if matches!(
                    err.code(),
                    Some("ClusterNotFoundException" | "ServiceNotFoundException")
                ) {
                    return Err(DescribeServiceError::NotFound {
                        failures: NonEmpty::new(ServiceFailure::new(
                            identity.to_string(),
                            err.to_string(),
                        )),
                    });
                }
                return Err(err.into());
            }
        };

        let services = output
            .services()
            .iter()
            .map(|s| convert::service_record(OP, s))
            .collect::<Result<Vec<_>, _>>()?;
        let failures = output
            .failures()
            .iter()
            .map(convert::service_failure)
            .collect();

        ServiceDescription { services, failures }.resolve(identity.service.as_str())
    }

    async fn describe_task_definition(
        &self,
        arn: &TaskDefinitionArn,
    ) -> Result<TaskDefinitionRevision, PlaneError> {
        const OP: &str = "DescribeTaskDefinition";

        let output = self
            .client
            .describe_task_definition()
            .task_definition(arn.as_str())
            .include(TaskDefinitionField::Tags)
            .send()
            .await
            .map_err(|e| classify(OP, e))?;

        let document = output
            .task_definition()
            .cloned()
            .ok_or_else(|| PlaneError::MalformedResponse {
                operation: OP,
                message: format!("no task definition returned for {arn}"),
            })?;
        Ok(TaskDefinitionRevision::from_document(OP, document)?.with_tags(output.tags().to_vec()))
    }

    // Elastic Inference is retired but old definitions may still carry accelerators.
    #[allow(deprecated)]
    async fn register_task_definition(
        &self,
        payload: &TaskDefinitionPayload,
    ) -> Result<TaskDefinitionRevision, PlaneError> {
        const OP: &str = "RegisterTaskDefinition";

        let output = self
            .client
            .register_task_definition()
            .family(&payload.family)
            .set_container_definitions(Some(payload.container_definitions.clone()))
            .set_task_role_arn(payload.task_role_arn.clone())
            .set_execution_role_arn(payload.execution_role_arn.clone())
            .set_network_mode(payload.network_mode.clone())
            .set_volumes(non_empty(&payload.volumes))
            .set_placement_constraints(non_empty(&payload.placement_constraints))
            .set_requires_compatibilities(non_empty(&payload.requires_compatibilities))
            .set_cpu(payload.cpu.clone())
            .set_memory(payload.memory.clone())
            .set_pid_mode(payload.pid_mode.clone())
            .set_ipc_mode(payload.ipc_mode.clone())
            .set_proxy_configuration(payload.proxy_configuration.clone())
            .set_inference_accelerators(non_empty(&payload.inference_accelerators))
            .set_ephemeral_storage(payload.ephemeral_storage.clone())
            .set_runtime_platform(payload.runtime_platform.clone())
            .set_enable_fault_injection(payload.enable_fault_injection)
            .set_tags(non_empty(&payload.tags))
            .send()
            .await
            .map_err(|e| classify(OP, e))?;

        let document = output
            .task_definition()
            .cloned()
            .ok_or_else(|| PlaneError::MalformedResponse {
                operation: OP,
                message: "registration returned no task definition".to_string(),
            })?;
        Ok(TaskDefinitionRevision::from_document(OP, document)?.with_tags(output.tags().to_vec()))
    }

    async fn update_service(
        &self,
        identity: &ServiceIdentity,
        revision: &TaskDefinitionArn,
    ) -> Result<(), PlaneError> {
        self.client
            .update_service()
            .set_cluster(cluster_param(&identity.cluster))
            .service(identity.service.as_str())
            .task_definition(revision.as_str())
            .send()
            .await
            .map_err(|e| classify("UpdateService", e))?;
        Ok(())
    }

    async fn describe_running_tasks(
        &self,
        identity: &ServiceIdentity,
        revision: &TaskDefinitionArn,
    ) -> Result<RunningTaskSnapshot, PlaneError> {
        const OP: &str = "DescribeServices";

        let output = self
            .client
            .describe_services()
            .set_cluster(cluster_param(&identity.cluster))
            .services(identity.service.as_str())
            .send()
            .await
            .map_err(|e| classify(OP, e))?;

        let service = output
            .services()
            .first()
            .ok_or_else(|| PlaneError::MalformedResponse {
                operation: OP,
                message: format!("service {identity} disappeared while polling"),
            })?;

        let mut tasks = self
            .service_tasks(identity, DesiredStatus::Running)
            .await?;
        tasks.extend(
            self.service_tasks(identity, DesiredStatus::Stopped)
                .await?,
        );

        Ok(convert::snapshot(service, revision, &tasks))
    }

    async fn list_services(
        &self,
        cluster: &ClusterName,
        token: Option<&str>,
    ) -> Result<Page<String>, PlaneError> {
        let output = self
            .client
            .list_services()
            .set_cluster(cluster_param(cluster))
            .max_results(LIST_PAGE_SIZE)
            .set_next_token(token.map(str::to_string))
            .send()
            .await
            .map_err(|e| classify("ListServices", e))?;

        Ok(Page {
            items: output.service_arns().to_vec(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn list_task_definition_families(
        &self,
        token: Option<&str>,
    ) -> Result<Page<String>, PlaneError> {
        let output = self
            .client
            .list_task_definition_families()
            .max_results(LIST_PAGE_SIZE)
            .set_next_token(token.map(str::to_string))
            .send()
            .await
            .map_err(|e| classify("ListTaskDefinitionFamilies", e))?;

        Ok(Page {
            items: output.families().to_vec(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn list_task_definitions(
        &self,
        family: &str,
        token: Option<&str>,
    ) -> Result<Page<String>, PlaneError> {
        let output = self
            .client
            .list_task_definitions()
            .family_prefix(family)
            .sort(SortOrder::Desc)
            .max_results(LIST_PAGE_SIZE)
            .set_next_token(token.map(str::to_string))
            .send()
            .await
            .map_err(|e| classify("ListTaskDefinitions", e))?;

        Ok(Page {
            items: output.task_definition_arns().to_vec(),
            next_token: output.next_token().map(str::to_string),
        })
    }
}

fn cluster_param(cluster: &ClusterName) -> Option<String> {
    cluster.as_option().map(str::to_string)
}

fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    (!items.is_empty()).then(|| items.to_vec())
}

/// Classify an SDK failure.
fn classify<E, R>(operation: &'static str, err: SdkError<E, R>) -> PlaneError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            PlaneError::Transport { operation, message }
        }
        SdkError::ServiceError(_) => {
            let service_err = err.as_service_error();
            let code = service_err.and_then(|e| e.code());
            let message = service_err
                .and_then(|e| e.message())
                .map(str::to_string)
                .unwrap_or(message);
            classify_code(operation, code, message)
        }
        _ => PlaneError::Rejected {
            operation,
            code: "RequestConstruction".to_string(),
            message,
        },
    }
}

/// Map an AWS error code to a failure class.
pub(crate) fn classify_code(
    operation: &'static str,
    code: Option<&str>,
    message: String,
) -> PlaneError {
    match code {
        Some(
            "ThrottlingException"
            | "Throttling"
            | "TooManyRequestsException"
            | "RequestLimitExceeded",
        ) => PlaneError::Throttled { operation, message },
        Some(
            "AccessDeniedException"
            | "UnrecognizedClientException"
            | "ExpiredTokenException"
            | "InvalidClientTokenId"
            | "InvalidSignatureException"
            | "MissingAuthenticationToken",
        ) => PlaneError::Unauthorized { operation, message },
        // ECS reports its own internal failures as ServerException
        Some("ServerException") => PlaneError::Transport { operation, message },
        Some(code) => PlaneError::Rejected {
            operation,
            code: code.to_string(),
            message,
        },
        None => PlaneError::Rejected {
            operation,
            code: "Unknown".to_string(),
            message,
        },
    }
}
