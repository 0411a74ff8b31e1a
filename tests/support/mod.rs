// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted in-memory control plane and fixture builders.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_ecs::types::{ContainerDefinition, TaskDefinition};
use ecs_deploy::deploy::DeploymentRequest;
use ecs_deploy::plane::{
    ControlPlane, DescribeServiceError, HealthState, Page, PlaneError, RunningTaskSnapshot,
    ServiceRecord, TaskDefinitionPayload, TaskDefinitionRevision, TaskState, TaskStatus,
};
use ecs_deploy::types::{
    ClusterName, ImageRef, ServiceArn, ServiceIdentity, ServiceName, TaskArn, TaskDefinitionArn,
};
use parking_lot::Mutex;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("ecs_deploy=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const ACCOUNT_PREFIX: &str = "arn:aws:ecs:us-east-1:123456789012";

pub fn task_definition_arn(family: &str, revision: u32) -> TaskDefinitionArn {
    TaskDefinitionArn::new(format!("{ACCOUNT_PREFIX}:task-definition/{family}:{revision}"))
}

/// A task definition revision with the given `(name, image)` containers.
pub fn revision(family: &str, number: u32, containers: &[(&str, &str)]) -> TaskDefinitionRevision {
    let definitions = containers
        .iter()
        .map(|(name, image)| {
            ContainerDefinition::builder()
                .name(*name)
                .image(*image)
                .cpu(256)
                .memory(512)
                .essential(true)
                .build()
        })
        .collect();
    document_revision(family, number, definitions)
}

pub fn document_revision(
    family: &str,
    number: u32,
    containers: Vec<ContainerDefinition>,
) -> TaskDefinitionRevision {
    let document = TaskDefinition::builder()
        .task_definition_arn(task_definition_arn(family, number).as_str())
        .family(family)
        .revision(number as i32)
        .cpu("512")
        .memory("1024")
        .set_container_definitions(Some(containers))
        .build();
    TaskDefinitionRevision::from_document("DescribeTaskDefinition", document).unwrap()
}

pub fn service_record(name: &str, task_definition: TaskDefinitionArn, desired: u32) -> ServiceRecord {
    ServiceRecord {
        arn: ServiceArn::new(format!("{ACCOUNT_PREFIX}:service/prod/{name}")),
        name: name.to_string(),
        status: "ACTIVE".to_string(),
        task_definition,
        desired_count: desired,
    }
}

pub fn identity(service: &str) -> ServiceIdentity {
    ServiceIdentity::new(ClusterName::new("prod"), ServiceName::new(service).unwrap())
}

pub fn request(service: &str, image: &str, timeout: Duration) -> DeploymentRequest {
    DeploymentRequest::new(identity(service), ImageRef::parse(image).unwrap(), timeout)
}

/// `running` healthy tasks out of `desired`, the rest pending.
pub fn snapshot(running: u32, desired: u32) -> RunningTaskSnapshot {
    let tasks = (0..running)
        .map(|i| TaskStatus {
            task_arn: TaskArn::new(format!("{ACCOUNT_PREFIX}:task/prod/{i}")),
            last_status: TaskState::Running,
            health: HealthState::Healthy,
            stopped_reason: None,
        })
        .collect();
    RunningTaskSnapshot {
        desired_count: desired,
        running_count: running,
        pending_count: desired.saturating_sub(running),
        tasks,
        ..Default::default()
    }
}

pub fn transport_error(operation: &'static str) -> PlaneError {
    PlaneError::Transport {
        operation,
        message: "connection reset by peer".to_string(),
    }
}

pub fn rejected(operation: &'static str, code: &str) -> PlaneError {
    PlaneError::Rejected {
        operation,
        code: code.to_string(),
        message: "request rejected".to_string(),
    }
}

/// A control-plane call the fake received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    DescribeService(ServiceIdentity),
    DescribeTaskDefinition(TaskDefinitionArn),
    Register(TaskDefinitionPayload),
    UpdateService(TaskDefinitionArn),
    DescribeRunningTasks(TaskDefinitionArn),
    ListServices(Option<String>),
    ListFamilies(Option<String>),
    ListTaskDefinitions(String, Option<String>),
}

struct Script {
    describe_errors: VecDeque<DescribeServiceError>,
    service: ServiceRecord,
    current: TaskDefinitionRevision,
    describe_task_definition_errors: VecDeque<PlaneError>,
    register_error: Option<PlaneError>,
    update_error: Option<PlaneError>,
    polls: VecDeque<Result<RunningTaskSnapshot, PlaneError>>,
    last_poll: RunningTaskSnapshot,
    service_pages: Vec<Vec<String>>,
    service_page_errors: Vec<(usize, PlaneError)>,
    calls: Vec<Call>,
}

/// In-memory `ControlPlane` that replays scripted answers and records calls.
///
/// Starts with service `web` in cluster `prod` running `web:7` (one
/// container `web` with image `app:1.0`) at desired count 2.
pub struct FakePlane {
    script: Mutex<Script>,
}

impl Default for FakePlane {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlane {
    pub fn new() -> Self {
        let current = revision("web", 7, &[("web", "app:1.0")]);
        let service = service_record("web", current.arn().clone(), 2);
        Self {
            script: Mutex::new(Script {
                describe_errors: VecDeque::new(),
                service,
                current,
                describe_task_definition_errors: VecDeque::new(),
                register_error: None,
                update_error: None,
                polls: VecDeque::new(),
                last_poll: snapshot(0, 2),
                service_pages: Vec::new(),
                service_page_errors: Vec::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// Serve this revision as the service's current task definition.
    pub fn with_current(self, current: TaskDefinitionRevision) -> Self {
        {
            let mut script = self.script.lock();
            script.service.task_definition = current.arn().clone();
            script.current = current;
        }
        self
    }

    /// Fail the next describe-service call with `error`. Queued in order.
    pub fn with_describe_error(self, error: DescribeServiceError) -> Self {
        self.script.lock().describe_errors.push_back(error);
        self
    }

    pub fn with_describe_task_definition_error(self, error: PlaneError) -> Self {
        self.script
            .lock()
            .describe_task_definition_errors
            .push_back(error);
        self
    }

    pub fn with_register_error(self, error: PlaneError) -> Self {
        self.script.lock().register_error = Some(error);
        self
    }

    pub fn with_update_error(self, error: PlaneError) -> Self {
        self.script.lock().update_error = Some(error);
        self
    }

    /// Answers for successive polls. The last snapshot repeats once these run out.
    pub fn with_polls(self, polls: Vec<Result<RunningTaskSnapshot, PlaneError>>) -> Self {
        self.script.lock().polls.extend(polls);
        self
    }

    /// Pages served by `list_services`, in order. Served again after a restart.
    pub fn with_service_pages(self, pages: Vec<Vec<String>>) -> Self {
        self.script.lock().service_pages = pages;
        self
    }

    /// Fail the next fetch of page `index` with `error`. Later fetches succeed.
    pub fn with_service_page_error(self, index: usize, error: PlaneError) -> Self {
        self.script.lock().service_page_errors.push((index, error));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().calls.clone()
    }

    pub fn register_calls(&self) -> Vec<TaskDefinitionPayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Register(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn update_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::UpdateService(_)))
    }

    pub fn poll_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::DescribeRunningTasks(_)))
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.script.lock().calls.iter().filter(|c| predicate(c)).count()
    }
}

#[async_trait]
impl ControlPlane for FakePlane {
    async fn describe_service(
        &self,
        identity: &ServiceIdentity,
    ) -> Result<ServiceRecord, DescribeServiceError> {
        let mut script = self.script.lock();
        script.calls.push(Call::DescribeService(identity.clone()));
        match script.describe_errors.pop_front() {
            Some(error) => Err(error),
            None => Ok(script.service.clone()),
        }
    }

    async fn describe_task_definition(
        &self,
        arn: &TaskDefinitionArn,
    ) -> Result<TaskDefinitionRevision, PlaneError> {
        let mut script = self.script.lock();
        script.calls.push(Call::DescribeTaskDefinition(arn.clone()));
        if let Some(error) = script.describe_task_definition_errors.pop_front() {
            return Err(error);
        }
        if arn == script.current.arn() {
            Ok(script.current.clone())
        } else {
            Err(rejected("DescribeTaskDefinition", "ClientException"))
        }
    }

    async fn register_task_definition(
        &self,
        payload: &TaskDefinitionPayload,
    ) -> Result<TaskDefinitionRevision, PlaneError> {
        let mut script = self.script.lock();
        script.calls.push(Call::Register(payload.clone()));
        if let Some(error) = script.register_error.take() {
            return Err(error);
        }
        let next = script.current.revision() + 1;
        Ok(document_revision(
            &payload.family,
            next,
            payload.container_definitions.clone(),
        )
        .with_tags(payload.tags.clone()))
    }

    async fn update_service(
        &self,
        _identity: &ServiceIdentity,
        revision: &TaskDefinitionArn,
    ) -> Result<(), PlaneError> {
        let mut script = self.script.lock();
        script.calls.push(Call::UpdateService(revision.clone()));
        match script.update_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn describe_running_tasks(
        &self,
        _identity: &ServiceIdentity,
        revision: &TaskDefinitionArn,
    ) -> Result<RunningTaskSnapshot, PlaneError> {
        let mut script = self.script.lock();
        script.calls.push(Call::DescribeRunningTasks(revision.clone()));
        match script.polls.pop_front() {
            Some(Ok(snapshot)) => {
                script.last_poll = snapshot.clone();
                Ok(snapshot)
            }
            Some(Err(error)) => Err(error),
            None => Ok(script.last_poll.clone()),
        }
    }

    async fn list_services(
        &self,
        _cluster: &ClusterName,
        token: Option<&str>,
    ) -> Result<Page<String>, PlaneError> {
        let mut script = self.script.lock();
        script.calls.push(Call::ListServices(token.map(str::to_string)));
        let index: usize = token.and_then(|t| t.parse().ok()).unwrap_or(0);
        if let Some(pos) = script
            .service_page_errors
            .iter()
            .position(|(at, _)| *at == index)
        {
            return Err(script.service_page_errors.remove(pos).1);
        }
        let total = script.service_pages.len();
        match script.service_pages.get(index) {
            None => Ok(Page::last(Vec::new())),
            Some(page) => {
                let next_token = (index + 1 < total).then(|| (index + 1).to_string());
                Ok(Page {
                    items: page.clone(),
                    next_token,
                })
            }
        }
    }

    async fn list_task_definition_families(
        &self,
        token: Option<&str>,
    ) -> Result<Page<String>, PlaneError> {
        let mut script = self.script.lock();
        script.calls.push(Call::ListFamilies(token.map(str::to_string)));
        Ok(Page::last(vec![script.current.family().to_string()]))
    }

    async fn list_task_definitions(
        &self,
        family: &str,
        token: Option<&str>,
    ) -> Result<Page<String>, PlaneError> {
        let mut script = self.script.lock();
        script.calls.push(Call::ListTaskDefinitions(
            family.to_string(),
            token.map(str::to_string),
        ));
        Ok(Page::last(vec![script.current.arn().to_string()]))
    }
}
