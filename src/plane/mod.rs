// ABOUTME: ECS control-plane client: capability trait, AWS adapter, and paging.
// ABOUTME: Every remote call the deployment state machine makes goes through here.

mod convert;
mod ecs;
mod error;
mod model;
pub mod pagination;
mod traits;

pub use ecs::EcsPlane;
pub use error::{DescribeServiceError, PlaneError, PlaneErrorKind};
pub use model::{
    HealthState, Page, RolloutPhase, RunningTaskSnapshot, ServiceDescription, ServiceFailure,
    ServiceRecord, TaskDefinitionPayload, TaskDefinitionRevision, TaskState, TaskStatus,
};
pub use pagination::{PageSource, Paginator};
pub use traits::ControlPlane;
