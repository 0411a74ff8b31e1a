// ABOUTME: Deployment state types for the type state pattern.
// ABOUTME: Each state carries what earlier steps learned, so later steps cannot run early.

use crate::plane::{ServiceRecord, TaskDefinitionRevision};

use super::transform::Transformed;

/// Initial state: request validated, nothing fetched.
/// Available actions: `resolve()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// Service and its current task definition fetched.
/// Available actions: `prepare()`
#[derive(Debug, Clone)]
pub struct Resolved {
    pub(crate) service: ServiceRecord,
    pub(crate) current: TaskDefinitionRevision,
}

/// Next revision's payload built locally.
/// Available actions: `register()`
#[derive(Debug, Clone)]
pub struct Prepared {
    pub(crate) service: ServiceRecord,
    pub(crate) current: TaskDefinitionRevision,
    pub(crate) transformed: Transformed,
}

/// New revision registered remotely; service still on the old one.
/// Available actions: `update_service()`
#[derive(Debug, Clone)]
pub struct Registered {
    pub(crate) service: ServiceRecord,
    pub(crate) registered: TaskDefinitionRevision,
}

/// Service update accepted; rollout under way.
/// Available actions: `monitor()`
#[derive(Debug, Clone)]
pub struct Updated {
    pub(crate) service: ServiceRecord,
    pub(crate) registered: TaskDefinitionRevision,
}
