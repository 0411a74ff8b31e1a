// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: State types carry their own data for compile-time guarantees.

use crate::plane::{ServiceRecord, TaskDefinitionRevision};
use crate::types::{ImageRef, ServiceIdentity};

use super::request::DeploymentRequest;
use super::state::{Initialized, Prepared, Registered, Resolved, Updated};
use super::transform::Transformed;

/// A deployment in progress, parameterized by its current state.
///
/// The state type parameter `S` carries what earlier steps produced (the
/// resolved service, the registered revision), so a step that needs it
/// cannot be called before the step that provides it.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) request: DeploymentRequest,
    pub(crate) state: S,
}

impl Deployment<Initialized> {
    pub fn new(request: DeploymentRequest) -> Self {
        Deployment {
            request,
            state: Initialized,
        }
    }
}

impl<S> Deployment<S> {
    pub fn request(&self) -> &DeploymentRequest {
        &self.request
    }

    pub fn identity(&self) -> &ServiceIdentity {
        self.request.identity()
    }

    pub fn image(&self) -> &ImageRef {
        self.request.image()
    }
}

impl Deployment<Resolved> {
    pub fn service(&self) -> &ServiceRecord {
        &self.state.service
    }

    /// The revision the service runs before this deployment.
    pub fn current(&self) -> &TaskDefinitionRevision {
        &self.state.current
    }
}

impl Deployment<Prepared> {
    pub fn service(&self) -> &ServiceRecord {
        &self.state.service
    }

    pub fn current(&self) -> &TaskDefinitionRevision {
        &self.state.current
    }

    pub fn transformed(&self) -> &Transformed {
        &self.state.transformed
    }
}

impl Deployment<Registered> {
    pub fn service(&self) -> &ServiceRecord {
        &self.state.service
    }

    pub fn registered(&self) -> &TaskDefinitionRevision {
        &self.state.registered
    }
}

impl Deployment<Updated> {
    pub fn service(&self) -> &ServiceRecord {
        &self.state.service
    }

    pub fn registered(&self) -> &TaskDefinitionRevision {
        &self.state.registered
    }
}
