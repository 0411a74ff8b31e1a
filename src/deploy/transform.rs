// ABOUTME: Builds the next task definition revision from the current one.
// ABOUTME: Replaces one container's image and copies every other field unchanged.

use aws_sdk_ecs::types::ContainerDefinition;

use crate::plane::{TaskDefinitionPayload, TaskDefinitionRevision};
use crate::types::ImageRef;

use super::request::DeploymentRequest;

/// Which container receives the new image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerSelector<'a> {
    /// Exactly the container with this name.
    Named(&'a str),
    /// The container named after this service, else the only container.
    Service(&'a str),
}

impl<'a> ContainerSelector<'a> {
    pub fn for_request(request: &'a DeploymentRequest) -> Self {
        match request.container() {
            Some(name) => ContainerSelector::Named(name),
            None => ContainerSelector::Service(request.identity().service.short_name()),
        }
    }
}

/// How the target container was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Named,
    ServiceName,
    /// No name matched; the definition has a single container.
    SoleContainer,
}

/// The registration payload for the next revision.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub payload: TaskDefinitionPayload,
    /// Name of the container whose image was replaced.
    pub container: String,
    pub selection: Selection,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("task definition {revision} has no container definitions")]
    NoContainers { revision: String },

    #[error(
        "task definition {revision} has no container named `{name}` (containers: {})",
        .available.join(", ")
    )]
    NoSuchContainer {
        revision: String,
        name: String,
        available: Vec<String>,
    },

    #[error(
        "task definition {revision} has no container named `{service}` and several candidates ({}); pass --container",
        .candidates.join(", ")
    )]
    AmbiguousContainer {
        revision: String,
        service: String,
        candidates: Vec<String>,
    },
}

/// Build the payload for a new revision running `image`.
///
/// The result differs from the current revision only in the selected
/// container's `image`.
///
/// # Errors
///
/// Returns `TransformError` when no single container can be selected.
pub fn transform(
    revision: &TaskDefinitionRevision,
    image: &ImageRef,
    selector: ContainerSelector<'_>,
) -> Result<Transformed, TransformError> {
    let mut payload = TaskDefinitionPayload::from_revision(revision);
    let (index, selection) = select(&payload.container_definitions, selector, revision)?;

    let container = &mut payload.container_definitions[index];
    container.image = Some(image.to_string());
    let name = container.name().unwrap_or_default().to_string();

    tracing::debug!(
        revision = %revision,
        container = %name,
        image = %image,
        "replaced container image"
    );

    Ok(Transformed {
        payload,
        container: name,
        selection,
    })
}

fn select(
    containers: &[ContainerDefinition],
    selector: ContainerSelector<'_>,
    revision: &TaskDefinitionRevision,
) -> Result<(usize, Selection), TransformError> {
    if containers.is_empty() {
        return Err(TransformError::NoContainers {
            revision: revision.to_string(),
        });
    }

    let position = |name: &str| containers.iter().position(|c| c.name() == Some(name));

    match selector {
        ContainerSelector::Named(name) => position(name)
            .map(|index| (index, Selection::Named))
            .ok_or_else(|| TransformError::NoSuchContainer {
                revision: revision.to_string(),
                name: name.to_string(),
                available: names(containers),
            }),
        ContainerSelector::Service(service) => {
            if let Some(index) = position(service) {
                Ok((index, Selection::ServiceName))
            } else if containers.len() == 1 {
                Ok((0, Selection::SoleContainer))
            } else {
                Err(TransformError::AmbiguousContainer {
                    revision: revision.to_string(),
                    service: service.to_string(),
                    candidates: names(containers),
                })
            }
        }
    }
}

fn names(containers: &[ContainerDefinition]) -> Vec<String> {
    containers
        .iter()
        .map(|c| c.name().unwrap_or("<unnamed>").to_string())
        .collect()
}
