// ABOUTME: Deployment request validation.
// ABOUTME: Turns raw operator input into an immutable, validated DeploymentRequest.

use std::time::Duration;

use crate::diagnostics::{Diagnostics, Warning};
use crate::types::{
    ClusterName, ImageRef, ParseImageRefError, ServiceIdentity, ServiceName, ServiceNameError,
};

/// Input rejected before any remote call is made.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("service name not specified")]
    MissingService,

    #[error("invalid service name: {0}")]
    InvalidService(ServiceNameError),

    #[error("image not specified")]
    MissingImage,

    #[error("invalid image: {0}")]
    InvalidImage(ParseImageRefError),

    #[error("invalid tag in ${var}: {error}")]
    InvalidTagOverride {
        var: String,
        error: ParseImageRefError,
    },

    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

/// Raw deploy parameters as gathered from flags, environment, and config.
#[derive(Debug, Clone, Default)]
pub struct DeployInput {
    pub cluster: String,
    pub service: String,
    pub image: String,
    /// Name of an environment variable whose value replaces the image tag.
    pub tag_env_var: Option<String>,
    /// Container to receive the image, overriding name matching.
    pub container: Option<String>,
    pub timeout: Duration,
}

impl DeployInput {
    /// Validate against the process environment.
    pub fn validate(self, diag: &mut Diagnostics) -> Result<DeploymentRequest, ValidationError> {
        self.validate_with(diag, |name| std::env::var(name).ok())
    }

    /// Validate with an explicit environment lookup for the tag override.
    pub fn validate_with(
        self,
        diag: &mut Diagnostics,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<DeploymentRequest, ValidationError> {
        if self.service.trim().is_empty() {
            return Err(ValidationError::MissingService);
        }
        let service = ServiceName::new(&self.service).map_err(ValidationError::InvalidService)?;

        if self.image.trim().is_empty() {
            return Err(ValidationError::MissingImage);
        }
        let mut image = ImageRef::parse(&self.image).map_err(ValidationError::InvalidImage)?;

        if let Some(var) = self.tag_env_var.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            match env(var).filter(|v| !v.trim().is_empty()) {
                Some(tag) => {
                    image = image
                        .with_tag(&tag)
                        .map_err(|error| ValidationError::InvalidTagOverride {
                            var: var.to_string(),
                            error,
                        })?;
                }
                None => diag.warn(Warning::tag_override_unset(format!(
                    "${var} is unset or empty; keeping tag `{}`",
                    image.tag()
                ))),
            }
        }

        if self.timeout.is_zero() {
            return Err(ValidationError::ZeroTimeout);
        }

        let container = self
            .container
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(DeploymentRequest {
            identity: ServiceIdentity::new(ClusterName::new(&self.cluster), service),
            image,
            timeout: self.timeout,
            container,
        })
    }
}

/// A validated request to deploy one image to one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    identity: ServiceIdentity,
    image: ImageRef,
    timeout: Duration,
    container: Option<String>,
}

impl DeploymentRequest {
    pub fn new(identity: ServiceIdentity, image: ImageRef, timeout: Duration) -> Self {
        Self {
            identity,
            image,
            timeout,
            container: None,
        }
    }

    /// Send the image to this container instead of matching by name.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::WarningKind;

    fn input() -> DeployInput {
        DeployInput {
            cluster: "prod".to_string(),
            service: "web".to_string(),
            image: "registry.example.com/web:1.0".to_string(),
            tag_env_var: None,
            container: None,
            timeout: Duration::from_secs(90),
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn valid_input_builds_request() {
        let mut diag = Diagnostics::default();
        let request = input().validate_with(&mut diag, no_env).unwrap();
        assert_eq!(request.identity().service.as_str(), "web");
        assert_eq!(request.identity().cluster.as_option(), Some("prod"));
        assert_eq!(request.image().to_string(), "registry.example.com/web:1.0");
        assert!(request.container().is_none());
        assert!(!diag.has_warnings());
    }

    #[test]
    fn empty_service_is_rejected() {
        let mut diag = Diagnostics::default();
        let err = DeployInput {
            service: "  ".to_string(),
            ..input()
        }
        .validate_with(&mut diag, no_env)
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingService);
    }

    #[test]
    fn empty_image_is_rejected() {
        let mut diag = Diagnostics::default();
        let err = DeployInput {
            image: String::new(),
            ..input()
        }
        .validate_with(&mut diag, no_env)
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingImage);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut diag = Diagnostics::default();
        let err = DeployInput {
            timeout: Duration::ZERO,
            ..input()
        }
        .validate_with(&mut diag, no_env)
        .unwrap_err();
        assert_eq!(err, ValidationError::ZeroTimeout);
    }

    #[test]
    fn empty_cluster_means_default_cluster() {
        let mut diag = Diagnostics::default();
        let request = DeployInput {
            cluster: String::new(),
            ..input()
        }
        .validate_with(&mut diag, no_env)
        .unwrap();
        assert!(request.identity().cluster.is_default());
    }

    #[test]
    fn tag_override_replaces_parsed_tag() {
        let mut diag = Diagnostics::default();
        let request = DeployInput {
            tag_env_var: Some("BUILD_TAG".to_string()),
            ..input()
        }
        .validate_with(&mut diag, |name| {
            (name == "BUILD_TAG").then(|| "git-3f2a9c1".to_string())
        })
        .unwrap();
        assert_eq!(
            request.image().to_string(),
            "registry.example.com/web:git-3f2a9c1"
        );
    }

    #[test]
    fn unset_tag_override_keeps_tag_and_warns() {
        let mut diag = Diagnostics::default();
        let request = DeployInput {
            tag_env_var: Some("BUILD_TAG".to_string()),
            ..input()
        }
        .validate_with(&mut diag, |_| Some(String::new()))
        .unwrap();
        assert_eq!(request.image().tag(), "1.0");
        assert_eq!(diag.count(WarningKind::TagOverrideUnset), 1);
    }

    #[test]
    fn malformed_tag_override_is_rejected() {
        let mut diag = Diagnostics::default();
        let err = DeployInput {
            tag_env_var: Some("BUILD_TAG".to_string()),
            ..input()
        }
        .validate_with(&mut diag, |_| Some("-bad".to_string()))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTagOverride { .. }));
    }

    #[test]
    fn blank_container_is_ignored() {
        let mut diag = Diagnostics::default();
        let request = DeployInput {
            container: Some(" ".to_string()),
            ..input()
        }
        .validate_with(&mut diag, no_env)
        .unwrap();
        assert!(request.container().is_none());
    }
}
