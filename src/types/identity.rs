// ABOUTME: Cluster and service identity addressed by every control-plane call.
// ABOUTME: An empty cluster name means the account's default cluster.

use std::fmt;

use super::service_name::ServiceName;

/// A cluster name or ARN. Empty selects the default cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ClusterName(Option<String>);

impl ClusterName {
    pub fn new(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self(None)
        } else {
            Self(Some(trimmed.to_string()))
        }
    }

    /// The default cluster.
    pub fn default_cluster() -> Self {
        Self(None)
    }

    /// The name to send to ECS, or `None` to let ECS pick the default cluster.
    pub fn as_option(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_default(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for ClusterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "default"),
        }
    }
}

/// The one service a deployment targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceIdentity {
    pub cluster: ClusterName,
    pub service: ServiceName,
}

impl ServiceIdentity {
    pub fn new(cluster: ClusterName, service: ServiceName) -> Self {
        Self { cluster, service }
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster, self.service)
    }
}
