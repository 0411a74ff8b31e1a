// ABOUTME: Control-plane error types with SNAFU pattern.
// ABOUTME: Classifies ECS failures so callers can decide what is safe to retry.

use nonempty::NonEmpty;
use snafu::Snafu;

use super::model::ServiceFailure;

/// A failed control-plane call.
///
/// The client never retries; `is_transient` tells the caller whether a
/// read may be attempted again.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PlaneError {
    #[snafu(display("{operation}: transport failure: {message}"))]
    Transport {
        operation: &'static str,
        message: String,
    },

    #[snafu(display("{operation}: request throttled: {message}"))]
    Throttled {
        operation: &'static str,
        message: String,
    },

    #[snafu(display("{operation}: not authorized: {message}"))]
    Unauthorized {
        operation: &'static str,
        message: String,
    },

    #[snafu(display("{operation}: {code}: {message}"))]
    Rejected {
        operation: &'static str,
        code: String,
        message: String,
    },

    #[snafu(display("{operation}: malformed response: {message}"))]
    MalformedResponse {
        operation: &'static str,
        message: String,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneErrorKind {
    /// Network failure, timeout, or unreadable response.
    Transport,
    /// Rate limited by the API.
    Throttled,
    /// Credentials missing, expired, or lacking permission.
    Unauthorized,
    /// The API refused the request.
    Rejected,
    /// The API answered without a field we rely on.
    MalformedResponse,
}

impl PlaneError {
    pub fn kind(&self) -> PlaneErrorKind {
        match self {
            PlaneError::Transport { .. } => PlaneErrorKind::Transport,
            PlaneError::Throttled { .. } => PlaneErrorKind::Throttled,
            PlaneError::Unauthorized { .. } => PlaneErrorKind::Unauthorized,
            PlaneError::Rejected { .. } => PlaneErrorKind::Rejected,
            PlaneError::MalformedResponse { .. } => PlaneErrorKind::MalformedResponse,
        }
    }

    /// Whether repeating the same read could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            PlaneErrorKind::Transport | PlaneErrorKind::Throttled
        )
    }

    /// The API error code, when the API rejected the request.
    pub fn code(&self) -> Option<&str> {
        match self {
            PlaneError::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            PlaneError::Transport { operation, .. }
            | PlaneError::Throttled { operation, .. }
            | PlaneError::Unauthorized { operation, .. }
            | PlaneError::Rejected { operation, .. }
            | PlaneError::MalformedResponse { operation, .. } => operation,
        }
    }
}

/// Errors resolving a service to exactly one live record.
#[derive(Debug, thiserror::Error)]
pub enum DescribeServiceError {
    /// ECS could not resolve the service.
    #[error("service not found: {}", format_failures(.failures))]
    NotFound { failures: NonEmpty<ServiceFailure> },

    /// More than one service answered to the name.
    #[error("service name is ambiguous: {count} services matched")]
    Ambiguous { count: usize },

    #[error(transparent)]
    Plane(#[from] PlaneError),
}

impl DescribeServiceError {
    /// Whether repeating the describe call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DescribeServiceError::Plane(e) if e.is_transient())
    }
}

fn format_failures(failures: &NonEmpty<ServiceFailure>) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_throttling_are_transient() {
        let transport = PlaneError::Transport {
            operation: "DescribeServices",
            message: "connection reset".to_string(),
        };
        let throttled = PlaneError::Throttled {
            operation: "DescribeServices",
            message: "Rate exceeded".to_string(),
        };
        assert!(transport.is_transient());
        assert!(throttled.is_transient());
    }

    #[test]
    fn rejection_is_not_transient() {
        let err = PlaneError::Rejected {
            operation: "RegisterTaskDefinition",
            code: "ClientException".to_string(),
            message: "Invalid container definition".to_string(),
        };
        assert!(!err.is_transient());
        assert_eq!(err.code(), Some("ClientException"));
        assert_eq!(err.operation(), "RegisterTaskDefinition");
        assert!(err.to_string().contains("ClientException"));
    }

    #[test]
    fn not_found_lists_every_failure() {
        let failures = NonEmpty::from_vec(vec![
            ServiceFailure::new("arn:aws:ecs:us-east-1:1:service/web", "MISSING"),
            ServiceFailure::new("arn:aws:ecs:us-east-1:1:service/web", "INACTIVE"),
        ])
        .unwrap();
        let err = DescribeServiceError::NotFound { failures };
        let message = err.to_string();
        assert!(message.contains("MISSING"));
        assert!(message.contains("INACTIVE"));
        assert!(!err.is_transient());
    }
}
