// ABOUTME: AWS region and credential resolution.
// ABOUTME: Explicit flag, then AWS_DEFAULT_REGION, then AWS_REGION, then us-east-1.

use std::fmt;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_REGION_VAR: &str = "AWS_DEFAULT_REGION";
pub const REGION_VAR: &str = "AWS_REGION";

/// Access key pair supplied on the command line.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

// Keep the secret out of logs.
impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Where and as whom to talk to AWS. Resolved once, then passed by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    pub region: String,
    /// `None` leaves credentials to the SDK's default provider chain.
    pub credentials: Option<StaticCredentials>,
}

impl AwsSettings {
    /// Resolve from flags and the process environment.
    pub fn resolve(
        region: Option<&str>,
        access_key: Option<&str>,
        secret_key: Option<&str>,
    ) -> Self {
        Self::resolve_with(region, access_key, secret_key, |name| {
            std::env::var(name).ok()
        })
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with(
        region: Option<&str>,
        access_key: Option<&str>,
        secret_key: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let region = non_blank(region)
            .map(str::to_string)
            .or_else(|| env(DEFAULT_REGION_VAR).filter(|v| !v.trim().is_empty()))
            .or_else(|| env(REGION_VAR).filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        // Both halves are required to override the default chain
        let credentials = match (non_blank(access_key), non_blank(secret_key)) {
            (Some(id), Some(secret)) => Some(StaticCredentials {
                access_key_id: id.to_string(),
                secret_access_key: secret.to_string(),
            }),
            _ => None,
        };

        tracing::debug!(
            region = %region,
            static_credentials = credentials.is_some(),
            "resolved AWS settings"
        );

        Self {
            region,
            credentials,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
