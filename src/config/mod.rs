// ABOUTME: Configuration types and parsing for ecs-deploy.yml.
// ABOUTME: Handles YAML parsing, file discovery, and merging flags over file values.

mod aws;

pub use aws::{AwsSettings, DEFAULT_REGION, DEFAULT_REGION_VAR, REGION_VAR, StaticCredentials};

use crate::deploy::{DeployInput, MonitorSettings};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "ecs-deploy.yml";
pub const CONFIG_FILENAME_ALT: &str = "ecs-deploy.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".ecs-deploy/config.yml";

/// How long `deploy` waits for the rollout when nothing else says.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Project defaults for `deploy`. Every field is optional; flags win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub cluster: Option<String>,

    #[serde(default)]
    pub service: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    /// Container that receives the image.
    #[serde(default)]
    pub container: Option<String>,

    #[serde(default)]
    pub tag_env_var: Option<String>,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    #[serde(default, with = "humantime_serde")]
    pub poll_interval: Option<Duration>,

    #[serde(default)]
    pub max_task_failures: Option<u32>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find a config file in `dir`. A missing file is not an error.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load(path).map(Some);
            }
        }

        Ok(None)
    }

    /// Load `explicit` if given (it must exist), otherwise discover in `dir`.
    pub fn locate(explicit: Option<&Path>, dir: &Path) -> Result<Option<Self>> {
        match explicit {
            Some(path) if !path.exists() => Err(Error::ConfigNotFound(path.to_path_buf())),
            Some(path) => Self::load(path).map(Some),
            None => Self::discover(dir),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidConfig("timeout must be greater than zero".into()));
        }
        if self.poll_interval.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidConfig(
                "poll_interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Values given on the command line or through their environment variables.
#[derive(Debug, Clone, Default)]
pub struct DeployFlags {
    pub cluster: Option<String>,
    pub service: Option<String>,
    pub image: Option<String>,
    pub tag_env_var: Option<String>,
    pub container: Option<String>,
    pub timeout: Option<Duration>,
    pub poll_interval: Option<Duration>,
}

/// Fully merged inputs for one deployment.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    pub input: DeployInput,
    pub monitor: MonitorSettings,
}

impl DeployFlags {
    /// Merge flags over the config file over built-in defaults.
    ///
    /// Empty flag values count as absent so that an exported but blank
    /// environment variable does not hide the file's value.
    pub fn merge(self, file: Option<&Config>) -> DeploySettings {
        let file = file.cloned().unwrap_or_default();
        let defaults = MonitorSettings::default();

        let input = DeployInput {
            cluster: pick(self.cluster, file.cluster).unwrap_or_default(),
            service: pick(self.service, file.service).unwrap_or_default(),
            image: pick(self.image, file.image).unwrap_or_default(),
            tag_env_var: pick(self.tag_env_var, file.tag_env_var),
            container: pick(self.container, file.container),
            timeout: self.timeout.or(file.timeout).unwrap_or(DEFAULT_TIMEOUT),
        };

        let monitor = MonitorSettings {
            poll_interval: self
                .poll_interval
                .filter(|d| !d.is_zero())
                .or(file.poll_interval)
                .unwrap_or(defaults.poll_interval),
            max_task_failures: file
                .max_task_failures
                .unwrap_or(defaults.max_task_failures),
            max_backoff: defaults.max_backoff,
        };

        DeploySettings { input, monitor }
    }
}

fn pick(flag: Option<String>, file: Option<String>) -> Option<String> {
    flag.filter(|v| !v.trim().is_empty())
        .or(file.filter(|v| !v.trim().is_empty()))
}
