// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines global AWS/output flags and the deploy, services, and taskdefs subcommands.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use ecs_deploy::config::DeployFlags;

#[derive(Parser)]
#[command(name = "ecs-deploy")]
#[command(about = "Blue/green deployments for services on AWS ECS")]
#[command(version, disable_version_flag = true)]
pub struct Cli {
    /// Print version
    #[arg(long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,

    /// AWS access key ID (used together with --aws-secret-key)
    #[arg(short = 'k', long, global = true, value_name = "KEY")]
    pub aws_access_key: Option<String>,

    /// AWS secret access key
    #[arg(short = 's', long, global = true, value_name = "SECRET")]
    pub aws_secret_key: Option<String>,

    /// AWS region [default: $AWS_DEFAULT_REGION, $AWS_REGION, us-east-1]
    #[arg(short = 'r', long, global = true)]
    pub region: Option<String>,

    /// Enable debug logging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short = 'q', long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file [default: ecs-deploy.yml in the current directory]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Runs `deploy` from its environment variables when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy a new image to a service and wait for the rollout
    #[command(visible_alias = "d")]
    Deploy(DeployArgs),

    /// List the services of a cluster
    #[command(visible_alias = "s")]
    Services {
        /// Cluster name or ARN [default: config file cluster, else the default cluster]
        cluster: Option<String>,
    },

    /// List task definition families and their revisions, newest first
    #[command(visible_alias = "t")]
    Taskdefs,
}

#[derive(Args)]
pub struct DeployArgs {
    /// Cluster name or ARN [default: the account's default cluster]
    #[arg(short = 'c', long, env = "AWS_ECS_CLUSTER")]
    pub cluster: Option<String>,

    /// Service to deploy
    #[arg(short = 'n', long = "service-name", env = "AWS_ECS_SERVICE")]
    pub service_name: Option<String>,

    /// Image to deploy, as repository[:tag]
    #[arg(short = 'i', long, env = "DEPLOY_IMAGE")]
    pub image: Option<String>,

    /// Seconds to wait for the rollout [default: 90]
    #[arg(short = 't', long, env = "DEPLOY_TIMEOUT", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Environment variable whose value replaces the image tag
    #[arg(short = 'e', long, env = "TAG_ENV_VAR", value_name = "VAR")]
    pub tag_env_var: Option<String>,

    /// Container that receives the image [default: the one named after the service]
    #[arg(long, value_name = "NAME")]
    pub container: Option<String>,

    /// Seconds between rollout polls [default: 5]
    #[arg(long, value_name = "SECONDS")]
    pub poll_interval: Option<u64>,
}

/// `deploy` arguments read from the environment alone.
#[derive(Parser)]
#[command(name = "ecs-deploy")]
struct EnvDeploy {
    #[command(flatten)]
    args: DeployArgs,
}

impl DeployArgs {
    /// Arguments for `deploy` run as the default command.
    pub fn from_env() -> Result<Self, clap::Error> {
        EnvDeploy::try_parse_from(["ecs-deploy"]).map(|parsed| parsed.args)
    }

    pub fn into_flags(self) -> DeployFlags {
        DeployFlags {
            cluster: self.cluster,
            service: self.service_name,
            image: self.image,
            tag_env_var: self.tag_env_var,
            container: self.container,
            timeout: self.timeout.map(Duration::from_secs),
            poll_interval: self.poll_interval.map(Duration::from_secs),
        }
    }
}
