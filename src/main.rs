// ABOUTME: Entry point for the ecs-deploy CLI application.
// ABOUTME: Parses arguments, sets up logging and output, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use clap::error::ErrorKind;
use cli::{Cli, Commands, DeployArgs};
use ecs_deploy::config::{AwsSettings, Config};
use ecs_deploy::error::Result;
use ecs_deploy::output::{Output, OutputMode};
use ecs_deploy::types::ClusterName;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let mut cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => exit_with_usage(e),
    };
    let command = match cli.command.take() {
        Some(command) => command,
        None => match DeployArgs::from_env() {
            Ok(args) => Commands::Deploy(args),
            Err(e) => exit_with_usage(e),
        },
    };

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli, command, &mut output).await {
        if !e.already_reported() {
            output.error(&e.to_string());
        }
        std::process::exit(e.exit_code());
    }
}

/// Print a clap message and exit. Usage errors exit 1, keeping 2 for a timed-out rollout.
fn exit_with_usage(e: clap::Error) -> ! {
    let code = match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    };
    let _ = e.print();
    std::process::exit(code);
}

async fn run(cli: Cli, command: Commands, output: &mut Output) -> Result<()> {
    let aws = AwsSettings::resolve(
        cli.region.as_deref(),
        cli.aws_access_key.as_deref(),
        cli.aws_secret_key.as_deref(),
    );
    let cwd = env::current_dir()?;

    match command {
        Commands::Deploy(args) => {
            let file = Config::locate(cli.config.as_deref(), &cwd)?;
            let settings = args.into_flags().merge(file.as_ref());
            commands::deploy(settings, aws, output).await
        }
        Commands::Services { cluster } => {
            let cluster = match cluster {
                Some(cluster) => cluster,
                None => Config::locate(cli.config.as_deref(), &cwd)?
                    .and_then(|c| c.cluster)
                    .unwrap_or_default(),
            };
            commands::services(ClusterName::new(&cluster), aws, output).await
        }
        Commands::Taskdefs => commands::taskdefs(aws, output).await,
    }
}
