// ABOUTME: Entry point for the clusterops CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use clusterops::error::Result;
use clusterops::output::{Output, OutputMode};
use commands::{Environment, ServiceCommand};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

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

    if let Err(e) = run(cli.command, Output::new(mode)).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands, output: Output) -> Result<()> {
    let env = Environment::load()?;
    match command {
        Commands::Display {
            cluster,
            roles,
            nodes,
        } => commands::display(&env, &cluster, roles, nodes, output).await,
        Commands::Prune { cluster, dry_run } => {
            commands::prune(&env, &cluster, dry_run, output).await
        }
        Commands::Start { cluster, roles } => {
            commands::service(&env, &cluster, ServiceCommand::Start, &roles, output).await
        }
        Commands::Stop { cluster, roles } => {
            commands::service(&env, &cluster, ServiceCommand::Stop, &roles, output).await
        }
        Commands::Restart { cluster, roles } => {
            commands::service(&env, &cluster, ServiceCommand::Restart, &roles, output).await
        }
        Commands::PushConfig { cluster, roles } => {
            commands::push_config(&env, &cluster, &roles, output).await
        }
    }
}
