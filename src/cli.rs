// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use clusterops::meta::Role;
use clusterops::types::ClusterName;

#[derive(Parser)]
#[command(name = "clusterops")]
#[command(about = "Lifecycle management for distributed database clusters")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI environments
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Output as JSON lines
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the status of every instance, then prune tombstone nodes
    Display {
        cluster: ClusterName,

        /// Only show instances of these roles
        #[arg(short = 'R', long = "role")]
        roles: Vec<Role>,

        /// Only show these nodes (host:port)
        #[arg(short = 'N', long = "node")]
        nodes: Vec<String>,
    },

    /// Remove storage nodes the cluster has retired
    Prune {
        cluster: ClusterName,

        /// List tombstone nodes without removing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Start services in dependency order
    Start {
        cluster: ClusterName,

        #[arg(short = 'R', long = "role")]
        roles: Vec<Role>,
    },

    /// Stop services in reverse dependency order
    Stop {
        cluster: ClusterName,

        #[arg(short = 'R', long = "role")]
        roles: Vec<Role>,
    },

    /// Stop, then start services
    Restart {
        cluster: ClusterName,

        #[arg(short = 'R', long = "role")]
        roles: Vec<Role>,
    },

    /// Render and upload every instance's configuration file
    PushConfig {
        cluster: ClusterName,

        #[arg(short = 'R', long = "role")]
        roles: Vec<Role>,
    },
}
