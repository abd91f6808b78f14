// SPDX-License-Identifier: MIT

//! Daemon management commands

use crate::client::{self, DaemonClient};
use anyhow::Result;
use clap::Subcommand;

#[derive(clap::Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    command: DaemonCommand,
}

#[derive(Subcommand)]
enum DaemonCommand {
    /// Start the daemon if it is not running
    Start,
    /// Stop the daemon
    Stop,
    /// Show daemon status
    Status,
}

pub async fn handle(args: DaemonArgs) -> Result<()> {
    match args.command {
        DaemonCommand::Start => {
            let client = DaemonClient::connect_or_start().await?;
            let version = client.hello().await?;
            println!("Daemon running (version {})", version);
        }

        DaemonCommand::Stop => {
            if client::daemon_stop().await? {
                println!("Daemon stopped");
            } else {
                println!("Daemon not running");
            }
        }

        DaemonCommand::Status => match DaemonClient::connect() {
            Ok(client) => {
                let (uptime_secs, jobs_active, queue_depth, workers) = client.status().await?;
                println!("Daemon running");
                println!("  Uptime:      {}s", uptime_secs);
                println!("  Active jobs: {}", jobs_active);
                println!("  Queue depth: {}", queue_depth);
                println!("  Workers:     {}", workers);
            }
            Err(client::ClientError::DaemonNotRunning) => {
                println!("Daemon not running");
            }
            Err(e) => return Err(e.into()),
        },
    }

    Ok(())
}
