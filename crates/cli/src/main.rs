// SPDX-License-Identifier: MIT

//! docket - repository documentation CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{daemon, jobs, outcome, status, submit};

#[derive(Parser)]
#[command(
    name = "docket",
    version,
    about = "Docket - generate documentation for a repository"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a repository for documentation
    Submit(submit::SubmitArgs),
    /// Show a job's current stage
    Status(status::StatusArgs),
    /// Fetch a job's result
    Result(outcome::ResultArgs),
    /// List all jobs
    Jobs,
    /// Daemon management
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit(args) => submit::handle(args).await,
        Commands::Status(args) => status::handle(args).await,
        Commands::Result(args) => outcome::handle(args).await,
        Commands::Jobs => jobs::handle().await,
        Commands::Daemon(args) => daemon::handle(args).await,
    }
}
