// SPDX-License-Identifier: MIT

//! Submit a repository for documentation

use crate::client::DaemonClient;
use anyhow::{bail, Result};
use docket_daemon::JobOutcome;
use std::time::Duration;

#[derive(clap::Args)]
pub struct SubmitArgs {
    /// Repository reference (https or ssh git URL)
    pub reference: String,

    /// Poll until the job finishes
    #[arg(long)]
    pub wait: bool,

    /// Polling interval while waiting (seconds)
    #[arg(long, default_value = "2")]
    pub interval: u64,
}

pub async fn handle(args: SubmitArgs) -> Result<()> {
    let client = DaemonClient::connect_or_start().await?;

    let id = client.submit(&args.reference).await?;
    println!("Submitted: {}", id);

    if !args.wait {
        println!("Poll with: docket status {}", id);
        return Ok(());
    }

    wait_for_outcome(&client, &id, Duration::from_secs(args.interval.max(1))).await
}

async fn wait_for_outcome(client: &DaemonClient, id: &str, interval: Duration) -> Result<()> {
    let mut last_stage = String::new();
    loop {
        match client.outcome(id).await? {
            JobOutcome::Pending { stage } => {
                if stage != last_stage {
                    println!("  {}", stage);
                    last_stage = stage;
                }
                tokio::time::sleep(interval).await;
            }
            JobOutcome::Succeeded { result } => {
                println!("Succeeded: {}", result.doc_url);
                return Ok(());
            }
            JobOutcome::Failed { stage, error } => {
                bail!("job failed during {}: {}", stage, error);
            }
        }
    }
}
