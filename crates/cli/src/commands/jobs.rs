// SPDX-License-Identifier: MIT

//! List all jobs

use crate::client::DaemonClient;
use anyhow::Result;

pub async fn handle() -> Result<()> {
    let client = DaemonClient::connect_or_start().await?;
    let jobs = client.jobs().await?;

    if jobs.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }

    println!("{:<38} {:<12} {:<10} SOURCE", "ID", "STAGE", "OUTCOME");
    println!("{}", "-".repeat(72));

    for job in jobs {
        println!(
            "{:<38} {:<12} {:<10} {}",
            job.id,
            job.stage,
            job.outcome.as_deref().unwrap_or("-"),
            job.source
        );
    }

    Ok(())
}
