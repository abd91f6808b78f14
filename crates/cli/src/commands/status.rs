// SPDX-License-Identifier: MIT

//! Show a job's current stage

use crate::client::DaemonClient;
use anyhow::Result;

#[derive(clap::Args)]
pub struct StatusArgs {
    /// Job id
    pub id: String,
}

pub async fn handle(args: StatusArgs) -> Result<()> {
    let client = DaemonClient::connect_or_start().await?;
    let job = client.job(&args.id).await?;

    println!("Job:      {}", job.id);
    println!("Source:   {}", job.source);
    println!("Stage:    {}", job.stage);
    if let Some(outcome) = job.outcome {
        println!("Outcome:  {:?}", outcome);
    }
    if job.attempts > 0 {
        println!("Attempts: {}", job.attempts);
    }
    if let Some(error) = &job.error {
        println!("Error:    {}", error);
    }
    println!("Updated:  {}", job.updated_at.to_rfc3339());

    Ok(())
}
