// SPDX-License-Identifier: MIT

//! Fetch a job's result

use crate::client::DaemonClient;
use anyhow::{bail, Result};
use docket_daemon::JobOutcome;

#[derive(clap::Args)]
pub struct ResultArgs {
    /// Job id
    pub id: String,
}

pub async fn handle(args: ResultArgs) -> Result<()> {
    let client = DaemonClient::connect_or_start().await?;

    match client.outcome(&args.id).await? {
        JobOutcome::Pending { stage } => {
            println!("Still running: {}", stage);
        }
        JobOutcome::Succeeded { result } => {
            println!("Documentation: {}", result.doc_url);
            println!("Repository:    {}", result.repo_name);
            println!(
                "Analyzed:      {} files ({} code)",
                result.analysis.total_files, result.analysis.code_files
            );
            if !result.analysis.languages.is_empty() {
                println!("Languages:     {}", result.analysis.languages.join(", "));
            }
            if !result.analysis.frameworks.is_empty() {
                println!("Frameworks:    {}", result.analysis.frameworks.join(", "));
            }
        }
        JobOutcome::Failed { stage, error } => {
            bail!("job failed during {}: {}", stage, error);
        }
    }

    Ok(())
}
