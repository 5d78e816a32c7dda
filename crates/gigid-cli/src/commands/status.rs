//! `gigid status` — Query the status of a running GigID node.

use clap::Args;
use serde::Deserialize;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9100")]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    version: String,
    admin: String,
    uptime_secs: u64,
    verifiers: usize,
    income_records: u64,
    credentials: u64,
    events: u64,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/status", args.endpoint);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let status: StatusResponse = r.json().await?;
            println!("Node Status:");
            println!("  Version:      {}", status.version);
            println!("  Admin:        {}", status.admin);
            println!("  Uptime:       {}s", status.uptime_secs);
            println!("  Verifiers:    {}", status.verifiers);
            println!("  Incomes:      {}", status.income_records);
            println!("  Credentials:  {}", status.credentials);
            println!("  Events:       {}", status.events);
        }
        Ok(r) => {
            anyhow::bail!("node returned HTTP {}", r.status());
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
            println!();
            println!("Is the node running? Start it with: gigid-node");
        }
    }

    Ok(())
}
