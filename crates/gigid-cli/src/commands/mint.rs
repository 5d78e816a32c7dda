//! `gigid mint` — Mint a soulbound income credential.

use chrono::{DateTime, Utc};
use clap::Args;
use serde::{Deserialize, Serialize};

use gigid_core::Address;

#[derive(Args, Debug)]
pub struct MintArgs {
    /// Calling address (must be the administrator).
    #[arg(short, long)]
    pub caller: Address,

    /// Recipient of the credential.
    #[arg(short, long)]
    pub recipient: Address,

    /// Total verified income over the period.
    #[arg(short, long)]
    pub total_income: u128,

    /// Start of the summarized period (RFC 3339).
    #[arg(long)]
    pub period_start: DateTime<Utc>,

    /// End of the summarized period (RFC 3339).
    #[arg(long)]
    pub period_end: DateTime<Utc>,

    /// Credential category (e.g. "Annual Income 2025").
    #[arg(long)]
    pub category: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9100")]
    pub endpoint: String,
}

#[derive(Serialize)]
struct MintCredentialRequest {
    caller: Address,
    recipient: Address,
    total_income: u128,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    category: String,
}

#[derive(Deserialize)]
struct CredentialResponse {
    credential: CredentialJson,
    owner: String,
}

#[derive(Deserialize)]
struct CredentialJson {
    id: u64,
    total_income: u128,
    category: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &MintArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/credentials", args.endpoint);
    let body = MintCredentialRequest {
        caller: args.caller,
        recipient: args.recipient,
        total_income: args.total_income,
        period_start: args.period_start,
        period_end: args.period_end,
        category: args.category.clone(),
    };

    let client = reqwest::Client::new();
    let resp = client.post(&url).json(&body).send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: CredentialResponse = r.json().await?;
            println!("Credential minted!");
            println!("  Token id:      {}", data.credential.id);
            println!("  Owner:         {}", data.owner);
            println!("  Total income:  {}", data.credential.total_income);
            println!("  Category:      {}", data.credential.category);
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("mint failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("mint failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
