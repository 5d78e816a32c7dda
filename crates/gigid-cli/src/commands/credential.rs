//! `gigid credential` — Show one credential and its owner.

use clap::Args;
use serde::Deserialize;

#[derive(Args, Debug)]
pub struct CredentialArgs {
    /// The token id to query.
    pub token_id: u64,

    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9100")]
    pub endpoint: String,
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
    period_start: String,
    period_end: String,
    category: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &CredentialArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/credentials/{}", args.endpoint, args.token_id);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: CredentialResponse = r.json().await?;
            println!("Credential {}:", data.credential.id);
            println!("  Owner:         {}", data.owner);
            println!("  Total income:  {}", data.credential.total_income);
            println!("  Period:        {} → {}", data.credential.period_start, data.credential.period_end);
            println!("  Category:      {}", data.credential.category);
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("lookup failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("lookup failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
