//! `gigid set-verifier` — Authorize or revoke an income verifier.

use clap::Args;
use serde::{Deserialize, Serialize};

use gigid_core::Address;

#[derive(Args, Debug)]
pub struct SetVerifierArgs {
    /// Calling address (must be the administrator).
    #[arg(short, long)]
    pub caller: Address,

    /// The verifier identity to update.
    #[arg(short, long)]
    pub identity: Address,

    /// Revoke instead of authorize.
    #[arg(long)]
    pub revoke: bool,

    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9100")]
    pub endpoint: String,
}

#[derive(Serialize)]
struct SetVerifierRequest {
    caller: Address,
    identity: Address,
    enabled: bool,
}

#[derive(Deserialize)]
struct VerifierResponse {
    identity: String,
    authorized: bool,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &SetVerifierArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/verifiers", args.endpoint);
    let body = SetVerifierRequest {
        caller: args.caller,
        identity: args.identity,
        enabled: !args.revoke,
    };

    let client = reqwest::Client::new();
    let resp = client.post(&url).json(&body).send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: VerifierResponse = r.json().await?;
            println!(
                "Verifier {} is now {}",
                data.identity,
                if data.authorized {
                    "authorized"
                } else {
                    "revoked"
                }
            );
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("update failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("update failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
