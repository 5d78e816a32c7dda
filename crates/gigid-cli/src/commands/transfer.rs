//! `gigid transfer` — Attempt a credential transfer.
//!
//! Credentials are soulbound, so the node rejects every attempt. The
//! command exists to make the rejection observable from the outside.

use clap::Args;
use serde::{Deserialize, Serialize};

use gigid_core::Address;

#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Calling address.
    #[arg(short, long)]
    pub caller: Address,

    /// Current owner of the token.
    #[arg(short, long)]
    pub from: Address,

    /// Intended recipient.
    #[arg(short, long)]
    pub to: Address,

    /// The token id to transfer.
    #[arg(long)]
    pub token_id: u64,

    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9100")]
    pub endpoint: String,
}

#[derive(Serialize)]
struct TransferRequest {
    caller: Address,
    from: Address,
    to: Address,
    token_id: u64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &TransferArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/transfers", args.endpoint);
    let body = TransferRequest {
        caller: args.caller,
        from: args.from,
        to: args.to,
        token_id: args.token_id,
    };

    let client = reqwest::Client::new();
    let resp = client.post(&url).json(&body).send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            // Unreachable with a conforming node.
            println!("Warning: node accepted the transfer of token {}", args.token_id);
        }
        Ok(r) => {
            let status = r.status();
            match r.json::<ErrorResponse>().await {
                Ok(err) => {
                    println!("Transfer rejected (HTTP {}):", status);
                    println!("  {}", err.error);
                }
                Err(_) => println!("Transfer rejected (HTTP {})", status),
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
