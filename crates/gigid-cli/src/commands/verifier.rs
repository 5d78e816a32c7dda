//! `gigid verifier` — Check whether an identity is an authorized verifier.

use clap::Args;
use serde::Deserialize;

use gigid_core::Address;

#[derive(Args, Debug)]
pub struct VerifierArgs {
    /// The identity to query.
    pub identity: Address,

    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9100")]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct VerifierResponse {
    identity: String,
    authorized: bool,
}

pub async fn run(args: &VerifierArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/verifiers/{}", args.endpoint, args.identity);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: VerifierResponse = r.json().await?;
            println!(
                "{} is {}",
                data.identity,
                if data.authorized {
                    "an authorized verifier"
                } else {
                    "not authorized"
                }
            );
        }
        Ok(r) => {
            anyhow::bail!("node returned HTTP {}", r.status());
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
