//! `gigid credentials` — List credentials, optionally by owner.

use clap::Args;
use serde::Deserialize;

use gigid_core::Address;

#[derive(Args, Debug)]
pub struct CredentialsArgs {
    /// Only show credentials held by this identity.
    #[arg(short, long)]
    pub owner: Option<Address>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9100")]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct CredentialListResponse {
    count: usize,
    credentials: Vec<CredentialResponse>,
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

pub async fn run(args: &CredentialsArgs) -> anyhow::Result<()> {
    let url = match args.owner {
        Some(owner) => format!("{}/api/v1/credentials?owner={}", args.endpoint, owner),
        None => format!("{}/api/v1/credentials", args.endpoint),
    };
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: CredentialListResponse = r.json().await?;
            println!("Credentials ({}):", data.count);
            for entry in &data.credentials {
                println!(
                    "  [{}] {} — total {} — owned by {}",
                    entry.credential.id,
                    entry.credential.category,
                    entry.credential.total_income,
                    entry.owner
                );
            }
            if data.credentials.is_empty() {
                println!("  (none)");
            }
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
