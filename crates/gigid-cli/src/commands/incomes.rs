//! `gigid incomes` — List a worker's income records.

use clap::Args;
use serde::Deserialize;

use gigid_core::Address;

#[derive(Args, Debug)]
pub struct IncomesArgs {
    /// The worker to query.
    pub worker: Address,

    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9100")]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct IncomesResponse {
    worker: String,
    count: usize,
    records: Vec<RecordJson>,
}

#[derive(Deserialize)]
struct RecordJson {
    amount: u128,
    source: String,
    timestamp: String,
    attestation_ref: String,
}

pub async fn run(args: &IncomesArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/incomes/{}", args.endpoint, args.worker);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: IncomesResponse = r.json().await?;
            println!("Incomes for {} ({} records):", data.worker, data.count);
            for (i, record) in data.records.iter().enumerate() {
                println!(
                    "  [{}] {} from {} at {} ({})",
                    i, record.amount, record.source, record.timestamp, record.attestation_ref
                );
            }
            if data.records.is_empty() {
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
