//! `gigid record` — Record a verified income event for a worker.

use clap::Args;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use gigid_core::{Address, AttestationRef};

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Calling address (must be an authorized verifier).
    #[arg(short, long)]
    pub caller: Address,

    /// Worker the income is attributed to.
    #[arg(short, long)]
    pub worker: Address,

    /// Income amount in the platform's base unit.
    #[arg(short, long)]
    pub amount: u128,

    /// Label of the income source (e.g. "Uber").
    #[arg(short, long)]
    pub source: String,

    /// Attestation reference: 32-byte hex, or any label to derive one from.
    #[arg(long, default_value = "")]
    pub attestation: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9100")]
    pub endpoint: String,
}

#[derive(Serialize)]
struct RecordIncomeRequest {
    caller: Address,
    worker: Address,
    amount: u128,
    source: String,
    attestation_ref: AttestationRef,
}

#[derive(Deserialize)]
struct IncomeResponse {
    worker: String,
    record: RecordJson,
}

#[derive(Deserialize)]
struct RecordJson {
    amount: u128,
    source: String,
    timestamp: String,
    verified: bool,
    attestation_ref: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(args: &RecordArgs) -> anyhow::Result<()> {
    // Accept a full hex reference, or derive one from a proof label.
    let attestation_ref = AttestationRef::from_str(&args.attestation)
        .unwrap_or_else(|_| AttestationRef::from_label(&args.attestation));

    let url = format!("{}/api/v1/incomes", args.endpoint);
    let body = RecordIncomeRequest {
        caller: args.caller,
        worker: args.worker,
        amount: args.amount,
        source: args.source.clone(),
        attestation_ref,
    };

    let client = reqwest::Client::new();
    let resp = client.post(&url).json(&body).send().await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: IncomeResponse = r.json().await?;
            println!("Income recorded!");
            println!("  Worker:       {}", data.worker);
            println!("  Amount:       {}", data.record.amount);
            println!("  Source:       {}", data.record.source);
            println!("  Timestamp:    {}", data.record.timestamp);
            println!("  Verified:     {}", data.record.verified);
            println!("  Attestation:  {}", data.record.attestation_ref);
        }
        Ok(r) => {
            let status = r.status();
            if let Ok(err) = r.json::<ErrorResponse>().await {
                anyhow::bail!("record failed (HTTP {}): {}", status, err.error);
            } else {
                anyhow::bail!("record failed (HTTP {})", status);
            }
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
