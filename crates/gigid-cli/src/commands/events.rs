//! `gigid events` — Show the node's event log.

use clap::Args;
use serde::Deserialize;

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// First sequence number to show.
    #[arg(long, default_value_t = 0)]
    pub since: u64,

    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:9100")]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct EventsResponse {
    count: usize,
    events: Vec<EventJson>,
}

#[derive(Deserialize)]
struct EventJson {
    sequence: u64,
    timestamp: String,
    event: serde_json::Value,
}

pub async fn run(args: &EventsArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/events?since={}", args.endpoint, args.since);
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let data: EventsResponse = r.json().await?;
            println!("Events ({}):", data.count);
            for record in &data.events {
                println!(
                    "  [{}] {} {}",
                    record.sequence,
                    record.timestamp,
                    serde_json::to_string(&record.event)?
                );
            }
            if data.events.is_empty() {
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
