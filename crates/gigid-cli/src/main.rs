//! GigID CLI — Command-line interface for the GigID income ledger node.
//!
//! Subcommands: init, status, set-verifier, verifier, record, incomes,
//! mint, credential, credentials, transfer, events.

mod commands;

use clap::{Parser, Subcommand};

/// GigID — Verified income ledger and soulbound credentials.
#[derive(Parser, Debug)]
#[command(name = "gigid", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new GigID node configuration.
    Init(commands::init::InitArgs),
    /// Query the status of a running node.
    Status(commands::status::StatusArgs),
    /// Authorize or revoke an income verifier.
    SetVerifier(commands::set_verifier::SetVerifierArgs),
    /// Check whether an identity is an authorized verifier.
    Verifier(commands::verifier::VerifierArgs),
    /// Record a verified income event for a worker.
    Record(commands::record::RecordArgs),
    /// List a worker's income records.
    Incomes(commands::incomes::IncomesArgs),
    /// Mint a soulbound income credential.
    Mint(commands::mint::MintArgs),
    /// Show one credential and its owner.
    Credential(commands::credential::CredentialArgs),
    /// List credentials, optionally by owner.
    Credentials(commands::credentials::CredentialsArgs),
    /// Attempt a credential transfer (always rejected).
    Transfer(commands::transfer::TransferArgs),
    /// Show the node's event log.
    Events(commands::events::EventsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Status(args) => commands::status::run(args).await,
        Commands::SetVerifier(args) => commands::set_verifier::run(args).await,
        Commands::Verifier(args) => commands::verifier::run(args).await,
        Commands::Record(args) => commands::record::run(args).await,
        Commands::Incomes(args) => commands::incomes::run(args).await,
        Commands::Mint(args) => commands::mint::run(args).await,
        Commands::Credential(args) => commands::credential::run(args).await,
        Commands::Credentials(args) => commands::credentials::run(args).await,
        Commands::Transfer(args) => commands::transfer::run(args).await,
        Commands::Events(args) => commands::events::run(args).await,
    }
}
