//! Commands dispatched from the HTTP API to the node command loop.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;

use gigid_core::{Address, AttestationRef, Credential, EventRecord, IncomeRecord};

/// A failed command, classified for the HTTP boundary.
#[derive(Debug)]
pub enum CommandError {
    /// Domain rejection: the operation was refused and no state changed.
    Rejected(String),
    /// Operational fault (storage, channel). Not a domain rejection.
    Internal(String),
}

/// A command sent from the HTTP API to the node's command loop.
pub enum NodeCommand {
    /// Set or clear a verifier allow-list entry.
    SetVerifierStatus {
        caller: Address,
        identity: Address,
        enabled: bool,
        reply: oneshot::Sender<Result<VerifierResponse, CommandError>>,
    },
    /// Query a verifier allow-list entry.
    GetVerifier {
        identity: Address,
        reply: oneshot::Sender<Result<VerifierResponse, CommandError>>,
    },
    /// Append an income record to a worker's sequence.
    RecordIncome {
        caller: Address,
        worker: Address,
        amount: u128,
        source: String,
        attestation_ref: AttestationRef,
        reply: oneshot::Sender<Result<IncomeResponse, CommandError>>,
    },
    /// Read a worker's income sequence.
    GetIncomes {
        worker: Address,
        reply: oneshot::Sender<Result<IncomesResponse, CommandError>>,
    },
    /// Mint a soulbound credential.
    MintCredential {
        caller: Address,
        recipient: Address,
        total_income: u128,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        category: String,
        reply: oneshot::Sender<Result<CredentialResponse, CommandError>>,
    },
    /// Read one credential with its owner.
    GetCredential {
        token_id: u64,
        reply: oneshot::Sender<Result<CredentialResponse, CommandError>>,
    },
    /// List credentials, optionally restricted to one owner.
    ListCredentials {
        owner: Option<Address>,
        reply: oneshot::Sender<Result<CredentialListResponse, CommandError>>,
    },
    /// Attempt a credential transfer. Always rejected.
    Transfer {
        caller: Address,
        from: Address,
        to: Address,
        token_id: u64,
        reply: oneshot::Sender<Result<TransferResponse, CommandError>>,
    },
    /// Read the event log from a sequence number.
    GetEvents {
        since: u64,
        reply: oneshot::Sender<Result<EventsResponse, CommandError>>,
    },
    /// Read store counters for the status endpoint.
    GetCounts {
        reply: oneshot::Sender<Result<CountsResponse, CommandError>>,
    },
}

/// A verifier allow-list entry.
#[derive(Debug, Clone, Serialize)]
pub struct VerifierResponse {
    pub identity: Address,
    pub authorized: bool,
}

/// Response after recording income.
#[derive(Debug, Clone, Serialize)]
pub struct IncomeResponse {
    pub worker: Address,
    pub record: IncomeRecord,
}

/// A worker's income sequence.
#[derive(Debug, Clone, Serialize)]
pub struct IncomesResponse {
    pub worker: Address,
    pub count: usize,
    pub records: Vec<IncomeRecord>,
}

/// A credential with its frozen owner.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialResponse {
    pub credential: Credential,
    pub owner: Address,
}

/// A listing of credentials.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialListResponse {
    pub count: usize,
    pub credentials: Vec<CredentialResponse>,
}

/// Response shape for transfer attempts. Never produced: every transfer is
/// rejected, so only the error arm of the reply is ever sent.
#[derive(Debug, Clone, Serialize)]
pub struct TransferResponse {
    pub status: String,
}

/// A slice of the event log.
#[derive(Debug, Clone, Serialize)]
pub struct EventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

/// Store counters for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CountsResponse {
    pub verifiers: usize,
    pub income_records: u64,
    pub credentials: u64,
    pub events: u64,
}
