//! The notification log: an ordered, append-only record of every accepted
//! state change, kept independently of the entity stores so observers can
//! reconstruct history without re-deriving it from current state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::types::{Address, AttestationRef};

/// A state change announced by one of the GigID stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// The allow-list entry for a verifier was set or cleared.
    VerifierStatusChanged { verifier: Address, enabled: bool },
    /// An income record was appended to a worker's sequence.
    IncomeRecorded {
        worker: Address,
        amount: u128,
        source: String,
        attestation_ref: AttestationRef,
    },
    /// A soulbound credential was minted.
    CredentialMinted {
        recipient: Address,
        token_id: u64,
        category: String,
    },
}

/// One entry in the notification log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    /// Clock time at which the event was appended.
    pub timestamp: DateTime<Utc>,
    /// The announced state change.
    pub event: LedgerEvent,
}

/// Ordered, append-only log of accepted state changes.
///
/// Sequence numbers are dense: the record appended by the n-th accepted
/// state change carries sequence n-1. Entries are never mutated or removed.
pub struct EventLog {
    records: RwLock<Vec<EventRecord>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Rebuild a log from persisted records, preserving their sequences.
    pub fn restore(records: Vec<EventRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Append an event, assigning the next sequence number.
    pub fn append(&self, event: LedgerEvent) -> EventRecord {
        let mut records = self.records.write().expect("event log lock poisoned");
        let record = EventRecord {
            sequence: records.len() as u64,
            timestamp: Utc::now(),
            event,
        };
        records.push(record.clone());
        tracing::debug!(sequence = record.sequence, "event appended");
        record
    }

    /// Number of records in the log.
    pub fn len(&self) -> usize {
        self.records.read().expect("event log lock poisoned").len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records, in append order.
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.records
            .read()
            .expect("event log lock poisoned")
            .clone()
    }

    /// Records with `sequence >= start`, in append order.
    pub fn since(&self, start: u64) -> Vec<EventRecord> {
        self.records
            .read()
            .expect("event log lock poisoned")
            .iter()
            .filter(|r| r.sequence >= start)
            .cloned()
            .collect()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
