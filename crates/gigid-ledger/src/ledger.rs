use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use gigid_core::{Address, AttestationRef, EventLog, IncomeRecord, LedgerEvent};

use crate::error::LedgerError;
use crate::registry::VerifierRegistry;

/// Append-only store of per-worker income records.
///
/// Records are kept in insertion order and never mutated or removed. Writes
/// are gated by the verifier registry; reads are open to anyone.
pub struct IncomeLedger {
    /// Allow-list consulted before every write.
    registry: Arc<VerifierRegistry>,
    /// Worker → ordered income records, oldest first.
    incomes: DashMap<Address, Vec<IncomeRecord>>,
    /// Shared notification log.
    events: Arc<EventLog>,
}

impl IncomeLedger {
    /// Create an empty ledger gated by the given registry.
    pub fn new(registry: Arc<VerifierRegistry>, events: Arc<EventLog>) -> Self {
        Self {
            registry,
            incomes: DashMap::new(),
            events,
        }
    }

    /// Rebuild a ledger from persisted per-worker sequences without
    /// emitting events.
    pub fn restore(
        registry: Arc<VerifierRegistry>,
        sequences: impl IntoIterator<Item = (Address, Vec<IncomeRecord>)>,
        events: Arc<EventLog>,
    ) -> Self {
        let incomes = DashMap::new();
        for (worker, records) in sequences {
            incomes.insert(worker, records);
        }
        Self {
            registry,
            incomes,
            events,
        }
    }

    /// Append a verified income record to a worker's sequence.
    ///
    /// Preconditions are checked in order: the caller must be an authorized
    /// verifier, the worker must not be the null identity, and the amount
    /// must be positive. A rejected call leaves the ledger untouched.
    ///
    /// There is no idempotence across calls: two identical submissions
    /// append two distinct records. Duplicate detection is a verifier
    /// responsibility.
    pub fn record_income(
        &self,
        caller: Address,
        worker: Address,
        amount: u128,
        source: &str,
        attestation_ref: AttestationRef,
    ) -> Result<IncomeRecord, LedgerError> {
        if !self.registry.is_authorized(caller) {
            tracing::warn!(%caller, "rejected income record from unauthorized caller");
            return Err(LedgerError::NotAuthorized { caller });
        }
        if worker.is_zero() {
            return Err(LedgerError::InvalidWorker);
        }
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let record = IncomeRecord {
            amount,
            source: source.to_string(),
            timestamp: Utc::now(),
            verified: true,
            attestation_ref,
        };
        self.incomes
            .entry(worker)
            .or_default()
            .push(record.clone());
        self.events.append(LedgerEvent::IncomeRecorded {
            worker,
            amount,
            source: source.to_string(),
            attestation_ref,
        });

        tracing::info!(%worker, amount, source, "income recorded");
        Ok(record)
    }

    /// A worker's income records in insertion order, oldest first.
    /// Empty if none were recorded.
    pub fn worker_incomes(&self, worker: Address) -> Vec<IncomeRecord> {
        self.incomes
            .get(&worker)
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Number of records in a worker's sequence.
    pub fn income_count(&self, worker: Address) -> usize {
        self.incomes
            .get(&worker)
            .map(|records| records.len())
            .unwrap_or(0)
    }

    /// Snapshot of all per-worker sequences, for persistence.
    pub fn sequences(&self) -> Vec<(Address, Vec<IncomeRecord>)> {
        self.incomes
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}
