//! The ledger service kernel.
//!
//! Owns the verifier registry, the income ledger, the credential issuer,
//! and the shared event log, and writes every accepted mutation through to
//! storage. The node applies operations to the service one at a time from
//! its command loop, so mutations are totally ordered.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use gigid_core::{Address, AttestationRef, Credential, EventLog, EventRecord, IncomeRecord};
use gigid_credential::{CredentialError, CredentialIssuer};
use gigid_ledger::{IncomeLedger, LedgerError, VerifierRegistry};

use crate::storage::{CredentialRow, Storage};

/// A failed service operation.
///
/// Domain rejections leave all state untouched. A storage error reports a
/// write-through failure after the in-memory commit: an operational fault,
/// not a rejection.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    /// Whether this is a domain rejection rather than an operational fault.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// The authoritative GigID stores behind one handle.
pub struct LedgerService {
    registry: Arc<VerifierRegistry>,
    ledger: IncomeLedger,
    issuer: CredentialIssuer,
    events: Arc<EventLog>,
    storage: Option<Storage>,
}

impl LedgerService {
    /// Create a service with no persistence, bootstrapping the admin as a
    /// verifier.
    pub fn in_memory(admin: Address) -> Self {
        let events = Arc::new(EventLog::new());
        let registry = Arc::new(VerifierRegistry::new(admin, events.clone()));
        let ledger = IncomeLedger::new(registry.clone(), events.clone());
        let issuer = CredentialIssuer::new(admin, events.clone());
        Self {
            registry,
            ledger,
            issuer,
            events,
            storage: None,
        }
    }

    /// Open a storage-backed service at `path`.
    ///
    /// A fresh data directory is initialized with the bootstrap verifier
    /// grant and its event. An existing one must have been initialized with
    /// the same administrator; its state is reloaded without re-emitting
    /// events.
    pub fn open(admin: Address, path: &Path) -> anyhow::Result<Self> {
        let storage = Storage::open(path)?;

        match storage.get_admin()? {
            None => {
                let mut service = Self::in_memory(admin);
                storage.put_admin(admin)?;
                storage.put_verifier(admin, true)?;
                for record in service.events.snapshot() {
                    storage.put_event(&record)?;
                }
                service.storage = Some(storage);
                tracing::info!(%admin, path = %path.display(), "initialized data directory");
                Ok(service)
            }
            Some(stored) if stored != admin => {
                anyhow::bail!(
                    "data directory was initialized with administrator {}, not {}",
                    stored,
                    admin
                );
            }
            Some(_) => {
                let events = Arc::new(EventLog::restore(storage.load_events()?));
                let registry = Arc::new(VerifierRegistry::restore(
                    admin,
                    storage.load_verifiers()?,
                    events.clone(),
                ));
                let ledger =
                    IncomeLedger::restore(registry.clone(), storage.load_incomes()?, events.clone());
                let rows = storage
                    .load_credentials()?
                    .into_iter()
                    .map(|row| (row.credential, row.owner));
                let issuer = CredentialIssuer::restore(admin, rows, events.clone());
                tracing::info!(
                    %admin,
                    path = %path.display(),
                    events = events.len(),
                    "reloaded state from data directory"
                );
                Ok(Self {
                    registry,
                    ledger,
                    issuer,
                    events,
                    storage: Some(storage),
                })
            }
        }
    }

    /// The administrator identity.
    pub fn admin(&self) -> Address {
        self.registry.admin()
    }

    /// Write entity rows and the events appended since `seq_before` through
    /// to storage, if the service is persistent.
    fn persist(
        &self,
        seq_before: u64,
        write: impl FnOnce(&Storage) -> anyhow::Result<()>,
    ) -> Result<(), ServiceError> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        write(storage)
            .and_then(|_| {
                for record in self.events.since(seq_before) {
                    storage.put_event(&record)?;
                }
                Ok(())
            })
            .map_err(|e| {
                tracing::error!(error = %e, "write-through failed after commit");
                ServiceError::Storage(e.to_string())
            })
    }

    /// Set or clear a verifier allow-list entry. Administrator only.
    pub fn set_verifier_status(
        &self,
        caller: Address,
        identity: Address,
        enabled: bool,
    ) -> Result<(), ServiceError> {
        let seq_before = self.events.len() as u64;
        self.registry.set_verifier_status(caller, identity, enabled)?;
        self.persist(seq_before, |storage| storage.put_verifier(identity, enabled))
    }

    /// Whether an identity is an authorized verifier.
    pub fn is_authorized(&self, identity: Address) -> bool {
        self.registry.is_authorized(identity)
    }

    /// Append an income record to a worker's sequence. Authorized verifiers
    /// only.
    pub fn record_income(
        &self,
        caller: Address,
        worker: Address,
        amount: u128,
        source: &str,
        attestation_ref: AttestationRef,
    ) -> Result<IncomeRecord, ServiceError> {
        let seq_before = self.events.len() as u64;
        let record = self
            .ledger
            .record_income(caller, worker, amount, source, attestation_ref)?;
        let index = self.ledger.income_count(worker) as u64 - 1;
        self.persist(seq_before, |storage| {
            storage.put_income(worker, index, &record)
        })?;
        Ok(record)
    }

    /// A worker's income records, oldest first.
    pub fn worker_incomes(&self, worker: Address) -> Vec<IncomeRecord> {
        self.ledger.worker_incomes(worker)
    }

    /// Number of records in a worker's sequence.
    pub fn income_count(&self, worker: Address) -> usize {
        self.ledger.income_count(worker)
    }

    /// Mint a soulbound credential. Administrator only.
    pub fn mint_credential(
        &self,
        caller: Address,
        recipient: Address,
        total_income: u128,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        category: &str,
    ) -> Result<Credential, ServiceError> {
        let seq_before = self.events.len() as u64;
        let credential = self.issuer.mint_credential(
            caller,
            recipient,
            total_income,
            period_start,
            period_end,
            category,
        )?;
        let row = CredentialRow {
            credential: credential.clone(),
            owner: recipient,
        };
        self.persist(seq_before, |storage| storage.put_credential(&row))?;
        Ok(credential)
    }

    /// A credential and its frozen owner.
    pub fn credential(&self, token_id: u64) -> Result<(Credential, Address), ServiceError> {
        let credential = self.issuer.credential(token_id)?;
        let owner = self.issuer.owner_of(token_id)?;
        Ok((credential, owner))
    }

    /// All credentials with their owners, in token id order.
    pub fn credentials(&self) -> Vec<(Credential, Address)> {
        self.issuer.rows()
    }

    /// Token ids held by an identity, in mint order.
    pub fn tokens_of_owner(&self, owner: Address) -> Vec<u64> {
        self.issuer.tokens_of_owner(owner)
    }

    /// Total number of minted credentials.
    pub fn total_supply(&self) -> u64 {
        self.issuer.total_supply()
    }

    /// Attempt a credential transfer. Always rejected; nothing is written.
    pub fn transfer(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<(), ServiceError> {
        self.issuer.transfer_from(caller, from, to, token_id)?;
        Ok(())
    }

    /// Events with `sequence >= start`, in append order.
    pub fn events_since(&self, start: u64) -> Vec<EventRecord> {
        self.events.since(start)
    }

    /// Number of events in the log.
    pub fn event_count(&self) -> u64 {
        self.events.len() as u64
    }

    /// Number of identities currently on the allow-list.
    pub fn verifier_count(&self) -> usize {
        self.registry
            .entries()
            .iter()
            .filter(|(_, enabled)| *enabled)
            .count()
    }

    /// Total number of income records across all workers.
    pub fn income_record_count(&self) -> u64 {
        self.ledger
            .sequences()
            .iter()
            .map(|(_, records)| records.len() as u64)
            .sum()
    }
}
