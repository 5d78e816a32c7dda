//! RocksDB storage backend for the GigID node.
//!
//! Every accepted operation is written through here so the allow-list, the
//! per-worker income sequences, the credential table, and the event log all
//! survive a restart.

use anyhow::Result;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, DB};
use serde::{Deserialize, Serialize};
use std::path::Path;

use gigid_core::{Address, Credential, EventRecord, IncomeRecord};

/// Column family names for different data types.
const CF_VERIFIERS: &str = "verifiers";
const CF_INCOMES: &str = "incomes";
const CF_CREDENTIALS: &str = "credentials";
const CF_EVENTS: &str = "events";
const CF_STATE: &str = "state";

/// State key holding the administrator the data directory was initialized with.
const STATE_ADMIN: &str = "admin";

/// A credential together with its frozen owner, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRow {
    pub credential: Credential,
    pub owner: Address,
}

/// RocksDB-backed storage for the GigID node.
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_VERIFIERS, Options::default()),
            ColumnFamilyDescriptor::new(CF_INCOMES, Options::default()),
            ColumnFamilyDescriptor::new(CF_CREDENTIALS, Options::default()),
            ColumnFamilyDescriptor::new(CF_EVENTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_STATE, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        self.db.put_cf(&cf, key, value)?;
        Ok(())
    }

    fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        let value = self.db.get_cf(&cf, key)?;
        Ok(value)
    }

    /// All `(key, value)` pairs of a column family in key order.
    fn scan(&self, cf_name: &str) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            rows.push(item?);
        }
        Ok(rows)
    }

    /// Income key: worker bytes followed by the big-endian in-sequence
    /// index, so a key-order scan yields workers grouped with their records
    /// in insertion order.
    fn income_key(worker: Address, index: u64) -> Vec<u8> {
        let mut key = Vec::with_capacity(28);
        key.extend_from_slice(worker.as_bytes());
        key.extend_from_slice(&index.to_be_bytes());
        key
    }

    /// Store one verifier allow-list entry.
    pub fn put_verifier(&self, identity: Address, enabled: bool) -> Result<()> {
        self.put(
            CF_VERIFIERS,
            identity.to_string().as_bytes(),
            &serde_json::to_vec(&enabled)?,
        )
    }

    /// Load all verifier allow-list entries.
    pub fn load_verifiers(&self) -> Result<Vec<(Address, bool)>> {
        let mut entries = Vec::new();
        for (key, value) in self.scan(CF_VERIFIERS)? {
            let identity: Address = std::str::from_utf8(&key)?.parse()?;
            let enabled: bool = serde_json::from_slice(&value)?;
            entries.push((identity, enabled));
        }
        Ok(entries)
    }

    /// Store one income record at its position in the worker's sequence.
    pub fn put_income(&self, worker: Address, index: u64, record: &IncomeRecord) -> Result<()> {
        self.put(
            CF_INCOMES,
            &Self::income_key(worker, index),
            &serde_json::to_vec(record)?,
        )
    }

    /// Load all per-worker income sequences, each in insertion order.
    pub fn load_incomes(&self) -> Result<Vec<(Address, Vec<IncomeRecord>)>> {
        let mut sequences: Vec<(Address, Vec<IncomeRecord>)> = Vec::new();
        for (key, value) in self.scan(CF_INCOMES)? {
            if key.len() != 28 {
                anyhow::bail!("malformed income key of {} bytes", key.len());
            }
            let worker = Address::from_slice(&key[..20])?;
            let record: IncomeRecord = serde_json::from_slice(&value)?;
            match sequences.last_mut() {
                Some((current, records)) if *current == worker => records.push(record),
                _ => sequences.push((worker, vec![record])),
            }
        }
        Ok(sequences)
    }

    /// Store a credential row keyed by token id.
    pub fn put_credential(&self, row: &CredentialRow) -> Result<()> {
        self.put(
            CF_CREDENTIALS,
            &row.credential.id.to_be_bytes(),
            &serde_json::to_vec(row)?,
        )
    }

    /// Load all credential rows in token id order.
    pub fn load_credentials(&self) -> Result<Vec<CredentialRow>> {
        let mut rows = Vec::new();
        for (_key, value) in self.scan(CF_CREDENTIALS)? {
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }

    /// Store an event record keyed by sequence number.
    pub fn put_event(&self, record: &EventRecord) -> Result<()> {
        self.put(
            CF_EVENTS,
            &record.sequence.to_be_bytes(),
            &serde_json::to_vec(record)?,
        )
    }

    /// Load the full event log in sequence order.
    pub fn load_events(&self) -> Result<Vec<EventRecord>> {
        let mut records = Vec::new();
        for (_key, value) in self.scan(CF_EVENTS)? {
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    /// Record which administrator this data directory belongs to.
    pub fn put_admin(&self, admin: Address) -> Result<()> {
        self.put(CF_STATE, STATE_ADMIN.as_bytes(), admin.to_string().as_bytes())
    }

    /// The administrator this data directory was initialized with, if any.
    pub fn get_admin(&self) -> Result<Option<Address>> {
        match self.get(CF_STATE, STATE_ADMIN.as_bytes())? {
            Some(bytes) => Ok(Some(std::str::from_utf8(&bytes)?.parse()?)),
            None => Ok(None),
        }
    }
}
