//! GigID Core — Shared types, errors, and the notification log for the
//! GigID verified-income protocol.

pub mod error;
pub mod events;
pub mod types;

pub use error::CoreError;
pub use events::{EventLog, EventRecord, LedgerEvent};
pub use types::{Address, AttestationRef, Credential, IncomeRecord};
