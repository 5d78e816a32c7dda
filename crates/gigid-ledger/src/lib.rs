//! GigID Ledger — Verifier allow-list and the append-only per-worker
//! income record store.

pub mod error;
pub mod ledger;
pub mod registry;

pub use error::LedgerError;
pub use ledger::IncomeLedger;
pub use registry::VerifierRegistry;
