//! GigID Credential — Soulbound credential issuance and enumeration.

pub mod error;
pub mod issuer;

pub use error::CredentialError;
pub use issuer::{CredentialIssuer, COLLECTION_NAME, COLLECTION_SYMBOL};
