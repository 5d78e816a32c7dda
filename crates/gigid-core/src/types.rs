use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// An externally-controlled account address.
///
/// Addresses are referenced by the ledger, never created or destroyed by it.
/// Rendered as `0x`-prefixed lowercase hex; [`Address::ZERO`] is the null
/// identity and is rejected as a worker by the income ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// The null identity.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create an address from raw bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Create an address from a byte slice. Fails unless exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.len() != 20 {
            return Err(CoreError::InvalidAddress(format!(
                "expected 20 bytes, got {}",
                bytes.len()
            )));
        }
        let mut buf = [0u8; 20];
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Whether this is the null identity.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 40 {
            return Err(CoreError::InvalidAddress(format!(
                "expected 40 hex digits, got {}",
                digits.len()
            )));
        }
        let bytes = hex::decode(digits).map_err(|e| CoreError::InvalidAddress(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque 32-byte identifier correlating an income record to an external
/// proof. Not validated by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttestationRef([u8; 32]);

impl AttestationRef {
    /// Create a reference from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a reference from an external proof label.
    pub fn from_label(label: &str) -> Self {
        Self(*blake3::hash(label.as_bytes()).as_bytes())
    }

    /// Raw bytes of the reference.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AttestationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AttestationRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 64 {
            return Err(CoreError::InvalidAttestationRef(format!(
                "expected 64 hex digits, got {}",
                digits.len()
            )));
        }
        let bytes =
            hex::decode(digits).map_err(|e| CoreError::InvalidAttestationRef(e.to_string()))?;
        let mut buf = [0u8; 32];
        buf.copy_from_slice(&bytes);
        Ok(Self(buf))
    }
}

impl Serialize for AttestationRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AttestationRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single verified income event for a worker.
///
/// Immutable once appended: the ledger is write-once, read-many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRecord {
    /// Income amount in the platform's base unit. Always greater than zero.
    pub amount: u128,
    /// Label of the income source (e.g. "Uber", "Upwork").
    pub source: String,
    /// Clock time at which the record was appended.
    pub timestamp: DateTime<Utc>,
    /// Always true: only authorized verifiers can append.
    pub verified: bool,
    /// Reference to the external proof backing this record.
    pub attestation_ref: AttestationRef,
}

/// A soulbound credential summarizing verified income over a period.
///
/// Exactly one credential exists per token id; ownership is assigned at mint
/// and never changes afterwards. The period bounds and total are
/// caller-trusted input, not derived from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Sequential token id, starting at 0, never reused.
    pub id: u64,
    /// Total verified income over the period.
    pub total_income: u128,
    /// Start of the summarized period.
    pub period_start: DateTime<Utc>,
    /// End of the summarized period.
    pub period_end: DateTime<Utc>,
    /// Human-readable category (e.g. "Annual Income 2025").
    pub category: String,
}
