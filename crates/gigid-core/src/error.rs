/// Core type errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid attestation reference: {0}")]
    InvalidAttestationRef(String),
}
