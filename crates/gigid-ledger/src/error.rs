use gigid_core::Address;

/// Income ledger and verifier registry errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Caller is not the administrator.
    #[error("unauthorized: {caller} is not the administrator")]
    Unauthorized { caller: Address },

    /// Caller is not on the verifier allow-list.
    #[error("not authorized: {caller} is not an authorized verifier")]
    NotAuthorized { caller: Address },

    /// The worker is the null identity.
    #[error("invalid worker address")]
    InvalidWorker,

    /// The amount must be greater than zero.
    #[error("amount must be greater than zero")]
    InvalidAmount,
}
