use gigid_core::Address;

/// Credential issuer errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Caller lacks the required role.
    #[error("unauthorized: {caller} may not perform this operation")]
    Unauthorized { caller: Address },

    /// Minted credentials can never change owner.
    #[error("credential {token_id} is non-transferable")]
    NonTransferable { token_id: u64 },

    /// The token id was never minted.
    #[error("credential {token_id} does not exist")]
    NonexistentToken { token_id: u64 },

    /// Enumeration index past the end.
    #[error("index {index} out of range")]
    IndexOutOfRange { index: u64 },
}
