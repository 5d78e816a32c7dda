use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use gigid_core::{Address, Credential, EventLog, LedgerEvent};

use crate::error::CredentialError;

/// Collection name, fixed at issuance.
pub const COLLECTION_NAME: &str = "GigID Credential";
/// Collection symbol, fixed at issuance.
pub const COLLECTION_SYMBOL: &str = "GIGID";

/// Token registry state. The indexes must always agree with each other, so
/// they live behind a single lock and are only mutated together.
#[derive(Default)]
struct TokenIndex {
    /// Credential records, dense by token id: `credentials[id]` is token
    /// `id`. Entries are never removed, so the next id is the length.
    credentials: Vec<Credential>,
    /// Token id → current owner.
    owners: HashMap<u64, Address>,
    /// Owner → token ids in mint order.
    tokens_by_owner: HashMap<Address, Vec<u64>>,
    /// Token id → approved identity. Grants are recorded but can never be
    /// exercised.
    approvals: HashMap<u64, Address>,
}

/// Mints and enumerates soulbound income credentials.
///
/// Per-token lifecycle: nonexistent → minted-and-held. There is no further
/// transition: no burn, no update, and every transfer attempt is rejected.
/// The only ownership assignment in the system happens inside
/// [`CredentialIssuer::mint_credential`].
pub struct CredentialIssuer {
    /// The administrator identity, the only caller allowed to mint.
    admin: Address,
    index: RwLock<TokenIndex>,
    /// Shared notification log.
    events: Arc<EventLog>,
}

impl CredentialIssuer {
    /// Create an empty issuer administered by `admin`.
    pub fn new(admin: Address, events: Arc<EventLog>) -> Self {
        tracing::info!(%admin, "credential issuer created");
        Self {
            admin,
            index: RwLock::new(TokenIndex::default()),
            events,
        }
    }

    /// Rebuild an issuer from persisted `(credential, owner)` rows, in token
    /// id order, without emitting events.
    pub fn restore(
        admin: Address,
        rows: impl IntoIterator<Item = (Credential, Address)>,
        events: Arc<EventLog>,
    ) -> Self {
        let mut index = TokenIndex::default();
        for (credential, owner) in rows {
            let id = credential.id;
            index.credentials.push(credential);
            index.owners.insert(id, owner);
            index.tokens_by_owner.entry(owner).or_default().push(id);
        }
        Self {
            admin,
            index: RwLock::new(index),
            events,
        }
    }

    /// The administrator identity.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Collection name of the issued tokens.
    pub fn name(&self) -> &'static str {
        COLLECTION_NAME
    }

    /// Collection symbol of the issued tokens.
    pub fn symbol(&self) -> &'static str {
        COLLECTION_SYMBOL
    }

    /// Mint a credential to `recipient`. Administrator only.
    ///
    /// Allocates the next sequential token id (starting at 0), stores the
    /// credential, assigns ownership, and updates both enumeration indexes
    /// together. The income total and period bounds are caller-trusted
    /// input: the issuer does not cross-check them against the ledger, and
    /// period ordering is not validated.
    pub fn mint_credential(
        &self,
        caller: Address,
        recipient: Address,
        total_income: u128,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        category: &str,
    ) -> Result<Credential, CredentialError> {
        if caller != self.admin {
            tracing::warn!(%caller, "rejected mint from non-administrator");
            return Err(CredentialError::Unauthorized { caller });
        }

        let mut index = self.index.write().expect("credential index lock poisoned");
        let id = index.credentials.len() as u64;
        let credential = Credential {
            id,
            total_income,
            period_start,
            period_end,
            category: category.to_string(),
        };
        index.credentials.push(credential.clone());
        index.owners.insert(id, recipient);
        index.tokens_by_owner.entry(recipient).or_default().push(id);
        drop(index);

        self.events.append(LedgerEvent::CredentialMinted {
            recipient,
            token_id: id,
            category: category.to_string(),
        });
        tracing::info!(%recipient, token_id = id, category, "credential minted");
        Ok(credential)
    }

    /// The credential record for a token id.
    pub fn credential(&self, token_id: u64) -> Result<Credential, CredentialError> {
        self.index
            .read()
            .expect("credential index lock poisoned")
            .credentials
            .get(token_id as usize)
            .cloned()
            .ok_or(CredentialError::NonexistentToken { token_id })
    }

    /// Current owner of a token.
    pub fn owner_of(&self, token_id: u64) -> Result<Address, CredentialError> {
        self.index
            .read()
            .expect("credential index lock poisoned")
            .owners
            .get(&token_id)
            .copied()
            .ok_or(CredentialError::NonexistentToken { token_id })
    }

    /// Number of tokens held by an identity.
    pub fn balance_of(&self, owner: Address) -> usize {
        self.index
            .read()
            .expect("credential index lock poisoned")
            .tokens_by_owner
            .get(&owner)
            .map(|ids| ids.len())
            .unwrap_or(0)
    }

    /// Total number of minted tokens.
    pub fn total_supply(&self) -> u64 {
        self.index
            .read()
            .expect("credential index lock poisoned")
            .credentials
            .len() as u64
    }

    /// Token id at a position in global mint order.
    pub fn token_by_index(&self, index: u64) -> Result<u64, CredentialError> {
        // Ids are allocated densely from 0, so mint order is the id itself.
        if index < self.total_supply() {
            Ok(index)
        } else {
            Err(CredentialError::IndexOutOfRange { index })
        }
    }

    /// Token id at a position in an owner's mint-order holdings.
    pub fn token_of_owner_by_index(
        &self,
        owner: Address,
        index: u64,
    ) -> Result<u64, CredentialError> {
        self.index
            .read()
            .expect("credential index lock poisoned")
            .tokens_by_owner
            .get(&owner)
            .and_then(|ids| ids.get(index as usize))
            .copied()
            .ok_or(CredentialError::IndexOutOfRange { index })
    }

    /// Token ids held by an identity, in mint order.
    pub fn tokens_of_owner(&self, owner: Address) -> Vec<u64> {
        self.index
            .read()
            .expect("credential index lock poisoned")
            .tokens_by_owner
            .get(&owner)
            .cloned()
            .unwrap_or_default()
    }

    /// Grant an identity approval over a token. Owner only.
    ///
    /// Grants are recorded as a convenience but can never be exercised:
    /// transfers are rejected for approved parties like everyone else.
    pub fn approve(
        &self,
        caller: Address,
        approved: Address,
        token_id: u64,
    ) -> Result<(), CredentialError> {
        let mut index = self.index.write().expect("credential index lock poisoned");
        let owner = index
            .owners
            .get(&token_id)
            .copied()
            .ok_or(CredentialError::NonexistentToken { token_id })?;
        if caller != owner {
            return Err(CredentialError::Unauthorized { caller });
        }
        index.approvals.insert(token_id, approved);
        Ok(())
    }

    /// The identity approved for a token, if any.
    pub fn get_approved(&self, token_id: u64) -> Result<Option<Address>, CredentialError> {
        let index = self.index.read().expect("credential index lock poisoned");
        if !index.owners.contains_key(&token_id) {
            return Err(CredentialError::NonexistentToken { token_id });
        }
        Ok(index.approvals.get(&token_id).copied())
    }

    /// Attempt to transfer a token. Always rejected for minted tokens.
    ///
    /// Ownership is frozen at mint: the check fires regardless of caller,
    /// recipient, or any granted approval, including self-transfers by the
    /// owner. Nothing is mutated on any path through this method.
    pub fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<(), CredentialError> {
        let index = self.index.read().expect("credential index lock poisoned");
        if !index.owners.contains_key(&token_id) {
            return Err(CredentialError::NonexistentToken { token_id });
        }
        drop(index);
        tracing::warn!(%caller, %from, %to, token_id, "rejected credential transfer");
        Err(CredentialError::NonTransferable { token_id })
    }

    /// "Safe" transfer variant. Rejected identically to [`Self::transfer_from`].
    pub fn safe_transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<(), CredentialError> {
        self.transfer_from(caller, from, to, token_id)
    }

    /// Snapshot of all `(credential, owner)` rows in token id order, for
    /// persistence.
    pub fn rows(&self) -> Vec<(Credential, Address)> {
        let index = self.index.read().expect("credential index lock poisoned");
        index
            .credentials
            .iter()
            .map(|credential| {
                let owner = index.owners[&credential.id];
                (credential.clone(), owner)
            })
            .collect()
    }
}
