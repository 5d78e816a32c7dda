use dashmap::DashMap;
use std::sync::Arc;

use gigid_core::{Address, EventLog, LedgerEvent};

use crate::error::LedgerError;

/// Allow-list of identities authorized to submit income records.
///
/// The administrator is an explicit capability fixed at construction and
/// checked by equality on every privileged call. Absence of an entry means
/// "not authorized".
pub struct VerifierRegistry {
    /// The administrator identity.
    admin: Address,
    /// Identity → authorized flag.
    verifiers: DashMap<Address, bool>,
    /// Shared notification log.
    events: Arc<EventLog>,
}

impl VerifierRegistry {
    /// Create a registry with the administrator pre-authorized as a
    /// verifier, so income can be recorded before any delegation.
    pub fn new(admin: Address, events: Arc<EventLog>) -> Self {
        let registry = Self {
            admin,
            verifiers: DashMap::new(),
            events,
        };
        registry.verifiers.insert(admin, true);
        registry.events.append(LedgerEvent::VerifierStatusChanged {
            verifier: admin,
            enabled: true,
        });
        tracing::info!(%admin, "verifier registry created");
        registry
    }

    /// Rebuild a registry from persisted entries without emitting events.
    pub fn restore(
        admin: Address,
        entries: impl IntoIterator<Item = (Address, bool)>,
        events: Arc<EventLog>,
    ) -> Self {
        let verifiers = DashMap::new();
        for (identity, enabled) in entries {
            verifiers.insert(identity, enabled);
        }
        Self {
            admin,
            verifiers,
            events,
        }
    }

    /// The administrator identity.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Set or clear the allow-list entry for an identity. Administrator only.
    ///
    /// The status-changed event is appended unconditionally, even when the
    /// stored value is unchanged: every accepted call is observable.
    pub fn set_verifier_status(
        &self,
        caller: Address,
        identity: Address,
        enabled: bool,
    ) -> Result<(), LedgerError> {
        if caller != self.admin {
            tracing::warn!(%caller, "rejected verifier status change");
            return Err(LedgerError::Unauthorized { caller });
        }
        self.verifiers.insert(identity, enabled);
        self.events.append(LedgerEvent::VerifierStatusChanged {
            verifier: identity,
            enabled,
        });
        tracing::info!(%identity, enabled, "verifier status changed");
        Ok(())
    }

    /// Whether an identity is currently authorized to record income.
    pub fn is_authorized(&self, identity: Address) -> bool {
        self.verifiers
            .get(&identity)
            .map(|entry| *entry.value())
            .unwrap_or(false)
    }

    /// Snapshot of all entries, for persistence.
    pub fn entries(&self) -> Vec<(Address, bool)> {
        self.verifiers
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address::new(bytes)
    }

    fn registry() -> (VerifierRegistry, Arc<EventLog>) {
        let events = Arc::new(EventLog::new());
        (VerifierRegistry::new(addr(1), events.clone()), events)
    }

    #[test]
    fn test_admin_is_bootstrap_verifier() {
        let (registry, events) = registry();
        assert_eq!(registry.admin(), addr(1));
        assert!(registry.is_authorized(addr(1)));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_admin_can_add_and_remove_verifiers() {
        let (registry, _events) = registry();
        registry.set_verifier_status(addr(1), addr(2), true).unwrap();
        assert!(registry.is_authorized(addr(2)));

        registry
            .set_verifier_status(addr(1), addr(2), false)
            .unwrap();
        assert!(!registry.is_authorized(addr(2)));
    }

    #[test]
    fn test_non_admin_cannot_change_status() {
        let (registry, events) = registry();
        let before = events.len();
        let result = registry.set_verifier_status(addr(2), addr(3), true);
        assert!(matches!(result, Err(LedgerError::Unauthorized { caller }) if caller == addr(2)));
        assert!(!registry.is_authorized(addr(3)));
        assert_eq!(events.len(), before);
    }

    #[test]
    fn test_unknown_identity_is_not_authorized() {
        let (registry, _events) = registry();
        assert!(!registry.is_authorized(addr(9)));
    }

    #[test]
    fn test_idempotent_writes_still_emit_events() {
        let (registry, events) = registry();
        registry.set_verifier_status(addr(1), addr(2), true).unwrap();
        registry.set_verifier_status(addr(1), addr(2), true).unwrap();
        // bootstrap + two accepted calls
        assert_eq!(events.len(), 3);
        let snapshot = events.snapshot();
        assert!(matches!(
            &snapshot[2].event,
            LedgerEvent::VerifierStatusChanged { verifier, enabled: true } if *verifier == addr(2)
        ));
    }

    #[test]
    fn test_restore_does_not_emit_events() {
        let events = Arc::new(EventLog::new());
        let registry = VerifierRegistry::restore(
            addr(1),
            vec![(addr(1), true), (addr(2), false)],
            events.clone(),
        );
        assert!(registry.is_authorized(addr(1)));
        assert!(!registry.is_authorized(addr(2)));
        assert!(events.is_empty());
    }

    #[test]
    fn test_entries_snapshot() {
        let (registry, _events) = registry();
        registry.set_verifier_status(addr(1), addr(2), true).unwrap();
        let mut entries = registry.entries();
        entries.sort_by_key(|(identity, _)| *identity);
        assert_eq!(entries, vec![(addr(1), true), (addr(2), true)]);
    }
}
