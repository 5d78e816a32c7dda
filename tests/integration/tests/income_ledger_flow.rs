//! Integration test: verifier management and income recording across crates.
//!
//! Exercises gigid-ledger's registry and ledger against the shared event
//! log from gigid-core.

use std::sync::Arc;

use gigid_core::{Address, AttestationRef, EventLog, LedgerEvent};
use gigid_ledger::{IncomeLedger, LedgerError, VerifierRegistry};

fn addr(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    Address::new(bytes)
}

/// Helper: a registry and ledger sharing one event log, administered by
/// `admin`.
fn deploy(admin: Address) -> (Arc<VerifierRegistry>, IncomeLedger, Arc<EventLog>) {
    let events = Arc::new(EventLog::new());
    let registry = Arc::new(VerifierRegistry::new(admin, events.clone()));
    let ledger = IncomeLedger::new(registry.clone(), events.clone());
    (registry, ledger, events)
}

// =========================================================================
// Verifier delegation flow
// =========================================================================

#[test]
fn test_admin_delegates_and_verifier_records() {
    let admin = addr(1);
    let verifier = addr(2);
    let worker = addr(3);
    let (registry, ledger, _events) = deploy(admin);

    registry
        .set_verifier_status(admin, verifier, true)
        .expect("admin can delegate");

    let record = ledger
        .record_income(verifier, worker, 1000, "Uber", AttestationRef::from_label("ref1"))
        .expect("delegated verifier can record");

    let incomes = ledger.worker_incomes(worker);
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0], record);
    assert_eq!(incomes[0].amount, 1000);
    assert_eq!(incomes[0].source, "Uber");
    assert!(incomes[0].verified);
    assert_eq!(ledger.income_count(worker), incomes.len());
}

#[test]
fn test_admin_can_record_before_delegating() {
    let admin = addr(1);
    let (_registry, ledger, _events) = deploy(admin);

    // The deployer is a bootstrap verifier.
    ledger
        .record_income(admin, addr(3), 500, "Upwork", AttestationRef::from_label("job"))
        .expect("admin records without delegation");
    assert_eq!(ledger.income_count(addr(3)), 1);
}

#[test]
fn test_revocation_closes_the_door() {
    let admin = addr(1);
    let verifier = addr(2);
    let (registry, ledger, _events) = deploy(admin);

    registry.set_verifier_status(admin, verifier, true).unwrap();
    ledger
        .record_income(verifier, addr(3), 100, "Uber", AttestationRef::from_label("a"))
        .unwrap();

    registry.set_verifier_status(admin, verifier, false).unwrap();
    let result = ledger.record_income(
        verifier,
        addr(3),
        100,
        "Uber",
        AttestationRef::from_label("b"),
    );
    assert!(matches!(result, Err(LedgerError::NotAuthorized { .. })));

    // The earlier record is untouched.
    assert_eq!(ledger.income_count(addr(3)), 1);
}

#[test]
fn test_unauthorized_cannot_change_allow_list() {
    let admin = addr(1);
    let intruder = addr(9);
    let (registry, _ledger, events) = deploy(admin);
    let before = events.len();

    let result = registry.set_verifier_status(intruder, intruder, true);
    assert!(matches!(result, Err(LedgerError::Unauthorized { caller }) if caller == intruder));
    assert!(!registry.is_authorized(intruder));
    assert_eq!(events.len(), before);
}

// =========================================================================
// Event log reconstruction
// =========================================================================

#[test]
fn test_event_log_tells_the_whole_story() {
    let admin = addr(1);
    let verifier = addr(2);
    let worker = addr(3);
    let (registry, ledger, events) = deploy(admin);

    registry.set_verifier_status(admin, verifier, true).unwrap();
    let r = AttestationRef::from_label("ref1");
    ledger.record_income(verifier, worker, 1000, "Uber", r).unwrap();

    let log = events.snapshot();
    assert_eq!(log.len(), 3);
    assert_eq!(
        log[0].event,
        LedgerEvent::VerifierStatusChanged {
            verifier: admin,
            enabled: true,
        }
    );
    assert_eq!(
        log[1].event,
        LedgerEvent::VerifierStatusChanged {
            verifier,
            enabled: true,
        }
    );
    assert_eq!(
        log[2].event,
        LedgerEvent::IncomeRecorded {
            worker,
            amount: 1000,
            source: "Uber".into(),
            attestation_ref: r,
        }
    );

    // Sequences are dense and ordered.
    for (i, record) in log.iter().enumerate() {
        assert_eq!(record.sequence, i as u64);
    }
}

#[test]
fn test_rejected_operations_leave_no_trace_in_the_log() {
    let admin = addr(1);
    let (registry, ledger, events) = deploy(admin);
    let before = events.len();

    let _ = registry.set_verifier_status(addr(9), addr(9), true);
    let _ = ledger.record_income(addr(9), addr(3), 1, "x", AttestationRef::from_label("r"));
    let _ = ledger.record_income(admin, Address::ZERO, 1, "x", AttestationRef::from_label("r"));
    let _ = ledger.record_income(admin, addr(3), 0, "x", AttestationRef::from_label("r"));

    assert_eq!(events.len(), before);
}
