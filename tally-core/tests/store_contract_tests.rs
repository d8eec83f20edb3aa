//! AccountStore contract tests
//!
//! Every property here must hold for both adapters, so each test runs once
//! against the in-memory store and once against a DuckDB file.
//!
//! Run with: cargo test --test store_contract_tests -- --nocapture

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use tally_core::adapters::duckdb::DuckDbAccountStore;
use tally_core::adapters::memory::InMemoryAccountStore;
use tally_core::ports::AccountStore;
use tally_core::Error;

// ============================================================================
// Test Helpers
// ============================================================================

/// Both adapters; the TempDir must outlive the DuckDB store
fn stores() -> Vec<(TempDir, Arc<dyn AccountStore>)> {
    let memory_dir = TempDir::new().unwrap();
    let duck_dir = TempDir::new().unwrap();
    let db_path = duck_dir.path().join("contract.duckdb");
    let duck = DuckDbAccountStore::new(&db_path).expect("Failed to open DuckDB store");

    vec![
        (memory_dir, Arc::new(InMemoryAccountStore::new()) as Arc<dyn AccountStore>),
        (duck_dir, Arc::new(duck) as Arc<dyn AccountStore>),
    ]
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn test_insert_ids_unique_and_strictly_increasing() {
    for (_dir, store) in stores() {
        let ids: Vec<i64> = (0..20)
            .map(|i| store.insert(&format!("acct {}", i), i as f64).unwrap().id)
            .collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]), "{}: {:?}", store.backend(), ids);
        assert_eq!(ids[0], 1, "{}: first id", store.backend());
    }
}

#[test]
fn test_ids_never_reused_after_delete() {
    for (_dir, store) in stores() {
        let a = store.insert("a", 0.0).unwrap();
        let b = store.insert("b", 0.0).unwrap();
        assert!(store.remove(b.id).unwrap());
        assert!(store.remove(a.id).unwrap());

        let c = store.insert("c", 0.0).unwrap();
        assert!(c.id > b.id, "{}: id {} reused", store.backend(), c.id);
    }
}

// ============================================================================
// Balance adjustments
// ============================================================================

#[test]
fn test_adjustments_compose_independently_of_other_accounts() {
    for (_dir, store) in stores() {
        let target = store.insert("target", 10.0).unwrap();
        let other = store.insert("other", 0.0).unwrap();

        store.adjust_balance(target.id, 2.5).unwrap();
        store.adjust_balance(other.id, 1000.0).unwrap();
        store.adjust_balance(target.id, -7.5).unwrap();
        store.adjust_balance(other.id, -1.0).unwrap();

        let target = store.get_by_id(target.id).unwrap().unwrap();
        assert_eq!(target.balance, 10.0 + 2.5 - 7.5, "{}", store.backend());
    }
}

#[test]
fn test_alice_scenario() {
    for (_dir, store) in stores() {
        let alice = store.insert("Alice", 100.0).unwrap();
        assert_eq!(alice.id, 1);
        assert_eq!(alice.balance, 100.0);

        assert_eq!(store.adjust_balance(1, -30.0).unwrap().unwrap().balance, 70.0);
        assert_eq!(store.adjust_balance(1, 70.0).unwrap().unwrap().balance, 140.0);
        assert!(store.remove(1).unwrap());
        assert!(store.get_by_id(1).unwrap().is_none());
        assert!(!store.remove(1).unwrap());
    }
}

#[test]
fn test_balance_may_go_negative_or_zero() {
    for (_dir, store) in stores() {
        let a = store.insert("a", 5.0).unwrap();
        assert_eq!(store.adjust_balance(a.id, -5.0).unwrap().unwrap().balance, 0.0);
        assert_eq!(store.adjust_balance(a.id, -20.0).unwrap().unwrap().balance, -20.0);
    }
}

#[test]
fn test_overflowing_adjustment_is_rejected_and_nothing_written() {
    for (_dir, store) in stores() {
        let big = store.insert("Big", f64::MAX).unwrap();

        let err = store.adjust_balance(big.id, f64::MAX).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{}: {:?}", store.backend(), err);

        let stored = store.get_by_id(big.id).unwrap().unwrap();
        assert_eq!(stored.balance, f64::MAX, "{}", store.backend());
        assert!(stored.validate().is_ok());

        // An absent id is still reported as absent, not as rejected
        assert!(store.adjust_balance(big.id + 100, f64::MAX).unwrap().is_none());
    }
}

#[test]
fn test_non_finite_values_never_stored() {
    for (_dir, store) in stores() {
        let a = store.insert("a", 1.0).unwrap();

        assert!(matches!(store.insert("b", f64::INFINITY), Err(Error::Validation(_))));
        assert!(matches!(store.replace(a.id, "a", f64::NAN), Err(Error::Validation(_))));

        let all = store.list_all().unwrap();
        assert_eq!(all, vec![a], "{}", store.backend());
    }
}

// ============================================================================
// Replace / remove
// ============================================================================

#[test]
fn test_replace_missing_id_leaves_store_unchanged() {
    for (_dir, store) in stores() {
        store.insert("a", 1.0).unwrap();
        store.insert("b", 2.0).unwrap();
        let before = store.list_all().unwrap();

        assert!(store.replace(99, "ghost", 0.0).unwrap().is_none());
        assert!(store.adjust_balance(99, 1.0).unwrap().is_none());
        assert_eq!(store.list_all().unwrap(), before, "{}", store.backend());
    }
}

#[test]
fn test_remove_then_get_is_absent() {
    for (_dir, store) in stores() {
        let a = store.insert("a", 1.0).unwrap();
        let b = store.insert("b", 1.0).unwrap();

        assert!(store.remove(a.id).unwrap());
        assert!(store.get_by_id(a.id).unwrap().is_none());
        assert!(store.get_by_id(b.id).unwrap().is_some());

        let ids: Vec<i64> = store.list_all().unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![b.id]);
    }
}

// ============================================================================
// Round trip / created_at immutability
// ============================================================================

#[test]
fn test_round_trip_and_created_at_is_immutable() {
    for (_dir, store) in stores() {
        let created = store.insert("Savings", 42.25).unwrap();

        let fetched = store.get_by_id(created.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Savings");
        assert_eq!(fetched.balance, 42.25);
        assert_eq!(fetched.created_at, created.created_at);

        thread::sleep(Duration::from_millis(5));
        store.adjust_balance(created.id, 1.0).unwrap();
        store.replace(created.id, "Renamed", -3.0).unwrap();

        let after = store.get_by_id(created.id).unwrap().unwrap();
        assert_eq!(after.name, "Renamed");
        assert_eq!(after.balance, -3.0);
        assert_eq!(after.created_at, created.created_at, "{}", store.backend());
    }
}

// ============================================================================
// DuckDB persistence
// ============================================================================

#[test]
fn test_duckdb_persists_records_and_id_sequence_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("persist.duckdb");

    let (kept, deleted) = {
        let store = DuckDbAccountStore::new(&db_path).unwrap();
        let kept = store.insert("kept", 12.0).unwrap();
        let deleted = store.insert("deleted", 1.0).unwrap();
        store.remove(deleted.id).unwrap();
        (kept, deleted)
    };

    let store = DuckDbAccountStore::new(&db_path).unwrap();
    let reloaded = store.get_by_id(kept.id).unwrap().unwrap();
    assert_eq!(reloaded, kept);

    let next = store.insert("next", 0.0).unwrap();
    assert!(next.id > deleted.id, "sequence restarted: {}", next.id);
}

#[test]
fn test_duckdb_stores_created_at_as_iso8601_text() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("layout.duckdb");
    let created = {
        let store = DuckDbAccountStore::new(&db_path).unwrap();
        store.insert("a", 1.0).unwrap()
    };

    let conn = duckdb::Connection::open(&db_path).unwrap();
    let raw: String = conn
        .query_row("SELECT created_at FROM accounts WHERE id = ?", [created.id], |row| row.get(0))
        .unwrap();
    let parsed = chrono::DateTime::parse_from_rfc3339(&raw).unwrap();
    assert_eq!(parsed.with_timezone(&chrono::Utc), created.created_at);
}
