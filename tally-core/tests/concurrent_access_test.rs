//! Concurrent account access tests
//!
//! Verify that balance adjustments are race-free: N threads adjusting the
//! same account never lose an update, ids stay unique under concurrent
//! inserts, and readers never observe half-written records.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture
//! Run specific test: cargo test --test concurrent_access_test test_name -- --nocapture

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

use tempfile::TempDir;

use tally_core::adapters::duckdb::DuckDbAccountStore;
use tally_core::adapters::memory::InMemoryAccountStore;
use tally_core::ports::AccountStore;
use tally_core::services::{AccountService, UpdateBalanceRequest};

/// Number of concurrent threads for stress tests
const THREAD_COUNT: usize = 8;

/// Number of iterations per thread
const ITERATIONS_PER_THREAD: usize = 25;

fn memory_store() -> Arc<dyn AccountStore> {
    Arc::new(InMemoryAccountStore::new())
}

fn duckdb_store(temp_dir: &TempDir) -> Arc<dyn AccountStore> {
    let db_path = temp_dir.path().join("test_concurrent.duckdb");
    Arc::new(DuckDbAccountStore::new(&db_path).expect("Failed to open DuckDB store"))
}

/// Every thread adds +1 to the same account ITERATIONS_PER_THREAD times
fn hammer_single_account(store: Arc<dyn AccountStore>) {
    let account = store.insert("Shared", 0.0).unwrap();
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let error_count = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let error_count = Arc::clone(&error_count);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ITERATIONS_PER_THREAD {
                    match store.adjust_balance(account.id, 1.0) {
                        Ok(Some(_)) => {}
                        Ok(None) | Err(_) => {
                            error_count.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    println!(
        "[{}] {} adjustments in {:?}",
        store.backend(),
        THREAD_COUNT * ITERATIONS_PER_THREAD,
        start.elapsed()
    );

    assert_eq!(error_count.load(Ordering::SeqCst), 0);
    let final_balance = store.get_by_id(account.id).unwrap().unwrap().balance;
    assert_eq!(
        final_balance,
        (THREAD_COUNT * ITERATIONS_PER_THREAD) as f64,
        "[{}] lost updates",
        store.backend()
    );
}

#[test]
fn test_concurrent_adjustments_lose_no_updates_memory() {
    hammer_single_account(memory_store());
}

#[test]
fn test_concurrent_adjustments_lose_no_updates_duckdb() {
    let temp_dir = TempDir::new().unwrap();
    hammer_single_account(duckdb_store(&temp_dir));
}

/// Each thread owns one account; a shared counterpart account takes the
/// opposite side of every transfer so the total stays zero
fn transfers_between_accounts(store: Arc<dyn AccountStore>) {
    let sink = store.insert("Sink", 0.0).unwrap();
    let owned: Vec<_> = (0..THREAD_COUNT)
        .map(|i| store.insert(&format!("Owner {}", i), 0.0).unwrap())
        .collect();
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = owned
        .iter()
        .map(|account| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let id = account.id;
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ITERATIONS_PER_THREAD {
                    store.adjust_balance(id, 2.0).unwrap().unwrap();
                    store.adjust_balance(sink.id, -2.0).unwrap().unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let accounts = store.list_all().unwrap();
    let total: f64 = accounts.iter().map(|a| a.balance).sum();
    assert_eq!(total, 0.0, "[{}] money created or destroyed", store.backend());
    for account in &owned {
        let balance = store.get_by_id(account.id).unwrap().unwrap().balance;
        assert_eq!(balance, 2.0 * ITERATIONS_PER_THREAD as f64);
    }
}

#[test]
fn test_transfers_across_accounts_memory() {
    transfers_between_accounts(memory_store());
}

#[test]
fn test_transfers_across_accounts_duckdb() {
    let temp_dir = TempDir::new().unwrap();
    transfers_between_accounts(duckdb_store(&temp_dir));
}

fn concurrent_inserts_get_unique_ids(store: Arc<dyn AccountStore>) {
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_id| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..ITERATIONS_PER_THREAD)
                    .map(|i| {
                        store
                            .insert(&format!("t{}_i{}", thread_id, i), 0.0)
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        let ids = handle.join().expect("Thread panicked");
        // Ids handed to one thread are increasing in the order it asked
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        for id in ids {
            assert!(seen.insert(id), "[{}] duplicate id {}", store.backend(), id);
        }
    }

    assert_eq!(seen.len(), THREAD_COUNT * ITERATIONS_PER_THREAD);
    assert_eq!(store.list_all().unwrap().len(), seen.len());
}

#[test]
fn test_concurrent_inserts_unique_ids_memory() {
    concurrent_inserts_get_unique_ids(memory_store());
}

#[test]
fn test_concurrent_inserts_unique_ids_duckdb() {
    let temp_dir = TempDir::new().unwrap();
    concurrent_inserts_get_unique_ids(duckdb_store(&temp_dir));
}

/// A reader racing replace() sees either the old record or the new one
fn readers_never_see_partial_records(store: Arc<dyn AccountStore>) {
    let account = store.insert("before", 1.0).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..ITERATIONS_PER_THREAD * 4 {
                let (name, balance) = if i % 2 == 0 { ("after", 2.0) } else { ("before", 1.0) };
                store.replace(account.id, name, balance).unwrap().unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..THREAD_COUNT / 2)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    let seen = store.get_by_id(account.id).unwrap().unwrap();
                    let consistent = matches!(
                        (seen.name.as_str(), seen.balance),
                        ("before", b) if b == 1.0
                    ) || matches!(
                        (seen.name.as_str(), seen.balance),
                        ("after", b) if b == 2.0
                    );
                    assert!(consistent, "torn read: {:?}", seen);
                }
            })
        })
        .collect();

    writer.join().expect("Writer panicked");
    for reader in readers {
        reader.join().expect("Reader panicked");
    }
}

#[test]
fn test_readers_never_see_partial_records_memory() {
    readers_never_see_partial_records(memory_store());
}

#[test]
fn test_readers_never_see_partial_records_duckdb() {
    let temp_dir = TempDir::new().unwrap();
    readers_never_see_partial_records(duckdb_store(&temp_dir));
}

/// Adjustments racing a delete either land before it or report not-found
#[test]
fn test_adjust_racing_delete() {
    let store = memory_store();
    let service = AccountService::new(Arc::clone(&store));
    let account = store.insert("Doomed", 0.0).unwrap();
    let id = account.id.to_string();
    let barrier = Arc::new(Barrier::new(2));

    let adjuster = {
        let service = service.clone();
        let barrier = Arc::clone(&barrier);
        let id = id.clone();
        thread::spawn(move || {
            barrier.wait();
            let mut applied = 0;
            for _ in 0..ITERATIONS_PER_THREAD {
                match service.update_balance(&id, UpdateBalanceRequest::new(1.0)) {
                    Ok(_) => applied += 1,
                    Err(e) => assert_eq!(e.status_code(), 404, "unexpected error: {}", e),
                }
            }
            applied
        })
    };

    barrier.wait();
    service.delete_account(&id).unwrap();
    adjuster.join().expect("Adjuster panicked");

    assert!(store.get_by_id(account.id).unwrap().is_none());
}

/// Several store instances opened on different files in parallel
#[test]
fn test_parallel_opens_of_separate_databases() {
    let temp_dir = TempDir::new().unwrap();
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|i| {
            let path = temp_dir.path().join(format!("db_{}.duckdb", i));
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let store = DuckDbAccountStore::new(&path).unwrap();
                store.insert("only", i as f64).unwrap()
            })
        })
        .collect();

    for handle in handles {
        let account = handle.join().expect("Thread panicked");
        assert_eq!(account.id, 1);
    }
}
