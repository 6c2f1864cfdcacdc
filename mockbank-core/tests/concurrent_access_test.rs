//! Concurrent store access tests
//!
//! The ledger assumes a single writer, but the file store still has to stay
//! consistent when several processes share one data directory. Writers that
//! race must see `ConcurrentModification` instead of silently overwriting,
//! and readers must never observe a half-written collection.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use mockbank_core::adapters::JsonFileStore;
use mockbank_core::ports::UserStore;
use mockbank_core::services::{AccountService, LedgerService};
use mockbank_core::{Error, OperationKind, Session};

/// Number of concurrent threads for stress tests.
/// Keep this realistic - at most a few CLI processes share a data directory.
const THREAD_COUNT: usize = 6;

/// Number of deposits per thread
const ITERATIONS_PER_THREAD: usize = 5;

const ACCOUNT: &str = "1111111111";
const PIN: &str = "1234";

fn setup(temp_dir: &TempDir) {
    let store = Arc::new(JsonFileStore::new(temp_dir.path()).unwrap());
    AccountService::new(store, 0)
        .register_with_number(ACCOUNT, "Ada", PIN, Some(0))
        .unwrap();
}

/// Each thread opens its own store, the way separate CLI invocations would,
/// and resubmits a deposit whenever it loses the race.
#[test]
fn test_racing_writers_lose_no_deposits() {
    let temp_dir = TempDir::new().unwrap();
    setup(&temp_dir);

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let conflicts = Arc::new(AtomicUsize::new(0));
    let dir = Arc::new(temp_dir.path().to_path_buf());

    let mut handles = vec![];
    for _ in 0..THREAD_COUNT {
        let barrier = Arc::clone(&barrier);
        let conflicts = Arc::clone(&conflicts);
        let dir = Arc::clone(&dir);

        handles.push(thread::spawn(move || {
            let ledger = LedgerService::new(Arc::new(JsonFileStore::new(&dir).unwrap()));
            let session = Session::new(ACCOUNT);
            barrier.wait();

            for _ in 0..ITERATIONS_PER_THREAD {
                loop {
                    match ledger.apply_operation(&session, OperationKind::Deposit, "10", PIN) {
                        Ok(_) => break,
                        Err(Error::ConcurrentModification) => {
                            conflicts.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(1));
                        }
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    println!("Conflicts resolved by resubmitting: {}", conflicts.load(Ordering::SeqCst));

    let store = JsonFileStore::new(&dir).unwrap();
    let user = store.find_by_account_id(ACCOUNT).unwrap().unwrap();
    let expected_count = THREAD_COUNT * ITERATIONS_PER_THREAD;
    assert_eq!(user.transactions.len(), expected_count);
    assert_eq!(user.current_balance(), 10 * expected_count as i64);
    for pair in user.transactions.windows(2) {
        assert_eq!(pair[0].balance_after, pair[1].balance_before);
    }
}

/// Readers polling during a burst of writes always get a whole collection
#[test]
fn test_readers_never_see_partial_writes() {
    let temp_dir = TempDir::new().unwrap();
    setup(&temp_dir);
    let dir = temp_dir.path().to_path_buf();

    let done = Arc::new(AtomicBool::new(false));
    let reads = Arc::new(AtomicUsize::new(0));

    let reader = {
        let done = Arc::clone(&done);
        let reads = Arc::clone(&reads);
        let dir = dir.clone();
        thread::spawn(move || {
            let store = JsonFileStore::new(&dir).unwrap();
            while !done.load(Ordering::SeqCst) {
                let users = store
                    .load_all()
                    .expect("reader observed an unreadable collection");
                assert_eq!(users.len(), 1);
                reads.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let ledger = LedgerService::new(Arc::new(JsonFileStore::new(&dir).unwrap()));
    let session = Session::new(ACCOUNT);
    for _ in 0..50 {
        ledger
            .apply_operation(&session, OperationKind::Deposit, "1", PIN)
            .unwrap();
    }
    done.store(true, Ordering::SeqCst);
    reader.join().unwrap();

    println!("Reads performed: {}", reads.load(Ordering::SeqCst));
    assert_eq!(ledger.balance(&session).unwrap(), 50);
}
