// Concurrent access through one shared cache instance
//
// - concurrent updates never interleave
// - reentrant access from an update callback is rejected, other threads wait
// - readers never observe a partially written entry

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use filecache::codec::{I64Codec, ListCodec};
use filecache::{CacheError, CacheUpdate, FileCache, ReadWriteCoordinator};
use tempfile::TempDir;

const THREADS: usize = 8;
const UPDATES_PER_THREAD: usize = 25;

#[test]
fn test_concurrent_updates_do_not_interleave() {
    let dir = TempDir::new().unwrap();
    let cache: Arc<FileCache<i64>> = Arc::new(FileCache::new(dir.path().join("counter"), I64Codec));
    cache.set_value(&0).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..UPDATES_PER_THREAD {
                    cache
                        .update_value(|value| Some(value.unwrap_or(0) + 1))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        cache.get_value().unwrap(),
        (THREADS * UPDATES_PER_THREAD) as i64
    );
}

#[test]
fn test_concurrent_snapshot_updates_see_previous_result() {
    let dir = TempDir::new().unwrap();
    let cache: Arc<FileCache<Vec<i64>>> = Arc::new(FileCache::new(
        dir.path().join("log"),
        ListCodec::new(I64Codec),
    ));

    let handles: Vec<_> = (0..THREADS as i64)
        .map(|id| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..UPDATES_PER_THREAD {
                    cache
                        .update(|snapshot| {
                            let mut log = snapshot.map(|s| s.into_value()).unwrap_or_default();
                            log.push(id);
                            Some(CacheUpdate::now(log))
                        })
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let log = cache.get_value().unwrap();
    assert_eq!(log.len(), THREADS * UPDATES_PER_THREAD);
    for id in 0..THREADS as i64 {
        assert_eq!(
            log.iter().filter(|&&entry| entry == id).count(),
            UPDATES_PER_THREAD
        );
    }
}

#[test]
fn test_reentrant_calls_fail_instead_of_deadlocking() {
    let dir = TempDir::new().unwrap();
    let cache: FileCache<i64> = FileCache::new(dir.path().join("counter"), I64Codec);
    cache.set_value(&1).unwrap();

    let mut results = Vec::new();
    cache
        .update_value(|value| {
            results.push(cache.get_value().map(|_| ()));
            results.push(cache.is_present().map(|_| ()));
            results.push(cache.set_value(&5));
            results.push(cache.delete());
            results.push(cache.touch());
            results.push(cache.update_value(|v| v));
            value
        })
        .unwrap();

    assert_eq!(results.len(), 6);
    for result in results {
        assert!(matches!(result, Err(CacheError::IllegalReentrantAccess)));
    }
    assert_eq!(cache.get_value().unwrap(), 1);
}

#[test]
fn test_other_threads_wait_for_running_update() {
    let dir = TempDir::new().unwrap();
    let cache: Arc<FileCache<i64>> = Arc::new(FileCache::new(dir.path().join("slow"), I64Codec));
    cache.set_value(&1).unwrap();

    let (entered_tx, entered_rx) = mpsc::channel();
    let updater = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            cache
                .update_value(|value| {
                    entered_tx.send(()).unwrap();
                    thread::sleep(Duration::from_millis(100));
                    value.map(|v| v * 10)
                })
                .unwrap();
        })
    };

    entered_rx.recv().unwrap();
    // Blocks until the update finished, then sees its result
    assert_eq!(cache.get_value().unwrap(), 10);
    updater.join().unwrap();
}

#[test]
fn test_readers_never_see_torn_entries() {
    let dir = TempDir::new().unwrap();
    let cache: Arc<FileCache<Vec<i64>>> = Arc::new(FileCache::new(
        dir.path().join("list"),
        ListCodec::new(I64Codec),
    ));
    cache.set_value(&vec![0; 512]).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let cache = Arc::clone(&cache);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for round in 1..=50 {
                cache.set_value(&vec![round; 512]).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    let list = cache.get_value().unwrap();
                    assert_eq!(list.len(), 512);
                    assert!(list.iter().all(|&v| v == list[0]));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_coordinator_try_acquire_across_threads() {
    let coordinator = Arc::new(ReadWriteCoordinator::new());

    coordinator.acquire_read();
    coordinator.acquire_read();
    {
        let coordinator = Arc::clone(&coordinator);
        let acquired = thread::spawn(move || coordinator.try_acquire_write())
            .join()
            .unwrap();
        assert!(!acquired);
    }
    coordinator.release_read();
    coordinator.release_read();

    coordinator.acquire_write();
    {
        let other = Arc::clone(&coordinator);
        let (read, write) = thread::spawn(move || (other.try_acquire_read(), other.try_acquire_write()))
            .join()
            .unwrap();
        assert!(!read);
        assert!(!write);
    }
    coordinator.release_write();

    assert!(coordinator.try_acquire_write());
    coordinator.release_write();
    assert!(coordinator.try_acquire_read());
    coordinator.release_read();
}
