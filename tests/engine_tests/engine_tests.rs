//! Tests for Engine
//!
//! These tests verify:
//! - Basic create/read/delete operations
//! - Tombstone and empty-payload reads
//! - Deleted-byte statistics
//! - Engine lifecycle (open/close/wipe)
//! - Concurrent access patterns

use std::fs;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;
use yourdb::config::{Config, SyncStrategy};
use yourdb::engine::{Engine, EngineStats};
use yourdb::link::LinkEntry;
use yourdb::StorageError;

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config(temp_dir: &TempDir) -> Config {
    Config::builder()
        .base_path(temp_dir.path().join("mystorage"))
        .sync_strategy(SyncStrategy::EveryWrite)
        .build()
}

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(test_config(&temp_dir)).unwrap();
    (temp_dir, engine)
}

/// Payload `i` is `i - 1` blocks of 16 distinct bytes
fn sample_payloads(count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let blocks = i.saturating_sub(1);
            (0..blocks * 16).map(|b| (b * 7 + i * 13) as u8).collect()
        })
        .collect()
}

// =============================================================================
// Open/Close Tests
// =============================================================================

#[test]
fn test_open_creates_files() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);

    let engine = Engine::open(config.clone()).unwrap();

    assert!(config.link_path().exists());
    assert!(config.meta_path().exists());
    assert!(config.store_path().exists());
    assert_eq!(engine.base_path(), config.base_path.as_path());
    engine.close().unwrap();
}

#[test]
fn test_file_names_append_extensions() {
    let config = Config::builder().base_path("/data/objects.v1").build();

    assert_eq!(config.link_path().to_str(), Some("/data/objects.v1.link"));
    assert_eq!(config.meta_path().to_str(), Some("/data/objects.v1.meta"));
    assert_eq!(config.store_path().to_str(), Some("/data/objects.v1.store"));
}

#[test]
fn test_open_creates_parent_directory() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("nested").join("dir").join("db");

    let engine = Engine::open_path(&base).unwrap();

    assert!(base.parent().unwrap().is_dir());
    assert_eq!(engine.config().sync_strategy, SyncStrategy::Never);
}

#[test]
fn test_open_fails_when_file_cannot_be_opened() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    // A directory where the index file should be
    fs::create_dir_all(config.link_path()).unwrap();

    let result = Engine::open(config);
    assert!(matches!(result, Err(StorageError::Io(_))));
}

#[test]
fn test_first_and_second_open() {
    let temp_dir = TempDir::new().unwrap();

    Engine::open(test_config(&temp_dir)).unwrap().close().unwrap();
    Engine::open(test_config(&temp_dir)).unwrap().close().unwrap();
}

#[test]
fn test_close_twice_reports_error() {
    let (_temp, engine) = setup_temp_engine();

    engine.close().unwrap();
    assert!(matches!(engine.close(), Err(StorageError::Closed("store"))));
}

#[test]
fn test_operations_after_close_fail() {
    let (_temp, engine) = setup_temp_engine();
    let id = engine.create(b"abc").unwrap();
    engine.close().unwrap();

    assert!(matches!(engine.create(b"x"), Err(StorageError::Closed(_))));
    assert!(matches!(engine.read(id), Err(StorageError::Closed(_))));
    assert!(matches!(engine.delete(id), Err(StorageError::Closed(_))));
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_create_and_read() {
    let (_temp, engine) = setup_temp_engine();

    let id = engine.create(&[1, 2, 3]).unwrap();

    assert_eq!(id, 0);
    assert_eq!(engine.read(id).unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_ids_are_sequential() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(engine.create(&[65]).unwrap(), 0);
    assert_eq!(engine.create(&[66, 66]).unwrap(), 1);
    assert_eq!(engine.create(b"third").unwrap(), 2);

    assert_eq!(engine.read(1).unwrap(), vec![66, 66]);
}

#[test]
fn test_create_empty_payload() {
    let (_temp, engine) = setup_temp_engine();

    let id = engine.create(&[]).unwrap();

    assert_eq!(engine.read(id).unwrap(), Vec::<u8>::new());
    assert_eq!(engine.stats().unwrap().end, 0);
}

#[test]
fn test_read_unknown_id_fails() {
    let (_temp, engine) = setup_temp_engine();
    engine.create(b"only").unwrap();

    let err = engine.read(1).unwrap_err();
    assert!(matches!(err, StorageError::ShortRead { .. }));
    assert!(err.is_partial_data());
}

#[test]
fn test_read_truncated_blob_is_partial_data() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let engine = Engine::open(config.clone()).unwrap();
    let id = engine.create(b"0123456789").unwrap();

    // Lose the tail of the blob file behind the engine's back
    let store = fs::OpenOptions::new().write(true).open(config.store_path()).unwrap();
    store.set_len(4).unwrap();

    let err = engine.read(id).unwrap_err();
    assert!(matches!(err, StorageError::PartialData { expected: 10, actual: 4 }));
    assert!(err.is_partial_data());
}

#[test]
fn test_read_corrupt_length_is_partial_data() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let engine = Engine::open(config.clone()).unwrap();
    let id = engine.create(b"0123456789").unwrap();

    // Slot claims far more bytes than the blob file holds
    fs::write(config.link_path(), LinkEntry::new(2, 1 << 46).encode()).unwrap();

    let err = engine.read(id).unwrap_err();
    assert!(matches!(
        err,
        StorageError::PartialData { expected, actual: 8 } if expected == 1 << 46
    ));

    // Start past the end of the blob file
    fs::write(config.link_path(), LinkEntry::new(1 << 40, 4).encode()).unwrap();
    assert!(matches!(
        engine.read(id),
        Err(StorageError::PartialData { expected: 4, actual: 0 })
    ));

    // Range end overflows a u64
    fs::write(config.link_path(), LinkEntry::new(u64::MAX, 4).encode()).unwrap();
    assert!(matches!(
        engine.read(id),
        Err(StorageError::PartialData { expected: 4, actual: 0 })
    ));
}

#[test]
fn test_many_records_round_trip_after_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let payloads = sample_payloads(100);

    let ids: Vec<u64> = {
        let engine = Engine::open(test_config(&temp_dir)).unwrap();
        let ids: Vec<u64> = payloads.iter().map(|p| engine.create(p).unwrap()).collect();
        engine.close().unwrap();
        ids
    };

    let engine = Engine::open(test_config(&temp_dir)).unwrap();
    for (id, payload) in ids.iter().zip(&payloads) {
        assert_eq!(&engine.read(*id).unwrap(), payload);
    }

    let total: u64 = payloads.iter().map(|p| p.len() as u64).sum();
    let stats = engine.stats().unwrap();
    assert_eq!(stats.records, 100);
    assert_eq!(stats.end, total);
    assert_eq!(stats.blob_bytes, total);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_then_read_is_empty() {
    let (_temp, engine) = setup_temp_engine();

    let a = engine.create(&[65]).unwrap();
    let b = engine.create(&[66, 66]).unwrap();
    engine.delete(a).unwrap();

    assert_eq!(engine.read(a).unwrap(), Vec::<u8>::new());
    assert_eq!(engine.read(b).unwrap(), vec![66, 66]);
}

#[test]
fn test_delete_tracks_freed_bytes() {
    let (_temp, engine) = setup_temp_engine();

    let a = engine.create(b"12345").unwrap();
    let b = engine.create(b"123").unwrap();
    engine.delete(a).unwrap();
    engine.delete(b).unwrap();

    // A second delete frees nothing
    engine.delete(a).unwrap();

    assert_eq!(
        engine.stats().unwrap(),
        EngineStats {
            records: 2,
            end: 8,
            deleted_bytes: 8,
            blob_bytes: 8,
        }
    );
}

#[test]
fn test_delete_does_not_reclaim_space() {
    let (_temp, engine) = setup_temp_engine();

    let a = engine.create(b"aaaa").unwrap();
    engine.delete(a).unwrap();
    let b = engine.create(b"bbbb").unwrap();

    assert_eq!(b, 1);
    let stats = engine.stats().unwrap();
    assert_eq!(stats.blob_bytes, 8);
    assert_eq!(stats.end, 8);
}

#[test]
fn test_delete_unknown_id_fails() {
    let (_temp, engine) = setup_temp_engine();

    let result = engine.delete(7);
    assert!(matches!(result, Err(StorageError::ShortRead { expected: 8, .. })));
    assert_eq!(engine.stats().unwrap().deleted_bytes, 0);
}

#[test]
fn test_delete_all_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let payloads = sample_payloads(50);

    {
        let engine = Engine::open(test_config(&temp_dir)).unwrap();
        for payload in &payloads {
            engine.create(payload).unwrap();
        }
        for id in 0..payloads.len() as u64 {
            engine.delete(id).unwrap();
        }
        engine.close().unwrap();
    }

    let engine = Engine::open(test_config(&temp_dir)).unwrap();
    for id in 0..payloads.len() as u64 {
        assert!(engine.read(id).unwrap().is_empty());
    }
    let total: u64 = payloads.iter().map(|p| p.len() as u64).sum();
    assert_eq!(engine.stats().unwrap().deleted_bytes, total);
}

// =============================================================================
// Wipe Tests
// =============================================================================

#[test]
fn test_wipe_removes_files() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let engine = Engine::open(config.clone()).unwrap();
    engine.create(b"gone soon").unwrap();

    engine.close().unwrap();
    engine.wipe().unwrap();

    assert!(!config.link_path().exists());
    assert!(!config.meta_path().exists());
    assert!(!config.store_path().exists());
}

#[test]
fn test_wipe_with_missing_file_removes_the_rest() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let engine = Engine::open(config.clone()).unwrap();
    engine.close().unwrap();

    // Blob file already gone: wipe still removes the other two
    fs::remove_file(config.store_path()).unwrap();
    assert!(matches!(engine.wipe(), Err(StorageError::Io(_))));
    assert!(!config.link_path().exists());
    assert!(!config.meta_path().exists());
}

#[test]
fn test_reopen_after_wipe_starts_fresh() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = Engine::open(test_config(&temp_dir)).unwrap();
        engine.create(b"old").unwrap();
        engine.close().unwrap();
        engine.wipe().unwrap();
    }

    let engine = Engine::open(test_config(&temp_dir)).unwrap();
    assert_eq!(engine.create(b"new").unwrap(), 0);
    assert_eq!(engine.stats().unwrap().end, 3);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_creates_get_unique_ids() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    let num_threads = 8;
    let per_thread = 25;

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                (0..per_thread)
                    .map(|i| {
                        let payload = format!("thread{}-record{}", t, i).into_bytes();
                        let id = engine.create(&payload).unwrap();
                        (id, payload)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut created: Vec<(u64, Vec<u8>)> = Vec::new();
    for handle in handles {
        created.extend(handle.join().unwrap());
    }

    let mut ids: Vec<u64> = created.iter().map(|(id, _)| *id).collect();
    ids.sort_unstable();
    let expected: Vec<u64> = (0..(num_threads * per_thread) as u64).collect();
    assert_eq!(ids, expected);

    for (id, payload) in &created {
        assert_eq!(&engine.read(*id).unwrap(), payload);
    }

    let stats = engine.stats().unwrap();
    assert_eq!(stats.end, stats.blob_bytes);
}

#[test]
fn test_concurrent_reads_and_deletes() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    for i in 0..40u8 {
        engine.create(&[i; 10]).unwrap();
    }

    let deleter = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for id in (0..40u64).filter(|id| id % 2 == 0) {
                engine.delete(id).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for id in 0..40u64 {
                    let data = engine.read(id).unwrap();
                    // Either the original payload or a tombstone
                    assert!(data.is_empty() || data == vec![id as u8; 10]);
                }
            })
        })
        .collect();

    deleter.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(engine.stats().unwrap().deleted_bytes, 200);
    for id in (1..40u64).step_by(2) {
        assert_eq!(engine.read(id).unwrap(), vec![id as u8; 10]);
    }
}
