//! Stress tests for the pickup registry under receiver/main-loop contention

use client::registry::{PickupRegistry, Upsert};
use shared::MAX_PICKUPS;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn assert_unique(registry: &PickupRegistry) {
    let snapshot = registry.snapshot();
    let ids: HashSet<i32> = snapshot.iter().map(|p| p.identity).collect();
    assert_eq!(ids.len(), snapshot.len(), "duplicate identity in {:?}", ids);
}

/// One thread plays the receiver (spawns, moves, removes), the other the main
/// loop (snapshots and consumes). Identities stay unique throughout.
#[test]
fn stress_test_two_thread_contention() {
    let registry = Arc::new(PickupRegistry::new());
    let start = Instant::now();

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for i in 0..20_000 {
                let id = i % 1500;
                match i % 5 {
                    0 | 1 | 2 => {
                        registry.upsert(id, (i * 7) % 1024, (i * 13) % 768, "MANGO", 50);
                    }
                    3 => {
                        registry.upsert(id, 0, 0, "BANANO", 20);
                    }
                    _ => {
                        registry.remove(id);
                    }
                }
            }
        })
    };

    let reader = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            let mut eaten = 0;
            for i in 0..5_000 {
                assert_unique(&registry);
                assert!(registry.len() <= MAX_PICKUPS);
                if registry
                    .remove_near((i * 31) % 1024, (i * 17) % 768, 20)
                    .is_some()
                {
                    eaten += 1;
                }
            }
            eaten
        })
    };

    writer.join().unwrap();
    let eaten = reader.join().unwrap();

    assert_unique(&registry);
    assert!(registry.len() <= MAX_PICKUPS);

    let duration = start.elapsed();
    println!(
        "Registry contention: {} consumed, {} live, {:?}",
        eaten,
        registry.len(),
        duration
    );

    // Should complete in under 5 seconds
    assert!(duration.as_secs() < 5);
}

/// Fills the table from several threads at once; exactly capacity inserts win.
#[test]
fn stress_test_concurrent_fill_past_capacity() {
    let registry = Arc::new(PickupRegistry::new());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let mut inserted: usize = 0;
                for i in 0..400 {
                    if registry.upsert(t * 400 + i, i, i, "MANZANA", 10) == Upsert::Inserted {
                        inserted += 1;
                    }
                }
                inserted
            })
        })
        .collect();

    let inserted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(inserted, MAX_PICKUPS);
    assert_eq!(registry.len(), MAX_PICKUPS);
    assert_unique(&registry);
}
