//! Fixed-capacity, thread-safe table of server-spawned pickups.
//!
//! The receiver thread writes to it on every spawn/remove message while the
//! main thread removes entries optimistically on click and takes a snapshot to
//! draw each frame. A single mutex covers the whole table; every operation
//! holds it for the duration of one short scan and never across I/O.

use shared::{PickupRecord, MAX_PICKUPS};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What an [`PickupRegistry::upsert`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
    /// Every slot holds an active record; the spawn was discarded.
    Dropped,
}

pub struct PickupRegistry {
    slots: Mutex<Vec<PickupRecord>>,
    capacity: usize,
}

impl PickupRegistry {
    pub fn new() -> Self {
        Self::with_capacity(MAX_PICKUPS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    // A panic while holding the lock cannot leave a half-written slot behind,
    // so a poisoned table is still usable.
    fn slots(&self) -> MutexGuard<'_, Vec<PickupRecord>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Updates the active record with this identity in place, or claims the
    /// lowest free slot for it.
    pub fn upsert(&self, identity: i32, x: i32, y: i32, kind: &str, value: i32) -> Upsert {
        let mut slots = self.slots();

        if let Some(existing) = slots
            .iter_mut()
            .find(|slot| slot.active && slot.identity == identity)
        {
            existing.x = x;
            existing.y = y;
            existing.kind = shared::truncate_kind(kind);
            existing.value = value;
            return Upsert::Updated;
        }

        let record = PickupRecord::new(identity, x, y, kind, value);

        if let Some(free) = slots.iter_mut().find(|slot| !slot.active) {
            *free = record;
            return Upsert::Inserted;
        }

        if slots.len() < self.capacity {
            slots.push(record);
            return Upsert::Inserted;
        }

        Upsert::Dropped
    }

    /// Deactivates the record with this identity. Returns false if none was active.
    pub fn remove(&self, identity: i32) -> bool {
        let mut slots = self.slots();
        match slots
            .iter_mut()
            .find(|slot| slot.active && slot.identity == identity)
        {
            Some(slot) => {
                slot.active = false;
                true
            }
            None => false,
        }
    }

    /// Deactivates and returns the first active record (in slot order) within
    /// `radius` of `(x, y)`.
    ///
    /// This is a first-match scan, not a nearest-point search: when two pickups
    /// are both in range, the one in the lower slot wins.
    pub fn remove_near(&self, x: i32, y: i32, radius: i32) -> Option<PickupRecord> {
        let mut slots = self.slots();
        let slot = slots
            .iter_mut()
            .find(|slot| slot.active && slot.within(x, y, radius))?;
        slot.active = false;

        let mut taken = slot.clone();
        taken.active = true;
        Some(taken)
    }

    /// Copies out every active record in slot order.
    pub fn snapshot(&self) -> Vec<PickupRecord> {
        self.slots()
            .iter()
            .filter(|slot| slot.active)
            .cloned()
            .collect()
    }

    pub fn get(&self, identity: i32) -> Option<PickupRecord> {
        self.slots()
            .iter()
            .find(|slot| slot.active && slot.identity == identity)
            .cloned()
    }

    /// Number of active records.
    pub fn len(&self) -> usize {
        self.slots().iter().filter(|slot| slot.active).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PickupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_unique(registry: &PickupRegistry) {
        let snapshot = registry.snapshot();
        let ids: HashSet<i32> = snapshot.iter().map(|p| p.identity).collect();
        assert_eq!(ids.len(), snapshot.len(), "duplicate active identity");
    }

    #[test]
    fn test_registry_creation() {
        let registry = PickupRegistry::new();
        assert_eq!(registry.capacity(), MAX_PICKUPS);
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_upsert_inserts_then_updates() {
        let registry = PickupRegistry::new();

        assert_eq!(registry.upsert(7, 100, 200, "MANGO", 50), Upsert::Inserted);
        assert_eq!(registry.upsert(7, 110, 210, "BANANO", 20), Upsert::Updated);

        assert_eq!(registry.len(), 1);
        let pickup = registry.get(7).unwrap();
        assert_eq!((pickup.x, pickup.y), (110, 210));
        assert_eq!(pickup.kind, "BANANO");
        assert_eq!(pickup.value, 20);
    }

    #[test]
    fn test_upsert_keeps_slot_position() {
        let registry = PickupRegistry::new();
        registry.upsert(1, 0, 0, "MANGO", 10);
        registry.upsert(2, 0, 0, "MANGO", 10);
        registry.upsert(3, 0, 0, "MANGO", 10);

        registry.upsert(2, 50, 50, "MANZANA", 30);

        let order: Vec<i32> = registry.snapshot().iter().map(|p| p.identity).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_removed_slot_is_reused() {
        let registry = PickupRegistry::new();
        registry.upsert(1, 0, 0, "MANGO", 10);
        registry.upsert(2, 0, 0, "MANGO", 10);
        registry.upsert(3, 0, 0, "MANGO", 10);

        assert!(registry.remove(2));
        registry.upsert(9, 0, 0, "MANGO", 10);

        let order: Vec<i32> = registry.snapshot().iter().map(|p| p.identity).collect();
        assert_eq!(order, vec![1, 9, 3]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let registry = PickupRegistry::new();
        registry.upsert(1, 0, 0, "MANGO", 10);

        assert!(!registry.remove(5));
        assert!(registry.remove(1));
        assert!(!registry.remove(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_insert_beyond_capacity_is_dropped() {
        let registry = PickupRegistry::new();
        for id in 0..MAX_PICKUPS as i32 {
            assert_eq!(registry.upsert(id, 0, 0, "MANGO", 1), Upsert::Inserted);
        }

        assert_eq!(registry.upsert(5000, 0, 0, "MANGO", 1), Upsert::Dropped);
        assert_eq!(registry.len(), MAX_PICKUPS);
        assert!(registry.get(5000).is_none());

        // Updates still work when full.
        assert_eq!(registry.upsert(10, 1, 1, "MANGO", 2), Upsert::Updated);
    }

    #[test]
    fn test_remove_near_miss() {
        let registry = PickupRegistry::new();
        registry.upsert(1, 100, 100, "MANGO", 10);

        assert!(registry.remove_near(200, 200, 20).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_near_single_hit() {
        let registry = PickupRegistry::new();
        registry.upsert(1, 100, 100, "MANGO", 10);
        registry.upsert(2, 400, 400, "BANANO", 20);

        let hit = registry.remove_near(110, 105, 20).unwrap();
        assert_eq!(hit.identity, 1);
        assert_eq!(hit.value, 10);
        assert!(registry.get(1).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_near_prefers_lowest_slot() {
        let registry = PickupRegistry::new();
        registry.upsert(1, 115, 100, "MANGO", 10);
        registry.upsert(2, 100, 100, "BANANO", 20);

        // Record 2 is closer, but record 1 sits in the earlier slot.
        let hit = registry.remove_near(100, 100, 20).unwrap();
        assert_eq!(hit.identity, 1);

        let second = registry.remove_near(100, 100, 20).unwrap();
        assert_eq!(second.identity, 2);
        assert!(registry.remove_near(100, 100, 20).is_none());
    }

    #[test]
    fn test_identity_unique_across_mixed_operations() {
        let registry = PickupRegistry::with_capacity(8);
        for round in 0..50 {
            let id = round % 5;
            registry.upsert(id, round, round, "MANGO", 1);
            assert_unique(&registry);
            if round % 3 == 0 {
                registry.remove(id);
                assert_unique(&registry);
            }
            if round % 7 == 0 {
                registry.remove_near(round, round, 2);
                assert_unique(&registry);
            }
        }
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let registry = PickupRegistry::new();
        registry.upsert(1, 0, 0, "MANGO", 10);

        let snapshot = registry.snapshot();
        registry.remove(1);

        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }
}
