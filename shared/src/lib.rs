//! Types and constants shared by the Kong Jr client and the development server.
//!
//! The wire protocol itself lives in [`protocol`]; everything here is plain data
//! that both ends agree on: screen geometry, registry limits and the pickup record.

pub mod protocol;

pub use protocol::{ClientCommand, ServerMessage};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9999;

/// Longest line either side will buffer before forcing a line break.
pub const MAX_LINE_LEN: usize = 1024;
/// Number of pickup slots held by the client registry.
pub const MAX_PICKUPS: usize = 1024;
/// Longest pickup kind name kept by the client; longer names are truncated.
pub const MAX_KIND_LEN: usize = 31;
/// Pointer distance, in pixels, within which a click consumes a pickup.
pub const CONSUME_RADIUS: i32 = 20;

pub const SCREEN_WIDTH: i32 = 1024;
pub const SCREEN_HEIGHT: i32 = 768;
pub const PLAYER_WIDTH: i32 = 32;
pub const PLAYER_HEIGHT: i32 = 48;
pub const PLAYER_SPAWN_X: i32 = 100;
pub const PLAYER_SPAWN_Y: i32 = 400;
/// Horizontal distance a walking player covers per server tick.
pub const WALK_SPEED: i32 = 5;

/// A consumable object spawned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupRecord {
    pub identity: i32,
    pub x: i32,
    pub y: i32,
    pub kind: String,
    pub value: i32,
    pub active: bool,
}

impl PickupRecord {
    pub fn new(identity: i32, x: i32, y: i32, kind: &str, value: i32) -> Self {
        Self {
            identity,
            x,
            y,
            kind: truncate_kind(kind),
            value,
            active: true,
        }
    }

    /// Returns true if `(px, py)` lies within `radius` of this record (inclusive).
    pub fn within(&self, px: i32, py: i32, radius: i32) -> bool {
        let dx = i64::from(px) - i64::from(self.x);
        let dy = i64::from(py) - i64::from(self.y);
        let r = i64::from(radius);
        dx * dx + dy * dy <= r * r
    }
}

/// Clips a kind name to [`MAX_KIND_LEN`] characters.
pub fn truncate_kind(kind: &str) -> String {
    kind.chars().take(MAX_KIND_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_creation() {
        let pickup = PickupRecord::new(7, 100, 200, "MANGO", 50);
        assert_eq!(pickup.identity, 7);
        assert_eq!(pickup.x, 100);
        assert_eq!(pickup.y, 200);
        assert_eq!(pickup.kind, "MANGO");
        assert_eq!(pickup.value, 50);
        assert!(pickup.active);
    }

    #[test]
    fn test_kind_truncation() {
        let long = "X".repeat(40);
        let pickup = PickupRecord::new(1, 0, 0, &long, 10);
        assert_eq!(pickup.kind.len(), MAX_KIND_LEN);
    }

    #[test]
    fn test_kind_truncation_multibyte() {
        let long = "ñ".repeat(40);
        assert_eq!(truncate_kind(&long).chars().count(), MAX_KIND_LEN);
    }

    #[test]
    fn test_within_radius_boundary() {
        let pickup = PickupRecord::new(1, 100, 100, "MANGO", 10);
        assert!(pickup.within(100, 100, CONSUME_RADIUS));
        assert!(pickup.within(120, 100, CONSUME_RADIUS));
        assert!(pickup.within(112, 116, CONSUME_RADIUS));
        assert!(!pickup.within(121, 100, CONSUME_RADIUS));
        assert!(!pickup.within(115, 115, CONSUME_RADIUS));
    }

    #[test]
    fn test_within_extreme_coordinates() {
        let pickup = PickupRecord::new(1, i32::MAX, i32::MAX, "MANGO", 10);
        assert!(!pickup.within(i32::MIN, i32::MIN, CONSUME_RADIUS));
    }
}
