//! Pressure plate buttons.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::sim::object::GameObject;

/// Thresholds of the press predicate.
const PRESS_RADIUS_XZ: f32 = 1.5;
const PRESS_HEIGHT_SLACK: f32 = 0.5;
const PRESS_MIN_WIDTH: f32 = 0.7;
const PRESS_MAX_WIDTH: f32 = 4.0;

/// A plate bound to one target object. `pressed` is recomputed every tick
/// from the target's transform alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub position: Vec3,
    pub target_id: u32,
    pub pressed: bool,
}

impl Button {
    pub fn new(position: Vec3, target_id: u32) -> Self {
        Self {
            position,
            target_id,
            pressed: false,
        }
    }

    pub fn update(&mut self, target: &GameObject) {
        self.pressed = is_pressed(self.position, target.position, target.scale);
    }
}

/// The press predicate: the target rests on the plate (XZ distance under
/// 1.5, bottom at or below the plate top plus slack) at a believable size
/// (width strictly inside (0.7, 4.0)).
pub fn is_pressed(plate: Vec3, target_pos: Vec3, target_scale: Vec3) -> bool {
    let dx = target_pos.x - plate.x;
    let dz = target_pos.z - plate.z;
    let dist_xz = (dx * dx + dz * dz).sqrt();
    let bottom = target_pos.y - target_scale.y * 0.5;

    dist_xz < PRESS_RADIUS_XZ
        && bottom < plate.y + PRESS_HEIGHT_SLACK
        && target_scale.x > PRESS_MIN_WIDTH
        && target_scale.x < PRESS_MAX_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLATE: Vec3 = Vec3::new(-20.0, 5.5, 0.0);

    #[test]
    fn test_pressed_when_resting_on_plate() {
        assert!(is_pressed(PLATE, Vec3::new(-20.0, 6.5, 0.0), Vec3::splat(2.0)));
    }

    #[test]
    fn test_too_far_in_xz() {
        assert!(!is_pressed(PLATE, Vec3::new(-17.0, 6.5, 0.0), Vec3::splat(2.0)));
    }

    #[test]
    fn test_floating_above_plate() {
        assert!(!is_pressed(PLATE, Vec3::new(-20.0, 10.0, 0.0), Vec3::splat(2.0)));
    }

    #[test]
    fn test_shrunk_too_small() {
        assert!(!is_pressed(PLATE, Vec3::new(-20.0, 5.8, 0.0), Vec3::splat(0.5)));
    }

    #[test]
    fn test_grown_too_large() {
        assert!(!is_pressed(PLATE, Vec3::new(-20.0, 7.0, 0.0), Vec3::splat(5.0)));
    }

    #[test]
    fn test_boundary_widths_excluded() {
        assert!(!is_pressed(PLATE, Vec3::new(-20.0, 5.8, 0.0), Vec3::splat(0.7)));
        assert!(!is_pressed(PLATE, Vec3::new(-20.0, 6.0, 0.0), Vec3::splat(4.0)));
    }
}
