//! Walls with rectangular holes, decomposed into static sub-cuboids.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One axis-aligned piece of a decomposed wall, in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub position: Vec3,
    pub scale: Vec3,
    pub color: Vec3,
}

/// A wall with a centered rectangular hole. The wall is cut into exactly
/// five pieces at construction: top and bottom bars, left and right posts,
/// and a recessed back plate filling the hole at half thickness. Only yaw
/// rotations are supported; rotated pieces stay axis-aligned by swapping
/// their x/z extents through the rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallWithHole {
    pub position: Vec3,
    pub wall_size: Vec3,
    pub hole_size: Vec3,
    pub yaw_deg: f32,
    pub segments: [WallSegment; 5],
}

impl WallWithHole {
    pub fn new(position: Vec3, wall_size: Vec3, hole_size: Vec3, yaw_deg: f32, color: Vec3) -> Self {
        let (w, h, thick) = (wall_size.x, wall_size.y, wall_size.z);
        let (hw, hh) = (hole_size.x, hole_size.y);

        let bar_h = (h - hh) / 2.0;
        let post_w = (w - hw) / 2.0;

        // Local-space pieces before the yaw transform
        let locals = [
            // Top and bottom bars span the full width
            (Vec3::new(0.0, (hh + bar_h) / 2.0, 0.0), Vec3::new(w, bar_h, thick), color),
            (Vec3::new(0.0, -(hh + bar_h) / 2.0, 0.0), Vec3::new(w, bar_h, thick), color),
            // Side posts fill the hole-height band
            (Vec3::new(-(hw + post_w) / 2.0, 0.0, 0.0), Vec3::new(post_w, hh, thick), color),
            (Vec3::new((hw + post_w) / 2.0, 0.0, 0.0), Vec3::new(post_w, hh, thick), color),
            // Recessed back plate, darker, half thickness
            (
                Vec3::new(0.0, 0.0, -thick * 0.75),
                Vec3::new(hw, hh, thick / 2.0),
                color * 0.7,
            ),
        ];

        let rad = (-yaw_deg).to_radians();
        let (sin, cos) = rad.sin_cos();

        let segments = locals.map(|(local_pos, local_scale, seg_color)| {
            let world_x = position.x + local_pos.x * cos - local_pos.z * sin;
            let world_z = position.z + local_pos.x * sin + local_pos.z * cos;
            // Axis-aligned extents of the rotated box
            let scale_x = (local_scale.x * cos).abs() + (local_scale.z * sin).abs();
            let scale_z = (local_scale.x * sin).abs() + (local_scale.z * cos).abs();
            WallSegment {
                position: Vec3::new(world_x, position.y + local_pos.y, world_z),
                scale: Vec3::new(scale_x, local_scale.y, scale_z),
                color: seg_color,
            }
        });

        Self {
            position,
            wall_size,
            hole_size,
            yaw_deg,
            segments,
        }
    }

    /// The four frame pieces (everything but the back plate).
    pub fn frame(&self) -> &[WallSegment] {
        &self.segments[..4]
    }

    pub fn back_plate(&self) -> &WallSegment {
        &self.segments[4]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_area_sums_to_wall_minus_hole() {
        let wall = WallWithHole::new(
            Vec3::new(0.0, 7.5, 20.0),
            Vec3::new(40.0, 15.0, 2.0),
            Vec3::new(4.0, 4.0, 4.0),
            0.0,
            Vec3::ONE,
        );
        let area: f32 = wall.frame().iter().map(|s| s.scale.x * s.scale.y).sum();
        assert!((area - (40.0 * 15.0 - 4.0 * 4.0)).abs() < 1e-3);
    }

    #[test]
    fn test_back_plate_matches_hole() {
        let wall = WallWithHole::new(
            Vec3::ZERO,
            Vec3::new(40.0, 15.0, 2.0),
            Vec3::new(4.0, 4.0, 4.0),
            0.0,
            Vec3::ONE,
        );
        let plate = wall.back_plate();
        assert_eq!(plate.scale.x, 4.0);
        assert_eq!(plate.scale.y, 4.0);
        assert_eq!(plate.scale.z, 1.0);
        assert!((plate.position.z - (-1.5)).abs() < 1e-5);
    }

    #[test]
    fn test_yaw_90_swaps_extents() {
        let wall = WallWithHole::new(
            Vec3::new(-20.0, 7.5, 0.0),
            Vec3::new(40.0, 15.0, 2.0),
            Vec3::new(4.0, 4.0, 4.0),
            90.0,
            Vec3::ONE,
        );
        // The top bar runs along Z after a quarter turn
        let top = wall.segments[0];
        assert!((top.scale.x - 2.0).abs() < 1e-3);
        assert!((top.scale.z - 40.0).abs() < 1e-3);
        // Cross-section area is preserved through the rotation
        let area: f32 = wall.frame().iter().map(|s| s.scale.z * s.scale.y).sum();
        assert!((area - (40.0 * 15.0 - 4.0 * 4.0)).abs() < 1e-2);
    }

    #[test]
    fn test_yaw_moves_back_plate_sideways() {
        let wall = WallWithHole::new(
            Vec3::new(-20.0, 7.5, 0.0),
            Vec3::new(40.0, 15.0, 2.0),
            Vec3::new(4.0, 4.0, 4.0),
            90.0,
            Vec3::ONE,
        );
        // Local -z offset rotates onto world x
        let plate = wall.back_plate();
        assert!((plate.position.x - (-20.0 - 1.5)).abs() < 1e-3);
        assert!(plate.position.z.abs() < 1e-3);
    }

    #[test]
    fn test_back_plate_is_darker() {
        let wall = WallWithHole::new(
            Vec3::ZERO,
            Vec3::new(10.0, 10.0, 2.0),
            Vec3::new(2.0, 2.0, 2.0),
            0.0,
            Vec3::new(1.0, 0.5, 0.2),
        );
        assert!((wall.back_plate().color - Vec3::new(0.7, 0.35, 0.14)).length() < 1e-5);
    }
}
