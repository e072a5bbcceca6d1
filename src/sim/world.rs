//! Floor height sampling for the physics step.

use glam::Vec3;

use crate::consts::FLOOR_Y;
use crate::sim::aabb::Aabb;
use crate::sim::wall::WallWithHole;

/// Top surface of the alcove platforms inside the side-wall holes.
const ALCOVE_TOP_Y: f32 = 5.5;
/// An object stands on a wall piece when its bottom is within this of the top.
const STAND_TOLERANCE: f32 = 1.0;

/// Sample the floor height under an object. Base floor is 0; the alcove
/// platforms behind the side walls are raised, and objects can stand on
/// wall pieces whose XZ footprint they overlap.
pub fn floor_height_at(position: Vec3, scale: Vec3, walls: &[&WallWithHole]) -> f32 {
    let mut height = FLOOR_Y;

    let in_alcove_z = position.z > -2.0 && position.z < 2.0;
    let in_left_alcove = position.x > -22.0 && position.x < -19.0;
    let in_right_alcove = position.x > 19.0 && position.x < 22.0;
    if in_alcove_z && (in_left_alcove || in_right_alcove) {
        height = ALCOVE_TOP_Y;
    }

    let footprint = Aabb::from_center_scale(position, scale);
    let bottom = position.y - scale.y * 0.5;

    for wall in walls {
        for seg in &wall.segments {
            let seg_box = Aabb::from_center_scale(seg.position, seg.scale);
            let top_y = seg.position.y + seg.scale.y * 0.5;
            if footprint.overlaps_xz(&seg_box)
                && bottom >= top_y - STAND_TOLERANCE
                && top_y > height
            {
                height = top_y;
            }
        }
    }

    height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_floor_is_zero() {
        assert_eq!(floor_height_at(Vec3::new(0.0, 5.0, 0.0), Vec3::ONE, &[]), 0.0);
    }

    #[test]
    fn test_alcove_platforms_raised() {
        assert_eq!(
            floor_height_at(Vec3::new(-20.0, 6.0, 0.0), Vec3::ONE, &[]),
            ALCOVE_TOP_Y
        );
        assert_eq!(
            floor_height_at(Vec3::new(20.5, 6.0, 1.0), Vec3::ONE, &[]),
            ALCOVE_TOP_Y
        );
        // Outside the Z band the floor is flat
        assert_eq!(
            floor_height_at(Vec3::new(-20.0, 6.0, 5.0), Vec3::ONE, &[]),
            0.0
        );
    }

    #[test]
    fn test_stands_on_wall_piece() {
        let wall = WallWithHole::new(
            Vec3::new(0.0, 7.5, 20.0),
            Vec3::new(40.0, 15.0, 2.0),
            Vec3::new(4.0, 4.0, 4.0),
            0.0,
            Vec3::ONE,
        );
        // Top bar spans y from 9.5 to 15; its top is at 15
        let h = floor_height_at(Vec3::new(0.0, 16.0, 20.0), Vec3::splat(2.0), &[&wall]);
        assert!((h - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_far_below_wall_piece_ignored() {
        let wall = WallWithHole::new(
            Vec3::new(0.0, 7.5, 20.0),
            Vec3::new(40.0, 15.0, 2.0),
            Vec3::new(4.0, 4.0, 4.0),
            0.0,
            Vec3::ONE,
        );
        // Bottom is well under every piece top
        let h = floor_height_at(Vec3::new(0.0, 1.0, 20.0), Vec3::splat(1.0), &[&wall]);
        assert_eq!(h, 0.0);
    }
}
