//! Axis-aligned bounding boxes and slab-method raycasting.

use glam::Vec3;

/// An AABB derived from an object's center and scale. Never persisted;
/// rebuilt from simulation state whenever needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Result of a ray/AABB intersection: entry distance and the outward
/// normal of the face the ray entered through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub normal: Vec3,
}

impl Aabb {
    pub fn from_center_scale(center: Vec3, scale: Vec3) -> Self {
        let half = scale * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Footprint overlap on the XZ plane (used for floor sampling).
    pub fn overlaps_xz(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Slab-method ray intersection. Returns the entry hit for rays
    /// starting outside the box; rays starting inside miss.
    pub fn raycast(&self, origin: Vec3, dir: Vec3) -> Option<RayHit> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let lo = self.min[axis];
            let hi = self.max[axis];

            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t1 = (lo - o) * inv;
            let mut t2 = (hi - o) * inv;
            let mut axis_normal = -axis_unit(axis);
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
                axis_normal = -axis_normal;
            }
            if t1 > t_min {
                t_min = t1;
                normal = axis_normal;
            }
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        if t_min > 0.0 {
            Some(RayHit {
                distance: t_min,
                normal,
            })
        } else {
            None
        }
    }
}

#[inline]
fn axis_unit(axis: usize) -> Vec3 {
    match axis {
        0 => Vec3::X,
        1 => Vec3::Y,
        _ => Vec3::Z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raycast_hits_front_face() {
        let aabb = Aabb::from_center_scale(Vec3::new(0.0, 0.0, -10.0), Vec3::splat(2.0));
        let hit = aabb.raycast(Vec3::ZERO, Vec3::NEG_Z).unwrap();
        assert!((hit.distance - 9.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Z);
    }

    #[test]
    fn test_raycast_misses_to_the_side() {
        let aabb = Aabb::from_center_scale(Vec3::new(5.0, 0.0, -10.0), Vec3::splat(2.0));
        assert!(aabb.raycast(Vec3::ZERO, Vec3::NEG_Z).is_none());
    }

    #[test]
    fn test_raycast_from_inside_misses() {
        let aabb = Aabb::from_center_scale(Vec3::ZERO, Vec3::splat(4.0));
        assert!(aabb.raycast(Vec3::ZERO, Vec3::X).is_none());
    }

    #[test]
    fn test_raycast_behind_misses() {
        let aabb = Aabb::from_center_scale(Vec3::new(0.0, 0.0, 10.0), Vec3::splat(2.0));
        assert!(aabb.raycast(Vec3::ZERO, Vec3::NEG_Z).is_none());
    }

    #[test]
    fn test_hit_normal_matches_entry_axis() {
        let aabb = Aabb::from_center_scale(Vec3::new(10.0, 0.0, 0.0), Vec3::splat(2.0));
        let hit = aabb.raycast(Vec3::ZERO, Vec3::X).unwrap();
        assert_eq!(hit.normal, Vec3::NEG_X);
        assert!((hit.distance - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_overlaps_xz_ignores_y() {
        let a = Aabb::from_center_scale(Vec3::new(0.0, 0.0, 0.0), Vec3::splat(2.0));
        let b = Aabb::from_center_scale(Vec3::new(1.0, 100.0, 1.0), Vec3::splat(2.0));
        let c = Aabb::from_center_scale(Vec3::new(5.0, 0.0, 0.0), Vec3::splat(2.0));
        assert!(a.overlaps_xz(&b));
        assert!(!a.overlaps_xz(&c));
    }
}
