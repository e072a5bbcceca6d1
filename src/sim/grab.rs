//! Grab picking and the forced-perspective held-object re-projection.
//!
//! While held, an object is pushed along the view ray to just in front of
//! whatever the ray hits, and rescaled in proportion to its distance so its
//! apparent size never changes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{
    CEILING_Y, GRAB_CONE_COS, GRAB_MAX_DISTANCE, GRAB_MAX_RESOLVE, GRAB_MIN_DISTANCE,
    GRAB_SURFACE_GAP, HELD_FLOOR_PLANE_Y,
};
use crate::sim::aabb::Aabb;
use crate::sim::camera::Camera;
use crate::sim::object::GameObject;

/// An active grab: which object, how far it was when taken, and its scale
/// at that moment. Apparent size is `original_scale / grab_distance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grab {
    pub object_id: u32,
    pub grab_distance: f32,
    pub original_scale: Vec3,
}

/// Pick the nearest grabbable object inside the view cone. `objects` is the
/// full list; non-grabbable entries are skipped.
pub fn pick(camera: &Camera, objects: &[GameObject]) -> Option<Grab> {
    let mut best: Option<(f32, &GameObject)> = None;

    for obj in objects.iter().filter(|o| o.grabbable) {
        let to_obj = obj.position - camera.position;
        let dist = to_obj.length();
        if dist <= 0.0 || dist > GRAB_MAX_DISTANCE {
            continue;
        }
        if camera.front.dot(to_obj / dist) <= GRAB_CONE_COS {
            continue;
        }
        if best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, obj));
        }
    }

    best.map(|(dist, obj)| Grab {
        object_id: obj.id,
        grab_distance: dist.max(1e-3),
        original_scale: obj.scale,
    })
}

/// Re-project a held object against the scenery. Raycasts the view ray
/// against every obstacle box plus the floor and ceiling planes; for each
/// hit, solves for the distance at which the rescaled object's near face
/// just touches the surface, then takes the nearest.
///
/// With `r` the object's original half-extent along the hit normal, `d0`
/// the grab distance and `t` the raw hit distance, the touching condition
/// is `t = d + d * r / (d0 * cos)`, so `d = t / (1 + k)` with
/// `k = r / (d0 * cos)`.
pub fn resolve_held(camera: &Camera, grab: &Grab, obstacles: &[Aabb]) -> (Vec3, Vec3) {
    let eye = camera.position;
    let front = camera.front;
    let d0 = grab.grab_distance.max(1e-3);

    let mut min_dist = f32::INFINITY;

    for obstacle in obstacles {
        let Some(hit) = obstacle.raycast(eye, front) else {
            continue;
        };
        let r = half_extent_along(grab.original_scale, hit.normal);
        let cos = front.dot(hit.normal).abs().max(1e-3);
        let k = r / (d0 * cos);
        let d = (hit.distance / (1.0 + k) - GRAB_SURFACE_GAP).max(GRAB_MIN_DISTANCE);
        min_dist = min_dist.min(d);
    }

    // Infinite floor and ceiling planes catch rays that exit the room boxes
    if front.y < -1e-6 {
        let t = (HELD_FLOOR_PLANE_Y - eye.y) / front.y;
        if t > 0.0 {
            min_dist = min_dist.min(plane_solution(t, grab, front, Vec3::Y, d0));
        }
    }
    if front.y > 1e-6 {
        let t = (CEILING_Y - eye.y) / front.y;
        if t > 0.0 {
            min_dist = min_dist.min(plane_solution(t, grab, front, Vec3::NEG_Y, d0));
        }
    }

    if !min_dist.is_finite() || min_dist > GRAB_MAX_RESOLVE {
        min_dist = GRAB_MAX_RESOLVE;
    }

    let position = eye + front * min_dist;
    let scale = grab.original_scale * (min_dist / d0);
    (position, scale)
}

fn plane_solution(t: f32, grab: &Grab, front: Vec3, normal: Vec3, d0: f32) -> f32 {
    let r = half_extent_along(grab.original_scale, normal);
    let cos = front.dot(normal).abs().max(1e-3);
    let k = r / (d0 * cos);
    (t / (1.0 + k) - GRAB_SURFACE_GAP).max(GRAB_MIN_DISTANCE)
}

/// Half-extent of the original scale along the dominant axis of a normal.
fn half_extent_along(scale: Vec3, normal: Vec3) -> f32 {
    let n = normal.abs();
    if n.x >= n.y && n.x >= n.z {
        scale.x * 0.5
    } else if n.y >= n.z {
        scale.y * 0.5
    } else {
        scale.z * 0.5
    }
}
