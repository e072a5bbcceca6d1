//! Game objects and the explicit-Euler physics step.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::assets::TextureKey;
use crate::consts::{GRAVITY_Y, GROUND_FRICTION, LINEAR_DAMPING, TRAIL_LENGTH};
use crate::sim::aabb::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Cube,
    Sphere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Room {
    Room1,
    Room2,
}

/// Per-face texture assignment: front/back, top/bottom, sides. Empty
/// slots render with the object's vertex color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceTextures {
    pub front: Option<TextureKey>,
    pub top: Option<TextureKey>,
    pub sides: Option<TextureKey>,
}

/// Ghost frame recorded while an object is held.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailFrame {
    pub position: Vec3,
    pub scale: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameObject {
    pub id: u32,
    pub shape: Shape,
    pub room: Room,
    pub position: Vec3,
    pub scale: Vec3,
    /// Euler rotation in degrees, applied X then Y then Z
    pub rotation: Vec3,
    pub color: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub is_static: bool,
    pub grabbable: bool,
    /// None renders with vertex color only
    pub face_textures: Option<FaceTextures>,
    /// Visual only, rebuilt during play
    #[serde(skip)]
    pub trail: VecDeque<TrailFrame>,
}

impl GameObject {
    pub fn new(id: u32, shape: Shape, position: Vec3, scale: Vec3) -> Self {
        Self {
            id,
            shape,
            room: Room::Room1,
            position,
            scale,
            rotation: Vec3::ZERO,
            color: Vec3::ONE,
            velocity: Vec3::ZERO,
            mass: 1.0,
            is_static: true,
            grabbable: false,
            face_textures: None,
            trail: VecDeque::new(),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_scale(self.position, self.scale)
    }

    pub fn bottom(&self) -> f32 {
        self.position.y - self.scale.y * 0.5
    }

    /// One explicit-Euler step: gravity, linear damping, floor clamp with
    /// ground friction on landing.
    pub fn update_physics(&mut self, dt: f32, floor_y: f32) {
        if self.is_static {
            return;
        }

        let mut force = Vec3::new(0.0, GRAVITY_Y * self.mass, 0.0);
        force -= self.velocity * LINEAR_DAMPING;
        let accel = force / self.mass;

        self.velocity += accel * dt;
        self.position += self.velocity * dt;

        let rest_y = floor_y + self.scale.y * 0.5;
        if self.position.y < rest_y {
            self.position.y = rest_y;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
                self.velocity.x *= GROUND_FRICTION;
                self.velocity.z *= GROUND_FRICTION;
            }
        }
    }

    /// Record a ghost frame while held; drain one per tick while free.
    pub fn update_trail(&mut self, held: bool) {
        if held {
            self.trail.push_front(TrailFrame {
                position: self.position,
                scale: self.scale,
            });
            self.trail.truncate(TRAIL_LENGTH);
        } else {
            self.trail.pop_back();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic_cube() -> GameObject {
        let mut obj = GameObject::new(1, Shape::Cube, Vec3::new(0.0, 10.0, 0.0), Vec3::splat(2.0));
        obj.is_static = false;
        obj.mass = 5.0;
        obj
    }

    #[test]
    fn test_falls_and_rests_on_floor() {
        let mut obj = dynamic_cube();
        for _ in 0..600 {
            obj.update_physics(0.016, 0.0);
        }
        assert!((obj.bottom() - 0.0).abs() < 1e-4);
        assert_eq!(obj.velocity.y, 0.0);
    }

    #[test]
    fn test_rests_on_raised_floor() {
        let mut obj = dynamic_cube();
        for _ in 0..600 {
            obj.update_physics(0.016, 5.5);
        }
        assert!((obj.bottom() - 5.5).abs() < 1e-4);
    }

    #[test]
    fn test_static_never_moves() {
        let mut obj = GameObject::new(2, Shape::Cube, Vec3::new(1.0, 2.0, 3.0), Vec3::ONE);
        let start = obj.position;
        for _ in 0..100 {
            obj.update_physics(0.016, 0.0);
        }
        assert_eq!(obj.position, start);
    }

    #[test]
    fn test_landing_applies_ground_friction() {
        let mut obj = dynamic_cube();
        obj.position.y = 1.02;
        obj.velocity = Vec3::new(10.0, -5.0, 10.0);
        obj.update_physics(0.016, 0.0);
        assert!(obj.velocity.x < 10.0);
        assert_eq!(obj.velocity.y, 0.0);
    }

    #[test]
    fn test_trail_bounded_and_drains() {
        let mut obj = dynamic_cube();
        for _ in 0..20 {
            obj.update_trail(true);
        }
        assert_eq!(obj.trail.len(), TRAIL_LENGTH);
        for _ in 0..20 {
            obj.update_trail(false);
        }
        assert!(obj.trail.is_empty());
    }
}
