//! The anamorphic projection puzzle and the door-fit check.

use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::object::GameObject;

/// Player must stand this close to the projector to solve.
const SOLVE_RADIUS: f32 = 2.0;
const PROJECTOR_FOV_DEG: f32 = 30.0;

const NUM_SCATTERED_PIECES: usize = 70;
/// Scatter volume full extents and center
const SPREAD: Vec3 = Vec3::new(10.0, 10.0, 9.0);
const SCATTER_CENTER: Vec3 = Vec3::new(0.0, 5.0, -45.0);

/// One textured fragment of the hidden picture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub position: Vec3,
    pub scale: Vec3,
    /// Euler degrees
    pub rotation: Vec3,
}

/// Scattered pieces that resolve into one picture only from the projector
/// viewpoint. Each piece vertex samples the picture by projecting its
/// world position through the projector's view and projection matrices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnamorphicPuzzle {
    pub projector_pos: Vec3,
    pub look_target: Vec3,
    pub pieces: Vec<Piece>,
}

impl AnamorphicPuzzle {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut pieces = Vec::with_capacity(NUM_SCATTERED_PIECES + 10);

        for _ in 0..NUM_SCATTERED_PIECES {
            let position = SCATTER_CENTER
                + Vec3::new(
                    rng.random_range(-SPREAD.x / 2.0..SPREAD.x / 2.0),
                    rng.random_range(-SPREAD.y / 2.0..SPREAD.y / 2.0),
                    rng.random_range(-SPREAD.z / 2.0..SPREAD.z / 2.0),
                );
            let size = rng.random_range(1.0..2.0);
            let rotation = Vec3::new(
                rng.random_range(0.0..360.0),
                rng.random_range(0.0..360.0),
                rng.random_range(0.0..360.0),
            );
            pieces.push(Piece {
                position,
                scale: Vec3::splat(size),
                rotation,
            });
        }

        // Hand-placed pieces guarantee coverage of the picture's center
        for &(x, y, z) in &FIXED_PIECES {
            pieces.push(Piece {
                position: Vec3::new(x, y, z),
                scale: Vec3::splat(1.5),
                rotation: Vec3::ZERO,
            });
        }

        Self {
            projector_pos: Vec3::new(12.0, 6.0, -32.0),
            look_target: Vec3::new(-6.0, 4.0, -50.0),
            pieces,
        }
    }

    pub fn projector_view(&self) -> Mat4 {
        Mat4::look_at_rh(self.projector_pos, self.look_target, Vec3::Y)
    }

    pub fn projector_proj() -> Mat4 {
        Mat4::perspective_rh(PROJECTOR_FOV_DEG.to_radians(), 1.0, 0.1, 100.0)
    }

    /// Texture coordinate of a world position as seen by the projector.
    /// U is mirrored so the picture reads correctly from the viewpoint.
    pub fn projected_uv(&self, world: Vec3) -> Vec2 {
        let clip = Self::projector_proj() * self.projector_view() * Vec4::from((world, 1.0));
        let w = if clip.w.abs() < 1e-6 { 1e-6 } else { clip.w };
        let ndc = clip.xyz() / w;
        Vec2::new(1.0 - (ndc.x * 0.5 + 0.5), ndc.y * 0.5 + 0.5)
    }

    /// Solved by clicking while standing at the projector.
    pub fn solved_from(&self, player: Vec3) -> bool {
        player.distance(self.projector_pos) < SOLVE_RADIUS
    }
}

const FIXED_PIECES: [(f32, f32, f32); 10] = [
    (4.0, 5.0, -44.0),
    (2.0, 7.0, -47.0),
    (0.0, 4.0, -42.0),
    (-2.0, 6.0, -46.0),
    (-4.0, 5.0, -43.0),
    (6.0, 6.5, -48.0),
    (-6.0, 3.5, -45.0),
    (1.0, 8.0, -41.0),
    (-1.0, 2.5, -49.0),
    (3.0, 3.0, -50.0),
];

/// Target transform for fitting the door into the front-wall cutout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorGoal {
    pub position: Vec3,
    pub scale: Vec3,
}

const DOOR_FIT_MAX_DIST: f32 = 4.0;
const DOOR_FIT_MAX_SCALE_ERR: f32 = 1.5;

/// The door fits when dropped near the goal at roughly the goal size.
pub fn door_fits(door: &GameObject, goal: &DoorGoal) -> bool {
    door.position.distance(goal.position) < DOOR_FIT_MAX_DIST
        && (door.scale.x - goal.scale.x).abs() < DOOR_FIT_MAX_SCALE_ERR
        && (door.scale.y - goal.scale.y).abs() < DOOR_FIT_MAX_SCALE_ERR
}
