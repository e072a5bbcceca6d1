//! Anamorph - a first-person forced-perspective puzzle game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (camera, physics, puzzles, cut-scene)
//! - `renderer`: WebGPU rendering pipeline
//! - `assets`: BMP texture loading
//! - `settings`: Persisted preferences

pub mod assets;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the original polling rate)
    pub const SIM_DT: f32 = 0.016;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Walkable bounds shared by both rooms
    pub const ROOM_MIN_X: f32 = -19.0;
    pub const ROOM_MAX_X: f32 = 19.0;
    pub const ROOM_MAX_Z: f32 = 19.0;
    /// Room 1 far wall; impassable until the level is cleared
    pub const ROOM1_MIN_Z: f32 = -19.0;
    /// Room 2 far wall
    pub const ROOM2_MIN_Z: f32 = -59.0;
    /// Eye height floor
    pub const EYE_MIN_Y: f32 = 4.0;

    /// Doorway gap between the rooms; only |x| <= half-width passes
    pub const DOORWAY_HALF_WIDTH: f32 = 2.0;
    pub const DOORWAY_Z_NEAR: f32 = -19.0;
    pub const DOORWAY_Z_FAR: f32 = -21.0;

    /// World floor and ceiling planes
    pub const FLOOR_Y: f32 = 0.0;
    pub const CEILING_Y: f32 = 15.0;

    /// Physics
    pub const GRAVITY_Y: f32 = -20.0;
    pub const LINEAR_DAMPING: f32 = 0.1;
    pub const GROUND_FRICTION: f32 = 0.9;

    /// Camera movement speed (units per second on the ground plane)
    pub const MOVE_SPEED: f32 = 15.0;
    /// Mouse look sensitivity (degrees per pixel)
    pub const LOOK_SENSITIVITY: f32 = 0.1;
    pub const PITCH_LIMIT: f32 = 89.0;

    /// Grab interaction
    pub const GRAB_MAX_DISTANCE: f32 = 30.0;
    pub const GRAB_CONE_COS: f32 = 0.95;
    /// Closest a held object may be re-projected to
    pub const GRAB_MIN_DISTANCE: f32 = 0.5;
    /// Pull-back off the hit surface to avoid z-fighting
    pub const GRAB_SURFACE_GAP: f32 = 0.01;
    pub const GRAB_MAX_RESOLVE: f32 = 1000.0;
    /// Infinite floor plane used as a raycast fallback while holding
    pub const HELD_FLOOR_PLANE_Y: f32 = 0.5;

    /// Held-object trail length (ghost frames)
    pub const TRAIL_LENGTH: usize = 7;

    /// Explosion pools, fixed size, reused by index range per burst
    pub const NUM_PARTICLES: usize = 4000;
    pub const NUM_DEBRIS: usize = 1000;
    /// Burst lifetime in ticks
    pub const EXPLOSION_FUEL: u32 = 500;
    /// Camera transition progress per tick
    pub const TRANSITION_RATE: f32 = 0.005;
    /// Delay between the Room 2 and Room 1 bursts
    pub const SECOND_BURST_DELAY_TICKS: u32 = 120;
}

/// Smoothstep easing on [0, 1]
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert!((smoothstep(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(smoothstep(-2.0), 0.0);
        assert_eq!(smoothstep(3.0), 1.0);
    }
}
