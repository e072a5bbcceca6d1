//! Deterministic simulation core.
//!
//! Everything here is pure state + fixed-timestep updates: no rendering,
//! no platform calls. The platform layer drives `tick()` from an
//! accumulator and reads the state back for drawing.

pub mod aabb;
pub mod button;
pub mod camera;
pub mod cutscene;
pub mod grab;
pub mod object;
pub mod puzzle;
pub mod state;
pub mod tick;
pub mod wall;
pub mod world;

pub use aabb::{Aabb, RayHit};
pub use camera::{Camera, MoveDir};
pub use cutscene::Phase;
pub use object::{GameObject, Room, Shape};
pub use state::GameState;
pub use tick::{TickInput, tick};
pub use wall::WallWithHole;
