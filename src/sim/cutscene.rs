//! Explosion cut-scene: camera transition, phase machine, particle pools.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{
    EXPLOSION_FUEL, NUM_DEBRIS, NUM_PARTICLES, SECOND_BURST_DELAY_TICKS, TRANSITION_RATE,
};
use crate::smoothstep;

/// Final camera pose of the transition: top-down over the doorway.
const END_POS: Vec3 = Vec3::new(0.0, 80.0, -20.0);
const END_TARGET: Vec3 = Vec3::new(0.0, 0.0, -20.0);
const END_UP: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Burst origins
const ROOM2_BURST: Vec3 = Vec3::new(0.0, 5.5, -40.0);
const ROOM1_BURST: Vec3 = Vec3::new(0.0, 5.5, 0.0);

const PARTICLE_SPEED: f32 = 1.5;
const PARTICLE_STEP: f32 = 0.2;
const DEBRIS_STEP: f32 = 0.1;
const DEBRIS_TUMBLE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Normal,
    Transition,
    Exploded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debris {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler degrees
    pub orientation: Vec3,
    pub tumble: Vec3,
    pub color: Vec3,
    pub scale: Vec3,
}

/// Captured camera pose at the start of the transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cutscene {
    pub phase: Phase,
    /// Transition progress in [0, 1]
    pub t: f32,
    pub start: CameraPose,
    /// Ticks since entering `Exploded`
    pub exploded_ticks: u32,
    pub room1_exploded: bool,
    pub room2_exploded: bool,
    /// Remaining burst lifetime; pools only animate while positive
    pub fuel: u32,
    /// Pools are visual state, rebuilt on the next burst after a load
    #[serde(skip)]
    pub particles: Vec<Particle>,
    #[serde(skip)]
    pub debris: Vec<Debris>,
}

impl Default for Cutscene {
    fn default() -> Self {
        Self {
            phase: Phase::Normal,
            t: 0.0,
            start: CameraPose {
                position: Vec3::ZERO,
                target: Vec3::NEG_Z,
                up: Vec3::Y,
            },
            exploded_ticks: 0,
            room1_exploded: false,
            room2_exploded: false,
            fuel: 0,
            particles: Vec::new(),
            debris: Vec::new(),
        }
    }
}

impl Cutscene {
    /// Begin the camera flight from the player's current pose.
    pub fn start_transition(&mut self, position: Vec3, front: Vec3, up: Vec3) {
        if self.phase != Phase::Normal {
            return;
        }
        self.phase = Phase::Transition;
        self.t = 0.0;
        self.start = CameraPose {
            position,
            target: position + front,
            up,
        };
    }

    /// Smoothstep-eased camera pose, or None while play continues.
    pub fn camera_pose(&self) -> Option<CameraPose> {
        match self.phase {
            Phase::Normal => None,
            Phase::Transition => {
                let s = smoothstep(self.t);
                Some(CameraPose {
                    position: self.start.position.lerp(END_POS, s),
                    target: self.start.target.lerp(END_TARGET, s),
                    up: self.start.up.lerp(END_UP, s).normalize_or(Vec3::Y),
                })
            }
            Phase::Exploded => Some(CameraPose {
                position: END_POS,
                target: END_TARGET,
                up: END_UP,
            }),
        }
    }

    /// One tick of the cut-scene state machine.
    pub fn advance(&mut self, rng: &mut Pcg32) {
        match self.phase {
            Phase::Normal => {}
            Phase::Transition => {
                self.t += TRANSITION_RATE;
                if self.t >= 1.0 {
                    self.t = 1.0;
                    self.phase = Phase::Exploded;
                    self.exploded_ticks = 0;
                    self.burst_room2(rng);
                }
            }
            Phase::Exploded => {
                self.exploded_ticks = self.exploded_ticks.saturating_add(1);
                if self.exploded_ticks == SECOND_BURST_DELAY_TICKS && !self.room1_exploded {
                    self.burst_room1(rng);
                }
            }
        }
        self.update_pools();
    }

    fn burst_room2(&mut self, rng: &mut Pcg32) {
        self.room2_exploded = true;
        self.burst(rng, ROOM2_BURST, 0..NUM_PARTICLES / 2, 0..NUM_DEBRIS / 2);
    }

    fn burst_room1(&mut self, rng: &mut Pcg32) {
        self.room1_exploded = true;
        self.burst(
            rng,
            ROOM1_BURST,
            NUM_PARTICLES / 2..NUM_PARTICLES,
            NUM_DEBRIS / 2..NUM_DEBRIS,
        );
    }

    /// Re-seed one half of each pool at the burst origin.
    fn burst(
        &mut self,
        rng: &mut Pcg32,
        origin: Vec3,
        particle_range: std::ops::Range<usize>,
        debris_range: std::ops::Range<usize>,
    ) {
        self.ensure_pools();
        self.fuel = EXPLOSION_FUEL;

        for i in particle_range {
            let p = &mut self.particles[i];
            p.position = origin;
            p.velocity = random_unit(rng) * PARTICLE_SPEED;
            p.color = match rng.random_range(0..3u32) {
                0 => Vec3::new(1.0, 1.0, 0.8), // white-yellow
                1 => Vec3::new(1.0, 0.6, 0.1), // orange
                _ => Vec3::new(1.0, 0.2, 0.1), // red
            };
        }

        for i in debris_range {
            let d = &mut self.debris[i];
            d.position = origin;
            d.velocity = random_unit(rng) * PARTICLE_SPEED;
            d.orientation = Vec3::new(
                rng.random_range(0.0..360.0),
                rng.random_range(0.0..360.0),
                rng.random_range(0.0..360.0),
            );
            d.tumble = random_unit(rng);
            d.color = Vec3::splat(0.3);
            // Negative components mirror the shard
            d.scale = Vec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            );
        }
    }

    /// Integrate the pools while fuel lasts; colors decay per channel.
    fn update_pools(&mut self) {
        if self.fuel == 0 {
            return;
        }
        self.fuel -= 1;

        for p in &mut self.particles {
            p.position += p.velocity * PARTICLE_STEP;
            p.color.x = (p.color.x - 1.0 / 500.0).max(0.0);
            p.color.y = (p.color.y - 1.0 / 100.0).max(0.0);
            p.color.z = (p.color.z - 1.0 / 50.0).max(0.0);
        }
        for d in &mut self.debris {
            d.position += d.velocity * DEBRIS_STEP;
            d.orientation += d.tumble * DEBRIS_TUMBLE;
        }
    }

    fn ensure_pools(&mut self) {
        if self.particles.len() != NUM_PARTICLES {
            self.particles = vec![
                Particle {
                    position: Vec3::ZERO,
                    velocity: Vec3::ZERO,
                    color: Vec3::ZERO,
                };
                NUM_PARTICLES
            ];
        }
        if self.debris.len() != NUM_DEBRIS {
            self.debris = vec![
                Debris {
                    position: Vec3::ZERO,
                    velocity: Vec3::ZERO,
                    orientation: Vec3::ZERO,
                    tumble: Vec3::ZERO,
                    color: Vec3::ZERO,
                    scale: Vec3::ZERO,
                };
                NUM_DEBRIS
            ];
        }
    }
}

fn random_unit(rng: &mut Pcg32) -> Vec3 {
    let v = Vec3::new(
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
    );
    v.normalize_or(Vec3::Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_phase_ordering() {
        let mut cs = Cutscene::default();
        let mut r = rng();
        cs.start_transition(Vec3::new(0.0, 4.0, -40.0), Vec3::NEG_Z, Vec3::Y);
        assert_eq!(cs.phase, Phase::Transition);

        let mut ticks = 0;
        while cs.phase == Phase::Transition {
            cs.advance(&mut r);
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert_eq!(cs.phase, Phase::Exploded);
        // 1.0 / TRANSITION_RATE ticks, give or take float accumulation
        assert!((199..=201).contains(&ticks));
        assert!(cs.room2_exploded);
        assert!(!cs.room1_exploded);
        assert_eq!(cs.fuel, EXPLOSION_FUEL - 1);
    }

    #[test]
    fn test_second_burst_after_delay() {
        let mut cs = Cutscene::default();
        let mut r = rng();
        cs.start_transition(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        while cs.phase == Phase::Transition {
            cs.advance(&mut r);
        }
        for _ in 0..SECOND_BURST_DELAY_TICKS {
            cs.advance(&mut r);
        }
        assert!(cs.room1_exploded);
        assert_eq!(cs.fuel, EXPLOSION_FUEL - 1);
    }

    #[test]
    fn test_burst_halves_are_disjoint() {
        let mut cs = Cutscene::default();
        let mut r = rng();
        cs.ensure_pools();
        cs.burst_room2(&mut r);
        // Second half untouched by the first burst
        assert!(cs.particles[NUM_PARTICLES / 2..]
            .iter()
            .all(|p| p.velocity == Vec3::ZERO));
        cs.burst_room1(&mut r);
        assert!(cs.particles[..NUM_PARTICLES]
            .iter()
            .all(|p| p.velocity != Vec3::ZERO));
    }

    #[test]
    fn test_camera_pose_eases_between_endpoints() {
        let mut cs = Cutscene::default();
        cs.start_transition(Vec3::new(5.0, 4.0, -40.0), Vec3::NEG_Z, Vec3::Y);
        let at_start = cs.camera_pose().unwrap();
        assert!((at_start.position - Vec3::new(5.0, 4.0, -40.0)).length() < 1e-5);
        cs.t = 1.0;
        let at_end = cs.camera_pose().unwrap();
        assert!((at_end.position - END_POS).length() < 1e-5);
        assert!((at_end.up - END_UP).length() < 1e-5);
    }

    #[test]
    fn test_fuel_exhausts_and_particles_stop() {
        let mut cs = Cutscene::default();
        let mut r = rng();
        cs.ensure_pools();
        cs.burst_room2(&mut r);
        for _ in 0..EXPLOSION_FUEL {
            cs.update_pools();
        }
        assert_eq!(cs.fuel, 0);
        let frozen = cs.particles[0].position;
        cs.update_pools();
        assert_eq!(cs.particles[0].position, frozen);
    }

    #[test]
    fn test_colors_decay_to_black() {
        let mut cs = Cutscene::default();
        let mut r = rng();
        cs.ensure_pools();
        cs.burst_room2(&mut r);
        for _ in 0..EXPLOSION_FUEL {
            cs.update_pools();
        }
        // Blue decays fastest, green next; red survives 500 ticks
        let c = cs.particles[0].color;
        assert_eq!(c.z, 0.0);
        assert_eq!(c.y, 0.0);
        assert!(c.x >= 0.0);
    }

    #[test]
    fn test_restart_transition_ignored_outside_normal() {
        let mut cs = Cutscene::default();
        cs.start_transition(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let start = cs.start;
        cs.start_transition(Vec3::splat(9.0), Vec3::X, Vec3::Y);
        assert_eq!(cs.start, start);
    }
}
