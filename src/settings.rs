//! Player preferences, persisted as JSON in LocalStorage on wasm.

use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "anamorph_settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityPreset {
    Low,
    Medium,
    High,
}

impl QualityPreset {
    /// Cap on explosion particles drawn per frame.
    pub fn particle_limit(&self) -> usize {
        match self {
            QualityPreset::Low => 1000,
            QualityPreset::Medium => 2500,
            QualityPreset::High => crate::consts::NUM_PARTICLES,
        }
    }

    pub fn debris_limit(&self) -> usize {
        match self {
            QualityPreset::Low => 250,
            QualityPreset::Medium => 600,
            QualityPreset::High => crate::consts::NUM_DEBRIS,
        }
    }

    /// Sphere tessellation (stacks, slices).
    pub fn sphere_segments(&self) -> (u32, u32) {
        match self {
            QualityPreset::Low => (8, 12),
            QualityPreset::Medium => (12, 18),
            QualityPreset::High => (18, 28),
        }
    }

    pub fn shadows(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }

    pub fn trails(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,
    /// Degrees per pixel of mouse movement
    pub mouse_sensitivity: f32,
    pub fov_degrees: f32,
    pub show_fps: bool,
    pub skybox: bool,
    /// Disables particle and debris rendering during the explosion
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            mouse_sensitivity: crate::consts::LOOK_SENSITIVITY,
            fov_degrees: 60.0,
            show_fps: false,
            skybox: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn effective_particle_limit(&self) -> usize {
        if self.reduced_motion {
            0
        } else {
            self.quality.particle_limit()
        }
    }

    pub fn effective_debris_limit(&self) -> usize {
        if self.reduced_motion {
            0
        } else {
            self.quality.debris_limit()
        }
    }

    pub fn shadows_enabled(&self) -> bool {
        self.quality.shadows()
    }

    pub fn trails_enabled(&self) -> bool {
        self.quality.trails()
    }

    /// Load persisted settings, falling back to defaults.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        else {
            return Self::default();
        };
        match storage.get_item(STORAGE_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("settings parse failed, using defaults: {e}");
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        else {
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => {
                if storage.set_item(STORAGE_KEY, &json).is_err() {
                    log::warn!("failed to persist settings");
                }
            }
            Err(e) => log::warn!("settings serialize failed: {e}"),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.quality, settings.quality);
        assert_eq!(back.fov_degrees, settings.fov_degrees);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let back: Settings = serde_json::from_str(r#"{"quality":"Low"}"#).unwrap();
        assert_eq!(back.quality, QualityPreset::Low);
        assert_eq!(back.fov_degrees, 60.0);
    }

    #[test]
    fn test_reduced_motion_disables_particles() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert_eq!(settings.effective_particle_limit(), 0);
        assert_eq!(settings.effective_debris_limit(), 0);
    }

    #[test]
    fn test_low_quality_trims_effects() {
        assert!(!QualityPreset::Low.shadows());
        assert!(!QualityPreset::Low.trails());
        assert!(QualityPreset::High.shadows());
        assert!(QualityPreset::Low.particle_limit() < QualityPreset::High.particle_limit());
    }
}
