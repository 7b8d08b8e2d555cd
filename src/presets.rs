use crate::forces::ForceMode;
use crate::settings::{
    AudioReactiveConfig, BoundaryBehavior, EmissionConfig, EngineSettings, PhysicsConfig,
};

/// A named bundle of engine settings
#[derive(Debug, Clone)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub settings: EngineSettings,
}

impl Preset {
    pub fn new(name: impl Into<String>, description: impl Into<String>, settings: EngineSettings) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            settings,
        }
    }

    /// Copy this preset onto live settings, keeping the canvas-tracking
    /// centers the engine already set
    pub fn apply_to(&self, settings: &mut EngineSettings) {
        let centers = (
            settings.physics.magnet_x,
            settings.physics.magnet_y,
            settings.physics.orbit_x,
            settings.physics.orbit_y,
        );
        *settings = self.settings.clone();
        (
            settings.physics.magnet_x,
            settings.physics.magnet_y,
            settings.physics.orbit_x,
            settings.physics.orbit_y,
        ) = centers;
    }
}

/// Built-in presets shipped with the engine
pub struct PresetLibrary {
    pub builtin: Vec<Preset>,
}

impl Default for PresetLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self {
            builtin: vec![
                // Fountain - default settings
                Preset::new(
                    "Fountain",
                    "Gentle gravity with a wrapping canvas",
                    EngineSettings::default(),
                ),
                // Vortex - swirl around the center
                Preset::new(
                    "Vortex",
                    "Particles orbit the canvas center",
                    EngineSettings {
                        physics: PhysicsConfig {
                            mode: Some(ForceMode::Orbital),
                            orbit_strength: 0.8,
                            damping: 0.97,
                            ..Default::default()
                        },
                        emission: EmissionConfig {
                            spread: 400.0,
                            velocity_min: 0.5,
                            velocity_max: 1.5,
                            hue: 270.0,
                            ..Default::default()
                        },
                        ..Default::default()
                    },
                ),
                // Smoke - drifting noise field
                Preset::new(
                    "Smoke",
                    "Slow turbulent drift with long lifetimes",
                    EngineSettings {
                        physics: PhysicsConfig {
                            mode: Some(ForceMode::Turbulence),
                            turbulence_strength: 0.3,
                            turbulence_frequency: 0.005,
                            ..Default::default()
                        },
                        emission: EmissionConfig {
                            spawn_y: 0.9,
                            velocity_min: 0.2,
                            velocity_max: 0.8,
                            life_min: 300.0,
                            life_max: 600.0,
                            hue: 30.0,
                            saturation: 20.0,
                            ..Default::default()
                        },
                        ..Default::default()
                    },
                ),
                // Implode - everything falls into the magnet
                Preset::new(
                    "Implode",
                    "Strong attraction to the center",
                    EngineSettings {
                        physics: PhysicsConfig {
                            mode: Some(ForceMode::Magnetism),
                            magnet_strength: 6000.0,
                            ..Default::default()
                        },
                        emission: EmissionConfig {
                            spread: 1200.0,
                            hue: 0.0,
                            hue_variation: 120.0,
                            ..Default::default()
                        },
                        ..Default::default()
                    },
                ),
                // Pinball - bouncing walls, heavy bass response
                Preset::new(
                    "Pinball",
                    "Bouncing particles kicked around by the bass",
                    EngineSettings {
                        physics: PhysicsConfig {
                            mode: Some(ForceMode::Gravity),
                            gravity_y: 0.2,
                            boundary: BoundaryBehavior::Bounce,
                            bounce_damping: 0.9,
                            ..Default::default()
                        },
                        audio: AudioReactiveConfig {
                            bass_lift: -1.0,
                            kick_burst: 30.0,
                            ..Default::default()
                        },
                        ..Default::default()
                    },
                ),
            ],
        }
    }

    /// Find a preset by name
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.builtin.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Get preset names for display
    pub fn preset_names(&self) -> Vec<&str> {
        self.builtin.iter().map(|p| p.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ParamId, ParamTable};

    #[test]
    fn test_find_is_case_insensitive() {
        let library = PresetLibrary::new();
        assert_eq!(library.find("vortex").unwrap().name, "Vortex");
        assert!(library.find("nonexistent").is_none());
        assert_eq!(library.preset_names().len(), library.builtin.len());
    }

    #[test]
    fn test_every_mode_has_a_preset() {
        let library = PresetLibrary::new();
        for mode in [
            ForceMode::Gravity,
            ForceMode::Magnetism,
            ForceMode::Turbulence,
            ForceMode::Orbital,
        ] {
            assert!(
                library.builtin.iter().any(|p| p.settings.physics.mode == Some(mode)),
                "no preset for {}",
                mode.name()
            );
        }
    }

    #[test]
    fn test_presets_stay_within_control_ranges() {
        // Anything a preset sets must also be reachable from a controller
        let library = PresetLibrary::new();
        let table = ParamTable::new();
        for preset in &library.builtin {
            for id in ParamId::ALL {
                let spec = table.spec(id);
                let value = table.get(&preset.settings, id);
                if matches!(id, ParamId::MagnetX | ParamId::MagnetY | ParamId::OrbitX | ParamId::OrbitY) {
                    continue;
                }
                assert!(
                    (spec.min..=spec.max).contains(&value),
                    "{}: {} = {}",
                    preset.name,
                    id.path(),
                    value
                );
            }
        }
    }

    #[test]
    fn test_apply_keeps_canvas_centers() {
        let library = PresetLibrary::new();
        let mut settings = EngineSettings::default();
        settings.physics.recenter(400.0, 200.0);

        library.find("Implode").unwrap().apply_to(&mut settings);
        assert_eq!(settings.physics.mode, Some(ForceMode::Magnetism));
        assert_eq!(settings.physics.magnet_strength, 6000.0);
        assert_eq!((settings.physics.magnet_x, settings.physics.magnet_y), (200.0, 100.0));
        assert_eq!((settings.physics.orbit_x, settings.physics.orbit_y), (200.0, 100.0));
    }
}
