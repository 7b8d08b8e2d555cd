use crate::error::EngineError;
use crate::forces::ForceMode;
use serde::{Deserialize, Serialize};

/// Boundary behavior - what happens when particles leave the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryBehavior {
    /// Wrap to opposite side (toroidal)
    #[default]
    Wrap,
    /// Reflect off edges, losing some speed
    Bounce,
}

impl BoundaryBehavior {
    pub fn name(&self) -> &'static str {
        match self {
            BoundaryBehavior::Wrap => "Wrap",
            BoundaryBehavior::Bounce => "Bounce",
        }
    }

    pub fn from_name(s: &str) -> Result<Self, EngineError> {
        match s.trim().to_lowercase().as_str() {
            "wrap" | "toroidal" => Ok(BoundaryBehavior::Wrap),
            "bounce" | "reflect" => Ok(BoundaryBehavior::Bounce),
            _ => Err(EngineError::UnknownBoundary(s.to_string())),
        }
    }
}

/// Force field selection and every per-mode parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Active field; `None` applies no field force
    pub mode: Option<ForceMode>,

    // === Gravity ===
    pub gravity_x: f32,
    pub gravity_y: f32,

    // === Magnetism ===
    pub magnet_x: f32,
    pub magnet_y: f32,
    pub magnet_strength: f32,

    // === Turbulence ===
    pub turbulence_strength: f32,
    pub turbulence_frequency: f32,

    // === Orbital ===
    pub orbit_x: f32,
    pub orbit_y: f32,
    /// Tangential force magnitude
    pub orbit_strength: f32,
    /// Fixed inward pull
    pub orbit_pull: f32,

    // === Motion ===
    /// Velocity multiplier applied once per frame (0.8-1.0)
    pub damping: f32,
    pub boundary: BoundaryBehavior,
    /// Speed kept after a bounce (0.0-1.0)
    pub bounce_damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            mode: Some(ForceMode::default()),
            gravity_x: 0.0,
            gravity_y: 0.1,
            // Centers track the canvas; 1920x1080 until the first resize
            magnet_x: 960.0,
            magnet_y: 540.0,
            magnet_strength: 2000.0,
            turbulence_strength: 0.5,
            turbulence_frequency: 0.01,
            orbit_x: 960.0,
            orbit_y: 540.0,
            orbit_strength: 0.5,
            orbit_pull: 0.02,
            damping: 0.99,
            boundary: BoundaryBehavior::default(),
            bounce_damping: 0.8,
        }
    }
}

impl PhysicsConfig {
    /// Switch mode by name. An unknown name clears the mode so no field
    /// force runs until a valid one is set; the error is handed back for
    /// the caller to report.
    pub fn set_mode_by_name(&mut self, name: &str) -> Result<(), EngineError> {
        match ForceMode::from_name(name) {
            Ok(mode) => {
                self.mode = Some(mode);
                Ok(())
            }
            Err(e) => {
                self.mode = None;
                Err(e)
            }
        }
    }

    /// Advance to the next force field (starting from gravity if none is set)
    pub fn cycle_mode(&mut self) {
        self.mode = Some(self.mode.map_or(ForceMode::Gravity, |m| m.next()));
    }

    /// Move magnet target and orbit center to the middle of the canvas
    pub fn recenter(&mut self, width: f32, height: f32) {
        self.magnet_x = width / 2.0;
        self.magnet_y = height / 2.0;
        self.orbit_x = width / 2.0;
        self.orbit_y = height / 2.0;
    }
}

/// Where and how new particles appear
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionConfig {
    /// Particles requested per frame before audio scaling
    pub rate: f32,
    /// Spawn region center as a fraction of canvas width (0.0-1.0)
    pub spawn_x: f32,
    /// Spawn region center as a fraction of canvas height (0.0-1.0)
    pub spawn_y: f32,
    /// Side of the square jitter box around the region center (pixels)
    pub spread: f32,
    pub velocity_min: f32,
    pub velocity_max: f32,
    pub size_min: f32,
    pub size_max: f32,
    /// Lifetime bounds in frames at unit time step
    pub life_min: f32,
    pub life_max: f32,
    /// Base hue in degrees (0-360)
    pub hue: f32,
    /// Full width of the random hue band around `hue`
    pub hue_variation: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            rate: 5.0,
            spawn_x: 0.5,
            spawn_y: 0.5,
            spread: 50.0,
            velocity_min: 1.0,
            velocity_max: 3.0,
            size_min: 2.0,
            size_max: 6.0,
            life_min: 100.0,
            life_max: 200.0,
            hue: 200.0,
            hue_variation: 60.0,
            saturation: 80.0,
            lightness: 60.0,
        }
    }
}

/// How strongly audio drives emission and motion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioReactiveConfig {
    pub emission_multiplier: f32,
    pub size_multiplier: f32,
    pub velocity_multiplier: f32,
    /// Degrees added to every spawned hue
    pub hue_shift: f32,
    /// Extra particles requested on a full kick
    pub kick_burst: f32,
    /// Downward velocity added per unit of bass energy
    pub bass_lift: f32,
    /// Lateral velocity per unit of treble offset from 0.5
    pub treble_drift: f32,
    /// Size swell per unit of mid energy
    pub mid_swell: f32,
}

impl Default for AudioReactiveConfig {
    fn default() -> Self {
        Self {
            emission_multiplier: 2.0,
            size_multiplier: 0.5,
            velocity_multiplier: 1.0,
            hue_shift: 0.0,
            kick_burst: 10.0,
            bass_lift: 0.5,
            treble_drift: 0.3,
            mid_swell: 0.2,
        }
    }
}

/// All live-tweakable engine settings consolidated into one struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    pub physics: PhysicsConfig,
    pub emission: EmissionConfig,
    pub audio: AudioReactiveConfig,
}
