//! Control mapping: external controllers writing into engine settings.
//!
//! Every tweakable scalar has a [`ParamId`]. The [`ParamTable`] is built
//! once and holds a range plus a getter/setter pair per parameter, so a
//! write never walks the settings struct by string. Dotted paths such as
//! `physics.gravityY` are only resolved to an id at the edge.
//!
//! Writes that fail (unknown path, non-finite value, out of range) leave the
//! previous value in place. [`ControlMapper`] logs them and moves on.

use crate::error::EngineError;
use crate::settings::{BoundaryBehavior, EngineSettings};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

type Getter = fn(&EngineSettings) -> f32;
type Setter = fn(&mut EngineSettings, f32);

/// Every externally writable scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    GravityX,
    GravityY,
    MagnetX,
    MagnetY,
    MagnetStrength,
    TurbulenceStrength,
    TurbulenceFrequency,
    OrbitX,
    OrbitY,
    OrbitStrength,
    OrbitPull,
    Damping,
    BounceDamping,
    EmissionRate,
    SpawnX,
    SpawnY,
    Spread,
    VelocityMin,
    VelocityMax,
    SizeMin,
    SizeMax,
    LifeMin,
    LifeMax,
    Hue,
    HueVariation,
    Saturation,
    Lightness,
    EmissionMultiplier,
    SizeMultiplier,
    VelocityMultiplier,
    HueShift,
    KickBurst,
    BassLift,
    TrebleDrift,
    MidSwell,
}

impl ParamId {
    pub const ALL: [ParamId; 35] = [
        ParamId::GravityX,
        ParamId::GravityY,
        ParamId::MagnetX,
        ParamId::MagnetY,
        ParamId::MagnetStrength,
        ParamId::TurbulenceStrength,
        ParamId::TurbulenceFrequency,
        ParamId::OrbitX,
        ParamId::OrbitY,
        ParamId::OrbitStrength,
        ParamId::OrbitPull,
        ParamId::Damping,
        ParamId::BounceDamping,
        ParamId::EmissionRate,
        ParamId::SpawnX,
        ParamId::SpawnY,
        ParamId::Spread,
        ParamId::VelocityMin,
        ParamId::VelocityMax,
        ParamId::SizeMin,
        ParamId::SizeMax,
        ParamId::LifeMin,
        ParamId::LifeMax,
        ParamId::Hue,
        ParamId::HueVariation,
        ParamId::Saturation,
        ParamId::Lightness,
        ParamId::EmissionMultiplier,
        ParamId::SizeMultiplier,
        ParamId::VelocityMultiplier,
        ParamId::HueShift,
        ParamId::KickBurst,
        ParamId::BassLift,
        ParamId::TrebleDrift,
        ParamId::MidSwell,
    ];

    /// Dotted path controllers address this parameter by
    pub fn path(&self) -> &'static str {
        match self {
            ParamId::GravityX => "physics.gravityX",
            ParamId::GravityY => "physics.gravityY",
            ParamId::MagnetX => "physics.magnetX",
            ParamId::MagnetY => "physics.magnetY",
            ParamId::MagnetStrength => "physics.magnetStrength",
            ParamId::TurbulenceStrength => "physics.turbulenceStrength",
            ParamId::TurbulenceFrequency => "physics.turbulenceFrequency",
            ParamId::OrbitX => "physics.orbitX",
            ParamId::OrbitY => "physics.orbitY",
            ParamId::OrbitStrength => "physics.orbitStrength",
            ParamId::OrbitPull => "physics.orbitPull",
            ParamId::Damping => "physics.damping",
            ParamId::BounceDamping => "physics.bounceDamping",
            ParamId::EmissionRate => "emission.rate",
            ParamId::SpawnX => "emission.spawnX",
            ParamId::SpawnY => "emission.spawnY",
            ParamId::Spread => "emission.spread",
            ParamId::VelocityMin => "emission.velocityMin",
            ParamId::VelocityMax => "emission.velocityMax",
            ParamId::SizeMin => "emission.sizeMin",
            ParamId::SizeMax => "emission.sizeMax",
            ParamId::LifeMin => "emission.lifeMin",
            ParamId::LifeMax => "emission.lifeMax",
            ParamId::Hue => "emission.hue",
            ParamId::HueVariation => "emission.hueVariation",
            ParamId::Saturation => "emission.saturation",
            ParamId::Lightness => "emission.lightness",
            ParamId::EmissionMultiplier => "audio.emissionMultiplier",
            ParamId::SizeMultiplier => "audio.sizeMultiplier",
            ParamId::VelocityMultiplier => "audio.velocityMultiplier",
            ParamId::HueShift => "audio.hueShift",
            ParamId::KickBurst => "audio.kickBurst",
            ParamId::BassLift => "audio.bassLift",
            ParamId::TrebleDrift => "audio.trebleDrift",
            ParamId::MidSwell => "audio.midSwell",
        }
    }

    /// Accepted value range (inclusive)
    fn range(&self) -> (f32, f32) {
        match self {
            ParamId::GravityX | ParamId::GravityY => (-1.0, 1.0),
            ParamId::MagnetX | ParamId::MagnetY | ParamId::OrbitX | ParamId::OrbitY => (0.0, 8192.0),
            ParamId::MagnetStrength => (-10000.0, 10000.0),
            ParamId::TurbulenceStrength => (0.0, 5.0),
            ParamId::TurbulenceFrequency => (0.0001, 0.1),
            ParamId::OrbitStrength => (-5.0, 5.0),
            ParamId::OrbitPull => (0.0, 1.0),
            ParamId::Damping => (0.8, 1.0),
            ParamId::BounceDamping => (0.0, 1.0),
            ParamId::EmissionRate => (0.0, 100.0),
            ParamId::SpawnX | ParamId::SpawnY => (0.0, 1.0),
            ParamId::Spread => (0.0, 2000.0),
            ParamId::VelocityMin | ParamId::VelocityMax => (0.0, 20.0),
            ParamId::SizeMin | ParamId::SizeMax => (0.5, 64.0),
            ParamId::LifeMin | ParamId::LifeMax => (1.0, 1000.0),
            ParamId::Hue | ParamId::HueVariation | ParamId::HueShift => (0.0, 360.0),
            ParamId::Saturation | ParamId::Lightness => (0.0, 100.0),
            ParamId::EmissionMultiplier | ParamId::SizeMultiplier | ParamId::VelocityMultiplier => (0.0, 10.0),
            ParamId::KickBurst => (0.0, 200.0),
            ParamId::BassLift | ParamId::TrebleDrift => (-2.0, 2.0),
            ParamId::MidSwell => (0.0, 2.0),
        }
    }
}

macro_rules! field {
    ($section:ident . $field:ident) => {
        (
            (|s: &EngineSettings| s.$section.$field) as Getter,
            (|s: &mut EngineSettings, v: f32| s.$section.$field = v) as Setter,
        )
    };
}

fn accessors(id: ParamId) -> (Getter, Setter) {
    match id {
        ParamId::GravityX => field!(physics.gravity_x),
        ParamId::GravityY => field!(physics.gravity_y),
        ParamId::MagnetX => field!(physics.magnet_x),
        ParamId::MagnetY => field!(physics.magnet_y),
        ParamId::MagnetStrength => field!(physics.magnet_strength),
        ParamId::TurbulenceStrength => field!(physics.turbulence_strength),
        ParamId::TurbulenceFrequency => field!(physics.turbulence_frequency),
        ParamId::OrbitX => field!(physics.orbit_x),
        ParamId::OrbitY => field!(physics.orbit_y),
        ParamId::OrbitStrength => field!(physics.orbit_strength),
        ParamId::OrbitPull => field!(physics.orbit_pull),
        ParamId::Damping => field!(physics.damping),
        ParamId::BounceDamping => field!(physics.bounce_damping),
        ParamId::EmissionRate => field!(emission.rate),
        ParamId::SpawnX => field!(emission.spawn_x),
        ParamId::SpawnY => field!(emission.spawn_y),
        ParamId::Spread => field!(emission.spread),
        ParamId::VelocityMin => field!(emission.velocity_min),
        ParamId::VelocityMax => field!(emission.velocity_max),
        ParamId::SizeMin => field!(emission.size_min),
        ParamId::SizeMax => field!(emission.size_max),
        ParamId::LifeMin => field!(emission.life_min),
        ParamId::LifeMax => field!(emission.life_max),
        ParamId::Hue => field!(emission.hue),
        ParamId::HueVariation => field!(emission.hue_variation),
        ParamId::Saturation => field!(emission.saturation),
        ParamId::Lightness => field!(emission.lightness),
        ParamId::EmissionMultiplier => field!(audio.emission_multiplier),
        ParamId::SizeMultiplier => field!(audio.size_multiplier),
        ParamId::VelocityMultiplier => field!(audio.velocity_multiplier),
        ParamId::HueShift => field!(audio.hue_shift),
        ParamId::KickBurst => field!(audio.kick_burst),
        ParamId::BassLift => field!(audio.bass_lift),
        ParamId::TrebleDrift => field!(audio.treble_drift),
        ParamId::MidSwell => field!(audio.mid_swell),
    }
}

/// Range and accessors for one parameter
#[derive(Clone, Copy)]
pub struct ParamSpec {
    pub id: ParamId,
    pub min: f32,
    pub max: f32,
    get: Getter,
    set: Setter,
}

/// Parameter table, built once at wiring time
pub struct ParamTable {
    specs: FnvHashMap<ParamId, ParamSpec>,
    by_path: FnvHashMap<String, ParamId>,
}

impl Default for ParamTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamTable {
    pub fn new() -> Self {
        let mut specs = FnvHashMap::default();
        let mut by_path = FnvHashMap::default();
        for id in ParamId::ALL {
            let (min, max) = id.range();
            let (get, set) = accessors(id);
            specs.insert(id, ParamSpec { id, min, max, get, set });
            by_path.insert(id.path().to_lowercase(), id);
        }
        Self { specs, by_path }
    }

    pub fn spec(&self, id: ParamId) -> &ParamSpec {
        // Every id is inserted in `new`
        &self.specs[&id]
    }

    /// Resolve a dotted path (case-insensitive) to its parameter
    pub fn resolve(&self, path: &str) -> Result<ParamId, EngineError> {
        self.by_path
            .get(&path.trim().to_lowercase())
            .copied()
            .ok_or_else(|| EngineError::UnknownParameter(path.to_string()))
    }

    pub fn get(&self, settings: &EngineSettings, id: ParamId) -> f32 {
        (self.spec(id).get)(settings)
    }

    /// Absolute write. Rejected values leave the setting untouched.
    pub fn set(&self, settings: &mut EngineSettings, id: ParamId, value: f32) -> Result<(), EngineError> {
        let spec = self.spec(id);
        if !value.is_finite() {
            return Err(EngineError::NonFiniteValue(id.path()));
        }
        if value < spec.min || value > spec.max {
            return Err(EngineError::ValueOutOfRange {
                param: id.path(),
                value,
                min: spec.min,
                max: spec.max,
            });
        }
        (spec.set)(settings, value);
        Ok(())
    }

    pub fn set_path(&self, settings: &mut EngineSettings, path: &str, value: f32) -> Result<(), EngineError> {
        let id = self.resolve(path)?;
        self.set(settings, id, value)
    }

    /// Map a normalized controller value in [0, 1] onto the parameter range
    pub fn set_normalized(&self, settings: &mut EngineSettings, id: ParamId, t: f32) -> Result<(), EngineError> {
        if !t.is_finite() {
            return Err(EngineError::NonFiniteValue(id.path()));
        }
        if !(0.0..=1.0).contains(&t) {
            return Err(EngineError::ValueOutOfRange {
                param: id.path(),
                value: t,
                min: 0.0,
                max: 1.0,
            });
        }
        let spec = self.spec(id);
        let value = (spec.min * (1.0 - t) + spec.max * t).clamp(spec.min, spec.max);
        (spec.set)(settings, value);
        Ok(())
    }

    /// Relative write for endless encoders: add `delta` and clamp into range.
    /// Returns the new value.
    pub fn nudge(&self, settings: &mut EngineSettings, id: ParamId, delta: f32) -> f32 {
        let spec = self.spec(id);
        let current = (spec.get)(settings);
        if !delta.is_finite() {
            return current;
        }
        let value = (current + delta).clamp(spec.min, spec.max);
        (spec.set)(settings, value);
        value
    }
}

/// Routes controller input to engine settings, absorbing bad writes
pub struct ControlMapper {
    table: ParamTable,
    /// Controller number -> parameter
    bindings: FnvHashMap<u16, ParamId>,
}

impl Default for ControlMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlMapper {
    pub fn new() -> Self {
        Self {
            table: ParamTable::new(),
            bindings: FnvHashMap::default(),
        }
    }

    pub fn table(&self) -> &ParamTable {
        &self.table
    }

    /// Bind a controller number to the parameter at `path`
    pub fn bind(&mut self, control: u16, path: &str) -> Result<ParamId, EngineError> {
        let id = self.table.resolve(path)?;
        if let Some(previous) = self.bindings.insert(control, id) {
            log::debug!("control {} rebound from {} to {}", control, previous.path(), id.path());
        }
        Ok(id)
    }

    pub fn unbind(&mut self, control: u16) -> Option<ParamId> {
        self.bindings.remove(&control)
    }

    pub fn binding(&self, control: u16) -> Option<ParamId> {
        self.bindings.get(&control).copied()
    }

    /// Controller moved to normalized position `t`. Returns true if a
    /// setting changed.
    pub fn handle(&self, settings: &mut EngineSettings, control: u16, t: f32) -> bool {
        let Some(id) = self.binding(control) else {
            log::warn!("control {} is not bound, ignoring", control);
            return false;
        };
        match self.table.set_normalized(settings, id, t) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("control {}: {}", control, e);
                false
            }
        }
    }

    /// Direct write by dotted path. Returns true if a setting changed.
    pub fn write(&self, settings: &mut EngineSettings, path: &str, value: f32) -> bool {
        match self.table.set_path(settings, path, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("dropping write: {}", e);
                false
            }
        }
    }

    /// Switch force field by name. An unknown name leaves no field active.
    pub fn write_mode(&self, settings: &mut EngineSettings, name: &str) -> bool {
        match settings.physics.set_mode_by_name(name) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{}; field forces disabled", e);
                false
            }
        }
    }

    /// Switch boundary behavior by name. Unknown names keep the current one.
    pub fn write_boundary(&self, settings: &mut EngineSettings, name: &str) -> bool {
        match BoundaryBehavior::from_name(name) {
            Ok(boundary) => {
                settings.physics.boundary = boundary;
                true
            }
            Err(e) => {
                log::warn!("dropping write: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::ForceMode;

    #[test]
    fn test_every_param_round_trips_through_table() {
        let table = ParamTable::new();
        let mut settings = EngineSettings::default();
        for id in ParamId::ALL {
            let spec = *table.spec(id);
            let mid = (spec.min + spec.max) / 2.0;
            table.set(&mut settings, id, mid).unwrap();
            assert_eq!(table.get(&settings, id), mid, "{}", id.path());
            assert_eq!(table.resolve(id.path()).unwrap(), id);
        }
    }

    #[test]
    fn test_paths_are_unique() {
        let table = ParamTable::new();
        assert_eq!(table.by_path.len(), ParamId::ALL.len());
    }

    #[test]
    fn test_dotted_path_write() {
        let table = ParamTable::new();
        let mut settings = EngineSettings::default();
        table.set_path(&mut settings, "physics.gravityY", 0.25).unwrap();
        assert_eq!(settings.physics.gravity_y, 0.25);
        table.set_path(&mut settings, "AUDIO.HUESHIFT", 45.0).unwrap();
        assert_eq!(settings.audio.hue_shift, 45.0);
    }

    #[test]
    fn test_bad_writes_keep_previous_value() {
        let table = ParamTable::new();
        let mut settings = EngineSettings::default();
        let before = settings.physics.damping;

        assert!(matches!(
            table.set_path(&mut settings, "physics.nope", 1.0),
            Err(EngineError::UnknownParameter(_))
        ));
        assert!(matches!(
            table.set(&mut settings, ParamId::Damping, 2.0),
            Err(EngineError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            table.set(&mut settings, ParamId::Damping, f32::NAN),
            Err(EngineError::NonFiniteValue(_))
        ));
        assert_eq!(settings.physics.damping, before);
    }

    #[test]
    fn test_normalized_maps_onto_range() {
        let table = ParamTable::new();
        let mut settings = EngineSettings::default();
        table.set_normalized(&mut settings, ParamId::Hue, 0.5).unwrap();
        assert_eq!(settings.emission.hue, 180.0);
        table.set_normalized(&mut settings, ParamId::Damping, 1.0).unwrap();
        assert_eq!(settings.physics.damping, 1.0);
        assert!(table.set_normalized(&mut settings, ParamId::Hue, 1.5).is_err());
        assert_eq!(settings.emission.hue, 180.0);
    }

    #[test]
    fn test_nudge_clamps() {
        let table = ParamTable::new();
        let mut settings = EngineSettings::default();
        assert_eq!(table.nudge(&mut settings, ParamId::Damping, 0.5), 1.0);
        assert_eq!(table.nudge(&mut settings, ParamId::Damping, -1.0), 0.8);
        assert_eq!(table.nudge(&mut settings, ParamId::Damping, f32::INFINITY), 0.8);
    }

    #[test]
    fn test_mapper_bindings() {
        let mut mapper = ControlMapper::new();
        let mut settings = EngineSettings::default();

        assert_eq!(mapper.bind(21, "physics.gravityY").unwrap(), ParamId::GravityY);
        assert!(mapper.bind(22, "physics.bogus").is_err());
        assert_eq!(mapper.binding(22), None);

        assert!(mapper.handle(&mut settings, 21, 1.0));
        assert_eq!(settings.physics.gravity_y, 1.0);
        assert!(!mapper.handle(&mut settings, 21, -0.5));
        assert_eq!(settings.physics.gravity_y, 1.0);
        assert!(!mapper.handle(&mut settings, 99, 0.5));

        assert_eq!(mapper.unbind(21), Some(ParamId::GravityY));
        assert!(!mapper.handle(&mut settings, 21, 0.0));
    }

    #[test]
    fn test_mapper_writes_absorb_errors() {
        let mapper = ControlMapper::new();
        let mut settings = EngineSettings::default();

        assert!(mapper.write(&mut settings, "emission.rate", 12.0));
        assert_eq!(settings.emission.rate, 12.0);
        assert!(!mapper.write(&mut settings, "emission.rate", 1000.0));
        assert_eq!(settings.emission.rate, 12.0);

        assert!(mapper.write_mode(&mut settings, "turbulence"));
        assert_eq!(settings.physics.mode, Some(ForceMode::Turbulence));
        assert!(!mapper.write_mode(&mut settings, "spiral"));
        assert_eq!(settings.physics.mode, None);

        assert!(mapper.write_boundary(&mut settings, "bounce"));
        assert!(!mapper.write_boundary(&mut settings, "absorb"));
        assert_eq!(settings.physics.boundary, BoundaryBehavior::Bounce);
    }
}
