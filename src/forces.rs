use crate::audio::{Band, BAND_COUNT};
use crate::error::EngineError;
use crate::particle::Particle;
use crate::settings::{AudioReactiveConfig, PhysicsConfig};
use serde::{Deserialize, Serialize};

/// Softening term added to the squared distance in magnetism
const MAGNET_SOFTENING: f32 = 100.0;

/// Turbulence clock scale applied to the accumulated engine time
const TURBULENCE_TIME_SCALE: f32 = 0.01;

/// Active force field. Exactly one runs per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForceMode {
    /// Constant downward (or any direction) pull
    #[default]
    Gravity,
    /// Softened attraction toward a target point
    Magnetism,
    /// Sine/cosine pseudo-noise flow field
    Turbulence,
    /// Swirl around a center with a weak inward pull
    Orbital,
}

impl ForceMode {
    pub fn name(&self) -> &'static str {
        match self {
            ForceMode::Gravity => "Gravity",
            ForceMode::Magnetism => "Magnetism",
            ForceMode::Turbulence => "Turbulence",
            ForceMode::Orbital => "Orbital",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ForceMode::Gravity => ForceMode::Magnetism,
            ForceMode::Magnetism => ForceMode::Turbulence,
            ForceMode::Turbulence => ForceMode::Orbital,
            ForceMode::Orbital => ForceMode::Gravity,
        }
    }

    /// Parse a mode name as typed by a user or sent by a controller
    pub fn from_name(s: &str) -> Result<Self, EngineError> {
        match s.trim().to_lowercase().as_str() {
            "gravity" | "grav" => Ok(ForceMode::Gravity),
            "magnetism" | "magnet" | "magnetic" => Ok(ForceMode::Magnetism),
            "turbulence" | "turb" | "noise" => Ok(ForceMode::Turbulence),
            "orbital" | "orbit" => Ok(ForceMode::Orbital),
            _ => Err(EngineError::UnknownMode(s.to_string())),
        }
    }

    /// Force this field exerts on `p` at engine time `time`.
    ///
    /// Returns `None` when the direction is undefined (particle sitting
    /// exactly on the magnet target or orbit center); the caller skips the
    /// particle for this frame.
    pub fn force(&self, physics: &PhysicsConfig, p: &Particle, time: f32) -> Option<(f32, f32)> {
        match self {
            ForceMode::Gravity => Some((physics.gravity_x * p.mass, physics.gravity_y * p.mass)),
            ForceMode::Magnetism => {
                let dx = physics.magnet_x - p.x;
                let dy = physics.magnet_y - p.y;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq == 0.0 {
                    return None;
                }
                let dist = dist_sq.sqrt();
                let magnitude = physics.magnet_strength * p.mass / (dist_sq + MAGNET_SOFTENING);
                Some((dx / dist * magnitude, dy / dist * magnitude))
            }
            ForceMode::Turbulence => {
                let freq = physics.turbulence_frequency;
                let phase = time * TURBULENCE_TIME_SCALE;
                let noise_x = (p.x * freq + phase).sin() * (p.y * freq).cos();
                let noise_y = (p.x * freq).cos() * (p.y * freq + phase).sin();
                Some((
                    noise_x * physics.turbulence_strength,
                    noise_y * physics.turbulence_strength,
                ))
            }
            ForceMode::Orbital => {
                let dx = p.x - physics.orbit_x;
                let dy = p.y - physics.orbit_y;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq == 0.0 {
                    return None;
                }
                let dist = dist_sq.sqrt();
                let (ux, uy) = (dx / dist, dy / dist);

                // Tangent is the radius rotated a quarter turn. A plain
                // force: heavier particles swing around more slowly.
                let fx = -uy * physics.orbit_strength - ux * physics.orbit_pull;
                let fy = ux * physics.orbit_strength - uy * physics.orbit_pull;
                Some((fx, fy))
            }
        }
    }
}

/// Per-frame band energies the coupling terms read, already validated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioCoupling {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

impl AudioCoupling {
    /// Pick the coupled bands out of a 7-band vector. Any other length is
    /// rejected and the coupling terms are skipped for the frame.
    pub fn from_bands(bands: &[f32]) -> Result<Self, EngineError> {
        if bands.len() != BAND_COUNT {
            return Err(EngineError::BandCount {
                expected: BAND_COUNT,
                got: bands.len(),
            });
        }
        Ok(Self {
            bass: bands[Band::Bass.index()],
            mid: bands[Band::Mid.index()],
            treble: bands[Band::Treble.index()],
        })
    }

    /// Direct velocity and size mutation. Bypasses the accumulator and runs
    /// once per frame before damping.
    pub fn apply(&self, reactive: &AudioReactiveConfig, p: &mut Particle) {
        p.vy += self.bass * reactive.bass_lift;
        p.vx += (self.treble - 0.5) * reactive.treble_drift;
        p.size = p.base_size * (1.0 + self.mid * reactive.mid_swell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn particle_at(x: f32, y: f32) -> Particle {
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = Particle::default();
        p.spawn(&mut rng, x, y, 0.0, 0.0, 10.0, 1.0, 0.0);
        p
    }

    #[test]
    fn test_gravity_is_position_independent() {
        let physics = PhysicsConfig::default();
        let a = ForceMode::Gravity.force(&physics, &particle_at(0.0, 0.0), 0.0);
        let b = ForceMode::Gravity.force(&physics, &particle_at(500.0, 123.0), 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_magnetism_points_at_target() {
        let physics = PhysicsConfig {
            magnet_x: 100.0,
            magnet_y: 0.0,
            magnet_strength: 1000.0,
            ..Default::default()
        };
        let (fx, fy) = ForceMode::Magnetism
            .force(&physics, &particle_at(0.0, 0.0), 0.0)
            .unwrap();
        assert!(fx > 0.0);
        assert!(fy.abs() < 1e-6);
        // 1000 * mass(1.0) / (100^2 + 100)
        assert!((fx - 1000.0 / 10100.0).abs() < 1e-6);
    }

    #[test]
    fn test_magnetism_skips_at_target() {
        let physics = PhysicsConfig {
            magnet_x: 10.0,
            magnet_y: 20.0,
            ..Default::default()
        };
        let p = particle_at(10.0, 20.0);
        assert_eq!(ForceMode::Magnetism.force(&physics, &p, 0.0), None);
    }

    #[test]
    fn test_orbital_skips_at_center() {
        let physics = PhysicsConfig {
            orbit_x: 5.0,
            orbit_y: 5.0,
            ..Default::default()
        };
        let p = particle_at(5.0, 5.0);
        assert_eq!(ForceMode::Orbital.force(&physics, &p, 0.0), None);
    }

    #[test]
    fn test_orbital_is_mostly_tangential() {
        let physics = PhysicsConfig {
            orbit_x: 0.0,
            orbit_y: 0.0,
            orbit_strength: 1.0,
            orbit_pull: 0.02,
            ..Default::default()
        };
        // Particle on +x axis: tangent is +y, pull is -x
        let (fx, fy) = ForceMode::Orbital
            .force(&physics, &particle_at(50.0, 0.0), 0.0)
            .unwrap();
        assert!((fy - 1.0).abs() < 1e-6);
        assert!((fx + 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_orbital_force_ignores_mass() {
        let physics = PhysicsConfig {
            orbit_x: 0.0,
            orbit_y: 0.0,
            orbit_strength: 1.0,
            orbit_pull: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut light = Particle::default();
        light.spawn(&mut rng, 0.0, 80.0, 0.0, 0.0, 2.0, 1.0, 0.0);
        let heavy = particle_at(0.0, 80.0);

        let (lx, ly) = ForceMode::Orbital.force(&physics, &light, 0.0).unwrap();
        let (hx, hy) = ForceMode::Orbital.force(&physics, &heavy, 0.0).unwrap();
        assert!(((lx * lx + ly * ly).sqrt() - 1.0).abs() < 1e-6);
        assert_eq!((lx, ly), (hx, hy));

        // Same force, so the light particle accelerates five times harder
        light.apply_force(lx, ly);
        let mut heavy = heavy;
        heavy.apply_force(hx, hy);
        assert!((light.ax.abs() - 5.0 * heavy.ax.abs()).abs() < 1e-4);
    }

    #[test]
    fn test_turbulence_is_deterministic() {
        let physics = PhysicsConfig::default();
        let p = particle_at(321.0, 77.0);
        let a = ForceMode::Turbulence.force(&physics, &p, 42.0);
        let b = ForceMode::Turbulence.force(&physics, &p, 42.0);
        assert_eq!(a, b);
        let (fx, fy) = a.unwrap();
        assert!(fx.abs() <= physics.turbulence_strength);
        assert!(fy.abs() <= physics.turbulence_strength);
    }

    #[test]
    fn test_turbulence_noise_law() {
        let physics = PhysicsConfig {
            turbulence_strength: 2.0,
            turbulence_frequency: 0.01,
            ..Default::default()
        };
        // x*f = 0.5, y*f = 1.0, t*0.01 = 1.0
        let (fx, fy) = ForceMode::Turbulence
            .force(&physics, &particle_at(50.0, 100.0), 100.0)
            .unwrap();
        // 2 * sin(1.5) * cos(1.0), 2 * cos(0.5) * sin(2.0)
        assert!((fx - 1.077_898).abs() < 1e-4, "fx = {}", fx);
        assert!((fy - 1.595_967).abs() < 1e-4, "fy = {}", fy);

        // Without the clock phase the field would be sin(0.5) * cos(1.0) * 2
        let (still_x, _) = ForceMode::Turbulence
            .force(&physics, &particle_at(50.0, 100.0), 0.0)
            .unwrap();
        assert!((still_x - 2.0 * 0.5_f32.sin() * 1.0_f32.cos()).abs() < 1e-5);
        assert!((fx - still_x).abs() > 0.1);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(ForceMode::from_name("Orbit").unwrap(), ForceMode::Orbital);
        assert_eq!(ForceMode::from_name(" magnet ").unwrap(), ForceMode::Magnetism);
        assert!(ForceMode::from_name("vortex").is_err());
        assert_eq!(ForceMode::Orbital.next(), ForceMode::Gravity);
    }

    #[test]
    fn test_coupling_rejects_wrong_band_count() {
        assert!(AudioCoupling::from_bands(&[0.5; 6]).is_err());
        assert!(AudioCoupling::from_bands(&[0.5; 8]).is_err());
        assert!(AudioCoupling::from_bands(&[0.5; 7]).is_ok());
    }

    #[test]
    fn test_coupling_mutates_velocity_and_size() {
        let reactive = AudioReactiveConfig::default();
        let bands = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let coupling = AudioCoupling::from_bands(&bands).unwrap();
        let mut p = particle_at(0.0, 0.0);
        coupling.apply(&reactive, &mut p);
        assert!((p.vy - reactive.bass_lift).abs() < 1e-6);
        assert!((p.vx - 0.5 * reactive.treble_drift).abs() < 1e-6);
        assert!((p.size - 10.0 * (1.0 + reactive.mid_swell)).abs() < 1e-5);

        // Size scaling is relative to the spawn size, not compounding
        coupling.apply(&reactive, &mut p);
        assert!((p.size - 10.0 * (1.0 + reactive.mid_swell)).abs() < 1e-5);
    }
}
