use crate::particle::{Particle, LIFE_DECAY};
use crate::pool::ParticlePool;
use crate::settings::{AudioReactiveConfig, EmissionConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform sample from [lo, hi], tolerating reversed or equal bounds
fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if lo == hi {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}

/// Number of particles an emit call asks for once audio scaling is applied
pub fn scaled_count(count: f32, energy: f32, reactive: &AudioReactiveConfig) -> usize {
    let scaled = (count * (1.0 + energy * reactive.emission_multiplier)).floor();
    if scaled.is_finite() && scaled > 0.0 {
        scaled as usize
    } else {
        0
    }
}

/// Spawns particles into free pool slots from the emission settings
pub struct Emitter {
    rng: StdRng,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Emitter with a fixed seed, for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Spawn up to `count * (1 + energy * emission_multiplier)` particles.
    ///
    /// Stops quietly when the pool runs out of free slots; live particles
    /// are never evicted. Returns how many were actually spawned.
    #[allow(clippy::too_many_arguments)]
    pub fn emit(
        &mut self,
        pool: &mut ParticlePool,
        emission: &EmissionConfig,
        reactive: &AudioReactiveConfig,
        width: f32,
        height: f32,
        count: f32,
        energy: f32,
    ) -> usize {
        let requested = scaled_count(count, energy, reactive);
        let mut spawned = 0;

        while spawned < requested {
            let Some(slot) = pool.acquire() else {
                log::debug!(
                    "pool exhausted: spawned {} of {} requested",
                    spawned,
                    requested
                );
                break;
            };
            if let Some(p) = pool.get_mut(slot) {
                self.roll(p, emission, reactive, width, height, energy);
                spawned += 1;
            }
        }

        spawned
    }

    /// Fill one free slot with a freshly randomized particle
    fn roll(
        &mut self,
        p: &mut Particle,
        emission: &EmissionConfig,
        reactive: &AudioReactiveConfig,
        width: f32,
        height: f32,
        energy: f32,
    ) {
        let rng = &mut self.rng;
        let half_spread = emission.spread.abs() / 2.0;

        let x = emission.spawn_x * width + uniform(rng, -half_spread, half_spread);
        let y = emission.spawn_y * height + uniform(rng, -half_spread, half_spread);

        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let speed = uniform(rng, emission.velocity_min, emission.velocity_max)
            * (1.0 + energy * reactive.velocity_multiplier);

        let size = uniform(rng, emission.size_min, emission.size_max)
            * (1.0 + energy * reactive.size_multiplier);
        let size = size.max(f32::EPSILON);

        // Lifetime is configured in frames; life drains LIFE_DECAY per frame
        let lifetime = uniform(rng, emission.life_min, emission.life_max);
        let life = (lifetime * LIFE_DECAY).max(f32::EPSILON);

        let half_variation = emission.hue_variation.abs() / 2.0;
        let hue = (emission.hue + uniform(rng, -half_variation, half_variation) + reactive.hue_shift)
            .rem_euclid(360.0);

        p.spawn(
            rng,
            x,
            y,
            angle.cos() * speed,
            angle.sin() * speed,
            size,
            life,
            hue,
        );
        p.saturation = emission.saturation;
        p.lightness = emission.lightness;
    }
}
