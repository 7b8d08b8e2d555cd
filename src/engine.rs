use crate::audio::AudioFrame;
use crate::emitter::Emitter;
use crate::forces::AudioCoupling;
use crate::lod;
use crate::particle::Particle;
use crate::pool::{ParticlePool, DEFAULT_CAPACITY};
use crate::settings::EngineSettings;
use crate::spatial::SpatialIndex;
use serde::{Deserialize, Serialize};

/// Aggregate numbers for diagnostic overlays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub active: usize,
    pub capacity: usize,
    /// Share of the pool in use, as a percentage (0-100)
    pub utilization: f32,
    pub occupied_cells: usize,
    pub frame: u64,
}

/// Particle simulation state
pub struct ParticleEngine {
    pool: ParticlePool,
    index: SpatialIndex,
    emitter: Emitter,
    /// Live-tweakable parameters; the control layer writes here between frames
    pub settings: EngineSettings,
    width: f32,
    height: f32,
    /// Accumulated time, drives the turbulence field
    time: f32,
    frame: u64,
    /// Scratch list of slots retired during the current update
    retired: Vec<usize>,
}

impl Default for ParticleEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, 1920.0, 1080.0)
    }
}

impl ParticleEngine {
    pub fn new(capacity: usize, width: f32, height: f32) -> Self {
        Self::with_emitter(capacity, width, height, Emitter::new())
    }

    /// Engine whose emitter randomness is seeded, for reproducible runs
    pub fn with_seed(capacity: usize, width: f32, height: f32, seed: u64) -> Self {
        Self::with_emitter(capacity, width, height, Emitter::with_seed(seed))
    }

    fn with_emitter(capacity: usize, width: f32, height: f32, emitter: Emitter) -> Self {
        let mut engine = Self {
            pool: ParticlePool::new(capacity),
            index: SpatialIndex::default(),
            emitter,
            settings: EngineSettings::default(),
            width: 0.0,
            height: 0.0,
            time: 0.0,
            frame: 0,
            retired: Vec::with_capacity(capacity),
        };
        engine.resize(width, height);
        engine
    }

    /// Set canvas geometry. Magnet target and orbit center follow the new
    /// canvas center.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::warn!("ignoring invalid canvas size {}x{}", width, height);
            return;
        }
        self.width = width;
        self.height = height;
        self.settings.physics.recenter(width, height);
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Spawn `count` particles, scaled up by `energy` (clamped to [0, 1]).
    /// Returns how many actually fit in the pool.
    pub fn emit(&mut self, count: f32, energy: f32) -> usize {
        let energy = if energy.is_finite() { energy.clamp(0.0, 1.0) } else { 0.0 };
        self.emitter.emit(
            &mut self.pool,
            &self.settings.emission,
            &self.settings.audio,
            self.width,
            self.height,
            count,
            energy,
        )
    }

    /// Advance every live particle by `dt`.
    ///
    /// Per particle, in order: field force, audio coupling, damping,
    /// integration, boundary, spatial insertion. `bands` must hold exactly
    /// seven energies for the audio coupling to run; anything else skips
    /// it for this frame while the field force still applies.
    pub fn update(&mut self, dt: f32, bands: Option<&[f32]>) {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            log::warn!("ignoring invalid time step {}", dt);
            0.0
        };

        let coupling = bands.and_then(|b| match AudioCoupling::from_bands(b) {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("skipping audio coupling: {}", e);
                None
            }
        });

        self.time += dt;
        self.frame += 1;
        self.index.clear();

        let physics = &self.settings.physics;
        let reactive = &self.settings.audio;
        let mut retired = std::mem::take(&mut self.retired);

        for (slot, p) in self.pool.slots_mut().iter_mut().enumerate() {
            if !p.active {
                continue;
            }

            if let Some(mode) = physics.mode {
                if let Some((fx, fy)) = mode.force(physics, p, self.time) {
                    p.apply_force(fx, fy);
                }
            }

            if let Some(coupling) = &coupling {
                coupling.apply(reactive, p);
            }

            p.damp(physics.damping);

            if p.advance(dt) {
                retired.push(slot);
                continue;
            }

            p.apply_boundary(physics.boundary, self.width, self.height, physics.bounce_damping);
            self.index.insert(slot, p.x, p.y);
        }

        for slot in retired.drain(..) {
            self.pool.release(slot);
        }
        self.retired = retired;
    }

    /// One full frame: audio-driven emission followed by an update.
    ///
    /// Requests `rate + kick * kick_burst` particles scaled by the mean band
    /// energy. Without audio the base rate is emitted unscaled. Returns the
    /// number of particles spawned.
    pub fn frame(&mut self, dt: f32, audio: Option<&AudioFrame<'_>>) -> usize {
        let (count, energy) = match audio {
            Some(a) => {
                let kick = if a.kick.is_finite() { a.kick.clamp(0.0, 1.0) } else { 0.0 };
                (
                    self.settings.emission.rate + kick * self.settings.audio.kick_burst,
                    a.energy(),
                )
            }
            None => (self.settings.emission.rate, 0.0),
        };
        // Emission rate is per unit time step
        let spawned = self.emit(count * dt, energy);
        self.update(dt, audio.map(|a| a.bands));
        spawned
    }

    /// Live particles in pool order
    pub fn active_particles(&self) -> impl Iterator<Item = &Particle> {
        self.pool.iter_active()
    }

    /// At most `max_count` live particles, thinned by uniform stride when
    /// there are more. Same pool state and budget always give the same
    /// selection.
    pub fn sample_for_display(&self, max_count: usize) -> Vec<&Particle> {
        let active: Vec<&Particle> = self.pool.iter_active().collect();
        lod::sample(&active, max_count)
    }

    /// Live particles in the grid cells around (x, y). Broad phase only:
    /// may include particles farther than `radius`.
    ///
    /// The grid holds positions as of the last `update`. Particles spawned
    /// since then show up after the next update; a slot reused in between
    /// is dropped unless its new occupant also sits in the queried cells.
    pub fn query_radius(&self, x: f32, y: f32, radius: f32) -> Vec<&Particle> {
        self.index
            .query_radius(x, y, radius)
            .into_iter()
            .filter_map(|slot| self.pool.get(slot))
            .filter(|p| p.active && self.index.within_reach(x, y, radius, p.x, p.y))
            .collect()
    }

    pub fn stats(&self) -> EngineStats {
        let active = self.pool.active_count();
        let capacity = self.pool.capacity();
        let utilization = if capacity == 0 {
            0.0
        } else {
            active as f32 / capacity as f32 * 100.0
        };
        EngineStats {
            active,
            capacity,
            utilization,
            occupied_cells: self.index.occupied_cells(),
            frame: self.frame,
        }
    }

    /// Retire every particle and reset the clock
    pub fn clear(&mut self) {
        self.pool.clear();
        self.index.clear();
        self.time = 0.0;
        self.frame = 0;
    }
}
