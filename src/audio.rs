//! Audio side of the engine boundary.
//!
//! Band extraction lives outside this crate. What arrives here is a
//! per-frame snapshot: seven normalized band energies plus a kick pulse.
//! [`SyntheticAudio`] produces such snapshots without a sound card so the
//! engine can be driven headless.

/// Number of bands in an energy vector
pub const BAND_COUNT: usize = 7;

/// Fixed band order of the energy vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    SubBass = 0,
    Bass = 1,
    LowMid = 2,
    Mid = 3,
    HighMid = 4,
    Treble = 5,
    Presence = 6,
}

impl Band {
    pub const ALL: [Band; BAND_COUNT] = [
        Band::SubBass,
        Band::Bass,
        Band::LowMid,
        Band::Mid,
        Band::HighMid,
        Band::Treble,
        Band::Presence,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Borrowed audio snapshot for one frame. The engine never keeps it.
#[derive(Debug, Clone, Copy)]
pub struct AudioFrame<'a> {
    /// Normalized band energies; well-formed frames carry exactly 7
    pub bands: &'a [f32],
    /// Bass transient pulse (0.0-1.0)
    pub kick: f32,
}

impl<'a> AudioFrame<'a> {
    pub fn new(bands: &'a [f32], kick: f32) -> Self {
        Self { bands, kick }
    }

    /// Mean band energy clamped to [0, 1]; 0 for an empty vector
    pub fn energy(&self) -> f32 {
        if self.bands.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.bands.iter().sum();
        (sum / self.bands.len() as f32).clamp(0.0, 1.0)
    }

    pub fn band(&self, band: Band) -> Option<f32> {
        if self.bands.len() != BAND_COUNT {
            return None;
        }
        self.bands.get(band.index()).copied()
    }
}

/// Deterministic stand-in for a live analyzer: slow sine swells per band
/// and a kick every beat at the given tempo.
pub struct SyntheticAudio {
    bpm: f32,
    frame_rate: f32,
    frame: u64,
    bands: [f32; BAND_COUNT],
    kick: f32,
}

impl SyntheticAudio {
    pub fn new(bpm: f32, frame_rate: f32) -> Self {
        Self {
            bpm: bpm.max(1.0),
            frame_rate: frame_rate.max(1.0),
            frame: 0,
            bands: [0.0; BAND_COUNT],
            kick: 0.0,
        }
    }

    /// Advance one frame and return the new snapshot
    pub fn next_frame(&mut self) -> AudioFrame<'_> {
        let t = self.frame as f32 / self.frame_rate;
        let beat_len = 60.0 / self.bpm;
        let beat_phase = (t % beat_len) / beat_len;

        // Kick decays quickly after each downbeat
        self.kick = (1.0 - beat_phase * 8.0).max(0.0);

        for (i, energy) in self.bands.iter_mut().enumerate() {
            let rate = 0.2 + i as f32 * 0.35;
            let swell = 0.5 + 0.5 * (t * rate + i as f32).sin();
            // Low bands follow the kick
            let punch = if i < 2 { self.kick * 0.5 } else { 0.0 };
            *energy = (swell * 0.7 + punch).clamp(0.0, 1.0);
        }

        self.frame += 1;
        AudioFrame::new(&self.bands, self.kick)
    }
}
