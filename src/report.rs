use crate::engine::EngineStats;
use crate::error::EngineError;
use crate::settings::EngineSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Summary of a headless run, written as JSON when the run ends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Version field for future compatibility
    pub version: u32,
    /// Frames simulated
    pub frames: u64,
    /// Particles spawned over the whole run
    pub spawned_total: u64,
    /// Highest live count seen after any frame
    pub peak_active: usize,
    /// Engine numbers after the last frame
    pub final_stats: EngineStats,
    /// Settings in effect at the end of the run
    pub settings: EngineSettings,
}

impl RunReport {
    pub fn new(settings: EngineSettings, final_stats: EngineStats) -> Self {
        Self {
            version: 1,
            frames: 0,
            spawned_total: 0,
            peak_active: 0,
            final_stats,
            settings,
        }
    }

    /// Fold one finished frame into the running totals
    pub fn record_frame(&mut self, spawned: usize, active: usize) {
        self.frames += 1;
        self.spawned_total += spawned as u64;
        self.peak_active = self.peak_active.max(active);
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
