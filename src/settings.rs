//! Host settings
//!
//! Gameplay timings are fixed in [`crate::consts`]; these only control how a
//! host drives the engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Host configuration, read from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for agent decisions (None = pick one at startup)
    pub seed: Option<u64>,
    /// Let the human slot play itself (demo / attract mode)
    pub autopilot: bool,
    /// Frame delta the headless runner feeds the engine (ms)
    pub frame_ms: f64,
    /// Give up on a headless match after this much simulated time (ms)
    pub max_match_ms: f64,
    /// Number of matches the headless runner plays back to back
    pub rounds: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            autopilot: true,
            frame_ms: 1000.0 / 60.0,
            max_match_ms: 5.0 * 60.0 * 1000.0,
            rounds: 1,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load_or_default(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read {}: {}; using default settings", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings in {}: {}; using default settings", path.display(), e);
                Self::default()
            }
        }
    }
}
