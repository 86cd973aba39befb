//! Solver settings
//!
//! Persisted as JSON next to the level data. Missing fields fall back to
//! their defaults so older settings files keep loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{GEOMETRY_EPSILON, MAX_TRACE_STEPS};

/// Tuning knobs for a solve pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Reflections allowed per beam before it is cut short
    pub max_trace_steps: usize,
    /// Distance within which two candidate hits count as a tie
    pub epsilon: f32,
    /// Exits stay shut while a beam crosses the player
    pub require_valid_for_exits: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_trace_steps: MAX_TRACE_STEPS,
            epsilon: GEOMETRY_EPSILON,
            require_valid_for_exits: true,
        }
    }
}

impl SolverSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from disk, falling back to defaults on any problem
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded solver settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Bad solver settings in {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not read {}: {}", path.display(), e),
        }

        log::info!("Using default solver settings");
        Self::default()
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Solver settings saved to {}", path.display());
        Ok(())
    }
}
