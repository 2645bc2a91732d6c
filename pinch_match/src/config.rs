//! Application configuration.
//!
//! Every section has defaults; a JSON file only needs the fields it
//! changes:
//!
//! ```json
//! { "puzzle": { "time_limit_secs": 90 }, "interaction": { "snap_radius": 60 } }
//! ```

use std::fs;
use std::path::Path;

use hand_gesture::{GestureConfig, PointerEmulator};
use match_puzzle::PuzzleConfig;
use serde::{Deserialize, Serialize};

use crate::controller::InteractionConfig;
use crate::detector::DetectorConfig;
use crate::error::AppError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width:  usize,
    pub height: usize,
    pub fps:    u32,
}

impl Default for WindowConfig {
    fn default() -> Self { WindowConfig { width: 1100, height: 700, fps: 60 } }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window:      WindowConfig,
    pub gesture:     GestureConfig,
    pub pointer:     PointerEmulator,
    pub puzzle:      PuzzleConfig,
    pub interaction: InteractionConfig,
    pub detector:    DetectorConfig,
    /// Landmark dots and the metrics line.
    pub verbose:     bool,
    /// Hand bounding box and gesture label.
    pub show_hand:   bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            window:      WindowConfig::default(),
            gesture:     GestureConfig::default(),
            pointer:     PointerEmulator::default(),
            puzzle:      PuzzleConfig::default(),
            interaction: InteractionConfig::default(),
            detector:    DetectorConfig::default(),
            verbose:     true,
            show_hand:   true,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path)
            .map_err(|source| AppError::ConfigRead { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
            .map_err(|source| AppError::ConfigParse { path: path.to_path_buf(), source })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
