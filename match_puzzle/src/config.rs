//! Puzzle layout and rules.

use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;
use crate::Point;

/// Axis-aligned rectangle `(x, y, w, h)` in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self { Rect { x, y, w, h } }

    pub fn contains(&self, (px, py): Point) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

/// Default symbol pool: five gems and five gears.
pub const DEFAULT_SYMBOLS: [&str; 10] = [
    "RUBY-1", "GEAR-A", "RUBY-2", "GEAR-B", "RUBY-3",
    "GEAR-C", "RUBY-4", "GEAR-D", "RUBY-5", "GEAR-E",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    /// Number of slots, and length of the reference key.
    pub key_length:       usize,
    /// Distractor objects added on top of the key symbols.
    pub distractor_count: usize,
    /// Symbols the key and distractors are drawn from.
    pub symbol_pool:      Vec<String>,
    /// Area objects start in and return to.
    pub staging_box:      Rect,
    /// Half-extent of every object.
    pub object_size:      f32,
    /// Centre of slot 0.
    pub slot_origin:      Point,
    /// Horizontal distance between slot centres.
    pub slot_spacing:     f32,
    pub time_limit_secs:  u64,
    /// Fixed RNG seed for reproducible layouts.
    pub seed:             Option<u64>,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        PuzzleConfig {
            key_length:       5,
            distractor_count: 5,
            symbol_pool:      DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            staging_box:      Rect::new(100.0, 100.0, 400.0, 300.0),
            object_size:      40.0,
            slot_origin:      (300.0, 500.0),
            slot_spacing:     100.0,
            time_limit_secs:  60,
            seed:             None,
        }
    }
}

impl PuzzleConfig {
    /// Reject values that make a puzzle unplayable.  Pool size is checked
    /// separately at construction.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        if self.key_length == 0 {
            return Err(PuzzleError::InvalidConfig("key_length must be at least 1".into()));
        }
        if self.object_size <= 0.0 {
            return Err(PuzzleError::InvalidConfig("object_size must be positive".into()));
        }
        if self.staging_box.w < self.object_size * 2.0 || self.staging_box.h < self.object_size * 2.0 {
            return Err(PuzzleError::InvalidConfig(format!(
                "staging box {}x{} cannot hold an object of half-extent {}",
                self.staging_box.w, self.staging_box.h, self.object_size
            )));
        }
        if self.time_limit_secs == 0 {
            return Err(PuzzleError::InvalidConfig("time_limit_secs must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(PuzzleConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_key_rejected() {
        let cfg = PuzzleConfig { key_length: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(PuzzleError::InvalidConfig(_))));
    }

    #[test]
    fn staging_box_too_small_rejected() {
        let cfg = PuzzleConfig { staging_box: Rect::new(0.0, 0.0, 50.0, 300.0), ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains((10.0, 30.0)));
        assert!(!r.contains((31.0, 20.0)));
    }
}
