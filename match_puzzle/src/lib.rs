//! # match_puzzle
//!
//! The board behind the matching game.  A [`PuzzleState`] owns:
//!
//! * a hidden **reference key** of `key_length` distinct symbols,
//! * one [`DraggableObject`] per key symbol plus distractors, scattered in
//!   the **staging box**,
//! * `key_length` ordered [`Slot`]s on a horizontal baseline,
//! * a countdown that ends the game when it reaches zero.
//!
//! Filling every slot so that slot *i* holds `reference_key[i]` wins.  The
//! win is evaluated inside [`PuzzleState::place`], so the last placement
//! counts even if the timer would expire on the same frame.
//!
//! Time is never read from a global clock: every time-dependent call takes
//! an explicit `now: Instant`.
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use match_puzzle::{PuzzleConfig, PuzzleState, Outcome};
//!
//! let start = Instant::now();
//! let mut puzzle = PuzzleState::new(PuzzleConfig { seed: Some(7), ..Default::default() }, start)?;
//! assert_eq!(puzzle.slots().len(), 5);
//! puzzle.update(start + Duration::from_secs(61));
//! assert_eq!(puzzle.outcome(), Outcome::TimedOut);
//! # Ok::<(), match_puzzle::PuzzleError>(())
//! ```

pub mod config;
pub mod error;
pub mod puzzle;

pub use config::{PuzzleConfig, Rect};
pub use error::PuzzleError;
pub use puzzle::{DraggableObject, ObjectId, Outcome, PuzzleState, Slot};

/// A pixel-space position `(x, y)`.
pub type Point = (f32, f32);

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}
