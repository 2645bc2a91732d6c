//! # hand_gesture
//!
//! Turns one frame of hand keypoints into a discrete gesture signal.
//!
//! The landmark model is a black box: it yields either an ordered list of
//! 21 pixel-space keypoints (the canonical MediaPipe layout, see
//! [`landmarks`]) or nothing.  [`GestureClassifier`] reduces that list to a
//! [`HandObservation`]:
//!
//! | Field | Meaning |
//! |---|---|
//! | `detected` | a hand was present this frame |
//! | `bbox` | box around every keypoint, clamped to the frame |
//! | `state` | [`GestureState::Pinch`], [`GestureState::Open`] or [`GestureState::None`] |
//! | `index_tip`, `thumb_tip` | reference points for interaction |
//!
//! All thresholds are normalised by the hand's own bounding-box diagonal so
//! they hold at any distance from the camera.
//!
//! [`PointerEmulator`] produces the same observation from a mouse cursor and
//! a button, for play without a camera.
//!
//! ## Quick start
//!
//! ```rust
//! use hand_gesture::{GestureClassifier, GestureConfig, GestureState};
//!
//! let classifier = GestureClassifier::new(GestureConfig::default(), 1100.0, 700.0);
//! let obs = classifier.classify(None);
//! assert!(!obs.detected);
//! assert_eq!(obs.state, GestureState::None);
//! ```

pub mod landmarks;
pub mod observation;
pub mod classifier;
pub mod pointer;

pub use classifier::{GestureClassifier, GestureConfig, HandMetrics};
pub use observation::{BoundingBox, GestureState, HandObservation};
pub use pointer::PointerEmulator;

/// A pixel-space position `(x, y)`.
pub type Point = (f32, f32);

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}
