//! # pinch_match
//!
//! A symbol-matching puzzle played with a pinch gesture in front of a
//! webcam, or with the mouse when no camera is available.
//!
//! A hidden *reference key* of N symbols is shown in the top-right panel.
//! Tokens (the key's symbols plus distractors) start scattered inside the
//! staging box. Pinch over a token to pick it up, carry it to one of the N
//! slots on the baseline and release to drop it. Filling every slot with the
//! key's symbols in order wins; the countdown running out loses.
//!
//! ## Input
//!
//! * **Camera mode**: an external detector process (see [`detector`]) streams
//!   21 hand landmarks per frame as JSON lines; [`hand_gesture`] turns them
//!   into an open / pinch / none observation.
//! * **Mouse mode**: the cursor drives a synthetic hand; holding the left
//!   button is a pinch.
//!
//! ## Keys
//!
//! | Key | Action |
//! |---|---|
//! | `M` | Toggle camera / mouse mode (camera only) |
//! | `D` | Toggle landmark and metrics annotations (camera only) |
//! | `H` | Toggle the hand bounding box overlay (camera only) |
//! | `R` | Restart with a new layout (after the game ends) |
//! | `Escape` | Quit |

pub mod app;
pub mod config;
pub mod controller;
pub mod detector;
pub mod error;
pub mod input;
pub mod visualizer;

pub use hand_gesture::Point;
