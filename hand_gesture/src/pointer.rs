//! Mouse-driven stand-in for the hand tracker.
//!
//! The cursor becomes both fingertips (thumb to the left, index to the
//! right by `tip_offset`), and the button maps straight to
//! [`GestureState::Pinch`] / [`GestureState::Open`].  While the cursor is
//! inside the window the emulator always reports a detected hand.

use serde::{Deserialize, Serialize};

use crate::observation::{BoundingBox, GestureState, HandObservation};
use crate::Point;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerEmulator {
    /// Horizontal distance from the cursor to each emulated fingertip.
    pub tip_offset: f32,
    /// Half the side of the square box reported around the cursor.
    pub box_half:   f32,
}

impl Default for PointerEmulator {
    fn default() -> Self {
        PointerEmulator { tip_offset: 15.0, box_half: 40.0 }
    }
}

impl PointerEmulator {
    /// Observation for a cursor at `position` (None when outside the window).
    pub fn observe(&self, position: Option<Point>, pressed: bool) -> HandObservation {
        let Some((x, y)) = position else {
            return HandObservation::absent();
        };
        HandObservation {
            detected:  true,
            bbox:      Some(BoundingBox {
                x: x - self.box_half,
                y: y - self.box_half,
                w: self.box_half * 2.0,
                h: self.box_half * 2.0,
            }),
            state:     if pressed { GestureState::Pinch } else { GestureState::Open },
            index_tip: Some((x + self.tip_offset, y)),
            thumb_tip: Some((x - self.tip_offset, y)),
        }
    }
}
