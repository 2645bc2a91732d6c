//! The per-frame output of gesture classification.

use crate::Point;

// ════════════════════════════════════════════════════════════════════════════
// GestureState
// ════════════════════════════════════════════════════════════════════════════

/// Discrete hand signal for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureState {
    /// Fingers spread away from the wrist.
    Open,
    /// Thumb and index tip together: the "grab" signal.
    Pinch,
    /// No hand, or a hand that is neither confidently open nor pinching.
    None,
}

impl GestureState {
    pub fn label(self) -> &'static str {
        match self {
            GestureState::Open  => "OPEN",
            GestureState::Pinch => "PINCH",
            GestureState::None  => "NONE",
        }
    }

    pub fn is_pinch(self) -> bool { self == GestureState::Pinch }
}

// ════════════════════════════════════════════════════════════════════════════
// BoundingBox
// ════════════════════════════════════════════════════════════════════════════

/// Axis-aligned box in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox {
    /// Smallest box enclosing `points`, clamped to `[0, frame_w-1] × [0, frame_h-1]`.
    ///
    /// Returns `None` for an empty slice.
    pub fn enclosing(points: &[Point], frame_w: f32, frame_h: f32) -> Option<Self> {
        let first = points.first()?;
        let (mut x_min, mut y_min, mut x_max, mut y_max) = (first.0, first.1, first.0, first.1);
        for &(x, y) in &points[1..] {
            x_min = x_min.min(x);
            y_min = y_min.min(y);
            x_max = x_max.max(x);
            y_max = y_max.max(y);
        }
        let x_min = x_min.max(0.0);
        let y_min = y_min.max(0.0);
        let x_max = x_max.min(frame_w - 1.0);
        let y_max = y_max.min(frame_h - 1.0);
        Some(BoundingBox {
            x: x_min,
            y: y_min,
            w: (x_max - x_min).max(0.0),
            h: (y_max - y_min).max(0.0),
        })
    }

    /// Length of the diagonal.
    pub fn diagonal(&self) -> f32 { self.w.hypot(self.h) }
}

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// Everything downstream needs to know about the hand for one frame.
///
/// `bbox` is `None` exactly when `detected` is false, and `state` is
/// [`GestureState::None`] whenever `detected` is false.
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    pub detected:  bool,
    pub bbox:      Option<BoundingBox>,
    pub state:     GestureState,
    pub index_tip: Option<Point>,
    pub thumb_tip: Option<Point>,
}

impl HandObservation {
    /// The neutral observation for a frame without a hand.
    pub fn absent() -> Self {
        HandObservation {
            detected:  false,
            bbox:      None,
            state:     GestureState::None,
            index_tip: None,
            thumb_tip: None,
        }
    }
}

impl Default for HandObservation {
    fn default() -> Self { Self::absent() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_is_neutral() {
        let obs = HandObservation::absent();
        assert!(!obs.detected);
        assert!(obs.bbox.is_none());
        assert_eq!(obs.state, GestureState::None);
    }

    #[test]
    fn enclosing_box_is_clamped() {
        let b = BoundingBox::enclosing(&[(-20.0, 10.0), (50.0, 900.0)], 640.0, 480.0).unwrap();
        assert_eq!(b.x, 0.0);
        assert_eq!(b.y, 10.0);
        assert_eq!(b.w, 50.0);
        assert_eq!(b.h, 469.0);
    }

    #[test]
    fn enclosing_box_empty() {
        assert!(BoundingBox::enclosing(&[], 640.0, 480.0).is_none());
    }

    #[test]
    fn box_outside_frame_collapses() {
        let b = BoundingBox::enclosing(&[(700.0, 10.0), (800.0, 20.0)], 640.0, 480.0).unwrap();
        assert_eq!(b.w, 0.0);
    }
}
