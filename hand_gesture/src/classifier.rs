//! Keypoints → [`HandObservation`].
//!
//! # Algorithm
//!
//! Given the 21 keypoints of one hand:
//!
//! 1. Bounding box over all keypoints, clamped to the frame.
//! 2. `diag = max(1, hypot(w, h))`.
//! 3. `thumb_index = |thumb_tip − index_tip| / diag`.
//! 4. `avg_tip_to_wrist = mean(|tip − wrist|) / diag` over the five fingertips.
//! 5. **Pinch** if `thumb_index < pinch_threshold` or `diag < small_box_px`;
//!    else **Open** if `avg_tip_to_wrist > openness_threshold`; else **None**.
//!
//! A tiny box is read as a pinch because fingertip separation is unreliable
//! when the hand covers only a few pixels.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::landmarks;
use crate::observation::{BoundingBox, GestureState, HandObservation};
use crate::{distance, Point};

// ════════════════════════════════════════════════════════════════════════════
// GestureConfig
// ════════════════════════════════════════════════════════════════════════════

/// Classification thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Normalised thumb–index distance below which the hand is pinching.
    pub pinch_threshold:    f32,
    /// Box diagonal (pixels) below which the hand is treated as pinching.
    pub small_box_px:       f32,
    /// Normalised mean fingertip–wrist distance above which the hand is open.
    pub openness_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            pinch_threshold:    0.18,
            small_box_px:       120.0,
            openness_threshold: 0.38,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandMetrics
// ════════════════════════════════════════════════════════════════════════════

/// Scale-normalised measurements of one hand, as used for classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandMetrics {
    pub bbox:             BoundingBox,
    pub diag:             f32,
    pub thumb_index:      f32,
    pub avg_tip_to_wrist: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

/// Pure per-frame classifier.  Holds only configuration; calling
/// [`classify`](Self::classify) twice on the same input gives the same output.
#[derive(Clone, Debug)]
pub struct GestureClassifier {
    config:  GestureConfig,
    frame_w: f32,
    frame_h: f32,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig, frame_w: f32, frame_h: f32) -> Self {
        GestureClassifier { config, frame_w, frame_h }
    }

    pub fn config(&self) -> &GestureConfig { &self.config }

    /// Measure a hand.  Returns `None` when fewer than 21 keypoints are given.
    pub fn measure(&self, keypoints: &[Point]) -> Option<HandMetrics> {
        if keypoints.len() < landmarks::COUNT {
            return None;
        }
        let bbox = BoundingBox::enclosing(keypoints, self.frame_w, self.frame_h)?;
        let diag = bbox.diagonal().max(1.0);

        let thumb = keypoints[landmarks::THUMB_TIP];
        let index = keypoints[landmarks::INDEX_TIP];
        let wrist = keypoints[landmarks::WRIST];

        let thumb_index = distance(thumb, index) / diag;
        let tip_sum: f32 = landmarks::FINGERTIPS
            .iter()
            .map(|&i| distance(keypoints[i], wrist))
            .sum();
        let avg_tip_to_wrist = tip_sum / landmarks::FINGERTIPS.len() as f32 / diag;

        Some(HandMetrics { bbox, diag, thumb_index, avg_tip_to_wrist })
    }

    /// Map measurements to a gesture, pinch taking priority over open.
    pub fn state_for(&self, m: &HandMetrics) -> GestureState {
        let pinch_by_dist = m.thumb_index < self.config.pinch_threshold;
        let small_box     = m.diag < self.config.small_box_px;
        if pinch_by_dist || small_box {
            GestureState::Pinch
        } else if m.avg_tip_to_wrist > self.config.openness_threshold {
            GestureState::Open
        } else {
            GestureState::None
        }
    }

    /// Classify one frame.  `None` means the detector found no hand.
    pub fn classify(&self, keypoints: Option<&[Point]>) -> HandObservation {
        let Some(points) = keypoints else {
            return HandObservation::absent();
        };
        let Some(metrics) = self.measure(points) else {
            warn!(got = points.len(), expected = landmarks::COUNT, "short landmark list");
            return HandObservation::absent();
        };

        HandObservation {
            detected:  true,
            bbox:      Some(metrics.bbox),
            state:     self.state_for(&metrics),
            index_tip: Some(points[landmarks::INDEX_TIP]),
            thumb_tip: Some(points[landmarks::THUMB_TIP]),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const W: f32 = 1100.0;
    const H: f32 = 700.0;

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(GestureConfig::default(), W, H)
    }

    /// A large hand with the wrist at the bottom and fingertips fanned out
    /// above it.  `thumb` and `index` override those two tips.
    fn hand(thumb: Point, index: Point) -> Vec<Point> {
        let mut pts = vec![(500.0, 500.0); landmarks::COUNT];
        pts[landmarks::WRIST]      = (500.0, 500.0);
        pts[landmarks::THUMB_TIP]  = thumb;
        pts[landmarks::INDEX_TIP]  = index;
        pts[landmarks::MIDDLE_TIP] = (500.0, 250.0);
        pts[landmarks::RING_TIP]   = (550.0, 260.0);
        pts[landmarks::PINKY_TIP]  = (600.0, 300.0);
        pts
    }

    fn open_hand() -> Vec<Point> { hand((380.0, 380.0), (450.0, 260.0)) }

    #[test]
    fn no_hand_is_neutral() {
        let obs = classifier().classify(None);
        assert_eq!(obs, HandObservation::absent());
    }

    #[test]
    fn short_list_is_treated_as_no_hand() {
        let pts = vec![(10.0, 10.0); 5];
        let obs = classifier().classify(Some(&pts));
        assert!(!obs.detected);
        assert!(obs.bbox.is_none());
    }

    #[test]
    fn spread_hand_is_open() {
        let pts = open_hand();
        let obs = classifier().classify(Some(&pts));
        assert!(obs.detected);
        assert_eq!(obs.state, GestureState::Open);
        assert_eq!(obs.index_tip, Some((450.0, 260.0)));
        assert_eq!(obs.thumb_tip, Some((380.0, 380.0)));
    }

    #[test]
    fn touching_tips_pinch() {
        let pts = hand((452.0, 262.0), (450.0, 260.0));
        let obs = classifier().classify(Some(&pts));
        assert_eq!(obs.state, GestureState::Pinch);
    }

    #[test]
    fn tiny_box_is_pinch() {
        // Every keypoint within a 50 px square: diag < 120.
        let pts: Vec<Point> = (0..landmarks::COUNT)
            .map(|i| (300.0 + (i % 5) as f32 * 10.0, 300.0 + (i / 5) as f32 * 10.0))
            .collect();
        let m = classifier().measure(&pts).unwrap();
        assert!(m.diag < 120.0);
        assert!(m.thumb_index > 0.18);
        assert_eq!(classifier().classify(Some(&pts)).state, GestureState::Pinch);
    }

    #[test]
    fn curled_hand_is_none() {
        // Fingertips close to the wrist but thumb/index apart, with a wide
        // box from the knuckles.
        let mut pts = vec![(500.0, 500.0); landmarks::COUNT];
        pts[1] = (300.0, 300.0);
        pts[2] = (700.0, 700.0);
        pts[landmarks::THUMB_TIP]  = (440.0, 500.0);
        pts[landmarks::INDEX_TIP]  = (560.0, 500.0);
        pts[landmarks::MIDDLE_TIP] = (500.0, 460.0);
        pts[landmarks::RING_TIP]   = (500.0, 540.0);
        pts[landmarks::PINKY_TIP]  = (520.0, 520.0);
        let c = classifier();
        let m = c.measure(&pts).unwrap();
        assert!(m.thumb_index >= 0.18);
        assert!(m.avg_tip_to_wrist <= 0.38);
        assert_eq!(c.classify(Some(&pts)).state, GestureState::None);
    }

    #[test]
    fn zero_size_box_uses_unit_diag() {
        let pts = vec![(100.0, 100.0); landmarks::COUNT];
        let m = classifier().measure(&pts).unwrap();
        assert_eq!(m.diag, 1.0);
        assert_eq!(m.thumb_index, 0.0);
    }

    #[test]
    fn bbox_is_clamped_to_frame() {
        let mut pts = open_hand();
        pts[landmarks::PINKY_TIP] = (W + 200.0, 300.0);
        let obs = classifier().classify(Some(&pts));
        let b = obs.bbox.unwrap();
        assert!(b.x + b.w <= W - 1.0);
    }

    #[test]
    fn thresholds_follow_config() {
        let strict = GestureClassifier::new(
            GestureConfig { pinch_threshold: 0.001, small_box_px: 1.0, openness_threshold: 0.99 },
            W, H,
        );
        let pts = hand((452.0, 262.0), (450.0, 260.0));
        assert_eq!(strict.classify(Some(&pts)).state, GestureState::None);
    }

    fn keypoints() -> impl Strategy<Value = Vec<Point>> {
        prop::collection::vec((0.0f32..W, 0.0f32..H), landmarks::COUNT)
    }

    proptest! {
        #[test]
        fn classify_is_idempotent(pts in keypoints()) {
            let c = classifier();
            prop_assert_eq!(c.classify(Some(&pts)), c.classify(Some(&pts)));
        }

        #[test]
        fn detected_hand_has_box(pts in keypoints()) {
            let obs = classifier().classify(Some(&pts));
            prop_assert!(obs.detected);
            prop_assert!(obs.bbox.is_some());
        }

        #[test]
        fn pinch_dominates_openness(pts in keypoints()) {
            let c = classifier();
            let m = c.measure(&pts).unwrap();
            if m.thumb_index < 0.18 || m.diag < 120.0 {
                prop_assert_eq!(c.classify(Some(&pts)).state, GestureState::Pinch);
            } else {
                prop_assert_ne!(c.classify(Some(&pts)).state, GestureState::Pinch);
            }
        }
    }
}
