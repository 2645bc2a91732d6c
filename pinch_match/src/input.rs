//! Where each tick's [`HandObservation`] comes from.
//!
//! Two interchangeable [`HandSource`]s: [`CameraSource`] classifies the
//! latest detector frame, [`PointerSource`] emulates a hand from the mouse.
//! The tick driver only ever asks the active one for a [`Sample`].

use std::sync::mpsc::{Receiver, TryRecvError};

use hand_gesture::{GestureClassifier, HandMetrics, HandObservation, PointerEmulator};
use tracing::warn;

use crate::detector::{DetectorProcess, LandmarkFrame};
use crate::Point;

// ════════════════════════════════════════════════════════════════════════════
// InputMode / PointerState / Sample
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode { Camera, Pointer }

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            InputMode::Camera  => "CAMERA",
            InputMode::Pointer => "MOUSE",
        }
    }
}

/// Mouse state read from the window this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    /// `None` while the cursor is outside the window.
    pub position: Option<Point>,
    pub pressed:  bool,
}

/// One tick of input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sample {
    pub observation: HandObservation,
    /// Where the interaction happens: index tip or cursor.
    pub point:       Option<Point>,
    /// Raw keypoints, for verbose annotation.
    pub keypoints:   Option<Vec<Point>>,
    pub metrics:     Option<HandMetrics>,
}

// ════════════════════════════════════════════════════════════════════════════
// HandSource
// ════════════════════════════════════════════════════════════════════════════

/// Produces a [`Sample`] for the current tick without blocking.
pub trait HandSource {
    fn mode(&self) -> InputMode;
    fn sample(&mut self, pointer: &PointerState) -> Sample;
}

// ── pointer ───────────────────────────────────────────────────────────────

pub struct PointerSource {
    emulator: PointerEmulator,
}

impl PointerSource {
    pub fn new(emulator: PointerEmulator) -> Self { PointerSource { emulator } }
}

impl HandSource for PointerSource {
    fn mode(&self) -> InputMode { InputMode::Pointer }

    fn sample(&mut self, pointer: &PointerState) -> Sample {
        Sample {
            observation: self.emulator.observe(pointer.position, pointer.pressed),
            point:       pointer.position,
            keypoints:   None,
            metrics:     None,
        }
    }
}

// ── camera ────────────────────────────────────────────────────────────────

/// Classifies the most recent detector frame.  Between detector frames the
/// last one is reused.
pub struct CameraSource {
    frames:     Receiver<LandmarkFrame>,
    latest:     Option<Vec<Point>>,
    classifier: GestureClassifier,
    connected:  bool,
    _process:   Option<DetectorProcess>,
}

impl CameraSource {
    pub fn new(frames: Receiver<LandmarkFrame>, classifier: GestureClassifier) -> Self {
        CameraSource { frames, latest: None, classifier, connected: true, _process: None }
    }

    /// Keep `process` alive (and kill it) together with this source.
    pub fn with_process(mut self, process: DetectorProcess) -> Self {
        self._process = Some(process);
        self
    }

    /// Drain pending frames.  Returns false once the detector has gone away.
    pub fn pump(&mut self) -> bool {
        while self.connected {
            match self.frames.try_recv() {
                Ok(frame)                       => self.latest = frame.keypoints,
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("landmark feed disconnected");
                    self.connected = false;
                    self.latest = None;
                }
            }
        }
        self.connected
    }
}

impl HandSource for CameraSource {
    fn mode(&self) -> InputMode { InputMode::Camera }

    fn sample(&mut self, _pointer: &PointerState) -> Sample {
        self.pump();
        let keypoints = self.latest.as_deref();
        let observation = self.classifier.classify(keypoints);
        Sample {
            point:     observation.index_tip,
            metrics:   keypoints.and_then(|k| self.classifier.measure(k)),
            keypoints: self.latest.clone(),
            observation,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{landmarks, GestureConfig, GestureState};
    use std::sync::mpsc;

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(GestureConfig::default(), 1100.0, 700.0)
    }

    fn pinching_hand() -> Vec<Point> {
        let mut pts = vec![(500.0, 500.0); landmarks::COUNT];
        pts[landmarks::MIDDLE_TIP] = (500.0, 250.0);
        pts[landmarks::PINKY_TIP]  = (650.0, 300.0);
        pts[landmarks::THUMB_TIP]  = (451.0, 301.0);
        pts[landmarks::INDEX_TIP]  = (450.0, 300.0);
        pts
    }

    #[test]
    fn pointer_point_is_cursor() {
        let mut src = PointerSource::new(PointerEmulator::default());
        let s = src.sample(&PointerState { position: Some((300.0, 200.0)), pressed: true });
        assert_eq!(s.point, Some((300.0, 200.0)));
        assert_eq!(s.observation.state, GestureState::Pinch);
        assert_eq!(src.mode(), InputMode::Pointer);
    }

    #[test]
    fn camera_point_is_index_tip() {
        let (tx, rx) = mpsc::channel();
        let mut src = CameraSource::new(rx, classifier());
        tx.send(LandmarkFrame { keypoints: Some(pinching_hand()) }).unwrap();
        let s = src.sample(&PointerState::default());
        assert_eq!(s.point, Some((450.0, 300.0)));
        assert_eq!(s.observation.state, GestureState::Pinch);
        assert!(s.metrics.is_some());
    }

    #[test]
    fn camera_keeps_latest_frame_between_updates() {
        let (tx, rx) = mpsc::channel();
        let mut src = CameraSource::new(rx, classifier());
        tx.send(LandmarkFrame { keypoints: None }).unwrap();
        tx.send(LandmarkFrame { keypoints: Some(pinching_hand()) }).unwrap();
        assert!(src.sample(&PointerState::default()).observation.detected);
        assert!(src.sample(&PointerState::default()).observation.detected);
        tx.send(LandmarkFrame { keypoints: None }).unwrap();
        assert!(!src.sample(&PointerState::default()).observation.detected);
    }

    #[test]
    fn camera_reports_disconnect() {
        let (tx, rx) = mpsc::channel();
        let mut src = CameraSource::new(rx, classifier());
        assert!(src.pump());
        drop(tx);
        assert!(!src.pump());
        assert!(!src.sample(&PointerState::default()).observation.detected);
    }
}
