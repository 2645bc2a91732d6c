//! Landmark feed from an external hand-detector process.
//!
//! The camera and the landmark model live outside this crate.  A detector
//! process writes one JSON object per frame to stdout:
//!
//! ```json
//! {"hands":[{"landmarks":[{"x":0.51,"y":0.62}, …21 entries]}]}
//! ```
//!
//! Coordinates are normalised to `[0, 1]`.  An optional `"error"` string
//! reports a detector-side problem for that frame.  Only the first hand is
//! used.
//!
//! Lines are read on a background thread and delivered over an `mpsc`
//! channel as [`LandmarkFrame`]s, so the game loop can poll without
//! blocking.  The channel disconnects when the process exits.

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::Point;

// ════════════════════════════════════════════════════════════════════════════
// Config / errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Launch the detector at start-up.  When false the game runs in
    /// pointer mode only.
    pub enabled: bool,
    /// Program followed by its arguments.
    pub command: Vec<String>,
    /// Flip x so the feed behaves like a mirror.
    pub mirror:  bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            enabled: true,
            command: vec!["python3".into(), "scripts/hand_landmarks.py".into()],
            mirror:  true,
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("detector command is empty")]
    EmptyCommand,

    #[error("failed to start detector `{command}`: {source}")]
    Spawn { command: String, source: std::io::Error },

    #[error("detector stdout unavailable")]
    NoStdout,

    #[error("malformed detector line: {0}")]
    Parse(#[from] serde_json::Error),
}

// ════════════════════════════════════════════════════════════════════════════
// Wire format
// ════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// One detector frame in pixel space.  `keypoints` is `None` when no hand
/// was found.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkFrame {
    pub keypoints: Option<Vec<Point>>,
}

/// Decode one line of detector output into pixel coordinates.
pub fn parse_line(
    line:    &str,
    frame_w: f32,
    frame_h: f32,
    mirror:  bool,
) -> Result<LandmarkFrame, DetectorError> {
    let det: DetectionJson = serde_json::from_str(line)?;
    if let Some(err) = det.error {
        warn!(%err, "detector reported an error");
    }
    let keypoints = det.hands.into_iter().next().map(|hand| {
        hand.landmarks
            .iter()
            .map(|lm| {
                let x = if mirror { 1.0 - lm.x } else { lm.x };
                (x * frame_w, lm.y * frame_h)
            })
            .collect()
    });
    Ok(LandmarkFrame { keypoints })
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource: anything that can feed frames into a channel
// ════════════════════════════════════════════════════════════════════════════

pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<LandmarkFrame>);
}

/// Run a source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<LandmarkFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

/// Reads detector JSON lines from any buffered reader.
pub struct LineSource<R> {
    pub reader:  R,
    pub frame_w: f32,
    pub frame_h: f32,
    pub mirror:  bool,
}

impl<R: BufRead + Send + 'static> LandmarkSource for LineSource<R> {
    fn run(self: Box<Self>, tx: Sender<LandmarkFrame>) {
        let LineSource { reader, frame_w, frame_h, mirror } = *self;
        for line in reader.lines() {
            let line = match line {
                Ok(l)  => l,
                Err(e) => { warn!(error = %e, "detector read failed"); break; }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line, frame_w, frame_h, mirror) {
                Ok(frame) => {
                    if tx.send(frame).is_err() { return; }
                }
                Err(e) => warn!(error = %e, "skipping detector line"),
            }
        }
        debug!("detector stream ended");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectorProcess
// ════════════════════════════════════════════════════════════════════════════

/// A running detector child process.  Killed on drop.
pub struct DetectorProcess {
    child: Child,
}

impl DetectorProcess {
    /// Start the configured command and attach a reader thread to its
    /// stdout.
    pub fn spawn(
        config:  &DetectorConfig,
        frame_w: f32,
        frame_h: f32,
    ) -> Result<(Self, Receiver<LandmarkFrame>), DetectorError> {
        let (program, args) = config.command.split_first().ok_or(DetectorError::EmptyCommand)?;
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| DetectorError::Spawn { command: config.command.join(" "), source })?;
        let stdout = child.stdout.take().ok_or(DetectorError::NoStdout)?;

        info!(command = %config.command.join(" "), pid = child.id(), "hand detector started");
        let rx = spawn_landmark_source(LineSource {
            reader: BufReader::new(stdout),
            frame_w,
            frame_h,
            mirror: config.mirror,
        });
        Ok((DetectorProcess { child }, rx))
    }
}

impl Drop for DetectorProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        debug!("hand detector stopped");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
