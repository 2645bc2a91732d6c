//! Top-level application state and the tick loop.
//!
//! `AppState` owns the `PuzzleState` and the `InteractionController`, and
//! holds the latest input `Sample`.  Each tick runs, in order:
//!
//! 1. control commands from the window,
//! 2. input sampling from the active source,
//! 3. the controller step (which may place and win),
//! 4. the timer,
//! 5. rendering of a read-only snapshot.

use std::time::Instant;

use hand_gesture::GestureClassifier;
use match_puzzle::{ObjectId, Outcome, PuzzleConfig, PuzzleState};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::controller::{InteractionController, InteractionEvent};
use crate::detector::DetectorProcess;
use crate::error::AppError;
use crate::input::{CameraSource, HandSource, InputMode, PointerSource, Sample};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// Command
// ════════════════════════════════════════════════════════════════════════════

/// Discrete controls, one key each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ToggleMode,
    ToggleVerbose,
    ToggleHandOverlay,
    Restart,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Snapshot: what the renderer sees
// ════════════════════════════════════════════════════════════════════════════

pub struct Snapshot<'a> {
    pub puzzle:           &'a PuzzleState,
    pub held:             Option<ObjectId>,
    pub sample:           &'a Sample,
    pub mode:             InputMode,
    pub camera_available: bool,
    pub verbose:          bool,
    pub show_hand:        bool,
    pub remaining_secs:   u64,
    pub status:           &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    config:     AppConfig,
    puzzle:     PuzzleState,
    controller: InteractionController,
    restarts:   u64,

    // ── input ─────────────────────────────────────────────────────────────
    mode:             InputMode,
    camera_available: bool,
    sample:           Sample,

    // ── overlays ──────────────────────────────────────────────────────────
    verbose:   bool,
    show_hand: bool,

    pub status: String,
}

impl AppState {
    pub fn new(config: AppConfig, camera_available: bool, now: Instant) -> Result<Self, AppError> {
        let puzzle = PuzzleState::new(config.puzzle.clone(), now)?;
        let mode = if camera_available { InputMode::Camera } else { InputMode::Pointer };
        let status = match mode {
            InputMode::Camera  => "Pinch a token to grab it, open your hand to drop it".to_string(),
            InputMode::Pointer => "Camera not available: using mouse mode".to_string(),
        };
        Ok(AppState {
            controller: InteractionController::new(config.interaction.clone()),
            verbose:    config.verbose,
            show_hand:  config.show_hand,
            puzzle,
            restarts: 0,
            mode,
            camera_available,
            sample: Sample::default(),
            status,
            config,
        })
    }

    // ── control surface ───────────────────────────────────────────────────

    /// Apply one command.  Returns false when the app should quit.
    pub fn handle_command(&mut self, cmd: Command, now: Instant) -> bool {
        match cmd {
            Command::Quit => return false,
            Command::ToggleMode => {
                if self.camera_available {
                    self.mode = match self.mode {
                        InputMode::Camera  => InputMode::Pointer,
                        InputMode::Pointer => InputMode::Camera,
                    };
                    info!(mode = self.mode.label(), "input mode switched");
                    self.status = format!("Mode: {}", self.mode.label());
                }
            }
            Command::ToggleVerbose => {
                if self.camera_available {
                    self.verbose = !self.verbose;
                }
            }
            Command::ToggleHandOverlay => {
                if self.camera_available {
                    self.show_hand = !self.show_hand;
                }
            }
            Command::Restart => {
                if self.puzzle.is_game_over() {
                    self.restart(now);
                }
            }
        }
        true
    }

    /// Replace the puzzle and controller with fresh ones.  On failure the
    /// finished puzzle stays and the error goes to the status line.
    pub fn restart(&mut self, now: Instant) {
        let mut cfg: PuzzleConfig = self.config.puzzle.clone();
        cfg.seed = cfg.seed.map(|s| s.wrapping_add(self.restarts + 1));
        match PuzzleState::new(cfg, now) {
            Ok(puzzle) => {
                self.puzzle = puzzle;
                self.controller = InteractionController::new(self.config.interaction.clone());
                self.restarts += 1;
                info!(restarts = self.restarts, "puzzle restarted");
                self.status = "New puzzle".to_string();
            }
            Err(e) => {
                warn!(error = %e, "restart failed");
                self.status = format!("Restart failed: {}", e);
            }
        }
    }

    /// The landmark feed is gone for good: fall back to the mouse.
    pub fn camera_lost(&mut self) {
        if self.camera_available {
            warn!("camera feed lost, falling back to mouse mode");
        }
        self.camera_available = false;
        self.mode = InputMode::Pointer;
        self.status = "Camera feed lost: using mouse mode".to_string();
    }

    // ── per-tick logic ────────────────────────────────────────────────────

    /// Interaction first, then the timer.
    pub fn apply(&mut self, sample: Sample, now: Instant) {
        let event = self.controller.step(&sample.observation, sample.point, &mut self.puzzle);
        if let Some(ev) = event {
            self.status = self.describe(ev);
        }

        let was_over = self.puzzle.is_game_over();
        self.puzzle.update(now);
        match self.puzzle.outcome() {
            Outcome::Won if matches!(event, Some(InteractionEvent::Placed { .. })) => {
                self.status = "You win! Press R to restart".to_string();
            }
            Outcome::TimedOut if !was_over => {
                self.status = "Time is up! Press R to restart".to_string();
            }
            _ => {}
        }
        self.sample = sample;
    }

    fn describe(&self, ev: InteractionEvent) -> String {
        let symbol = |id: ObjectId| {
            self.puzzle.object(id).map(|o| o.symbol().to_string()).unwrap_or_default()
        };
        match ev {
            InteractionEvent::PickedUp { object, detached_from: Some(slot) } =>
                format!("Took {} out of slot {}", symbol(object), slot + 1),
            InteractionEvent::PickedUp { object, detached_from: None } =>
                format!("Holding {}", symbol(object)),
            InteractionEvent::Placed { object, slot } =>
                format!("Placed {} in slot {}", symbol(object), slot + 1),
            InteractionEvent::Returned { object } =>
                format!("{} returned to the box", symbol(object)),
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn puzzle(&self)     -> &PuzzleState          { &self.puzzle }
    pub fn controller(&self) -> &InteractionController { &self.controller }
    pub fn mode(&self)       -> InputMode             { self.mode }
    pub fn camera_available(&self) -> bool            { self.camera_available }
    pub fn verbose(&self)    -> bool                  { self.verbose }
    pub fn show_hand(&self)  -> bool                  { self.show_hand }

    pub fn snapshot(&self, now: Instant) -> Snapshot<'_> {
        Snapshot {
            puzzle:           &self.puzzle,
            held:             self.controller.held(),
            sample:           &self.sample,
            mode:             self.mode,
            camera_available: self.camera_available,
            verbose:          self.verbose,
            show_hand:        self.show_hand,
            remaining_secs:   self.puzzle.remaining_secs(now),
            status:           &self.status,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

fn open_camera(cfg: &AppConfig) -> Option<CameraSource> {
    if !cfg.detector.enabled {
        return None;
    }
    let (w, h) = (cfg.window.width as f32, cfg.window.height as f32);
    match DetectorProcess::spawn(&cfg.detector, w, h) {
        Ok((process, frames)) => {
            let classifier = GestureClassifier::new(cfg.gesture.clone(), w, h);
            Some(CameraSource::new(frames, classifier).with_process(process))
        }
        Err(e) => {
            warn!(error = %e, "could not open camera, switching to mouse mode");
            None
        }
    }
}

/// Run the game until the window closes or the player quits.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let mut camera  = open_camera(&cfg);
    let mut pointer = PointerSource::new(cfg.pointer.clone());
    let mut vis     = Visualizer::new(&cfg.window)?;
    let mut app     = AppState::new(cfg, camera.is_some(), Instant::now())?;

    while vis.is_open() {
        let now = Instant::now();

        // 1. Controls
        for cmd in vis.poll_commands() {
            if !app.handle_command(cmd, now) {
                return Ok(());
            }
        }

        // 2. Input
        if let Some(cam) = camera.as_mut() {
            if !cam.pump() {
                camera = None;
                app.camera_lost();
            }
        }
        let pointer_state = vis.pointer();
        let source: &mut dyn HandSource = match (app.mode(), camera.as_mut()) {
            (InputMode::Camera, Some(cam)) => cam,
            _                              => &mut pointer,
        };
        let sample = source.sample(&pointer_state);

        // 3 + 4. Interaction, then timer
        app.apply(sample, now);

        // 5. Render
        vis.render(&app.snapshot(now));
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
