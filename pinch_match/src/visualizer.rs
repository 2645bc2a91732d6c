//! Software-rendered game view using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌────────────┬──────────────┬─────────────────────────┬───────────────┐
//! │ HUD        │              │  TIMER                  │ REFERENCE KEY │
//! ├────────────┘              └─────────────────────────┘ 1. ...        │
//! │   ┌───────────────┐                                   2. ...        │
//! │   │ staging box   │                                                 │
//! │   │  (tokens)     │                                                 │
//! │   └───────────────┘                                                 │
//! │                 [1]  [2]  [3]  [4]  [5]   ← slots                   │
//! │ controls / status                                                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The renderer only reads a [`Snapshot`]; it never touches game state.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use hand_gesture::GestureState;
use match_puzzle::Outcome;

use crate::app::{Command, Snapshot};
use crate::config::WindowConfig;
use crate::error::AppError;
use crate::input::{InputMode, PointerState};

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:     u32 = 0xFF1A1A2E;
const PANEL_BG:     u32 = 0xFF0F3460;
const BOX_COLOR:    u32 = 0xFFC8C8C8;
const RUBY_COLOR:   u32 = 0xFFE74C3C;
const GEAR_COLOR:   u32 = 0xFF3498DB;
const OUTLINE:      u32 = 0xFFFFFFFF;
const HELD_RING:    u32 = 0xFFFFFF00;
const SLOT_EMPTY:   u32 = 0xFF646464;
const SLOT_FILLED:  u32 = 0xFF00FF00;
const OPEN_COLOR:   u32 = 0xFF00C800;
const PINCH_COLOR:  u32 = 0xFFFF0000;
const NONE_COLOR:   u32 = 0xFFFFA500;
const TIMER_COLOR:  u32 = 0xFFFFFF00;
const TEXT_COLOR:   u32 = 0xFFEEEEEE;
const DIM_TEXT:     u32 = 0xFFC8C8C8;
const WIN_COLOR:    u32 = 0xFF00FF00;
const LOSE_COLOR:   u32 = 0xFFFF0000;

/// Glyph cell width in font units (3 wide + 1 gap).
const CELL: i32 = 4;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    width:  usize,
    height: usize,
}

impl Visualizer {
    pub fn new(cfg: &WindowConfig) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Pinch Match: Symbol Matching Challenge",
            cfg.width, cfg.height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        let frame_us = 1_000_000 / u64::from(cfg.fps.max(1));
        window.limit_update_rate(Some(std::time::Duration::from_micros(frame_us)));

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; cfg.width * cfg.height],
            width: cfg.width,
            height: cfg.height,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Keys pressed since the last tick, as commands.
    pub fn poll_commands(&mut self) -> Vec<Command> {
        let bindings = [
            (Key::Escape, Command::Quit),
            (Key::M,      Command::ToggleMode),
            (Key::D,      Command::ToggleVerbose),
            (Key::H,      Command::ToggleHandOverlay),
            (Key::R,      Command::Restart),
        ];
        bindings
            .iter()
            .filter(|(k, _)| self.window.is_key_pressed(*k, KeyRepeat::No))
            .map(|&(_, cmd)| cmd)
            .collect()
    }

    pub fn pointer(&self) -> PointerState {
        PointerState {
            position: self.window.get_mouse_pos(MouseMode::Discard),
            pressed:  self.window.get_mouse_down(MouseButton::Left),
        }
    }

    /// Render one frame.
    pub fn render(&mut self, snap: &Snapshot<'_>) {
        self.buf.fill(BG_COLOR);

        self.draw_board(snap);
        if snap.show_hand || snap.mode == InputMode::Pointer {
            self.draw_hand(snap);
        }
        self.draw_hud(snap);
        self.draw_timer(snap.remaining_secs);
        self.draw_reference(snap);
        self.draw_controls(snap);
        self.draw_game_over(snap.puzzle.outcome());

        self.window.update_with_buffer(&self.buf, self.width, self.height).ok();
    }

    // ── Board ─────────────────────────────────────────────────────────────

    fn draw_board(&mut self, snap: &Snapshot<'_>) {
        let puzzle = snap.puzzle;
        let b = puzzle.config().staging_box;
        self.draw_border(b.x as i32, b.y as i32, b.w as i32, b.h as i32, BOX_COLOR);

        for slot in puzzle.slots() {
            let (x, y) = slot.position();
            let half = puzzle.config().object_size as i32;
            let color = if slot.is_occupied() { SLOT_FILLED } else { SLOT_EMPTY };
            self.draw_border(x as i32 - half, y as i32 - half, half * 2, half * 2, color);
            self.draw_border(x as i32 - half + 1, y as i32 - half + 1, half * 2 - 2, half * 2 - 2, color);
            self.draw_text(&(slot.index() + 1).to_string(), x as i32 - 3, y as i32 - half - 14, 2, SLOT_EMPTY);
        }

        for id in puzzle.object_ids() {
            let Some(obj) = puzzle.object(id) else { continue };
            let (x, y) = (obj.position().0 as i32, obj.position().1 as i32);
            let size = obj.size() as i32;

            if snap.held == Some(id) {
                self.draw_ring(x, y, size + 5, 3, HELD_RING);
            }
            if obj.symbol().starts_with("RUBY") {
                self.fill_circle(x, y, size, RUBY_COLOR);
                self.draw_ring(x, y, size, 2, OUTLINE);
            } else {
                self.fill_rect(x - size, y - size, size * 2, size * 2, GEAR_COLOR);
                self.draw_border(x - size, y - size, size * 2, size * 2, OUTLINE);
            }
            let w = text_width(obj.symbol(), 1);
            self.draw_text(obj.symbol(), x - w / 2, y - 2, 1, OUTLINE);
        }
    }

    // ── Hand overlay ──────────────────────────────────────────────────────

    fn draw_hand(&mut self, snap: &Snapshot<'_>) {
        let obs = &snap.sample.observation;

        if snap.mode == InputMode::Pointer {
            if let Some((x, y)) = snap.sample.point {
                self.draw_ring(x as i32, y as i32, 20, 2, HELD_RING);
            }
            self.draw_text("MOUSE MODE", 10, 90, 2, HELD_RING);
            return;
        }

        let Some(b) = obs.bbox else {
            self.draw_text("SHOW YOUR HAND TO THE CAMERA", 10, 90, 2, PINCH_COLOR);
            return;
        };
        let (color, thickness) = match obs.state {
            GestureState::Open  => (OPEN_COLOR, 3),
            GestureState::Pinch => (PINCH_COLOR, ((b.w.min(b.h) / 20.0) as i32).max(1)),
            GestureState::None  => (NONE_COLOR, 2),
        };
        for t in 0..thickness {
            self.draw_border(b.x as i32 + t, b.y as i32 + t, b.w as i32 - 2 * t, b.h as i32 - 2 * t, color);
        }

        let mut line = format!("STATE: {}", obs.state.label());
        if snap.verbose {
            if let Some(m) = snap.sample.metrics {
                line.push_str(&format!("  THUMB-INDEX: {:.2}  SPREAD: {:.2}", m.thumb_index, m.avg_tip_to_wrist));
            }
            if let Some(points) = &snap.sample.keypoints {
                for &(x, y) in points {
                    self.fill_circle(x as i32, y as i32, 3, OUTLINE);
                }
            }
        }
        self.draw_text(&line, 10, 90, 2, TEXT_COLOR);
    }

    // ── Panels ────────────────────────────────────────────────────────────

    fn draw_hud(&mut self, snap: &Snapshot<'_>) {
        if !snap.camera_available {
            return;
        }
        self.fill_rect(10, 10, 200, 70, PANEL_BG);
        self.draw_text(&format!("MODE: {}", snap.mode.label()), 20, 22, 2, TEXT_COLOR);
        let debug = if snap.verbose { "ON" } else { "OFF" };
        self.draw_text(&format!("DEBUG: {}", debug), 20, 50, 2, TEXT_COLOR);
    }

    fn draw_timer(&mut self, remaining: u64) {
        let x = self.width as i32 / 2 - 80;
        self.fill_rect(x, 10, 160, 40, PANEL_BG);
        let text = format!("{}S", remaining);
        let w = text_width(&text, 4);
        self.draw_text(&text, x + 80 - w / 2, 20, 4, TIMER_COLOR);
    }

    fn draw_reference(&mut self, snap: &Snapshot<'_>) {
        let key = snap.puzzle.reference_key();
        let (w, h) = (220, 36 + 25 * key.len() as i32);
        let x = self.width as i32 - w - 10;
        self.fill_rect(x, 10, w, h, PANEL_BG);
        self.draw_text("REFERENCE KEY:", x + 10, 18, 2, OUTLINE);
        for (i, symbol) in key.iter().enumerate() {
            let y = 44 + 25 * i as i32;
            self.draw_text(&format!("{}. {}", i + 1, symbol), x + 10, y, 2, DIM_TEXT);
        }
    }

    fn draw_controls(&mut self, snap: &Snapshot<'_>) {
        let y = self.height as i32 - 90;
        self.fill_rect(10, y, 450, 80, PANEL_BG);
        self.draw_text("M: MODE | D: DEBUG | H: HAND | R: RESTART | ESC: QUIT", 20, y + 10, 1, DIM_TEXT);
        if snap.mode == InputMode::Camera {
            self.draw_text("PINCH: GRAB | RELEASE: DROP", 20, y + 30, 1, DIM_TEXT);
        }
        self.draw_text(snap.status, 20, y + 55, 2, TEXT_COLOR);
    }

    fn draw_game_over(&mut self, outcome: Outcome) {
        let (text, color) = match outcome {
            Outcome::Playing  => return,
            Outcome::Won      => ("YOU WIN!", WIN_COLOR),
            Outcome::TimedOut => ("GAME OVER", LOSE_COLOR),
        };
        for px in self.buf.iter_mut() {
            *px = blend(*px, 0xFF000000, 0.7);
        }
        let (cx, cy) = (self.width as i32 / 2, self.height as i32 / 2);
        self.draw_text(text, cx - text_width(text, 8) / 2, cy - 60, 8, color);
        let sub = "PRESS R TO RESTART";
        self.draw_text(sub, cx - text_width(sub, 3) / 2, cy + 20, 3, OUTLINE);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        for row in y.max(0)..(y + h).min(self.height as i32) {
            for col in x.max(0)..(x + w).min(self.width as i32) {
                self.buf[row as usize * self.width + col as usize] = color;
            }
        }
    }

    fn draw_border(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        if w <= 0 || h <= 0 { return; }
        for col in x..x + w {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..y + h {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn draw_ring(&mut self, cx: i32, cy: i32, r: i32, thickness: i32, color: u32) {
        let inner = (r - thickness).max(0);
        for dy in -r..=r {
            for dx in -r..=r {
                let d2 = dx * dx + dy * dy;
                if d2 <= r * r && d2 > inner * inner {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// 3×5 bitmap text, each font pixel drawn as a `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: i32, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3 {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row as i32 * scale, scale, scale, color);
                    }
                }
            }
            cx += CELL * scale;
            if cx >= self.width as i32 { break; }
        }
    }
}

fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * CELL * scale
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let (ar, ag, ab) = ((a >> 16) & 0xFF, (a >> 8) & 0xFF, a & 0xFF);
    let (br, bg, bb) = ((b >> 16) & 0xFF, (b >> 8) & 0xFF, b & 0xFF);
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF102030, 0xFF000000, 0.0), 0xFF102030);
        assert_eq!(blend(0xFF102030, 0xFF000000, 1.0), 0xFF000000);
    }

    #[test]
    fn text_width_scales() {
        assert_eq!(text_width("ABC", 1), 12);
        assert_eq!(text_width("ABC", 2), 24);
    }

    #[test]
    fn letters_have_glyphs() {
        let dot = char_glyph('~');
        for c in ('A'..='Z').chain('0'..='9') {
            assert_ne!(char_glyph(c), dot, "missing glyph for {}", c);
        }
    }
}
