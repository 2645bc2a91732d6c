//! Objects, slots, the reference key and the countdown.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::PuzzleConfig;
use crate::error::PuzzleError;
use crate::{distance, Point};

// ════════════════════════════════════════════════════════════════════════════
// ObjectId
// ════════════════════════════════════════════════════════════════════════════

/// Stable handle to an object.  Objects are never added or removed after
/// construction, so a handle stays valid for the life of its puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn index(self) -> usize { self.0 }
}

// ════════════════════════════════════════════════════════════════════════════
// DraggableObject
// ════════════════════════════════════════════════════════════════════════════

/// A token the player can pick up.  Symbols need not be unique.
#[derive(Clone, Debug, PartialEq)]
pub struct DraggableObject {
    symbol:   String,
    position: Point,
    size:     f32,
    slot:     Option<usize>,
}

impl DraggableObject {
    pub fn symbol(&self)   -> &str          { &self.symbol }
    /// Centre point.
    pub fn position(&self) -> Point         { self.position }
    /// Half-extent, used for hit-testing and drawing.
    pub fn size(&self)     -> f32           { self.size }
    /// Index of the slot holding this object, if any.
    pub fn slot(&self)     -> Option<usize> { self.slot }
}

// ════════════════════════════════════════════════════════════════════════════
// Slot
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    index:    usize,
    position: Point,
    occupant: Option<(ObjectId, String)>,
}

impl Slot {
    pub fn index(&self)    -> usize { self.index }
    pub fn position(&self) -> Point { self.position }
    pub fn occupant(&self) -> Option<ObjectId> { self.occupant.as_ref().map(|(id, _)| *id) }
    pub fn occupant_symbol(&self) -> Option<&str> { self.occupant.as_ref().map(|(_, s)| s.as_str()) }
    pub fn is_occupied(&self) -> bool { self.occupant.is_some() }
}

// ════════════════════════════════════════════════════════════════════════════
// Outcome
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Playing,
    /// Every slot matched the key.
    Won,
    /// The countdown reached zero first.
    TimedOut,
}

// ════════════════════════════════════════════════════════════════════════════
// PuzzleState
// ════════════════════════════════════════════════════════════════════════════

/// The whole board.  Restarting means building a new one.
#[derive(Debug)]
pub struct PuzzleState {
    config:        PuzzleConfig,
    objects:       Vec<DraggableObject>,
    slots:         Vec<Slot>,
    reference_key: Vec<String>,
    start:         Instant,
    time_limit:    Duration,
    outcome:       Outcome,
    rng:           StdRng,
}

impl PuzzleState {
    /// Build a fresh puzzle whose clock starts at `start`.
    ///
    /// Fails with [`PuzzleError::InsufficientSymbols`] when the pool has
    /// fewer distinct symbols than `key_length`; a shorter key is never
    /// substituted.
    pub fn new(config: PuzzleConfig, start: Instant) -> Result<Self, PuzzleError> {
        config.validate()?;
        let k = config.key_length;

        let mut distinct: Vec<String> = Vec::with_capacity(config.symbol_pool.len());
        for s in &config.symbol_pool {
            if !distinct.contains(s) {
                distinct.push(s.clone());
            }
        }
        if distinct.len() < k {
            return Err(PuzzleError::InsufficientSymbols { needed: k, available: distinct.len() });
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_os_rng(),
        };

        // ── reference key ─────────────────────────────────────────────────
        let mut reference_key: Vec<String> =
            distinct.choose_multiple(&mut rng, k).cloned().collect();
        reference_key.shuffle(&mut rng);

        // ── distractors: disjoint from the key where the pool allows ─────
        let mut extras: Vec<String> = distinct
            .iter()
            .filter(|s| !reference_key.contains(s))
            .cloned()
            .collect();
        extras.shuffle(&mut rng);
        extras.truncate(config.distractor_count);
        while extras.len() < config.distractor_count {
            match config.symbol_pool.choose(&mut rng) {
                Some(s) => extras.push(s.clone()),
                None    => break,
            }
        }

        let mut symbols: Vec<String> = reference_key.iter().cloned().chain(extras).collect();
        symbols.shuffle(&mut rng);

        let slots = (0..k)
            .map(|i| Slot {
                index:    i,
                position: (config.slot_origin.0 + i as f32 * config.slot_spacing, config.slot_origin.1),
                occupant: None,
            })
            .collect();

        let mut puzzle = PuzzleState {
            time_limit: Duration::from_secs(config.time_limit_secs),
            objects: Vec::with_capacity(symbols.len()),
            slots,
            reference_key,
            start,
            outcome: Outcome::Playing,
            rng,
            config,
        };
        for symbol in symbols {
            let position = puzzle.staging_position();
            puzzle.objects.push(DraggableObject {
                symbol,
                position,
                size: puzzle.config.object_size,
                slot: None,
            });
        }

        info!(
            key_length = k,
            objects = puzzle.objects.len(),
            time_limit_secs = puzzle.config.time_limit_secs,
            "puzzle constructed"
        );
        Ok(puzzle)
    }

    // ── read-only views ───────────────────────────────────────────────────

    pub fn config(&self)        -> &PuzzleConfig          { &self.config }
    pub fn objects(&self)       -> &[DraggableObject]     { &self.objects }
    pub fn slots(&self)         -> &[Slot]                { &self.slots }
    pub fn reference_key(&self) -> &[String]              { &self.reference_key }
    pub fn outcome(&self)       -> Outcome                { self.outcome }
    pub fn is_won(&self)        -> bool                   { self.outcome == Outcome::Won }
    pub fn is_game_over(&self)  -> bool                   { self.outcome != Outcome::Playing }

    pub fn object(&self, id: ObjectId) -> Option<&DraggableObject> { self.objects.get(id.0) }

    /// Handles of every object, in drawing order.
    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> {
        (0..self.objects.len()).map(ObjectId)
    }

    // ── geometry queries ──────────────────────────────────────────────────

    /// The object nearest `point` whose centre lies strictly within its own
    /// half-extent.  On a tie the later object (drawn on top) wins.
    pub fn hit_test(&self, point: Point) -> Option<ObjectId> {
        let mut best: Option<(ObjectId, f32)> = None;
        for (i, obj) in self.objects.iter().enumerate() {
            let d = distance(point, obj.position);
            if d >= obj.size {
                continue;
            }
            if best.map_or(true, |(_, bd)| d <= bd) {
                best = Some((ObjectId(i), d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Nearest slot to `point` regardless of occupancy, with its distance.
    /// On a tie the lowest index wins.
    pub fn nearest_slot(&self, point: Point) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for slot in &self.slots {
            let d = distance(point, slot.position);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((slot.index, d));
            }
        }
        best
    }

    // ── mutations ─────────────────────────────────────────────────────────

    /// Move an object's centre.  Does not touch slot membership.
    pub fn move_object(&mut self, id: ObjectId, position: Point) -> bool {
        match self.objects.get_mut(id.0) {
            Some(obj) => { obj.position = position; true }
            None      => false,
        }
    }

    /// Take an object out of its slot, leaving its position unchanged.
    /// Returns false (and does nothing) if it was not slotted.
    pub fn detach(&mut self, id: ObjectId) -> bool {
        let Some(obj) = self.objects.get_mut(id.0) else { return false };
        let Some(index) = obj.slot.take() else { return false };
        if let Some(slot) = self.slots.get_mut(index) {
            slot.occupant = None;
        }
        debug!(object = id.0, slot = index, symbol = %obj.symbol, "detached");
        true
    }

    /// Snap an object into an empty slot and evaluate the win condition.
    ///
    /// Returns false (and does nothing) if the slot is occupied or out of
    /// range.
    pub fn place(&mut self, id: ObjectId, slot_index: usize) -> bool {
        if id.0 >= self.objects.len() {
            return false;
        }
        match self.slots.get(slot_index) {
            Some(slot) if !slot.is_occupied() => {}
            _ => return false,
        }
        self.detach(id);

        let slot = &mut self.slots[slot_index];
        let obj  = &mut self.objects[id.0];
        obj.position  = slot.position;
        obj.slot      = Some(slot_index);
        slot.occupant = Some((id, obj.symbol.clone()));
        debug!(object = id.0, slot = slot_index, symbol = %obj.symbol, "placed");

        self.check_win();
        true
    }

    /// Drop an object back into open space at a fresh random spot inside
    /// the staging box.
    pub fn release_to_staging(&mut self, id: ObjectId) -> bool {
        if id.0 >= self.objects.len() {
            return false;
        }
        self.detach(id);
        let position = self.staging_position();
        self.objects[id.0].position = position;
        debug!(object = id.0, x = position.0, y = position.1, "returned to staging");
        true
    }

    fn staging_position(&mut self) -> Point {
        let b = self.config.staging_box;
        let s = self.config.object_size;
        let x = self.rng.random_range((b.x + s)..=(b.x + b.w - s));
        let y = self.rng.random_range((b.y + s)..=(b.y + b.h - s));
        (x, y)
    }

    fn check_win(&mut self) {
        if self.outcome != Outcome::Playing {
            return;
        }
        let matched = self.slots.iter().zip(&self.reference_key).all(|(slot, want)| {
            slot.occupant_symbol() == Some(want.as_str())
        });
        if matched {
            self.outcome = Outcome::Won;
            info!("all slots match the reference key: puzzle won");
        }
    }

    // ── timer ─────────────────────────────────────────────────────────────

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.time_limit.saturating_sub(self.elapsed(now))
    }

    /// Whole seconds left, rounded down.
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        self.remaining(now).as_secs()
    }

    /// Per-tick timer evaluation: ends an unfinished game once time is up.
    pub fn update(&mut self, now: Instant) {
        if self.outcome == Outcome::Playing && self.remaining(now).is_zero() {
            self.outcome = Outcome::TimedOut;
            info!(limit_secs = self.time_limit.as_secs(), "time expired: game over");
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
