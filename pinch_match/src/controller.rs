//! Per-frame drag-and-drop state machine.
//!
//! ```text
//!            Pinch on an object
//!   ┌──────┐ ─────────────────────▶ ┌─────────────────────────┐
//!   │ Idle │                        │ Holding { object, off } │ ◀─┐ Pinch: move
//!   └──────┘ ◀───────────────────── └─────────────────────────┘ ──┘
//!            detected, not Pinch:
//!            snap to slot or return to staging
//! ```
//!
//! The controller owns no objects.  It keeps an [`ObjectId`] handle plus
//! the pick offset and mutates the puzzle only through its methods.
//!
//! When tracking is lost while holding, the object freezes in place and
//! stays held until the hand is seen again.

use hand_gesture::{GestureState, HandObservation};
use match_puzzle::{ObjectId, PuzzleState};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::Point;

// ════════════════════════════════════════════════════════════════════════════
// InteractionConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Farthest a released object's centre may be from a slot centre and
    /// still snap into it.
    pub snap_radius: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self { InteractionConfig { snap_radius: 70.0 } }
}

// ════════════════════════════════════════════════════════════════════════════
// Interaction / InteractionEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interaction {
    Idle,
    /// `offset` is the interaction point minus the object centre at pick-up.
    Holding { object: ObjectId, offset: (f32, f32) },
}

/// What a frame did to the puzzle, for the status line and logs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InteractionEvent {
    PickedUp { object: ObjectId, detached_from: Option<usize> },
    Placed   { object: ObjectId, slot: usize },
    /// Released away from any free slot; the object went back to staging.
    Returned { object: ObjectId },
}

// ════════════════════════════════════════════════════════════════════════════
// InteractionController
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct InteractionController {
    config: InteractionConfig,
    state:  Interaction,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        InteractionController { config, state: Interaction::Idle }
    }

    pub fn state(&self) -> Interaction { self.state }

    pub fn held(&self) -> Option<ObjectId> {
        match self.state {
            Interaction::Holding { object, .. } => Some(object),
            Interaction::Idle                   => None,
        }
    }

    /// Advance one frame.
    ///
    /// `point` is the active interaction point: the index tip with the
    /// camera, the cursor with the pointer.  Nothing happens once the
    /// puzzle is over.
    pub fn step(
        &mut self,
        obs:    &HandObservation,
        point:  Option<Point>,
        puzzle: &mut PuzzleState,
    ) -> Option<InteractionEvent> {
        if puzzle.is_game_over() {
            return None;
        }
        match self.state {
            Interaction::Idle => {
                if obs.state != GestureState::Pinch {
                    return None;
                }
                self.pick_up(point?, puzzle)
            }
            Interaction::Holding { object, offset } => {
                if !obs.detected {
                    trace!(object = object.index(), "hand lost while holding; frozen");
                    return None;
                }
                if obs.state == GestureState::Pinch {
                    if let Some((px, py)) = point {
                        puzzle.move_object(object, (px - offset.0, py - offset.1));
                    }
                    return None;
                }
                self.state = Interaction::Idle;
                Some(self.release(object, puzzle))
            }
        }
    }

    fn pick_up(&mut self, point: Point, puzzle: &mut PuzzleState) -> Option<InteractionEvent> {
        let object = puzzle.hit_test(point)?;
        let detached_from = puzzle.object(object)?.slot();
        if detached_from.is_some() {
            puzzle.detach(object);
        }
        let (ox, oy) = puzzle.object(object)?.position();
        let offset = (point.0 - ox, point.1 - oy);
        self.state = Interaction::Holding { object, offset };
        debug!(object = object.index(), ?detached_from, "picked up");
        Some(InteractionEvent::PickedUp { object, detached_from })
    }

    fn release(&mut self, object: ObjectId, puzzle: &mut PuzzleState) -> InteractionEvent {
        let target = puzzle
            .object(object)
            .and_then(|o| puzzle.nearest_slot(o.position()))
            .filter(|&(_, d)| d <= self.config.snap_radius)
            .map(|(slot, _)| slot);

        if let Some(slot) = target {
            if puzzle.place(object, slot) {
                debug!(object = object.index(), slot, "snapped into slot");
                return InteractionEvent::Placed { object, slot };
            }
        }
        puzzle.release_to_staging(object);
        debug!(object = object.index(), "released into staging");
        InteractionEvent::Returned { object }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{BoundingBox, PointerEmulator};
    use match_puzzle::{PuzzleConfig, Outcome};
    use proptest::prelude::*;
    use std::time::{Duration, Instant};

    fn puzzle() -> PuzzleState {
        let cfg = PuzzleConfig { seed: Some(17), ..Default::default() };
        let mut p = PuzzleState::new(cfg, Instant::now()).unwrap();
        // Park everything out of the way, then lay out object 0 alone.
        let ids: Vec<ObjectId> = p.object_ids().collect();
        for (i, &id) in ids.iter().enumerate() {
            p.move_object(id, (1000.0, 100.0 + i as f32 * 50.0));
        }
        p.move_object(ids[0], (150.0, 150.0));
        p
    }

    fn first(p: &PuzzleState) -> ObjectId { p.object_ids().next().unwrap() }

    fn hand(state: GestureState, at: Point) -> HandObservation {
        HandObservation {
            detected:  true,
            bbox:      Some(BoundingBox { x: at.0 - 40.0, y: at.1 - 40.0, w: 80.0, h: 80.0 }),
            state,
            index_tip: Some(at),
            thumb_tip: Some((at.0 - 20.0, at.1)),
        }
    }

    fn pinch(at: Point) -> HandObservation { hand(GestureState::Pinch, at) }
    fn open(at: Point)  -> HandObservation { hand(GestureState::Open, at) }

    fn ctl() -> InteractionController { InteractionController::new(InteractionConfig::default()) }

    #[test]
    fn pinch_on_object_picks_it_up() {
        let mut p = puzzle();
        let mut c = ctl();
        let ev = c.step(&pinch((160.0, 160.0)), Some((160.0, 160.0)), &mut p);
        let id = first(&p);
        assert_eq!(ev, Some(InteractionEvent::PickedUp { object: id, detached_from: None }));
        assert_eq!(c.state(), Interaction::Holding { object: id, offset: (10.0, 10.0) });
    }

    #[test]
    fn pinch_on_empty_space_stays_idle() {
        let mut p = puzzle();
        let mut c = ctl();
        assert_eq!(c.step(&pinch((250.0, 250.0)), Some((250.0, 250.0)), &mut p), None);
        assert_eq!(c.state(), Interaction::Idle);
    }

    #[test]
    fn open_hand_over_object_does_nothing() {
        let mut p = puzzle();
        let mut c = ctl();
        assert_eq!(c.step(&open((150.0, 150.0)), Some((150.0, 150.0)), &mut p), None);
        assert_eq!(c.held(), None);
    }

    #[test]
    fn idle_without_hand_is_noop() {
        let mut p = puzzle();
        let mut c = ctl();
        assert_eq!(c.step(&HandObservation::absent(), None, &mut p), None);
        assert_eq!(c.state(), Interaction::Idle);
    }

    #[test]
    fn drag_keeps_pick_offset() {
        let mut p = puzzle();
        let mut c = ctl();
        c.step(&pinch((160.0, 160.0)), Some((160.0, 160.0)), &mut p);
        c.step(&pinch((260.0, 200.0)), Some((260.0, 200.0)), &mut p);
        assert_eq!(p.object(first(&p)).unwrap().position(), (250.0, 190.0));
    }

    #[test]
    fn release_near_free_slot_snaps() {
        let mut p = puzzle();
        let mut c = ctl();
        let id = first(&p);
        c.step(&pinch((150.0, 150.0)), Some((150.0, 150.0)), &mut p);
        c.step(&pinch((420.0, 520.0)), Some((420.0, 520.0)), &mut p);
        let ev = c.step(&open((420.0, 520.0)), Some((420.0, 520.0)), &mut p);
        assert_eq!(ev, Some(InteractionEvent::Placed { object: id, slot: 1 }));
        assert_eq!(p.object(id).unwrap().position(), (400.0, 500.0));
        assert_eq!(p.object(id).unwrap().slot(), Some(1));
        assert_eq!(c.state(), Interaction::Idle);
    }

    #[test]
    fn release_uses_object_centre_not_fingertip() {
        let mut p = puzzle();
        let mut c = ctl();
        let id = first(&p);
        // Grab 35 px right of centre.  The fingertip ends nearer slot 1,
        // the centre nearer slot 0.
        c.step(&pinch((185.0, 150.0)), Some((185.0, 150.0)), &mut p);
        c.step(&pinch((360.0, 500.0)), Some((360.0, 500.0)), &mut p);
        let ev = c.step(&open((360.0, 500.0)), Some((360.0, 500.0)), &mut p);
        assert_eq!(ev, Some(InteractionEvent::Placed { object: id, slot: 0 }));
    }

    #[test]
    fn release_just_outside_snap_radius_returns_to_staging() {
        let mut p = puzzle();
        let mut c = ctl();
        let id = first(&p);
        c.step(&pinch((150.0, 150.0)), Some((150.0, 150.0)), &mut p);
        // 71 px below slot 2.
        c.step(&pinch((500.0, 571.0)), Some((500.0, 571.0)), &mut p);
        let ev = c.step(&open((500.0, 571.0)), Some((500.0, 571.0)), &mut p);
        assert_eq!(ev, Some(InteractionEvent::Returned { object: id }));
        let obj = p.object(id).unwrap();
        assert_eq!(obj.slot(), None);
        assert!(p.config().staging_box.contains(obj.position()));
    }

    #[test]
    fn release_onto_occupied_slot_returns_to_staging() {
        let mut p = puzzle();
        let ids: Vec<ObjectId> = p.object_ids().collect();
        assert!(p.place(ids[1], 2));
        let mut c = ctl();
        c.step(&pinch((150.0, 150.0)), Some((150.0, 150.0)), &mut p);
        c.step(&pinch((505.0, 505.0)), Some((505.0, 505.0)), &mut p);
        let ev = c.step(&open((505.0, 505.0)), Some((505.0, 505.0)), &mut p);
        assert_eq!(ev, Some(InteractionEvent::Returned { object: ids[0] }));
        assert_eq!(p.slots()[2].occupant(), Some(ids[1]));
    }

    #[test]
    fn ambiguous_gesture_releases() {
        let mut p = puzzle();
        let mut c = ctl();
        c.step(&pinch((150.0, 150.0)), Some((150.0, 150.0)), &mut p);
        let ev = c.step(&hand(GestureState::None, (150.0, 150.0)), Some((150.0, 150.0)), &mut p);
        assert!(matches!(ev, Some(InteractionEvent::Returned { .. })));
        assert_eq!(c.state(), Interaction::Idle);
    }

    #[test]
    fn hand_lost_while_holding_freezes() {
        let mut p = puzzle();
        let mut c = ctl();
        let id = first(&p);
        c.step(&pinch((150.0, 150.0)), Some((150.0, 150.0)), &mut p);
        c.step(&pinch((200.0, 200.0)), Some((200.0, 200.0)), &mut p);
        for _ in 0..10 {
            assert_eq!(c.step(&HandObservation::absent(), None, &mut p), None);
        }
        assert_eq!(c.held(), Some(id));
        assert_eq!(p.object(id).unwrap().position(), (200.0, 200.0));
        // Tracking resumes mid-pinch: dragging continues.
        c.step(&pinch((210.0, 200.0)), Some((210.0, 200.0)), &mut p);
        assert_eq!(p.object(id).unwrap().position(), (210.0, 200.0));
    }

    #[test]
    fn pick_from_slot_detaches_in_place() {
        let mut p = puzzle();
        let mut c = ctl();
        let id = first(&p);
        assert!(p.place(id, 3));
        let before = p.object(id).unwrap().position();
        let ev = c.step(&pinch((605.0, 505.0)), Some((605.0, 505.0)), &mut p);
        assert_eq!(ev, Some(InteractionEvent::PickedUp { object: id, detached_from: Some(3) }));
        assert_eq!(p.object(id).unwrap().position(), before);
        assert_eq!(p.object(id).unwrap().slot(), None);
        assert!(!p.slots()[3].is_occupied());
    }

    #[test]
    fn holding_ignores_slots_until_release() {
        let mut p = puzzle();
        let mut c = ctl();
        let id = first(&p);
        c.step(&pinch((150.0, 150.0)), Some((150.0, 150.0)), &mut p);
        c.step(&pinch((300.0, 500.0)), Some((300.0, 500.0)), &mut p);
        assert_eq!(p.object(id).unwrap().slot(), None);
        assert!(!p.slots()[0].is_occupied());
    }

    #[test]
    fn nothing_happens_after_game_over() {
        let start = Instant::now();
        let cfg = PuzzleConfig { seed: Some(17), ..Default::default() };
        let mut p = PuzzleState::new(cfg, start).unwrap();
        let pos = p.object(first(&p)).unwrap().position();
        p.update(start + Duration::from_secs(61));
        assert_eq!(p.outcome(), Outcome::TimedOut);
        let mut c = ctl();
        assert_eq!(c.step(&pinch(pos), Some(pos), &mut p), None);
        assert_eq!(c.held(), None);
    }

    #[test]
    fn full_game_by_pointer() {
        let start = Instant::now();
        let cfg = PuzzleConfig { seed: Some(23), ..Default::default() };
        let mut p = PuzzleState::new(cfg, start).unwrap();
        let emu = PointerEmulator::default();
        let mut c = ctl();

        let key: Vec<String> = p.reference_key().to_vec();
        for (slot, symbol) in key.iter().enumerate() {
            // Park the loose objects in a corner and bring the target somewhere clear.
            let ids: Vec<ObjectId> = p.object_ids().collect();
            let target = *ids.iter()
                .find(|&&id| p.object(id).unwrap().symbol() == symbol && p.object(id).unwrap().slot().is_none())
                .unwrap();
            for &id in &ids {
                if id != target && p.object(id).unwrap().slot().is_none() {
                    p.move_object(id, (1050.0, 650.0));
                }
            }
            let from = (800.0, 200.0);
            p.move_object(target, from);
            let to = p.slots()[slot].position();
            c.step(&emu.observe(Some(from), true), Some(from), &mut p);
            c.step(&emu.observe(Some(to), true), Some(to), &mut p);
            let ev = c.step(&emu.observe(Some(to), false), Some(to), &mut p);
            assert_eq!(ev, Some(InteractionEvent::Placed { object: target, slot }));
        }
        assert!(p.is_won());
        p.update(start + Duration::from_secs(120));
        assert_eq!(p.outcome(), Outcome::Won);
    }

    #[derive(Clone, Debug)]
    enum Frame {
        Pinch(f32, f32),
        Open(f32, f32),
        Ambiguous(f32, f32),
        Lost,
    }

    fn frame() -> impl Strategy<Value = Frame> {
        let x = 0.0f32..1100.0;
        let y = 0.0f32..700.0;
        prop_oneof![
            (x.clone(), y.clone()).prop_map(|(x, y)| Frame::Pinch(x, y)),
            (x.clone(), y.clone()).prop_map(|(x, y)| Frame::Open(x, y)),
            (x, y).prop_map(|(x, y)| Frame::Ambiguous(x, y)),
            Just(Frame::Lost),
        ]
    }

    proptest! {
        #[test]
        fn held_object_is_never_slotted(frames in prop::collection::vec(frame(), 0..80)) {
            let cfg = PuzzleConfig { seed: Some(99), ..Default::default() };
            let mut p = PuzzleState::new(cfg, Instant::now()).unwrap();
            let mut c = ctl();
            for f in frames {
                let (obs, pt) = match f {
                    Frame::Pinch(x, y)     => (pinch((x, y)), Some((x, y))),
                    Frame::Open(x, y)      => (open((x, y)), Some((x, y))),
                    Frame::Ambiguous(x, y) => (hand(GestureState::None, (x, y)), Some((x, y))),
                    Frame::Lost            => (HandObservation::absent(), None),
                };
                c.step(&obs, pt, &mut p);
                if let Some(id) = c.held() {
                    prop_assert_eq!(p.object(id).unwrap().slot(), None);
                }
                for slot in p.slots() {
                    if let Some(id) = slot.occupant() {
                        prop_assert_eq!(p.object(id).unwrap().slot(), Some(slot.index()));
                    }
                }
            }
        }
    }
}
