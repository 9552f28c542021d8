//! Touch gesture recognition.
//!
//! One finger is provisionally a swipe. A second contact turns the gesture
//! into a pinch until every finger is lifted, and the swipe is forgotten.
//! A finished one-finger gesture turns the page only when its horizontal
//! travel exceeds [`SWIPE_THRESHOLD_PX`] and its vertical travel.
//!
//! Mapping: positive horizontal travel (moving rightwards) advances, negative
//! retreats. In a right-to-left book the next page sits on the left, so it is
//! pulled across to the right.

use super::types::{PageDirection, Point};

pub const SWIPE_THRESHOLD_PX: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Swipe { start: Point },
    Pinch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    Ignored,
    PinchStarted { distance: f32 },
    PinchMoved { distance: f32 },
    PinchEnded,
    Swipe(PageDirection),
}

#[derive(Debug)]
pub struct GestureTracker {
    phase: Phase,
    suppress_next_click: bool,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            suppress_next_click: false,
        }
    }
}

fn pinch_distance(touches: &[Point]) -> Option<f32> {
    match touches {
        [first, second, ..] => Some(first.distance_to(*second)),
        _ => None,
    }
}

/// Classify a finished one-finger movement.
pub fn classify_swipe(start: Point, end: Point) -> Option<PageDirection> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dx.abs() > SWIPE_THRESHOLD_PX && dx.abs() > dy.abs() {
        Some(if dx > 0.0 {
            PageDirection::Forward
        } else {
            PageDirection::Backward
        })
    } else {
        None
    }
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pinching(&self) -> bool {
        self.phase == Phase::Pinch
    }

    /// `touches` are all contacts currently on the surface.
    pub fn touch_start(&mut self, touches: &[Point]) -> GestureOutcome {
        if let Some(distance) = pinch_distance(touches) {
            self.phase = Phase::Pinch;
            return GestureOutcome::PinchStarted { distance };
        }
        match (self.phase, touches.first()) {
            (Phase::Idle, Some(start)) => {
                self.phase = Phase::Swipe { start: *start };
            }
            (Phase::Swipe { .. }, Some(start)) => {
                // A fresh single contact restarts tracking.
                self.phase = Phase::Swipe { start: *start };
            }
            _ => {}
        }
        GestureOutcome::Ignored
    }

    pub fn touch_move(&mut self, touches: &[Point]) -> GestureOutcome {
        if let Some(distance) = pinch_distance(touches) {
            if self.phase != Phase::Pinch {
                self.phase = Phase::Pinch;
                return GestureOutcome::PinchStarted { distance };
            }
            return GestureOutcome::PinchMoved { distance };
        }
        GestureOutcome::Ignored
    }

    /// `lifted` is the contact that left the surface, `remaining` how many
    /// are still down.
    pub fn touch_end(&mut self, lifted: Point, remaining: usize) -> GestureOutcome {
        match self.phase {
            Phase::Swipe { start } => {
                self.phase = Phase::Idle;
                match classify_swipe(start, lifted) {
                    Some(direction) => {
                        self.suppress_next_click = true;
                        GestureOutcome::Swipe(direction)
                    }
                    None => GestureOutcome::Ignored,
                }
            }
            Phase::Pinch if remaining == 0 => {
                self.phase = Phase::Idle;
                GestureOutcome::PinchEnded
            }
            _ => GestureOutcome::Ignored,
        }
    }

    /// Abandon whatever is being tracked.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }

    /// True exactly once after a recognised swipe; the click that the same
    /// physical gesture produces must be dropped.
    pub fn take_click_suppression(&mut self) -> bool {
        std::mem::take(&mut self.suppress_next_click)
    }
}
