//! Swipe paging for the main viewer.
//!
//! One controller per surface. Pointer and touch input arrive as [`PointerInput`]
//! messages; the controller answers with [`GestureEvent`]s. After a release the
//! content snaps back to rest and new drags are refused until the host reports the
//! snap-back duration has elapsed.

use std::time::Duration;

use crate::config::{GalleryConfig, SwipeDirection};

/// Where a press landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// On the image itself.
    Content,
    /// On the empty backdrop around it.
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down { x: f32, target: PointerTarget },
    Move { x: f32 },
    Up,
    Cancel,
}

/// Identifies one scheduled snap-back; stale tokens are ignored.
pub type ResetToken = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { origin: f32, offset: f32 },
    /// Snapping back; waiting for the reset timer.
    Settling { token: ResetToken },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Translate the content horizontally by `px`.
    Offset { px: f32, animate: bool },
    /// Page by one item (`-1` or `1`).
    Step(i64),
    CloseRequested,
    ScheduleReset { token: ResetToken, after: Duration },
}

#[derive(Debug)]
pub struct DragController {
    state: DragState,
    threshold: f32,
    reset_after: Duration,
    direction: SwipeDirection,
    // Bumped on every schedule and detach.
    generation: ResetToken,
    events: Vec<GestureEvent>,
}

impl DragController {
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            state: DragState::Idle,
            threshold: config.swipe_threshold(),
            reset_after: config.drag_reset(),
            direction: config.swipe_direction,
            generation: 0,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    pub fn handle(&mut self, input: PointerInput, viewport_width: f32) {
        match (self.state, input) {
            (DragState::Idle, PointerInput::Down { target, .. })
                if target == PointerTarget::Background =>
            {
                self.events.push(GestureEvent::CloseRequested);
            }
            (DragState::Idle, PointerInput::Down { x, .. }) => {
                self.state = DragState::Dragging {
                    origin: x,
                    offset: 0.0,
                };
            }
            (DragState::Dragging { origin, .. }, PointerInput::Move { x }) => {
                let offset = x - origin;
                self.state = DragState::Dragging { origin, offset };
                self.events.push(GestureEvent::Offset {
                    px: offset,
                    animate: false,
                });
            }
            (DragState::Dragging { offset, .. }, PointerInput::Up) => {
                if viewport_width > 0.0 && offset.abs() > self.threshold * viewport_width {
                    self.events
                        .push(GestureEvent::Step(self.direction.step_for(offset)));
                }
                self.snap_back();
            }
            (DragState::Dragging { .. }, PointerInput::Cancel) => self.snap_back(),
            (state, input) => {
                log::trace!("drag input {input:?} ignored in {state:?}");
            }
        }
    }

    /// The host's snap-back timer fired.
    pub fn reset_elapsed(&mut self, token: ResetToken) {
        match self.state {
            DragState::Settling { token: current } if current == token => {
                self.state = DragState::Idle;
            }
            _ => log::trace!("stale drag reset {token}"),
        }
    }

    /// Drop any gesture in progress; pending reset timers become stale.
    pub fn detach(&mut self) {
        self.generation += 1;
        self.state = DragState::Idle;
        self.events.clear();
    }

    pub fn drain_events(&mut self) -> Vec<GestureEvent> {
        std::mem::take(&mut self.events)
    }

    fn snap_back(&mut self) {
        self.events.push(GestureEvent::Offset {
            px: 0.0,
            animate: true,
        });
        if self.reset_after.is_zero() {
            self.state = DragState::Idle;
            return;
        }
        self.generation += 1;
        let token = self.generation;
        self.state = DragState::Settling { token };
        self.events.push(GestureEvent::ScheduleReset {
            token,
            after: self.reset_after,
        });
    }
}
