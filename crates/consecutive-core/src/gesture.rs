//! Pointer gesture tracking
//!
//! Turns discrete `down` / `move` / `up` / `cancel` events into scroll
//! deltas. The axis is locked once travel exceeds the touch slop and never
//! re-evaluated for the rest of the gesture.

use std::time::Instant;

use crate::physics::VelocityTracker;

pub type PointerId = u32;

/// Axis a gesture locked onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Result of a pointer move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Still inside the touch slop
    Pending,
    /// Locked vertically on this move; `delta` is the travel since the down point
    SlopExceeded { delta: i32 },
    /// Vertical drag continues
    Scroll { delta: i32 },
    /// The gesture belongs to a horizontal child
    Horizontal,
    /// Not the active pointer, or no gesture in progress
    Ignored,
}

/// Result of a pointer lifting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpOutcome {
    /// Another pointer is still down and now drives the gesture
    Handover,
    /// The last pointer lifted. `velocity` is the finger velocity in px/s,
    /// negative when the finger moved up.
    Released {
        velocity: i32,
        orientation: Option<Orientation>,
    },
}

#[derive(Debug, Clone, Copy)]
struct Pointer {
    id: PointerId,
    x: i32,
    y: i32,
}

/// Gesture state for one touch sequence
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    pointers: Vec<Pointer>,
    active: Option<PointerId>,
    down_x: i32,
    down_y: i32,
    last_y: i32,
    orientation: Option<Orientation>,
    velocity: VelocityTracker,
    brake: bool,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_pointer(&self) -> Option<PointerId> {
        self.active
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    /// Set when this gesture started by catching a settling animation
    pub fn is_braking(&self) -> bool {
        self.brake
    }

    /// A pointer touched down. The newest pointer always becomes active.
    pub fn pointer_down(&mut self, id: PointerId, x: i32, y: i32, now: Instant, braking: bool) {
        if self.pointers.is_empty() {
            self.orientation = None;
            self.down_x = x;
            self.down_y = y;
            self.brake = braking;
        }

        // Velocity only ever follows the active pointer
        self.pointers.retain(|p| p.id != id);
        self.pointers.push(Pointer { id, x, y });
        self.active = Some(id);
        self.last_y = y;
        self.velocity.clear();
        self.velocity.add_sample(now, y);
    }

    pub fn pointer_move(
        &mut self,
        id: PointerId,
        x: i32,
        y: i32,
        now: Instant,
        slop: i32,
        vertical_only: bool,
    ) -> MoveOutcome {
        let Some(pointer) = self.pointers.iter_mut().find(|p| p.id == id) else {
            return MoveOutcome::Ignored;
        };
        pointer.x = x;
        pointer.y = y;
        if self.active != Some(id) {
            return MoveOutcome::Ignored;
        }
        self.velocity.add_sample(now, y);

        match self.orientation {
            Some(Orientation::Vertical) => {
                let delta = self.last_y - y;
                self.last_y = y;
                MoveOutcome::Scroll { delta }
            }
            Some(Orientation::Horizontal) => MoveOutcome::Horizontal,
            None => {
                let dx = (x - self.down_x).abs();
                let dy = (y - self.down_y).abs();
                if dx <= slop && dy <= slop {
                    return MoveOutcome::Pending;
                }
                if vertical_only || dy >= dx {
                    self.orientation = Some(Orientation::Vertical);
                    let delta = self.last_y - y;
                    self.last_y = y;
                    MoveOutcome::SlopExceeded { delta }
                } else {
                    self.orientation = Some(Orientation::Horizontal);
                    MoveOutcome::Horizontal
                }
            }
        }
    }

    pub fn pointer_up(&mut self, id: PointerId, now: Instant, max_velocity: i32) -> UpOutcome {
        let lifted = self.pointers.iter().position(|p| p.id == id);
        if let Some(index) = lifted {
            let pointer = self.pointers.remove(index);
            if self.active == Some(id) {
                self.velocity.add_sample(now, pointer.y);
            }
        }

        if let Some(next) = self.pointers.last().copied() {
            if self.active == Some(id) || self.active.is_none() {
                // The remaining pointer starts a fresh velocity history
                self.active = Some(next.id);
                self.last_y = next.y;
                self.velocity.clear();
            }
            return UpOutcome::Handover;
        }

        let outcome = UpOutcome::Released {
            velocity: self.velocity.velocity(max_velocity),
            orientation: self.orientation,
        };
        self.reset();
        outcome
    }

    /// Abandon the gesture without a release velocity
    pub fn cancel(&mut self) -> Option<Orientation> {
        let orientation = self.orientation;
        self.reset();
        orientation
    }

    fn reset(&mut self) {
        self.pointers.clear();
        self.active = None;
        self.orientation = None;
        self.velocity.clear();
        self.brake = false;
    }
}
