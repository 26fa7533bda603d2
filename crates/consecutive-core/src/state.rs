//! Motion state machine

use serde::Serialize;

/// What the stack is doing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    #[default]
    Idle,
    /// A finger moved past the touch slop and drives the offset
    Dragging,
    /// Fling, smooth scroll, target seek or spring-back in flight
    Settling,
}

/// Inputs that move the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionTrigger {
    /// Pointer travel exceeded the touch slop and the stack can scroll
    SlopExceeded,
    /// Last pointer lifted; `settling` when a fling or spring-back took over
    Release { settling: bool },
    /// A fling, smooth scroll or rebound started without a gesture
    AnimationStarted,
    /// Scroll-to-region began
    TargetStarted,
    /// The running animation finished with no boundary violation left
    SettleComplete,
    /// Stop everything
    Abort,
}

impl MotionState {
    pub fn next(self, trigger: MotionTrigger) -> MotionState {
        use MotionState::*;
        use MotionTrigger::*;

        match (self, trigger) {
            (_, SlopExceeded) => Dragging,
            (_, Release { settling: true }) => Settling,
            (Dragging, Release { settling: false }) => Idle,
            (state, Release { settling: false }) => state,
            (_, AnimationStarted) | (_, TargetStarted) => Settling,
            (Settling, SettleComplete) => Idle,
            (state, SettleComplete) => state,
            (_, Abort) => Idle,
        }
    }

    pub fn is_idle(self) -> bool {
        self == MotionState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_cycle() {
        let state = MotionState::Idle
            .next(MotionTrigger::SlopExceeded)
            .next(MotionTrigger::Release { settling: true });
        assert_eq!(state, MotionState::Settling);
        assert_eq!(state.next(MotionTrigger::SettleComplete), MotionState::Idle);
    }

    #[test]
    fn test_release_without_fling_goes_idle() {
        let state = MotionState::Dragging.next(MotionTrigger::Release { settling: false });
        assert_eq!(state, MotionState::Idle);
    }

    #[test]
    fn test_drag_interrupts_settling() {
        assert_eq!(
            MotionState::Settling.next(MotionTrigger::SlopExceeded),
            MotionState::Dragging
        );
    }

    #[test]
    fn test_settle_complete_only_ends_settling() {
        assert_eq!(
            MotionState::Dragging.next(MotionTrigger::SettleComplete),
            MotionState::Dragging
        );
        assert_eq!(
            MotionState::Idle.next(MotionTrigger::TargetStarted),
            MotionState::Settling
        );
        assert_eq!(MotionState::Settling.next(MotionTrigger::Abort), MotionState::Idle);
    }
}
