use serde::Serialize;

use crate::region::RegionId;
use crate::state::MotionState;

/// Notifications queued by the engine, drained with `take_events()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScrollEvent {
    /// Virtual offset or motion state changed; a pure state change carries `offset == old_offset`
    ScrollChanged {
        offset: i32,
        old_offset: i32,
        state: MotionState,
    },
    /// Single-pin mode switched pinned regions
    StickyChanged {
        old: Option<RegionId>,
        new: Option<RegionId>,
    },
    /// Permanent mode pinned list changed, top to bottom
    PermanentStickyChanged { regions: Vec<RegionId> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let event = ScrollEvent::StickyChanged {
            old: None,
            new: Some(RegionId(3)),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"sticky_changed","old":null,"new":3}"#);

        let event = ScrollEvent::ScrollChanged {
            offset: 10,
            old_offset: 0,
            state: MotionState::Dragging,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""state":"dragging""#));
    }
}
