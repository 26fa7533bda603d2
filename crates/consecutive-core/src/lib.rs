pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod fling;
pub mod gesture;
pub mod nested;
pub mod physics;
pub mod region;
pub mod scenario;
pub mod scroller;
pub mod snap;
pub mod state;
pub mod sticky;

pub use config::{AppConfig, Interpolator, ScrollerConfig};
pub use error::{Error, Result};
pub use events::ScrollEvent;
pub use gesture::{Orientation, PointerId};
pub use nested::{Detached, NestedScrollLedger, NestedScrollParent, ScrollConsumption, ScrollSource};
pub use region::{
    Alignment, Direction, LinearContent, Region, RegionId, RegionParams, RegionStack, ScrollCapable,
    Viewport,
};
pub use scenario::{Scenario, Snapshot, Step, Trace};
pub use scroller::ConsecutiveScroller;
pub use state::MotionState;
