//! Frame-driven motion physics
//!
//! Everything here is time-sampled: callers pass the frame timestamp in and
//! read positions out. Nothing schedules itself.
//!
//! # Layers
//!
//! ## L4 Atomic Layer
//! - `interpolator` - Pure curves mapping [0, 1] to [0, 1]
//! - `timing` - Progress and interpolation helpers
//! - `elastic` - The saturating over-drag curve
//!
//! ## L3 Molecular Layer
//! - `scroller` - Ballistic fling and timed scroll trajectories
//! - `elastic::{BounceStepper, ReboundAnimation}` - Edge bounce and spring-back
//! - `velocity` - Release velocity estimation

// L4 Atomic Layer
pub mod interpolator;
pub mod timing;

// L3 Molecular Layer
pub mod elastic;
pub mod scroller;
pub mod velocity;

pub use elastic::{AnimationEnd, BounceStep, BounceStepper, ElasticCurve, ReboundAnimation};
pub use interpolator::InterpolatorExt;
pub use scroller::OverScroller;
pub use velocity::VelocityTracker;
