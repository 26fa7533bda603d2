//! Scripted gesture scenarios
//!
//! A scenario file describes a region stack and a list of steps to drive it
//! with. Running it on a simulated clock yields the notifications each step
//! produced and the final geometry, which makes engine behaviour easy to
//! inspect without a screen.

use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ScrollerConfig;
use crate::error::{Error, Result};
use crate::events::ScrollEvent;
use crate::gesture::PointerId;
use crate::region::{LinearContent, Region, RegionId, RegionParams, Viewport};
use crate::scroller::ConsecutiveScroller;
use crate::state::MotionState;

/// `frames` without a count stops after this many frames
const MAX_SETTLE_FRAMES: u32 = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub scroller: ScrollerConfig,
    pub viewport: Viewport,
    /// Simulated frame interval
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    pub regions: Vec<RegionSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One region of the stack
#[derive(Debug, Clone, Deserialize)]
pub struct RegionSpec {
    pub id: RegionId,
    pub height: i32,
    /// Makes the region scroll internally over this much content
    #[serde(default)]
    pub content_height: Option<i32>,
    /// Layout width for aligned regions; full width when absent
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(flatten)]
    pub params: RegionParams,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Pointer pressed; the clock advances by `after_ms` first
    Down {
        #[serde(default)]
        pointer: PointerId,
        #[serde(default)]
        x: i32,
        y: i32,
        #[serde(default)]
        after_ms: u64,
    },
    Move {
        #[serde(default)]
        pointer: PointerId,
        #[serde(default)]
        x: i32,
        y: i32,
        #[serde(default = "default_pointer_step_ms")]
        after_ms: u64,
    },
    Up {
        #[serde(default)]
        pointer: PointerId,
        #[serde(default = "default_pointer_step_ms")]
        after_ms: u64,
    },
    /// Deliver `count` frames, or frames until the engine is at rest
    Frames {
        #[serde(default)]
        count: Option<u32>,
    },
    ScrollBy { dy: i32 },
    Fling { velocity: i32 },
    ScrollToRegion {
        region: RegionId,
        #[serde(default)]
        offset: i32,
        #[serde(default)]
        smooth: bool,
    },
    SmoothScrollTo { y: i32 },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Down { .. } => "down",
            Step::Move { .. } => "move",
            Step::Up { .. } => "up",
            Step::Frames { .. } => "frames",
            Step::ScrollBy { .. } => "scroll_by",
            Step::Fling { .. } => "fling",
            Step::ScrollToRegion { .. } => "scroll_to_region",
            Step::SmoothScrollTo { .. } => "smooth_scroll_to",
        }
    }
}

/// Notifications raised by one step
#[derive(Debug, Clone, Serialize)]
pub struct StepTrace {
    pub index: usize,
    pub op: &'static str,
    /// Simulated time when the step finished
    pub at_ms: u64,
    pub events: Vec<ScrollEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionSnapshot {
    pub id: RegionId,
    pub top: i32,
    pub height: i32,
    pub screen_top: i32,
    pub internal_offset: i32,
    pub translation_y: i32,
    pub pinned: bool,
}

/// Engine state after the last step
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub offset: i32,
    pub container_offset: i32,
    pub scroll_range: i32,
    pub state: MotionState,
    pub first_visible: Option<RegionId>,
    pub last_visible: Option<RegionId>,
    pub pinned: Vec<RegionId>,
    pub regions: Vec<RegionSnapshot>,
}

impl Snapshot {
    pub fn capture(scroller: &ConsecutiveScroller) -> Self {
        let regions = scroller
            .regions()
            .iter()
            .map(|r| RegionSnapshot {
                id: r.id(),
                top: r.top(),
                height: r.height(),
                screen_top: scroller.screen_top(r),
                internal_offset: r.internal_scroll_offset(),
                translation_y: r.translation_y(),
                pinned: scroller.is_region_pinned(r.id()),
            })
            .collect();

        Self {
            offset: scroller.scroll_offset(),
            container_offset: scroller.container_offset(),
            scroll_range: scroller.scroll_range(),
            state: scroller.state(),
            first_visible: scroller.first_visible_region(),
            last_visible: scroller.last_visible_region(),
            pinned: scroller.pinned_regions(),
            regions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    pub steps: Vec<StepTrace>,
    #[serde(rename = "final")]
    pub final_state: Snapshot,
}

impl Trace {
    /// Pretty-printed JSON form of the trace
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn default_frame_ms() -> u64 {
    16
}

fn default_pointer_step_ms() -> u64 {
    10
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let scenario: Self =
            toml::from_str(content).map_err(|e| Error::InvalidScenario(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(Error::InvalidScenario("no regions".to_string()));
        }
        if self.frame_ms == 0 {
            return Err(Error::InvalidScenario("frame_ms must be positive".to_string()));
        }

        let mut seen = HashSet::new();
        for region in &self.regions {
            if !seen.insert(region.id) {
                return Err(Error::InvalidScenario(format!(
                    "duplicate region id {}",
                    region.id
                )));
            }
            if region.height < 0 || region.content_height.is_some_and(|h| h < 0) {
                return Err(Error::InvalidScenario(format!(
                    "negative height on region {}",
                    region.id
                )));
            }
        }
        Ok(())
    }

    /// Build the stack this scenario describes
    pub fn build(&self) -> ConsecutiveScroller {
        let mut scroller = ConsecutiveScroller::new(self.scroller.clone());
        scroller.set_viewport(self.viewport);

        for spec in &self.regions {
            let region = match spec.content_height {
                Some(content) => {
                    Region::scrollable(spec.id, spec.height, LinearContent::new(content))
                }
                None => Region::fixed(spec.id, spec.height),
            };
            let mut region = region.with_params(spec.params.clone());
            if let Some(width) = spec.width {
                region = region.align(spec.params.alignment, width);
            }
            scroller.push_region(region);
        }
        scroller
    }

    /// Run every step on a fresh stack
    pub fn run(&self) -> Result<Trace> {
        let mut scroller = self.build();
        // Layout notifications are not part of any step
        scroller.take_events();

        let start = Instant::now();
        let mut clock = Duration::ZERO;
        let frame = Duration::from_millis(self.frame_ms);
        let mut steps = Vec::with_capacity(self.steps.len());

        for (index, step) in self.steps.iter().enumerate() {
            debug!(index, op = step.name(), "scenario step");
            match *step {
                Step::Down {
                    pointer,
                    x,
                    y,
                    after_ms,
                } => {
                    clock += Duration::from_millis(after_ms);
                    scroller.pointer_down(pointer, x, y, start + clock);
                }
                Step::Move {
                    pointer,
                    x,
                    y,
                    after_ms,
                } => {
                    clock += Duration::from_millis(after_ms);
                    scroller.pointer_move(pointer, x, y, start + clock);
                }
                Step::Up { pointer, after_ms } => {
                    clock += Duration::from_millis(after_ms);
                    scroller.pointer_up(pointer, start + clock);
                }
                Step::Frames { count } => {
                    let limit = count.unwrap_or(MAX_SETTLE_FRAMES);
                    let mut delivered = 0;
                    while delivered < limit && (count.is_some() || scroller.needs_frame()) {
                        scroller.on_frame(start + clock);
                        clock += frame;
                        delivered += 1;
                    }
                    if count.is_none() && scroller.needs_frame() {
                        return Err(Error::InvalidScenario(format!(
                            "step {}: motion did not settle within {} frames",
                            index, MAX_SETTLE_FRAMES
                        )));
                    }
                }
                Step::ScrollBy { dy } => scroller.scroll_by(dy),
                Step::Fling { velocity } => scroller.fling(velocity),
                Step::ScrollToRegion {
                    region,
                    offset,
                    smooth: false,
                } => scroller.scroll_to_region_with_offset(region, offset)?,
                Step::ScrollToRegion {
                    region,
                    offset,
                    smooth: true,
                } => scroller.smooth_scroll_to_region_with_offset(region, offset)?,
                Step::SmoothScrollTo { y } => scroller.smooth_scroll_to_offset(y),
            }

            steps.push(StepTrace {
                index,
                op: step.name(),
                at_ms: clock.as_millis() as u64,
                events: scroller.take_events(),
            });
        }

        let final_state = Snapshot::capture(&scroller);
        info!(
            steps = steps.len(),
            offset = final_state.offset,
            state = ?final_state.state,
            "scenario finished"
        );
        Ok(Trace { steps, final_state })
    }
}
