//! Nested-scroll negotiation
//!
//! The ancestor side is consumed through [`NestedScrollParent`]; the
//! [`NestedScrollLedger`] keeps per-source books of who consumed how much
//! of every requested delta.

use serde::Serialize;

use crate::region::RegionId;

/// Where a scroll delta comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollSource {
    /// A finger on the screen
    Touch,
    /// Fling, smooth scroll or programmatic scroll
    NonTouch,
}

/// Ancestor of a scroller in the nested-scroll chain.
///
/// Every method has a refusing default, so an implementor only overrides
/// the negotiation steps it takes part in.
pub trait NestedScrollParent {
    /// A nested scroll of `source` began below this ancestor
    fn on_nested_scroll_started(&mut self, _source: ScrollSource) -> bool {
        false
    }

    /// First refusal on `delta` before the scroller consumes it
    fn offer_pre_scroll(&mut self, _delta: i32, _source: ScrollSource) -> i32 {
        0
    }

    /// Leftover after the scroller consumed `consumed_by_self`; returns what the ancestor took
    fn report_unconsumed_scroll(
        &mut self,
        _consumed_by_self: i32,
        _remaining: i32,
        _source: ScrollSource,
    ) -> i32 {
        0
    }

    /// First refusal on a fling; `true` means the ancestor took it
    fn offer_pre_fling(&mut self, _velocity: i32) -> bool {
        false
    }

    /// Fling notification after the pre-fling was declined
    fn report_fling(&mut self, _velocity: i32, _self_can_continue: bool) -> bool {
        false
    }

    fn on_nested_scroll_stopped(&mut self, _source: ScrollSource) {}
}

/// Root scroller with no ancestor
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl NestedScrollParent for Detached {}

/// Cumulative consumption of one nested scroll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrollConsumption {
    pub requested: i32,
    pub ancestor_pre: i32,
    pub by_self: i32,
    pub by_descendant: i32,
    pub ancestor_post: i32,
}

impl ScrollConsumption {
    /// What nobody in the chain took
    pub fn unconsumed(&self) -> i32 {
        self.requested - self.ancestor_pre - self.by_self - self.by_descendant - self.ancestor_post
    }
}

#[derive(Debug, Clone, Default)]
struct LedgerEntry {
    active: bool,
    descendant: Option<RegionId>,
    consumption: ScrollConsumption,
}

/// Per-source nested-scroll books
#[derive(Debug, Clone, Default)]
pub struct NestedScrollLedger {
    touch: LedgerEntry,
    non_touch: LedgerEntry,
}

impl NestedScrollLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, source: ScrollSource) -> &LedgerEntry {
        match source {
            ScrollSource::Touch => &self.touch,
            ScrollSource::NonTouch => &self.non_touch,
        }
    }

    fn entry_mut(&mut self, source: ScrollSource) -> &mut LedgerEntry {
        match source {
            ScrollSource::Touch => &mut self.touch,
            ScrollSource::NonTouch => &mut self.non_touch,
        }
    }

    /// Open the books for `source`; returns `false` if already open
    pub fn begin(&mut self, source: ScrollSource) -> bool {
        let entry = self.entry_mut(source);
        if entry.active {
            return false;
        }
        *entry = LedgerEntry {
            active: true,
            ..Default::default()
        };
        true
    }

    /// Close the books for `source`, returning the totals if they were open
    pub fn end(&mut self, source: ScrollSource) -> Option<ScrollConsumption> {
        let entry = self.entry_mut(source);
        if !entry.active {
            return None;
        }
        let totals = entry.consumption;
        *entry = LedgerEntry::default();
        Some(totals)
    }

    pub fn is_active(&self, source: ScrollSource) -> bool {
        self.entry(source).active
    }

    /// Record that a descendant region started a nested scroll
    pub fn accept_descendant(&mut self, source: ScrollSource, region: RegionId) {
        self.begin(source);
        self.entry_mut(source).descendant = Some(region);
    }

    /// Descendant that owns the nested scroll of `source`, if any
    pub fn descendant(&self, source: ScrollSource) -> Option<RegionId> {
        self.entry(source).descendant
    }

    /// Whether any descendant-driven nested scroll is in progress
    pub fn has_descendant(&self) -> bool {
        self.touch.descendant.is_some() || self.non_touch.descendant.is_some()
    }

    pub fn consumption(&self, source: ScrollSource) -> ScrollConsumption {
        self.entry(source).consumption
    }

    /// Update the running totals of an open entry
    pub fn record(&mut self, source: ScrollSource, update: impl FnOnce(&mut ScrollConsumption)) {
        let entry = self.entry_mut(source);
        if entry.active {
            update(&mut entry.consumption);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_refuses_everything() {
        let mut parent = Detached;
        assert!(!parent.on_nested_scroll_started(ScrollSource::Touch));
        assert_eq!(parent.offer_pre_scroll(40, ScrollSource::Touch), 0);
        assert_eq!(parent.report_unconsumed_scroll(10, 30, ScrollSource::NonTouch), 0);
        assert!(!parent.offer_pre_fling(2000));
        assert!(!parent.report_fling(2000, true));
    }

    #[test]
    fn test_books_per_source() {
        let mut ledger = NestedScrollLedger::new();
        assert!(ledger.begin(ScrollSource::Touch));
        assert!(!ledger.begin(ScrollSource::Touch));
        assert!(!ledger.is_active(ScrollSource::NonTouch));

        ledger.record(ScrollSource::Touch, |c| {
            c.requested += 100;
            c.ancestor_pre += 10;
            c.by_self += 60;
        });
        // Closed books ignore records
        ledger.record(ScrollSource::NonTouch, |c| c.requested += 999);

        let totals = ledger.end(ScrollSource::Touch).unwrap();
        assert_eq!(totals.unconsumed(), 30);
        assert!(ledger.end(ScrollSource::Touch).is_none());
        assert_eq!(ledger.consumption(ScrollSource::NonTouch), ScrollConsumption::default());
    }

    #[test]
    fn test_descendant_tracking() {
        let mut ledger = NestedScrollLedger::new();
        ledger.accept_descendant(ScrollSource::Touch, RegionId(7));
        assert!(ledger.is_active(ScrollSource::Touch));
        assert!(ledger.has_descendant());
        assert_eq!(ledger.descendant(ScrollSource::Touch), Some(RegionId(7)));

        ledger.end(ScrollSource::Touch);
        assert!(!ledger.has_descendant());
    }
}
