//! Plans the search window for one primer-design call.
//!
//! Planning is a pure function of the cursor, the exclusion zones and the
//! constraints handed over from the previous window. Nothing is remembered
//! between calls; the tiling driver decides what "previous" means through
//! [`ConstraintCarry`].

use crate::exclusion::{ExclusionZone, ExclusionZoneSet};
use serde::{Deserialize, Serialize};

/// What the next window inherits from the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstraintCarry {
    /// The shrunk minimum product size and forced right end of a window are
    /// the starting point for the next one.
    #[default]
    CarryForward,
    /// Every window starts again from the configured defaults.
    ResetEachWindow,
}

/// The two constraints that may be tightened near an exclusion zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConstraints {
    pub min_product_size: usize,
    pub force_right_end: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub seq_start: usize,
    pub included_length: usize,
    pub force_left_start: usize,
    pub force_right_end: Option<usize>,
    pub min_product_size: usize,
    pub max_product_size: usize,
    /// The zone whose far end the start was snapped to.
    pub snapped_past: Option<ExclusionZone>,
    /// The zone the product was clamped to end before.
    pub blocking_zone: Option<ExclusionZone>,
}

impl Window {
    pub fn constraints(&self) -> WindowConstraints {
        WindowConstraints {
            min_product_size: self.min_product_size,
            force_right_end: self.force_right_end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPlan {
    Window(Window),
    InsufficientSequence {
        seq_start: usize,
        included_length: usize,
        min_product_size: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct WindowPlanner<'a> {
    zones: &'a ExclusionZoneSet,
    template_len: usize,
    overlap: usize,
    max_product_size: usize,
}

impl<'a> WindowPlanner<'a> {
    pub fn new(
        zones: &'a ExclusionZoneSet,
        template_len: usize,
        overlap: usize,
        max_product_size: usize,
    ) -> Self {
        Self {
            zones,
            template_len,
            overlap,
            max_product_size,
        }
    }

    pub fn plan(&self, cursor: usize, prior: WindowConstraints) -> WindowPlan {
        let (seq_start, snapped_past) = self.seq_start(cursor);
        let (constraints, blocking_zone) = self.clamp_before_zone(seq_start, prior);

        let included_length = self.template_len.saturating_sub(seq_start);
        if included_length < constraints.min_product_size {
            return WindowPlan::InsufficientSequence {
                seq_start,
                included_length,
                min_product_size: constraints.min_product_size,
            };
        }

        WindowPlan::Window(Window {
            seq_start,
            included_length,
            force_left_start: seq_start,
            force_right_end: constraints.force_right_end,
            min_product_size: constraints.min_product_size,
            max_product_size: self.max_product_size,
            snapped_past,
            blocking_zone,
        })
    }

    /// Backtracks by the overlap, unless the cursor sits in or just before a
    /// zone, in which case the search restarts at the zone's end.
    fn seq_start(&self, cursor: usize) -> (usize, Option<ExclusionZone>) {
        match self
            .zones
            .iter()
            .find(|z| z.start.saturating_sub(self.overlap) <= cursor && cursor < z.end)
        {
            Some(zone) => (zone.end, Some(*zone)),
            None => (cursor.saturating_sub(self.overlap), None),
        }
    }

    /// Makes the product end right before the next zone when the minimum
    /// product would otherwise run into it.
    fn clamp_before_zone(
        &self,
        seq_start: usize,
        prior: WindowConstraints,
    ) -> (WindowConstraints, Option<ExclusionZone>) {
        let min_end = seq_start.saturating_add(prior.min_product_size);
        match self
            .zones
            .iter()
            .find(|z| seq_start < z.start && min_end > z.start)
        {
            Some(zone) => (
                WindowConstraints {
                    min_product_size: zone.start - seq_start,
                    force_right_end: Some(zone.start - 1),
                },
                Some(*zone),
            ),
            None => (prior, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: WindowConstraints = WindowConstraints {
        min_product_size: 4500,
        force_right_end: None,
    };

    fn zones(list: &[(usize, usize)]) -> ExclusionZoneSet {
        ExclusionZoneSet::new(
            list.iter()
                .map(|&(s, e)| ExclusionZone::new(s, e).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn expect_window(plan: WindowPlan) -> Window {
        match plan {
            WindowPlan::Window(w) => w,
            other => panic!("expected a window, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_backtrack_without_zones() {
        let set = ExclusionZoneSet::default();
        let planner = WindowPlanner::new(&set, 20_000, 65, 6000);
        let w = expect_window(planner.plan(0, DEFAULTS));
        assert_eq!(w.seq_start, 0);
        assert_eq!(w.included_length, 20_000);
        assert_eq!(w.force_left_start, 0);
        assert_eq!(w.force_right_end, None);
        assert_eq!(w.min_product_size, 4500);
        assert_eq!(w.max_product_size, 6000);

        let w = expect_window(planner.plan(5000, DEFAULTS));
        assert_eq!(w.seq_start, 4935);
        assert_eq!(w.included_length, 20_000 - 4935);
    }

    #[test]
    fn test_snap_past_zone() {
        let set = zones(&[(4000, 4100)]);
        let planner = WindowPlanner::new(&set, 20_000, 65, 6000);
        for cursor in [3935, 4000, 4099] {
            let w = expect_window(planner.plan(cursor, DEFAULTS));
            assert_eq!(w.seq_start, 4100, "cursor {cursor}");
            assert_eq!(w.snapped_past, set.iter().next().copied());
        }
        let w = expect_window(planner.plan(3934, DEFAULTS));
        assert_ne!(w.seq_start, 4100);
        let w = expect_window(planner.plan(4100, DEFAULTS));
        assert_eq!(w.seq_start, 4035);
        assert_eq!(w.snapped_past, None);
    }

    #[test]
    fn test_zone_near_template_start() {
        let set = zones(&[(10, 50)]);
        let planner = WindowPlanner::new(&set, 20_000, 65, 6000);
        let w = expect_window(planner.plan(0, DEFAULTS));
        assert_eq!(w.seq_start, 50);
    }

    #[test]
    fn test_clamp_before_zone() {
        let set = zones(&[(4000, 4100)]);
        let planner = WindowPlanner::new(&set, 20_000, 65, 6000);
        let w = expect_window(planner.plan(0, DEFAULTS));
        assert_eq!(w.seq_start, 0);
        assert_eq!(w.force_right_end, Some(3999));
        assert_eq!(w.min_product_size, 4000);
        assert_eq!(w.blocking_zone, set.iter().next().copied());
    }

    #[test]
    fn test_first_zone_ahead_wins() {
        let set = zones(&[(3000, 3100), (4000, 4100)]);
        let planner = WindowPlanner::new(&set, 20_000, 65, 6000);
        let w = expect_window(planner.plan(0, DEFAULTS));
        assert_eq!(w.force_right_end, Some(2999));
        assert_eq!(w.min_product_size, 3000);
    }

    #[test]
    fn test_zone_far_ahead_keeps_prior_constraints() {
        let set = zones(&[(15_000, 15_100)]);
        let planner = WindowPlanner::new(&set, 20_000, 65, 6000);
        let prior = WindowConstraints {
            min_product_size: 131,
            force_right_end: Some(3999),
        };
        let w = expect_window(planner.plan(5000, prior));
        assert_eq!(w.constraints(), prior);
        assert_eq!(w.blocking_zone, None);
    }

    #[test]
    fn test_insufficient_sequence() {
        let set = ExclusionZoneSet::default();
        let planner = WindowPlanner::new(&set, 10_000, 65, 6000);
        assert_eq!(
            planner.plan(9000, DEFAULTS),
            WindowPlan::InsufficientSequence {
                seq_start: 8935,
                included_length: 1065,
                min_product_size: 4500,
            }
        );
        // Exactly the minimum is still enough.
        assert!(matches!(planner.plan(5565, DEFAULTS), WindowPlan::Window(_)));
    }
}
