//! The tiling loop: plan a window, design a pair, check it against the
//! exclusion zones, bridge with overhangs if possible, record, advance.

use crate::{
    error::TilingError,
    exclusion::{ExclusionZone, ExclusionZoneSet},
    overhang::Overhangs,
    parameters::TilingParameters,
    primer_engine::{PrimerDesignError, PrimerEngine, PrimerPair},
    window::{ConstraintCarry, Window, WindowConstraints, WindowPlan, WindowPlanner},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// Less template is left after `position` than the minimum product needs.
    InsufficientSequence {
        position: usize,
        remaining: usize,
        min_product_size: usize,
    },
    NoPrimerFound {
        primer_index: usize,
        message: String,
    },
    /// The last pair would not move the cursor forward.
    NoProgress { cursor: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TilingState {
    Scanning,
    Halted(HaltReason),
    Completed,
}

impl TilingState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Scanning)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimerPairRecord {
    pub name: String,
    pub index: usize,
    /// The pair as ordered, overhangs included.
    pub pair: PrimerPair,
    pub window: Window,
    pub overlapping_zone: Option<ExclusionZone>,
    pub overhangs_added: bool,
}

impl PrimerPairRecord {
    /// A pair sitting in an exclusion zone with nothing to bridge it.
    pub fn overlaps_without_insert(&self) -> bool {
        self.overlapping_zone.is_some() && !self.overhangs_added
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilingRun {
    pub template_length: usize,
    pub records: Vec<PrimerPairRecord>,
    pub state: TilingState,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
}

pub struct TilingDriver<'a, E: PrimerEngine> {
    template: &'a [u8],
    zones: &'a ExclusionZoneSet,
    engine: &'a E,
    params: &'a TilingParameters,
    overhangs: Option<Overhangs>,
    cursor: usize,
    carried: WindowConstraints,
    state: TilingState,
    records: Vec<PrimerPairRecord>,
    warnings: Vec<String>,
    messages: Vec<String>,
}

impl<'a, E: PrimerEngine> TilingDriver<'a, E> {
    pub fn new(
        template: &'a [u8],
        zones: &'a ExclusionZoneSet,
        engine: &'a E,
        params: &'a TilingParameters,
        insert: Option<&[u8]>,
    ) -> Result<Self, TilingError> {
        if template.is_empty() {
            return Err(TilingError::invalid_input("Template sequence is empty"));
        }
        params.validate()?;
        zones.validate_against_length(template.len())?;
        let overhangs = insert
            .map(|insert| Overhangs::from_insert(insert, params.flank))
            .transpose()?;
        Ok(Self {
            template,
            zones,
            engine,
            params,
            overhangs,
            cursor: 0,
            carried: params.default_window_constraints(),
            state: TilingState::Scanning,
            records: vec![],
            warnings: vec![],
            messages: vec![],
        })
    }

    /// Runs one iteration. Once a terminal state is reached this is a no-op.
    pub fn step(&mut self) -> &TilingState {
        if self.state.is_terminal() {
            return &self.state;
        }
        if self.cursor >= self.template.len() {
            self.state = TilingState::Completed;
            return &self.state;
        }

        let window = match self.plan() {
            WindowPlan::Window(window) => window,
            WindowPlan::InsufficientSequence {
                seq_start,
                included_length,
                min_product_size,
            } => {
                self.state = if self.reaches_template_end() {
                    self.messages
                        .push("Tiling reached the end of the template.".to_string());
                    TilingState::Completed
                } else {
                    self.messages.push(format!(
                        "Remaining sequence too short (<{min_product_size}bp) at position {seq_start}. Stopping."
                    ));
                    TilingState::Halted(HaltReason::InsufficientSequence {
                        position: seq_start,
                        remaining: included_length,
                        min_product_size,
                    })
                };
                return &self.state;
            }
        };
        self.carried = window.constraints();

        let index = self.records.len() + 1;
        let designed = match self
            .engine
            .design(self.template, &window, &self.params.primer)
        {
            Ok(pair) => pair,
            Err(PrimerDesignError::NoPrimerFound(message)) => {
                self.messages.push(format!(
                    "Primer {index}: Primer design failed or no primer found. Stopping."
                ));
                self.state = TilingState::Halted(HaltReason::NoPrimerFound {
                    primer_index: index,
                    message,
                });
                return &self.state;
            }
        };

        let overlapping_zone = self
            .zones
            .zone_containing(designed.left_pos)
            .or_else(|| self.zones.zone_containing(designed.right_pos))
            .copied();
        let (pair, overhangs_added) = match (overlapping_zone, &self.overhangs) {
            (Some(zone), Some(overhangs)) => {
                self.messages.push(format!(
                    "Primer {index}: Overlaps exclusion zone {zone}, overhangs added."
                ));
                (overhangs.augment(&designed), true)
            }
            (Some(zone), None) => {
                self.warnings.push(format!(
                    "Primer {index}: Overlaps exclusion zone {zone} but no insert sequence provided."
                ));
                (designed, false)
            }
            (None, _) => {
                self.messages.push(format!(
                    "Primer {index}: {} / {} at {}",
                    designed.forward, designed.reverse, designed.right_pos
                ));
                (designed, false)
            }
        };

        let next = self.next_cursor(&window, &pair);
        self.records.push(PrimerPairRecord {
            name: format!("primer_pair_{index}"),
            index,
            pair,
            window,
            overlapping_zone,
            overhangs_added,
        });

        if next <= self.cursor {
            self.warnings.push(format!(
                "Primer {index}: cursor would not advance past {}. Stopping.",
                self.cursor
            ));
            self.state = TilingState::Halted(HaltReason::NoProgress {
                cursor: self.cursor,
            });
            return &self.state;
        }
        self.cursor = next;
        if self.cursor >= self.template.len() {
            self.state = TilingState::Completed;
        }
        &self.state
    }

    pub fn run(mut self) -> TilingRun {
        while !self.step().is_terminal() {}
        TilingRun {
            template_length: self.template.len(),
            records: self.records,
            state: self.state,
            warnings: self.warnings,
            messages: self.messages,
        }
    }

    fn plan(&self) -> WindowPlan {
        let prior = match self.params.constraint_carry {
            ConstraintCarry::CarryForward => self.carried,
            ConstraintCarry::ResetEachWindow => self.params.default_window_constraints(),
        };
        WindowPlanner::new(
            self.zones,
            self.template.len(),
            self.params.overlap,
            self.params.size_range_max,
        )
        .plan(self.cursor, prior)
    }

    /// Backtracks from the right primer. A product that runs right up to the
    /// zone it was clamped against counts as having reached that zone.
    fn next_cursor(&self, window: &Window, pair: &PrimerPair) -> usize {
        let overlap = self.params.overlap;
        let next = pair.right_pos.saturating_sub(overlap);
        match (window.blocking_zone, window.force_right_end) {
            (Some(zone), Some(end)) if pair.right_pos >= end => {
                next.max(zone.start.saturating_sub(overlap))
            }
            _ => next,
        }
    }

    fn reaches_template_end(&self) -> bool {
        self.records
            .last()
            .is_some_and(|r| r.pair.right_pos.saturating_add(1) >= self.template.len())
    }
}
