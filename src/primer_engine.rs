//! The primer-design contract used by the tiling loop, and a built-in
//! engine that satisfies it.

use crate::window::Window;
use bio::alphabets::dna;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Penalty added to a candidate that violates a hard constraint but is kept
/// because `pick_anyway` is set.
const RELAXED_PENALTY: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimerConstraints {
    pub opt_size: usize,
    pub min_size: usize,
    pub max_size: usize,
    pub opt_tm: f64,
    pub min_tm: f64,
    pub max_tm: f64,
    pub min_gc: f64,
    pub max_gc: f64,
    pub pick_anyway: bool,
}

impl Default for PrimerConstraints {
    fn default() -> Self {
        Self {
            opt_size: 24,
            min_size: 18,
            max_size: 35,
            opt_tm: 60.0,
            min_tm: 55.0,
            max_tm: 65.0,
            min_gc: 40.0,
            max_gc: 60.0,
            pick_anyway: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimerPair {
    pub forward: String,
    pub reverse: String,
    /// 0-based position of the forward primer's 5' base.
    pub left_pos: usize,
    /// 0-based position of the reverse primer's 5' base, on the forward strand.
    pub right_pos: usize,
}

impl PrimerPair {
    pub fn product_size(&self) -> usize {
        self.right_pos + 1 - self.left_pos
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimerDesignError {
    NoPrimerFound(String),
}

impl fmt::Display for PrimerDesignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPrimerFound(message) => write!(f, "No primer found: {message}"),
        }
    }
}

impl Error for PrimerDesignError {}

/// A black-box primer-pair optimizer. Every call is independent of the ones before it.
pub trait PrimerEngine {
    fn design(
        &self,
        template: &[u8],
        window: &Window,
        constraints: &PrimerConstraints,
    ) -> Result<PrimerPair, PrimerDesignError>;
}

/// Melting temperature in °C: Wallace rule for short oligos, GC-content formula otherwise.
pub fn melting_temperature(oligo: &[u8]) -> f64 {
    let gc = oligo.iter().filter(|&&c| c == b'G' || c == b'C').count() as f64;
    let at = oligo.iter().filter(|&&c| c == b'A' || c == b'T').count() as f64;
    if oligo.len() < 14 {
        2.0 * at + 4.0 * gc
    } else {
        64.9 + 41.0 * (gc - 16.4) / oligo.len() as f64
    }
}

pub fn gc_percent(oligo: &[u8]) -> f64 {
    if oligo.is_empty() {
        return 0.0;
    }
    let gc = oligo.iter().filter(|&&c| c == b'G' || c == b'C').count() as f64;
    100.0 * gc / oligo.len() as f64
}

#[derive(Debug, Clone)]
struct Candidate {
    oligo: Vec<u8>,
    penalty: f64,
}

/// Scans every legal primer length at the forced ends, or every product size in
/// range when the right end is free, and keeps the lowest-penalty pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPrimerEngine;

impl HeuristicPrimerEngine {
    pub fn new() -> Self {
        Self
    }

    fn penalty(oligo: &[u8], c: &PrimerConstraints) -> Option<f64> {
        let tm = melting_temperature(oligo);
        let gc = gc_percent(oligo);
        let mut penalty = (oligo.len() as f64 - c.opt_size as f64).abs() + (tm - c.opt_tm).abs();
        let violates = tm < c.min_tm
            || tm > c.max_tm
            || gc < c.min_gc
            || gc > c.max_gc
            || oligo.contains(&b'N');
        if violates {
            if !c.pick_anyway {
                return None;
            }
            penalty += RELAXED_PENALTY;
        }
        Some(penalty)
    }

    fn best_of(candidates: impl Iterator<Item = Candidate>) -> Option<Candidate> {
        candidates.fold(None, |best: Option<Candidate>, cand| match best {
            Some(b) if b.penalty <= cand.penalty => Some(b),
            _ => Some(cand),
        })
    }

    fn best_forward(
        template: &[u8],
        left: usize,
        region_end: usize,
        c: &PrimerConstraints,
    ) -> Option<Candidate> {
        let longest = c.max_size.min(region_end.saturating_sub(left));
        Self::best_of((c.min_size..=longest).filter_map(|len| {
            let oligo = template.get(left..left + len)?;
            Some(Candidate {
                penalty: Self::penalty(oligo, c)?,
                oligo: oligo.to_vec(),
            })
        }))
    }

    fn best_reverse(
        template: &[u8],
        left: usize,
        right: usize,
        c: &PrimerConstraints,
    ) -> Option<Candidate> {
        let longest = c.max_size.min((right + 1).saturating_sub(left));
        Self::best_of((c.min_size..=longest).filter_map(|len| {
            let oligo = dna::revcomp(template.get(right + 1 - len..=right)?);
            Some(Candidate {
                penalty: Self::penalty(&oligo, c)?,
                oligo,
            })
        }))
    }
}

impl PrimerEngine for HeuristicPrimerEngine {
    fn design(
        &self,
        template: &[u8],
        window: &Window,
        constraints: &PrimerConstraints,
    ) -> Result<PrimerPair, PrimerDesignError> {
        let region_end = window
            .seq_start
            .saturating_add(window.included_length)
            .min(template.len());
        let left = window.force_left_start;
        if left >= region_end || window.min_product_size > window.max_product_size {
            return Err(PrimerDesignError::NoPrimerFound(format!(
                "empty search window at {left}"
            )));
        }

        let forward = Self::best_forward(template, left, region_end, constraints)
            .ok_or_else(|| {
                PrimerDesignError::NoPrimerFound(format!("no forward primer at {left}"))
            })?;

        let min_right = left.saturating_add(window.min_product_size.max(1) - 1);
        let max_right = left
            .saturating_add(window.max_product_size)
            .saturating_sub(1)
            .min(region_end - 1);
        let rights: Vec<usize> = match window.force_right_end {
            Some(r) if r >= min_right && r <= max_right => vec![r],
            Some(r) => {
                return Err(PrimerDesignError::NoPrimerFound(format!(
                    "forced right end {r} is outside the product range {min_right}..={max_right}"
                )));
            }
            None => (min_right..=max_right).collect(),
        };

        let mut best: Option<(usize, Candidate)> = None;
        for right in rights {
            let Some(cand) = Self::best_reverse(template, left, right, constraints) else {
                continue;
            };
            if best.as_ref().is_none_or(|(_, b)| cand.penalty < b.penalty) {
                best = Some((right, cand));
            }
        }
        let (right_pos, reverse) = best.ok_or_else(|| {
            PrimerDesignError::NoPrimerFound(format!(
                "no reverse primer between {min_right} and {max_right}"
            ))
        })?;

        Ok(PrimerPair {
            forward: String::from_utf8_lossy(&forward.oligo).to_string(),
            reverse: String::from_utf8_lossy(&reverse.oligo).to_string(),
            left_pos: left,
            right_pos,
        })
    }
}
