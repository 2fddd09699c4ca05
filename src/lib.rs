//! Tiles a template sequence into overlapping PCR amplicons for sequential
//! assembly, keeping primers out of exclusion zones and bridging them with
//! insert-derived overhangs where they cannot be avoided.

pub mod dna_sequence;
pub mod error;
pub mod exclusion;
pub mod output;
pub mod overhang;
pub mod parameters;
pub mod primer_engine;
pub mod tiling;
pub mod window;
