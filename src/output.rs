//! FASTA dump, lab order sheet and JSON report for a finished run.

use crate::{
    error::TilingError,
    parameters::TilingParameters,
    tiling::{PrimerPairRecord, TilingRun, TilingState},
};
use serde::Serialize;
use std::{fmt::Write as _, io::Write};

pub fn fasta_dump(run: &TilingRun) -> String {
    let mut ret = String::new();
    for record in &run.records {
        let _ = write!(
            ret,
            ">{name}_fwd\n{fwd}\n>{name}_rev\n{rev}\n",
            name = record.name,
            fwd = record.pair.forward,
            rev = record.pair.reverse
        );
    }
    ret
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Sequence")]
    pub sequence: String,
    #[serde(rename = "Scale")]
    pub scale: String,
    #[serde(rename = "Purification")]
    pub purification: String,
}

pub fn order_sheet(run: &TilingRun, params: &TilingParameters) -> Vec<OrderLine> {
    let line = |name: String, sequence: &str| OrderLine {
        name,
        sequence: sequence.to_string(),
        scale: params.order_scale.clone(),
        purification: params.order_purification.clone(),
    };
    run.records
        .iter()
        .flat_map(|r| {
            [
                line(format!("Forward Primer {}", r.index), &r.pair.forward),
                line(format!("Reverse Primer {}", r.index), &r.pair.reverse),
            ]
        })
        .collect()
}

pub fn write_order_sheet_csv<W: Write>(lines: &[OrderLine], writer: W) -> Result<(), TilingError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for line in lines {
        csv_writer.serialize(line)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub template_length: usize,
    pub pair_count: usize,
    pub pairs_overlapping_without_insert: Vec<&'a str>,
    pub state: &'a TilingState,
    pub records: &'a [PrimerPairRecord],
    pub warnings: &'a [String],
}

impl<'a> RunReport<'a> {
    pub fn new(run: &'a TilingRun) -> Self {
        Self {
            template_length: run.template_length,
            pair_count: run.records.len(),
            pairs_overlapping_without_insert: run
                .records
                .iter()
                .filter(|r| r.overlaps_without_insert())
                .map(|r| r.name.as_str())
                .collect(),
            state: &run.state,
            records: &run.records,
            warnings: &run.warnings,
        }
    }

    pub fn to_json(&self) -> Result<String, TilingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
