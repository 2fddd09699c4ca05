use crate::{error::TilingError, primer_engine::PrimerPair};
use bio::alphabets::dna;
use serde::{Deserialize, Serialize};

/// Junction fragments taken from the ends of an insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overhangs {
    /// Reverse complement of the insert's first `flank` bases.
    pub start: String,
    /// The insert's last `flank` bases, as written.
    pub end: String,
}

impl Overhangs {
    pub fn from_insert(insert: &[u8], flank: usize) -> Result<Self, TilingError> {
        if flank > insert.len() {
            return Err(TilingError::invalid_input(format!(
                "Overhang length {flank} exceeds the insert length {}",
                insert.len()
            )));
        }
        let start = dna::revcomp(&insert[..flank]);
        let end = &insert[insert.len() - flank..];
        Ok(Self {
            start: String::from_utf8_lossy(&start).to_string(),
            end: String::from_utf8_lossy(end).to_string(),
        })
    }

    pub fn augment(&self, pair: &PrimerPair) -> PrimerPair {
        PrimerPair {
            forward: format!("{}{}", self.start, pair.forward),
            reverse: format!("{}{}", self.end, pair.reverse),
            ..pair.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overhangs_from_insert_ends() {
        let oh = Overhangs::from_insert(b"AACCGGTTTTGGGCCCAAAT", 4).unwrap();
        assert_eq!(oh.start, "GGTT");
        assert_eq!(oh.end, "AAAT");
    }

    #[test]
    fn test_full_length_and_empty_flank() {
        let oh = Overhangs::from_insert(b"ATGC", 4).unwrap();
        assert_eq!(oh.start, "GCAT");
        assert_eq!(oh.end, "ATGC");
        let oh = Overhangs::from_insert(b"ATGC", 0).unwrap();
        assert_eq!(oh.start, "");
        assert_eq!(oh.end, "");
    }

    #[test]
    fn test_flank_longer_than_insert() {
        assert!(Overhangs::from_insert(b"ATGC", 5).is_err());
    }

    #[test]
    fn test_augment_prefixes_both_primers() {
        let oh = Overhangs::from_insert(b"AAAACCCCGGGGTTTT", 4).unwrap();
        let pair = PrimerPair {
            forward: "GATTACA".to_string(),
            reverse: "CCTTAAG".to_string(),
            left_pos: 10,
            right_pos: 500,
        };
        let out = oh.augment(&pair);
        assert_eq!(out.forward, "TTTTGATTACA");
        assert_eq!(out.reverse, "TTTTCCTTAAG");
        assert_eq!((out.left_pos, out.right_pos), (10, 500));
    }
}
