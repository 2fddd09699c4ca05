//! Exclusion zones: inclusive `[start, end]` intervals primers must not land inside.

use crate::error::{ErrorCode, TilingError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    io::{BufRead, Write},
    str::FromStr,
    sync::LazyLock,
};

static ZONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*:\s*(\d+)\s*$").expect("zone pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExclusionZone {
    pub start: usize,
    pub end: usize,
}

impl ExclusionZone {
    pub fn new(start: usize, end: usize) -> Result<Self, TilingError> {
        if start > end {
            return Err(TilingError::new(
                ErrorCode::MalformedExclusionInput,
                format!("Exclusion zone start {start} lies after its end {end}"),
            ));
        }
        Ok(Self { start, end })
    }

    #[inline(always)]
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }
}

impl fmt::Display for ExclusionZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for ExclusionZone {
    type Err = TilingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            TilingError::new(
                ErrorCode::MalformedExclusionInput,
                format!("Invalid exclusion zone '{s}', use start:end (e.g. 100:500)"),
            )
        };
        let caps = ZONE_PATTERN.captures(s).ok_or_else(malformed)?;
        let start = caps[1].parse::<usize>().map_err(|_| malformed())?;
        let end = caps[2].parse::<usize>().map_err(|_| malformed())?;
        Self::new(start, end)
    }
}

/// Disjoint zones, kept in ascending `start` order so every lookup
/// scans them in the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionZoneSet {
    zones: Vec<ExclusionZone>,
}

impl ExclusionZoneSet {
    pub fn new(mut zones: Vec<ExclusionZone>) -> Result<Self, TilingError> {
        zones.sort_by_key(|z| (z.start, z.end));
        for pair in zones.windows(2) {
            if pair[1].start <= pair[0].end {
                return Err(TilingError::invalid_input(format!(
                    "Exclusion zones {} and {} overlap",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self { zones })
    }

    /// Parses `start:end` entries, keeping the good ones and handing back
    /// each rejected entry together with the reason.
    pub fn parse_entries<'a, I>(entries: I) -> (Vec<ExclusionZone>, Vec<TilingError>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut accepted = vec![];
        let mut rejected = vec![];
        for entry in entries {
            match entry.parse::<ExclusionZone>() {
                Ok(zone) => accepted.push(zone),
                Err(e) => rejected.push(e),
            }
        }
        (accepted, rejected)
    }

    /// Collects zones line by line until `done` or end of input. A malformed
    /// line is reported on `output` and the user is asked again.
    pub fn prompt_zones<R: BufRead, W: Write>(
        input: R,
        mut output: W,
    ) -> Result<Vec<ExclusionZone>, TilingError> {
        writeln!(
            output,
            "Enter exclusion zones as start:end (e.g., 34263:36284). Enter 'done' when finished."
        )?;
        let mut zones = vec![];
        let mut lines = input.lines();
        loop {
            write!(output, "Exclusion zone: ")?;
            output.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let line = line.trim();
            if line.eq_ignore_ascii_case("done") {
                break;
            }
            if line.is_empty() {
                continue;
            }
            match line.parse::<ExclusionZone>() {
                Ok(zone) => zones.push(zone),
                Err(e) => writeln!(output, "{}", e.message)?,
            }
        }
        Ok(zones)
    }

    pub fn validate_against_length(&self, length: usize) -> Result<(), TilingError> {
        match self.zones.iter().find(|z| z.end > length) {
            Some(zone) => Err(TilingError::invalid_input(format!(
                "Exclusion zone {zone} extends past the template end ({length} bp)"
            ))),
            None => Ok(()),
        }
    }

    pub fn zone_containing(&self, pos: usize) -> Option<&ExclusionZone> {
        self.zones.iter().find(|z| z.contains(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExclusionZone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl fmt::Display for ExclusionZoneSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.zones.is_empty() {
            return write!(f, "None");
        }
        let parts: Vec<String> = self.zones.iter().map(|z| z.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(start: usize, end: usize) -> ExclusionZone {
        ExclusionZone::new(start, end).unwrap()
    }

    #[test]
    fn test_parse_zone() {
        assert_eq!("34263:36284".parse::<ExclusionZone>().unwrap(), zone(34263, 36284));
        assert_eq!(" 10 : 20 ".parse::<ExclusionZone>().unwrap(), zone(10, 20));
    }

    #[test]
    fn test_parse_zone_malformed() {
        for text in ["", "100", "100-500", "a:b", "-5:10", "1:2:3", "500:100"] {
            let err = text.parse::<ExclusionZone>().unwrap_err();
            assert_eq!(err.code, ErrorCode::MalformedExclusionInput, "{text}");
        }
    }

    #[test]
    fn test_parse_entries_rejects_individually() {
        let (accepted, rejected) =
            ExclusionZoneSet::parse_entries(["100:200", "oops", "300:400"]);
        assert_eq!(accepted, vec![zone(100, 200), zone(300, 400)]);
        assert_eq!(rejected.len(), 1);
        assert!(rejected[0].message.contains("oops"));
    }

    #[test]
    fn test_set_is_sorted() {
        let set = ExclusionZoneSet::new(vec![zone(500, 600), zone(100, 200)]).unwrap();
        let starts: Vec<usize> = set.iter().map(|z| z.start).collect();
        assert_eq!(starts, vec![100, 500]);
        assert_eq!(set.to_string(), "100:200, 500:600");
    }

    #[test]
    fn test_overlapping_zones_rejected() {
        let err = ExclusionZoneSet::new(vec![zone(100, 200), zone(200, 300)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(ExclusionZoneSet::new(vec![zone(100, 200), zone(150, 160)]).is_err());
        assert!(ExclusionZoneSet::new(vec![zone(100, 200), zone(201, 300)]).is_ok());
    }

    #[test]
    fn test_zone_containing_is_inclusive() {
        let set = ExclusionZoneSet::new(vec![zone(4000, 4100)]).unwrap();
        assert!(set.zone_containing(3999).is_none());
        assert_eq!(set.zone_containing(4000), Some(&zone(4000, 4100)));
        assert_eq!(set.zone_containing(4100), Some(&zone(4000, 4100)));
        assert!(set.zone_containing(4101).is_none());
    }

    #[test]
    fn test_validate_against_length() {
        let set = ExclusionZoneSet::new(vec![zone(10, 120)]).unwrap();
        assert!(set.validate_against_length(120).is_ok());
        assert!(set.validate_against_length(100).is_err());
    }

    #[test]
    fn test_prompt_zones_reprompts_on_malformed_line() {
        let input = b"100:200\nnonsense\n\n300:400\ndone\n500:600\n";
        let mut output = Vec::new();
        let zones = ExclusionZoneSet::prompt_zones(&input[..], &mut output).unwrap();
        assert_eq!(zones, vec![zone(100, 200), zone(300, 400)]);
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Invalid exclusion zone 'nonsense'"));
        assert_eq!(output.matches("Exclusion zone: ").count(), 5);
    }

    #[test]
    fn test_prompt_zones_stops_at_eof() {
        let zones = ExclusionZoneSet::prompt_zones(&b"1:2"[..], Vec::new()).unwrap();
        assert_eq!(zones, vec![zone(1, 2)]);
    }
}
