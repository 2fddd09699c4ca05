use crate::{
    error::{ErrorCode, TilingError},
    primer_engine::PrimerConstraints,
    window::{ConstraintCarry, WindowConstraints},
};
use serde::{Deserialize, Serialize};

/// Upper bound on the amplicon size, well beyond what long-range PCR produces.
pub const MAX_PRODUCT_SIZE: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilingParameters {
    /// Backtrack distance that makes neighbouring amplicons share sequence.
    pub overlap: usize,
    /// Length of each insert-derived overhang.
    pub flank: usize,
    pub size_range_min: usize,
    pub size_range_max: usize,
    pub constraint_carry: ConstraintCarry,
    pub primer: PrimerConstraints,
    pub order_scale: String,
    pub order_purification: String,
}

impl Default for TilingParameters {
    fn default() -> Self {
        Self {
            overlap: 65,
            flank: 20,
            size_range_min: 4500,
            size_range_max: 6000,
            constraint_carry: ConstraintCarry::default(),
            primer: PrimerConstraints::default(),
            order_scale: "25nm".to_string(),
            order_purification: "STD".to_string(),
        }
    }
}

impl TilingParameters {
    pub fn load_from_path(path: &str) -> Result<Self, TilingError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TilingError::new(
                ErrorCode::Io,
                format!("Could not read parameter file '{path}': {e}"),
            )
        })?;
        let ret: Self = serde_json::from_str(&text).map_err(|e| {
            TilingError::invalid_input(format!("Could not parse parameter JSON '{path}': {e}"))
        })?;
        ret.validate()?;
        Ok(ret)
    }

    pub fn save_to_path(&self, path: &str) -> Result<(), TilingError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|e| {
            TilingError::new(
                ErrorCode::Io,
                format!("Could not write parameter file '{path}': {e}"),
            )
        })
    }

    pub fn validate(&self) -> Result<(), TilingError> {
        if self.size_range_min > self.size_range_max {
            return Err(TilingError::invalid_input(format!(
                "size_range_min ({}) exceeds size_range_max ({})",
                self.size_range_min, self.size_range_max
            )));
        }
        if self.size_range_max > MAX_PRODUCT_SIZE {
            return Err(TilingError::invalid_input(format!(
                "size_range_max ({}) exceeds the supported maximum of {MAX_PRODUCT_SIZE}",
                self.size_range_max
            )));
        }
        if self.size_range_min <= self.overlap {
            return Err(TilingError::invalid_input(format!(
                "size_range_min ({}) must be larger than overlap ({})",
                self.size_range_min, self.overlap
            )));
        }
        let p = &self.primer;
        if p.min_size == 0 || p.min_size > p.max_size || p.max_size > self.size_range_min {
            return Err(TilingError::invalid_input(format!(
                "Invalid primer size range {}..={} for products of at least {}",
                p.min_size, p.max_size, self.size_range_min
            )));
        }
        Ok(())
    }

    /// Constraints every window starts from before any exclusion zone tightens them.
    pub fn default_window_constraints(&self) -> WindowConstraints {
        WindowConstraints {
            min_product_size: self.size_range_min,
            force_right_end: None,
        }
    }

    /// Sets a single parameter by name; returns a message describing the change.
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<String, TilingError> {
        let as_usize = |value: &serde_json::Value| {
            value.as_u64().map(|v| v as usize).ok_or_else(|| {
                TilingError::invalid_input(format!(
                    "Parameter '{name}' requires a non-negative integer"
                ))
            })
        };
        let mut updated = self.clone();
        match name {
            "overlap" => updated.overlap = as_usize(value)?,
            "flank" => updated.flank = as_usize(value)?,
            "size_range_min" => updated.size_range_min = as_usize(value)?,
            "size_range_max" => updated.size_range_max = as_usize(value)?,
            "constraint_carry" => {
                updated.constraint_carry = serde_json::from_value(value.clone())?;
            }
            "pick_anyway" => {
                updated.primer.pick_anyway = value.as_bool().ok_or_else(|| {
                    TilingError::invalid_input("Parameter 'pick_anyway' requires a boolean")
                })?;
            }
            _ => {
                return Err(TilingError::new(
                    ErrorCode::Unsupported,
                    format!("Unknown parameter '{name}'"),
                ));
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(format!("Set parameter '{name}' to {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = TilingParameters::default();
        assert_eq!(p.overlap, 65);
        assert_eq!(p.flank, 20);
        assert_eq!((p.size_range_min, p.size_range_max), (4500, 6000));
        assert_eq!(p.primer.opt_size, 24);
        assert!(p.primer.pick_anyway);
        assert_eq!(p.constraint_carry, ConstraintCarry::CarryForward);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let p: TilingParameters = serde_json::from_str(
            r#"{"size_range_min": 1000, "primer": {"opt_tm": 62.0}, "constraint_carry": "ResetEachWindow"}"#,
        )
        .unwrap();
        assert_eq!(p.size_range_min, 1000);
        assert_eq!(p.size_range_max, 6000);
        assert_eq!(p.primer.opt_tm, 62.0);
        assert_eq!(p.primer.min_tm, 55.0);
        assert_eq!(p.constraint_carry, ConstraintCarry::ResetEachWindow);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let path = path.to_string_lossy().to_string();
        let mut p = TilingParameters::default();
        p.flank = 30;
        p.save_to_path(&path).unwrap();
        assert_eq!(TilingParameters::load_from_path(&path).unwrap(), p);
    }

    #[test]
    fn test_load_rejects_invalid_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"size_range_min": 7000}"#).unwrap();
        let err = TilingParameters::load_from_path(&path.to_string_lossy()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_set_parameter() {
        let mut p = TilingParameters::default();
        let msg = p.set_parameter("flank", &serde_json::json!(25)).unwrap();
        assert!(msg.contains("flank"));
        assert_eq!(p.flank, 25);

        p.set_parameter("constraint_carry", &serde_json::json!("ResetEachWindow")).unwrap();
        assert_eq!(p.constraint_carry, ConstraintCarry::ResetEachWindow);

        let err = p.set_parameter("nope", &serde_json::json!(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unsupported);

        // Rejected changes leave the parameters untouched.
        assert!(p.set_parameter("size_range_min", &serde_json::json!(10)).is_err());
        assert_eq!(p.size_range_min, 4500);
        assert!(p.set_parameter("overlap", &serde_json::json!(-1)).is_err());
    }

    #[test]
    fn test_extreme_sizes_are_rejected() {
        let huge: TilingParameters =
            serde_json::from_str(r#"{"size_range_max": 18446744073709551615}"#).unwrap();
        assert_eq!(huge.validate().unwrap_err().code, ErrorCode::InvalidInput);

        let long_primer: TilingParameters =
            serde_json::from_str(r#"{"primer": {"max_size": 18446744073709551615}}"#).unwrap();
        assert_eq!(long_primer.validate().unwrap_err().code, ErrorCode::InvalidInput);

        let mut p = TilingParameters::default();
        assert!(p.set_parameter("size_range_max", &serde_json::json!(u64::MAX)).is_err());
        assert_eq!(p.size_range_max, 6000);
        p.set_parameter("size_range_max", &serde_json::json!(MAX_PRODUCT_SIZE)).unwrap();
        assert_eq!(p.size_range_max, MAX_PRODUCT_SIZE);
    }
}
