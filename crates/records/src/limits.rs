//! Plausibility limit table wire model.
//!
//! A limits file overrides some or all of the default clinical ranges:
//!
//! ```yaml
//! heart_rate:
//!   min: 40
//!   max: 220
//! ```
//!
//! Ranges not mentioned keep their defaults.

use crate::{parse_strict, RecordsError, RecordsResult};
use clinic_core::{PlausibilityLimits, Range};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Limit table operations.
///
/// This is a zero-sized type used for namespacing limit file operations.
/// All methods are associated functions.
pub struct LimitsFile;

impl LimitsFile {
    /// Parse a limit table from YAML text, layering it over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if the YAML does not match the schema or any resulting range
    /// is malformed (`min > max`, non-finite bounds).
    pub fn parse(yaml_text: &str) -> RecordsResult<PlausibilityLimits> {
        // An empty document means "no overrides".
        if yaml_text.trim().is_empty() {
            return Ok(PlausibilityLimits::default());
        }

        let wire: LimitsWire = parse_strict(yaml_text, "Limits")?;
        let limits = wire_to_domain(wire);
        limits.check()?;
        Ok(limits)
    }

    /// Read and parse a limit table file.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Io`] if the file cannot be read, otherwise as
    /// [`LimitsFile::parse`].
    pub fn read_file(path: &Path) -> RecordsResult<PlausibilityLimits> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Render the complete limit table as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if serialisation fails.
    pub fn render(limits: &PlausibilityLimits) -> RecordsResult<String> {
        Ok(serde_yaml::to_string(&domain_to_wire(limits))?)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct LimitsWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<RangeWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic_bp: Option<RangeWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<RangeWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<RangeWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<RangeWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation_pct: Option<RangeWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<RangeWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<RangeWire>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct RangeWire {
    pub min: f64,
    pub max: f64,
}

impl From<RangeWire> for Range {
    fn from(wire: RangeWire) -> Self {
        Range {
            min: wire.min,
            max: wire.max,
        }
    }
}

impl From<Range> for RangeWire {
    fn from(range: Range) -> Self {
        RangeWire {
            min: range.min,
            max: range.max,
        }
    }
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: LimitsWire) -> PlausibilityLimits {
    let defaults = PlausibilityLimits::default();
    let pick = |value: Option<RangeWire>, default: Range| value.map_or(default, Range::from);

    PlausibilityLimits {
        systolic_bp: pick(wire.systolic_bp, defaults.systolic_bp),
        diastolic_bp: pick(wire.diastolic_bp, defaults.diastolic_bp),
        heart_rate: pick(wire.heart_rate, defaults.heart_rate),
        temperature_c: pick(wire.temperature_c, defaults.temperature_c),
        respiratory_rate: pick(wire.respiratory_rate, defaults.respiratory_rate),
        oxygen_saturation_pct: pick(wire.oxygen_saturation_pct, defaults.oxygen_saturation_pct),
        weight_kg: pick(wire.weight_kg, defaults.weight_kg),
        height_cm: pick(wire.height_cm, defaults.height_cm),
    }
}

fn domain_to_wire(limits: &PlausibilityLimits) -> LimitsWire {
    LimitsWire {
        systolic_bp: Some(limits.systolic_bp.into()),
        diastolic_bp: Some(limits.diastolic_bp.into()),
        heart_rate: Some(limits.heart_rate.into()),
        temperature_c: Some(limits.temperature_c.into()),
        respiratory_rate: Some(limits.respiratory_rate.into()),
        oxygen_saturation_pct: Some(limits.oxygen_saturation_pct.into()),
        weight_kg: Some(limits.weight_kg.into()),
        height_cm: Some(limits.height_cm.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::CoreError;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let limits = LimitsFile::parse("").expect("empty is valid");
        assert_eq!(limits, PlausibilityLimits::default());
    }

    #[test]
    fn overrides_only_listed_ranges() {
        let input = "heart_rate:\n  min: 40\n  max: 220\n";
        let limits = LimitsFile::parse(input).expect("parse overrides");

        assert_eq!(limits.heart_rate, Range { min: 40.0, max: 220.0 });
        assert_eq!(limits.systolic_bp, PlausibilityLimits::default().systolic_bp);
    }

    #[test]
    fn round_trips_full_table() {
        let defaults = PlausibilityLimits::default();
        let output = LimitsFile::render(&defaults).expect("render limits");
        let reparsed = LimitsFile::parse(&output).expect("reparse limits");
        assert_eq!(reparsed, defaults);
    }

    #[test]
    fn strict_validation_rejects_unknown_keys() {
        let err = LimitsFile::parse("pulse_pressure:\n  min: 1\n  max: 2\n")
            .expect_err("should reject unknown key");
        match err {
            RecordsError::Translation(msg) => assert!(msg.contains("pulse_pressure")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_inverted_range() {
        let err = LimitsFile::parse("weight_kg:\n  min: 500\n  max: 0.5\n")
            .expect_err("should reject inverted range");
        match err {
            RecordsError::Core(CoreError::InvalidConfig(msg)) => assert!(msg.contains("weight_kg")),
            other => panic!("expected InvalidConfig error, got {other:?}"),
        }
    }

    #[test]
    fn reads_limits_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"temperature_c:\n  min: 25.0\n  max: 45.0\n")
            .expect("write limits");

        let limits = LimitsFile::read_file(file.path()).expect("read file");
        assert_eq!(limits.temperature_c.min, 25.0);
    }
}
