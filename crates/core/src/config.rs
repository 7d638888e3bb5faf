//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the evaluator. The binary reads environment variables and files; the library
//! never does, so evaluations behave the same in every host and test harness.

use crate::constants::NEW_VITAL_SIGNS_LABEL;
use crate::{CoreError, CoreResult};

/// Inclusive plausibility range for one measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Create a range, rejecting non-finite bounds and `min > max`.
    pub fn new(min: f64, max: f64) -> CoreResult<Self> {
        let range = Self { min, max };
        range.check("range")?;
        Ok(range)
    }

    /// Whether `value` lies within the range, bounds included.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, name: &str) -> CoreResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(CoreError::InvalidConfig(format!(
                "{name} bounds must be finite numbers"
            )));
        }
        if self.min > self.max {
            return Err(CoreError::InvalidConfig(format!(
                "{name} minimum {} exceeds maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Clinical plausibility ranges applied by validation.
///
/// The [`Default`] table is the one clinics use; overrides are meant for research
/// deployments with unusual populations.
#[derive(Clone, Debug, PartialEq)]
pub struct PlausibilityLimits {
    pub systolic_bp: Range,
    pub diastolic_bp: Range,
    pub heart_rate: Range,
    pub temperature_c: Range,
    pub respiratory_rate: Range,
    pub oxygen_saturation_pct: Range,
    pub weight_kg: Range,
    pub height_cm: Range,
}

impl Default for PlausibilityLimits {
    fn default() -> Self {
        Self {
            systolic_bp: Range { min: 60.0, max: 300.0 },
            diastolic_bp: Range { min: 30.0, max: 200.0 },
            heart_rate: Range { min: 30.0, max: 200.0 },
            temperature_c: Range { min: 30.0, max: 45.0 },
            respiratory_rate: Range { min: 5.0, max: 60.0 },
            oxygen_saturation_pct: Range { min: 70.0, max: 100.0 },
            weight_kg: Range { min: 0.5, max: 500.0 },
            height_cm: Range { min: 30.0, max: 250.0 },
        }
    }
}

impl PlausibilityLimits {
    /// Check every range for finite bounds and `min <= max`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] naming the first offending range.
    pub fn check(&self) -> CoreResult<()> {
        let named = [
            ("systolic_bp", &self.systolic_bp),
            ("diastolic_bp", &self.diastolic_bp),
            ("heart_rate", &self.heart_rate),
            ("temperature_c", &self.temperature_c),
            ("respiratory_rate", &self.respiratory_rate),
            ("oxygen_saturation_pct", &self.oxygen_saturation_pct),
            ("weight_kg", &self.weight_kg),
            ("height_cm", &self.height_cm),
        ];
        for (name, range) in named {
            range.check(name)?;
        }
        Ok(())
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    limits: PlausibilityLimits,
    new_record_label: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if any limit range is malformed or the
    /// placeholder label is blank.
    pub fn new(limits: PlausibilityLimits, new_record_label: String) -> CoreResult<Self> {
        limits.check()?;

        if new_record_label.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "new_record_label cannot be empty".into(),
            ));
        }

        Ok(Self {
            limits,
            new_record_label,
        })
    }

    /// Configuration with custom limits and the standard placeholder label.
    pub fn with_limits(limits: PlausibilityLimits) -> CoreResult<Self> {
        Self::new(limits, NEW_VITAL_SIGNS_LABEL.to_string())
    }

    pub fn limits(&self) -> &PlausibilityLimits {
        &self.limits
    }

    pub fn new_record_label(&self) -> &str {
        &self.new_record_label
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            limits: PlausibilityLimits::default(),
            new_record_label: NEW_VITAL_SIGNS_LABEL.to_string(),
        }
    }
}
