//! Plausibility and consistency validation.
//!
//! Validation never stops at the first problem: every rule runs and every violation is
//! returned together, in rule order, so a form can show all of them at once.

use crate::config::{PlausibilityLimits, Range};
use crate::observation::VitalSignsObservation;
use chrono::{DateTime, Utc};

/// Observation field a violation refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VitalField {
    Patient,
    VisitAt,
    RecordedBy,
    SystolicBp,
    DiastolicBp,
    HeartRate,
    Temperature,
    RespiratoryRate,
    OxygenSaturation,
    Weight,
    Height,
}

impl VitalField {
    pub fn as_str(self) -> &'static str {
        match self {
            VitalField::Patient => "patient",
            VitalField::VisitAt => "visit_at",
            VitalField::RecordedBy => "recorded_by",
            VitalField::SystolicBp => "systolic_bp",
            VitalField::DiastolicBp => "diastolic_bp",
            VitalField::HeartRate => "heart_rate",
            VitalField::Temperature => "temperature",
            VitalField::RespiratoryRate => "respiratory_rate",
            VitalField::OxygenSaturation => "oxygen_saturation",
            VitalField::Weight => "weight",
            VitalField::Height => "height",
        }
    }
}

impl std::fmt::Display for VitalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationViolation {
    pub field: VitalField,
    /// Second field involved in a cross-field rule.
    pub related: Option<VitalField>,
    pub message: String,
}

impl ValidationViolation {
    fn new(field: VitalField, message: impl Into<String>) -> Self {
        Self {
            field,
            related: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A rejected observation and every reason it was rejected. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    violations: Vec<ValidationViolation>,
}

impl Rejection {
    pub fn violations(&self) -> &[ValidationViolation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<ValidationViolation> {
        self.violations
    }

    /// Whether any violation concerns `field`, as primary or related field.
    pub fn concerns(&self, field: VitalField) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field || v.related == Some(field))
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "observation rejected with {} violation(s)", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "; {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Rejection {}

/// Validate `obs` against the default clinical limits, with `now` as the evaluation time.
///
/// # Errors
///
/// Returns a [`Rejection`] holding every violation found.
pub fn validate(obs: &VitalSignsObservation, now: DateTime<Utc>) -> Result<(), Rejection> {
    validate_with(obs, &PlausibilityLimits::default(), now)
}

/// Validate `obs` against `limits`, with `now` as the evaluation time.
///
/// # Errors
///
/// Returns a [`Rejection`] holding every violation found.
pub fn validate_with(
    obs: &VitalSignsObservation,
    limits: &PlausibilityLimits,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    let violations = collect_violations(obs, limits, now);
    if violations.is_empty() {
        Ok(())
    } else {
        tracing::warn!(
            "vital signs {} rejected with {} violation(s)",
            obs.id,
            violations.len()
        );
        Err(Rejection { violations })
    }
}

fn collect_violations(
    obs: &VitalSignsObservation,
    limits: &PlausibilityLimits,
    now: DateTime<Utc>,
) -> Vec<ValidationViolation> {
    let mut violations = Vec::new();

    if obs.patient.is_none() {
        violations.push(ValidationViolation::new(
            VitalField::Patient,
            "Patient is required.",
        ));
    }
    if obs.recorded_by.is_none() {
        violations.push(ValidationViolation::new(
            VitalField::RecordedBy,
            "Recorded by is required.",
        ));
    }

    let systolic = obs.systolic_bp();
    let diastolic = obs.diastolic_bp();

    check_range(
        &mut violations,
        VitalField::SystolicBp,
        systolic.map(f64::from),
        &limits.systolic_bp,
        |r| {
            format!(
                "Systolic blood pressure must be between {} and {} mmHg.",
                whole(r.min),
                whole(r.max)
            )
        },
    );
    check_range(
        &mut violations,
        VitalField::DiastolicBp,
        diastolic.map(f64::from),
        &limits.diastolic_bp,
        |r| {
            format!(
                "Diastolic blood pressure must be between {} and {} mmHg.",
                whole(r.min),
                whole(r.max)
            )
        },
    );
    if let (Some(s), Some(d)) = (systolic, diastolic) {
        if s <= d {
            violations.push(ValidationViolation {
                field: VitalField::SystolicBp,
                related: Some(VitalField::DiastolicBp),
                message: "Systolic blood pressure must be higher than diastolic blood pressure."
                    .into(),
            });
        }
    }

    check_range(
        &mut violations,
        VitalField::HeartRate,
        obs.heart_rate().map(f64::from),
        &limits.heart_rate,
        |r| {
            format!(
                "Heart rate must be between {} and {} bpm.",
                whole(r.min),
                whole(r.max)
            )
        },
    );
    check_range(
        &mut violations,
        VitalField::Temperature,
        obs.temperature_c(),
        &limits.temperature_c,
        |r| format!("Temperature must be between {:.1} and {:.1}°C.", r.min, r.max),
    );
    check_range(
        &mut violations,
        VitalField::RespiratoryRate,
        obs.respiratory_rate().map(f64::from),
        &limits.respiratory_rate,
        |r| {
            format!(
                "Respiratory rate must be between {} and {} breaths per minute.",
                whole(r.min),
                whole(r.max)
            )
        },
    );
    check_range(
        &mut violations,
        VitalField::OxygenSaturation,
        obs.oxygen_saturation_pct(),
        &limits.oxygen_saturation_pct,
        |r| {
            format!(
                "Oxygen saturation must be between {:.1} and {:.1}%.",
                r.min, r.max
            )
        },
    );
    check_range(
        &mut violations,
        VitalField::Weight,
        obs.weight_kg(),
        &limits.weight_kg,
        |r| format!("Weight must be between {:.1} and {:.1} kg.", r.min, r.max),
    );
    check_range(
        &mut violations,
        VitalField::Height,
        obs.height_cm(),
        &limits.height_cm,
        |r| format!("Height must be between {:.1} and {:.1} cm.", r.min, r.max),
    );

    match obs.visit_at {
        Some(visit_at) if visit_at > now => violations.push(ValidationViolation::new(
            VitalField::VisitAt,
            "Visit date and time cannot be in the future.",
        )),
        Some(_) => {}
        None => violations.push(ValidationViolation::new(
            VitalField::VisitAt,
            "Visit date and time is required.",
        )),
    }

    violations
}

fn check_range(
    violations: &mut Vec<ValidationViolation>,
    field: VitalField,
    value: Option<f64>,
    range: &Range,
    message: impl FnOnce(&Range) -> String,
) {
    if let Some(value) = value {
        if !range.contains(value) {
            violations.push(ValidationViolation::new(field, message(range)));
        }
    }
}

/// Render an integer-valued limit without a fractional part.
fn whole(bound: f64) -> String {
    format!("{bound:.0}")
}
