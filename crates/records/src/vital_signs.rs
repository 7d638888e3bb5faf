//! Vital-signs observation wire model and translation helpers.
//!
//! Responsibilities:
//! - Define a strict wire model for one observation
//! - Translate between the wire model and [`VitalSignsObservation`]
//! - Render evaluated observations with a `derived` section
//!
//! Notes:
//! - A `derived` section on input is accepted and discarded; derived values are always
//!   recomputed by the evaluator
//! - A missing `id` gets a fresh UUID

use crate::{parse_strict, RecordsError, RecordsResult};
use chrono::{DateTime, Utc};
use clinic_core::{
    BmiCategory, BpCategory, DerivedVitals, EvaluatedVitalSigns, HeartRhythm, OxygenSupport,
    PatientRef, TemperatureMethod, VisitType, VitalSignsObservation,
};
use clinic_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

// ============================================================================
// Public VitalSignsRecord operations
// ============================================================================

/// Vital-signs record operations.
///
/// This is a zero-sized type used for namespacing observation file operations.
/// All methods are associated functions.
pub struct VitalSignsRecord;

impl VitalSignsRecord {
    /// Parse an observation from YAML text.
    ///
    /// # Arguments
    ///
    /// * `yaml_text` - YAML text expected to represent one observation.
    ///
    /// # Returns
    ///
    /// Returns the raw [`VitalSignsObservation`]. Validation is left to the evaluator.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if:
    /// - the YAML does not match the wire schema (unknown keys, wrong types),
    /// - `id` is not a valid UUID,
    /// - `visit_at` is not an RFC 3339 timestamp,
    /// - a reference (`patient.id`, `recorded_by`, ...) is blank.
    pub fn parse(yaml_text: &str) -> RecordsResult<VitalSignsObservation> {
        let wire: VitalSignsWire = parse_strict(yaml_text, "Vital signs")?;
        wire_to_domain(wire)
    }

    /// Read and parse an observation file.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Io`] if the file cannot be read, otherwise as
    /// [`VitalSignsRecord::parse`].
    pub fn read_file(path: &Path) -> RecordsResult<VitalSignsObservation> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Render a raw observation as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if serialisation fails.
    pub fn render(observation: &VitalSignsObservation) -> RecordsResult<String> {
        let wire = domain_to_wire(observation);
        Ok(serde_yaml::to_string(&wire)?)
    }

    /// Render an evaluated observation, raw fields followed by a `derived` section.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if serialisation fails.
    pub fn render_evaluated(evaluated: &EvaluatedVitalSigns) -> RecordsResult<String> {
        let wire = EvaluatedWire {
            observation: domain_to_wire(&evaluated.observation),
            derived: derived_to_wire(&evaluated.derived),
        };
        Ok(serde_yaml::to_string(&wire)?)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of one observation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct VitalSignsWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientWire>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,

    #[serde(default)]
    pub visit_type: VisitType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_complaint: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub measurements: MeasurementsWire,

    #[serde(default, skip_serializing)]
    pub derived: Option<serde_yaml::Value>,
}

fn default_active() -> bool {
    true
}

/// Wire representation of a patient reference.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct PatientWire {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Wire representation of the recorded measurements.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct MeasurementsWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic_bp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i32>,
    #[serde(default)]
    pub heart_rhythm: HeartRhythm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub temperature_method: TemperatureMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation_pct: Option<f64>,
    #[serde(default)]
    pub on_oxygen_support: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen_flow_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_circumference_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist_circumference_cm: Option<f64>,
}

/// Output-only wrapper adding the derived section.
#[derive(Serialize)]
struct EvaluatedWire {
    #[serde(flatten)]
    pub observation: VitalSignsWire,
    pub derived: DerivedWire,
}

#[derive(Serialize)]
struct DerivedWire {
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub blood_pressure: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bp_category: Option<BpCategory>,
    pub temperature_f: f64,
    pub bmi: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi_category: Option<BmiCategory>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: VitalSignsWire) -> RecordsResult<VitalSignsObservation> {
    let mut obs = VitalSignsObservation::draft();

    if let Some(id) = wire.id {
        obs.id = Uuid::parse_str(&id)
            .map_err(|_| RecordsError::InvalidUuid(format!("Invalid UUID in id: {id}")))?;
    }

    obs.patient = wire.patient.map(patient_to_domain).transpose()?;
    obs.visit_at = wire.visit_at.as_deref().map(parse_visit_at).transpose()?;
    obs.recorded_by = wire
        .recorded_by
        .map(|user| reference("recorded_by", &user))
        .transpose()?;
    obs.visit_type = wire.visit_type;
    obs.main_complaint = wire
        .main_complaint
        .map(|complaint| reference("main_complaint", &complaint))
        .transpose()?;
    obs.active = wire.active;

    let m = wire.measurements;
    obs.systolic_bp = m.systolic_bp;
    obs.diastolic_bp = m.diastolic_bp;
    obs.heart_rate = m.heart_rate;
    obs.heart_rhythm = m.heart_rhythm;
    obs.temperature_c = m.temperature_c;
    obs.temperature_method = m.temperature_method;
    obs.respiratory_rate = m.respiratory_rate;
    obs.oxygen_saturation_pct = m.oxygen_saturation_pct;
    obs.oxygen = if m.on_oxygen_support {
        OxygenSupport::on(0.0)
    } else {
        OxygenSupport::off()
    };
    if let Some(rate) = m.oxygen_flow_rate {
        obs.oxygen.set_flow_rate(rate);
    }
    obs.weight_kg = m.weight_kg;
    obs.height_cm = m.height_cm;
    obs.mother_height_cm = m.mother_height_cm;
    obs.father_height_cm = m.father_height_cm;
    obs.head_circumference_cm = m.head_circumference_cm;
    obs.waist_circumference_cm = m.waist_circumference_cm;

    Ok(obs)
}

fn domain_to_wire(obs: &VitalSignsObservation) -> VitalSignsWire {
    let flow_rate = obs.oxygen.flow_rate_l_min();

    VitalSignsWire {
        id: Some(obs.id.to_string()),
        patient: obs.patient.as_ref().map(|p| PatientWire {
            id: p.id.to_string(),
            name: p.label.as_ref().map(ToString::to_string),
        }),
        visit_at: obs.visit_at.map(|dt| dt.to_rfc3339()),
        recorded_by: obs.recorded_by.as_ref().map(ToString::to_string),
        visit_type: obs.visit_type,
        main_complaint: obs.main_complaint.as_ref().map(ToString::to_string),
        active: obs.active,
        measurements: MeasurementsWire {
            systolic_bp: obs.systolic_bp,
            diastolic_bp: obs.diastolic_bp,
            heart_rate: obs.heart_rate,
            heart_rhythm: obs.heart_rhythm,
            temperature_c: obs.temperature_c,
            temperature_method: obs.temperature_method,
            respiratory_rate: obs.respiratory_rate,
            oxygen_saturation_pct: obs.oxygen_saturation_pct,
            on_oxygen_support: obs.oxygen.is_active(),
            oxygen_flow_rate: (flow_rate != 0.0).then_some(flow_rate),
            weight_kg: obs.weight_kg,
            height_cm: obs.height_cm,
            mother_height_cm: obs.mother_height_cm,
            father_height_cm: obs.father_height_cm,
            head_circumference_cm: obs.head_circumference_cm,
            waist_circumference_cm: obs.waist_circumference_cm,
        },
        derived: None,
    }
}

fn derived_to_wire(derived: &DerivedVitals) -> DerivedWire {
    DerivedWire {
        display_name: derived.display_name.clone(),
        blood_pressure: derived.blood_pressure_display.clone(),
        bp_category: derived.bp_category,
        temperature_f: derived.temperature_f_display(),
        bmi: derived.bmi_display(),
        bmi_category: derived.bmi_category,
    }
}

fn patient_to_domain(wire: PatientWire) -> RecordsResult<PatientRef> {
    let id = reference("patient.id", &wire.id)?;
    Ok(PatientRef {
        id,
        label: NonEmptyText::optional(wire.name),
    })
}

fn reference(field: &str, value: &str) -> RecordsResult<NonEmptyText> {
    NonEmptyText::new(value)
        .map_err(|e| RecordsError::InvalidInput(format!("Invalid {field}: {e}")))
}

fn parse_visit_at(value: &str) -> RecordsResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RecordsError::Translation(format!("Invalid visit_at '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clinic_core::VitalSignsEvaluator;
    use std::io::Write;

    const SAMPLE: &str = r#"id: "7f4c2e9d-4b0a-4f3a-9a2c-0e9a6b5d1c88"
patient:
  id: P-0042
  name: Jane Doe
visit_at: "2026-10-14T09:30:00Z"
recorded_by: nurse.adams
visit_type: followup
measurements:
  systolic_bp: 132
  diastolic_bp: 70
  heart_rate: 88
  heart_rhythm: irregular
  temperature_c: 37.0
  temperature_method: oral
  oxygen_saturation_pct: 94.5
  on_oxygen_support: true
  oxygen_flow_rate: 2.0
  weight_kg: 70.0
  height_cm: 175.0
"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn parses_sample_yaml() {
        let obs = VitalSignsRecord::parse(SAMPLE).expect("parse yaml");

        assert_eq!(obs.id.to_string(), "7f4c2e9d-4b0a-4f3a-9a2c-0e9a6b5d1c88");
        let patient = obs.patient.as_ref().expect("patient present");
        assert_eq!(patient.id.as_str(), "P-0042");
        assert_eq!(patient.display_label(), "Jane Doe");
        assert_eq!(obs.visit_type, VisitType::Followup);
        assert_eq!(obs.heart_rhythm, HeartRhythm::Irregular);
        assert_eq!(obs.temperature_method, TemperatureMethod::Oral);
        assert_eq!(obs.systolic_bp, Some(132));
        assert!(obs.oxygen.is_active());
        assert_eq!(obs.oxygen.flow_rate_l_min(), 2.0);
        assert!(obs.active);
    }

    #[test]
    fn round_trips_sample_yaml() {
        let obs = VitalSignsRecord::parse(SAMPLE).expect("parse yaml");
        let output = VitalSignsRecord::render(&obs).expect("render observation");
        let reparsed = VitalSignsRecord::parse(&output).expect("reparse yaml");
        assert_eq!(obs, reparsed);
    }

    #[test]
    fn minimal_record_uses_defaults() {
        let obs = VitalSignsRecord::parse("recorded_by: nurse.adams\n").expect("parse minimal");
        assert!(obs.patient.is_none());
        assert_eq!(obs.visit_type, VisitType::Regular);
        assert_eq!(obs.temperature_method, TemperatureMethod::Axillary);
        assert!(!obs.oxygen.is_active());
        assert!(obs.active);
    }

    #[test]
    fn strict_validation_rejects_unknown_keys() {
        let input = format!("{SAMPLE}unexpected_key: should_fail\n");
        let err = VitalSignsRecord::parse(&input).expect_err("should reject unknown key");
        match err {
            RecordsError::Translation(msg) => assert!(msg.contains("unexpected_key")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn strict_validation_rejects_wrong_types() {
        let input = SAMPLE.replace("heart_rate: 88", "heart_rate: fast");
        let err = VitalSignsRecord::parse(&input).expect_err("should reject wrong type");
        match err {
            RecordsError::Translation(msg) => assert!(msg.contains("measurements.heart_rate")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_id() {
        let input = SAMPLE.replace("7f4c2e9d-4b0a-4f3a-9a2c-0e9a6b5d1c88", "not-a-valid-uuid");
        let err = VitalSignsRecord::parse(&input).expect_err("should reject invalid id");
        match err {
            RecordsError::InvalidUuid(msg) => assert!(msg.contains("not-a-valid-uuid")),
            other => panic!("expected InvalidUuid error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_visit_at() {
        let input = SAMPLE.replace("2026-10-14T09:30:00Z", "yesterday");
        let err = VitalSignsRecord::parse(&input).expect_err("should reject bad timestamp");
        match err {
            RecordsError::Translation(msg) => assert!(msg.contains("visit_at")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_blank_patient_id() {
        let input = SAMPLE.replace("id: P-0042", "id: \"  \"");
        let err = VitalSignsRecord::parse(&input).expect_err("should reject blank patient");
        match err {
            RecordsError::InvalidInput(msg) => assert!(msg.contains("patient.id")),
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn offset_timestamps_are_normalised_to_utc() {
        let input = SAMPLE.replace("2026-10-14T09:30:00Z", "2026-10-14T11:30:00+02:00");
        let obs = VitalSignsRecord::parse(&input).expect("parse offset timestamp");
        let expected = Utc
            .with_ymd_and_hms(2026, 10, 14, 9, 30, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(obs.visit_at, Some(expected));
    }

    #[test]
    fn renders_derived_section_and_ignores_it_on_input() {
        let obs = VitalSignsRecord::parse(SAMPLE).expect("parse yaml");
        let evaluated = VitalSignsEvaluator::default()
            .evaluate(obs.clone(), now())
            .expect("plausible observation");

        let output = VitalSignsRecord::render_evaluated(&evaluated).expect("render evaluated");
        assert!(output.contains("derived:"));
        assert!(output.contains("Jane Doe - 2026-10-14 09:30"));
        assert!(output.contains("blood_pressure: 132/70"));
        assert!(output.contains("bp_category: stage1"));
        assert!(output.contains("temperature_f: 98.6"));
        assert!(output.contains("bmi: 22.9"));
        assert!(output.contains("bmi_category: normal"));

        let reparsed = VitalSignsRecord::parse(&output).expect("derived section is ignored");
        assert_eq!(reparsed, obs);
    }

    #[test]
    fn switched_off_oxygen_renders_without_flow_rate() {
        let mut obs = VitalSignsRecord::parse(SAMPLE).expect("parse yaml");
        obs.set_on_oxygen_support(false);

        let output = VitalSignsRecord::render(&obs).expect("render observation");
        assert!(output.contains("on_oxygen_support: false"));
        assert!(!output.contains("oxygen_flow_rate"));
    }

    #[test]
    fn reads_observation_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write sample");

        let obs = VitalSignsRecord::read_file(file.path()).expect("read file");
        assert_eq!(obs.systolic_bp, Some(132));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = VitalSignsRecord::read_file(&dir.path().join("absent.yaml"))
            .expect_err("missing file");
        assert!(matches!(err, RecordsError::Io(_)));
    }
}
