//! Raw vital-signs observation data.
//!
//! An observation is one encounter's worth of measurements for one patient. It holds only the
//! values a clinician records; everything computed from them lives in
//! [`DerivedVitals`](crate::derive::DerivedVitals).
//!
//! Notes:
//! - Hosts store an unset numeric field as zero, so a measurement of exactly zero is read as
//!   "not recorded" by every rule. The accessor methods (`systolic_bp()`, `weight_kg()`, ...)
//!   apply that rule; read those rather than the raw fields.
//! - Patient, recording user and complaint references are opaque tokens. The evaluator never
//!   resolves them.

use crate::constants::NO_OXYGEN_FLOW;
use chrono::{DateTime, Utc};
use clinic_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Selection types
// ============================================================================

/// Kind of clinical encounter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitType {
    #[default]
    Regular,
    Emergency,
    Followup,
    Consultation,
    Screening,
}

impl VisitType {
    pub fn as_str(self) -> &'static str {
        match self {
            VisitType::Regular => "regular",
            VisitType::Emergency => "emergency",
            VisitType::Followup => "followup",
            VisitType::Consultation => "consultation",
            VisitType::Screening => "screening",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VisitType::Regular => "Regular Visit",
            VisitType::Emergency => "Emergency",
            VisitType::Followup => "Follow-up",
            VisitType::Consultation => "Consultation",
            VisitType::Screening => "Health Screening",
        }
    }
}

/// Heart rhythm as observed by the clinician.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartRhythm {
    #[default]
    Regular,
    Irregular,
    Tachycardia,
    Bradycardia,
}

impl HeartRhythm {
    pub fn as_str(self) -> &'static str {
        match self {
            HeartRhythm::Regular => "regular",
            HeartRhythm::Irregular => "irregular",
            HeartRhythm::Tachycardia => "tachycardia",
            HeartRhythm::Bradycardia => "bradycardia",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HeartRhythm::Regular => "Regular",
            HeartRhythm::Irregular => "Irregular",
            HeartRhythm::Tachycardia => "Tachycardia",
            HeartRhythm::Bradycardia => "Bradycardia",
        }
    }
}

/// Site used to take the body temperature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureMethod {
    Oral,
    Rectal,
    #[default]
    Axillary,
    Tympanic,
    Temporal,
}

impl TemperatureMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            TemperatureMethod::Oral => "oral",
            TemperatureMethod::Rectal => "rectal",
            TemperatureMethod::Axillary => "axillary",
            TemperatureMethod::Tympanic => "tympanic",
            TemperatureMethod::Temporal => "temporal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemperatureMethod::Oral => "Oral",
            TemperatureMethod::Rectal => "Rectal",
            TemperatureMethod::Axillary => "Axillary",
            TemperatureMethod::Tympanic => "Tympanic",
            TemperatureMethod::Temporal => "Temporal",
        }
    }
}

// ============================================================================
// References
// ============================================================================

/// Opaque reference to the patient an observation belongs to.
///
/// `label` is whatever the host wants shown in display names (typically the patient's
/// name). When absent, the identifier itself is shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientRef {
    pub id: NonEmptyText,
    pub label: Option<NonEmptyText>,
}

impl PatientRef {
    pub fn new(id: NonEmptyText) -> Self {
        Self { id, label: None }
    }

    pub fn with_label(id: NonEmptyText, label: NonEmptyText) -> Self {
        Self {
            id,
            label: Some(label),
        }
    }

    /// Text used for this patient in display names.
    pub fn display_label(&self) -> &str {
        self.label.as_ref().unwrap_or(&self.id).as_str()
    }
}

// ============================================================================
// Oxygen support
// ============================================================================

/// Supplemental oxygen state.
///
/// The flow rate is kept private so that switching support off always clears it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OxygenSupport {
    active: bool,
    flow_rate_l_min: f64,
}

impl OxygenSupport {
    /// Patient on supplemental oxygen at `flow_rate_l_min` litres per minute.
    pub fn on(flow_rate_l_min: f64) -> Self {
        Self {
            active: true,
            flow_rate_l_min,
        }
    }

    /// Patient breathing room air.
    pub fn off() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn flow_rate_l_min(&self) -> f64 {
        self.flow_rate_l_min
    }

    /// Switch support on or off. Switching from on to off resets the flow rate to zero.
    pub fn set_active(&mut self, active: bool) {
        if self.active && !active {
            self.flow_rate_l_min = NO_OXYGEN_FLOW;
        }
        self.active = active;
    }

    /// Record a flow rate. Accepted regardless of the current support state; only the
    /// transition to "off" clears it.
    pub fn set_flow_rate(&mut self, flow_rate_l_min: f64) {
        self.flow_rate_l_min = flow_rate_l_min;
    }
}

// ============================================================================
// Observation
// ============================================================================

/// One encounter's raw vital-signs measurements for one patient.
#[derive(Clone, Debug, PartialEq)]
pub struct VitalSignsObservation {
    /// Identifier handed to host actions (prescription and print requests).
    pub id: Uuid,
    pub patient: Option<PatientRef>,
    pub visit_at: Option<DateTime<Utc>>,
    pub recorded_by: Option<NonEmptyText>,
    pub visit_type: VisitType,
    pub main_complaint: Option<NonEmptyText>,

    /// Systolic blood pressure (mmHg).
    pub systolic_bp: Option<i32>,
    /// Diastolic blood pressure (mmHg).
    pub diastolic_bp: Option<i32>,
    /// Heart rate (beats per minute).
    pub heart_rate: Option<i32>,
    pub heart_rhythm: HeartRhythm,
    /// Body temperature (degrees Celsius).
    pub temperature_c: Option<f64>,
    pub temperature_method: TemperatureMethod,
    /// Respiratory rate (breaths per minute).
    pub respiratory_rate: Option<i32>,
    /// SpO₂ (percent).
    pub oxygen_saturation_pct: Option<f64>,
    pub oxygen: OxygenSupport,

    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub mother_height_cm: Option<f64>,
    pub father_height_cm: Option<f64>,
    pub head_circumference_cm: Option<f64>,
    pub waist_circumference_cm: Option<f64>,

    /// Soft-delete flag. Owned by the host; the evaluator ignores it.
    pub active: bool,
}

impl VitalSignsObservation {
    /// Start an observation for a known patient, visit time and recording user.
    pub fn new(patient: PatientRef, visit_at: DateTime<Utc>, recorded_by: NonEmptyText) -> Self {
        Self {
            patient: Some(patient),
            visit_at: Some(visit_at),
            recorded_by: Some(recorded_by),
            ..Self::draft()
        }
    }

    /// An empty observation, as a host form holds it before anything is entered.
    pub fn draft() -> Self {
        Self {
            id: Uuid::new_v4(),
            patient: None,
            visit_at: None,
            recorded_by: None,
            visit_type: VisitType::default(),
            main_complaint: None,
            systolic_bp: None,
            diastolic_bp: None,
            heart_rate: None,
            heart_rhythm: HeartRhythm::default(),
            temperature_c: None,
            temperature_method: TemperatureMethod::default(),
            respiratory_rate: None,
            oxygen_saturation_pct: None,
            oxygen: OxygenSupport::off(),
            weight_kg: None,
            height_cm: None,
            mother_height_cm: None,
            father_height_cm: None,
            head_circumference_cm: None,
            waist_circumference_cm: None,
            active: true,
        }
    }

    /// Switch supplemental oxygen on or off; see [`OxygenSupport::set_active`].
    pub fn set_on_oxygen_support(&mut self, active: bool) {
        self.oxygen.set_active(active);
    }

    pub fn systolic_bp(&self) -> Option<i32> {
        recorded(self.systolic_bp)
    }

    pub fn diastolic_bp(&self) -> Option<i32> {
        recorded(self.diastolic_bp)
    }

    pub fn heart_rate(&self) -> Option<i32> {
        recorded(self.heart_rate)
    }

    pub fn temperature_c(&self) -> Option<f64> {
        recorded(self.temperature_c)
    }

    pub fn respiratory_rate(&self) -> Option<i32> {
        recorded(self.respiratory_rate)
    }

    pub fn oxygen_saturation_pct(&self) -> Option<f64> {
        recorded(self.oxygen_saturation_pct)
    }

    pub fn weight_kg(&self) -> Option<f64> {
        recorded(self.weight_kg)
    }

    pub fn height_cm(&self) -> Option<f64> {
        recorded(self.height_cm)
    }
}

/// Treat a stored zero as "not recorded".
fn recorded<T>(value: Option<T>) -> Option<T>
where
    T: Copy + Default + PartialEq,
{
    value.filter(|v| *v != T::default())
}
