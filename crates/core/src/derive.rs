//! Derivation and classification of vital signs.
//!
//! Every derived value is a pure function of the raw observation fields it depends on.
//! Nothing here is cached: callers re-run [`derive_and_classify`] whenever raw values change
//! and store the result alongside the observation.

use crate::config::CoreConfig;
use crate::constants::{DISPLAY_TIMESTAMP_FORMAT, NEW_VITAL_SIGNS_LABEL};
use crate::observation::VitalSignsObservation;
use serde::{Deserialize, Serialize};

// ============================================================================
// Categories
// ============================================================================

/// Blood pressure category.
///
/// Thresholds follow the AHA adult guideline and are applied in order of severity, first
/// match wins (see [`bp_category`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BpCategory {
    Normal,
    Elevated,
    Stage1,
    Stage2,
    Crisis,
}

impl BpCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            BpCategory::Normal => "normal",
            BpCategory::Elevated => "elevated",
            BpCategory::Stage1 => "stage1",
            BpCategory::Stage2 => "stage2",
            BpCategory::Crisis => "crisis",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BpCategory::Normal => "Normal",
            BpCategory::Elevated => "Elevated",
            BpCategory::Stage1 => "Stage 1 Hypertension",
            BpCategory::Stage2 => "Stage 2 Hypertension",
            BpCategory::Crisis => "Hypertensive Crisis",
        }
    }
}

/// Body mass index category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    #[serde(rename = "obese_class1")]
    ObeseClass1,
    #[serde(rename = "obese_class2")]
    ObeseClass2,
    #[serde(rename = "obese_class3")]
    ObeseClass3,
}

impl BmiCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::ObeseClass1 => "obese_class1",
            BmiCategory::ObeseClass2 => "obese_class2",
            BmiCategory::ObeseClass3 => "obese_class3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight (<18.5)",
            BmiCategory::Normal => "Normal (18.5-24.9)",
            BmiCategory::Overweight => "Overweight (25.0-29.9)",
            BmiCategory::ObeseClass1 => "Obese Class I (30.0-34.9)",
            BmiCategory::ObeseClass2 => "Obese Class II (35.0-39.9)",
            BmiCategory::ObeseClass3 => "Obese Class III (≥40.0)",
        }
    }
}

// ============================================================================
// Derived values
// ============================================================================

/// Values computed from one observation.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedVitals {
    /// `"{systolic}/{diastolic}"`, or empty when either is missing.
    pub blood_pressure_display: String,
    pub bp_category: Option<BpCategory>,
    /// Zero when no temperature was recorded.
    pub temperature_f: f64,
    /// Zero when weight or height is missing.
    pub bmi: f64,
    pub bmi_category: Option<BmiCategory>,
    pub display_name: String,
}

impl DerivedVitals {
    /// Fahrenheit temperature at the one-decimal precision it is displayed with.
    pub fn temperature_f_display(&self) -> f64 {
        round_to_tenth(self.temperature_f)
    }

    /// BMI at the one-decimal precision it is displayed with.
    pub fn bmi_display(&self) -> f64 {
        round_to_tenth(self.bmi)
    }
}

/// Derive and classify every computed value of `obs`, using the standard placeholder label.
pub fn derive_and_classify(obs: &VitalSignsObservation) -> DerivedVitals {
    derive_with_placeholder(obs, NEW_VITAL_SIGNS_LABEL)
}

/// Same as [`derive_and_classify`], with the placeholder label taken from `config`.
pub fn derive_and_classify_with(
    obs: &VitalSignsObservation,
    config: &CoreConfig,
) -> DerivedVitals {
    derive_with_placeholder(obs, config.new_record_label())
}

fn derive_with_placeholder(obs: &VitalSignsObservation, placeholder: &str) -> DerivedVitals {
    let systolic = obs.systolic_bp();
    let diastolic = obs.diastolic_bp();
    let bmi = body_mass_index(obs.weight_kg(), obs.height_cm());

    let derived = DerivedVitals {
        blood_pressure_display: blood_pressure_display(systolic, diastolic),
        bp_category: bp_category(systolic, diastolic),
        temperature_f: obs.temperature_c().map_or(0.0, celsius_to_fahrenheit),
        bmi,
        bmi_category: bmi_category(bmi),
        display_name: display_name(obs, placeholder),
    };

    tracing::debug!(
        "derived vital signs for {}: bp={:?} bmi={:.1}",
        obs.id,
        derived.bp_category,
        derived.bmi
    );

    derived
}

/// Format a blood pressure pair, or return an empty string if either side is missing.
pub fn blood_pressure_display(systolic: Option<i32>, diastolic: Option<i32>) -> String {
    match (systolic, diastolic) {
        (Some(s), Some(d)) => format!("{s}/{d}"),
        _ => String::new(),
    }
}

/// Classify a blood pressure pair.
///
/// Rules are tried from most to least severe and the first match wins:
///
/// | Category | Rule |
/// |---|---|
/// | crisis   | systolic ≥ 180 or diastolic ≥ 120 |
/// | stage2   | systolic ≥ 140 or diastolic ≥ 90  |
/// | stage1   | systolic ≥ 130 or diastolic ≥ 80  |
/// | elevated | systolic ≥ 120 and diastolic < 80 |
/// | normal   | anything else |
///
/// Returns `None` if either value is missing.
pub fn bp_category(systolic: Option<i32>, diastolic: Option<i32>) -> Option<BpCategory> {
    let (s, d) = (systolic?, diastolic?);

    let category = if s >= 180 || d >= 120 {
        BpCategory::Crisis
    } else if s >= 140 || d >= 90 {
        BpCategory::Stage2
    } else if s >= 130 || d >= 80 {
        BpCategory::Stage1
    } else if s >= 120 && d < 80 {
        BpCategory::Elevated
    } else {
        BpCategory::Normal
    };

    Some(category)
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Body mass index in kg/m², or `0.0` when weight or height is missing or height is not
/// positive.
pub fn body_mass_index(weight_kg: Option<f64>, height_cm: Option<f64>) -> f64 {
    match (weight_kg, height_cm) {
        (Some(weight), Some(height)) if height > 0.0 => {
            let height_m = height / 100.0;
            weight / (height_m * height_m)
        }
        _ => 0.0,
    }
}

/// Classify a BMI value. `0.0` means "not computed" and yields `None`, as does a
/// non-finite value.
pub fn bmi_category(bmi: f64) -> Option<BmiCategory> {
    if bmi == 0.0 || !bmi.is_finite() {
        return None;
    }

    let category = if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else if bmi < 35.0 {
        BmiCategory::ObeseClass1
    } else if bmi < 40.0 {
        BmiCategory::ObeseClass2
    } else {
        BmiCategory::ObeseClass3
    };

    Some(category)
}

fn display_name(obs: &VitalSignsObservation, placeholder: &str) -> String {
    match (&obs.patient, obs.visit_at) {
        (Some(patient), Some(visit_at)) => format!(
            "{} - {}",
            patient.display_label(),
            visit_at.format(DISPLAY_TIMESTAMP_FORMAT)
        ),
        _ => placeholder.to_string(),
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
