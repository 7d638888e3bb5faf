//! # Clinic Core
//!
//! Vital-signs derivation and validation for the clinic record system.
//!
//! This crate turns the raw measurements of one encounter into categorised, cross-checked
//! observations:
//! - derivation of display and secondary values (blood pressure string, Fahrenheit, BMI)
//! - classification (blood pressure category, BMI category)
//! - plausibility and consistency validation, reporting every violation at once
//!
//! **No host concerns**: persistence, access control, record numbering and report
//! rendering belong to the hosting application. The engine treats patient and user
//! references as opaque tokens and never resolves them.

pub mod actions;
pub mod config;
pub mod constants;
pub mod derive;
pub mod error;
pub mod evaluator;
pub mod observation;
pub mod validation;

pub use actions::{PrescriptionRequest, PrintRequest};
pub use config::{CoreConfig, PlausibilityLimits, Range};
pub use derive::{
    derive_and_classify, derive_and_classify_with, BmiCategory, BpCategory, DerivedVitals,
};
pub use error::{CoreError, CoreResult};
pub use evaluator::{EvaluatedVitalSigns, VitalSignsEvaluator};
pub use observation::{
    HeartRhythm, OxygenSupport, PatientRef, TemperatureMethod, VisitType, VitalSignsObservation,
};
pub use validation::{validate, validate_with, Rejection, ValidationViolation, VitalField};

pub use clinic_types::NonEmptyText;
