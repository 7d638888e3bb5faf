//! Constants used throughout the clinic core crate.
//!
//! Display formats and the names of host-side targets live here so the evaluator and the
//! action builders agree on them.

/// Display name used for observations that do not yet have a patient and visit time.
pub const NEW_VITAL_SIGNS_LABEL: &str = "New Vital Signs";

/// `chrono` format string for the visit timestamp inside a display name.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Title of the host action that opens a prescription form.
pub const CREATE_PRESCRIPTION_TITLE: &str = "Create Prescription";

/// Host record type receiving prescription requests.
pub const PRESCRIPTION_TARGET: &str = "medical.prescription";

/// Host report used to print a vital-signs observation.
pub const VITAL_SIGNS_REPORT: &str = "clinic.vital_signs";

/// Litres per minute recorded when supplemental oxygen is switched off.
pub const NO_OXYGEN_FLOW: f64 = 0.0;
