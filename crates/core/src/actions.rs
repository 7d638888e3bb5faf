//! Requests handed back to the host.
//!
//! The evaluator does not create prescriptions or render documents. It only describes what
//! the host should open, pre-filled from the observation.

use crate::constants::{CREATE_PRESCRIPTION_TITLE, PRESCRIPTION_TARGET, VITAL_SIGNS_REPORT};
use crate::observation::{PatientRef, VitalSignsObservation};
use crate::{CoreError, CoreResult};
use uuid::Uuid;

/// Ask the host to open a new prescription form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrescriptionRequest {
    pub title: &'static str,
    pub target: &'static str,
    pub default_patient: String,
    pub default_vital_signs: Uuid,
}

/// Ask the host's report renderer to print an observation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintRequest {
    pub report: &'static str,
    pub observation_id: Uuid,
    pub patient: String,
}

impl VitalSignsObservation {
    /// Build the "create prescription" request for this observation.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the observation has no patient yet.
    pub fn prescription_request(&self) -> CoreResult<PrescriptionRequest> {
        let patient = self.require_patient()?;
        Ok(PrescriptionRequest {
            title: CREATE_PRESCRIPTION_TITLE,
            target: PRESCRIPTION_TARGET,
            default_patient: patient.id.to_string(),
            default_vital_signs: self.id,
        })
    }

    /// Build the print request for this observation.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the observation has no patient yet.
    pub fn print_request(&self) -> CoreResult<PrintRequest> {
        let patient = self.require_patient()?;
        Ok(PrintRequest {
            report: VITAL_SIGNS_REPORT,
            observation_id: self.id,
            patient: patient.id.to_string(),
        })
    }

    fn require_patient(&self) -> CoreResult<&PatientRef> {
        self.patient.as_ref().ok_or_else(|| {
            CoreError::InvalidInput("observation has no patient".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use clinic_types::NonEmptyText;

    fn observation() -> VitalSignsObservation {
        VitalSignsObservation::new(
            PatientRef::with_label(
                NonEmptyText::new("P-0042").expect("id"),
                NonEmptyText::new("Jane Doe").expect("label"),
            ),
            Utc::now(),
            NonEmptyText::new("dr.khan").expect("user"),
        )
    }

    #[test]
    fn prescription_request_prefills_patient_and_observation() {
        let obs = observation();
        let request = obs.prescription_request().expect("patient present");

        assert_eq!(request.title, "Create Prescription");
        assert_eq!(request.target, "medical.prescription");
        assert_eq!(request.default_patient, "P-0042");
        assert_eq!(request.default_vital_signs, obs.id);
    }

    #[test]
    fn print_request_targets_vital_signs_report() {
        let obs = observation();
        let request = obs.print_request().expect("patient present");

        assert_eq!(request.report, "clinic.vital_signs");
        assert_eq!(request.observation_id, obs.id);
        assert_eq!(request.patient, "P-0042");
    }

    #[test]
    fn requests_need_a_patient() {
        let draft = VitalSignsObservation::draft();
        match draft.prescription_request() {
            Err(CoreError::InvalidInput(msg)) => assert!(msg.contains("patient")),
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
        assert!(draft.print_request().is_err());
    }
}
