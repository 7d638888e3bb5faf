//! Vital-signs evaluator.
//!
//! Bundles derivation and validation behind one configured service, the way a host calls
//! them: derive on every field change, evaluate before committing.

use crate::config::CoreConfig;
use crate::derive::{derive_and_classify_with, DerivedVitals};
use crate::observation::VitalSignsObservation;
use crate::validation::{validate_with, Rejection};
use crate::CoreResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// An observation together with the values derived from it.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluatedVitalSigns {
    pub observation: VitalSignsObservation,
    pub derived: DerivedVitals,
}

/// Configured entry point for derivation and validation.
#[derive(Clone, Debug, Default)]
pub struct VitalSignsEvaluator {
    cfg: Arc<CoreConfig>,
}

impl VitalSignsEvaluator {
    /// Creates a new evaluator sharing `cfg`.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Compute every derived value of `obs`. Never fails.
    pub fn derive(&self, obs: &VitalSignsObservation) -> DerivedVitals {
        derive_and_classify_with(obs, &self.cfg)
    }

    /// Run every validation rule against `obs`.
    ///
    /// # Arguments
    ///
    /// * `obs` - Observation to check.
    /// * `now` - Evaluation time; visits after it are rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] listing every violation found.
    pub fn validate(
        &self,
        obs: &VitalSignsObservation,
        now: DateTime<Utc>,
    ) -> Result<(), Rejection> {
        validate_with(obs, self.cfg.limits(), now)
    }

    /// Derive and validate `obs`, consuming it.
    ///
    /// # Returns
    ///
    /// Returns the annotated observation when no rule is violated.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Rejected`](crate::CoreError::Rejected) carrying all violations.
    pub fn evaluate(
        &self,
        observation: VitalSignsObservation,
        now: DateTime<Utc>,
    ) -> CoreResult<EvaluatedVitalSigns> {
        let derived = self.derive(&observation);
        self.validate(&observation, now)?;

        tracing::info!("accepted vital signs {}", derived.display_name);

        Ok(EvaluatedVitalSigns {
            observation,
            derived,
        })
    }

    /// Derive without validating, for drafts that are still being edited.
    pub fn annotate(&self, observation: VitalSignsObservation) -> EvaluatedVitalSigns {
        let derived = self.derive(&observation);
        EvaluatedVitalSigns {
            observation,
            derived,
        }
    }
}
