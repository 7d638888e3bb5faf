//! YAML wire support for clinic vital-signs records.
//!
//! This crate provides **wire models** and **format/translation helpers** for the files hosts
//! and operators exchange with the evaluator:
//! - vital-signs observations, optionally annotated with their derived values
//! - plausibility limit tables
//!
//! This crate focuses on:
//! - strict serialisation/deserialisation (`deny_unknown_fields`, failing paths reported)
//! - translation between `clinic-core` domain types and wire structs
//!
//! Clinical rules live in `clinic-core`; nothing here derives or validates measurements.

pub mod limits;
pub mod vital_signs;

// Re-export facades
pub use limits::LimitsFile;
pub use vital_signs::VitalSignsRecord;

/// Errors returned by the `clinic-records` crate.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    #[error(transparent)]
    Core(#[from] clinic_core::CoreError),
}

/// Type alias for Results that can fail with a [`RecordsError`].
pub type RecordsResult<T> = Result<T, RecordsError>;

/// Deserialize `yaml_text`, reporting the failing path on schema mismatch.
fn parse_strict<T>(yaml_text: &str, what: &str) -> RecordsResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

    match serde_path_to_error::deserialize::<_, T>(deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(RecordsError::Translation(format!(
                "{what} schema mismatch at {path}: {source}"
            )))
        }
    }
}
