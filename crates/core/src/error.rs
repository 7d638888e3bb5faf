use crate::validation::Rejection;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{0}")]
    Rejected(Rejection),
}

impl From<clinic_types::TextError> for CoreError {
    fn from(err: clinic_types::TextError) -> Self {
        CoreError::InvalidInput(err.to_string())
    }
}

impl From<Rejection> for CoreError {
    fn from(rejection: Rejection) -> Self {
        CoreError::Rejected(rejection)
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
