//! Generation errors

use thiserror::Error;

/// A tree that cannot be rendered as valid Apex
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    #[error("Malformed {construct}: {reason}")]
    Structural {
        construct: &'static str,
        reason: String,
    },
}

impl GenerateError {
    pub fn structural(construct: &'static str, reason: impl Into<String>) -> Self {
        GenerateError::Structural {
            construct,
            reason: reason.into(),
        }
    }
}

pub type GenerateResult<T> = Result<T, GenerateError>;
