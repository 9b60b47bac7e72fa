//! Error types for the stitching pipeline

use thiserror::Error;

/// Errors that abort a run before the board is touched
#[derive(Debug, Error, PartialEq)]
pub enum StitchError {
    /// A parameter is not a number or is out of range
    #[error("invalid {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    /// The target net does not exist on the board
    #[error("net '{0}' not found on board")]
    NetNotFound(String),

    /// Keepout generation was asked for but no track is selected
    #[error("at least one track must be selected")]
    NoTracksSelected,
}

impl StitchError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        StitchError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}
