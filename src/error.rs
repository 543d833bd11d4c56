//! Error types.
//!
//! Every fallible operation in the crate returns [`StaffingError`]. Errors
//! fall into two categories (see [`ErrorKind`]): configuration problems
//! (unknown work types, malformed graph references, bad parameters or input
//! rows) and insufficient data for the similarity decomposition.
//!
//! Parse recovery (an unparsable day/shift defaulted to 0) is *not* an
//! error; it is reported through `tracing` and
//! [`RecoveryNote`](crate::input::RecoveryNote).

use thiserror::Error;

use crate::validation::{ValidationError, ValidationErrorKind};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, StaffingError>;

/// Errors raised by scoring, network construction, solving and input parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StaffingError {
    /// A work-type label or code is not in the vocabulary.
    #[error("unknown work type `{0}`")]
    UnknownWorkType(String),

    /// An edge or search referenced a node that is not in the network.
    #[error("node `{0}` is not in the network")]
    MissingNode(String),

    /// An edge capacity was negative or not finite.
    #[error("invalid capacity {capacity} on edge {from} -> {to}")]
    InvalidCapacity {
        from: String,
        to: String,
        capacity: f64,
    },

    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An input row could not be converted (row is 0-based, header excluded).
    #[error("malformed input at row {row}: {message}")]
    MalformedInput { row: usize, message: String },

    /// Too few distinct historical records for the decomposition.
    #[error(
        "insufficient data: need at least {required} distinct historical records, found {found}"
    )]
    InsufficientData { required: usize, found: usize },

    /// Pre-run validation found one or more problems.
    #[error("validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),
}

/// Broad error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied configuration or input is wrong.
    Configuration,
    /// The historical table cannot support the decomposition.
    InsufficientData,
}

impl StaffingError {
    /// Returns the error category.
    ///
    /// A `Validation` error is `InsufficientData` only when every collected
    /// problem is an insufficient-history problem.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::Validation(errors)
                if !errors.is_empty()
                    && errors
                        .iter()
                        .all(|e| e.kind == ValidationErrorKind::InsufficientHistory) =>
            {
                ErrorKind::InsufficientData
            }
            _ => ErrorKind::Configuration,
        }
    }

    /// Whether this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
