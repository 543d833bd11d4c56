//! Input validation for staffing runs.
//!
//! Checks a run's inputs before any network is built. Detects:
//! - Open shifts whose work type is not in the vocabulary
//! - Historical tables too small for the similarity decomposition
//! - Out-of-range configuration parameters
//!
//! All problems are collected, not just the first.

use crate::config::StaffingConfig;
use crate::models::{HistoryTable, OpenShift, WorkTypeVocabulary};
use crate::similarity::MIN_RECORDS;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An open shift requests a work type outside the vocabulary.
    UnknownWorkType,
    /// Fewer distinct historical records than the decomposition needs.
    InsufficientHistory,
    /// Shift or weekly hours are not positive.
    InvalidCapacity,
    /// Another configuration parameter is out of range.
    InvalidParameter,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a staffing run.
///
/// Checks:
/// 1. `shift_hours` and `week_hours` are positive
/// 2. The remaining configuration parameters are in range
/// 3. The history has at least two distinct records
/// 4. Every open shift's work type is in the vocabulary
///
/// Records with a blank worker id pass; they still shape the similarity
/// basis and are dropped as candidates when the network is assembled.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(
    config: &StaffingConfig,
    vocabulary: &WorkTypeVocabulary,
    history: &HistoryTable,
    open_shifts: &[OpenShift],
) -> ValidationResult {
    let mut errors = Vec::new();

    for (name, hours) in [
        ("shift_hours", config.shift_hours),
        ("week_hours", config.week_hours),
    ] {
        if !(hours.is_finite() && hours > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCapacity,
                format!("{name} must be positive, got {hours}"),
            ));
        }
    }

    // Capacity problems are already reported above.
    if errors.is_empty() {
        if let Err(e) = config.validate() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                e.to_string(),
            ));
        }
    }

    if history.len() < MIN_RECORDS {
        errors.push(ValidationError::new(
            ValidationErrorKind::InsufficientHistory,
            format!(
                "need at least {MIN_RECORDS} distinct historical records, found {}",
                history.len()
            ),
        ));
    }

    for shift in open_shifts {
        if !vocabulary.contains(shift.work_type) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownWorkType,
                format!(
                    "Open shift '{}' requests unknown work type {}",
                    shift.shift_key(),
                    shift.work_type
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
