//! Work-type vocabulary.
//!
//! Work types are the qualification categories a shift requires (e.g. CNA,
//! LPN). Records and queries carry the numeric code; the vocabulary maps
//! labels to codes and decides which codes are known.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, StaffingError};

/// Numeric work-type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkType(pub u32);

impl WorkType {
    /// The code as a matrix coordinate.
    #[inline]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Label → code table for work types.
///
/// # Example
/// ```
/// use u_staffing::models::{WorkType, WorkTypeVocabulary};
///
/// let vocab = WorkTypeVocabulary::default();
/// assert_eq!(vocab.resolve("LPN").unwrap(), WorkType(1));
/// assert!(vocab.resolve("RN").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTypeVocabulary {
    codes: BTreeMap<String, WorkType>,
}

impl Default for WorkTypeVocabulary {
    /// `CNA = 0`, `LPN = 1`, `ZZZ = 2`.
    fn default() -> Self {
        Self::from_labels(["CNA", "LPN", "ZZZ"])
    }
}

impl WorkTypeVocabulary {
    /// Creates an empty vocabulary.
    pub fn new() -> Self {
        Self {
            codes: BTreeMap::new(),
        }
    }

    /// Assigns codes 0, 1, 2, … in label order.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::new();
        for (code, label) in labels.into_iter().enumerate() {
            vocab = vocab.with_entry(label, WorkType(code as u32));
        }
        vocab
    }

    /// Adds (or replaces) a label.
    pub fn with_entry(mut self, label: impl Into<String>, code: WorkType) -> Self {
        self.codes.insert(label.into(), code);
        self
    }

    /// Resolves a label to its code.
    pub fn resolve(&self, label: &str) -> Result<WorkType> {
        self.codes
            .get(label.trim())
            .copied()
            .ok_or_else(|| StaffingError::UnknownWorkType(label.to_string()))
    }

    /// Whether a code belongs to this vocabulary.
    pub fn contains(&self, code: WorkType) -> bool {
        self.codes.values().any(|&c| c == code)
    }

    /// Fails with `UnknownWorkType` if the code is not in the vocabulary.
    pub fn check(&self, code: WorkType) -> Result<WorkType> {
        if self.contains(code) {
            Ok(code)
        } else {
            Err(StaffingError::UnknownWorkType(code.to_string()))
        }
    }

    /// Label for a code (first match in label order).
    pub fn label(&self, code: WorkType) -> Option<&str> {
        self.codes
            .iter()
            .find(|(_, &c)| c == code)
            .map(|(label, _)| label.as_str())
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the vocabulary has no labels.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary() {
        let v = WorkTypeVocabulary::default();
        assert_eq!(v.len(), 3);
        assert_eq!(v.resolve("CNA").unwrap(), WorkType(0));
        assert_eq!(v.resolve(" ZZZ ").unwrap(), WorkType(2));
        assert_eq!(v.label(WorkType(1)), Some("LPN"));
    }

    #[test]
    fn test_unknown_label() {
        let v = WorkTypeVocabulary::default();
        assert_eq!(
            v.resolve("RN"),
            Err(StaffingError::UnknownWorkType("RN".into()))
        );
    }

    #[test]
    fn test_check_code() {
        let v = WorkTypeVocabulary::default();
        assert!(v.check(WorkType(2)).is_ok());
        assert!(v.check(WorkType(7)).is_err());
        assert!(!WorkTypeVocabulary::new().contains(WorkType(0)));
    }

    #[test]
    fn test_custom_entries() {
        let v = WorkTypeVocabulary::new()
            .with_entry("RN", WorkType(10))
            .with_entry("MA", WorkType(20));
        assert_eq!(v.resolve("MA").unwrap(), WorkType(20));
        assert!(v.contains(WorkType(10)));
        assert!(!v.contains(WorkType(0)));
    }
}
