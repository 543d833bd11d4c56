//! Column layouts and label tables for tabular input.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, StaffingError};

pub const COL_WORK_DAY: &str = "work_day";
pub const COL_WORK_SHIFT: &str = "work_shift";
pub const COL_WORK_TYPE: &str = "work_type";
pub const COL_WORKED: &str = "worked";
pub const COL_EMPLOYEE_ID: &str = "employee_id";

/// Column indices of a table.
///
/// `worked` and `employee_id` only exist in historical tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub work_day: usize,
    pub work_shift: usize,
    pub work_type: usize,
    pub worked: Option<usize>,
    pub employee_id: Option<usize>,
}

impl ColumnMap {
    /// Positional historical layout:
    /// `work_day, work_shift, work_type, worked, employee_id`.
    pub fn history() -> Self {
        Self {
            work_day: 0,
            work_shift: 1,
            work_type: 2,
            worked: Some(3),
            employee_id: Some(4),
        }
    }

    /// Positional open-shift layout: `work_day, work_shift, work_type`.
    pub fn open_shifts() -> Self {
        Self {
            work_day: 0,
            work_shift: 1,
            work_type: 2,
            worked: None,
            employee_id: None,
        }
    }

    /// Resolves the historical layout from a header row.
    pub fn history_from_header<S: AsRef<str>>(header: &[S]) -> Result<Self> {
        Ok(Self {
            worked: Some(find(header, COL_WORKED)?),
            employee_id: Some(find(header, COL_EMPLOYEE_ID)?),
            ..Self::open_shifts_from_header(header)?
        })
    }

    /// Resolves the open-shift layout from a header row.
    pub fn open_shifts_from_header<S: AsRef<str>>(header: &[S]) -> Result<Self> {
        Ok(Self {
            work_day: find(header, COL_WORK_DAY)?,
            work_shift: find(header, COL_WORK_SHIFT)?,
            work_type: find(header, COL_WORK_TYPE)?,
            worked: None,
            employee_id: None,
        })
    }
}

fn find<S: AsRef<str>>(header: &[S], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h.as_ref().trim() == name)
        .ok_or_else(|| StaffingError::InvalidConfig(format!("missing column `{name}` in header")))
}

/// Label → boolean table for the `worked` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolLabels {
    labels: HashMap<String, bool>,
}

impl Default for BoolLabels {
    /// `"False" → false`, `"True" → true`.
    fn default() -> Self {
        Self::new()
            .with_label("False", false)
            .with_label("True", true)
    }
}

impl BoolLabels {
    /// Empty table.
    pub fn new() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    /// Adds a label.
    pub fn with_label(mut self, label: impl Into<String>, value: bool) -> Self {
        self.labels.insert(label.into(), value);
        self
    }

    /// Looks a label up.
    pub fn resolve(&self, label: &str) -> Option<bool> {
        self.labels.get(label.trim()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_resolution() {
        let header = [
            "employee_id",
            "worked",
            "work_type",
            "work_shift",
            "work_day",
        ];
        let map = ColumnMap::history_from_header(&header).unwrap();
        assert_eq!(map.work_day, 4);
        assert_eq!(map.work_shift, 3);
        assert_eq!(map.work_type, 2);
        assert_eq!(map.worked, Some(1));
        assert_eq!(map.employee_id, Some(0));
    }

    #[test]
    fn test_header_missing_column() {
        let header = ["work_day", "work_type"];
        let err = ColumnMap::open_shifts_from_header(&header).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("work_shift"));
    }

    #[test]
    fn test_bool_labels() {
        let labels = BoolLabels::default();
        assert_eq!(labels.resolve("True"), Some(true));
        assert_eq!(labels.resolve("False"), Some(false));
        assert_eq!(labels.resolve("yes"), None);

        let custom = BoolLabels::new().with_label("Y", true);
        assert_eq!(custom.resolve("Y"), Some(true));
    }
}
