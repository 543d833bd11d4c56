//! Open shifts and assignments.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Query, WorkType};

/// A shift that needs a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenShift {
    pub work_day: i64,
    pub work_shift: i64,
    pub work_type: WorkType,
}

impl OpenShift {
    /// Creates an open shift.
    pub fn new(work_day: i64, work_shift: i64, work_type: WorkType) -> Self {
        Self {
            work_day,
            work_shift,
            work_type,
        }
    }

    /// Network key: `"{day}-{shift}-{work_type}"`.
    pub fn shift_key(&self) -> String {
        format!("{}-{}-{}", self.work_day, self.work_shift, self.work_type)
    }

    /// Similarity query for this shift.
    pub fn to_query(&self) -> Query {
        Query::new(self.work_day, self.work_shift, self.work_type)
    }
}

/// One shift → worker result after max-flow converges.
///
/// `worker_id == None` means the shift is unfilled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Shift key (see [`OpenShift::shift_key`]).
    pub shift_key: String,
    /// Assigned worker, if any.
    pub worker_id: Option<String>,
    /// Hours carried by the shift → worker edge.
    pub hours: f64,
}

impl Assignment {
    /// A filled assignment.
    pub fn filled(shift_key: impl Into<String>, worker_id: impl Into<String>, hours: f64) -> Self {
        Self {
            shift_key: shift_key.into(),
            worker_id: Some(worker_id.into()),
            hours,
        }
    }

    /// An unfilled shift.
    pub fn unfilled(shift_key: impl Into<String>) -> Self {
        Self {
            shift_key: shift_key.into(),
            worker_id: None,
            hours: 0.0,
        }
    }

    /// Whether a worker was assigned.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.worker_id.is_some()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.shift_key,
            self.worker_id.as_deref().unwrap_or("unfilled"),
            self.hours
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_key() {
        let s = OpenShift::new(3, 2, WorkType(1));
        assert_eq!(s.shift_key(), "3-2-1");
        let q = s.to_query();
        assert_eq!(q.work_day, 3);
        assert_eq!(q.work_type, WorkType(1));
        assert!(q.worked);
    }

    #[test]
    fn test_assignment_display() {
        assert_eq!(Assignment::filled("1-1-0", "W7", 8.0).to_string(), "1-1-0 W7 8");
        let u = Assignment::unfilled("2-1-0");
        assert!(!u.is_filled());
        assert_eq!(u.to_string(), "2-1-0 unfilled 0");
    }
}
