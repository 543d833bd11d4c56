//! Historical records and queries.
//!
//! A historical table is a list of observations "worker X did (or did not)
//! work shift S of type T on day D". Identical observations collapse into
//! one [`HistoricalRecord`] whose repetition weight grows with the number of
//! occurrences, so frequent patterns pull harder in the similarity basis.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::WorkType;

/// One raw historical observation, before duplicate collapsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// Day index (e.g. 1-7).
    pub work_day: i64,
    /// Shift slot within the day (e.g. 1-3).
    pub work_shift: i64,
    /// Work-type code.
    pub work_type: WorkType,
    /// Whether the worker actually worked the shift.
    pub worked: bool,
    /// Worker identifier.
    pub worker_id: String,
}

impl Observation {
    /// Creates an observation.
    pub fn new(
        work_day: i64,
        work_shift: i64,
        work_type: WorkType,
        worked: bool,
        worker_id: impl Into<String>,
    ) -> Self {
        Self {
            work_day,
            work_shift,
            work_type,
            worked,
            worker_id: worker_id.into(),
        }
    }
}

/// A distinct historical observation with its repetition weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub work_day: i64,
    pub work_shift: i64,
    pub work_type: WorkType,
    pub worked: bool,
    pub worker_id: String,
    /// Number of identical observations collapsed into this record.
    pub occurrences: usize,
    /// `occurrences × repetition_factor`.
    pub repetition_weight: f64,
}

/// Ordered table of distinct historical records.
///
/// Records keep the position of their first occurrence.
///
/// # Example
/// ```
/// use u_staffing::models::{HistoryTable, Observation, WorkType};
///
/// let table = HistoryTable::from_observations(
///     vec![
///         Observation::new(1, 1, WorkType(0), true, "A"),
///         Observation::new(2, 1, WorkType(0), true, "B"),
///         Observation::new(1, 1, WorkType(0), true, "A"),
///     ],
///     0.01,
/// );
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.records()[0].occurrences, 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryTable {
    records: Vec<HistoricalRecord>,
}

impl HistoryTable {
    /// Collapses duplicate observations into weighted records.
    pub fn from_observations<I>(observations: I, repetition_factor: f64) -> Self
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut index: HashMap<Observation, usize> = HashMap::new();
        let mut records: Vec<HistoricalRecord> = Vec::new();

        for obs in observations {
            if let Some(&pos) = index.get(&obs) {
                let record = &mut records[pos];
                record.occurrences += 1;
                record.repetition_weight = record.occurrences as f64 * repetition_factor;
                continue;
            }
            index.insert(obs.clone(), records.len());
            records.push(HistoricalRecord {
                work_day: obs.work_day,
                work_shift: obs.work_shift,
                work_type: obs.work_type,
                worked: obs.worked,
                worker_id: obs.worker_id,
                occurrences: 1,
                repetition_weight: repetition_factor,
            });
        }

        Self { records }
    }

    /// Distinct records in first-occurrence order.
    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    /// Number of distinct records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct worker ids in first-appearance order.
    pub fn worker_ids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .map(|r| r.worker_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// The shift being staffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub work_day: i64,
    pub work_shift: i64,
    pub work_type: WorkType,
    /// Always `true` for staffing queries.
    pub worked: bool,
}

impl Query {
    /// Creates a query for a worked shift.
    pub fn new(work_day: i64, work_shift: i64, work_type: WorkType) -> Self {
        Self {
            work_day,
            work_shift,
            work_type,
            worked: true,
        }
    }
}
