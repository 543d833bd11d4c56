//! Row readers for historical and open-shift tables.
//!
//! Rows arrive as string fields (header already stripped). Historical rows
//! are strict; open-shift rows may recover from unparsable day/shift
//! fields, depending on [`ParseRecovery`].

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::columns::{
    BoolLabels, ColumnMap, COL_EMPLOYEE_ID, COL_WORKED, COL_WORK_DAY, COL_WORK_SHIFT,
    COL_WORK_TYPE,
};
use crate::config::{ParseRecovery, StaffingConfig};
use crate::error::{Result, StaffingError};
use crate::models::{HistoryTable, Observation, OpenShift, WorkTypeVocabulary};

/// A field that was replaced by a default during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryNote {
    /// 0-based data row.
    pub row: usize,
    /// Column name.
    pub column: String,
    /// Original field text (empty if the field was missing).
    pub raw: String,
}

/// Open shifts plus any recovered fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedShifts {
    pub shifts: Vec<OpenShift>,
    pub recoveries: Vec<RecoveryNote>,
}

/// Converts string rows into typed staffing input.
///
/// # Example
/// ```
/// use u_staffing::config::StaffingConfig;
/// use u_staffing::input::TableReader;
/// use u_staffing::models::WorkTypeVocabulary;
///
/// let vocab = WorkTypeVocabulary::default();
/// let reader = TableReader::new(&vocab, &StaffingConfig::default());
///
/// let history = reader
///     .read_history([["1", "1", "CNA", "True", "W1"], ["2", "1", "LPN", "False", "W2"]])
///     .unwrap();
/// assert_eq!(history.len(), 2);
///
/// let parsed = reader.read_open_shifts([["x", "2", "CNA"]]).unwrap();
/// assert_eq!(parsed.shifts[0].work_day, 0);
/// assert_eq!(parsed.recoveries.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TableReader<'a> {
    vocabulary: &'a WorkTypeVocabulary,
    labels: BoolLabels,
    history_columns: ColumnMap,
    shift_columns: ColumnMap,
    recovery: ParseRecovery,
    repetition_factor: f64,
}

impl<'a> TableReader<'a> {
    /// Creates a reader with positional layouts.
    pub fn new(vocabulary: &'a WorkTypeVocabulary, config: &StaffingConfig) -> Self {
        Self {
            vocabulary,
            labels: BoolLabels::default(),
            history_columns: ColumnMap::history(),
            shift_columns: ColumnMap::open_shifts(),
            recovery: config.parse_recovery,
            repetition_factor: config.repetition_factor,
        }
    }

    /// Sets the historical column layout.
    pub fn with_history_columns(mut self, columns: ColumnMap) -> Self {
        self.history_columns = columns;
        self
    }

    /// Sets the open-shift column layout.
    pub fn with_shift_columns(mut self, columns: ColumnMap) -> Self {
        self.shift_columns = columns;
        self
    }

    /// Sets the `worked` label table.
    pub fn with_labels(mut self, labels: BoolLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Reads historical rows and collapses duplicates.
    ///
    /// # Errors
    /// `MalformedInput` for a missing field, non-integer day/shift or
    /// unknown `worked` label; `UnknownWorkType` for an unknown work type.
    pub fn read_history<I, R, S>(&self, rows: I) -> Result<HistoryTable>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let cols = self.history_columns;
        let worked_col = cols.worked.ok_or_else(|| {
            StaffingError::InvalidConfig(format!("history layout lacks `{COL_WORKED}`"))
        })?;
        let employee_col = cols.employee_id.ok_or_else(|| {
            StaffingError::InvalidConfig(format!("history layout lacks `{COL_EMPLOYEE_ID}`"))
        })?;

        let mut observations = Vec::new();
        for (row_idx, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();
            let work_day = parse_int(
                row_idx,
                COL_WORK_DAY,
                field(row, row_idx, cols.work_day, COL_WORK_DAY)?,
            )?;
            let work_shift = parse_int(
                row_idx,
                COL_WORK_SHIFT,
                field(row, row_idx, cols.work_shift, COL_WORK_SHIFT)?,
            )?;
            let work_type = self
                .vocabulary
                .resolve(field(row, row_idx, cols.work_type, COL_WORK_TYPE)?)?;
            let worked_raw = field(row, row_idx, worked_col, COL_WORKED)?;
            let worked = self
                .labels
                .resolve(worked_raw)
                .ok_or_else(|| StaffingError::MalformedInput {
                    row: row_idx,
                    message: format!("unknown {COL_WORKED} label `{worked_raw}`"),
                })?;
            let worker_id = field(row, row_idx, employee_col, COL_EMPLOYEE_ID)?.trim();

            observations.push(Observation::new(
                work_day, work_shift, work_type, worked, worker_id,
            ));
        }

        Ok(HistoryTable::from_observations(
            observations,
            self.repetition_factor,
        ))
    }

    /// Reads open-shift rows.
    ///
    /// An unparsable or missing day/shift becomes 0 under
    /// [`ParseRecovery::DefaultToZero`] (logged and noted) and is an error
    /// under [`ParseRecovery::Reject`]. Unknown work types always fail.
    pub fn read_open_shifts<I, R, S>(&self, rows: I) -> Result<ParsedShifts>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let cols = self.shift_columns;
        let mut parsed = ParsedShifts::default();

        for (row_idx, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();
            let work_day =
                self.recover_int(row, row_idx, cols.work_day, COL_WORK_DAY, &mut parsed)?;
            let work_shift =
                self.recover_int(row, row_idx, cols.work_shift, COL_WORK_SHIFT, &mut parsed)?;
            let work_type = self
                .vocabulary
                .resolve(field(row, row_idx, cols.work_type, COL_WORK_TYPE)?)?;
            parsed
                .shifts
                .push(OpenShift::new(work_day, work_shift, work_type));
        }

        Ok(parsed)
    }

    fn recover_int<S: AsRef<str>>(
        &self,
        row: &[S],
        row_idx: usize,
        col: usize,
        name: &str,
        parsed: &mut ParsedShifts,
    ) -> Result<i64> {
        let raw = row.get(col).map(|s| s.as_ref()).unwrap_or("");
        match raw.trim().parse::<i64>() {
            Ok(v) => Ok(v),
            Err(_) if self.recovery == ParseRecovery::DefaultToZero => {
                warn!(
                    row = row_idx,
                    column = name,
                    raw,
                    "unparsable integer defaulted to 0"
                );
                parsed.recoveries.push(RecoveryNote {
                    row: row_idx,
                    column: name.to_string(),
                    raw: raw.to_string(),
                });
                Ok(0)
            }
            Err(_) => Err(StaffingError::MalformedInput {
                row: row_idx,
                message: format!("{name} `{raw}` is not an integer"),
            }),
        }
    }
}

fn field<'r, S: AsRef<str>>(
    row: &'r [S],
    row_idx: usize,
    col: usize,
    name: &str,
) -> Result<&'r str> {
    row.get(col)
        .map(|s| s.as_ref())
        .ok_or_else(|| StaffingError::MalformedInput {
            row: row_idx,
            message: format!("missing {name} (column {col}, row has {} fields)", row.len()),
        })
}

fn parse_int(row_idx: usize, name: &str, raw: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| StaffingError::MalformedInput {
        row: row_idx,
        message: format!("{name} `{raw}` is not an integer"),
    })
}
