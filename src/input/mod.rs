//! Tabular input adapters.
//!
//! Turns string rows (e.g. from a CSV reader, header stripped) into
//! [`HistoryTable`](crate::models::HistoryTable)s and
//! [`OpenShift`](crate::models::OpenShift)s. Work-type labels resolve
//! through a [`WorkTypeVocabulary`](crate::models::WorkTypeVocabulary);
//! `worked` labels through [`BoolLabels`]. File access stays with the
//! caller.

mod columns;
mod reader;

pub use columns::{
    BoolLabels, ColumnMap, COL_EMPLOYEE_ID, COL_WORKED, COL_WORK_DAY, COL_WORK_SHIFT, COL_WORK_TYPE,
};
pub use reader::{ParsedShifts, RecoveryNote, TableReader};
