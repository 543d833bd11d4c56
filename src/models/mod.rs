//! Staffing domain models.
//!
//! Provides the data types shared by the similarity scorer, the flow
//! network and the orchestrator.
//!
//! # Domain Mappings
//!
//! | u-staffing | Healthcare | Retail | Logistics |
//! |------------|------------|--------|-----------|
//! | WorkType | Nursing grade (CNA/LPN) | Role (cashier) | License class |
//! | HistoricalRecord | Past roster entry | Past rota entry | Past route log |
//! | OpenShift | Unstaffed ward shift | Open till shift | Unassigned run |
//! | Assignment | Nurse → shift | Clerk → shift | Driver → run |

mod record;
mod shift;
mod work_type;

pub use record::{HistoricalRecord, HistoryTable, Observation, Query};
pub use shift::{Assignment, OpenShift};
pub use work_type::{WorkType, WorkTypeVocabulary};
