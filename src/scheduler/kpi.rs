//! Staffing quality metrics (KPIs).
//!
//! Computes staffing indicators from a completed assignment plan.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Filled / Unfilled | Open shifts with / without a worker |
//! | Fill Rate | filled / open shifts (1.0 when there are none) |
//! | Total Hours | Sum of assigned hours |
//! | Demanded Hours | open shifts × shift hours |
//! | Coverage | total / demanded hours (1.0 when nothing is demanded) |
//! | Hours by Worker | Assigned hours per worker |

use std::collections::HashMap;

use super::AssignmentPlan;
use crate::config::StaffingConfig;

/// Staffing performance indicators.
#[derive(Debug, Clone)]
pub struct StaffingKpi {
    /// Shifts with an assigned worker.
    pub filled: usize,
    /// Shifts left without a worker.
    pub unfilled: usize,
    /// Fraction of shifts filled (0.0..1.0).
    pub fill_rate: f64,
    /// Sum of assigned hours.
    pub total_hours: f64,
    /// Hours requested by all open shifts.
    pub demanded_hours: f64,
    /// Fraction of demanded hours covered (0.0..1.0).
    pub coverage: f64,
    /// Assigned hours per worker.
    pub hours_by_worker: HashMap<String, f64>,
}

impl StaffingKpi {
    /// Computes KPIs from a plan.
    ///
    /// # Arguments
    /// * `plan` - The plan returned by a staffing run.
    /// * `config` - The run configuration (for `shift_hours`).
    pub fn calculate(plan: &AssignmentPlan, config: &StaffingConfig) -> Self {
        let mut filled = 0;
        let mut total_hours = 0.0;
        let mut hours_by_worker: HashMap<String, f64> = HashMap::new();

        for assignment in &plan.assignments {
            if let Some(worker) = &assignment.worker_id {
                filled += 1;
                total_hours += assignment.hours;
                *hours_by_worker.entry(worker.clone()).or_default() += assignment.hours;
            }
        }

        let shifts = plan.assignments.len();
        let demanded_hours = shifts as f64 * config.shift_hours;

        let fill_rate = if shifts == 0 {
            1.0
        } else {
            filled as f64 / shifts as f64
        };

        let coverage = if demanded_hours > 0.0 {
            total_hours / demanded_hours
        } else {
            1.0
        };

        Self {
            filled,
            unfilled: shifts - filled,
            fill_rate,
            total_hours,
            demanded_hours,
            coverage,
            hours_by_worker,
        }
    }

    /// Largest weekly load of any single worker.
    pub fn max_worker_hours(&self) -> f64 {
        self.hours_by_worker.values().copied().fold(0.0, f64::max)
    }

    /// Whether the plan meets the given fill-rate threshold.
    pub fn meets_thresholds(&self, min_fill_rate: f64) -> bool {
        self.fill_rate >= min_fill_rate
    }
}
