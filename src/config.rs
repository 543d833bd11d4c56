//! Run configuration.
//!
//! All tunables of a staffing run live in [`StaffingConfig`]: network
//! capacities, similarity-decomposition parameters, candidate retention,
//! path-search order and parse recovery. The struct deserializes with
//! defaults for every missing field, so callers can load a partial JSON
//! (or any serde format) document.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StaffingError};

/// Candidate retention strategy after scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionMode {
    /// Walk records in table order and keep a candidate whose score is at
    /// least `last_kept - margin`; every kept candidate becomes the new
    /// reference, so a slow decline drifts downward. Order dependent.
    #[default]
    NearBestSoFar,
    /// Like `NearBestSoFar`, but the reference is the highest score kept so
    /// far and never moves down.
    NearRunningMax,
    /// Strict top-K by score.
    TopK,
}

/// Augmenting-path search order for the max-flow solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSearch {
    /// Queue-based shortest augmenting path (Edmonds–Karp, O(V·E²)).
    #[default]
    BreadthFirst,
    /// Stack-based, last discovered first (generic Ford–Fulkerson).
    DepthFirst,
}

/// What to do with an unparsable day/shift field in an open-shift row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseRecovery {
    /// Substitute 0 and log a warning.
    #[default]
    DefaultToZero,
    /// Fail with `MalformedInput`.
    Reject,
}

/// Configuration for a staffing run.
///
/// # Example
/// ```
/// use u_staffing::config::{PathSearch, StaffingConfig};
///
/// let config = StaffingConfig::default()
///     .with_shift_hours(12.0)
///     .with_path_search(PathSearch::DepthFirst);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.week_hours, 40.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffingConfig {
    /// Capacity of SOURCE→shift and shift→worker edges (hours).
    pub shift_hours: f64,
    /// Capacity of worker→SINK edges (weekly hours).
    pub week_hours: f64,
    /// Repetition weight per duplicate observation.
    pub repetition_factor: f64,
    /// Repetition weight placed in the query vector.
    pub query_weight: f64,
    /// Retained-rank cut: a significance value this many times smaller than
    /// its predecessor ends the basis.
    pub drop_factor: f64,
    /// Minimum retained rank.
    pub k_min: usize,
    /// Maximum retained rank.
    pub k_max: usize,
    /// Candidate retention strategy.
    pub retention: RetentionMode,
    /// Score margin for the `Near*` retention modes.
    pub retention_margin: f64,
    /// Augmenting-path search order.
    pub path_search: PathSearch,
    /// Candidates per shift; `None` means "number of open shifts".
    pub candidate_limit: Option<usize>,
    /// Open-shift parse recovery.
    pub parse_recovery: ParseRecovery,
    /// Optional cap on augmenting steps.
    pub max_iterations: Option<usize>,
}

impl Default for StaffingConfig {
    fn default() -> Self {
        Self {
            shift_hours: 8.0,
            week_hours: 40.0,
            repetition_factor: 0.01,
            query_weight: 1.0,
            drop_factor: 100.0,
            k_min: 1,
            k_max: 1024,
            retention: RetentionMode::NearBestSoFar,
            retention_margin: 0.02,
            path_search: PathSearch::BreadthFirst,
            candidate_limit: None,
            parse_recovery: ParseRecovery::DefaultToZero,
            max_iterations: None,
        }
    }
}

impl StaffingConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-shift hour capacity.
    pub fn with_shift_hours(mut self, hours: f64) -> Self {
        self.shift_hours = hours;
        self
    }

    /// Sets the per-worker weekly hour capacity.
    pub fn with_week_hours(mut self, hours: f64) -> Self {
        self.week_hours = hours;
        self
    }

    /// Sets the retained-rank bounds.
    pub fn with_rank_bounds(mut self, k_min: usize, k_max: usize) -> Self {
        self.k_min = k_min;
        self.k_max = k_max;
        self
    }

    /// Sets the retained-rank drop factor.
    pub fn with_drop_factor(mut self, drop_factor: f64) -> Self {
        self.drop_factor = drop_factor;
        self
    }

    /// Sets the candidate retention strategy.
    pub fn with_retention(mut self, retention: RetentionMode) -> Self {
        self.retention = retention;
        self
    }

    /// Sets the augmenting-path search order.
    pub fn with_path_search(mut self, path_search: PathSearch) -> Self {
        self.path_search = path_search;
        self
    }

    /// Sets a fixed candidate limit per shift.
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = Some(limit);
        self
    }

    /// Sets the open-shift parse recovery.
    pub fn with_parse_recovery(mut self, recovery: ParseRecovery) -> Self {
        self.parse_recovery = recovery;
        self
    }

    /// Caps the number of augmenting steps.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.shift_hours.is_finite() && self.shift_hours > 0.0) {
            return Err(StaffingError::InvalidConfig(format!(
                "shift_hours must be positive, got {}",
                self.shift_hours
            )));
        }
        if !(self.week_hours.is_finite() && self.week_hours > 0.0) {
            return Err(StaffingError::InvalidConfig(format!(
                "week_hours must be positive, got {}",
                self.week_hours
            )));
        }
        if self.k_min == 0 || self.k_min > self.k_max {
            return Err(StaffingError::InvalidConfig(format!(
                "rank bounds must satisfy 1 <= k_min <= k_max, got [{}, {}]",
                self.k_min, self.k_max
            )));
        }
        if self.drop_factor.is_nan() || self.drop_factor <= 1.0 {
            return Err(StaffingError::InvalidConfig(format!(
                "drop_factor must exceed 1, got {}",
                self.drop_factor
            )));
        }
        if self.retention_margin.is_nan() || self.retention_margin < 0.0 {
            return Err(StaffingError::InvalidConfig(format!(
                "retention_margin must be non-negative, got {}",
                self.retention_margin
            )));
        }
        if !(self.repetition_factor.is_finite() && self.repetition_factor > 0.0) {
            return Err(StaffingError::InvalidConfig(format!(
                "repetition_factor must be positive, got {}",
                self.repetition_factor
            )));
        }
        Ok(())
    }
}
