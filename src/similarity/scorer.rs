//! Similarity scorer: ranks historical records against a requested shift.
//!
//! Fitting encodes the history table, builds the [`ReducedBasis`] and
//! projects every record once. Ranking projects the query, scores each
//! record by cosine similarity and applies the configured retention.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::basis::{query_row, record_row, ReducedBasis, ROW_WIDTH};
use super::linalg::{dot, matrix_from_rows, norm};
use crate::config::{RetentionMode, StaffingConfig};
use crate::error::Result;
use crate::models::{HistoryTable, Query, WorkType, WorkTypeVocabulary};

/// A historical record scored against a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Cosine similarity, nominally in [-1, 1].
    pub score: f64,
    /// Position of the record in the history table.
    pub record_index: usize,
    pub worker_id: String,
    pub work_day: i64,
    pub work_shift: i64,
    pub work_type: WorkType,
    pub worked: bool,
    pub repetition_weight: f64,
}

/// Cosine similarity of two weight vectors; 0 when either norm is zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let na = norm(a);
    let nb = norm(b);
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot(a, b) / (na * nb)
}

/// Fitted similarity model over one history table.
///
/// Holds no mutable state after fitting; any number of queries can be
/// ranked against it.
///
/// # Example
/// ```
/// use u_staffing::config::StaffingConfig;
/// use u_staffing::models::{HistoryTable, Observation, Query, WorkType, WorkTypeVocabulary};
/// use u_staffing::similarity::SimilarityScorer;
///
/// let history = HistoryTable::from_observations(
///     vec![
///         Observation::new(1, 1, WorkType(0), true, "ana"),
///         Observation::new(2, 2, WorkType(1), true, "ben"),
///         Observation::new(3, 3, WorkType(2), false, "cai"),
///     ],
///     0.01,
/// );
/// let vocab = WorkTypeVocabulary::default();
/// let scorer = SimilarityScorer::fit(&history, &vocab, &StaffingConfig::default()).unwrap();
/// let ranked = scorer.rank(&Query::new(1, 1, WorkType(0)), 2).unwrap();
/// assert!(ranked.len() <= 2);
/// ```
#[derive(Debug, Clone)]
pub struct SimilarityScorer<'a> {
    history: &'a HistoryTable,
    vocabulary: &'a WorkTypeVocabulary,
    basis: ReducedBasis,
    weights: Vec<Vec<f64>>,
    retention: RetentionMode,
    retention_margin: f64,
    query_weight: f64,
}

impl<'a> SimilarityScorer<'a> {
    /// Builds the reduced basis and projects every record.
    ///
    /// Fails with `InsufficientData` for fewer than two distinct records.
    pub fn fit(
        history: &'a HistoryTable,
        vocabulary: &'a WorkTypeVocabulary,
        config: &StaffingConfig,
    ) -> Result<Self> {
        let rows: Vec<[f64; ROW_WIDTH]> = history.records().iter().map(record_row).collect();
        let matrix = matrix_from_rows(&rows, ROW_WIDTH);
        let basis = ReducedBasis::build(&matrix, config)?;

        // Records are projected uncentered, like the query.
        let weights = rows.iter().map(|row| basis.project(row)).collect();

        Ok(Self {
            history,
            vocabulary,
            basis,
            weights,
            retention: config.retention,
            retention_margin: config.retention_margin,
            query_weight: config.query_weight,
        })
    }

    /// The fitted basis.
    pub fn basis(&self) -> &ReducedBasis {
        &self.basis
    }

    /// Cosine score of every record against the query, in table order.
    pub fn scores(&self, query: &Query) -> Result<Vec<f64>> {
        self.vocabulary.check(query.work_type)?;
        let q = self.basis.project(&query_row(query, self.query_weight));
        Ok(self
            .weights
            .iter()
            .map(|w| cosine_similarity(&q, w))
            .collect())
    }

    /// Ranked candidates for a query, at most `limit` long.
    ///
    /// Fails with `UnknownWorkType` when the query's work type is not in
    /// the vocabulary.
    pub fn rank(&self, query: &Query, limit: usize) -> Result<Vec<CandidateScore>> {
        let scores = self.scores(query)?;

        let mut kept: Vec<CandidateScore> =
            retain_indices(&scores, self.retention, self.retention_margin)
                .into_iter()
                .map(|idx| self.candidate(idx, scores[idx]))
                .collect();

        // Stable: ties keep table order.
        kept.sort_by(|a, b| b.score.total_cmp(&a.score));
        kept.truncate(limit);

        debug!(
            day = query.work_day,
            shift = query.work_shift,
            work_type = %query.work_type,
            candidates = kept.len(),
            "ranked candidates"
        );
        Ok(kept)
    }

    fn candidate(&self, idx: usize, score: f64) -> CandidateScore {
        let r = &self.history.records()[idx];
        CandidateScore {
            score,
            record_index: idx,
            worker_id: r.worker_id.clone(),
            work_day: r.work_day,
            work_shift: r.work_shift,
            work_type: r.work_type,
            worked: r.worked,
            repetition_weight: r.repetition_weight,
        }
    }
}

/// Indices of the scores that survive retention, in table order.
///
/// `NearBestSoFar` compares each score with the last kept one,
/// `NearRunningMax` with the best kept one. `TopK` keeps everything and
/// leaves the cut to the caller's sort and truncate.
pub fn retain_indices(scores: &[f64], mode: RetentionMode, margin: f64) -> Vec<usize> {
    let mut reference = f64::NEG_INFINITY;
    let mut kept = Vec::new();
    for (idx, &score) in scores.iter().enumerate() {
        match mode {
            RetentionMode::TopK => kept.push(idx),
            RetentionMode::NearBestSoFar if score >= reference - margin => {
                reference = score;
                kept.push(idx);
            }
            RetentionMode::NearRunningMax if score >= reference - margin => {
                reference = reference.max(score);
                kept.push(idx);
            }
            _ => {}
        }
    }
    kept
}

/// One-shot ranking: fit on `history`, then rank `query`.
pub fn rank(
    history: &HistoryTable,
    vocabulary: &WorkTypeVocabulary,
    config: &StaffingConfig,
    query: &Query,
    limit: usize,
) -> Result<Vec<CandidateScore>> {
    vocabulary.check(query.work_type)?;
    SimilarityScorer::fit(history, vocabulary, config)?.rank(query, limit)
}
