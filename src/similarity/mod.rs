//! Similarity search over historical staffing records.
//!
//! Projects historical records into a reduced basis derived from their
//! dominant variance directions and ranks them against a requested shift
//! by cosine similarity.
//!
//! # Pipeline
//!
//! 1. Encode records as 9-wide rows, center them.
//! 2. Decompose the covariance, normalize and truncate the basis
//!    ([`ReducedBasis`]).
//! 3. Project the query and every record; score by cosine similarity.
//! 4. Retain candidates ([`RetentionMode`](crate::config::RetentionMode))
//!    and truncate to the requested limit.
//!
//! # Reference
//! Deerwester et al. (1990), "Indexing by Latent Semantic Analysis"

mod basis;
pub mod linalg;
mod scorer;

pub use basis::{
    center, query_row, record_row, retained_rank, CovarianceForm, ReducedBasis, BLOCK_SIDE,
    MIN_RECORDS, ROW_WIDTH,
};
pub use scorer::{cosine_similarity, rank, retain_indices, CandidateScore, SimilarityScorer};
