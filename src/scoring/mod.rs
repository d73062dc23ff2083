//! Confusion-matrix scores for classified result tables.
//!
//! Every row of a result table is mapped by a caller-supplied classifier to
//! one [`Outcome`]. The outcomes are tallied and turned into accuracy,
//! precision and recall. A ratio whose denominator is zero is reported as
//! [`Ratio::Undefined`] instead of failing the whole computation.

mod outcome;
mod scores;

pub use outcome::{label_classifier, Outcome, OutcomeCounts};
pub use scores::{compute_scores, try_compute_scores, Ratio, ScoreSummary};
