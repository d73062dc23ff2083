//! Accuracy, precision and recall.

use serde::{Deserialize, Serialize};

use crate::table::{Row, Table, Value};

use super::{Outcome, OutcomeCounts};

/// A ratio that may be undefined because its denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Ratio {
    /// Computed value in `[0, 1]`.
    Defined(f64),
    /// The denominator was zero.
    Undefined,
}

impl Ratio {
    /// `numerator / denominator`, or `Undefined` when the denominator is zero.
    pub fn of(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            Ratio::Undefined
        } else {
            Ratio::Defined(numerator as f64 / denominator as f64)
        }
    }

    /// The value, if defined.
    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(*v),
            Ratio::Undefined => None,
        }
    }

    /// Whether the denominator was zero.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Ratio::Undefined)
    }
}

impl From<Option<f64>> for Ratio {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if !v.is_nan() => Ratio::Defined(v),
            _ => Ratio::Undefined,
        }
    }
}

impl From<Ratio> for Option<f64> {
    fn from(ratio: Ratio) -> Self {
        ratio.value()
    }
}

impl From<Ratio> for Value {
    fn from(ratio: Ratio) -> Self {
        Value::Float(ratio.value().unwrap_or(f64::NAN))
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ratio::Defined(v) => write!(f, "{:.4}", v),
            Ratio::Undefined => write!(f, "n/a"),
        }
    }
}

/// Scores derived from an outcome tally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub accuracy: Ratio,
    pub precision: Ratio,
    pub recall: Ratio,
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub tn: usize,
}

impl ScoreSummary {
    /// Column names matching [`ScoreSummary::to_row`].
    pub const COLUMNS: [&'static str; 7] =
        ["accuracy", "precision", "recall", "tp", "fp", "fn", "tn"];

    /// Derives the three ratios from a tally.
    ///
    /// Each ratio is checked on its own; a zero denominator yields
    /// [`Ratio::Undefined`] plus an error-level diagnostic and leaves the
    /// other ratios untouched.
    pub fn from_counts(counts: OutcomeCounts) -> Self {
        let OutcomeCounts { tp, fp, fn_, tn } = counts;

        let accuracy = checked_ratio("accuracy", tp + tn, tp + tn + fp + fn_);
        let precision = checked_ratio("precision", tp, tp + fp);
        let recall = checked_ratio("recall", tp, tp + fn_);

        Self {
            accuracy,
            precision,
            recall,
            tp,
            fp,
            fn_,
            tn,
        }
    }

    /// The tally the scores were derived from.
    pub fn counts(&self) -> OutcomeCounts {
        OutcomeCounts {
            tp: self.tp,
            fp: self.fp,
            fn_: self.fn_,
            tn: self.tn,
        }
    }

    /// Number of classified rows.
    pub fn total(&self) -> usize {
        self.counts().total()
    }

    /// `(accuracy, precision, recall, tp, fp, fn, tn)`.
    pub fn as_tuple(&self) -> (Ratio, Ratio, Ratio, usize, usize, usize, usize) {
        (
            self.accuracy,
            self.precision,
            self.recall,
            self.tp,
            self.fp,
            self.fn_,
            self.tn,
        )
    }

    /// Table cells in [`ScoreSummary::COLUMNS`] order. Undefined ratios become NaN.
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            self.accuracy.into(),
            self.precision.into(),
            self.recall.into(),
            self.tp.into(),
            self.fp.into(),
            self.fn_.into(),
            self.tn.into(),
        ]
    }
}

fn checked_ratio(metric: &str, numerator: usize, denominator: usize) -> Ratio {
    let ratio = Ratio::of(numerator, denominator);
    if ratio.is_undefined() {
        tracing::error!(metric, "Division by zero when computing {}", metric);
    }
    ratio
}

/// Classifies every row of `table` and scores the resulting tally.
pub fn compute_scores<F>(table: &Table, classify: F) -> ScoreSummary
where
    F: Fn(&Row<'_>) -> Outcome,
{
    let counts: OutcomeCounts = table.apply(classify).into_iter().collect();
    ScoreSummary::from_counts(counts)
}

/// Like [`compute_scores`] with a fallible classifier. Stops at the first
/// row the classifier rejects.
pub fn try_compute_scores<F, E>(table: &Table, classify: F) -> Result<ScoreSummary, E>
where
    F: Fn(&Row<'_>) -> Result<Outcome, E>,
{
    let mut counts = OutcomeCounts::default();
    for row in table.rows() {
        counts.record(classify(&row)?);
    }
    Ok(ScoreSummary::from_counts(counts))
}
