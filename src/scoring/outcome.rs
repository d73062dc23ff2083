//! Classification outcomes and their tally.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::table::Row;
use crate::{FlakestatError, FlakestatResult};

/// Outcome of a single evaluation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Reported and real.
    #[serde(rename = "TP")]
    TruePositive,
    /// Reported but not real.
    #[serde(rename = "FP")]
    FalsePositive,
    /// Real but not reported.
    #[serde(rename = "FN")]
    FalseNegative,
    /// Neither reported nor real.
    #[serde(rename = "TN")]
    TrueNegative,
}

impl Outcome {
    /// Short label (`TP`, `FP`, `FN`, `TN`).
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::TruePositive => "TP",
            Outcome::FalsePositive => "FP",
            Outcome::FalseNegative => "FN",
            Outcome::TrueNegative => "TN",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Outcome {
    type Err = FlakestatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TP" => Ok(Outcome::TruePositive),
            "FP" => Ok(Outcome::FalsePositive),
            "FN" => Ok(Outcome::FalseNegative),
            "TN" => Ok(Outcome::TrueNegative),
            _ => Err(FlakestatError::UnknownOutcome(s.to_string())),
        }
    }
}

/// Tally of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tn: usize,
}

impl OutcomeCounts {
    /// Counts one outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::TruePositive => self.tp += 1,
            Outcome::FalsePositive => self.fp += 1,
            Outcome::FalseNegative => self.fn_ += 1,
            Outcome::TrueNegative => self.tn += 1,
        }
    }

    /// Adds another tally to this one.
    pub fn merge(&mut self, other: &OutcomeCounts) {
        self.tp += other.tp;
        self.fp += other.fp;
        self.fn_ += other.fn_;
        self.tn += other.tn;
    }

    /// Number of recorded outcomes.
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }
}

impl FromIterator<Outcome> for OutcomeCounts {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        let mut counts = OutcomeCounts::default();
        for outcome in iter {
            counts.record(outcome);
        }
        counts
    }
}

/// Classifier reading the outcome label stored in `column`.
///
/// Rows whose label is missing or not one of `TP`, `FP`, `FN`, `TN` fail
/// with [`FlakestatError::UnknownOutcome`]; a missing column fails with
/// [`FlakestatError::UnknownColumn`].
pub fn label_classifier(column: &str) -> impl Fn(&Row<'_>) -> FlakestatResult<Outcome> + '_ {
    move |row: &Row<'_>| match row.get(column) {
        Some(value) => value.to_string().parse(),
        None => Err(FlakestatError::UnknownColumn(column.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Table, Value};

    #[test]
    fn test_parse_labels() {
        assert_eq!("TP".parse::<Outcome>().unwrap(), Outcome::TruePositive);
        assert_eq!(" fp ".parse::<Outcome>().unwrap(), Outcome::FalsePositive);
        assert_eq!("Fn".parse::<Outcome>().unwrap(), Outcome::FalseNegative);
        assert_eq!("TN".parse::<Outcome>().unwrap(), Outcome::TrueNegative);
        assert!(matches!(
            "XX".parse::<Outcome>(),
            Err(FlakestatError::UnknownOutcome(label)) if label == "XX"
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for outcome in [
            Outcome::TruePositive,
            Outcome::FalsePositive,
            Outcome::FalseNegative,
            Outcome::TrueNegative,
        ] {
            assert_eq!(outcome.to_string().parse::<Outcome>().unwrap(), outcome);
        }
    }

    #[test]
    fn test_counts_from_iter_and_merge() {
        let mut counts: OutcomeCounts = [
            Outcome::TruePositive,
            Outcome::TruePositive,
            Outcome::TrueNegative,
        ]
        .into_iter()
        .collect();
        assert_eq!(counts.tp, 2);
        assert_eq!(counts.tn, 1);

        counts.merge(&OutcomeCounts { tp: 0, fp: 1, fn_: 2, tn: 0 });
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn test_label_classifier() {
        let mut table = Table::new(["reporting"]);
        table.push_row(vec!["TP".into()]).unwrap();
        table.push_row(vec![Value::Null]).unwrap();

        let classify = label_classifier("reporting");
        assert_eq!(
            classify(&table.row(0).unwrap()).unwrap(),
            Outcome::TruePositive
        );
        assert!(classify(&table.row(1).unwrap()).is_err());

        let missing = label_classifier("other");
        assert!(matches!(
            missing(&table.row(0).unwrap()),
            Err(FlakestatError::UnknownColumn(_))
        ));
    }
}
