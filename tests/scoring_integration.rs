//! Integration tests for outcome scoring.

use flakestat::scoring::{
    compute_scores, label_classifier, try_compute_scores, Outcome, Ratio, ScoreSummary,
};
use flakestat::table::{Row, Table, Value};
use flakestat::FlakestatError;
use proptest::prelude::*;

const LABELS: [&str; 4] = ["TP", "FP", "FN", "TN"];

fn labelled(labels: &[&str]) -> Table {
    let mut table = Table::new(["test", "reporting"]);
    for (i, label) in labels.iter().enumerate() {
        table
            .push_row(vec![Value::from(format!("test_{}", i)), Value::from(*label)])
            .unwrap();
    }
    table
}

fn by_label(row: &Row<'_>) -> Outcome {
    row.get("reporting")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(Outcome::TrueNegative)
}

#[test]
fn test_one_of_each_outcome() {
    let table = labelled(&["TP", "FP", "FN", "TN"]);
    let summary = compute_scores(&table, by_label);

    let (accuracy, precision, recall, tp, fp, fn_, tn) = summary.as_tuple();
    assert_eq!((tp, fp, fn_, tn), (1, 1, 1, 1));
    assert_eq!(accuracy, Ratio::Defined(0.5));
    assert_eq!(precision, Ratio::Defined(0.5));
    assert_eq!(recall, Ratio::Defined(0.5));
}

#[test]
fn test_only_true_negatives() {
    let table = labelled(&["TN", "TN"]);
    let summary = compute_scores(&table, by_label);

    assert_eq!(summary.tn, 2);
    assert_eq!(summary.accuracy, Ratio::Defined(1.0));
    assert!(summary.precision.is_undefined());
    assert!(summary.recall.is_undefined());
}

#[test]
fn test_empty_table_is_not_an_error() {
    let summary = compute_scores(&labelled(&[]), by_label);

    assert_eq!(summary.total(), 0);
    assert!(summary.accuracy.is_undefined());
    assert!(summary.precision.is_undefined());
    assert!(summary.recall.is_undefined());
}

#[test]
fn test_custom_classifier_on_numeric_columns() {
    // Detection succeeded when the flaky test was flagged within 5 reruns.
    let mut table = Table::new(["flaky", "reruns_to_detect"]);
    for (flaky, reruns) in [(true, 2), (true, 9), (false, 0), (false, 3)] {
        table
            .push_row(vec![Value::Bool(flaky), Value::Int(reruns)])
            .unwrap();
    }

    let summary = compute_scores(&table, |row| {
        let flaky = row.get("flaky") == Some(&Value::Bool(true));
        let detected = row
            .get("reruns_to_detect")
            .and_then(Value::as_f64)
            .map_or(false, |r| r > 0.0 && r <= 5.0);
        match (flaky, detected) {
            (true, true) => Outcome::TruePositive,
            (true, false) => Outcome::FalseNegative,
            (false, true) => Outcome::FalsePositive,
            (false, false) => Outcome::TrueNegative,
        }
    });

    assert_eq!(
        (summary.tp, summary.fp, summary.fn_, summary.tn),
        (1, 1, 1, 1)
    );
}

#[test]
fn test_unknown_label_fails_fast() {
    let table = labelled(&["TP", "maybe", "TN"]);
    let result = try_compute_scores(&table, label_classifier("reporting"));

    match result {
        Err(FlakestatError::UnknownOutcome(label)) => assert_eq!(label, "maybe"),
        other => panic!("expected UnknownOutcome, got {:?}", other),
    }
}

#[test]
fn test_missing_label_column() {
    let table = labelled(&["TP"]);
    let result = try_compute_scores(&table, label_classifier("verdict"));
    assert!(matches!(result, Err(FlakestatError::UnknownColumn(c)) if c == "verdict"));
}

#[test]
fn test_summary_serializes_undefined_as_null() {
    let summary = compute_scores(&labelled(&["TN"]), by_label);
    let json = serde_json::to_value(summary).unwrap();

    assert_eq!(json["accuracy"], serde_json::json!(1.0));
    assert!(json["precision"].is_null());
    assert_eq!(json["fn"], serde_json::json!(0));

    let back: ScoreSummary = serde_json::from_value(json).unwrap();
    assert_eq!(back, summary);
}

fn labels_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(LABELS.to_vec()), 0..64)
}

proptest! {
    #[test]
    fn prop_defined_ratios_are_in_unit_range(labels in labels_strategy()) {
        let summary = compute_scores(&labelled(&labels), by_label);

        for ratio in [summary.accuracy, summary.precision, summary.recall] {
            if let Some(v) = ratio.value() {
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
        prop_assert_eq!(summary.total(), labels.len());
        prop_assert_eq!(summary.accuracy.is_undefined(), labels.is_empty());
    }

    #[test]
    fn prop_scores_are_deterministic(labels in labels_strategy()) {
        let table = labelled(&labels);
        let first = compute_scores(&table, by_label);
        let second = compute_scores(&table, by_label);
        prop_assert_eq!(first, second);

        let fallible = try_compute_scores(&table, label_classifier("reporting")).unwrap();
        prop_assert_eq!(first, fallible);
    }

    #[test]
    fn prop_row_order_is_irrelevant(mut labels in labels_strategy()) {
        let forward = compute_scores(&labelled(&labels), by_label);
        labels.reverse();
        let backward = compute_scores(&labelled(&labels), by_label);
        prop_assert_eq!(forward, backward);
    }
}
