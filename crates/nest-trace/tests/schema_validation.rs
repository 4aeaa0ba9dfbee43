mod common;

use nest_core::codes;
use nest_trace::{FieldKey, FieldRef, FieldValue, RunTrace, TraceField};

use common::minimal_entries;

fn without(entries: Vec<(&'static str, FieldValue)>, key: &str) -> Vec<(&'static str, FieldValue)> {
    entries.into_iter().filter(|(k, _)| *k != key).collect()
}

#[test]
fn missing_required_field_is_named() {
    for field in TraceField::REQUIRED {
        let entries = without(minimal_entries(5, 3), field.as_str());
        let err = RunTrace::from_entries(entries).unwrap_err();
        assert_eq!(err.code(), codes::MISSING_FIELD);
        assert_eq!(err.info().context["field"], field.as_str());
    }
}

#[test]
fn missing_live_info_is_rejected() {
    let entries = without(minimal_entries(5, 3), "nlive");
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::MISSING_LIVE_INFO);
}

#[test]
fn both_live_fields_are_ambiguous() {
    let mut entries = minimal_entries(5, 3);
    entries.push(("samples_n", FieldValue::Ints(vec![3; 5])));
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::AMBIGUOUS_LIVE_INFO);
}

#[test]
fn samples_n_marks_trace_dynamic() {
    let mut entries = without(minimal_entries(5, 3), "nlive");
    entries.push(("samples_n", FieldValue::Ints(vec![3, 3, 3, 2, 1])));
    let trace = RunTrace::from_entries(entries).unwrap();
    assert!(trace.is_dynamic());
    assert_eq!(trace.live_counts().unwrap(), vec![3, 3, 3, 2, 1]);

    let static_trace = RunTrace::from_entries(minimal_entries(5, 3)).unwrap();
    assert!(!static_trace.is_dynamic());
}

#[test]
fn batch_fields_are_kept_as_extras() {
    let mut entries = without(minimal_entries(5, 3), "nlive");
    entries.insert(3, ("batch_nlive", FieldValue::Ints(vec![3, 2])));
    entries.push(("samples_n", FieldValue::Ints(vec![5, 5, 4, 2, 1])));
    entries.push(("samples_batch", FieldValue::Ints(vec![0, 0, 1, 1, 1])));
    entries.push((
        "batch_bounds",
        FieldValue::Points(vec![vec![f64::NEG_INFINITY, 0.2], vec![0.1, 0.4]]),
    ));
    let trace = RunTrace::from_entries(entries).unwrap();

    assert!(trace.is_dynamic());
    assert_eq!(trace.get("batch_nlive").unwrap(), FieldRef::Ints(&[3, 2]));
    assert_eq!(
        trace.extras().keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["batch_nlive", "samples_batch", "batch_bounds"]
    );
    assert_eq!(trace.keys()[3], FieldKey::Extra("batch_nlive".to_string()));
    assert_eq!(trace.keys()[4], FieldKey::Known(TraceField::Logl));
}

#[test]
fn duplicate_keys_are_rejected() {
    let mut entries = minimal_entries(5, 3);
    entries.push(("nlive", FieldValue::Int(4)));
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::DUPLICATE_FIELD);

    let mut entries = minimal_entries(5, 3);
    entries.push(("batch_nlive", FieldValue::Int(3)));
    entries.push(("batch_nlive", FieldValue::Int(4)));
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::DUPLICATE_FIELD);
    assert_eq!(err.info().context["field"], "batch_nlive");
}

#[test]
fn logzerr_must_follow_the_recorded_variance() {
    let mut entries = minimal_entries(3, 3);
    entries.push(("logzvar", FieldValue::Floats(vec![0.01; 3])));
    let trace = RunTrace::from_entries(entries).unwrap();
    assert_eq!(trace.logzvar(), Some(&[0.01; 3][..]));

    let mut entries = without(minimal_entries(3, 3), "logzerr");
    entries.push(("logzerr", FieldValue::Floats(vec![0.1, 0.1, 7.0])));
    entries.push(("logzvar", FieldValue::Floats(vec![0.01; 3])));
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::INVALID_VALUE);
    assert_eq!(err.info().context["field"], "logzerr");
    assert_eq!(err.info().context["index"], "2");

    let mut entries = without(minimal_entries(3, 3), "logzerr");
    entries.push(("logzerr", FieldValue::Floats(vec![f64::NAN, 0.1, 0.1])));
    entries.push(("logzvar", FieldValue::Floats(vec![f64::INFINITY, 0.01, 0.01])));
    assert!(RunTrace::from_entries(entries).is_ok());

    let mut entries = without(minimal_entries(3, 3), "logzerr");
    entries.push(("logzerr", FieldValue::Floats(vec![f64::NAN, 0.1, 0.1])));
    entries.push(("logzvar", FieldValue::Floats(vec![0.01; 3])));
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::INVALID_VALUE);
    assert_eq!(err.info().context["index"], "0");
}

#[test]
fn wrong_value_shape_is_rejected() {
    let mut entries = without(minimal_entries(5, 3), "nlive");
    entries.push(("nlive", FieldValue::Floats(vec![3.0])));
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::FIELD_TYPE);
    assert_eq!(err.info().context["field"], "nlive");
}

#[test]
fn per_iteration_lengths_must_agree() {
    let mut entries = without(minimal_entries(5, 3), "logwt");
    entries.push(("logwt", FieldValue::Floats(vec![-1.0; 4])));
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::LENGTH_MISMATCH);
    assert_eq!(err.info().context["field"], "logwt");
}

#[test]
fn ragged_samples_are_rejected() {
    let mut entries = without(minimal_entries(3, 3), "samples");
    entries.push((
        "samples",
        FieldValue::Points(vec![vec![0.0, 0.0], vec![0.0], vec![0.0, 0.0]]),
    ));
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::LENGTH_MISMATCH);
    assert_eq!(err.info().context["row"], "1");
}

#[test]
fn decreasing_likelihood_is_rejected() {
    let mut entries = without(minimal_entries(4, 3), "logl");
    entries.push(("logl", FieldValue::Floats(vec![0.0, 1.0, 0.5, 2.0])));
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::UNSORTED_LOGL);
    assert_eq!(err.info().context["index"], "2");
}

#[test]
fn plateau_ties_are_accepted() {
    let mut entries = without(minimal_entries(4, 3), "logl");
    entries.push(("logl", FieldValue::Floats(vec![0.0, 0.0, 0.0, 2.0])));
    assert!(RunTrace::from_entries(entries).is_ok());
}

#[test]
fn negative_logzerr_is_rejected_but_nan_is_allowed() {
    let mut entries = without(minimal_entries(3, 3), "logzerr");
    entries.push(("logzerr", FieldValue::Floats(vec![0.1, -0.1, 0.1])));
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::INVALID_VALUE);

    let mut entries = without(minimal_entries(3, 3), "logzerr");
    entries.push(("logzerr", FieldValue::Floats(vec![f64::NAN, 0.2, 0.1])));
    let trace = RunTrace::from_entries(entries).unwrap();
    assert!(trace.logzerr()[0].is_nan());
}

#[test]
fn zero_live_points_are_invalid() {
    let err = RunTrace::from_entries(minimal_entries(3, 0)).unwrap_err();
    assert_eq!(err.code(), codes::INVALID_VALUE);
}

#[test]
fn static_niter_must_match_sample_count() {
    let mut entries = minimal_entries(10, 3);
    entries.push(("niter", FieldValue::Int(7)));
    let trace = RunTrace::from_entries(entries).unwrap();
    assert_eq!(
        trace.live_counts().unwrap(),
        vec![3, 3, 3, 3, 3, 3, 3, 3, 2, 1]
    );

    let mut entries = minimal_entries(10, 3);
    entries.push(("niter", FieldValue::Int(4)));
    let err = RunTrace::from_entries(entries).unwrap_err();
    assert_eq!(err.code(), codes::LENGTH_MISMATCH);
}

#[test]
fn lookup_by_key() {
    let trace = RunTrace::from_entries(minimal_entries(4, 3)).unwrap();
    assert_eq!(trace.get("nlive").unwrap(), FieldRef::Int(3));
    match trace.get("logl").unwrap() {
        FieldRef::Floats(values) => assert_eq!(values.len(), 4),
        other => panic!("unexpected value {other:?}"),
    }

    let err = trace.get("not_a_field").unwrap_err();
    assert_eq!(err.code(), codes::UNKNOWN_FIELD);
    assert_eq!(err.info().context["field"], "not_a_field");
    let err = trace.get("samples_n").unwrap_err();
    assert_eq!(err.code(), codes::UNKNOWN_FIELD);
}

#[test]
fn items_preserve_insertion_order() {
    let trace = RunTrace::from_entries(minimal_entries(4, 3)).unwrap();
    let keys: Vec<&str> = trace.items().map(|(key, _)| key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["samples_u", "samples", "samples_id", "logl", "logwt", "logz", "logzerr", "nlive"]
    );
}

#[test]
fn static_summary_reports_live_points_and_iterations() {
    let trace = RunTrace::from_entries(minimal_entries(500, 100)).unwrap();
    let summary = trace.summary();
    assert!(summary.starts_with("Summary\n=======\n"));
    assert!(summary.contains("nlive: 100"));
    assert!(summary.contains("niter: 500"));
    assert!(summary.contains("logz:"));
}

#[test]
fn dynamic_summary_sums_per_iteration_calls() {
    let mut entries = without(minimal_entries(4, 3), "nlive");
    entries.push(("samples_n", FieldValue::Ints(vec![4, 3, 2, 1])));
    entries.push(("ncall", FieldValue::Ints(vec![5, 7, 11, 13])));
    let trace = RunTrace::from_entries(entries).unwrap();
    let summary = trace.summary();
    assert!(!summary.contains("nlive"));
    assert!(summary.contains("niter: 4"));
    assert!(summary.contains("ncall: 36"));
    assert_eq!(trace.total_calls(), 36);
}

#[test]
fn display_lists_every_field() {
    let trace = RunTrace::from_entries(minimal_entries(2, 3)).unwrap();
    let rendered = trace.to_string();
    assert_eq!(rendered.lines().count(), 8);
    assert!(rendered.lines().any(|line| line == "      nlive: 3"));

    let mut entries = minimal_entries(2, 3);
    entries.push(("batch_nlive", FieldValue::Ints(vec![3])));
    let rendered = RunTrace::from_entries(entries).unwrap().to_string();
    assert_eq!(rendered.lines().count(), 9);
    assert_eq!(rendered.lines().last(), Some(" batch_nlive: [3]"));
}

#[test]
fn undefined_final_error_prints_as_nan() {
    let mut entries = without(minimal_entries(2, 3), "logzerr");
    entries.push(("logzerr", FieldValue::Floats(vec![0.1, f64::NAN])));
    let summary = RunTrace::from_entries(entries).unwrap().summary();
    assert!(summary.ends_with("+/-    nan"), "{summary}");
}
