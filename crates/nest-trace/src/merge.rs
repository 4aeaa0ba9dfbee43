use std::cmp::Ordering;

use indexmap::IndexMap;
use log::debug;
use nest_core::errors::{codes, ErrorInfo};
use nest_core::NestError;

use crate::config::MergeOptions;
use crate::evidence;
use crate::fields::{CallCount, FieldValue, TraceField};
use crate::trace::RunTrace;

/// Position of a point inside the pooled input runs.
#[derive(Debug, Clone, Copy)]
struct PooledPoint {
    run: usize,
    index: usize,
    logl: f64,
}

fn incompatible(
    message: String,
    run: usize,
    field: TraceField,
    ndim: usize,
    expected: usize,
) -> NestError {
    NestError::Merge(
        ErrorInfo::new(codes::INCOMPATIBLE_RUNS, message)
            .with_context("run", run.to_string())
            .with_context("field", field.as_str())
            .with_context("ndim", ndim.to_string())
            .with_context("expected", expected.to_string()),
    )
}

fn check_compatible(runs: &[RunTrace]) -> Result<(), NestError> {
    let mut ndim: Option<(usize, usize)> = None;
    for (run, trace) in runs.iter().enumerate() {
        if trace.is_empty() {
            continue;
        }
        let dims = (trace.ndim(), trace.ndim_u());
        match ndim {
            None => ndim = Some(dims),
            Some(expected) => {
                if dims.0 != expected.0 {
                    return Err(incompatible(
                        format!("run {run} has {} parameters, expected {}", dims.0, expected.0),
                        run,
                        TraceField::Samples,
                        dims.0,
                        expected.0,
                    ));
                }
                if dims.1 != expected.1 {
                    return Err(incompatible(
                        format!(
                            "run {run} has {} unit-cube coordinates, expected {}",
                            dims.1, expected.1
                        ),
                        run,
                        TraceField::SamplesU,
                        dims.1,
                        expected.1,
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Collects an optional per-point column from every run, or `None` if any run lacks it.
fn gather<'a, F>(runs: &'a [RunTrace], order: &[PooledPoint], column: F) -> Option<Vec<u64>>
where
    F: Fn(&'a RunTrace) -> Option<&'a [u64]>,
{
    let columns: Vec<&[u64]> = runs.iter().map(&column).collect::<Option<_>>()?;
    Some(
        order
            .iter()
            .map(|point| columns[point.run][point.index])
            .collect(),
    )
}

/// Combines independent runs over the same likelihood and prior into one dynamic trace.
///
/// Points are pooled and stably sorted by log-likelihood, so ties keep run
/// order. The live-point count at each merged position is the sum over runs
/// of the count each run had active at that level, and a run contributes
/// nothing once its points are exhausted. Volumes, weights, evidence and its
/// variance are then recomputed from the merged schedule, grouping
/// equal-likelihood blocks when [`MergeOptions::group_plateaus`] is set.
pub fn merge_runs(runs: &[RunTrace], options: &MergeOptions) -> Result<RunTrace, NestError> {
    if runs.is_empty() {
        return Err(NestError::Merge(
            ErrorInfo::new(codes::NO_RUNS_TO_MERGE, "no runs supplied for merging")
                .with_hint("pass at least one trace"),
        ));
    }
    check_compatible(runs)?;

    let schedules = runs
        .iter()
        .map(RunTrace::live_counts)
        .collect::<Result<Vec<_>, _>>()?;

    let mut pool: Vec<PooledPoint> = runs
        .iter()
        .enumerate()
        .flat_map(|(run, trace)| {
            trace
                .logl()
                .iter()
                .enumerate()
                .map(move |(index, &logl)| PooledPoint { run, index, logl })
        })
        .collect();
    // `logl` is NaN-free after validation; signed zeros must stay tied.
    pool.sort_by(|a, b| a.logl.partial_cmp(&b.logl).unwrap_or(Ordering::Equal));

    // Running sum of each run's next live count.
    let mut next = vec![0usize; runs.len()];
    let mut active: u64 = schedules
        .iter()
        .map(|counts| counts.first().copied().unwrap_or(0))
        .sum();
    let mut live_counts = Vec::with_capacity(pool.len());
    for point in &pool {
        live_counts.push(active);
        let counts = &schedules[point.run];
        active -= counts[point.index];
        next[point.run] = point.index + 1;
        if let Some(&count) = counts.get(next[point.run]) {
            active += count;
        }
    }

    let logl: Vec<f64> = pool.iter().map(|point| point.logl).collect();
    let integrals = evidence::integrate(&logl, &live_counts, options.group_plateaus)?;
    let logzerr = integrals.logzerr();

    let mut id_offsets = Vec::with_capacity(runs.len());
    let mut offset = 0u64;
    for trace in runs {
        id_offsets.push(offset);
        offset += trace
            .samples_id()
            .iter()
            .max()
            .map(|max| max + 1)
            .unwrap_or(0);
    }

    let samples: Vec<Vec<f64>> = pool
        .iter()
        .map(|point| runs[point.run].samples()[point.index].clone())
        .collect();
    let samples_u: Vec<Vec<f64>> = pool
        .iter()
        .map(|point| runs[point.run].samples_u()[point.index].clone())
        .collect();
    let samples_id: Vec<u64> = pool
        .iter()
        .map(|point| runs[point.run].samples_id()[point.index] + id_offsets[point.run])
        .collect();

    let per_iteration_calls = gather(runs, &pool, |trace| match trace.ncall() {
        Some(CallCount::PerIteration(calls)) => Some(calls.as_slice()),
        _ => None,
    });
    let ncall = match per_iteration_calls {
        Some(calls) => CallCount::PerIteration(calls),
        None => CallCount::Total(runs.iter().map(RunTrace::total_calls).sum()),
    };
    let total_calls = ncall.total();

    let mut entries: IndexMap<TraceField, FieldValue> = IndexMap::new();
    entries.insert(TraceField::Niter, FieldValue::Int(pool.len() as u64));
    entries.insert(
        TraceField::Ncall,
        match ncall {
            CallCount::Total(total) => FieldValue::Int(total),
            CallCount::PerIteration(calls) => FieldValue::Ints(calls),
        },
    );
    if total_calls > 0 {
        entries.insert(
            TraceField::Eff,
            FieldValue::Float(100.0 * pool.len() as f64 / total_calls as f64),
        );
    }
    entries.insert(TraceField::Samples, FieldValue::Points(samples));
    entries.insert(TraceField::SamplesId, FieldValue::Ints(samples_id));
    if let Some(samples_it) = gather(runs, &pool, RunTrace::samples_it) {
        entries.insert(TraceField::SamplesIt, FieldValue::Ints(samples_it));
    }
    entries.insert(TraceField::SamplesU, FieldValue::Points(samples_u));
    entries.insert(TraceField::SamplesN, FieldValue::Ints(integrals.samples_n));
    entries.insert(TraceField::Logwt, FieldValue::Floats(integrals.logwt));
    entries.insert(TraceField::Logl, FieldValue::Floats(logl));
    entries.insert(TraceField::Logvol, FieldValue::Floats(integrals.logvol));
    entries.insert(TraceField::Logz, FieldValue::Floats(integrals.logz));
    entries.insert(TraceField::Logzerr, FieldValue::Floats(logzerr));
    entries.insert(TraceField::Logzvar, FieldValue::Floats(integrals.logzvar));
    entries.insert(
        TraceField::Information,
        FieldValue::Floats(integrals.information),
    );
    if let Some(bounditer) = gather(runs, &pool, RunTrace::bounditer) {
        entries.insert(TraceField::Bounditer, FieldValue::Ints(bounditer));
    }
    if let Some(nc) = gather(runs, &pool, RunTrace::nc) {
        entries.insert(TraceField::Nc, FieldValue::Ints(nc));
    }

    let merged = RunTrace::from_fields(entries)?;
    debug!(
        "merged {} runs into {} samples, logz = {:.3} +/- {:.3}",
        runs.len(),
        merged.len(),
        merged.final_logz(),
        merged.final_logzerr()
    );
    Ok(merged)
}
