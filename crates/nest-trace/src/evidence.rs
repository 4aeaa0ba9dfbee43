use log::trace;
use nest_core::errors::{codes, ErrorInfo};
use nest_core::NestError;
use serde::{Deserialize, Serialize};

use crate::config::SanityBounds;
use crate::trace::RunTrace;

/// Stand-in for the likelihood of the point preceding the first one.
const LOGL_PAD: f64 = -1e300;

/// Numerically stable `ln(exp(a) + exp(b))`.
pub fn logaddexp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY && b == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let max = a.max(b);
    max + (-(a - b).abs()).exp().ln_1p()
}

/// Numerically stable `ln(exp(a) - exp(b))` for `a >= b`.
pub fn logdiffexp(a: f64, b: f64) -> f64 {
    if b == f64::NEG_INFINITY {
        return a;
    }
    if a <= b {
        return f64::NEG_INFINITY;
    }
    a + (-(b - a).exp()).ln_1p()
}

/// Live-point counts entering the volume recursion.
///
/// Without grouping the counts are returned unchanged. With grouping, each
/// block of equal log-likelihoods takes the count `N` at its first member and
/// assigns `N - j` to its `j`-th member (never below 1), which shrinks the
/// volume across the block by `(N - k + 1) / (N + 1)` as a whole.
pub fn effective_counts(logl: &[f64], live_counts: &[u64], group_plateaus: bool) -> Vec<u64> {
    if !group_plateaus {
        return live_counts.to_vec();
    }
    let mut counts = Vec::with_capacity(live_counts.len());
    let mut block_start = 0;
    for (idx, &count) in live_counts.iter().enumerate() {
        if idx == 0 || logl[idx] != logl[idx - 1] {
            block_start = idx;
            counts.push(count);
        } else {
            let shared = counts[block_start];
            counts.push(shared.saturating_sub((idx - block_start) as u64).max(1));
        }
    }
    counts
}

/// Expected log prior volume after each point: `logvol_i = logvol_{i-1} + ln(n_i / (n_i + 1))`.
pub fn log_volumes(counts: &[u64]) -> Vec<f64> {
    let mut logvol = Vec::with_capacity(counts.len());
    let mut current = 0.0;
    for &count in counts {
        current -= (1.0 / count.max(1) as f64).ln_1p();
        logvol.push(current);
    }
    logvol
}

/// Per-iteration quantities derived from likelihoods and volumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integrals {
    /// Live-point counts used in the volume recursion.
    pub samples_n: Vec<u64>,
    /// Expected log prior volume.
    pub logvol: Vec<f64>,
    /// Log-importance-weights.
    pub logwt: Vec<f64>,
    /// Cumulative log-evidence.
    pub logz: Vec<f64>,
    /// Variance of the cumulative log-evidence.
    pub logzvar: Vec<f64>,
    /// Cumulative information.
    pub information: Vec<f64>,
}

impl Integrals {
    /// Standard errors matching [`Integrals::logzvar`].
    pub fn logzerr(&self) -> Vec<f64> {
        self.logzvar
            .iter()
            .copied()
            .map(logzerr_from_variance)
            .collect()
    }
}

/// Runs the full accounting for a likelihood sequence and its live-point schedule.
pub fn integrate(
    logl: &[f64],
    live_counts: &[u64],
    group_plateaus: bool,
) -> Result<Integrals, NestError> {
    if logl.len() != live_counts.len() {
        return Err(NestError::Schema(
            ErrorInfo::new(
                codes::LENGTH_MISMATCH,
                "likelihoods and live-point counts differ in length",
            )
            .with_context("logl", logl.len().to_string())
            .with_context("live_counts", live_counts.len().to_string()),
        ));
    }
    let samples_n = effective_counts(logl, live_counts, group_plateaus);
    let logvol = log_volumes(&samples_n);
    let (logwt, logz, logzvar, information) = compute_integrals(logl, &logvol);
    Ok(Integrals {
        samples_n,
        logvol,
        logwt,
        logz,
        logzvar,
        information,
    })
}

type IntegralColumns = (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>);

/// Trapezoid weights, cumulative evidence, its variance and the information.
///
/// `logl` and `logvol` must have equal length.
pub fn compute_integrals(logl: &[f64], logvol: &[f64]) -> IntegralColumns {
    let n = logl.len().min(logvol.len());
    let mut logwt = Vec::with_capacity(n);
    let mut logdvol2 = Vec::with_capacity(n);
    let mut logz = Vec::with_capacity(n);

    let mut prev_logl = LOGL_PAD;
    let mut prev_logvol = 0.0;
    let mut running = f64::NEG_INFINITY;
    for idx in 0..n {
        let half = logdiffexp(prev_logvol, logvol[idx]) + 0.5f64.ln();
        let weight = logaddexp(prev_logl, logl[idx]) + half;
        running = logaddexp(running, weight);
        logwt.push(weight);
        logdvol2.push(half);
        logz.push(running);
        prev_logl = logl[idx];
        prev_logvol = logvol[idx];
    }

    let logzmax = running;
    if !logzmax.is_finite() {
        return (logwt, logz, vec![0.0; n], vec![0.0; n]);
    }

    let mut information = Vec::with_capacity(n);
    let mut logzvar = Vec::with_capacity(n);
    let mut part = 0.0;
    let mut prev_h = 0.0;
    let mut var = 0.0;
    let mut prev_logl = LOGL_PAD;
    let mut prev_logvol = 0.0;
    for idx in 0..n {
        let scale = logdvol2[idx] - logzmax;
        part += weighted(logl[idx], scale) + weighted(prev_logl, scale);
        let h = part - logzmax * (logz[idx] - logzmax).exp();
        var += (h - prev_h) * (logvol[idx] - prev_logvol);
        information.push(h);
        logzvar.push(var.abs());
        prev_h = h;
        prev_logl = logl[idx];
        prev_logvol = logvol[idx];
    }
    (logwt, logz, logzvar, information)
}

fn weighted(logl: f64, log_scale: f64) -> f64 {
    let weight = (logl + log_scale).exp();
    if weight == 0.0 {
        0.0
    } else {
        weight * logl
    }
}

/// Standard error for a stored trace: NaN unless the variance is finite and non-negative.
pub fn logzerr_from_variance(variance: f64) -> f64 {
    if variance.is_finite() && variance >= 0.0 {
        variance.sqrt()
    } else {
        f64::NAN
    }
}

/// Standard error for display: NaN when the variance is negative or above the ceiling.
pub fn sanitize_logzerr(variance: f64, bounds: &SanityBounds) -> f64 {
    if variance >= 0.0 && variance <= bounds.variance_ceiling {
        variance.sqrt()
    } else {
        trace!("variance {variance} reported as undefined");
        f64::NAN
    }
}

/// Remaining evidence estimate for display: `+inf` above the ceiling.
pub fn sanitize_delta_logz(delta_logz: f64, bounds: &SanityBounds) -> f64 {
    if delta_logz > bounds.delta_logz_ceiling {
        trace!("delta_logz {delta_logz} reported as unbounded");
        f64::INFINITY
    } else {
        delta_logz
    }
}

/// Evidence or likelihood for display: `-inf` at or below the floor sentinel.
pub fn sanitize_floor(value: f64, bounds: &SanityBounds) -> f64 {
    if value <= bounds.logl_floor {
        f64::NEG_INFINITY
    } else {
        value
    }
}

/// Sanitized evidence figures at one iteration of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSnapshot {
    /// Iteration the snapshot was taken at.
    pub iteration: usize,
    /// Likelihood threshold at the iteration.
    pub loglstar: f64,
    /// Cumulative log-evidence.
    pub logz: f64,
    /// Raw variance of the cumulative log-evidence.
    pub logzvar: f64,
    /// Standard error, NaN when the variance is degenerate.
    pub logzerr: f64,
}

impl EvidenceSnapshot {
    /// Takes the snapshot at `iteration`.
    ///
    /// The variance comes from `logzvar` when the trace records it and from
    /// the square of `logzerr` otherwise.
    pub fn at(
        trace: &RunTrace,
        iteration: usize,
        bounds: &SanityBounds,
    ) -> Result<Self, NestError> {
        if iteration >= trace.len() {
            return Err(NestError::Schema(
                ErrorInfo::new(
                    codes::ITERATION_OUT_OF_RANGE,
                    format!("iteration {iteration} is past the end of the trace"),
                )
                .with_context("iteration", iteration.to_string())
                .with_context("len", trace.len().to_string()),
            ));
        }
        let logzvar = match trace.logzvar() {
            Some(variance) => variance[iteration],
            None => trace.logzerr()[iteration].powi(2),
        };
        Ok(Self {
            iteration,
            loglstar: sanitize_floor(trace.logl()[iteration], bounds),
            logz: sanitize_floor(trace.logz()[iteration], bounds),
            logzvar,
            logzerr: sanitize_logzerr(logzvar, bounds),
        })
    }

    /// Snapshot at the last iteration.
    pub fn last(trace: &RunTrace, bounds: &SanityBounds) -> Result<Self, NestError> {
        Self::at(trace, trace.len().saturating_sub(1), bounds)
    }
}
