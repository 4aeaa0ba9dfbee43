use nest_core::NestError;
use serde::{Deserialize, Serialize};

use crate::config::SanityBounds;
use crate::evidence::{sanitize_delta_logz, sanitize_floor, sanitize_logzerr, EvidenceSnapshot};
use crate::trace::RunTrace;

/// Fixed-point `value` padded to `width`, with NaN spelled `nan`.
pub(crate) fn fixed(value: f64, width: usize, precision: usize) -> String {
    if value.is_nan() {
        format!("{:>width$}", "nan")
    } else {
        format!("{value:width$.precision$}")
    }
}

/// State of the sampler at the iteration being reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Current likelihood threshold.
    pub loglstar: f64,
    /// Cumulative log-evidence.
    pub logz: f64,
    /// Variance of the cumulative log-evidence.
    pub logzvar: f64,
    /// Estimated log-evidence still held by the live points.
    pub delta_logz: f64,
    /// Index of the active bounding object.
    pub bounditer: u64,
    /// Calls spent on the latest point.
    pub nc: u64,
    /// Cumulative efficiency in percent.
    pub eff: f64,
}

impl ProgressState {
    /// Reads the state at `iteration` of a trace snapshot.
    ///
    /// `delta_logz` is owned by the sampling loop and has to be passed in.
    pub fn from_trace(
        trace: &RunTrace,
        iteration: usize,
        delta_logz: f64,
    ) -> Result<Self, NestError> {
        // Raw values here; rendering applies the sanity bounds.
        let snapshot = EvidenceSnapshot::at(trace, iteration, &SanityBounds::unclamped())?;
        Ok(Self {
            loglstar: snapshot.loglstar,
            logz: snapshot.logz,
            logzvar: snapshot.logzvar,
            delta_logz,
            bounditer: trace.bounditer().map(|b| b[iteration]).unwrap_or(0),
            nc: trace.nc().map(|nc| nc[iteration]).unwrap_or(0),
            eff: trace.efficiency(),
        })
    }
}

/// What the loop is converging towards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StopTarget {
    /// Static runs stop once `delta_logz` drops below the target.
    Dlogz(f64),
    /// Dynamic runs report their current stopping statistic.
    StopValue(f64),
}

/// Loop-local counters shown alongside the state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressContext {
    /// Current iteration.
    pub niter: u64,
    /// Total likelihood calls so far.
    pub ncall: u64,
    /// Sorted index of the final live point being added, if any.
    pub add_live_it: Option<u64>,
    /// Stopping criterion.
    pub target: StopTarget,
    /// Current batch of a dynamic run.
    pub nbatch: Option<u64>,
    /// Lowest likelihood bound used at the start of sampling.
    pub logl_min: f64,
    /// Highest likelihood bound used when stopping.
    pub logl_max: f64,
}

impl ProgressContext {
    /// Context with unbounded likelihood limits and no batch or live-point index.
    pub fn new(niter: u64, ncall: u64, target: StopTarget) -> Self {
        Self {
            niter,
            ncall,
            add_live_it: None,
            target,
            nbatch: None,
            logl_min: f64::NEG_INFINITY,
            logl_max: f64::INFINITY,
        }
    }
}

/// The same progress report at three widths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressLines {
    /// Every field, prefixed with the iteration.
    pub long: String,
    /// Efficiency, bounds, evidence and stopping criterion.
    pub medium: String,
    /// Efficiency, bounds and evidence, tightly packed.
    pub short: String,
}

impl ProgressLines {
    /// Formats the report; choosing a width is left to the caller.
    pub fn render(state: &ProgressState, ctx: &ProgressContext, bounds: &SanityBounds) -> Self {
        let delta_logz = sanitize_delta_logz(state.delta_logz, bounds);
        let logzerr = sanitize_logzerr(state.logzvar, bounds);
        let logz = sanitize_floor(state.logz, bounds);
        let loglstar = sanitize_floor(state.loglstar, bounds);

        let mut long = Vec::new();
        if let Some(add_live_it) = ctx.add_live_it {
            long.push(format!("+{add_live_it}"));
        }
        let mut short = long.clone();
        if let Some(nbatch) = ctx.nbatch {
            long.push(format!("batch: {nbatch}"));
        }
        long.push(format!("bound: {}", state.bounditer));
        long.push(format!("nc: {}", state.nc));
        long.push(format!("ncall: {}", ctx.ncall));
        let eff = format!("eff(%): {}", fixed(state.eff, 6, 3));
        long.push(eff.clone());
        short.push(eff);
        long.push(format!(
            "loglstar: {} < {} < {}",
            fixed(ctx.logl_min, 6, 3),
            fixed(loglstar, 6, 3),
            fixed(ctx.logl_max, 6, 3)
        ));
        short.push(format!(
            "logl*: {}<{}<{}",
            fixed(ctx.logl_min, 6, 1),
            fixed(loglstar, 6, 1),
            fixed(ctx.logl_max, 6, 1)
        ));
        long.push(format!(
            "logz: {} +/- {}",
            fixed(logz, 6, 3),
            fixed(logzerr, 6, 3)
        ));
        short.push(format!(
            "logz: {}+/-{}",
            fixed(logz, 6, 1),
            fixed(logzerr, 0, 1)
        ));
        let mut medium = short.clone();
        match ctx.target {
            StopTarget::Dlogz(dlogz) => {
                long.push(format!(
                    "dlogz: {} > {}",
                    fixed(delta_logz, 6, 3),
                    fixed(dlogz, 6, 3)
                ));
                medium.push(format!(
                    "dlogz: {}>{}",
                    fixed(delta_logz, 6, 1),
                    fixed(dlogz, 6, 1)
                ));
            }
            StopTarget::StopValue(stop) => {
                let stop = format!("stop: {}", fixed(stop, 6, 3));
                long.push(stop.clone());
                medium.push(stop);
            }
        }
        long.insert(0, format!("iter: {}", ctx.niter));

        Self {
            long: long.join(" | "),
            medium: medium.join(" | "),
            short: short.join("|"),
        }
    }
}
