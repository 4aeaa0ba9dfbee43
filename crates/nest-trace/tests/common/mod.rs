#![allow(dead_code)]

use std::cmp::Ordering;

use nest_core::RunRng;
use nest_trace::evidence::{self, logaddexp};
use nest_trace::{FieldValue, RunTrace};

/// Likelihood and prior transform over the unit cube.
pub struct Problem {
    pub ndim: usize,
    pub loglike: fn(&[f64]) -> f64,
    pub prior_transform: fn(&[f64]) -> Vec<f64>,
}

pub const PLATEAU_HALF_WIDTH: f64 = 3.0;
pub const PLATEAU_RADIUS: f64 = 1.0;
pub const PLATEAU_INSIDE: f64 = 10.0;
pub const PLATEAU_OUTSIDE: f64 = 1.0;

/// Value `A1` inside a disc of radius `R`, `A0` outside.
fn plateau_loglike(x: &[f64]) -> f64 {
    let r = x.iter().map(|v| v * v).sum::<f64>().sqrt();
    if r < PLATEAU_RADIUS {
        PLATEAU_INSIDE.ln()
    } else {
        PLATEAU_OUTSIDE.ln()
    }
}

fn plateau_prior(u: &[f64]) -> Vec<f64> {
    u.iter()
        .map(|v| (2.0 * v - 1.0) * PLATEAU_HALF_WIDTH)
        .collect()
}

pub fn plateau_problem() -> Problem {
    Problem {
        ndim: 2,
        loglike: plateau_loglike,
        prior_transform: plateau_prior,
    }
}

/// `ln(A0 + pi R^2 (A1 - A0) / (2S)^2)`.
pub fn plateau_logz_true() -> f64 {
    let area = std::f64::consts::PI * PLATEAU_RADIUS.powi(2);
    let volume = (2.0 * PLATEAU_HALF_WIDTH).powi(2);
    (PLATEAU_OUTSIDE + area * (PLATEAU_INSIDE - PLATEAU_OUTSIDE) / volume).ln()
}

pub const GAUSSIAN_HALF_WIDTH: f64 = 5.0;

/// Unit normal density in two dimensions.
fn gaussian_loglike(x: &[f64]) -> f64 {
    let r2 = x.iter().map(|v| v * v).sum::<f64>();
    -0.5 * r2 - (2.0 * std::f64::consts::PI).ln()
}

fn gaussian_prior(u: &[f64]) -> Vec<f64> {
    u.iter()
        .map(|v| (2.0 * v - 1.0) * GAUSSIAN_HALF_WIDTH)
        .collect()
}

pub fn gaussian_problem() -> Problem {
    Problem {
        ndim: 2,
        loglike: gaussian_loglike,
        prior_transform: gaussian_prior,
    }
}

/// The density integrates to one over the cube up to ~1e-6, so `Z = 1 / (2S)^2`.
pub fn gaussian_logz_true() -> f64 {
    -(2.0 * GAUSSIAN_HALF_WIDTH).powi(2).ln()
}

struct LivePoint {
    u: Vec<f64>,
    v: Vec<f64>,
    logl: f64,
    it: u64,
}

struct DeadPoint {
    point: LivePoint,
    id: u64,
    nc: u64,
}

fn draw(problem: &Problem, rng: &mut RunRng, it: u64) -> LivePoint {
    let u = rng.unit_point(problem.ndim);
    let v = (problem.prior_transform)(&u);
    let logl = (problem.loglike)(&v);
    LivePoint { u, v, logl, it }
}

/// Static nested sampler with uniform rejection proposals and no bounds.
///
/// Stops when the remaining evidence estimate falls below `dlogz` or when
/// every live point shares one likelihood, then appends the live points.
pub fn run_static(problem: &Problem, nlive: usize, dlogz: f64, seed: u64, substream: u64) -> RunTrace {
    let mut rng = RunRng::new(seed, substream);
    let mut live: Vec<LivePoint> = (0..nlive).map(|_| draw(problem, &mut rng, 0)).collect();
    let mut ncall = nlive as u64;
    let mut dead: Vec<DeadPoint> = Vec::new();
    let mut logvol = 0.0f64;
    let mut logz = f64::NEG_INFINITY;

    loop {
        let (worst, loglstar) = live
            .iter()
            .enumerate()
            .map(|(idx, point)| (idx, point.logl))
            .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best });
        let loglmax = live
            .iter()
            .map(|point| point.logl)
            .fold(f64::NEG_INFINITY, f64::max);
        if loglmax == loglstar {
            break;
        }
        let delta = logaddexp(logz, loglmax + logvol) - logz;
        if delta < dlogz {
            break;
        }

        let next_logvol = logvol - 1.0 / nlive as f64;
        let logdvol = evidence::logdiffexp(logvol, next_logvol);
        logz = logaddexp(logz, loglstar + logdvol);
        logvol = next_logvol;

        let iteration = dead.len() as u64 + 1;
        let mut nc = 0u64;
        let replacement = loop {
            let candidate = draw(problem, &mut rng, iteration);
            nc += 1;
            if candidate.logl > loglstar {
                break candidate;
            }
        };
        ncall += nc;
        let point = std::mem::replace(&mut live[worst], replacement);
        dead.push(DeadPoint {
            point,
            id: worst as u64,
            nc,
        });
    }

    let niter = dead.len();
    let mut remaining: Vec<(usize, LivePoint)> = live.into_iter().enumerate().collect();
    remaining.sort_by(|a, b| a.1.logl.partial_cmp(&b.1.logl).unwrap_or(Ordering::Equal));
    for (slot, point) in remaining {
        dead.push(DeadPoint {
            point,
            id: slot as u64,
            nc: 1,
        });
    }

    let logl: Vec<f64> = dead.iter().map(|d| d.point.logl).collect();
    let n = logl.len();
    let counts: Vec<u64> = (0..n).map(|i| ((n - i) as u64).min(nlive as u64)).collect();
    let integrals = evidence::integrate(&logl, &counts, true).unwrap();
    let logzerr = integrals.logzerr();

    RunTrace::from_entries(vec![
        ("nlive", FieldValue::Int(nlive as u64)),
        ("niter", FieldValue::Int(niter as u64)),
        ("ncall", FieldValue::Int(ncall)),
        ("eff", FieldValue::Float(100.0 * n as f64 / ncall as f64)),
        (
            "samples",
            FieldValue::Points(dead.iter().map(|d| d.point.v.clone()).collect()),
        ),
        (
            "samples_id",
            FieldValue::Ints(dead.iter().map(|d| d.id).collect()),
        ),
        (
            "samples_it",
            FieldValue::Ints(dead.iter().map(|d| d.point.it).collect()),
        ),
        (
            "samples_u",
            FieldValue::Points(dead.iter().map(|d| d.point.u.clone()).collect()),
        ),
        ("logwt", FieldValue::Floats(integrals.logwt)),
        ("logl", FieldValue::Floats(logl)),
        ("logvol", FieldValue::Floats(integrals.logvol)),
        ("logz", FieldValue::Floats(integrals.logz)),
        ("logzerr", FieldValue::Floats(logzerr)),
        ("logzvar", FieldValue::Floats(integrals.logzvar)),
        ("information", FieldValue::Floats(integrals.information)),
        ("nc", FieldValue::Ints(dead.iter().map(|d| d.nc).collect())),
    ])
    .unwrap()
}

/// Static trace over the given likelihoods with consistent accounting.
///
/// `niter` equal to the sample count means no final live points were
/// appended; `niter + nlive` samples means they were.
pub fn static_trace(logl: Vec<f64>, nlive: u64, niter: u64) -> RunTrace {
    let n = logl.len();
    let counts: Vec<u64> = if niter as usize == n {
        vec![nlive; n]
    } else {
        (0..n).map(|i| ((n - i) as u64).min(nlive)).collect()
    };
    let integrals = evidence::integrate(&logl, &counts, true).unwrap();
    let logzerr = integrals.logzerr();
    RunTrace::from_entries(vec![
        ("nlive", FieldValue::Int(nlive)),
        ("niter", FieldValue::Int(niter)),
        ("ncall", FieldValue::Int(2 * n as u64)),
        ("samples", unit_points(n, 1)),
        ("samples_id", FieldValue::Ints((0..n as u64).map(|i| i % nlive).collect())),
        ("samples_u", unit_points(n, 1)),
        ("logwt", FieldValue::Floats(integrals.logwt)),
        ("logl", FieldValue::Floats(logl)),
        ("logz", FieldValue::Floats(integrals.logz)),
        ("logzerr", FieldValue::Floats(logzerr)),
    ])
    .unwrap()
}

/// `n` points of dimension `ndim` spread over the unit interval.
pub fn unit_points(n: usize, ndim: usize) -> FieldValue {
    FieldValue::Points(
        (0..n)
            .map(|i| vec![(i as f64 + 0.5) / n.max(1) as f64; ndim])
            .collect(),
    )
}

/// Minimal valid entries for a static trace with strictly increasing likelihoods.
pub fn minimal_entries(n: usize, nlive: u64) -> Vec<(&'static str, FieldValue)> {
    vec![
        ("samples_u", unit_points(n, 2)),
        ("samples", unit_points(n, 2)),
        ("samples_id", FieldValue::Ints((0..n as u64).collect())),
        ("logl", FieldValue::Floats((0..n).map(|i| i as f64 * 0.1).collect())),
        ("logwt", FieldValue::Floats(vec![-1.0; n])),
        ("logz", FieldValue::Floats((0..n).map(|i| -5.0 + i as f64 * 0.01).collect())),
        ("logzerr", FieldValue::Floats(vec![0.1; n])),
        ("nlive", FieldValue::Int(nlive)),
    ]
}
