use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use log::debug;
use nest_core::errors::{codes, ErrorInfo};
use nest_core::NestError;

use crate::evidence::logzerr_from_variance;
use crate::fields::{CallCount, FieldKey, FieldRef, FieldValue, LiveSchedule, TraceField};
use crate::progress::fixed;

/// Relative tolerance when checking `logzerr` against `sqrt(logzvar)`.
const LOGZERR_RTOL: f64 = 1e-9;

/// Validated, immutable record of one nested-sampling run.
///
/// Every per-iteration sequence has one entry per accepted point, in
/// iteration order, which is also non-decreasing log-likelihood order. A trace
/// is built once through [`RunTrace::from_entries`]; the only way to change a
/// field afterwards is [`RunTrace::with_fields`], which returns a sibling
/// trace and leaves the original untouched.
///
/// Keys outside the schema are kept as extra fields in their given position.
/// Two traces are equal when they carry the same keys in the same order with
/// equal values, NaN matching NaN.
#[derive(Debug, Clone)]
pub struct RunTrace {
    order: Vec<FieldKey>,
    extras: IndexMap<String, FieldValue>,
    samples_u: Vec<Vec<f64>>,
    samples: Vec<Vec<f64>>,
    samples_id: Vec<u64>,
    samples_it: Option<Vec<u64>>,
    logl: Vec<f64>,
    logwt: Vec<f64>,
    logz: Vec<f64>,
    logzerr: Vec<f64>,
    logzvar: Option<Vec<f64>>,
    logvol: Option<Vec<f64>>,
    information: Option<Vec<f64>>,
    live: LiveSchedule,
    niter: Option<u64>,
    ncall: Option<CallCount>,
    eff: Option<f64>,
    bounditer: Option<Vec<u64>>,
    nc: Option<Vec<u64>>,
}

#[derive(Default)]
struct Slots {
    samples_u: Option<Vec<Vec<f64>>>,
    samples: Option<Vec<Vec<f64>>>,
    samples_id: Option<Vec<u64>>,
    samples_it: Option<Vec<u64>>,
    logl: Option<Vec<f64>>,
    logwt: Option<Vec<f64>>,
    logz: Option<Vec<f64>>,
    logzerr: Option<Vec<f64>>,
    logzvar: Option<Vec<f64>>,
    logvol: Option<Vec<f64>>,
    information: Option<Vec<f64>>,
    nlive: Option<u64>,
    samples_n: Option<Vec<u64>>,
    niter: Option<u64>,
    ncall: Option<CallCount>,
    eff: Option<f64>,
    bounditer: Option<Vec<u64>>,
    nc: Option<Vec<u64>>,
}

impl Slots {
    fn store(&mut self, field: TraceField, value: FieldValue) -> Result<(), NestError> {
        match field {
            TraceField::SamplesU => self.samples_u = Some(into_points(field, value)?),
            TraceField::Samples => self.samples = Some(into_points(field, value)?),
            TraceField::SamplesId => self.samples_id = Some(into_ints(field, value)?),
            TraceField::SamplesIt => self.samples_it = Some(into_ints(field, value)?),
            TraceField::Logl => self.logl = Some(into_floats(field, value)?),
            TraceField::Logwt => self.logwt = Some(into_floats(field, value)?),
            TraceField::Logz => self.logz = Some(into_floats(field, value)?),
            TraceField::Logzerr => self.logzerr = Some(into_floats(field, value)?),
            TraceField::Logzvar => self.logzvar = Some(into_floats(field, value)?),
            TraceField::Logvol => self.logvol = Some(into_floats(field, value)?),
            TraceField::Information => self.information = Some(into_floats(field, value)?),
            TraceField::Nlive => self.nlive = Some(into_int(field, value)?),
            TraceField::SamplesN => self.samples_n = Some(into_ints(field, value)?),
            TraceField::Niter => self.niter = Some(into_int(field, value)?),
            TraceField::Ncall => {
                self.ncall = Some(match value {
                    FieldValue::Int(total) => CallCount::Total(total),
                    FieldValue::Ints(calls) => CallCount::PerIteration(calls),
                    other => return Err(other.type_error(field)),
                })
            }
            TraceField::Eff => self.eff = Some(into_float(field, value)?),
            TraceField::Bounditer => self.bounditer = Some(into_ints(field, value)?),
            TraceField::Nc => self.nc = Some(into_ints(field, value)?),
        }
        Ok(())
    }
}

fn into_int(field: TraceField, value: FieldValue) -> Result<u64, NestError> {
    match value {
        FieldValue::Int(value) => Ok(value),
        other => Err(other.type_error(field)),
    }
}

fn into_float(field: TraceField, value: FieldValue) -> Result<f64, NestError> {
    match value {
        FieldValue::Float(value) => Ok(value),
        FieldValue::Int(value) => Ok(value as f64),
        other => Err(other.type_error(field)),
    }
}

fn into_ints(field: TraceField, value: FieldValue) -> Result<Vec<u64>, NestError> {
    match value {
        FieldValue::Ints(values) => Ok(values),
        FieldValue::Floats(values) if values.is_empty() => Ok(Vec::new()),
        FieldValue::Points(values) if values.is_empty() => Ok(Vec::new()),
        other => Err(other.type_error(field)),
    }
}

fn into_floats(field: TraceField, value: FieldValue) -> Result<Vec<f64>, NestError> {
    match value {
        FieldValue::Floats(values) => Ok(values),
        // Integer-valued sequences arrive as `Ints` through untagged deserialization.
        FieldValue::Ints(values) => Ok(values.into_iter().map(|v| v as f64).collect()),
        FieldValue::Points(values) if values.is_empty() => Ok(Vec::new()),
        other => Err(other.type_error(field)),
    }
}

fn into_points(field: TraceField, value: FieldValue) -> Result<Vec<Vec<f64>>, NestError> {
    match value {
        FieldValue::Points(values) => Ok(values),
        FieldValue::Ints(values) if values.is_empty() => Ok(Vec::new()),
        FieldValue::Floats(values) if values.is_empty() => Ok(Vec::new()),
        other => Err(other.type_error(field)),
    }
}

fn schema_error(code: &str, message: impl Into<String>) -> ErrorInfo {
    ErrorInfo::new(code, message)
}

fn missing(field: TraceField) -> NestError {
    NestError::Schema(
        schema_error(
            codes::MISSING_FIELD,
            format!("key `{field}` must be provided"),
        )
        .with_context("field", field.as_str()),
    )
}

fn check_length(field: TraceField, len: usize, expected: usize) -> Result<(), NestError> {
    if len == expected {
        return Ok(());
    }
    Err(NestError::Schema(
        schema_error(
            codes::LENGTH_MISMATCH,
            format!("field `{field}` has {len} entries but `logl` has {expected}"),
        )
        .with_context("field", field.as_str())
        .with_context("len", len.to_string())
        .with_context("expected", expected.to_string()),
    ))
}

fn check_dimensions(field: TraceField, points: &[Vec<f64>]) -> Result<(), NestError> {
    let Some(first) = points.first() else {
        return Ok(());
    };
    if let Some((idx, row)) = points
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != first.len())
    {
        return Err(NestError::Schema(
            schema_error(
                codes::LENGTH_MISMATCH,
                format!("row {idx} of `{field}` has dimension {}", row.len()),
            )
            .with_context("field", field.as_str())
            .with_context("ndim", first.len().to_string())
            .with_context("row", idx.to_string()),
        ));
    }
    Ok(())
}

fn invalid_value(field: TraceField, index: usize, message: impl Into<String>) -> NestError {
    NestError::Schema(
        schema_error(codes::INVALID_VALUE, message)
            .with_context("field", field.as_str())
            .with_context("index", index.to_string()),
    )
}

impl RunTrace {
    /// Builds a trace from an ordered mapping of field names to values.
    ///
    /// All checks run before any trace exists: repeated names, value shapes,
    /// presence of the required fields, exactly one of `nlive` and
    /// `samples_n`, equal per-iteration lengths, consistent sample
    /// dimensionality, non-decreasing `logl` and a `logzerr` that agrees with
    /// `logzvar` when both are given. Names outside the schema are stored as
    /// extra fields.
    pub fn from_entries<I, K>(entries: I) -> Result<Self, NestError>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: AsRef<str>,
    {
        let mut order = Vec::new();
        let mut seen = BTreeSet::new();
        let mut slots = Slots::default();
        let mut extras = IndexMap::new();
        for (key, value) in entries {
            let key = FieldKey::parse(key.as_ref());
            if !seen.insert(key.as_str().to_string()) {
                return Err(NestError::Schema(
                    schema_error(
                        codes::DUPLICATE_FIELD,
                        format!("key `{key}` provided more than once"),
                    )
                    .with_context("field", key.as_str()),
                ));
            }
            match &key {
                FieldKey::Known(field) => slots.store(*field, value)?,
                FieldKey::Extra(name) => {
                    extras.insert(name.clone(), value);
                }
            }
            order.push(key);
        }
        Self::from_slots(order, slots, extras)
    }

    /// Builds a trace from typed field names, preserving their order.
    pub fn from_fields<I>(entries: I) -> Result<Self, NestError>
    where
        I: IntoIterator<Item = (TraceField, FieldValue)>,
    {
        Self::from_entries(
            entries
                .into_iter()
                .map(|(field, value)| (field.as_str(), value)),
        )
    }

    fn from_slots(
        order: Vec<FieldKey>,
        slots: Slots,
        extras: IndexMap<String, FieldValue>,
    ) -> Result<Self, NestError> {
        let Slots {
            samples_u,
            samples,
            samples_id,
            samples_it,
            logl,
            logwt,
            logz,
            logzerr,
            logzvar,
            logvol,
            information,
            nlive,
            samples_n,
            niter,
            ncall,
            eff,
            bounditer,
            nc,
        } = slots;

        // Required keys are checked in schema order so the reported key is stable.
        let samples_u = samples_u.ok_or_else(|| missing(TraceField::SamplesU))?;
        let samples_id = samples_id.ok_or_else(|| missing(TraceField::SamplesId))?;
        let logl = logl.ok_or_else(|| missing(TraceField::Logl))?;
        let logwt = logwt.ok_or_else(|| missing(TraceField::Logwt))?;
        let logz = logz.ok_or_else(|| missing(TraceField::Logz))?;
        let logzerr = logzerr.ok_or_else(|| missing(TraceField::Logzerr))?;
        let samples = samples.ok_or_else(|| missing(TraceField::Samples))?;

        let live = match (nlive, samples_n) {
            (Some(nlive), None) => LiveSchedule::Static { nlive },
            (None, Some(samples_n)) => LiveSchedule::Dynamic { samples_n },
            (None, None) => {
                return Err(NestError::Schema(
                    schema_error(
                        codes::MISSING_LIVE_INFO,
                        "trace requires either `nlive` or `samples_n`",
                    )
                    .with_hint("static runs supply `nlive`, dynamic runs `samples_n`"),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(NestError::Schema(
                    schema_error(
                        codes::AMBIGUOUS_LIVE_INFO,
                        "trace carries both `nlive` and `samples_n`",
                    )
                    .with_hint("drop one of the two live-point fields"),
                ))
            }
        };

        let n = logl.len();
        check_length(TraceField::SamplesU, samples_u.len(), n)?;
        check_length(TraceField::Samples, samples.len(), n)?;
        check_length(TraceField::SamplesId, samples_id.len(), n)?;
        check_length(TraceField::Logwt, logwt.len(), n)?;
        check_length(TraceField::Logz, logz.len(), n)?;
        check_length(TraceField::Logzerr, logzerr.len(), n)?;
        let optional_floats = [
            (TraceField::Logzvar, &logzvar),
            (TraceField::Logvol, &logvol),
            (TraceField::Information, &information),
        ];
        for (field, values) in optional_floats {
            if let Some(values) = values {
                check_length(field, values.len(), n)?;
            }
        }
        let optional_ints = [
            (TraceField::SamplesIt, &samples_it),
            (TraceField::Bounditer, &bounditer),
            (TraceField::Nc, &nc),
        ];
        for (field, values) in optional_ints {
            if let Some(values) = values {
                check_length(field, values.len(), n)?;
            }
        }
        if let Some(CallCount::PerIteration(calls)) = &ncall {
            check_length(TraceField::Ncall, calls.len(), n)?;
        }
        check_dimensions(TraceField::SamplesU, &samples_u)?;
        check_dimensions(TraceField::Samples, &samples)?;

        match &live {
            LiveSchedule::Static { nlive } => {
                if *nlive == 0 {
                    return Err(invalid_value(
                        TraceField::Nlive,
                        0,
                        "`nlive` must be at least 1",
                    ));
                }
            }
            LiveSchedule::Dynamic { samples_n } => {
                check_length(TraceField::SamplesN, samples_n.len(), n)?;
                if let Some(idx) = samples_n.iter().position(|&count| count == 0) {
                    return Err(invalid_value(
                        TraceField::SamplesN,
                        idx,
                        "every `samples_n` entry must be at least 1",
                    ));
                }
            }
        }

        if let Some(idx) = logl.iter().position(|value| value.is_nan()) {
            return Err(NestError::Schema(
                schema_error(codes::UNSORTED_LOGL, "`logl` contains NaN")
                    .with_context("index", idx.to_string()),
            ));
        }
        if let Some(idx) = logl.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(NestError::Schema(
                schema_error(
                    codes::UNSORTED_LOGL,
                    format!(
                        "`logl` decreases from {} to {} at iteration {}",
                        logl[idx],
                        logl[idx + 1],
                        idx + 1
                    ),
                )
                .with_context("index", (idx + 1).to_string()),
            ));
        }
        if let Some(idx) = logzerr.iter().position(|value| *value < 0.0) {
            return Err(invalid_value(
                TraceField::Logzerr,
                idx,
                "`logzerr` must be non-negative or NaN",
            ));
        }
        if let Some(variance) = &logzvar {
            let mismatch = variance.iter().zip(&logzerr).position(|(var, err)| {
                let expected = logzerr_from_variance(*var);
                if expected.is_nan() || err.is_nan() {
                    !(expected.is_nan() && err.is_nan())
                } else {
                    (err - expected).abs() > LOGZERR_RTOL * expected.max(1.0)
                }
            });
            if let Some(idx) = mismatch {
                return Err(NestError::Schema(
                    schema_error(
                        codes::INVALID_VALUE,
                        format!(
                            "`logzerr` is {} at iteration {idx} but `logzvar` implies {}",
                            logzerr[idx],
                            logzerr_from_variance(variance[idx])
                        ),
                    )
                    .with_context("field", TraceField::Logzerr.as_str())
                    .with_context("index", idx.to_string())
                    .with_hint("substitute `logzvar` together with the matching `logzerr`"),
                ));
            }
        }

        let trace = Self {
            order,
            extras,
            samples_u,
            samples,
            samples_id,
            samples_it,
            logl,
            logwt,
            logz,
            logzerr,
            logzvar,
            logvol,
            information,
            live,
            niter,
            ncall,
            eff,
            bounditer,
            nc,
        };
        trace.live_counts()?;
        debug!(
            "built {} trace with {} samples",
            if trace.is_dynamic() { "dynamic" } else { "static" },
            trace.len()
        );
        Ok(trace)
    }

    /// Returns a new trace with the named fields replaced.
    ///
    /// Fields not named keep their value and position. Overrides naming a
    /// field the trace does not carry are appended after the existing fields.
    /// The result goes through the same validation as [`RunTrace::from_entries`].
    pub fn with_fields<I, K>(&self, overrides: I) -> Result<Self, NestError>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: AsRef<str>,
    {
        let mut entries: IndexMap<FieldKey, FieldValue> = self
            .items()
            .map(|(key, value)| (key.clone(), value.to_value()))
            .collect();
        for (key, value) in overrides {
            entries.insert(FieldKey::parse(key.as_ref()), value);
        }
        Self::from_entries(entries)
    }

    /// Looks up a field by its mapping key.
    ///
    /// Fails with `unknown-field` when the trace does not carry the key.
    pub fn get(&self, key: &str) -> Result<FieldRef<'_>, NestError> {
        self.value(&FieldKey::parse(key)).ok_or_else(|| {
            NestError::Schema(
                schema_error(
                    codes::UNKNOWN_FIELD,
                    format!("trace does not carry `{key}`"),
                )
                .with_context("field", key),
            )
        })
    }

    /// Value stored under a key, schema or extra.
    pub fn value(&self, key: &FieldKey) -> Option<FieldRef<'_>> {
        match key {
            FieldKey::Known(field) => self.field(*field),
            FieldKey::Extra(name) => self.extras.get(name).map(FieldValue::view),
        }
    }

    /// Fields outside the schema, in construction order.
    pub fn extras(&self) -> &IndexMap<String, FieldValue> {
        &self.extras
    }

    /// Returns a typed field, or `None` when the trace does not carry it.
    pub fn field(&self, field: TraceField) -> Option<FieldRef<'_>> {
        if !self.order.contains(&FieldKey::Known(field)) {
            return None;
        }
        let value = match field {
            TraceField::SamplesU => FieldRef::Points(&self.samples_u),
            TraceField::Samples => FieldRef::Points(&self.samples),
            TraceField::SamplesId => FieldRef::Ints(&self.samples_id),
            TraceField::SamplesIt => FieldRef::Ints(self.samples_it.as_deref()?),
            TraceField::Logl => FieldRef::Floats(&self.logl),
            TraceField::Logwt => FieldRef::Floats(&self.logwt),
            TraceField::Logz => FieldRef::Floats(&self.logz),
            TraceField::Logzerr => FieldRef::Floats(&self.logzerr),
            TraceField::Logzvar => FieldRef::Floats(self.logzvar.as_deref()?),
            TraceField::Logvol => FieldRef::Floats(self.logvol.as_deref()?),
            TraceField::Information => FieldRef::Floats(self.information.as_deref()?),
            TraceField::Nlive => match &self.live {
                LiveSchedule::Static { nlive } => FieldRef::Int(*nlive),
                LiveSchedule::Dynamic { .. } => return None,
            },
            TraceField::SamplesN => match &self.live {
                LiveSchedule::Dynamic { samples_n } => FieldRef::Ints(samples_n),
                LiveSchedule::Static { .. } => return None,
            },
            TraceField::Niter => FieldRef::Int(self.niter?),
            TraceField::Ncall => match self.ncall.as_ref()? {
                CallCount::Total(total) => FieldRef::Int(*total),
                CallCount::PerIteration(calls) => FieldRef::Ints(calls),
            },
            TraceField::Eff => FieldRef::Float(self.eff?),
            TraceField::Bounditer => FieldRef::Ints(self.bounditer.as_deref()?),
            TraceField::Nc => FieldRef::Ints(self.nc.as_deref()?),
        };
        Some(value)
    }

    /// Iterates over `(key, value)` pairs in construction order.
    pub fn items(&self) -> impl Iterator<Item = (&FieldKey, FieldRef<'_>)> + '_ {
        self.order
            .iter()
            .filter_map(move |key| self.value(key).map(|value| (key, value)))
    }

    /// Keys in construction order.
    pub fn keys(&self) -> &[FieldKey] {
        &self.order
    }

    /// Whether the trace carries a per-iteration live-point schedule.
    pub fn is_dynamic(&self) -> bool {
        matches!(self.live, LiveSchedule::Dynamic { .. })
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.logl.len()
    }

    /// Whether the trace holds no points.
    pub fn is_empty(&self) -> bool {
        self.logl.is_empty()
    }

    /// Number of live points active when each point died.
    ///
    /// Static traces either record only the main iterations (`niter` equal to
    /// the sample count, or `niter` absent) or additionally the final live
    /// points, whose counts fall from `nlive` to 1.
    pub fn live_counts(&self) -> Result<Vec<u64>, NestError> {
        let n = self.len();
        match &self.live {
            LiveSchedule::Dynamic { samples_n } => Ok(samples_n.clone()),
            LiveSchedule::Static { nlive } => {
                let niter = self.niter.map(|niter| niter as usize).unwrap_or(n);
                if niter == n {
                    Ok(vec![*nlive; n])
                } else if niter.checked_add(*nlive as usize) == Some(n) {
                    Ok((0..n).map(|i| ((n - i) as u64).min(*nlive)).collect())
                } else {
                    Err(NestError::Schema(
                        schema_error(
                            codes::LENGTH_MISMATCH,
                            "sample count matches neither `niter` nor `niter + nlive`",
                        )
                        .with_context("samples", n.to_string())
                        .with_context("niter", niter.to_string())
                        .with_context("nlive", nlive.to_string()),
                    ))
                }
            }
        }
    }

    /// Dimensionality of the parameter-space samples (0 for an empty trace).
    pub fn ndim(&self) -> usize {
        self.samples.first().map(Vec::len).unwrap_or(0)
    }

    /// Dimensionality of the unit-cube samples (0 for an empty trace).
    pub fn ndim_u(&self) -> usize {
        self.samples_u.first().map(Vec::len).unwrap_or(0)
    }

    /// Number of iterations, falling back to the sample count.
    pub fn niter(&self) -> u64 {
        self.niter.unwrap_or(self.len() as u64)
    }

    /// Total likelihood calls, zero when not recorded.
    pub fn total_calls(&self) -> u64 {
        self.ncall.as_ref().map(CallCount::total).unwrap_or(0)
    }

    /// Sampling efficiency in percent, derived from the calls when not recorded.
    pub fn efficiency(&self) -> f64 {
        match self.eff {
            Some(eff) => eff,
            None => {
                let calls = self.total_calls();
                if calls == 0 {
                    0.0
                } else {
                    100.0 * self.len() as f64 / calls as f64
                }
            }
        }
    }

    /// Final log-evidence estimate (`-inf` for an empty trace).
    pub fn final_logz(&self) -> f64 {
        self.logz.last().copied().unwrap_or(f64::NEG_INFINITY)
    }

    /// Standard error of the final log-evidence estimate (NaN for an empty trace).
    pub fn final_logzerr(&self) -> f64 {
        self.logzerr.last().copied().unwrap_or(f64::NAN)
    }

    /// Renders the short human readable report.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if let LiveSchedule::Static { nlive } = &self.live {
            lines.push(format!("nlive: {nlive}"));
        }
        lines.push(format!("niter: {}", self.niter()));
        lines.push(format!("ncall: {}", self.total_calls()));
        lines.push(format!("eff(%): {}", fixed(self.efficiency(), 6, 3)));
        lines.push(format!(
            "logz: {} +/- {}",
            fixed(self.final_logz(), 6, 3),
            fixed(self.final_logzerr(), 6, 3)
        ));
        format!("Summary\n=======\n{}", lines.join("\n"))
    }

    /// Live-point schedule of the run.
    pub fn live(&self) -> &LiveSchedule {
        &self.live
    }

    /// Unit-cube coordinates of each point.
    pub fn samples_u(&self) -> &[Vec<f64>] {
        &self.samples_u
    }

    /// Parameter-space coordinates of each point.
    pub fn samples(&self) -> &[Vec<f64>] {
        &self.samples
    }

    /// Originating live-point slot of each point.
    pub fn samples_id(&self) -> &[u64] {
        &self.samples_id
    }

    /// Proposal iteration of each point, when recorded.
    pub fn samples_it(&self) -> Option<&[u64]> {
        self.samples_it.as_deref()
    }

    /// Log-likelihood of each point.
    pub fn logl(&self) -> &[f64] {
        &self.logl
    }

    /// Log-importance-weight of each point.
    pub fn logwt(&self) -> &[f64] {
        &self.logwt
    }

    /// Cumulative log-evidence.
    pub fn logz(&self) -> &[f64] {
        &self.logz
    }

    /// Standard error of the cumulative log-evidence.
    pub fn logzerr(&self) -> &[f64] {
        &self.logzerr
    }

    /// Variance of the cumulative log-evidence, when recorded.
    pub fn logzvar(&self) -> Option<&[f64]> {
        self.logzvar.as_deref()
    }

    /// Expected log prior volume, when recorded.
    pub fn logvol(&self) -> Option<&[f64]> {
        self.logvol.as_deref()
    }

    /// Cumulative information, when recorded.
    pub fn information(&self) -> Option<&[f64]> {
        self.information.as_deref()
    }

    /// Call bookkeeping, when recorded.
    pub fn ncall(&self) -> Option<&CallCount> {
        self.ncall.as_ref()
    }

    /// Bounding-object index per iteration, when recorded.
    pub fn bounditer(&self) -> Option<&[u64]> {
        self.bounditer.as_deref()
    }

    /// Calls spent per point, when recorded.
    pub fn nc(&self) -> Option<&[u64]> {
        self.nc.as_deref()
    }
}

impl fmt::Display for RunTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .order
            .iter()
            .map(|key| key.as_str().len())
            .max()
            .unwrap_or(0)
            + 1;
        for (idx, (key, value)) in self.items().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{:>width$}: {value}", key.as_str())?;
        }
        Ok(())
    }
}

impl PartialEq for RunTrace {
    fn eq(&self, other: &Self) -> bool {
        self.order.len() == other.order.len()
            && self
                .items()
                .zip(other.items())
                .all(|((key_a, a), (key_b, b))| key_a == key_b && a == b)
    }
}
