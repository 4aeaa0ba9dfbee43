use std::fmt;

use nest_core::errors::{codes, ErrorInfo};
use nest_core::NestError;
use serde::{Deserialize, Serialize};

/// Name of a field recorded on a [`crate::RunTrace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceField {
    /// Points in unit-cube coordinates.
    SamplesU,
    /// Points in parameter space.
    Samples,
    /// Live-point slot each point originated from.
    SamplesId,
    /// Iteration at which each point was proposed.
    SamplesIt,
    /// Log-likelihood of each point.
    Logl,
    /// Log-importance-weight of each point.
    Logwt,
    /// Cumulative log-evidence.
    Logz,
    /// Standard error of the cumulative log-evidence.
    Logzerr,
    /// Variance of the cumulative log-evidence.
    Logzvar,
    /// Expected log prior volume enclosed at each point.
    Logvol,
    /// Cumulative information (KL divergence from prior to posterior).
    Information,
    /// Constant live-point count of a static run.
    Nlive,
    /// Per-iteration live-point count of a dynamic run.
    SamplesN,
    /// Number of iterations.
    Niter,
    /// Likelihood calls, as a total or per iteration.
    Ncall,
    /// Sampling efficiency in percent.
    Eff,
    /// Bounding-object index active at each iteration.
    Bounditer,
    /// Likelihood calls spent producing each point.
    Nc,
}

/// Shape a field value must take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// Single unsigned integer.
    Int,
    /// Single float.
    Float,
    /// One unsigned integer per iteration.
    Ints,
    /// One float per iteration.
    Floats,
    /// One coordinate vector per iteration.
    Points,
    /// Either a single integer total or one integer per iteration.
    IntOrInts,
}

impl TraceField {
    /// Every known field, in canonical order.
    pub const ALL: [TraceField; 18] = [
        TraceField::SamplesU,
        TraceField::Samples,
        TraceField::SamplesId,
        TraceField::SamplesIt,
        TraceField::Logl,
        TraceField::Logwt,
        TraceField::Logz,
        TraceField::Logzerr,
        TraceField::Logzvar,
        TraceField::Logvol,
        TraceField::Information,
        TraceField::Nlive,
        TraceField::SamplesN,
        TraceField::Niter,
        TraceField::Ncall,
        TraceField::Eff,
        TraceField::Bounditer,
        TraceField::Nc,
    ];

    /// Fields every trace must carry.
    pub const REQUIRED: [TraceField; 7] = [
        TraceField::SamplesU,
        TraceField::SamplesId,
        TraceField::Logl,
        TraceField::Logwt,
        TraceField::Logz,
        TraceField::Logzerr,
        TraceField::Samples,
    ];

    /// Returns the canonical key used in mappings.
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceField::SamplesU => "samples_u",
            TraceField::Samples => "samples",
            TraceField::SamplesId => "samples_id",
            TraceField::SamplesIt => "samples_it",
            TraceField::Logl => "logl",
            TraceField::Logwt => "logwt",
            TraceField::Logz => "logz",
            TraceField::Logzerr => "logzerr",
            TraceField::Logzvar => "logzvar",
            TraceField::Logvol => "logvol",
            TraceField::Information => "information",
            TraceField::Nlive => "nlive",
            TraceField::SamplesN => "samples_n",
            TraceField::Niter => "niter",
            TraceField::Ncall => "ncall",
            TraceField::Eff => "eff",
            TraceField::Bounditer => "bounditer",
            TraceField::Nc => "nc",
        }
    }

    /// Resolves a mapping key, failing with `unknown-field` for names outside the schema.
    pub fn parse(key: &str) -> Result<Self, NestError> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == key)
            .ok_or_else(|| {
                NestError::Schema(
                    ErrorInfo::new(codes::UNKNOWN_FIELD, format!("unknown trace field `{key}`"))
                        .with_context("field", key),
                )
            })
    }

    /// Shape the value of this field must take.
    pub fn shape(&self) -> FieldShape {
        match self {
            TraceField::SamplesU | TraceField::Samples => FieldShape::Points,
            TraceField::SamplesId
            | TraceField::SamplesIt
            | TraceField::SamplesN
            | TraceField::Bounditer
            | TraceField::Nc => FieldShape::Ints,
            TraceField::Logl
            | TraceField::Logwt
            | TraceField::Logz
            | TraceField::Logzerr
            | TraceField::Logzvar
            | TraceField::Logvol
            | TraceField::Information => FieldShape::Floats,
            TraceField::Nlive | TraceField::Niter => FieldShape::Int,
            TraceField::Eff => FieldShape::Float,
            TraceField::Ncall => FieldShape::IntOrInts,
        }
    }
}

impl fmt::Display for TraceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a field carried by a trace.
///
/// Names outside the schema are kept as extras, so batch bookkeeping such as
/// `batch_nlive` or `samples_batch` survives construction and substitution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    /// A field of the trace schema.
    Known(TraceField),
    /// Any other caller-supplied field, stored as given.
    Extra(String),
}

impl FieldKey {
    /// Classifies a mapping key.
    pub fn parse(key: &str) -> Self {
        match TraceField::parse(key) {
            Ok(field) => FieldKey::Known(field),
            Err(_) => FieldKey::Extra(key.to_string()),
        }
    }

    /// The mapping key.
    pub fn as_str(&self) -> &str {
        match self {
            FieldKey::Known(field) => field.as_str(),
            FieldKey::Extra(name) => name,
        }
    }
}

impl AsRef<str> for FieldKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<TraceField> for FieldKey {
    fn from(field: TraceField) -> Self {
        FieldKey::Known(field)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned field value used when building a trace from a loosely-typed mapping.
///
/// Equality treats NaN entries as equal to each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single unsigned integer.
    Int(u64),
    /// Single float.
    Float(f64),
    /// Sequence of unsigned integers.
    Ints(Vec<u64>),
    /// Sequence of floats.
    Floats(Vec<f64>),
    /// Sequence of coordinate vectors.
    Points(Vec<Vec<f64>>),
}

impl FieldValue {
    /// Borrowed view of the value.
    pub fn view(&self) -> FieldRef<'_> {
        match self {
            FieldValue::Int(value) => FieldRef::Int(*value),
            FieldValue::Float(value) => FieldRef::Float(*value),
            FieldValue::Ints(values) => FieldRef::Ints(values),
            FieldValue::Floats(values) => FieldRef::Floats(values),
            FieldValue::Points(values) => FieldRef::Points(values),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Ints(_) => "ints",
            FieldValue::Floats(_) => "floats",
            FieldValue::Points(_) => "points",
        }
    }

    pub(crate) fn type_error(&self, field: TraceField) -> NestError {
        NestError::Schema(
            ErrorInfo::new(
                codes::FIELD_TYPE,
                format!("field `{field}` cannot hold a value of kind {}", self.kind()),
            )
            .with_context("field", field.as_str())
            .with_context("kind", self.kind()),
        )
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.view() == other.view()
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<Vec<u64>> for FieldValue {
    fn from(value: Vec<u64>) -> Self {
        FieldValue::Ints(value)
    }
}

impl From<Vec<f64>> for FieldValue {
    fn from(value: Vec<f64>) -> Self {
        FieldValue::Floats(value)
    }
}

impl From<Vec<Vec<f64>>> for FieldValue {
    fn from(value: Vec<Vec<f64>>) -> Self {
        FieldValue::Points(value)
    }
}

/// Borrowed view of a field stored on a trace.
///
/// Equality treats NaN entries as equal to each other, so undefined errors
/// do not make a trace unequal to its own copy.
#[derive(Debug, Clone, Copy)]
pub enum FieldRef<'a> {
    /// Single unsigned integer.
    Int(u64),
    /// Single float.
    Float(f64),
    /// Sequence of unsigned integers.
    Ints(&'a [u64]),
    /// Sequence of floats.
    Floats(&'a [f64]),
    /// Sequence of coordinate vectors.
    Points(&'a [Vec<f64>]),
}

impl FieldRef<'_> {
    /// Copies the view into an owned value.
    pub fn to_value(&self) -> FieldValue {
        match *self {
            FieldRef::Int(value) => FieldValue::Int(value),
            FieldRef::Float(value) => FieldValue::Float(value),
            FieldRef::Ints(values) => FieldValue::Ints(values.to_vec()),
            FieldRef::Floats(values) => FieldValue::Floats(values.to_vec()),
            FieldRef::Points(values) => FieldValue::Points(values.to_vec()),
        }
    }
}

fn same_float(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn same_floats(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_float(*x, *y))
}

impl PartialEq for FieldRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldRef::Int(a), FieldRef::Int(b)) => a == b,
            (FieldRef::Float(a), FieldRef::Float(b)) => same_float(*a, *b),
            (FieldRef::Ints(a), FieldRef::Ints(b)) => a == b,
            (FieldRef::Floats(a), FieldRef::Floats(b)) => same_floats(a, b),
            (FieldRef::Points(a), FieldRef::Points(b)) => {
                a.len() == b.len() && a.iter().zip(*b).all(|(x, y)| same_floats(x, y))
            }
            _ => false,
        }
    }
}

impl fmt::Display for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Int(value) => write!(f, "{value}"),
            FieldRef::Float(value) => write!(f, "{value}"),
            FieldRef::Ints(values) => write!(f, "{values:?}"),
            FieldRef::Floats(values) => write!(f, "{values:?}"),
            FieldRef::Points(values) => write!(f, "{values:?}"),
        }
    }
}

/// Live-point schedule of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiveSchedule {
    /// Constant live-point count.
    Static {
        /// Number of live points.
        nlive: u64,
    },
    /// Live-point count per iteration.
    Dynamic {
        /// Number of live points active at each iteration.
        samples_n: Vec<u64>,
    },
}

/// Likelihood-call bookkeeping, either as a total or broken down per iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallCount {
    /// Cumulative number of calls.
    Total(u64),
    /// Calls spent at each iteration.
    PerIteration(Vec<u64>),
}

impl CallCount {
    /// Total number of likelihood calls.
    pub fn total(&self) -> u64 {
        match self {
            CallCount::Total(total) => *total,
            CallCount::PerIteration(calls) => calls.iter().sum(),
        }
    }
}
