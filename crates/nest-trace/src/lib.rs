#![deny(missing_docs)]

//! Run traces for nested sampling: validated immutable records of a run,
//! evidence accounting over them, merging of independent runs and progress
//! formatting.

/// YAML configuration schema and defaults.
pub mod config;
/// Volume recursion, evidence integrals and display sanitizers.
pub mod evidence;
/// Field names, values and live-point schedules.
pub mod fields;
/// Combining independent runs into one trace.
pub mod merge;
/// Fixed-width progress lines for streaming display.
pub mod progress;
/// The validated run trace.
pub mod trace;

pub use config::{EngineConfig, MergeOptions, SanityBounds};
pub use evidence::{EvidenceSnapshot, Integrals};
pub use fields::{CallCount, FieldKey, FieldRef, FieldValue, LiveSchedule, TraceField};
pub use merge::merge_runs;
pub use progress::{ProgressContext, ProgressLines, ProgressState, StopTarget};
pub use trace::RunTrace;
