#![deny(missing_docs)]
#![doc = "Shared building blocks for the nested-sampling run tools: the structured error surface and deterministic seeding."]

pub mod errors;
pub mod rng;

pub use errors::{codes, ErrorInfo, NestError};
pub use rng::{substream_seed, RunRng};
