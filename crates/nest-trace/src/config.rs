use std::fs;
use std::path::Path;

use nest_core::errors::{codes, ErrorInfo};
use nest_core::NestError;
use serde::{Deserialize, Serialize};

/// YAML-configurable settings for evidence accounting and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Thresholds beyond which derived quantities are treated as degenerate.
    #[serde(default)]
    pub sanity: SanityBounds,
    /// Run merging behaviour.
    #[serde(default)]
    pub merge: MergeOptions,
}

impl EngineConfig {
    /// Parses a configuration document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, NestError> {
        serde_yaml::from_str(contents).map_err(|err| {
            NestError::Config(ErrorInfo::new(codes::CONFIG_PARSE, err.to_string()))
        })
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, NestError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            NestError::Config(
                ErrorInfo::new(codes::CONFIG_READ, err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            NestError::Config(info) => {
                NestError::Config(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }
}

/// Limits used to clamp numerically meaningless values before display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanityBounds {
    /// Largest evidence variance still reported as a standard error.
    #[serde(default = "default_variance_ceiling")]
    pub variance_ceiling: f64,
    /// Largest remaining-evidence estimate still reported as finite.
    #[serde(default = "default_delta_logz_ceiling")]
    pub delta_logz_ceiling: f64,
    /// Values at or below this sentinel stand for negative infinity.
    #[serde(default = "default_logl_floor")]
    pub logl_floor: f64,
}

fn default_variance_ceiling() -> f64 {
    1e6
}

fn default_delta_logz_ceiling() -> f64 {
    1e6
}

fn default_logl_floor() -> f64 {
    -1e6
}

impl SanityBounds {
    /// Bounds that never clamp anything.
    pub fn unclamped() -> Self {
        Self {
            variance_ceiling: f64::INFINITY,
            delta_logz_ceiling: f64::INFINITY,
            logl_floor: f64::NEG_INFINITY,
        }
    }
}

impl Default for SanityBounds {
    fn default() -> Self {
        Self {
            variance_ceiling: default_variance_ceiling(),
            delta_logz_ceiling: default_delta_logz_ceiling(),
            logl_floor: default_logl_floor(),
        }
    }
}

/// Settings applied when merging runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Shrink volume across equal-likelihood blocks as one group.
    ///
    /// Disabling this treats tied points as if they had distinguishable nested
    /// volumes, which biases the evidence on plateaus.
    #[serde(default = "default_group_plateaus")]
    pub group_plateaus: bool,
}

fn default_group_plateaus() -> bool {
    true
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            group_plateaus: default_group_plateaus(),
        }
    }
}
