use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of points a shrunk waveform is reduced to by default.
pub const DEFAULT_LIMIT: usize = 400;

/// Name of the default decimation mode.
pub const DEFAULT_MODE: &str = "normal";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShrinkError {
    #[error("limit must be greater than zero")]
    InvalidLimit,
    #[error("unsupported shrink mode: {0} (expected normal)")]
    UnsupportedMode(String),
    #[error("time step must be a positive finite number, got {0}")]
    InvalidTimeStep(f64),
}

/// Decimation strategy used to pick the points of a shrunk waveform.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fixed-stride decimation keeping the first sample of every stride.
    #[default]
    Normal,
}

impl FromStr for Mode {
    type Err = ShrinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Mode::Normal),
            other => Err(ShrinkError::UnsupportedMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Normal => f.write_str("normal"),
        }
    }
}

/// A reduced waveform and the time step between its points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shrunk {
    pub y_values: Vec<f64>,
    pub time_step: f64,
}

/// Validated decimation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shrinker {
    mode: Mode,
    limit: usize,
}

impl Default for Shrinker {
    fn default() -> Self {
        Shrinker {
            mode: Mode::Normal,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Shrinker {
    pub fn new(mode: Mode, limit: usize) -> Result<Self, ShrinkError> {
        if limit == 0 {
            return Err(ShrinkError::InvalidLimit);
        }
        Ok(Shrinker { mode, limit })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Stride used for a waveform of `len` samples. Never zero.
    pub fn stride(&self, len: usize) -> usize {
        (len / self.limit).max(1)
    }

    /// Reduces `samples` to roughly `limit` points.
    ///
    /// The stride is `len / limit`, clamped to 1 so that waveforms shorter
    /// than the limit come back unchanged. The returned time step is the
    /// original one scaled by the stride, so the reduced waveform covers the
    /// same time span.
    pub fn shrink(&self, samples: &[f64], time_step: f64) -> Result<Shrunk, ShrinkError> {
        if !time_step.is_finite() || time_step <= 0.0 {
            return Err(ShrinkError::InvalidTimeStep(time_step));
        }

        let stride = self.stride(samples.len());
        let y_values: Vec<f64> = match self.mode {
            Mode::Normal => samples.iter().step_by(stride).copied().collect(),
        };

        log::debug!(
            "shrunk {} samples to {} (mode {}, stride {})",
            samples.len(),
            y_values.len(),
            self.mode,
            stride
        );

        Ok(Shrunk {
            y_values,
            time_step: stride as f64 * time_step,
        })
    }
}

/// Shrinks `samples` with a mode given by name, e.g. from a command line flag.
pub fn shrink(
    samples: &[f64],
    time_step: f64,
    mode: &str,
    limit: usize,
) -> Result<Shrunk, ShrinkError> {
    Shrinker::new(mode.parse()?, limit)?.shrink(samples, time_step)
}
