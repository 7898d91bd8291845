//! Error types for the colorflow library.
//!
//! Configuration problems are rejected before any stage runs; failures of
//! the external tool itself are reported per stage and handled according
//! to the configured [`FailurePolicy`](crate::pipeline::FailurePolicy).

use crate::pipeline::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// A stage name that is not part of the catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown stage '{name}' (valid stages: invert, sort_unique, permute_unitigs, build)")]
pub struct UnknownStageError {
    /// The rejected name.
    pub name: String,
}

impl UnknownStageError {
    /// Creates a new unknown-stage error.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Invalid pipeline configuration, detected before any stage runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric parameter that must be strictly positive was zero.
    #[error("parameter '{name}' must be a positive integer, got {value}")]
    NonPositiveParameter {
        /// The parameter name as it appears on the command line.
        name: &'static str,
        /// The rejected value.
        value: u32,
    },

    /// The minimizer length must be strictly smaller than the k-mer length.
    #[error("minimizer length m={m} must be smaller than k-mer length k={k}")]
    MinimizerNotBelowK {
        /// The configured k-mer length.
        k: u32,
        /// The configured minimizer length.
        m: u32,
    },
}

/// Errors terminating a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration was rejected; zero stages were executed.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The resume stage is not part of the catalog.
    #[error("{0}")]
    UnknownStage(#[from] UnknownStageError),

    /// The external executable could not be started at all.
    ///
    /// This is fatal regardless of the failure policy: no later stage can
    /// run without a working executable.
    #[error("failed to spawn '{program}' for stage '{stage}': {source}")]
    Spawn {
        /// The stage being started.
        stage: Stage,
        /// The executable path that failed to spawn.
        program: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A stage exited non-zero while running under the fail-fast policy.
    #[error("stage '{stage}' exited with code {}", .exit_code.map_or_else(|| "<signal>".to_string(), |c| c.to_string()))]
    StageFailed {
        /// The failed stage.
        stage: Stage,
        /// The child's exit code, or `None` if it was killed by a signal.
        exit_code: Option<i32>,
    },
}

/// Errors reading or writing a sketch file.
#[derive(Debug, Error)]
pub enum SketchError {
    /// The file does not start with the sketch magic bytes.
    #[error("not a sketch file: bad magic")]
    BadMagic,

    /// The file carries a format version this library does not understand.
    #[error("unsupported sketch format version {0}")]
    UnsupportedVersion(u32),

    /// The header declares zero bytes per sketch.
    #[error("sketch width must be non-zero")]
    ZeroWidth,

    /// The declared payload size does not fit in memory addressing.
    #[error("sketch payload too large: {count} sketches of {bytes_per_sketch} bytes")]
    PayloadTooLarge {
        /// Declared number of sketches.
        count: u32,
        /// Declared sketch width in bytes.
        bytes_per_sketch: u32,
    },

    /// The file ended before the declared payload was read.
    #[error("truncated sketch file: expected {expected} payload bytes, found {found}")]
    Truncated {
        /// Bytes the header promised.
        expected: usize,
        /// Bytes actually present.
        found: usize,
    },

    /// The set does not fit the fixed-width header fields.
    #[error("sketch set does not fit the header: {count} sketches of {bytes_per_sketch} bytes")]
    HeaderOverflow {
        /// Number of sketches in the set.
        count: usize,
        /// Sketch width in bytes.
        bytes_per_sketch: usize,
    },

    /// A sketch with the wrong width was pushed into a set.
    #[error("sketch width mismatch: expected {expected} bytes, got {got}")]
    WidthMismatch {
        /// Width the set was created with.
        expected: usize,
        /// Width of the rejected sketch.
        got: usize,
    },

    /// An underlying I/O failure.
    #[error("sketch I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the clustering routine.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The sketch set holds no sketches.
    #[error("cannot cluster an empty sketch set")]
    EmptySketchSet,

    /// The requested number of clusters is zero or exceeds the input size.
    #[error("invalid cluster count {requested} for {available} sketches")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of sketches available.
        available: usize,
    },

    /// The numerical library failed to fit a model.
    #[error("k-means fit failed: {0}")]
    Fit(#[from] linfa_clustering::KMeansError),
}
