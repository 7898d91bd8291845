//! # Colorflow
//!
//! Colorflow drives construction of a genomic color index by invoking an
//! external toolchain in a fixed stage order, and clusters the binary
//! sketches that pipeline produces.
//!
//! The library provides:
//!
//! - **Stage catalog**: the canonical, total order of build stages
//! - **Invocation building**: configuration in, exact stage commands out
//! - **Sequential execution**: resume from any stage, dry-run support,
//!   per-stage timing and failure reporting
//! - **Sketch I/O**: a versioned little-endian container for fixed-width
//!   sketches
//! - **Clustering**: reproducible k-means over sketch bytes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use colorflow::prelude::*;
//!
//! let config = PipelineConfig::new("data/ecoli")
//!     .with_bin_dir("/opt/colorix/bin")
//!     .with_resume_from(Stage::SortUnique);
//!
//! let report = PipelineRunner::new().run(&config)?;
//! assert!(!report.has_failures());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cluster;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod sketch;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cluster::{cluster_sketches, write_labels, ClusteringParams};
    pub use crate::config::{PipelineConfig, TOOL_NAME};
    pub use crate::errors::{
        ClusterError, ConfigError, PipelineError, SketchError, UnknownStageError,
    };
    pub use crate::pipeline::{
        FailurePolicy, Invocation, PipelineRunner, RunReport, Stage, StageCatalog,
        StageOutcome, StageReport,
    };
    pub use crate::sketch::SketchSet;
}
