//! Run configuration for the pipeline orchestrator.
//!
//! A [`PipelineConfig`] is resolved once by the caller (the CLI resolves
//! relative defaults against the working directory at startup) and never
//! mutated afterwards. The invocation builder performs no ambient
//! lookups: everything a stage command needs is in this struct.

use crate::errors::ConfigError;
use crate::pipeline::{FailurePolicy, Stage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name of the external tool that implements every stage.
pub const TOOL_NAME: &str = "colorix";

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path prefix of the upstream dataset the stages consume.
    pub input_prefix: PathBuf,
    /// Directory holding the external executable.
    pub bin_dir: PathBuf,
    /// Scratch directory the stages hand data off through.
    pub tmp_dir: PathBuf,
    /// Working-memory budget in gigabytes, passed to every stage.
    pub working_mem_gb: u32,
    /// K-mer length, consumed by the final stage only.
    pub k: u32,
    /// Minimizer length, consumed by the final stage only. Must be < `k`.
    pub m: u32,
    /// First stage to run; earlier stages are assumed already done.
    pub resume_from: Stage,
    /// Print commands without spawning anything.
    pub dry_run: bool,
    /// What to do when a stage exits non-zero.
    pub failure_policy: FailurePolicy,
}

impl PipelineConfig {
    /// Creates a configuration with the default parameters for
    /// `input_prefix`, starting from the first stage.
    #[must_use]
    pub fn new(input_prefix: impl Into<PathBuf>) -> Self {
        Self {
            input_prefix: input_prefix.into(),
            bin_dir: PathBuf::from("."),
            tmp_dir: PathBuf::from("."),
            working_mem_gb: 8,
            k: 31,
            m: 17,
            resume_from: Stage::Invert,
            dry_run: false,
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Sets the directory holding the external executable.
    #[must_use]
    pub fn with_bin_dir(mut self, bin_dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = bin_dir.into();
        self
    }

    /// Sets the scratch directory.
    #[must_use]
    pub fn with_tmp_dir(mut self, tmp_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = tmp_dir.into();
        self
    }

    /// Sets the working-memory budget in gigabytes.
    #[must_use]
    pub fn with_working_mem_gb(mut self, gigabytes: u32) -> Self {
        self.working_mem_gb = gigabytes;
        self
    }

    /// Sets the k-mer and minimizer lengths for the final stage.
    #[must_use]
    pub fn with_params(mut self, k: u32, m: u32) -> Self {
        self.k = k;
        self.m = m;
        self
    }

    /// Sets the stage to resume from.
    #[must_use]
    pub fn with_resume_from(mut self, stage: Stage) -> Self {
        self.resume_from = stage;
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Full path of the external executable.
    #[must_use]
    pub fn executable(&self) -> PathBuf {
        self.bin_dir.join(TOOL_NAME)
    }

    /// Validates the numeric stage parameters.
    ///
    /// Bounds are enforced here, before any stage runs, rather than
    /// deferred to the external executable: `k` and `m` must be positive
    /// and `m` must be strictly smaller than `k`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first violated bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k == 0 {
            return Err(ConfigError::NonPositiveParameter {
                name: "-k",
                value: self.k,
            });
        }
        if self.m == 0 {
            return Err(ConfigError::NonPositiveParameter {
                name: "-m",
                value: self.m,
            });
        }
        if self.m >= self.k {
            return Err(ConfigError::MinimizerNotBelowK {
                k: self.k,
                m: self.m,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cli_defaults() {
        let config = PipelineConfig::new("data/x");
        assert_eq!(config.k, 31);
        assert_eq!(config.m, 17);
        assert_eq!(config.working_mem_gb, 8);
        assert_eq!(config.resume_from, Stage::Invert);
        assert!(!config.dry_run);
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn test_executable_joins_bin_dir_and_tool() {
        let config = PipelineConfig::new("data/x").with_bin_dir("/opt/tools");
        assert_eq!(config.executable(), PathBuf::from("/opt/tools/colorix"));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(PipelineConfig::new("data/x").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_k() {
        let err = PipelineConfig::new("data/x")
            .with_params(0, 17)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::NonPositiveParameter { name: "-k", value: 0 }
        );
    }

    #[test]
    fn test_validate_rejects_zero_m() {
        let err = PipelineConfig::new("data/x")
            .with_params(31, 0)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::NonPositiveParameter { name: "-m", value: 0 }
        );
    }

    #[test]
    fn test_validate_rejects_m_not_below_k() {
        let err = PipelineConfig::new("data/x")
            .with_params(17, 17)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::MinimizerNotBelowK { k: 17, m: 17 });
    }
}
