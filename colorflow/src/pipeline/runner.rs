//! Sequential execution of the stage chain.
//!
//! The runner slices the catalog at the resume point and walks the
//! remaining stages in order, one child process at a time. There is no
//! retry state and no concurrency: stage `i + 1` starts only after stage
//! `i`'s child has terminated. The only mutable runtime state is the
//! loop position.

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::pipeline::{Invocation, Stage, StageCatalog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// What to do when a stage's child process exits non-zero.
///
/// The default keeps running the remaining stages so an operator can
/// inspect every stage's outcome in one pass; the failed stage is still
/// reported. `FailFast` aborts at the first failure instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report the failure and continue with the next stage.
    #[default]
    Continue,
    /// Abort the run at the first failed stage.
    FailFast,
}

/// Outcome of one attempted stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    /// Dry-run mode: the command was printed, nothing was spawned.
    DryRun,
    /// The child exited with status zero.
    Completed {
        /// Wall-clock duration in milliseconds.
        duration_ms: f64,
    },
    /// The child exited non-zero or was killed by a signal.
    Failed {
        /// Exit code, or `None` when the child was killed by a signal.
        exit_code: Option<i32>,
        /// Wall-clock duration in milliseconds.
        duration_ms: f64,
    },
}

impl StageOutcome {
    /// Returns `true` for everything except `Failed`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Record of one attempted stage: what ran, and how it went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// The stage.
    pub stage: Stage,
    /// The fully-expanded command line, as emitted to the console.
    pub command: String,
    /// How the attempt ended.
    pub outcome: StageOutcome,
}

/// Result of a pipeline run: identity, start time, per-stage records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identity of this run.
    pub run_id: Uuid,
    /// When the run started, UTC.
    pub started_at: DateTime<Utc>,
    /// One record per attempted stage, in execution order.
    pub stages: Vec<StageReport>,
}

impl RunReport {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            stages: Vec::new(),
        }
    }

    /// Number of stages attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if any attempted stage failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.stages.iter().any(|s| !s.outcome.is_success())
    }
}

/// Executes (or simulates) the ordered suffix of stages starting at the
/// configured resume point.
#[derive(Debug, Clone, Default)]
pub struct PipelineRunner {
    catalog: StageCatalog,
}

impl PipelineRunner {
    /// Creates a runner over the canonical catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner over a custom catalog.
    #[must_use]
    pub fn with_catalog(catalog: StageCatalog) -> Self {
        Self { catalog }
    }

    /// The catalog this runner executes.
    #[must_use]
    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    /// Runs the pipeline described by `config`.
    ///
    /// The configuration is validated first; a rejected configuration
    /// executes zero stages. Each remaining stage is announced with its
    /// position in the suffix and its exact command line, then spawned
    /// and waited on (unless `dry_run` is set). A non-zero exit is a
    /// warning under [`FailurePolicy::Continue`] and an error under
    /// [`FailurePolicy::FailFast`].
    ///
    /// # Errors
    ///
    /// [`PipelineError::Config`] or [`PipelineError::UnknownStage`]
    /// before anything runs, [`PipelineError::Spawn`] if a child cannot
    /// be started at all, and [`PipelineError::StageFailed`] for a
    /// non-zero exit under the fail-fast policy.
    pub fn run(&self, config: &PipelineConfig) -> Result<RunReport, PipelineError> {
        config.validate()?;
        let suffix = self.catalog.suffix_from(config.resume_from)?;
        let total = suffix.len();

        let mut report = RunReport::new();
        info!(
            run_id = %report.run_id,
            resume_from = %config.resume_from,
            stages = total,
            dry_run = config.dry_run,
            "starting pipeline run"
        );

        for (index, &stage) in suffix.iter().enumerate() {
            let invocation = Invocation::for_stage(stage, config);
            info!(stage = %stage, "executing stage {}/{}: {}", index + 1, total, stage);
            info!("cmd: {invocation}");

            if config.dry_run {
                report.stages.push(StageReport {
                    stage,
                    command: invocation.to_string(),
                    outcome: StageOutcome::DryRun,
                });
                continue;
            }

            let outcome = execute_stage(stage, &invocation, config)?;
            report.stages.push(StageReport {
                stage,
                command: invocation.to_string(),
                outcome,
            });
        }

        info!(
            run_id = %report.run_id,
            attempted = report.attempted(),
            failures = report.has_failures(),
            "pipeline run finished"
        );
        Ok(report)
    }
}

/// Spawns one stage and blocks until its child terminates.
fn execute_stage(
    stage: Stage,
    invocation: &Invocation,
    config: &PipelineConfig,
) -> Result<StageOutcome, PipelineError> {
    let started = Instant::now();
    let status = invocation
        .to_command()
        .status()
        .map_err(|source| PipelineError::Spawn {
            stage,
            program: invocation.program().to_path_buf(),
            source,
        })?;
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

    if status.success() {
        info!(stage = %stage, duration_ms, "stage finished");
        return Ok(StageOutcome::Completed { duration_ms });
    }

    let exit_code = status.code();
    match exit_code {
        Some(code) => warn!(
            stage = %stage,
            "{} returned exit code {}",
            invocation.program().display(),
            code
        ),
        None => warn!(
            stage = %stage,
            "{} was terminated by a signal",
            invocation.program().display()
        ),
    }

    if config.failure_policy == FailurePolicy::FailFast {
        return Err(PipelineError::StageFailed { stage, exit_code });
    }
    Ok(StageOutcome::Failed {
        exit_code,
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;

    #[test]
    fn test_failure_policy_default_is_continue() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Continue);
    }

    #[test]
    fn test_invalid_config_executes_zero_stages() {
        let runner = PipelineRunner::new();
        let config = PipelineConfig::new("data/x")
            .with_params(17, 31)
            .with_dry_run(true);

        let err = runner.run(&config).unwrap_err();
        match err {
            PipelineError::Config(ConfigError::MinimizerNotBelowK { k: 17, m: 31 }) => {}
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resume_stage_outside_catalog_is_rejected() {
        let runner = PipelineRunner::with_catalog(StageCatalog::new(vec![Stage::Build]));
        let config = PipelineConfig::new("data/x").with_resume_from(Stage::Invert);

        assert!(matches!(
            runner.run(&config),
            Err(PipelineError::UnknownStage(_))
        ));
    }

    #[test]
    fn test_dry_run_reports_full_suffix() {
        let runner = PipelineRunner::new();
        let config = PipelineConfig::new("data/x")
            .with_resume_from(Stage::PermuteUnitigs)
            .with_dry_run(true);

        let report = runner.run(&config).unwrap();
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.stages[0].stage, Stage::PermuteUnitigs);
        assert_eq!(report.stages[1].stage, Stage::Build);
        assert!(report
            .stages
            .iter()
            .all(|s| s.outcome == StageOutcome::DryRun));
        assert!(!report.has_failures());
    }

    #[test]
    fn test_dry_run_commands_match_invocation_builder() {
        let runner = PipelineRunner::new();
        let config = PipelineConfig::new("data/x").with_dry_run(true);

        let report = runner.run(&config).unwrap();
        for stage_report in &report.stages {
            let rebuilt = Invocation::for_stage(stage_report.stage, &config);
            assert_eq!(stage_report.command, rebuilt.to_string());
        }
    }

    #[test]
    fn test_stage_outcome_success_classification() {
        assert!(StageOutcome::DryRun.is_success());
        assert!(StageOutcome::Completed { duration_ms: 1.0 }.is_success());
        assert!(!StageOutcome::Failed {
            exit_code: Some(2),
            duration_ms: 1.0
        }
        .is_success());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let runner = PipelineRunner::new();
        let config = PipelineConfig::new("data/x").with_dry_run(true);

        let report = runner.run(&config).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"run_id\""));
        assert!(json.contains("\"dry_run\""));
    }
}
