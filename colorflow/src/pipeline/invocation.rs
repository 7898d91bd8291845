//! Building concrete stage invocations from a run configuration.
//!
//! An [`Invocation`] is the fully-resolved command for one stage:
//! executable path plus ordered argument list. Building one performs no
//! I/O and does not check that the executable exists; the operating
//! environment does that at spawn time.

use crate::config::PipelineConfig;
use crate::pipeline::Stage;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A fully-resolved stage command. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
}

impl Invocation {
    /// Builds the invocation for `stage` under `config`.
    ///
    /// Every stage shares the same argument shape: subcommand, input
    /// prefix, working-memory budget, scratch directory, verbosity flag.
    /// The final stage additionally carries the `-k`/`-m` algorithm
    /// parameters. Numbers are rendered base-10 with no separators, so
    /// identical configurations always yield identical argument lists.
    #[must_use]
    pub fn for_stage(stage: Stage, config: &PipelineConfig) -> Self {
        let mut args = vec![
            stage.subcommand().to_string(),
            "-i".to_string(),
            config.input_prefix.display().to_string(),
            "-g".to_string(),
            config.working_mem_gb.to_string(),
        ];
        if stage == Stage::Build {
            args.push("-k".to_string());
            args.push(config.k.to_string());
            args.push("-m".to_string());
            args.push(config.m.to_string());
        }
        args.push("-d".to_string());
        args.push(config.tmp_dir.display().to_string());
        args.push("--verbose".to_string());

        Self {
            program: config.executable(),
            args,
        }
    }

    /// The executable path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The ordered argument list, excluding the program itself.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Materializes a spawnable [`Command`].
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for Invocation {
    /// Renders the command as a single audit line: the program followed
    /// by each argument, space-separated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
