// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `runez run` command.

use std::path::PathBuf;

use clap::Args;
use miette::Result;
use runez::{Anchored, Fatal, RunOptions};

#[cfg(test)]
#[path = "./cmd_run_test.rs"]
mod cmd_run_test;

/// Run a program
#[derive(Debug, Args)]
pub struct CmdRun {
    /// Only show what would be run
    #[clap(short = 'n', long, env = "RUNEZ_DRYRUN")]
    dry_run: bool,

    /// Show the program's output as it runs, in addition to capturing it
    #[clap(short, long)]
    passthrough: bool,

    /// Log failures as warnings instead of errors
    #[clap(short, long)]
    tolerate: bool,

    /// Run the program from DIR
    #[clap(short = 'C', long, value_name = "DIR")]
    cwd: Option<PathBuf>,

    /// Program to run, followed by its arguments
    #[clap(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl CmdRun {
    pub fn run(&mut self) -> Result<i32> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(miette::miette!("No program given"));
        };

        // Paths under the current folder are shown relative to it
        let _anchored = std::env::current_dir().ok().map(|cwd| Anchored::new([cwd]));

        let options = RunOptions {
            fatal: if self.tolerate { Fatal::Warn } else { Fatal::Raise },
            dryrun: Some(self.dry_run),
            passthrough: self.passthrough,
            log_level: Some(tracing::Level::INFO),
            cwd: self.cwd.clone(),
            ..Default::default()
        };

        let result = match runez::run(program, args.to_vec(), &options) {
            Ok(result) => result,
            // Already logged by the raise policy, exit like the program did
            Err(e) => return Ok(e.exit_code()),
        };

        if self.dry_run || !self.passthrough {
            if let Some(output) = result.output().filter(|text| !text.is_empty()) {
                println!("{output}");
            }
        }
        if !self.dry_run && !self.passthrough {
            if let Some(error) = result.error().filter(|text| !text.is_empty()) {
                eprintln!("{error}");
            }
        }

        Ok(result.exit_code().unwrap_or(0))
    }
}
