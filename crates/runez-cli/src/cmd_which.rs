// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `runez which` command.

use clap::Args;
use miette::Result;
use runez::Fatal;

/// Show the full path of a program
#[derive(Debug, Args)]
pub struct CmdWhich {
    /// Program to look for
    program: String,

    /// Skip programs installed in our own virtual environment
    #[clap(long)]
    ignore_own_venv: bool,

    /// Fail with installation instructions when the program is missing
    #[clap(long)]
    require: bool,
}

impl CmdWhich {
    pub fn run(&mut self) -> Result<i32> {
        let found = if self.ignore_own_venv {
            runez::which_outside_own_venv(&self.program)
        } else {
            runez::which(&self.program)
        };

        if let Some(path) = found {
            println!("{}", path.display());
            return Ok(0);
        }

        if self.require {
            runez::require_installed(&self.program, None, Fatal::Raise, None)?;
        }

        tracing::info!("{} not found", self.program);
        Ok(1)
    }
}
