// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! runez - Run programs, find them on PATH, inspect processes

use clap::{Parser, Subcommand};
use miette::Result;

mod cmd_ps;
mod cmd_run;
mod cmd_which;

use cmd_ps::CmdPs;
use cmd_run::CmdRun;
use cmd_which::CmdWhich;

#[derive(Parser)]
#[clap(
    name = "runez",
    about = "Convenience helpers for running programs",
    version,
    long_about = "Run programs with dry-run support, locate them on PATH, and inspect processes"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show the full path of a program
    Which(CmdWhich),

    /// Run a program
    Run(CmdRun),

    /// Show a process and its ancestors
    Ps(CmdPs),
}

impl Opt {
    fn run(self) -> Result<i32> {
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        // Program output goes to stdout, keep logs out of its way
        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        match self.cmd {
            Command::Which(mut cmd) => cmd.run(),
            Command::Run(mut cmd) => cmd.run(),
            Command::Ps(mut cmd) => cmd.run(),
        }
    }
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run()?;
    std::process::exit(code);
}
