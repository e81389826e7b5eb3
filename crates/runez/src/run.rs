// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Running programs.
//!
//! [`run`] resolves the program on PATH, flattens its arguments, logs what
//! it is about to do, and either simulates the run (dry-run) or spawns the
//! program, collecting its output into a [`RunResult`]. Failures go through
//! the [`Fatal`] policy given in [`RunOptions`].

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::ScopedJoinHandle;

use tempfile::TempDir;
use tracing::Level;

use crate::context::resolve_dryrun;
use crate::error::{abort, abort_with, Error, Fatal, Result};
use crate::flatten::{flattened, represented_args, Arg};
use crate::path::short;
use crate::result::RunResult;
use crate::which::which;

#[cfg(test)]
#[path = "./run_test.rs"]
mod run_test;

/// Env var set by an IDE host known to mishandle `python -m ...` invocations.
pub const IDE_HOST_MARKER: &str = "PYCHARM_HOSTED";

/// Separator used in PATH-like env vars.
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: &str = ";";
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: &str = ":";

const WRAPPER_NAME: &str = "pydev-wrapper.sh";

/// What to do with one of the program's output streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stream {
    /// Capture the stream into the [`RunResult`].
    #[default]
    Capture,
    /// Let the program write directly to our own stream, nothing is captured.
    Inherit,
}

impl Stream {
    /// Nobody reads a pipe once a no-wait run returns, so captured streams are discarded.
    fn stdio(self, no_wait: bool) -> Stdio {
        match self {
            Self::Capture if no_wait => Stdio::null(),
            Self::Capture => Stdio::piped(),
            Self::Inherit => Stdio::inherit(),
        }
    }
}

/// Options for [`run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Policy applied when the program is missing, can't be spawned, or fails.
    pub fatal: Fatal,

    /// Override the scoped dry-run state for this call.
    pub dryrun: Option<bool>,

    pub stdout: Stream,
    pub stderr: Stream,

    /// Also echo captured streams to our own stdout/stderr as they come.
    pub passthrough: bool,

    /// Return right after spawning, the caller owns the child process.
    ///
    /// Nothing is captured in this mode: [`Stream::Capture`] streams go to
    /// the null device.
    pub no_wait: bool,

    /// Level for the "Running: ..." message, `None` to not log it.
    pub log_level: Option<Level>,

    /// Working directory for the program.
    pub cwd: Option<PathBuf>,

    /// Extra env vars for the program.
    pub env: BTreeMap<String, String>,

    /// Paths to append to PATH-like env vars (see [`added_env_paths`]).
    pub path_env: BTreeMap<String, Vec<String>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fatal: Fatal::default(),
            dryrun: None,
            stdout: Stream::Capture,
            stderr: Stream::Capture,
            passthrough: false,
            no_wait: false,
            log_level: Some(Level::DEBUG),
            cwd: None,
            env: BTreeMap::new(),
            path_env: BTreeMap::new(),
        }
    }
}

impl RunOptions {
    /// Options with the given failure policy, defaults otherwise.
    pub fn with_fatal(fatal: Fatal) -> Self {
        Self {
            fatal,
            ..Default::default()
        }
    }

    fn captures(&self) -> bool {
        self.stdout == Stream::Capture || self.stderr == Stream::Capture
    }
}

/// Run `program` with `args`.
///
/// - In dry-run mode, nothing is spawned: "Would run: ..." is logged and a
///   synthetic successful result is returned.
/// - When both streams are [`Stream::Inherit`], the result only carries
///   the exit code.
/// - With [`RunOptions::no_wait`], the result only carries the pid.
///
/// A missing program, a spawn failure or a non-zero exit code are handled
/// according to [`RunOptions::fatal`]; tolerant policies return a failed
/// [`RunResult`] describing what went wrong.
pub fn run(program: &str, args: impl Into<Arg>, options: &RunOptions) -> Result<RunResult> {
    let args = flattened(args, false);
    let full_path = which(program);
    let dryrun = resolve_dryrun(options.dryrun);

    let shown = match &full_path {
        Some(path) => short(path),
        None => short(program),
    };
    let description = if args.is_empty() {
        shown
    } else {
        format!("{shown} {}", represented_args(&args))
    };

    if let Some(level) = options.log_level {
        let verb = if dryrun { "Would run" } else { "Running" };
        log_at(level, verb, &description);
    }

    if dryrun {
        let output = (options.stdout == Stream::Capture).then(|| format!("[dryrun] {description}"));
        let error = (options.stderr == Stream::Capture).then(String::new);
        return Ok(RunResult::new(output, error, Some(0)));
    }

    let Some(full_path) = full_path else {
        let error = Error::NotInstalled {
            program: short(program),
            instructions: None,
        };
        let fallback = RunResult::new(None, Some(error.to_string()), Some(1));
        return abort(options.fatal, error, fallback);
    };

    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(full_path.to_string_lossy().into_owned());
    argv.extend(args);

    match execute(argv, options) {
        Ok(result) => check_exit_code(program, result, options),
        Err(error) => {
            let error = Error::RunFailed {
                program: short(program),
                error,
            };
            let fallback = RunResult::new(None, Some(error.to_string()), Some(1));
            abort(options.fatal, error, fallback)
        }
    }
}

fn log_at(level: Level, verb: &str, description: &str) {
    match level {
        Level::ERROR => tracing::error!("{verb}: {description}"),
        Level::WARN => tracing::warn!("{verb}: {description}"),
        Level::INFO => tracing::info!("{verb}: {description}"),
        Level::DEBUG => tracing::debug!("{verb}: {description}"),
        _ => tracing::trace!("{verb}: {description}"),
    }
}

fn check_exit_code(program: &str, result: RunResult, options: &RunOptions) -> Result<RunResult> {
    let code = match result.exit_code() {
        Some(code) if code != 0 => code,
        _ => return Ok(result),
    };

    let shown_output = result.full_output().filter(|text| !text.is_empty());
    // Pass-through output was already seen by the user, don't repeat it
    let report = !(options.passthrough && shown_output.is_some());
    let note = if options.passthrough { None } else { shown_output };
    let error = Error::NonZeroExit {
        program: short(program),
        code,
        note,
    };
    abort_with(options.fatal, error, result, report)
}

fn execute(argv: Vec<String>, options: &RunOptions) -> io::Result<RunResult> {
    // The wrapper script must outlive the program, which no-wait can't guarantee
    let wrapped = if options.no_wait {
        WrappedArgs::plain(argv)
    } else {
        WrappedArgs::new(argv)?
    };

    let (program, args) = wrapped
        .args()
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;

    let mut command = Command::new(program);
    command
        .args(args)
        .envs(&options.env)
        .stdout(options.stdout.stdio(options.no_wait))
        .stderr(options.stderr.stdio(options.no_wait));

    if let Some(cwd) = &options.cwd {
        command.current_dir(cwd);
    }

    if !options.path_env.is_empty() {
        let mut current: BTreeMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        current.extend(options.env.clone());
        command.envs(added_env_paths(&options.path_env, &current));
    }

    let mut child = command.spawn()?;
    let pid = child.id();

    if options.no_wait {
        return Ok(RunResult::default().with_pid(pid));
    }

    if !options.captures() {
        let status = child.wait()?;
        return Ok(RunResult::from_exit_code(exit_code(status)).with_pid(pid));
    }

    let (stdout, stderr, status) = if options.passthrough {
        collect_passthrough(&mut child)?
    } else {
        let collected = child.wait_with_output()?;
        (collected.stdout, collected.stderr, collected.status)
    };

    let output = (options.stdout == Stream::Capture).then(|| decoded(&stdout));
    let error = (options.stderr == Stream::Capture).then(|| decoded(&stderr));
    Ok(RunResult::new(output, error, Some(exit_code(status))).with_pid(pid))
}

fn decoded(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

/// Exit code of `status`, negated signal number if killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    1
}

fn collect_passthrough(child: &mut Child) -> io::Result<(Vec<u8>, Vec<u8>, ExitStatus)> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Both pipes are drained concurrently, so that neither can fill up and block the child
    let (output, error) = std::thread::scope(|scope| {
        let output = scope.spawn(move || tee(stdout, io::stdout()));
        let error = scope.spawn(move || tee(stderr, io::stderr()));
        (joined(output), joined(error))
    });

    let status = child.wait()?;
    Ok((output?, error?, status))
}

fn joined(handle: ScopedJoinHandle<'_, io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("output reader thread panicked")))
}

/// Copy everything from `reader` to `writer`, returning a copy of what was read.
fn tee<R: Read>(reader: Option<R>, mut writer: impl Write) -> io::Result<Vec<u8>> {
    let Some(mut reader) = reader else {
        return Ok(Vec::new());
    };

    let mut captured = Vec::new();
    let mut buffer = [0; 1024];
    let mut echo = true;
    loop {
        let count = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(count) => count,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        let chunk = &buffer[..count];
        // Keep draining even if our own stream went away, the child would block otherwise
        if echo && writer.write_all(chunk).and_then(|_| writer.flush()).is_err() {
            echo = false;
        }
        captured.extend_from_slice(chunk);
    }

    Ok(captured)
}

/// Values for the env vars in `additions`, with missing paths appended.
///
/// Existing entries of each variable (taken from `env`) are kept in order,
/// paths already present are not repeated. Only variables that actually
/// changed are returned.
pub fn added_env_paths(
    additions: &BTreeMap<String, Vec<String>>,
    env: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut changed = BTreeMap::new();
    for (name, paths) in additions {
        let mut current: Vec<String> = env
            .get(name)
            .map(|value| {
                value
                    .split(PATH_LIST_SEPARATOR)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let before = current.len();
        for path in paths {
            if !path.is_empty() && !current.contains(path) {
                current.push(path.clone());
            }
        }

        if current.len() > before {
            changed.insert(name.clone(), current.join(PATH_LIST_SEPARATOR));
        }
    }

    changed
}

/// Command line, possibly rewritten to go through a throw-away wrapper script.
///
/// Some IDE hosts break `python -m ...` invocations of child processes;
/// going through `/bin/sh wrapper.sh python -m ...` side-steps that. The
/// wrapper's folder is removed when this value is dropped.
#[derive(Debug)]
struct WrappedArgs {
    args: Vec<String>,
    folder: Option<TempDir>,
}

impl WrappedArgs {
    fn new(args: Vec<String>) -> io::Result<Self> {
        let ide_hosted = std::env::var_os(IDE_HOST_MARKER).is_some();
        Self::wrap(args, ide_hosted)
    }

    fn plain(args: Vec<String>) -> Self {
        Self { args, folder: None }
    }

    fn wrap(args: Vec<String>, ide_hosted: bool) -> io::Result<Self> {
        if cfg!(windows) || !ide_hosted || !needs_wrapper(&args) {
            return Ok(Self::plain(args));
        }

        let folder = TempDir::new()?;
        let wrapper = dunce::canonicalize(folder.path())?.join(WRAPPER_NAME);
        std::fs::write(&wrapper, "exec \"$@\"\n")?;

        let mut wrapped = vec![
            "/bin/sh".to_string(),
            wrapper.to_string_lossy().into_owned(),
        ];
        wrapped.extend(args);
        Ok(Self {
            args: wrapped,
            folder: Some(folder),
        })
    }

    fn args(&self) -> &[String] {
        &self.args
    }

    #[cfg(test)]
    fn folder(&self) -> Option<&std::path::Path> {
        self.folder.as_ref().map(TempDir::path)
    }
}

fn needs_wrapper(args: &[String]) -> bool {
    match args {
        [program, first, ..] => {
            program.contains("python") && (first.starts_with("-m") || first.starts_with("-X"))
        }
        _ => false,
    }
}
