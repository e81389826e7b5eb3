// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Locating executables on PATH, and related helpers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::context::is_dryrun;
use crate::error::{abort, Error, Fatal, Result};
use crate::path::short;

#[cfg(test)]
#[path = "./which_test.rs"]
mod which_test;

/// Result of an operation that may have nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The change was performed (or would have been, in dry-run mode).
    Done,
    /// Nothing needed to be done.
    Noop,
    /// The change failed, and the failure was tolerated.
    Failed,
}

/// True if `path` is an existing file that can be executed.
pub fn is_executable(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    #[cfg(unix)]
    {
        use nix::unistd::{access, AccessFlags};

        path.is_file() && access(path, AccessFlags::X_OK).is_ok()
    }
    #[cfg(not(unix))]
    {
        windows_exe(path).is_some()
    }
}

/// Resolve `path` to an existing `.exe` or `.bat` file.
#[cfg(not(unix))]
fn windows_exe(path: &Path) -> Option<PathBuf> {
    let text = path.to_string_lossy();
    [".exe", ".bat"].iter().find_map(|extension| {
        let candidate = if text.to_lowercase().ends_with(extension) {
            path.to_path_buf()
        } else {
            PathBuf::from(format!("{text}{extension}"))
        };
        candidate.is_file().then_some(candidate)
    })
}

#[cfg(unix)]
fn executable_candidate(path: PathBuf) -> Option<PathBuf> {
    is_executable(&path).then_some(path)
}

#[cfg(not(unix))]
fn executable_candidate(path: PathBuf) -> Option<PathBuf> {
    windows_exe(&path)
}

/// Full path to `program`, if it exists and is executable.
///
/// Absolute paths are checked as-is. Other names are looked up in each
/// `PATH` folder in order, then in the current working directory.
pub fn which(program: impl AsRef<Path>) -> Option<PathBuf> {
    find_program(program.as_ref(), None)
}

/// Same as [`which`], skipping executables that live in our own virtual
/// environment (`$VIRTUAL_ENV`, or the prefix of the running executable).
pub fn which_outside_own_venv(program: impl AsRef<Path>) -> Option<PathBuf> {
    let prefix = own_prefix();
    find_program(program.as_ref(), prefix.as_deref())
}

fn find_program(program: &Path, excluded: Option<&Path>) -> Option<PathBuf> {
    if program.as_os_str().is_empty() {
        return None;
    }

    if program.is_absolute() {
        return executable_candidate(program.to_path_buf());
    }

    if let Some(paths) = std::env::var_os("PATH") {
        for folder in std::env::split_paths(&paths) {
            if folder.as_os_str().is_empty() {
                continue;
            }
            let Some(candidate) = executable_candidate(folder.join(program)) else {
                continue;
            };
            if excluded.is_some_and(|prefix| candidate.starts_with(prefix)) {
                continue;
            }
            return Some(candidate);
        }
    }

    let cwd = std::env::current_dir().ok()?;
    executable_candidate(cwd.join(program))
}

/// Prefix of the environment we're running from.
fn own_prefix() -> Option<PathBuf> {
    if let Some(venv) = std::env::var_os("VIRTUAL_ENV").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(venv));
    }
    let exe = std::env::current_exe().ok()?;
    exe.parent()?.parent().map(Path::to_path_buf)
}

/// Path of the currently running program, or of `path` if given.
pub fn program_path(path: Option<&str>) -> PathBuf {
    let path = match path {
        Some(path) => path.to_string(),
        None => std::env::args().next().unwrap_or_default(),
    };
    which(&path).unwrap_or_else(|| PathBuf::from(path))
}

/// Make `path` executable (mode 0o755).
pub fn make_executable(path: impl AsRef<Path>, fatal: Fatal) -> Result<Outcome> {
    let path = path.as_ref();
    if is_executable(path) {
        return Ok(Outcome::Noop);
    }

    if is_dryrun() {
        tracing::debug!("Would make {} executable", short(path));
        return Ok(Outcome::Done);
    }

    if !path.exists() {
        let error = Error::MissingPath {
            path: short(path),
            action: "make it executable",
        };
        return abort(fatal, error, Outcome::Failed);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if let Err(error) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)) {
            let error = Error::ChmodFailed {
                path: short(path),
                error,
            };
            return abort(fatal, error, Outcome::Failed);
        }
    }

    tracing::debug!("Made {} executable", short(path));
    Ok(Outcome::Done)
}

/// How to get a missing program installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instructions {
    /// Same instructions on every platform.
    Text(String),
    /// Instructions per platform name (`darwin`, `linux`, ...).
    PerPlatform(BTreeMap<String, String>),
}

impl Default for Instructions {
    fn default() -> Self {
        Self::PerPlatform(BTreeMap::from([
            ("darwin".to_string(), "run: `brew install {program}`".to_string()),
            ("linux".to_string(), "run: `apt install {program}`".to_string()),
        ]))
    }
}

impl Instructions {
    /// Text to show on `platform`, `{program}` left as a placeholder.
    pub fn for_platform(&self, platform: Option<&str>) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::PerPlatform(by_platform) => {
                match platform.and_then(|p| by_platform.get(p)) {
                    Some(text) if !text.is_empty() => text.clone(),
                    _ => by_platform
                        .iter()
                        .map(|(platform, text)| format!("on {platform}: {text}"))
                        .collect::<Vec<_>>()
                        .join("\n- "),
                }
            }
        }
    }
}

/// Name of the running platform, as used by [`Instructions::PerPlatform`].
pub fn current_platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// Verify that `program` is installed.
///
/// Returns `Ok(true)` when it is, otherwise applies the `fatal` policy
/// (tolerant policies yield `Ok(false)`). `platform` defaults to
/// [`current_platform`].
pub fn require_installed(
    program: &str,
    instructions: Option<&Instructions>,
    fatal: Fatal,
    platform: Option<&str>,
) -> Result<bool> {
    if which(program).is_some() {
        return Ok(true);
    }

    let default = Instructions::default();
    let instructions = instructions.unwrap_or(&default);
    let platform = platform.unwrap_or_else(|| current_platform());
    let text = instructions
        .for_platform(Some(platform))
        .replace("{program}", program);

    let error = Error::NotInstalled {
        program: program.to_string(),
        instructions: Some(text),
    };
    abort(fatal, error, false)
}
