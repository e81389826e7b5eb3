// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Path helpers used when reporting what the library does.
//!
//! An "anchor" is a known folder that we don't wish to show in full when
//! printing or logging. While an [`Anchored`] guard is alive, [`short`]
//! strips anchored prefixes and replaces the home folder with `~`.

use std::cell::RefCell;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

#[cfg(test)]
#[path = "./path_test.rs"]
mod path_test;

/// Upper bound on how many parent folders a search may visit.
pub const MAX_FOLDER_DEPTH: usize = 64;

/// Folder names denoting a development build (virtual envs, cargo output, ...).
pub const DEV_FOLDERS: &[&str] = &["venv", ".venv", ".tox", "build", "target"];

static HOME: Lazy<Option<String>> = Lazy::new(|| {
    dirs::home_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|home| home.len() > 1)
});

thread_local! {
    static ANCHORS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Guard keeping folders anchored until dropped, when the prior anchors are restored.
#[derive(Debug)]
#[must_use = "previous anchors are restored as soon as the guard is dropped"]
pub struct Anchored {
    previous: Vec<String>,
}

impl Anchored {
    /// Anchor `folders` (resolved to absolute paths) for the lifetime of the guard.
    pub fn new<I, P>(folders: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let folders: Vec<String> = folders
            .into_iter()
            .map(|folder| resolved_path(folder, None).to_string_lossy().into_owned())
            .collect();

        let previous = ANCHORS.with(|anchors| {
            let mut anchors = anchors.borrow_mut();
            let previous = anchors.clone();
            anchors.extend(folders);
            anchors.sort();
            anchors.dedup();
            // Deeper folders first, so that nested anchors win
            anchors.reverse();
            previous
        });

        Self { previous }
    }
}

impl Drop for Anchored {
    fn drop(&mut self) {
        ANCHORS.with(|anchors| {
            *anchors.borrow_mut() = std::mem::take(&mut self.previous);
        });
    }
}

/// Currently active anchors, deepest first.
pub fn anchors() -> Vec<String> {
    ANCHORS.with(|anchors| anchors.borrow().clone())
}

/// Short form of `text`, with anchored folders stripped and home shown as `~`.
///
/// `text` can be a path, or any message mentioning paths.
pub fn short(text: impl AsRef<OsStr>) -> String {
    let mut text = text.as_ref().to_string_lossy().into_owned();
    ANCHORS.with(|anchors| {
        for anchor in anchors.borrow().iter() {
            text = text.replace(&format!("{anchor}/"), "");
        }
    });

    if let Some(home) = HOME.as_deref() {
        text = text.replace(home, "~");
    }

    text
}

/// Absolute form of `path`, with `~` expanded.
///
/// Relative paths are resolved against `base` when given, the current
/// working directory otherwise.
pub fn resolved_path(path: impl AsRef<Path>, base: Option<&Path>) -> PathBuf {
    let path = path.as_ref();
    let path = match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };

    let path = match base {
        Some(base) if path.is_relative() => resolved_path(base, None).join(path),
        _ => path,
    };

    std::path::absolute(&path).unwrap_or(path)
}

/// First folder containing `path` (or `path` itself) whose name is one of `basenames`.
///
/// Comparison is case-insensitive. The search visits at most
/// [`MAX_FOLDER_DEPTH`] folders.
pub fn find_parent_folder(path: impl AsRef<Path>, basenames: &[&str]) -> Option<PathBuf> {
    path.as_ref()
        .ancestors()
        .take(MAX_FOLDER_DEPTH)
        .find(|folder| {
            folder.file_name().is_some_and(|name| {
                let name = name.to_string_lossy();
                basenames.iter().any(|b| name.eq_ignore_ascii_case(b))
            })
        })
        .map(Path::to_path_buf)
}

/// Development build folder the running executable lives in, if any.
pub fn dev_folder() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    find_parent_folder(exe, DEV_FOLDERS)
}
