// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Process inspection, based on the output of `ps`.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::args;
use crate::error::Fatal;
use crate::run::{run, RunOptions};

#[cfg(test)]
#[path = "./ps_test.rs"]
mod ps_test;

/// Max number of ancestors visited by [`PsInfo::parent_list`].
pub const MAX_PARENT_DEPTH: usize = 64;

/// Basename of the terminal multiplexer whose session processes get followed.
const MULTIPLEXER: &str = "tmux";

/// Source of process information.
///
/// [`SystemProcessTable`] queries the running system, tests can provide
/// canned answers instead.
pub trait ProcessTable: Send + Sync {
    /// `ps -f` style listing for `pid`: a header line followed by one row.
    fn listing(&self, pid: i32) -> Option<String>;

    /// Pid of the terminal multiplexer client we're attached to, if any.
    fn multiplexer_client(&self) -> Option<i32>;

    /// Name of the user with id `uid`.
    fn user_name(&self, uid: u32) -> Option<String>;

    /// Id of the user called `name`.
    fn user_id(&self, name: &str) -> Option<u32>;

    fn is_executable(&self, path: &Path) -> bool {
        crate::which::is_executable(path)
    }
}

/// [`ProcessTable`] of the running system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessTable;

fn quiet_options() -> RunOptions {
    RunOptions {
        fatal: Fatal::Silent,
        dryrun: Some(false),
        log_level: None,
        ..Default::default()
    }
}

/// Trimmed stdout of a successful run, `None` otherwise.
fn quiet_output(program: &str, args: crate::Arg) -> Option<String> {
    let result = run(program, args, &quiet_options()).ok()?;
    if !result.succeeded() {
        return None;
    }
    result.output().map(String::from)
}

impl ProcessTable for SystemProcessTable {
    fn listing(&self, pid: i32) -> Option<String> {
        quiet_output("ps", args!["-f", "-p", pid])
    }

    fn multiplexer_client(&self) -> Option<i32> {
        quiet_output(MULTIPLEXER, args!["display-message", "-p", "#{client_pid}"])?
            .trim()
            .parse()
            .ok()
    }

    #[cfg(unix)]
    fn user_name(&self, uid: u32) -> Option<String> {
        use nix::unistd::{Uid, User};

        User::from_uid(Uid::from_raw(uid)).ok().flatten().map(|u| u.name)
    }

    #[cfg(not(unix))]
    fn user_name(&self, _uid: u32) -> Option<String> {
        None
    }

    #[cfg(unix)]
    fn user_id(&self, name: &str) -> Option<u32> {
        use nix::unistd::User;

        User::from_name(name).ok().flatten().map(|u| u.uid.as_raw())
    }

    #[cfg(not(unix))]
    fn user_id(&self, _name: &str) -> Option<u32> {
        None
    }
}

/// Snapshot of one process, as reported by `ps`.
///
/// `info` is `None` when the process could not be found or its listing
/// could not be parsed; all accessors then return `None` as well.
/// Ancestors are looked up again on each call.
#[derive(Clone)]
pub struct PsInfo {
    pid: i32,
    info: Option<BTreeMap<String, String>>,
    table: Arc<dyn ProcessTable>,
}

impl PsInfo {
    /// Info for the current process.
    pub fn current() -> Self {
        Self::new(std::process::id() as i32)
    }

    /// Info for `pid`, from the running system.
    pub fn new(pid: i32) -> Self {
        Self::with_table(pid, Arc::new(SystemProcessTable))
    }

    /// Info for `pid`, as reported by `table`.
    pub fn with_table(pid: i32, table: Arc<dyn ProcessTable>) -> Self {
        let info = if pid > 0 {
            table.listing(pid).and_then(|text| parse_ps_listing(&text))
        } else {
            None
        };
        Self { pid, info, table }
    }

    /// Info for `pid`, if such a process exists.
    pub fn from_pid(pid: i32) -> Option<Self> {
        Self::from_pid_with(pid, Arc::new(SystemProcessTable))
    }

    /// Same as [`PsInfo::from_pid`], as reported by `table`.
    pub fn from_pid_with(pid: i32, table: Arc<dyn ProcessTable>) -> Option<Self> {
        if pid <= 0 {
            return None;
        }
        let info = Self::with_table(pid, table);
        info.info.is_some().then_some(info)
    }

    /// Process id this info was requested for.
    pub fn pid(&self) -> i32 {
        self.pid
    }

    /// Columns of the `ps` listing, keyed by header name (`PID`, `PPID`, `UID`, `CMD`, ...).
    pub fn info(&self) -> Option<&BTreeMap<String, String>> {
        self.info.as_ref()
    }

    fn column(&self, key: &str) -> Option<&str> {
        self.info.as_ref()?.get(key).map(String::as_str)
    }

    /// Parent process id.
    pub fn ppid(&self) -> Option<i32> {
        self.column("PPID")?.parse().ok()
    }

    /// Full command line, as shown by `ps`.
    pub fn cmd(&self) -> Option<&str> {
        self.column("CMD").or_else(|| self.column("COMMAND"))
    }

    /// Basename of the program being run.
    ///
    /// `ps` does not quote arguments, so for an absolute command line the
    /// shortest prefix of space-separated words that is an executable file
    /// wins. Without such a prefix, the first word is returned as-is.
    pub fn cmd_basename(&self) -> Option<String> {
        let cmd = self.cmd()?;
        let cmd = cmd.strip_prefix('-').unwrap_or(cmd);
        if cmd.starts_with('/') {
            let words: Vec<&str> = cmd.split(' ').collect();
            for end in 1..=words.len() {
                let candidate = words[..end].join(" ");
                let path = Path::new(&candidate);
                if self.table.is_executable(path) {
                    return path.file_name().map(|name| name.to_string_lossy().into_owned());
                }
            }
        }
        cmd.split_whitespace().next().map(String::from)
    }

    /// Numeric id of the user owning the process.
    pub fn uid(&self) -> Option<u32> {
        let column = self.column("UID")?;
        match column.parse() {
            Ok(uid) => Some(uid),
            Err(_) => self.table.user_id(column),
        }
    }

    /// Name of the user owning the process.
    pub fn userid(&self) -> Option<String> {
        let column = self.column("UID")?;
        match column.parse::<u32>() {
            Ok(uid) => self.table.user_name(uid),
            Err(_) => Some(column.to_string()),
        }
    }

    /// Direct parent process.
    pub fn parent(&self) -> Option<PsInfo> {
        let ppid = self.ppid().filter(|ppid| *ppid != self.pid)?;
        Self::from_pid_with(ppid, self.table.clone())
    }

    /// Parent process, with terminal multiplexer sessions followed to the
    /// client process that is attached to them.
    pub fn followed_parent(&self) -> Option<PsInfo> {
        let parent = self.parent()?;
        if parent.cmd_basename().as_deref() != Some(MULTIPLEXER) {
            return Some(parent);
        }

        let client = self
            .table
            .multiplexer_client()
            .and_then(|pid| Self::from_pid_with(pid, self.table.clone()));
        Some(client.unwrap_or(parent))
    }

    /// Ancestors of this process, closest first.
    ///
    /// Stops at the first repeated pid, and after [`MAX_PARENT_DEPTH`] hops.
    pub fn parent_list(&self, follow: bool) -> Vec<PsInfo> {
        let next = |info: &PsInfo| {
            if follow {
                info.followed_parent()
            } else {
                info.parent()
            }
        };

        let mut seen = HashSet::from([self.pid]);
        let mut result = Vec::new();
        let mut current = next(self);
        while let Some(info) = current {
            if result.len() >= MAX_PARENT_DEPTH || !seen.insert(info.pid) {
                break;
            }
            current = next(&info);
            result.push(info);
        }
        result
    }
}

impl PartialEq for PsInfo {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
    }
}

impl Eq for PsInfo {}

impl fmt::Debug for PsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PsInfo")
            .field("pid", &self.pid)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ppid = self.ppid().map_or_else(|| "-".to_string(), |ppid| ppid.to_string());
        write!(f, "{} {} {}", self.pid, ppid, self.cmd().unwrap_or("-"))
    }
}

/// Parse a header line and a row into columns keyed by header name.
///
/// The last column (the command) takes the remainder of the row.
pub fn parse_ps_listing(text: &str) -> Option<BTreeMap<String, String>> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let header: Vec<&str> = lines.next()?.split_whitespace().collect();
    let row = split_columns(lines.next()?, header.len());
    if header.is_empty() || row.len() != header.len() {
        return None;
    }

    Some(
        header
            .into_iter()
            .map(String::from)
            .zip(row)
            .collect(),
    )
}

/// Split `line` on whitespace into at most `count` columns.
fn split_columns(line: &str, count: usize) -> Vec<String> {
    let mut columns = Vec::with_capacity(count);
    let mut rest = line.trim();
    while columns.len() + 1 < count {
        let Some(end) = rest.find(char::is_whitespace) else {
            break;
        };
        columns.push(rest[..end].to_string());
        rest = rest[end..].trim_start();
    }
    if !rest.is_empty() {
        columns.push(rest.to_string());
    }
    columns
}
