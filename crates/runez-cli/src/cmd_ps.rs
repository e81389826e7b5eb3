// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `runez ps` command.

use clap::Args;
use colored::Colorize;
use miette::Result;
use runez::PsInfo;

#[cfg(test)]
#[path = "./cmd_ps_test.rs"]
mod cmd_ps_test;

const HEADERS: [&str; 4] = ["PID", "PPID", "USER", "CMD"];

/// Show a process and its ancestors
#[derive(Debug, Args)]
pub struct CmdPs {
    /// Process to show, defaults to this process
    pid: Option<i32>,

    /// Follow terminal multiplexer sessions to the attached client
    #[clap(long)]
    follow: bool,

    /// Output format: table, json
    #[clap(long, default_value = "table")]
    format: String,
}

impl CmdPs {
    pub fn run(&mut self) -> Result<i32> {
        let info = match self.pid {
            Some(pid) => PsInfo::from_pid(pid)
                .ok_or_else(|| miette::miette!("No process found with pid {pid}"))?,
            None => PsInfo::current(),
        };

        let mut chain = vec![info.clone()];
        chain.extend(info.parent_list(self.follow));

        match self.format.as_str() {
            "table" => show_table(&chain),
            "json" => {
                let value = serde_json::Value::Array(chain.iter().map(json_row).collect());
                let text = serde_json::to_string_pretty(&value)
                    .map_err(|e| miette::miette!("Failed to serialize process info: {e}"))?;
                println!("{text}");
            }
            other => {
                return Err(miette::miette!(
                    "Unknown format '{other}', expected 'table' or 'json'"
                ));
            }
        }

        Ok(0)
    }
}

fn show_table(chain: &[PsInfo]) {
    let rows: Vec<[String; 4]> = chain.iter().map(table_row).collect();
    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let header = HEADERS
        .iter()
        .zip(widths)
        .map(|(name, width)| format!("{name:<width$}"))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", header.trim_end().bold());

    let max_width = runez::terminal_width(None).map(usize::from);
    for row in rows {
        let mut line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string();
        if let Some(max_width) = max_width {
            if line.chars().count() > max_width {
                line = line.chars().take(max_width).collect();
            }
        }
        println!("{line}");
    }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub(crate) fn table_row(info: &PsInfo) -> [String; 4] {
    [
        info.pid().to_string(),
        or_dash(info.ppid()),
        or_dash(info.userid()),
        or_dash(info.cmd()),
    ]
}

pub(crate) fn json_row(info: &PsInfo) -> serde_json::Value {
    serde_json::json!({
        "pid": info.pid(),
        "ppid": info.ppid(),
        "uid": info.uid(),
        "user": info.userid(),
        "cmd": info.cmd(),
        "cmd_basename": info.cmd_basename(),
    })
}
