// Copyright (c) Contributors to the runez project.
// SPDX-License-Identifier: Apache-2.0

//! Flattening of nested, optional command line arguments.
//!
//! Arguments are built as [`Arg`] trees, most conveniently with the
//! [`args!`](crate::args) macro, so that optional flags can be written with
//! plain conditionals:
//!
//! ```
//! use runez::{args, flattened};
//!
//! let level: Option<&str> = None;
//! let argv = flattened(args!["install", "--level", level, ["-q", "pkg"]], false);
//! assert_eq!(argv, vec!["install", "-q", "pkg"]);
//! ```

use std::path::{Path, PathBuf};

use crate::path::short;

#[cfg(test)]
#[path = "./flatten_test.rs"]
mod flatten_test;

/// A possibly nested, possibly missing argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// A single value.
    Value(String),
    /// A missing value; also drops a preceding `-flag` when not in unique mode.
    None,
    /// A sequence of arguments, flattened in order.
    List(Vec<Arg>),
}

/// Build an [`Arg::List`] from heterogeneous values.
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        $crate::Arg::List(vec![$($crate::Arg::from($arg)),*])
    };
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Self::Value(value.clone())
    }
}

impl From<&Path> for Arg {
    fn from(value: &Path) -> Self {
        Self::Value(value.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Arg {
    fn from(value: PathBuf) -> Self {
        Self::from(value.as_path())
    }
}

impl From<&PathBuf> for Arg {
    fn from(value: &PathBuf) -> Self {
        Self::from(value.as_path())
    }
}

macro_rules! impl_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Self::Value(value.to_string())
                }
            }
        )*
    };
}

impl_from_display!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, char);

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Arg>, const N: usize> From<[T; N]> for Arg {
    fn from(value: [T; N]) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Arg>> From<&[T]> for Arg {
    fn from(value: &[T]) -> Self {
        Self::List(value.iter().cloned().map(Into::into).collect())
    }
}

/// Flatten `value` into a list of strings.
///
/// Missing values are dropped. When `unique` is false, a missing value
/// right after a flag-like token (starting with `-`) drops that flag too;
/// when `unique` is true, repeated values are dropped instead.
pub fn flattened(value: impl Into<Arg>, unique: bool) -> Vec<String> {
    let mut result = Vec::new();
    flatten_into(&mut result, &value.into(), None, unique);
    result
}

/// Same as [`flattened`], additionally splitting values on `separator`.
pub fn flattened_split(value: impl Into<Arg>, separator: &str, unique: bool) -> Vec<String> {
    let mut result = Vec::new();
    flatten_into(&mut result, &value.into(), Some(separator), unique);
    result
}

fn flatten_into(result: &mut Vec<String>, value: &Arg, separator: Option<&str>, unique: bool) {
    match value {
        Arg::None => {
            if !unique && result.last().is_some_and(|last| last.starts_with('-')) {
                result.pop();
            }
        }
        Arg::List(items) => {
            for item in items {
                flatten_into(result, item, separator, unique);
            }
        }
        Arg::Value(text) => match separator {
            Some(sep) if !sep.is_empty() && text.contains(sep) => {
                for part in text.split(sep).filter(|part| !part.is_empty()) {
                    push_value(result, part, unique);
                }
            }
            _ => push_value(result, text, unique),
        },
    }
}

fn push_value(result: &mut Vec<String>, text: &str, unique: bool) {
    if !unique || !result.iter().any(|existing| existing == text) {
        result.push(text.to_string());
    }
}

/// `text`, quoted if it contains spaces.
pub fn quoted(text: &str) -> String {
    if text.contains(' ') {
        let quote = if text.contains('"') { '\'' } else { '"' };
        format!("{quote}{text}{quote}")
    } else {
        text.to_string()
    }
}

/// Textual representation of `args`, shortened and quoted as needed.
pub fn represented_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| quoted(&short(arg.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}
