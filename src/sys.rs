//! # System functions
//!
//! A collection of functions that make common system-level operations easier to
//! perform. In most cases, these are convenience wrappers that reduce verbosity
//! and take an opinionated stance on how to interpret errors.
use std::env;
use std::path::{Path, PathBuf};

pub trait AsString {
    fn as_string(&self) -> String;
}

impl AsString for PathBuf {
    fn as_string(&self) -> String {
        self.display().to_string()
    }
}

impl AsString for Path {
    fn as_string(&self) -> String {
        self.display().to_string()
    }
}

/// Returns the `HOME` path as derived from the environment, or [`this_dir`] if an
/// error occurred while getting the value of `HOME`.
pub fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(this_dir)
}

/// Returns the path for `"."`.
pub fn this_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Returns a pretty version of `path` by attempting to strip the prefix if it matches
/// the value of [`home_dir`] and replacing it with `"~"`, otherwise `path` itself is
/// returned.
pub fn pretty_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref().as_string();
    path.strip_prefix(&home_dir().as_string())
        .map(|suffix| {
            if suffix.len() > 0 {
                String::from("~") + suffix
            } else {
                String::from("~/")
            }
        })
        .unwrap_or(path)
}
