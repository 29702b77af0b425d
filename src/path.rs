// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine the two roots that link installation operates between: the
//! user's home directory, and the dotfile source directory the program was
//! invoked from. Both are resolved once at startup and handed to the linker
//! explicitly.

use std::path::{Path, PathBuf};

/// Name of configuration file looked up at the top-level of a dotfile source
/// directory.
pub const CONFIG_FILE_NAME: &str = "dotlink.toml";

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf, NoWayHome> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine absolute path to current working directory.
///
/// # Errors
///
/// - Return [`std::io::Error`] if the current directory was removed, or the
///   process lacks permission to read it.
pub fn working_dir() -> std::io::Result<PathBuf> {
    std::env::current_dir()
}

/// Default location of configuration file for a given dotfile source
/// directory.
pub fn default_config_path(working_dir: impl AsRef<Path>) -> PathBuf {
    working_dir.as_ref().join(CONFIG_FILE_NAME)
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;
