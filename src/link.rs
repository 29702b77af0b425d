// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfile link installation.
//!
//! Establish symbolic links from a dotfile __source directory__ into the
//! user's __home directory__. Each configured name `N` results in a link at
//! `$HOME/N` whose target is `$SOURCE/N`.
//!
//! # Best-Effort Installation
//!
//! Linking follows a best-effort approach. Whatever occupies a link path
//! beforehand is removed without question, be it a regular file, a whole
//! directory, or a dangling symlink. Failure to remove that entry is not
//! reported, because the following link creation will fail loudly anyway if
//! the entry is still in the way. Failure to link one dotfile never stops the
//! remaining dotfiles from being linked. The only fatal condition is a source
//! directory that cannot be resolved, which is detected before the home
//! directory is touched at all.
//!
//! Installation is idempotent. Running it twice yields the same layout as
//! running it once, since every link path is cleared before being relinked.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{read_link, remove_dir_all, remove_file, symlink_metadata},
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Install symbolic links for each name from source directory into home
/// directory.
///
/// Names are processed in order. Returns a report listing which names were
/// linked, and which failed along with the reason why.
///
/// # Errors
///
/// - Return [`LinkError::WorkingDir`] if the source directory cannot be
///   resolved to an absolute path. Nothing is modified in this case.
#[instrument(skip(names, working_dir, home_dir), level = "debug")]
pub fn install(
    names: impl IntoIterator<Item = impl AsRef<str>>,
    working_dir: impl AsRef<Path>,
    home_dir: impl AsRef<Path>,
) -> Result<LinkReport> {
    let source = resolve_working_dir(working_dir.as_ref())?;
    let home = home_dir.as_ref();
    let mut report = LinkReport::default();

    for name in names {
        let name = name.as_ref();
        let target = source.join(name);
        let link_path = home.join(name);

        clear_link_path(&link_path);

        match create_link(&target, &link_path) {
            Ok(()) => {
                debug!("link {} -> {}", link_path.display(), target.display());
                report.linked.push(name.to_string());
            }
            Err(error) => {
                debug!("cannot link {}: {error}", link_path.display());
                report.failed.push(LinkFailure {
                    name: name.to_string(),
                    source: error,
                });
            }
        }
    }

    Ok(report)
}

/// Inspect current state of each link without modifying anything.
///
/// # Errors
///
/// - Return [`LinkError::WorkingDir`] if the source directory cannot be
///   resolved to an absolute path.
pub fn status(
    names: impl IntoIterator<Item = impl AsRef<str>>,
    working_dir: impl AsRef<Path>,
    home_dir: impl AsRef<Path>,
) -> Result<Vec<(String, LinkState)>> {
    let source = resolve_working_dir(working_dir.as_ref())?;
    let home = home_dir.as_ref();

    Ok(names
        .into_iter()
        .map(|name| {
            let name = name.as_ref();
            let state = LinkState::inspect(&source.join(name), &home.join(name));
            (name.to_string(), state)
        })
        .collect())
}

/// Resolve source directory to an absolute canonical path.
///
/// # Errors
///
/// - Return [`LinkError::WorkingDir`] if the path does not exist, or cannot
///   be read.
pub fn resolve_working_dir(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|source| LinkError::WorkingDir {
        source,
        path: path.to_path_buf(),
    })
}

/// Remove whatever currently occupies link path.
///
/// Symlinks are removed without being followed, real directories are removed
/// recursively. Errors are swallowed.
fn clear_link_path(link_path: &Path) {
    let metadata = match symlink_metadata(link_path) {
        Ok(metadata) => metadata,
        Err(_) => return,
    };

    let result = if metadata.is_dir() {
        remove_dir_all(link_path)
    } else {
        remove_file(link_path)
    };

    if let Err(error) = result {
        debug!("ignoring failure to remove {}: {error}", link_path.display());
    }
}

fn create_link(target: &Path, link_path: &Path) -> io::Result<()> {
    // INVARIANT: Never leave a dangling link behind for a missing source.
    if symlink_metadata(target).is_err() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source {} does not exist", target.display()),
        ));
    }

    symlink(target, link_path)
}

#[cfg(unix)]
fn symlink(target: &Path, link_path: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link_path)
}

#[cfg(windows)]
fn symlink(target: &Path, link_path: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link_path)
    } else {
        std::os::windows::fs::symlink_file(target, link_path)
    }
}

/// Outcome of link installation.
#[derive(Debug, Default)]
pub struct LinkReport {
    /// Names that were linked, in processing order.
    pub linked: Vec<String>,

    /// Names that could not be linked, in processing order.
    pub failed: Vec<LinkFailure>,
}

impl LinkReport {
    /// Every name was linked.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Single dotfile that could not be linked.
#[derive(Debug, thiserror::Error)]
#[error("failed to link {name:?}")]
pub struct LinkFailure {
    /// Name of dotfile.
    pub name: String,

    /// Underlying system error.
    #[source]
    pub source: io::Error,
}

/// Current state of a link path relative to its expected target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Link path is a symlink to expected target.
    Linked,

    /// Nothing exists at link path.
    Missing,

    /// Link path is a symlink, but to somewhere else.
    Mislinked(PathBuf),

    /// Link path is occupied by a regular file or directory.
    Occupied,

    /// Expected target does not exist in source directory.
    Invalid,
}

impl LinkState {
    fn inspect(target: &Path, link_path: &Path) -> Self {
        if symlink_metadata(target).is_err() {
            return Self::Invalid;
        }

        match read_link(link_path) {
            Ok(current) if current == target => Self::Linked,
            Ok(current) => Self::Mislinked(current),
            Err(_) if symlink_metadata(link_path).is_ok() => Self::Occupied,
            Err(_) => Self::Missing,
        }
    }
}

impl Display for LinkState {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Linked => fmt.write_str("linked"),
            Self::Missing => fmt.write_str("missing"),
            Self::Mislinked(current) => write!(fmt, "points to {}", current.display()),
            Self::Occupied => fmt.write_str("occupied"),
            Self::Invalid => fmt.write_str("source does not exist"),
        }
    }
}

/// Fatal link installation errors.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Source directory cannot be resolved.
    #[error("cannot resolve working directory {:?}", path.display())]
    WorkingDir {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = LinkError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, write};

    fn setup(names: &[&str]) -> anyhow::Result<(PathBuf, PathBuf)> {
        let root = std::env::current_dir()?;
        let source = root.join("dotfiles");
        let home = root.join("home");
        create_dir_all(&source)?;
        create_dir_all(&home)?;
        for name in names {
            write(source.join(name), format!("contents of {name}"))?;
        }

        Ok((source, home))
    }

    #[sealed_test]
    fn clear_link_path_handles_every_entry_kind() -> anyhow::Result<()> {
        let (_, home) = setup(&[])?;

        write(home.join("file"), "old")?;
        create_dir_all(home.join("dir").join("nested"))?;
        symlink(&home.join("nowhere"), &home.join("dangling"))?;

        for name in ["file", "dir", "dangling", "absent"] {
            clear_link_path(&home.join(name));
            assert!(symlink_metadata(home.join(name)).is_err());
        }

        Ok(())
    }

    #[sealed_test]
    fn create_link_refuses_missing_source() -> anyhow::Result<()> {
        let (source, home) = setup(&[])?;

        let result = create_link(&source.join(".zshrc"), &home.join(".zshrc"));
        assert_eq!(result.map_err(|e| e.kind()), Err(io::ErrorKind::NotFound));
        assert!(symlink_metadata(home.join(".zshrc")).is_err());

        Ok(())
    }

    #[sealed_test]
    fn status_classifies_link_paths() -> anyhow::Result<()> {
        let (source, home) = setup(&[".bashrc", ".vimrc", ".zshrc", ".inputrc"])?;
        let source = source.canonicalize()?;

        symlink(&source.join(".bashrc"), &home.join(".bashrc"))?;
        symlink(&source.join(".zshrc"), &home.join(".vimrc"))?;
        write(home.join(".inputrc"), "old")?;

        let result = status(
            [".bashrc", ".vimrc", ".zshrc", ".inputrc", ".curlrc"],
            &source,
            &home,
        )?;
        let expect = vec![
            (".bashrc".to_string(), LinkState::Linked),
            (".vimrc".to_string(), LinkState::Mislinked(source.join(".zshrc"))),
            (".zshrc".to_string(), LinkState::Missing),
            (".inputrc".to_string(), LinkState::Occupied),
            (".curlrc".to_string(), LinkState::Invalid),
        ];
        assert_eq!(result, expect);

        Ok(())
    }
}
