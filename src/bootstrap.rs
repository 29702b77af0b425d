// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Bootstrap pipeline.
//!
//! Link installation followed by an ordered listing of optional hooks. Both
//! halves are best-effort: per-link and per-hook failures are logged and
//! reported, but only an unresolvable source directory aborts the run.

use crate::{
    config::BootstrapConfig,
    hook::{run_hooks, HookOutcome},
    link::{self, LinkReport, LinkState},
};

use std::path::PathBuf;
use tracing::{error, info, instrument};

/// Machine bootstrap run.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    config: BootstrapConfig,
    working_dir: PathBuf,
    home_dir: PathBuf,
}

impl Bootstrap {
    /// Construct new bootstrap run.
    pub fn new(
        config: BootstrapConfig,
        working_dir: impl Into<PathBuf>,
        home_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            working_dir: working_dir.into(),
            home_dir: home_dir.into(),
        }
    }

    /// Install links, then run enabled hooks if requested.
    ///
    /// # Errors
    ///
    /// - Return [`link::LinkError`] if source directory cannot be resolved.
    ///   No link is installed, and no hook is run.
    #[instrument(skip(self), level = "debug")]
    pub fn run(&self, with_hooks: bool) -> link::Result<BootstrapReport> {
        let links = link::install(
            &self.config.settings.links,
            &self.working_dir,
            &self.home_dir,
        )?;

        for failure in &links.failed {
            error!("failed to set symlink {:?}: {}", failure.name, failure.source);
        }
        info!("finished symlinks");

        let hooks = if with_hooks {
            run_hooks(&self.config.hooks)
        } else {
            Vec::new()
        };

        Ok(BootstrapReport { links, hooks })
    }

    /// Report current state of each configured link.
    ///
    /// # Errors
    ///
    /// - Return [`link::LinkError`] if source directory cannot be resolved.
    pub fn status(&self) -> link::Result<Vec<(String, LinkState)>> {
        link::status(
            &self.config.settings.links,
            &self.working_dir,
            &self.home_dir,
        )
    }
}

/// Outcome of a bootstrap run.
#[derive(Debug)]
pub struct BootstrapReport {
    /// Link installation outcome.
    pub links: LinkReport,

    /// Outcome of each hook that ran.
    pub hooks: Vec<HookOutcome>,
}
