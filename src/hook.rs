// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Post-link hooks.
//!
//! A __hook__ is an external command that runs once link installation is
//! over, e.g., a script that applies system preferences, or a package manager
//! that installs everything listed in a bundle file. Hooks are opaque to
//! dotlink. It only spawns them in order, captures what they print, and logs
//! whether they succeeded. A failing hook never stops the hooks after it.

use crate::config::HookDefinition;

use std::{ffi::OsStr, process::Command};
use tracing::{debug, error, info, instrument};

/// Run each enabled hook in order.
///
/// Disabled hooks are skipped. Returns one outcome per hook that actually
/// ran, in the order they ran.
pub fn run_hooks<'a>(hooks: impl IntoIterator<Item = &'a HookDefinition>) -> Vec<HookOutcome> {
    let mut outcomes = Vec::new();
    for hook in hooks {
        if !hook.enabled {
            debug!("skip disabled hook {:?}", hook.name);
            continue;
        }

        outcomes.push(run_hook(hook));
    }

    outcomes
}

#[instrument(skip(hook), fields(hook = %hook.name), level = "debug")]
fn run_hook(hook: &HookDefinition) -> HookOutcome {
    info!("run hook {:?}", hook.name);
    let result = syscall_non_interactive(&hook.program, &hook.args);
    match &result {
        Ok(output) if !output.is_empty() => info!("{output}"),
        Ok(_) => {}
        Err(err) => error!("hook {:?} failed: {err}", hook.name),
    }

    HookOutcome {
        name: hook.name.clone(),
        result,
    }
}

/// Result of running a single hook.
#[derive(Debug)]
pub struct HookOutcome {
    /// Name of hook.
    pub name: String,

    /// Captured output on success.
    pub result: Result<String>,
}

impl HookOutcome {
    /// Hook exited successfully.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

fn syscall_non_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<String> {
    let output = Command::new(cmd.as_ref())
        .args(args)
        .output()
        .map_err(|source| HookError::Spawn {
            source,
            program: cmd.as_ref().to_string_lossy().into_owned(),
        })?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
    let mut message = String::new();

    if !stdout.is_empty() {
        message.push_str(format!("stdout: {stdout}").as_str());
    }

    if !stderr.is_empty() {
        message.push_str(format!("stderr: {stderr}").as_str());
    }

    // INVARIANT: Chomp trailing newlines.
    let message = message
        .strip_suffix("\r\n")
        .or(message.strip_suffix('\n'))
        .map(ToString::to_string)
        .unwrap_or(message);

    if !output.status.success() {
        return Err(HookError::Status {
            program: cmd.as_ref().to_string_lossy().into_owned(),
            code: output.status.code(),
            message,
        });
    }

    Ok(message)
}

/// Hook execution errors.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Program could not be spawned at all.
    #[error("failed to spawn {program:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        program: String,
    },

    /// Program exited unsuccessfully.
    #[error("command {program:?} exited with {code:?}:\n{message}")]
    Status {
        program: String,
        code: Option<i32>,
        message: String,
    },
}

/// Friendly result alias :3
pub type Result<T, E = HookError> = std::result::Result<T, E>;
