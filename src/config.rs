// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file that dotlink uses to simplify
//! the process of serialization and deserialization. File I/O is left to the
//! caller to figure out.

use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    env::VarError,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Component, Path},
    str::FromStr,
};

/// Dotfiles linked by default when no configuration file is present.
pub const DEFAULT_LINKS: &[&str] = &[
    ".aliases",
    ".bash_profile",
    ".bash_prompt",
    ".bashrc",
    ".curlrc",
    ".editorconfig",
    ".exports",
    ".functions",
    ".gitattributes",
    ".gitignore",
    ".gitmodules",
    ".gvimrc",
    ".hgignore",
    ".inputrc",
    ".macos",
    ".osx",
    ".screenrc",
    ".tmux.conf",
    ".tmux.conf.local",
    ".wgetrc",
    ".zshrc",
];

/// Command line that installs Homebrew.
const HOMEBREW_INSTALL: &str = "/usr/bin/ruby -e \"$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/master/install)\"";

/// Bootstrap configuration layout.
///
/// A dotfile source directory may carry a configuration file at its
/// top-level. This file details which dotfiles should be linked into the
/// user's home directory, and which hooks should run once linking is done.
///
/// # General Layout
///
/// The configuration is composed of two basic parts: settings and hooks.
/// The settings section lists the names of the dotfiles to link. The hooks
/// section is an ordered listing of external commands to run after linking,
/// each of which can be switched on or off.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct BootstrapConfig {
    /// Settings for link installation.
    pub settings: LinkSettings,

    /// Post-link hook listing.
    #[serde(rename = "hook", default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<HookDefinition>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            settings: LinkSettings::default(),
            hooks: vec![
                HookDefinition {
                    name: "macos".into(),
                    program: "bash".into(),
                    args: vec!["$HOME/.macos".into()],
                    enabled: false,
                },
                HookDefinition {
                    name: "homebrew".into(),
                    program: "/bin/bash".into(),
                    args: vec![
                        "-c".into(),
                        HOMEBREW_INSTALL.into(),
                    ],
                    enabled: false,
                },
                HookDefinition {
                    name: "brew-bundle".into(),
                    program: "brew".into(),
                    args: vec!["bundle".into()],
                    enabled: false,
                },
            ],
        }
    }
}

impl FromStr for BootstrapConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let config: BootstrapConfig = toml::from_str(data).map_err(ConfigError::Deserialize)?;
        config.resolve()
    }
}

impl BootstrapConfig {
    /// Validate link names, and expand hook command lines.
    ///
    /// Applied automatically when parsing. Call it directly on configurations
    /// built in code, e.g., [`BootstrapConfig::default`], before use.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::InvalidLinkName`] if a link name could escape
    ///   its root directory.
    /// - Return [`ConfigError::ShellExpansion`] if a hook references an
    ///   undefined variable.
    pub fn resolve(self) -> Result<Self> {
        self.resolve_by(|input| shellexpand::full(input).map(Cow::into_owned))
    }

    /// Same as [`BootstrapConfig::resolve`], but `~` and `$HOME` in hook
    /// command lines expand to `home` instead of the environment.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::InvalidLinkName`] if a link name could escape
    ///   its root directory.
    /// - Return [`ConfigError::ShellExpansion`] if a hook references an
    ///   undefined variable.
    pub fn resolve_with_home(self, home: impl AsRef<Path>) -> Result<Self> {
        let home = home.as_ref().to_string_lossy().into_owned();
        self.resolve_by(|input| {
            shellexpand::full_with_context(
                input,
                || Some(home.clone()),
                |var| match var {
                    "HOME" => Ok(Some(home.clone())),
                    _ => std::env::var(var).map(Some),
                },
            )
            .map(Cow::into_owned)
        })
    }

    /// Parse configuration, expanding hook command lines against `home`.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Deserialize`] if data is not a valid layout.
    /// - Otherwise, see [`BootstrapConfig::resolve_with_home`].
    pub fn parse_with_home(data: &str, home: impl AsRef<Path>) -> Result<Self> {
        let config: BootstrapConfig = toml::from_str(data).map_err(ConfigError::Deserialize)?;
        config.resolve_with_home(home)
    }

    fn resolve_by<F>(mut self, expand: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, shellexpand::LookupError<VarError>>,
    {
        for name in &self.settings.links {
            validate_link_name(name)?;
        }

        // INVARIANT: Perform shell expansion on hook command lines.
        for hook in &mut self.hooks {
            hook.program = expand(&hook.program)?;
            hook.args = hook
                .args
                .iter()
                .map(|arg| expand(arg))
                .collect::<std::result::Result<Vec<_>, _>>()?;
        }

        Ok(self)
    }
}

impl Display for BootstrapConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Link installation settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct LinkSettings {
    /// Names of dotfiles to link, relative to both the source directory and
    /// the home directory.
    pub links: Vec<String>,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            links: DEFAULT_LINKS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// External command to run after link installation.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct HookDefinition {
    /// Label used in log output.
    pub name: String,

    /// Program to execute.
    pub program: String,

    /// Arguments handed to program.
    #[serde(default)]
    pub args: Vec<String>,

    /// Whether hook runs at all.
    #[serde(default)]
    pub enabled: bool,
}

/// Reject link names that could escape the source or home directory.
fn validate_link_name(name: &str) -> Result<()> {
    let path = Path::new(name);
    let escapes = path
        .components()
        .any(|component| !matches!(component, Component::Normal(_)));

    if name.is_empty() || escapes {
        return Err(ConfigError::InvalidLinkName(name.into()));
    }

    Ok(())
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<VarError>),

    /// Link name is empty, absolute, or walks out of its root.
    #[error("invalid link name {0:?}: must be a relative path without '.' or '..'")]
    InvalidLinkName(String),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use simple_test_case::test_case;

    #[sealed_test(env = [("BLAH", "/home/blah")])]
    fn deserialize_bootstrap_config() -> anyhow::Result<()> {
        let result: BootstrapConfig = r#"
            [settings]
            links = [".bashrc", ".vimrc", ".config/nvim"]

            [[hook]]
            name = "macos"
            program = "bash"
            args = ["$BLAH/.macos"]
            enabled = true

            [[hook]]
            name = "bundle"
            program = "brew"
            args = ["bundle"]
        "#
        .parse()?;

        let expect = BootstrapConfig {
            settings: LinkSettings {
                links: vec![".bashrc".into(), ".vimrc".into(), ".config/nvim".into()],
            },
            hooks: vec![
                HookDefinition {
                    name: "macos".into(),
                    program: "bash".into(),
                    args: vec!["/home/blah/.macos".into()],
                    enabled: true,
                },
                HookDefinition {
                    name: "bundle".into(),
                    program: "brew".into(),
                    args: vec!["bundle".into()],
                    enabled: false,
                },
            ],
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn serialize_bootstrap_config() {
        let result = BootstrapConfig {
            settings: LinkSettings {
                links: vec![".bashrc".into(), ".vimrc".into()],
            },
            hooks: vec![HookDefinition {
                name: "bundle".into(),
                program: "brew".into(),
                args: vec!["bundle".into(), "--no-upgrade".into()],
                enabled: false,
            }],
        }
        .to_string();

        let expect = indoc! {r#"
            [settings]
            links = [
                ".bashrc",
                ".vimrc",
            ]

            [[hook]]
            name = "bundle"
            program = "brew"
            args = [
                "bundle",
                "--no-upgrade",
            ]
            enabled = false
        "#};

        assert_eq!(result, expect);
    }

    #[test]
    fn config_without_hooks_has_none() -> anyhow::Result<()> {
        let result: BootstrapConfig = indoc! {r#"
            [settings]
            links = [".zshrc"]
        "#}
        .parse()?;

        assert_eq!(result.settings.links, vec![".zshrc".to_string()]);
        assert!(result.hooks.is_empty());

        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn resolve_default_config_expands_hooks() -> anyhow::Result<()> {
        let result = BootstrapConfig::default().resolve()?;
        let macos = result.hooks.first().map(|hook| hook.args.clone());
        assert_eq!(macos, Some(vec!["/home/blah/.macos".to_string()]));

        // Command substitution is not a variable, and survives expansion.
        let homebrew = result.hooks.get(1).map(|hook| hook.args.clone());
        assert_eq!(
            homebrew,
            Some(vec!["-c".to_string(), HOMEBREW_INSTALL.to_string()])
        );
        Ok(())
    }

    #[test]
    fn default_config_links_common_dotfiles() {
        let result = BootstrapConfig::default();
        assert_eq!(result.settings.links.len(), DEFAULT_LINKS.len());
        assert_eq!(result.settings.links.first().map(String::as_str), Some(".aliases"));
        assert!(result.hooks.iter().all(|hook| !hook.enabled));

        let hooks = result
            .hooks
            .iter()
            .map(|hook| hook.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(hooks, vec!["macos", "homebrew", "brew-bundle"]);
    }

    #[sealed_test(env = [("HOME", "/home/real")])]
    fn resolve_with_home_prefers_given_home() -> anyhow::Result<()> {
        let mut config = BootstrapConfig::default();
        config.hooks.push(HookDefinition {
            name: "tilde".into(),
            program: "~/bin/setup".into(),
            args: Vec::new(),
            enabled: true,
        });

        let result = config.resolve_with_home("/tmp/fake")?;
        let macos = result.hooks.first().map(|hook| hook.args.clone());
        assert_eq!(macos, Some(vec!["/tmp/fake/.macos".to_string()]));
        let tilde = result.hooks.last().map(|hook| hook.program.clone());
        assert_eq!(tilde, Some("/tmp/fake/bin/setup".to_string()));

        Ok(())
    }

    #[sealed_test(env = [("HOME", "/home/real")])]
    fn parse_with_home_expands_against_given_home() -> anyhow::Result<()> {
        let data = indoc! {r#"
            [settings]
            links = [".bashrc"]

            [[hook]]
            name = "macos"
            program = "bash"
            args = ["$HOME/.macos"]
        "#};

        let result = BootstrapConfig::parse_with_home(data, "/tmp/fake")?;
        let macos = result.hooks.first().map(|hook| hook.args.clone());
        assert_eq!(macos, Some(vec!["/tmp/fake/.macos".to_string()]));

        Ok(())
    }

    #[test_case(""; "empty")]
    #[test_case("/etc/passwd"; "absolute")]
    #[test_case("../.bashrc"; "parent escape")]
    #[test_case(".config/../../.bashrc"; "nested parent escape")]
    #[test_case("./.bashrc"; "current dir prefix")]
    #[test]
    fn reject_invalid_link_name(name: &str) {
        let data = format!("[settings]\nlinks = [{name:?}]\n");
        let result = data.parse::<BootstrapConfig>();
        assert!(matches!(result, Err(ConfigError::InvalidLinkName(_))));
    }
}
