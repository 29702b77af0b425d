// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Personal machine bootstrap.
//!
//! Link dotfiles from a source directory into the user's home directory, then
//! run whatever post-link hooks the user enabled.

pub mod bootstrap;
pub mod config;
pub mod hook;
pub mod link;
pub mod path;

pub use bootstrap::{Bootstrap, BootstrapReport};
pub use config::{BootstrapConfig, ConfigError, HookDefinition, LinkSettings};
pub use link::{install, LinkError, LinkFailure, LinkReport, LinkState};
