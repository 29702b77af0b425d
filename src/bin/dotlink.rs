// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotlink::{
    link::resolve_working_dir,
    path::{default_config_path, home_dir, working_dir},
    Bootstrap, BootstrapConfig,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
    process::exit,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  dotlink [options] [dotlink-command]",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub roots: RootOptions,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Some(Command::Install(opts)) => run_install(self.roots, opts),
            Some(Command::Status) => run_status(self.roots),
            Some(Command::Init(opts)) => run_init(self.roots, opts),
            None => run_install(self.roots, InstallOptions { no_hooks: false }),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Link dotfiles into home directory, then run enabled hooks.
    #[command(override_usage = "dotlink install [options]")]
    Install(InstallOptions),

    /// Show state of each configured link.
    #[command(override_usage = "dotlink status [options]")]
    Status,

    /// Write default configuration file into dotfile source directory.
    #[command(override_usage = "dotlink init [options]")]
    Init(InitOptions),
}

/// Directories and files every command operates on.
///
/// Global, so they are accepted both before and after the subcommand.
#[derive(Args, Clone, Debug, Default)]
struct RootOptions {
    /// Dotfile source directory [default: current directory].
    #[arg(short, long, global = true, value_name = "path")]
    pub source: Option<PathBuf>,

    /// Directory to place links in [default: home directory]. Also what `~`
    /// and `$HOME` expand to in hook command lines.
    #[arg(long, global = true, value_name = "path")]
    pub home: Option<PathBuf>,

    /// Configuration file [default: <source>/dotlink.toml].
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InstallOptions {
    /// Skip post-link hooks.
    #[arg(long)]
    pub no_hooks: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InitOptions {
    /// Overwrite existing configuration file.
    #[arg(short, long)]
    pub force: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{}", diagnostic(&error));
        exit(1);
    }

    exit(0)
}

/// Render fatal error with its whole cause chain on a single line.
fn diagnostic(error: &anyhow::Error) -> String {
    format!("{error:#}")
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_install(roots: RootOptions, opts: InstallOptions) -> Result<()> {
    let bootstrap = open_bootstrap(roots)?;
    let report = bootstrap.run(!opts.no_hooks)?;

    if !report.links.is_complete() {
        warn!(
            "{} of {} dotfiles could not be linked",
            report.links.failed.len(),
            report.links.failed.len() + report.links.linked.len()
        );
    }

    Ok(())
}

fn run_status(roots: RootOptions) -> Result<()> {
    let bootstrap = open_bootstrap(roots)?;
    for (name, state) in bootstrap.status()? {
        info!("{name}: {state}");
    }

    Ok(())
}

fn run_init(roots: RootOptions, opts: InitOptions) -> Result<()> {
    let source = source_dir(roots.source)?;
    let path = roots.config.unwrap_or_else(|| default_config_path(&source));
    if path.exists() && !opts.force {
        bail!("{:?} already exists, use --force to overwrite", path.display());
    }

    write(&path, BootstrapConfig::default().to_string())
        .with_context(|| format!("failed to write {:?}", path.display()))?;
    info!("wrote default configuration to {:?}", path.display());

    Ok(())
}

fn source_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let source = match explicit {
        Some(path) => path,
        None => working_dir().context("cannot resolve working directory")?,
    };

    Ok(resolve_working_dir(&source)?)
}

fn open_bootstrap(roots: RootOptions) -> Result<Bootstrap> {
    // INVARIANT: Source directory is resolved before anything else is looked up.
    let source = source_dir(roots.source)?;
    let home = match roots.home {
        Some(path) => path,
        None => home_dir()?,
    };
    let config = load_config(roots.config, &source, &home)?;

    Ok(Bootstrap::new(config, source, home))
}

fn load_config(explicit: Option<PathBuf>, source: &Path, home: &Path) -> Result<BootstrapConfig> {
    let path = match explicit {
        Some(path) => path,
        None => {
            let path = default_config_path(source);
            if !path.exists() {
                info!("no configuration at {:?}, using defaults", path.display());
                return Ok(BootstrapConfig::default().resolve_with_home(home)?);
            }
            path
        }
    };

    let data =
        read_to_string(&path).with_context(|| format!("failed to read {:?}", path.display()))?;
    let config = BootstrapConfig::parse_with_home(&data, home)
        .with_context(|| format!("invalid configuration {:?}", path.display()))?;

    Ok(config)
}
