//! dess - a static site generator for directories of markdown notes.

mod actor;
mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod page;
mod reload;
mod utils;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build::build_site};
use config::SiteConfig;
use page::BuildMode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log!("error"; "{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Before any blocking work, so Ctrl+C during a build exits cleanly
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = Arc::new(SiteConfig::load(&cli)?);
    logger::set_debug(config.debug);
    if let Some(path) = &config.config_path {
        debug!("config"; "loaded {}", path.display());
    }

    match &cli.command {
        Commands::Build => {
            build_site(&config, BuildMode::Production)?.into_result()?;
            Ok(())
        }
        Commands::Serve { .. } => cli::serve::serve(config),
        Commands::Dev { .. } => cli::serve::dev(config),
    }
}
