//! Site configuration: `dess.toml` plus command-line overrides.
//!
//! # Sections
//!
//! | Section    | Purpose                                        |
//! |------------|------------------------------------------------|
//! | `[build]`  | Output dir, site layout, public dir, minify    |
//! | `[serve]`  | Development server (interface, port, ws_port)  |
//!
//! Precedence: CLI flag > `dess.toml` > built-in default.
//!
//! The config is built once in `main` and handed around as `Arc<SiteConfig>`;
//! nothing reads it from a global.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{BuildConfig, ServeConfig};

use crate::{cli::Cli, utils::path::normalize_path};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file name, looked up in the source directory.
pub const CONFIG_FILE: &str = "dess.toml";

/// Root configuration structure representing dess.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute source directory (internal use only)
    #[serde(skip)]
    pub src_dir: PathBuf,

    /// Config file that was loaded, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Print token streams and layout decisions
    #[serde(skip)]
    pub debug: bool,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let src_dir = normalize_path(&cli.src_dir);
        if !src_dir.is_dir() {
            return Err(ConfigError::SourceDir(cli.src_dir.clone()));
        }

        let config_path = src_dir.join(CONFIG_FILE);
        let mut config = if config_path.is_file() {
            let mut config = Self::from_path(&config_path)?;
            // Paths from the config file are relative to the source dir
            if config.build.out_dir.is_relative() {
                config.build.out_dir = src_dir.join(&config.build.out_dir);
            }
            config.config_path = Some(config_path);
            config
        } else {
            Self::default()
        };

        config.src_dir = src_dir;
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content).map_err(|err| ConfigError::Toml(path.to_path_buf(), err))
    }

    /// Apply command-line overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        self.debug = cli.debug;
        self.build.minify |= cli.minify;

        if let Some(out_dir) = &cli.out_dir {
            self.build.out_dir = out_dir.clone();
        }
        self.build.out_dir = normalize_path(&self.build.out_dir);

        if let Some(layout) = &cli.layout {
            self.build.layout = Some(layout.clone());
        }

        if let Some(args) = cli.serve_args() {
            if let Some(interface) = args.interface {
                self.serve.interface = interface;
            }
            if let Some(port) = args.port {
                self.serve.port = port;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // Clearing the output dir must never wipe the sources
        if self.src_dir.starts_with(&self.build.out_dir) {
            return Err(ConfigError::OutputIsSource(self.build.out_dir.clone()));
        }
        Ok(())
    }

    /// Absolute output directory.
    pub fn output_dir(&self) -> &Path {
        &self.build.out_dir
    }

    /// Absolute static-assets directory on the source side.
    pub fn public_dir(&self) -> PathBuf {
        self.src_dir.join(&self.build.public_dir)
    }

    /// Static-assets directory inside the output tree.
    pub fn public_output_dir(&self) -> PathBuf {
        self.build.out_dir.join(&self.build.public_dir)
    }

    /// Config for tests and programmatic builds rooted at `src_dir`.
    pub fn for_dirs(src_dir: &Path, out_dir: &Path) -> Self {
        Self {
            src_dir: src_dir.to_path_buf(),
            build: BuildConfig {
                out_dir: out_dir.to_path_buf(),
                ..BuildConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Parse a config snippet, panicking on error. Test helper.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    SiteConfig::from_str(content).unwrap()
}
