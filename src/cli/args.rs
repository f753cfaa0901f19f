//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Creates a static website from a directory of markdown files
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Source directory with .md files
    #[arg(short, long, global = true, default_value = "./", value_hint = clap::ValueHint::DirPath)]
    pub src_dir: PathBuf,

    /// Destination directory (default: ./dist, or `out_dir` from dess.toml)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,

    /// Custom layout: a registered layout name or an HTML template path
    #[arg(short, long, global = true)]
    pub layout: Option<String>,

    /// Print debug information (token streams, resolved layouts)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Minify bundled page scripts
    #[arg(short, long, global = true)]
    pub minify: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build static website
    #[command(visible_alias = "b")]
    Build,

    /// Serve the built website without watching for changes
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        serve_args: ServeArgs,
    },

    /// Build, watch the source tree and live-reload open pages
    #[command(visible_alias = "d")]
    Dev {
        #[command(flatten)]
        serve_args: ServeArgs,
    },
}

/// Shared arguments for Serve and Dev commands
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<std::net::IpAddr>,

    /// Port number to listen on (default: 3000)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    pub const fn serve_args(&self) -> Option<&ServeArgs> {
        match &self.command {
            Commands::Serve { serve_args } | Commands::Dev { serve_args } => Some(serve_args),
            Commands::Build => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dess", "build"]).unwrap();
        assert_eq!(cli.src_dir, PathBuf::from("./"));
        assert!(cli.out_dir.is_none());
        assert!(!cli.debug);
        assert!(cli.serve_args().is_none());
    }

    #[test]
    fn test_dev_flags() {
        let cli = Cli::try_parse_from([
            "dess", "dev", "--port", "8080", "--src-dir", "notes", "--layout", "debug",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Dev { .. }));
        assert_eq!(cli.serve_args().and_then(|a| a.port), Some(8080));
        assert_eq!(cli.src_dir, PathBuf::from("notes"));
        assert_eq!(cli.layout.as_deref(), Some("debug"));
    }

    #[test]
    fn test_missing_command_is_error() {
        assert!(Cli::try_parse_from(["dess"]).is_err());
    }
}
