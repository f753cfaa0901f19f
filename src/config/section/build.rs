//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! out_dir = "dist"          # Output directory (relative to the source dir)
//! layout = "debug"          # Site-wide layout: registered name or template path
//! public_dir = "public"     # Static assets copied verbatim
//! minify = false            # Minify bundled page scripts
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Output directory.
    pub out_dir: PathBuf,

    /// Site-wide layout reference.
    pub layout: Option<String>,

    /// Static-assets subdirectory of the source dir.
    pub public_dir: PathBuf,

    /// Minify bundled scripts.
    pub minify: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("./dist"),
            layout: None,
            public_dir: PathBuf::from("public"),
            minify: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.out_dir, PathBuf::from("./dist"));
        assert_eq!(config.build.public_dir, PathBuf::from("public"));
        assert!(config.build.layout.is_none());
        assert!(!config.build.minify);
    }

    #[test]
    fn test_build_config_override() {
        let config = test_parse_config("[build]\nlayout = \"debug\"\nminify = true");
        assert_eq!(config.build.layout.as_deref(), Some("debug"));
        assert!(config.build.minify);
    }
}
