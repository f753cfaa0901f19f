//! Site building orchestration.
//!
//! Build phases:
//! - **Init** - clear and recreate the output directory
//! - **Collect** - scan the route table and the public directory
//! - **Render** - every document in parallel, public files alongside
//! - **Finalize** - failure summary and timing

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use thiserror::Error;

use crate::asset;
use crate::config::SiteConfig;
use crate::log;
use crate::logger::ProgressLine;
use crate::page::layout::LayoutRegistry;
use crate::page::{BuildMode, PageError, RenderContext, RouteTable, write_page};

/// A build that finished but left documents unwritten.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{failed} of {total} pages failed to build")]
    PagesFailed { failed: usize, total: usize },
}

/// Outcome of one full build.
#[derive(Debug)]
pub struct BuildReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<PageError>,
    pub assets: usize,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len()
    }

    /// Log every failure with its file, then a one-line summary.
    pub fn log_failures(&self) {
        for err in &self.failed {
            log!("error"; "{}: {}", err.path().display(), error_chain(err));
        }
    }

    /// `Err` when any document failed.
    pub fn into_result(self) -> Result<Self, BuildError> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(BuildError::PagesFailed {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}

/// Build the entire site.
///
/// Every document is attempted. Per-document failures land in
/// [`BuildReport::failed`]; only setup problems (output dir, public copy)
/// return `Err`.
pub fn build_site(config: &SiteConfig, mode: BuildMode) -> Result<BuildReport> {
    let start = Instant::now();
    init_output(config)?;

    let routes = RouteTable::scan(&config.src_dir, Some(config.output_dir()));
    let layouts = LayoutRegistry::with_default(&config.src_dir, config.build.layout.as_deref());
    let public = asset::collect_public_files(config);
    if routes.is_empty() {
        log!("warn"; "no markdown documents under {}", config.src_dir.display());
    }
    crate::debug!("build"; "{} pages, {} public files", routes.len(), public.len());

    let progress = ProgressLine::new(&[("pages", routes.len()), ("public", public.len())]);
    let ctx = RenderContext {
        config,
        routes: &routes,
        layouts: &layouts,
        mode,
    };

    let (results, assets) = rayon::join(
        || {
            routes
                .entries()
                .par_iter()
                .map(|entry| {
                    let result = write_page(&ctx, &entry.source);
                    progress.inc("pages");
                    result
                })
                .collect::<Vec<_>>()
        },
        || asset::copy_public(config, &public, Some(&progress)),
    );
    progress.finish();
    let assets = assets?;

    let (written, failed): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let report = BuildReport {
        written: written.into_iter().filter_map(Result::ok).collect(),
        failed: failed.into_iter().filter_map(Result::err).collect(),
        assets,
        elapsed: start.elapsed(),
    };

    report.log_failures();
    log!(
        "build";
        "{} pages, {} public files, done in {}ms",
        report.written.len(),
        report.assets,
        report.elapsed.as_millis()
    );
    Ok(report)
}

/// Remove stale output, then recreate the directory.
fn init_output(config: &SiteConfig) -> Result<()> {
    let out = config.output_dir();
    if config.src_dir.starts_with(out) {
        bail!("refusing to clear {}: it contains the sources", out.display());
    }
    if out.exists() {
        fs::remove_dir_all(out)
            .with_context(|| format!("failed to clear output dir {}", out.display()))?;
    }
    fs::create_dir_all(out)
        .with_context(|| format!("failed to create output dir {}", out.display()))
}

/// `error: cause: cause` on one line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::render::output_path;
    use crate::utils::path::normalize_path;
    use tempfile::TempDir;

    fn site(files: &[(&str, &str)]) -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let root = normalize_path(dir.path());
        for (rel, content) in files {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let config = SiteConfig::for_dirs(&root, &root.join("dist"));
        (dir, config)
    }

    fn sample() -> (TempDir, SiteConfig) {
        site(&[
            ("index.md", "# Home\n\n[Post](/blog/post1) and [about](about#team).\n"),
            ("about.md", "# About\n\n## Team\n"),
            ("blog/post1.md", "---\ntitle: First\n---\nBack [home](/index?x=1).\n"),
            ("README.md", "ignored\n"),
            ("public/style.css", "body { color: red }\n"),
        ])
    }

    #[test]
    fn test_build_writes_pages_and_public() {
        let (_dir, config) = sample();
        let stale = config.output_dir().join("stale.html");
        fs::create_dir_all(config.output_dir()).unwrap();
        fs::write(&stale, "old").unwrap();

        let report = build_site(&config, BuildMode::Production).unwrap();
        assert!(report.failed.is_empty());
        assert_eq!(report.written.len(), 3);
        assert_eq!(report.assets, 1);
        assert!(!stale.exists());
        assert!(!config.output_dir().join("README.html").exists());
        assert_eq!(
            fs::read_to_string(config.output_dir().join("public/style.css")).unwrap(),
            "body { color: red }\n"
        );
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let (_dir, config) = sample();
        let read_all = |config: &SiteConfig| {
            ["/index", "/about", "/blog/post1"]
                .map(|route| fs::read(output_path(config.output_dir(), route)).unwrap())
        };

        build_site(&config, BuildMode::Production).unwrap();
        let first = read_all(&config);
        build_site(&config, BuildMode::Production).unwrap();
        assert_eq!(first, read_all(&config));
    }

    #[test]
    fn test_rewritten_links_resolve_to_output_files() {
        let (_dir, config) = sample();
        build_site(&config, BuildMode::Production).unwrap();

        let html = fs::read_to_string(output_path(config.output_dir(), "/index")).unwrap();
        let mut checked = 0;
        for href in html.split("href=\"").skip(1).filter_map(|s| s.split('"').next()) {
            let path = href.split(['?', '#']).next().unwrap_or(href);
            if !path.ends_with(".html") || href.starts_with("http") {
                continue;
            }
            let target = if path.starts_with('/') {
                config.output_dir().join(path.trim_start_matches('/'))
            } else {
                config.output_dir().join(path)
            };
            assert!(target.is_file(), "dangling link {href}");
            checked += 1;
        }
        assert!(checked >= 2);
    }

    #[test]
    fn test_one_broken_page_does_not_stop_the_rest() {
        let (_dir, config) = site(&[
            ("good.md", "# Good\n"),
            ("bad.md", "---\njs: missing.js\n---\nbody\n"),
        ]);
        let report = build_site(&config, BuildMode::Production).unwrap();
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].path().ends_with("bad.md"));
        assert!(config.output_dir().join("good.html").is_file());

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, BuildError::PagesFailed { failed: 1, total: 2 }));
    }

    #[test]
    fn test_never_clears_a_source_ancestor() {
        let (dir, _) = sample();
        let root = normalize_path(dir.path());
        let config = SiteConfig::for_dirs(&root.join("blog"), &root);

        assert!(build_site(&config, BuildMode::Production).is_err());
        assert!(root.join("blog/post1.md").is_file());
        assert!(root.join("index.md").is_file());
    }

    #[test]
    fn test_error_chain() {
        let err = PageError::SourceRead {
            path: PathBuf::from("a.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(error_chain(&err), "failed to read `a.md`: gone");
    }
}
