//! Compiler Actor - Incremental Rebuilds
//!
//! Turns a debounced batch of file changes into output updates:
//!
//! ```text
//! Changes(batch) --> classify each path --> rebuild / copy / remove
//!                                       --> Refresh (at most once per batch)
//! ```
//!
//! The actor is `Idle` between batches and `Building` while one is processed.
//! Batches that arrive meanwhile wait in the channel.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use super::messages::{ChangeKind, CompilerMsg, WsMsg};
use crate::asset;
use crate::cli::build::{build_site, error_chain};
use crate::config::SiteConfig;
use crate::logger::{status_error, status_success, status_warning};
use crate::page::layout::LayoutRegistry;
use crate::page::render::output_path;
use crate::page::route::is_content_file;
use crate::page::{BuildMode, PageError, RenderContext, RouteTable, write_page};
use crate::utils::path::{normalize_path, route_of};

/// What a single changed path calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Ignore,
    /// Re-render one content document.
    Rebuild,
    /// A content document is gone: delete its page.
    RemovePage,
    /// Copy one public file into the output tree.
    CopyAsset,
    /// A public file is gone: delete its copy.
    RemoveAsset,
    /// The site layout template changed: every page depends on it.
    FullRebuild,
}

/// Decide what `path` needs. Pure apart from path arithmetic.
pub fn classify(path: &Path, kind: ChangeKind, config: &SiteConfig) -> Action {
    let removed = kind == ChangeKind::Removed;

    if path.starts_with(config.output_dir()) {
        return Action::Ignore;
    }
    if path.starts_with(config.public_dir()) {
        return if removed {
            Action::RemoveAsset
        } else {
            Action::CopyAsset
        };
    }
    if layout_template(config).is_some_and(|template| template == path) {
        return Action::FullRebuild;
    }
    if is_content_file(&config.src_dir, path) {
        return if removed {
            Action::RemovePage
        } else {
            Action::Rebuild
        };
    }
    Action::Ignore
}

/// The configured site layout as a file path, when it names a template.
fn layout_template(config: &SiteConfig) -> Option<PathBuf> {
    let reference = config.build.layout.as_deref()?;
    let registry = LayoutRegistry::new(&config.src_dir);
    if registry.is_registered(reference) {
        return None;
    }
    Some(normalize_path(&registry.template_path(reference)))
}

/// Result of one processed batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Pages written, pages removed and public files copied or removed.
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchOutcome {
    /// One refresh per batch that changed anything in the output tree.
    pub fn should_refresh(&self) -> bool {
        self.succeeded > 0
    }
}

/// Apply every change in `batch` to the output tree.
///
/// Failures are logged and counted; none of them stop the batch.
pub fn process_batch(config: &SiteConfig, batch: &[(PathBuf, ChangeKind)]) -> BatchOutcome {
    let actions: Vec<_> = batch
        .iter()
        .map(|(path, kind)| (path.as_path(), classify(path, *kind, config)))
        .filter(|(path, action)| {
            crate::debug!("compile"; "{:?}: {}", action, path.display());
            *action != Action::Ignore
        })
        .collect();

    let mut outcome = BatchOutcome::default();
    if actions.is_empty() {
        return outcome;
    }

    if actions.iter().any(|(_, a)| *a == Action::FullRebuild) {
        full_rebuild(config, &mut outcome);
        return outcome;
    }

    // One route table per batch, taken after the batch hit the disk
    let routes = RouteTable::scan(&config.src_dir, Some(config.output_dir()));
    let layouts = LayoutRegistry::with_default(&config.src_dir, config.build.layout.as_deref());
    let ctx = RenderContext {
        config,
        routes: &routes,
        layouts: &layouts,
        mode: BuildMode::Development,
    };

    for (path, action) in actions {
        let rel = path.strip_prefix(&config.src_dir).unwrap_or(path);
        match action {
            Action::Rebuild => match write_page(&ctx, path) {
                Ok(_) => {
                    outcome.succeeded += 1;
                    status_success(&format!("rebuilt: {}", rel.display()));
                }
                Err(e) => {
                    outcome.failed += 1;
                    report_page_error(rel, &e);
                }
            },
            Action::RemovePage => match remove_page(config, path) {
                Ok(()) => {
                    outcome.succeeded += 1;
                    status_success(&format!("removed: {}", rel.display()));
                }
                Err(e) => {
                    outcome.failed += 1;
                    status_error(&format!("failed to remove page for {}", rel.display()), &e.to_string());
                }
            },
            Action::CopyAsset => match asset::copy_public_file(config, path) {
                Ok(true) => {
                    outcome.succeeded += 1;
                    status_success(&format!("copied: {}", rel.display()));
                }
                Ok(false) => {}
                Err(e) => {
                    outcome.failed += 1;
                    status_error(&format!("failed to copy {}", rel.display()), &e.to_string());
                }
            },
            Action::RemoveAsset => match asset::remove_public_file(config, path) {
                Ok(true) => outcome.succeeded += 1,
                Ok(false) => {}
                Err(e) => {
                    outcome.failed += 1;
                    status_error(&format!("failed to remove {}", rel.display()), &e.to_string());
                }
            },
            Action::Ignore | Action::FullRebuild => {}
        }
    }
    outcome
}

fn full_rebuild(config: &SiteConfig, outcome: &mut BatchOutcome) {
    match build_site(config, BuildMode::Development) {
        Ok(report) => {
            outcome.succeeded += report.written.len();
            outcome.failed += report.failed.len();
            if report.failed.is_empty() {
                status_success(&format!("layout changed, rebuilt {} pages", report.written.len()));
            } else {
                status_warning(&format!(
                    "layout changed, {} of {} pages failed",
                    report.failed.len(),
                    report.total()
                ));
            }
        }
        Err(e) => {
            outcome.failed += 1;
            status_error("full rebuild failed", &format!("{e:#}"));
        }
    }
}

/// A source that vanished between the event and the read is transient.
fn report_page_error(rel: &Path, err: &PageError) {
    if let PageError::SourceRead { source, .. } = err
        && source.kind() == io::ErrorKind::NotFound
    {
        crate::log!("watch"; "{} changed while reading, skipped", rel.display());
        return;
    }
    status_error(&format!("failed: {}", rel.display()), &error_chain(err));
}

/// Delete the page rendered from a removed document.
fn remove_page(config: &SiteConfig, source: &Path) -> io::Result<()> {
    let Some(route) = route_of(&config.src_dir, source) else {
        return Ok(());
    };
    match fs::remove_file(output_path(config.output_dir(), &route)) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Building,
}

pub struct CompilerActor {
    rx: mpsc::Receiver<CompilerMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    config: Arc<SiteConfig>,
    state: State,
}

impl CompilerActor {
    pub fn new(
        rx: mpsc::Receiver<CompilerMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        config: Arc<SiteConfig>,
    ) -> Self {
        Self {
            rx,
            ws_tx,
            config,
            state: State::Idle,
        }
    }

    /// Main event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                CompilerMsg::Changes(batch) => self.on_changes(batch).await,
                CompilerMsg::Shutdown => {
                    crate::debug!("compile"; "shutting down");
                    break;
                }
            }
        }
    }

    async fn on_changes(&mut self, batch: Vec<(PathBuf, ChangeKind)>) {
        let start = Instant::now();
        self.transition(State::Building);

        let config = Arc::clone(&self.config);
        let result = tokio::task::spawn_blocking(move || process_batch(&config, &batch)).await;
        self.transition(State::Idle);

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                crate::log!("compile"; "error: {}", e);
                return;
            }
        };
        crate::debug!(
            "compile";
            "{} ok, {} failed in {:?}",
            outcome.succeeded,
            outcome.failed,
            start.elapsed()
        );

        if outcome.should_refresh() {
            let _ = self.ws_tx.send(WsMsg::Refresh).await;
        }
    }

    fn transition(&mut self, next: State) {
        crate::debug!("compile"; "{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
