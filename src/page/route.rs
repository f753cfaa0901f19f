//! Route table: every renderable document under the source root.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use rustc_hash::FxHashSet;

use crate::utils::path::{is_hidden, route_of};

/// A file whose name contains one of these (case-insensitively) is never
/// rendered as a page.
pub const IGNORED_NAMES: &[&str] = &["readme", "license", "contributing", "changelog"];

/// Content file extension (compared case-insensitively).
pub const CONTENT_EXT: &str = "md";

/// A document and its route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// `"/" + relative path without extension`
    pub route: String,
    pub source: PathBuf,
}

/// Snapshot of all routes, rebuilt on every build and every rebuild.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    index: FxHashSet<String>,
}

impl RouteTable {
    /// Walk `root` for content documents.
    ///
    /// Dotfiles and dot-directories are skipped, as is everything under
    /// `exclude` (the output directory, when it lives inside the source).
    pub fn scan(root: &Path, exclude: Option<&Path>) -> Self {
        let entries = WalkDir::new(root)
            .skip_hidden(true)
            .sort(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .filter(|path| exclude.is_none_or(|out| !path.starts_with(out)))
            .filter(|path| is_content_file(root, path))
            .filter_map(|source| {
                route_of(root, &source).map(|route| RouteEntry { route, source })
            })
            .collect();
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<RouteEntry>) -> Self {
        let index = entries.iter().map(|e| e.route.clone()).collect();
        Self { entries, index }
    }

    /// Exact string match.
    #[inline]
    pub fn contains(&self, route: &str) -> bool {
        self.index.contains(route)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Routes in lexical order, for navigation output.
    pub fn sorted(&self) -> Vec<&str> {
        let mut routes: Vec<_> = self.entries.iter().map(|e| e.route.as_str()).collect();
        routes.sort_unstable();
        routes
    }
}

/// Whether `path` under `root` is a renderable markdown document.
///
/// Does not touch the filesystem, so it also answers for removed files.
pub fn is_content_file(root: &Path, path: &Path) -> bool {
    let Ok(rel) = path.strip_prefix(root) else {
        return false;
    };
    if is_hidden(rel) {
        return false;
    }

    let has_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(CONTENT_EXT));
    let ignored = path
        .file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|name| IGNORED_NAMES.iter().any(|i| name.contains(i)));

    has_ext && !ignored
}
