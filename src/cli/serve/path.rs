//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::utils::path::url::split_path_suffix;

/// Resolve a request URL to a file under `serve_root`.
///
/// `/x` tries `x`, then `x.html`, then `x/index.html`. Paths that would
/// leave `serve_root` resolve to nothing.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url)?;
    if clean.split('/').any(|seg| seg == "..") {
        return None;
    }
    let root = serve_root.canonicalize().ok()?;

    let local = root.join(&clean);
    let mut candidates = vec![local.clone()];
    if !clean.is_empty() {
        candidates.push(root.join(format!("{clean}.html")));
    }
    candidates.push(local.join("index.html"));

    candidates.into_iter().find_map(|candidate| {
        // Canonicalize to catch symlinks pointing outside the root
        let canonical = candidate.canonicalize().ok()?;
        (canonical.starts_with(&root) && canonical.is_file()).then_some(canonical)
    })
}

/// Strip query and fragment, percent-decode, trim slashes.
fn normalize_url(url: &str) -> Option<String> {
    let (path, _) = split_path_suffix(url);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    Some(decoded.trim_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("blog/deep")).unwrap();
        fs::create_dir_all(root.join("public")).unwrap();
        fs::write(root.join("index.html"), "home").unwrap();
        fs::write(root.join("blog/post1.html"), "post").unwrap();
        fs::write(root.join("blog/deep/index.html"), "deep").unwrap();
        fs::write(root.join("public/a b.css"), "css").unwrap();
        dir
    }

    fn resolved(root: &Path, url: &str) -> Option<String> {
        resolve_path(url, root).map(|p| fs::read_to_string(p).unwrap())
    }

    #[test]
    fn test_resolve_order() {
        let dir = tree();
        let root = dir.path();
        assert_eq!(resolved(root, "/").as_deref(), Some("home"));
        assert_eq!(resolved(root, "/blog/post1").as_deref(), Some("post"));
        assert_eq!(resolved(root, "/blog/post1.html?x=1").as_deref(), Some("post"));
        assert_eq!(resolved(root, "/blog/deep/").as_deref(), Some("deep"));
        assert_eq!(resolved(root, "/public/a%20b.css").as_deref(), Some("css"));
        assert_eq!(resolved(root, "/missing"), None);
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = tree();
        let root = dir.path().join("blog");
        assert_eq!(resolve_path("/../index.html", &root), None);
        assert_eq!(resolve_path("/%2e%2e/index.html", &root), None);
    }
}
