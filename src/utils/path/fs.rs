//! Filesystem path helpers.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`), then falls
/// back to joining a relative path with the current directory.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Route of `file` under `root`: `"/"` + relative path with the extension
/// stripped, always `/`-separated.
///
/// Returns `None` when `file` is not under `root`.
///
/// ```ignore
/// assert_eq!(route_of(Path::new("/s"), Path::new("/s/blog/post1.md")), Some("/blog/post1".into()));
/// ```
pub fn route_of(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?.with_extension("");
    let mut route = String::new();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            route.push('/');
            route.push_str(&part.to_string_lossy());
        }
    }
    (!route.is_empty()).then_some(route)
}

/// Whether any component of `rel` starts with a dot.
pub fn is_hidden(rel: &Path) -> bool {
    rel.components().any(|c| match c {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.md"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_route_of() {
        let root = Path::new("/site");
        assert_eq!(route_of(root, Path::new("/site/index.md")).as_deref(), Some("/index"));
        assert_eq!(
            route_of(root, Path::new("/site/blog/post1.md")).as_deref(),
            Some("/blog/post1")
        );
        assert_eq!(route_of(root, Path::new("/elsewhere/a.md")), None);
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new(".git/notes.md")));
        assert!(is_hidden(Path::new("blog/.draft.md")));
        assert!(!is_hidden(Path::new("blog/post.md")));
    }
}
