//! Page layouts.
//!
//! A layout turns a rendered markdown body plus page context into a complete
//! HTML document. Layouts are registered by name in a [`LayoutRegistry`];
//! a reference that is not a registered name is loaded as an HTML template
//! file relative to the source root.

mod builtin;
mod template;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

pub use builtin::{DebugLayout, DefaultLayout};
pub use template::TemplateLayout;

use super::{Frontmatter, Heading, RouteTable};
use crate::log;

/// Name of the built-in layout used when nothing else is configured.
pub const DEFAULT_LAYOUT: &str = "default";

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout `{0}` is neither registered nor an existing template file")]
    NotFound(String),

    #[error("failed to read layout template `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a layout may draw on.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext<'a> {
    /// Route of the page being rendered, e.g. `/blog/post1`.
    pub route: &'a str,
    pub title: &'a str,
    /// Serialized markdown body.
    pub body: &'a str,
    pub frontmatter: &'a Frontmatter,
    pub headings: &'a [Heading],
    pub routes: &'a RouteTable,
}

pub trait Layout: Send + Sync {
    fn name(&self) -> &str;
    fn render(&self, ctx: &LayoutContext<'_>) -> String;
}

/// Named layouts plus the site-wide default.
#[derive(Clone)]
pub struct LayoutRegistry {
    layouts: FxHashMap<String, Arc<dyn Layout>>,
    default: Arc<dyn Layout>,
    root: PathBuf,
}

impl LayoutRegistry {
    /// Registry with the built-in layouts. Template paths resolve against `root`.
    pub fn new(root: &Path) -> Self {
        let default: Arc<dyn Layout> = Arc::new(DefaultLayout);
        let mut registry = Self {
            layouts: FxHashMap::default(),
            default: Arc::clone(&default),
            root: root.to_path_buf(),
        };
        registry.register(default);
        registry.register(Arc::new(DebugLayout));
        registry
    }

    /// Registry whose default is `reference`, falling back to the built-in
    /// default with a warning when it cannot be resolved.
    pub fn with_default(root: &Path, reference: Option<&str>) -> Self {
        let mut registry = Self::new(root);
        if let Some(reference) = reference {
            match registry.lookup(reference) {
                Ok(layout) => registry.default = layout,
                Err(e) => log!("warn"; "{e}, using `{DEFAULT_LAYOUT}` layout"),
            }
        }
        registry
    }

    pub fn register(&mut self, layout: Arc<dyn Layout>) {
        self.layouts.insert(layout.name().to_string(), layout);
    }

    /// Whether `name` is a registered layout rather than a template path.
    pub fn is_registered(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    #[cfg(test)]
    pub fn default_layout(&self) -> &Arc<dyn Layout> {
        &self.default
    }

    /// Resolve a registered name or a template path.
    pub fn lookup(&self, reference: &str) -> Result<Arc<dyn Layout>, LayoutError> {
        if let Some(layout) = self.layouts.get(reference) {
            return Ok(Arc::clone(layout));
        }

        let path = self.template_path(reference);
        if !path.is_file() {
            return Err(LayoutError::NotFound(reference.to_string()));
        }
        let layout = TemplateLayout::load(&path)?;
        Ok(Arc::new(layout))
    }

    /// Resolve a per-page reference. Failures are logged and never fatal.
    pub fn resolve(&self, reference: Option<&str>) -> Arc<dyn Layout> {
        let Some(reference) = reference else {
            return Arc::clone(&self.default);
        };
        self.lookup(reference).unwrap_or_else(|e| {
            log!("warn"; "{e}, using `{}` layout", self.default.name());
            Arc::clone(&self.default)
        })
    }

    /// Where a non-registered reference is looked up on disk.
    pub fn template_path(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }
}

/// `<ul>` of every route, linked with `.html`. `current` gets `aria-current`.
pub fn nav_html(routes: &RouteTable, current: &str) -> String {
    use crate::utils::html::{escape, escape_attr};

    let mut out = String::from("<ul>");
    for route in routes.sorted() {
        let aria = if route == current {
            " aria-current=\"page\""
        } else {
            ""
        };
        out.push_str(&format!(
            "<li><a href=\"{}.html\"{aria}>{}</a></li>",
            escape_attr(route),
            escape(route)
        ));
    }
    out.push_str("</ul>");
    out
}

/// `<ul>` table of contents of in-page anchors.
pub fn toc_html(headings: &[Heading]) -> String {
    use crate::utils::html::{escape, escape_attr};

    if headings.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul class=\"toc\">");
    for h in headings {
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a></li>",
            escape_attr(&h.slug),
            escape(&h.text)
        ));
    }
    out.push_str("</ul>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_names() {
        let registry = LayoutRegistry::new(Path::new("/nowhere"));
        assert_eq!(registry.resolve(None).name(), "default");
        assert_eq!(registry.resolve(Some("debug")).name(), "debug");
    }

    #[test]
    fn test_missing_layout_falls_back() {
        let registry = LayoutRegistry::new(Path::new("/nowhere"));
        assert!(matches!(
            registry.lookup("./missing.layout"),
            Err(LayoutError::NotFound(_))
        ));
        assert_eq!(registry.resolve(Some("./missing.layout")).name(), "default");
    }

    #[test]
    fn test_template_file_resolves() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("post.html"), "<main>{{body}}</main>").unwrap();
        let registry = LayoutRegistry::new(dir.path());
        assert_eq!(registry.resolve(Some("post.html")).name(), "post.html");
    }

    #[test]
    fn test_with_default_unresolvable_keeps_builtin() {
        let registry = LayoutRegistry::with_default(Path::new("/nowhere"), Some("fancy"));
        assert_eq!(registry.default_layout().name(), "default");
        let registry = LayoutRegistry::with_default(Path::new("/nowhere"), Some("debug"));
        assert_eq!(registry.resolve(None).name(), "debug");
    }

    #[test]
    fn test_nav_and_toc() {
        use crate::page::route::RouteEntry;
        let routes = RouteTable::from_entries(vec![
            RouteEntry { route: "/b".into(), source: "b.md".into() },
            RouteEntry { route: "/a".into(), source: "a.md".into() },
        ]);
        assert_eq!(
            nav_html(&routes, "/b"),
            "<ul><li><a href=\"/a.html\">/a</a></li><li><a href=\"/b.html\" aria-current=\"page\">/b</a></li></ul>"
        );
        let headings = [Heading { slug: "x".into(), text: "X & Y".into() }];
        assert_eq!(toc_html(&headings), "<ul class=\"toc\"><li><a href=\"#x\">X &amp; Y</a></li></ul>");
        assert_eq!(toc_html(&[]), "");
    }
}
