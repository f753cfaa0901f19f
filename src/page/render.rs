//! Single-document rendering.

use std::fs;
use std::path::{Path, PathBuf};

use pulldown_cmark::{Options, Parser, html};

use super::frontmatter::{self, Frontmatter};
use super::layout::{LayoutContext, LayoutRegistry};
use super::rewrite::{Heading, rewrite};
use super::route::RouteTable;
use super::script::{Bundle, bundle};
use super::PageError;
use crate::config::SiteConfig;
use crate::logger::log;
use crate::reload::HMR_CLIENT_PATH;
use crate::utils::html::inject_into_head;
use crate::utils::path::route_of;

/// Whether rendered pages carry the live-reload client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Production,
    Development,
}

/// Shared, read-only inputs for rendering any page of one build.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub routes: &'a RouteTable,
    pub layouts: &'a LayoutRegistry,
    pub mode: BuildMode,
}

#[derive(Debug)]
pub struct RenderedPage {
    pub route: String,
    pub html: String,
    /// Bundled scripts, written alongside the page.
    pub assets: Vec<Bundle>,
    /// Token and layout dumps, only collected with `--debug`.
    pub trace: Vec<(&'static str, String)>,
}

/// Per-page debug dumps.
///
/// Kept together and printed after the page is done, so parallel renders
/// don't interleave their token streams.
struct Trace {
    enabled: bool,
    lines: Vec<(&'static str, String)>,
}

impl Trace {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, module: &'static str, line: impl FnOnce() -> String) {
        if self.enabled {
            self.lines.push((module, line()));
        }
    }
}

/// Markdown extensions enabled for every page.
pub fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// `{out_dir}{route}.html`
pub fn output_path(out_dir: &Path, route: &str) -> PathBuf {
    out_dir.join(format!("{}.html", route.trim_start_matches('/')))
}

/// Read, parse, rewrite and lay out the document at `source`.
pub fn render_page(ctx: &RenderContext<'_>, source: &Path) -> Result<RenderedPage, PageError> {
    let root = &ctx.config.src_dir;
    let route = route_of(root, source).ok_or_else(|| PageError::OutsideSource {
        path: source.to_path_buf(),
    })?;

    let text = fs::read_to_string(source).map_err(|e| PageError::SourceRead {
        path: source.to_path_buf(),
        source: e,
    })?;
    let (fm, body) = frontmatter::extract(&text).map_err(|e| PageError::Frontmatter {
        path: source.to_path_buf(),
        source: e,
    })?;

    let mut trace = Trace::new(ctx.config.debug);
    if !fm.is_empty() {
        trace.push("frontmatter", || format!("{route}: {fm:?}"));
    }

    let events: Vec<_> = Parser::new_ext(body, markdown_options()).collect();
    trace.push("rewrite", || format!("{route} tokens in: {events:?}"));
    let rewritten = rewrite(&route, events, ctx.routes);
    trace.push("rewrite", || format!("{route} tokens out: {:?}", rewritten.events));

    let mut body_html = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut body_html, rewritten.events.into_iter());
    let headings = rewritten.headings;

    let title = page_title(&fm, &headings, &route);
    let layout = ctx.layouts.resolve(fm.layout.as_deref());
    trace.push("layout", || format!("{route} -> {}", layout.name()));

    let mut html = layout.render(&LayoutContext {
        route: &route,
        title: &title,
        body: &body_html,
        frontmatter: &fm,
        headings: &headings,
        routes: ctx.routes,
    });

    let assets = fm
        .scripts
        .iter()
        .map(|reference| bundle(root, source, reference, ctx.config.build.minify))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PageError::Bundle {
            page: source.to_path_buf(),
            source: e,
        })?;

    let mut head = String::new();
    for asset in &assets {
        head.push_str(&asset.script_tag());
        head.push('\n');
    }
    if ctx.mode == BuildMode::Development {
        head.push_str(&format!("<script src=\"{HMR_CLIENT_PATH}\"></script>\n"));
    }
    if !head.is_empty() {
        inject_into_head(&mut html, &head);
    }

    Ok(RenderedPage {
        route,
        html,
        assets,
        trace: trace.lines,
    })
}

/// Render `source` and write the page plus its scripts under the output dir.
///
/// Returns the written page path.
pub fn write_page(ctx: &RenderContext<'_>, source: &Path) -> Result<PathBuf, PageError> {
    let page = render_page(ctx, source)?;
    for (module, line) in &page.trace {
        log(module, line);
    }
    let out_dir = ctx.config.output_dir();

    let path = output_path(out_dir, &page.route);
    write_file(&path, page.html.as_bytes())?;
    for asset in &page.assets {
        write_file(&out_dir.join(&asset.output), asset.code.as_bytes())?;
    }
    Ok(path)
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), PageError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    };
    write().map_err(|source| PageError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Frontmatter title, else the first heading, else the last route segment.
fn page_title(fm: &Frontmatter, headings: &[Heading], route: &str) -> String {
    fm.title
        .clone()
        .or_else(|| {
            headings
                .first()
                .map(|h| h.text.clone())
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| route.rsplit('/').next().unwrap_or(route).to_string())
}
