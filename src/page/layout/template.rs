//! User-supplied HTML template layouts.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::{Frontmatter, Layout, LayoutContext, LayoutError, nav_html, toc_html};
use crate::utils::html::escape;

/// An HTML file with `{{title}}`, `{{date}}`, `{{nav}}`, `{{toc}}`,
/// `{{route}}` and `{{body}}` placeholders, plus `{{meta.KEY}}` for any other
/// frontmatter key.
///
/// `title`, `date`, `route` and `meta.*` are escaped; the others are
/// inserted as markup. Unset `date` and `meta.*` values render empty.
/// `{{body}}` is substituted last so page content is never re-scanned for
/// placeholders.
#[derive(Debug, Clone)]
pub struct TemplateLayout {
    name: String,
    content: String,
}

impl TemplateLayout {
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let content = fs::read_to_string(path).map_err(|source| LayoutError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(name, content))
    }

    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

impl Layout for TemplateLayout {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, ctx: &LayoutContext<'_>) -> String {
        let fm = ctx.frontmatter;
        let mut html = self
            .content
            .replace("{{title}}", &escape(ctx.title))
            .replace("{{date}}", &escape(fm.date.as_deref().unwrap_or_default()))
            .replace("{{route}}", &escape(ctx.route))
            .replace("{{nav}}", &nav_html(ctx.routes, ctx.route))
            .replace("{{toc}}", &toc_html(ctx.headings));
        html = fill_meta(&html, fm);
        html.replace("{{body}}", ctx.body)
    }
}

/// Replace every `{{meta.KEY}}` with the escaped frontmatter value.
fn fill_meta(template: &str, fm: &Frontmatter) -> String {
    const OPEN: &str = "{{meta.";

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        let value = match fm.extra.get(&after[..end]) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        out.push_str(&escape(&value));
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}
