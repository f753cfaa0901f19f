//! Built-in layouts.

use super::{DEFAULT_LAYOUT, Layout, LayoutContext, nav_html, toc_html};
use crate::utils::html::escape;

/// Title header, site navigation and the page body.
pub struct DefaultLayout;

/// [`DefaultLayout`] plus a footer with the page route, its anchors and
/// the page count.
pub struct DebugLayout;

impl Layout for DefaultLayout {
    fn name(&self) -> &str {
        DEFAULT_LAYOUT
    }

    fn render(&self, ctx: &LayoutContext<'_>) -> String {
        shell(ctx, "")
    }
}

impl Layout for DebugLayout {
    fn name(&self) -> &str {
        "debug"
    }

    fn render(&self, ctx: &LayoutContext<'_>) -> String {
        let mut footer = String::from("<footer class=\"debug\">");
        footer.push_str(&format!("<p>page: <code>{}</code></p>", escape(ctx.route)));
        footer.push_str("<ul>");
        for h in ctx.headings {
            footer.push_str(&format!(
                "<li><code>#{}</code> {}</li>",
                escape(&h.slug),
                escape(&h.text)
            ));
        }
        footer.push_str("</ul>");
        if !ctx.frontmatter.extra.is_empty() {
            footer.push_str("<dl>");
            for (key, value) in &ctx.frontmatter.extra {
                footer.push_str(&format!(
                    "<dt>{}</dt><dd><code>{}</code></dd>",
                    escape(key),
                    escape(&value.to_string())
                ));
            }
            footer.push_str("</dl>");
        }
        footer.push_str(&format!("<p>{} pages</p></footer>\n", ctx.routes.len()));
        shell(ctx, &footer)
    }
}

fn shell(ctx: &LayoutContext<'_>, footer: &str) -> String {
    let title = escape(ctx.title);
    let nav = nav_html(ctx.routes, ctx.route);
    let toc = toc_html(ctx.headings);
    let date = ctx
        .frontmatter
        .date
        .as_deref()
        .map(|d| format!("<time>{}</time>", escape(d)))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         </head>\n\
         <body>\n\
         <header><h1>{title}</h1>{date}<nav>{nav}</nav></header>\n\
         <main>\n{toc}{body}</main>\n\
         {footer}\
         </body>\n\
         </html>\n",
        body = ctx.body,
    )
}
