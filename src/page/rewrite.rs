//! Token stream rewriting: intra-site links and heading anchors.
//!
//! One forward pass over the pulldown-cmark events. Link destinations that
//! name a known route get `.html` appended; the tags of every well-formed
//! heading span are replaced by `Html` events carrying an `id` and a
//! self-link. The heading's own content stays in the stream, so footnote
//! references inside it are numbered with the rest of the page.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Tag, TagEnd};

use super::route::RouteTable;
use super::slug::slugify;
use crate::utils::html::{escape, escape_attr};
use crate::utils::path::url::split_path_suffix;

/// A heading found while rewriting, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub slug: String,
    pub text: String,
}

#[derive(Debug)]
pub struct Rewritten<'a> {
    pub events: Vec<Event<'a>>,
    pub headings: Vec<Heading>,
}

/// Rewrite `events` for the page at route `page`.
///
/// Never fails: a heading start without a matching end is passed through
/// untouched and contributes no [`Heading`].
pub fn rewrite<'a>(page: &str, events: Vec<Event<'a>>, routes: &RouteTable) -> Rewritten<'a> {
    let mut out = Vec::with_capacity(events.len());
    let mut headings = Vec::new();
    let mut iter = events.into_iter().map(|e| rewrite_link(e, routes));

    while let Some(event) = iter.next() {
        let Event::Start(Tag::Heading { level, id, classes, .. }) = &event else {
            out.push(event);
            continue;
        };
        let (level, id, classes) = (*level, id.clone(), classes.clone());

        let mut inner = Vec::new();
        let mut closed = false;
        for next in iter.by_ref() {
            if matches!(next, Event::End(TagEnd::Heading(_))) {
                closed = true;
                break;
            }
            inner.push(next);
        }

        if !closed {
            out.push(event);
            out.extend(inner);
            break;
        }

        let text = heading_text(&inner);
        let slug = id.map_or_else(|| slugify(&text), |id| id.to_string());
        out.push(Event::Html(heading_open(page, level, &slug, &classes).into()));
        out.extend(inner);
        out.push(Event::Html(format!("</{level}>\n").into()));
        headings.push(Heading { slug, text });
    }

    Rewritten { events: out, headings }
}

/// Insert `.html` into `url` when its path portion is a known route.
///
/// `/page?x=1` becomes `/page.html?x=1`, `/a#b` becomes `/a.html#b`.
pub fn add_ext(url: &str, routes: &RouteTable) -> Option<String> {
    let (path, suffix) = split_path_suffix(url);
    routes.contains(path).then(|| format!("{path}.html{suffix}"))
}

fn rewrite_link<'a>(event: Event<'a>, routes: &RouteTable) -> Event<'a> {
    match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = add_ext(&dest_url, routes).map_or(dest_url, CowStr::from);
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        other => other,
    }
}

/// Concatenated `Text` and inline `Code` content.
fn heading_text(events: &[Event<'_>]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
            _ => None,
        })
        .collect()
}

fn heading_open(page: &str, level: HeadingLevel, slug: &str, classes: &[CowStr<'_>]) -> String {
    let class_attr = if classes.is_empty() {
        String::new()
    } else {
        let joined: Vec<&str> = classes.iter().map(AsRef::as_ref).collect();
        format!(" class=\"{}\"", escape_attr(&joined.join(" ")))
    };
    let slug = escape_attr(slug);
    let page = escape(page);

    format!(
        "<{level} id=\"{slug}\"{class_attr}><a class=\"anchor\" href=\"{page}.html#{slug}\">#</a>"
    )
}
