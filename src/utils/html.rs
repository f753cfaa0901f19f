//! HTML escaping and small markup splicing helpers.

use std::borrow::Cow;

const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text content.
///
/// Borrows when nothing needs escaping.
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape an attribute value. Same character set as [`escape`].
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape(s)
}

/// Insert `snippet` right before the first `</head>`, or prepend it when the
/// document has no head.
pub fn inject_into_head(html: &mut String, snippet: &str) {
    match find_ascii_ci(html, "</head>") {
        Some(pos) => html.insert_str(pos, snippet),
        None => html.insert_str(0, snippet),
    }
}

/// Byte offset of `needle` in `haystack`, ignoring ASCII case.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>Tom & \"Jerry\"</b>"), "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;");
        assert!(matches!(escape("plain"), Cow::Borrowed(_)));
        assert_eq!(escape_attr("it's"), "it&#39;s");
    }

    #[test]
    fn test_inject_into_head() {
        let mut html = String::from("<html><HEAD><title>t</title></HEAD><body></body></html>");
        inject_into_head(&mut html, "<script></script>");
        assert_eq!(
            html,
            "<html><HEAD><title>t</title><script></script></HEAD><body></body></html>"
        );
    }

    #[test]
    fn test_inject_without_head_prepends() {
        let mut html = String::from("<p>hi</p>");
        inject_into_head(&mut html, "<script></script>");
        assert_eq!(html, "<script></script><p>hi</p>");
    }
}
