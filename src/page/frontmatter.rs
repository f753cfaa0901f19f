//! Metadata block extraction.
//!
//! A document may open with a `---` block of `key: value` lines or a `+++`
//! block of TOML. Both are flattened into the same [`Frontmatter`].

use serde_json::Value;
use thiserror::Error;

use super::JsonMap;

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("invalid TOML frontmatter: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Page metadata.
///
/// | Key      | Meaning                                        |
/// |----------|------------------------------------------------|
/// | `layout` | registered layout name or template path        |
/// | `title`  | page title, defaults to the route's file name  |
/// | `slug`   | informational; routes come from file paths     |
/// | `date`   | free-form date string                          |
/// | `script` | script(s) to bundle, alias `js`                |
///
/// Anything else lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub layout: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub date: Option<String>,
    pub scripts: Vec<String>,
    pub extra: JsonMap,
}

impl Frontmatter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Split recognised keys out of a raw map.
    fn from_map(map: JsonMap) -> Self {
        let mut fm = Self::default();
        for (key, value) in map {
            match key.to_ascii_lowercase().as_str() {
                "layout" => fm.layout = as_string(value),
                "title" => fm.title = as_string(value),
                "slug" => fm.slug = as_string(value),
                "date" => fm.date = as_string(value),
                "script" | "js" => fm.scripts.extend(as_string_list(value)),
                _ => {
                    fm.extra.insert(key, value);
                }
            }
        }
        fm
    }
}

fn as_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn as_string_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(as_string).collect(),
        other => as_string(other).into_iter().collect(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Fence {
    Yaml,
    Toml,
}

impl Fence {
    const fn marker(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split `text` into metadata and body.
///
/// Without an opening fence line and a matching closing fence line the
/// metadata is empty and the body is `text` unchanged.
pub fn extract(text: &str) -> Result<(Frontmatter, &str), FrontmatterError> {
    let Some((fence, block, body)) = split_block(text) else {
        return Ok((Frontmatter::default(), text));
    };

    let map = match fence {
        Fence::Yaml => parse_yaml_like(block),
        Fence::Toml => parse_toml(block)?,
    };
    Ok((Frontmatter::from_map(map), body))
}

fn split_block(text: &str) -> Option<(Fence, &str, &str)> {
    let (first, rest) = text.split_once('\n')?;
    let fence = match first.trim_end() {
        "---" => Fence::Yaml,
        "+++" => Fence::Toml,
        _ => return None,
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == fence.marker() {
            return Some((fence, &rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse `key: value` lines. Blank lines and `#` comments are skipped.
fn parse_yaml_like(block: &str) -> JsonMap {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), parse_yaml_value(value.trim())))
        .collect()
}

/// Scalars, `[a, b]` inline lists and quoted strings.
fn parse_yaml_value(s: &str) -> Value {
    if let Some(inner) = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return Value::Array(
            inner
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(parse_yaml_value)
                .collect(),
        );
    }
    if let Some(unquoted) = strip_quotes(s) {
        return Value::String(unquoted.to_string());
    }
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if s.is_empty() || s.eq_ignore_ascii_case("null") || s == "~" {
        return Value::Null;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(f) = s.parse::<f64>()
        && let Some(n) = serde_json::Number::from_f64(f)
    {
        return Value::Number(n);
    }
    Value::String(s.to_string())
}

fn strip_quotes(s: &str) -> Option<&str> {
    ['"', '\'']
        .into_iter()
        .find_map(|q| s.strip_prefix(q).and_then(|s| s.strip_suffix(q)))
}

fn parse_toml(block: &str) -> Result<JsonMap, FrontmatterError> {
    let table: toml::Table = toml::from_str(block)?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect())
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_frontmatter_returns_text_verbatim() {
        let text = "# Just content\n\n---\nnot: meta\n";
        let (fm, body) = extract(text).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, text);
    }

    #[test]
    fn test_unclosed_fence_is_body() {
        let text = "---\ntitle: Oops\n# Heading\n";
        let (fm, body) = extract(text).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, text);
    }

    #[test]
    fn test_yaml_frontmatter() {
        let text = "---\ntitle: Hello: World\nlayout: debug\njs: custom.js\ndraft: true\n---\n# Body\n";
        let (fm, body) = extract(text).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello: World"));
        assert_eq!(fm.layout.as_deref(), Some("debug"));
        assert_eq!(fm.scripts, vec!["custom.js"]);
        assert_eq!(fm.extra.get("draft"), Some(&serde_json::json!(true)));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_yaml_lists_and_quotes() {
        let text = "---\nscript: [a.js, 'b.mjs']\ntitle: \"42\"\ncount: 3\n---\n";
        let (fm, body) = extract(text).unwrap();
        assert_eq!(fm.scripts, vec!["a.js", "b.mjs"]);
        assert_eq!(fm.title.as_deref(), Some("42"));
        assert_eq!(fm.extra.get("count"), Some(&serde_json::json!(3)));
        assert_eq!(body, "");
    }

    #[test]
    fn test_toml_frontmatter() {
        let text = "+++\ntitle = \"Hello\"\ndate = 2024-01-01\nscript = [\"x.js\"]\ntags = [\"a\"]\n+++\nBody";
        let (fm, body) = extract(text).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-01"));
        assert_eq!(fm.scripts, vec!["x.js"]);
        assert_eq!(fm.extra.get("tags"), Some(&serde_json::json!(["a"])));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(extract("+++\ntitle = \n+++\n").is_err());
    }
}
