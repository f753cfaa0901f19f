//! Per-page script bundling.
//!
//! Scripts declared in frontmatter are ES modules next to the document. Each
//! one is parsed with oxc (a syntax error fails the page), optionally
//! minified, and emitted at its source-relative path with a `.js` extension.

use std::fs;
use std::path::{Path, PathBuf};

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use thiserror::Error;

use crate::utils::path::{normalize_path, route_of};

/// Extensions accepted as page scripts.
pub const SCRIPT_EXTS: &[&str] = &["js", "mjs"];

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read script `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported script type `{0}` (expected .js or .mjs)")]
    Unsupported(PathBuf),

    #[error("script `{0}` resolves outside the source directory")]
    OutsideSource(PathBuf),

    #[error("syntax error in `{path}`: {message}")]
    Parse { path: PathBuf, message: String },
}

/// A script ready to be written and referenced from its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Absolute site path, used as the `src` attribute.
    pub src: String,
    /// Output path relative to the output root.
    pub output: PathBuf,
    pub code: String,
}

impl Bundle {
    pub fn script_tag(&self) -> String {
        format!(
            "<script type=\"module\" src=\"{}\"></script>",
            crate::utils::html::escape_attr(&self.src)
        )
    }
}

/// Bundle the script `reference` declared by the document at `page`.
///
/// A reference starting with `/` is relative to `root`, anything else to
/// the document's directory.
pub fn bundle(root: &Path, page: &Path, reference: &str, minify: bool) -> Result<Bundle, BundleError> {
    let path = match reference.strip_prefix('/') {
        Some(rooted) => root.join(rooted),
        None => page.parent().unwrap_or(root).join(reference),
    };

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    if !ext.as_deref().is_some_and(|e| SCRIPT_EXTS.contains(&e)) {
        return Err(BundleError::Unsupported(path));
    }

    let source = fs::read_to_string(&path).map_err(|source| BundleError::Read {
        path: path.clone(),
        source,
    })?;

    let path = normalize_path(&path);
    let Some(route) = route_of(root, &path) else {
        return Err(BundleError::OutsideSource(path));
    };

    let code = compile(&path, &source, minify)?;
    let src = format!("{route}.js");
    let output = PathBuf::from(src.trim_start_matches('/'));
    Ok(Bundle { src, output, code })
}

/// Parse `source` as an ES module; return it as-is or minified.
fn compile(path: &Path, source: &str, minify: bool) -> Result<String, BundleError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(BundleError::Parse {
            path: path.to_path_buf(),
            message,
        });
    }
    if !minify {
        return Ok(source.to_string());
    }

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    Ok(Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code)
}
