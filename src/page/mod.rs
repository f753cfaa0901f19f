//! Content pipeline for one markdown document.
//!
//! ```text
//! read → frontmatter::extract → pulldown-cmark → rewrite::rewrite
//!      → layout::resolve → Layout::render → script::bundle → write
//! ```
//!
//! Every stage is a plain function over owned or borrowed data; the only
//! shared state is the [`RouteTable`] snapshot passed in by the caller.

pub mod frontmatter;
pub mod layout;
pub mod render;
pub mod rewrite;
pub mod route;
pub mod script;
pub mod slug;

use std::path::PathBuf;

use thiserror::Error;

pub use frontmatter::Frontmatter;
pub use render::{BuildMode, RenderContext, write_page};
pub use rewrite::Heading;
pub use route::RouteTable;

/// A JSON object map for storing arbitrary metadata fields.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Failure rendering a single document. Never fatal for the whole site.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to read `{path}`")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid frontmatter in `{path}`")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: frontmatter::FrontmatterError,
    },

    #[error("`{path}` is not inside the source directory")]
    OutsideSource { path: PathBuf },

    #[error("failed to write `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("script bundling failed for `{page}`")]
    Bundle {
        page: PathBuf,
        #[source]
        source: script::BundleError,
    },
}

impl PageError {
    /// The file this error is about, for log context.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::SourceRead { path, .. }
            | Self::Frontmatter { path, .. }
            | Self::OutsideSource { path }
            | Self::Write { path, .. } => path,
            Self::Bundle { page, .. } => page,
        }
    }
}
