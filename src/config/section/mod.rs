//! Configuration section definitions for `dess.toml`.

mod build;
mod serve;

pub use build::BuildConfig;
pub use serve::ServeConfig;
