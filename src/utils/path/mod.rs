//! Path and URL utilities.
//!
//! - [`fs`]: filesystem path normalization and route conversion
//! - [`url`]: splitting links at their query or fragment

pub mod fs;
pub mod url;

pub use fs::{is_hidden, normalize_path, route_of};
