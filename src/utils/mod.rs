//! Shared helpers: HTML escaping, MIME detection, path and URL handling.

pub mod html;
pub mod mime;
pub mod path;
