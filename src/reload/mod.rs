//! Live reload for development.
//!
//! ```text
//! Browser --GET /hmr.js--> HTTP server (client script)
//! Browser --ws://host:ws_port/hmr--> acceptor thread --> WsActor --> LiveReload
//! Browser --ws://host:port/hmr--> HTTP server upgrade --> WsActor
//! CompilerActor --Refresh--> WsActor --{"type":"refresh"}--> every subscriber
//! ```
//!
//! - `channel` - the subscriber set ([`LiveReload`]) and the [`Connection`] seam
//! - `message` - wire messages
//! - `server` - WebSocket listener and the HTTP upgrade

pub mod channel;
pub mod message;
pub mod server;

pub use channel::{Connection, LiveReload};
pub use message::HotReloadMessage;

/// Path the HTTP server serves the client script at.
pub const HMR_CLIENT_PATH: &str = "/hmr.js";

/// Upgrade path on both the WebSocket listener and the dev HTTP server.
pub const HMR_SOCKET_PATH: &str = "/hmr";
