//! Actor System for Live Reload
//!
//! Message-passing concurrency for `dev` mode:
//!
//! ```text
//! FsActor --> CompilerActor --> WsActor
//! (watch)      (rebuild)      (broadcast)
//! ```
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `compiler` - Change classification and incremental rebuilds
//! - `ws` - Refresh broadcast to live reload subscribers
//! - `coordinator` - Wires up and runs actors

pub mod compiler;
pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
