//! Actor Message Definitions
//!
//! ```text
//! FsActor --Changes--> CompilerActor --Refresh--> WsActor
//!                                                   ^
//!                       ws acceptor --AddClient-----+
//! ```

use std::path::PathBuf;

use crate::reload::Connection;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Messages to CompilerActor
#[derive(Debug)]
pub enum CompilerMsg {
    /// One debounced batch of file changes, deduplicated per path.
    Changes(Vec<(PathBuf, ChangeKind)>),
    Shutdown,
}

/// Messages to WsActor
pub enum WsMsg {
    /// Tell every subscriber to reload.
    Refresh,
    /// A connection that completed the `/hmr` handshake.
    AddClient(Box<dyn Connection>),
    Shutdown,
}

impl std::fmt::Debug for WsMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Refresh => f.write_str("Refresh"),
            Self::AddClient(_) => f.write_str("AddClient(..)"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}
