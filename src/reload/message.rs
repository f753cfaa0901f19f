//! Hot reload message protocol.
//!
//! JSON objects tagged by `type`. The client only understands `refresh`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Reload the page.
    Refresh,
}

impl HotReloadMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"refresh"}"#.to_string())
    }

    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_wire_format() {
        assert_eq!(HotReloadMessage::Refresh.to_json(), r#"{"type":"refresh"}"#);
        assert_eq!(
            HotReloadMessage::from_json(r#"{"type":"refresh"}"#),
            Some(HotReloadMessage::Refresh)
        );
        assert_eq!(HotReloadMessage::from_json(r#"{"type":"patch"}"#), None);
    }
}
