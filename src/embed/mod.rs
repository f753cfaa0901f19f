//! Embedded static resources for the development server.
//!
//! ```ignore
//! use embed::serve::{HMR_JS, HmrVars};
//!
//! let js = HMR_JS.render(&HmrVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};
    use crate::utils::html::escape;

    /// Variables for hmr.js.
    pub struct HmrVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HmrVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__DESS_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Variables for not_found.html.
    pub struct NotFoundVars {
        pub path: String,
    }

    impl TemplateVars for NotFoundVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__PATH__", &escape(&self.path))
        }
    }

    /// Variables for error.html.
    pub struct ErrorVars {
        pub path: String,
        pub message: String,
    }

    impl TemplateVars for ErrorVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__PATH__", &escape(&self.path))
                .replace("__MESSAGE__", &escape(&self.message))
        }
    }

    /// Live reload client with WebSocket port injection.
    pub const HMR_JS: Template<HmrVars> = Template::new(include_str!("serve/hmr.js"));

    /// Fallback page for unknown paths.
    pub const NOT_FOUND_HTML: Template<NotFoundVars> =
        Template::new(include_str!("serve/not_found.html"));

    /// Page for requests that failed on the server side.
    pub const ERROR_HTML: Template<ErrorVars> =
        Template::new(include_str!("serve/error.html"));
}
