//! Rendering layout configuration

use serde::{Deserialize, Serialize};

/// Controls how composed queries are laid out as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// One clause per line with nested subqueries indented; when false the
    /// whole query is rendered on a single line
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    /// Spaces per indentation level in pretty mode
    #[serde(default = "default_indent")]
    pub indent: usize,
}

fn default_pretty() -> bool {
    true
}

fn default_indent() -> usize {
    2
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
            indent: default_indent(),
        }
    }
}
