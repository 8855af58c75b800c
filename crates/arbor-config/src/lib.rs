//! # Arbor Configuration Library
//!
//! Type-safe configuration for the arbor query composer: default row
//! aliases, traversal defaults, the shape of counted results, rendering
//! layout, and the prefixes used for generated bind-parameter names.
//!
//! Every section has sensible defaults, so an empty file is a valid
//! configuration.
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_config::ArborConfig;
//!
//! let config = ArborConfig::from_toml_str(r#"
//!     [aliases]
//!     document = "row"
//!
//!     [render]
//!     pretty = false
//! "#).unwrap();
//!
//! assert_eq!(config.aliases.document, "row");
//! assert_eq!(config.aliases.traversal, "vertex");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod components;
mod loader;

pub use components::*;
pub use loader::*;

use serde::{Deserialize, Serialize};

/// Top-level configuration for query composition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArborConfig {
    /// Default row aliases per node kind
    #[serde(default)]
    pub aliases: AliasConfig,

    /// Defaults applied to traversal nodes
    #[serde(default)]
    pub traversal: TraversalDefaults,

    /// Field names of the `{ total, items }` pair returned by counted queries
    #[serde(default)]
    pub result: ResultShapeConfig,

    /// Layout of rendered query text
    #[serde(default)]
    pub render: RenderConfig,

    /// Prefixes for generated bind-parameter and variable names
    #[serde(default)]
    pub naming: NamingConfig,
}

impl ArborConfig {
    /// Check structural constraints that serde cannot express.
    ///
    /// Identifier safety of aliases and prefixes is enforced by the query
    /// crate when the configuration is turned into a composer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.traversal.depth == 0 {
            return Err(ConfigError::Invalid(
                "traversal.depth must be at least 1".to_string(),
            ));
        }

        let named = [
            ("aliases.document", &self.aliases.document),
            ("aliases.traversal", &self.aliases.traversal),
            ("result.total_field", &self.result.total_field),
            ("result.items_field", &self.result.items_field),
        ];
        for (key, value) in named.into_iter().chain(self.naming.entries()) {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
        }

        if self.result.total_field == self.result.items_field {
            return Err(ConfigError::Invalid(
                "result.total_field and result.items_field must differ".to_string(),
            ));
        }

        Ok(())
    }
}
