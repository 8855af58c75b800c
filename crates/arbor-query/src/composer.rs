//! Configuration-aware node factory

use crate::error::ComposeResult;
use crate::guard::ensure_identifier;
use crate::node::{DocumentSpec, QueryNode, TraversalSpec};
use crate::render::{AqlRenderer, PreparedQuery};
use arbor_config::ArborConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Builds nodes that share one validated configuration.
///
/// Every configured alias, result field and name prefix ends up in query
/// text, so all of them are checked against the identifier pattern up
/// front rather than on the first `prepare()`.
#[derive(Debug, Clone)]
pub struct Composer {
    config: Arc<ArborConfig>,
    renderer: AqlRenderer,
}

impl Default for Composer {
    fn default() -> Self {
        let config = ArborConfig::default();
        Self {
            renderer: AqlRenderer::from_config(&config.render),
            config: Arc::new(config),
        }
    }
}

impl Composer {
    pub fn new(config: ArborConfig) -> ComposeResult<Self> {
        config.validate()?;

        ensure_identifier(&config.aliases.document)?;
        ensure_identifier(&config.aliases.traversal)?;
        ensure_identifier(&config.result.total_field)?;
        ensure_identifier(&config.result.items_field)?;
        for (_, prefix) in config.naming.entries() {
            ensure_identifier(prefix)?;
        }

        debug!(
            document_alias = %config.aliases.document,
            traversal_alias = %config.aliases.traversal,
            pretty = config.render.pretty,
            "Created composer"
        );

        Ok(Self {
            renderer: AqlRenderer::from_config(&config.render),
            config: Arc::new(config),
        })
    }

    /// Load configuration from a `.toml` or `.json` file
    pub fn from_path(path: impl AsRef<Path>) -> ComposeResult<Self> {
        Self::new(ArborConfig::load(path)?)
    }

    pub fn config(&self) -> &ArborConfig {
        &self.config
    }

    pub fn renderer(&self) -> &AqlRenderer {
        &self.renderer
    }

    pub fn document(&self, spec: DocumentSpec) -> QueryNode {
        QueryNode::document_with_config(spec, Arc::clone(&self.config))
    }

    pub fn traversal(&self, spec: TraversalSpec) -> QueryNode {
        QueryNode::traversal_with_config(spec, Arc::clone(&self.config))
    }

    /// Prepare `node` with this composer's layout
    pub fn prepare(&self, node: &mut QueryNode) -> ComposeResult<PreparedQuery> {
        node.prepare_with(&self.renderer)
    }
}
