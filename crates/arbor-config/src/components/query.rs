//! Query node defaults: row aliases, traversal settings, counted result shape

use serde::{Deserialize, Serialize};

/// Default row alias per node kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasConfig {
    /// Alias bound to each row of a document node
    #[serde(default = "default_document_alias")]
    pub document: String,
    /// Alias bound to each vertex of a traversal node
    #[serde(default = "default_traversal_alias")]
    pub traversal: String,
}

fn default_document_alias() -> String {
    "doc".to_string()
}

fn default_traversal_alias() -> String {
    "vertex".to_string()
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            document: default_document_alias(),
            traversal: default_traversal_alias(),
        }
    }
}

/// Direction followed along edges during a traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalDirection {
    /// Follow edges from `_from` to `_to`
    Outbound,
    /// Follow edges from `_to` to `_from`
    Inbound,
    /// Follow edges either way
    #[default]
    Any,
}

/// Defaults applied to traversal nodes that do not override them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalDefaults {
    /// Maximum hop count (traversals always start at one hop)
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Edge direction
    #[serde(default)]
    pub direction: TraversalDirection,
}

fn default_depth() -> u32 {
    1
}

impl Default for TraversalDefaults {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            direction: TraversalDirection::Any,
        }
    }
}

/// Field names of the object returned by a node that requested a total count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultShapeConfig {
    /// Field holding the unpaged row count
    #[serde(default = "default_total_field")]
    pub total_field: String,
    /// Field holding the page of rows
    #[serde(default = "default_items_field")]
    pub items_field: String,
}

fn default_total_field() -> String {
    "total".to_string()
}

fn default_items_field() -> String {
    "items".to_string()
}

impl Default for ResultShapeConfig {
    fn default() -> Self {
        Self {
            total_field: default_total_field(),
            items_field: default_items_field(),
        }
    }
}
