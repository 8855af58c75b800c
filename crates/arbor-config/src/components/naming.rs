//! Prefixes for generated names
//!
//! Every generated bind parameter or variable is `<prefix>_<tick>`. The
//! prefixes are written verbatim into query text, so the query crate runs
//! each of them through its identifier guard before use.

use serde::{Deserialize, Serialize};

/// Base names for generated bind parameters and variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Array-valued dot-path of a filter leaf
    pub filter_path: String,
    /// Comparison value of a filter leaf
    pub filter_value: String,
    /// Array-valued dot-path of the sort field
    pub sort_path: String,
    /// Sort direction literal
    pub sort_direction: String,
    /// Limit offset
    pub offset: String,
    /// Limit count
    pub limit: String,
    /// Collection iterated by a document node
    pub collection: String,
    /// Edge collection walked by a traversal
    pub edge: String,
    /// Explicit traversal start vertex
    pub start_vertex: String,
    /// Collection named in the upfront `WITH` declaration
    pub with: String,
    /// Variable holding a child subquery
    pub child: String,
    /// Variable holding the count subquery of a counted node
    pub count: String,
    /// `COLLECT WITH COUNT INTO` target
    pub length: String,
    /// Variable holding the row subquery of a counted node
    pub rows: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            filter_path: "filterPath".to_string(),
            filter_value: "filterValue".to_string(),
            sort_path: "sortPath".to_string(),
            sort_direction: "sortDirection".to_string(),
            offset: "offset".to_string(),
            limit: "limit".to_string(),
            collection: "collection".to_string(),
            edge: "edge".to_string(),
            start_vertex: "startVertex".to_string(),
            with: "with".to_string(),
            child: "child".to_string(),
            count: "count".to_string(),
            length: "length".to_string(),
            rows: "rows".to_string(),
        }
    }
}

impl NamingConfig {
    /// Every prefix paired with its configuration key
    pub fn entries(&self) -> Vec<(&'static str, &String)> {
        vec![
            ("naming.filter_path", &self.filter_path),
            ("naming.filter_value", &self.filter_value),
            ("naming.sort_path", &self.sort_path),
            ("naming.sort_direction", &self.sort_direction),
            ("naming.offset", &self.offset),
            ("naming.limit", &self.limit),
            ("naming.collection", &self.collection),
            ("naming.edge", &self.edge),
            ("naming.start_vertex", &self.start_vertex),
            ("naming.with", &self.with),
            ("naming.child", &self.child),
            ("naming.count", &self.count),
            ("naming.length", &self.length),
            ("naming.rows", &self.rows),
        ]
    }
}
