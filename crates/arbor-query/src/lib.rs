//! # Arbor Query
//!
//! Composable AQL query trees. Each [`QueryNode`] is a document scan or a
//! graph traversal; child nodes become `LET` subqueries merged into the
//! parent's returned row. Preparing the root yields one query string and
//! one bind-parameter map, with generated names unique across the tree.
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_query::{DocumentSpec, FilterSpec, QueryNode, QueryOptions, SortSpec, TraversalSpec};
//!
//! let mut root = QueryNode::document(DocumentSpec::new("manifest").with_options(
//!     QueryOptions::new()
//!         .filter(FilterSpec::new().eq("name", "arbor"))
//!         .sort(SortSpec::desc("createdAt"))
//!         .limit(0, 10),
//! ));
//! root.add_child("owners", QueryNode::traversal(TraversalSpec::new(["owns"])))
//!     .unwrap();
//!
//! let prepared = root.prepare().unwrap();
//! assert!(prepared.query.starts_with("FOR doc IN @@collection_1"));
//! assert_eq!(prepared.bind_vars["@collection_1"], "manifest");
//! ```
//!
//! ## Safety
//!
//! Values, collection names and attribute paths are always bind parameters.
//! Aliases, child field names and generated names are spliced into the
//! text and must match `^[A-Za-z][A-Za-z0-9\-_]*$`.

#![warn(clippy::all)]

pub mod composer;
pub mod error;
pub mod execute;
pub mod filter;
pub mod guard;
pub mod ir;
pub mod node;
pub mod params;
pub mod render;
pub mod tick;

pub use composer::Composer;
pub use error::{ComposeError, ComposeResult, ExecutionError};
pub use execute::{fetch_all, fetch_first, ExecutionOptions, QueryExecutor};
pub use filter::{FilterEntry, FilterSpec, LeafFilter, Operator};
pub use ir::Direction;
pub use node::{
    DocumentSpec, LimitSpec, QueryNode, QueryOptions, Selector, SortDirection, SortSpec,
    TraversalSpec,
};
pub use params::BindVars;
pub use render::{AqlRenderer, PreparedQuery, QueryRenderer};
