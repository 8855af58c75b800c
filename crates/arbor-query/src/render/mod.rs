//! Target renderers for composed queries.
//!
//! Renderers convert the clause IR into query text. Bind parameters are
//! collected during composition, so rendering cannot fail.

mod aql;

pub use aql::AqlRenderer;

use crate::ir::ComposedQuery;
use crate::params::BindVars;
use serde::{Deserialize, Serialize};

/// Output of `prepare()`: query text plus the parameters it references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedQuery {
    /// The generated query string
    pub query: String,
    /// Parameters to bind to the query
    #[serde(rename = "bindVars")]
    pub bind_vars: BindVars,
}

/// Trait for rendering composed queries to text.
pub trait QueryRenderer: Send + Sync {
    /// Unique name for this renderer
    fn name(&self) -> &str;

    /// Render the IR to a query string
    fn render(&self, query: &ComposedQuery) -> String;
}
