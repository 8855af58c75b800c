//! Execution abstraction for prepared queries
//!
//! The composer never talks to a database. Callers hand a
//! [`QueryExecutor`] to [`fetch_all`] or [`fetch_first`], which prepare the
//! node, run the query, and decode rows.
//!
//! ## Implementations
//!
//! Drivers live outside this crate. A driver maps [`PreparedQuery::query`]
//! and [`PreparedQuery::bind_vars`] onto its cursor API and reports failures
//! as [`ExecutionError`].

use crate::error::{ComposeResult, ExecutionError};
use crate::node::QueryNode;
use crate::render::PreparedQuery;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Cursor options forwarded to the driver. Unset fields use the server default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    /// Ask the server for the total result count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,
    /// Cursor time-to-live in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    /// Count rows ignoring the outermost `LIMIT`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_count: Option<bool>,
    /// Abort the query after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_runtime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,
}

impl ExecutionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn full_count(mut self) -> Self {
        self.full_count = Some(true);
        self
    }
}

/// Runs prepared queries against a database
pub trait QueryExecutor {
    /// Rows are pulled lazily; each pull may fail
    type Cursor: Iterator<Item = Result<Value, ExecutionError>>;

    fn execute(
        &self,
        query: &PreparedQuery,
        options: Option<&ExecutionOptions>,
    ) -> Result<Self::Cursor, ExecutionError>;
}

/// Prepare `node`, run it, and decode every row
pub fn fetch_all<E, T>(
    executor: &E,
    node: &mut QueryNode,
    options: Option<&ExecutionOptions>,
) -> ComposeResult<Vec<T>>
where
    E: QueryExecutor + ?Sized,
    T: DeserializeOwned,
{
    let cursor = run(executor, node, options)?;

    let mut rows = Vec::new();
    for row in cursor {
        rows.push(serde_json::from_value(row?)?);
    }
    Ok(rows)
}

/// Prepare `node`, run it, and decode the first row only.
///
/// Counted nodes return a single `{ total, items }` document, so this is
/// the usual way to read them.
pub fn fetch_first<E, T>(
    executor: &E,
    node: &mut QueryNode,
    options: Option<&ExecutionOptions>,
) -> ComposeResult<Option<T>>
where
    E: QueryExecutor + ?Sized,
    T: DeserializeOwned,
{
    let mut cursor = run(executor, node, options)?;

    match cursor.next() {
        Some(row) => Ok(Some(serde_json::from_value(row?)?)),
        None => Ok(None),
    }
}

fn run<E>(
    executor: &E,
    node: &mut QueryNode,
    options: Option<&ExecutionOptions>,
) -> ComposeResult<E::Cursor>
where
    E: QueryExecutor + ?Sized,
{
    let prepared = node.prepare()?;

    debug!(
        alias = node.alias(),
        kind = node.kind(),
        params = prepared.bind_vars.len(),
        "Executing query"
    );

    Ok(executor.execute(&prepared, options)?)
}
