//! Clause-level intermediate representation.
//!
//! Query nodes build these structures during composition; text is produced
//! only by a [`QueryRenderer`](crate::render::QueryRenderer). Keeping the
//! clauses structured lets the bind-parameter references of a composed
//! query be inspected without matching on rendered text.

use crate::filter::Operator;
use arbor_config::TraversalDirection;
use std::collections::BTreeSet;

/// Reference to a bind parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bind {
    /// Value parameter: `@name` in text, `name` in the bind map
    Value(String),
    /// Collection parameter: `@@name` in text, `@name` in the bind map
    Collection(String),
}

impl Bind {
    /// Generated name without any `@` prefix
    pub fn name(&self) -> &str {
        match self {
            Self::Value(name) | Self::Collection(name) => name,
        }
    }

    /// Placeholder as written in query text
    pub fn placeholder(&self) -> String {
        match self {
            Self::Value(name) => format!("@{}", name),
            Self::Collection(name) => format!("@@{}", name),
        }
    }

    /// Key under which the value is stored in the bind map
    pub fn key(&self) -> String {
        match self {
            Self::Value(name) => name.clone(),
            Self::Collection(name) => format!("@{}", name),
        }
    }
}

/// Traversal direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    Outbound,
    Inbound,
    #[default]
    Any,
}

impl Direction {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Outbound => "OUTBOUND",
            Self::Inbound => "INBOUND",
            Self::Any => "ANY",
        }
    }
}

impl From<TraversalDirection> for Direction {
    fn from(direction: TraversalDirection) -> Self {
        match direction {
            TraversalDirection::Outbound => Self::Outbound,
            TraversalDirection::Inbound => Self::Inbound,
            TraversalDirection::Any => Self::Any,
        }
    }
}

/// Where a traversal starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartVertex {
    /// Document handle passed as a bind parameter
    Bound(Bind),
    /// Row alias of an enclosing loop
    Variable(String),
}

/// What a `FOR` loop iterates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForSource {
    /// Every document of a collection
    Collection(Bind),
    /// Vertices reachable within `1..depth` hops
    Traversal {
        depth: u32,
        direction: Direction,
        start: StartVertex,
        edges: Vec<Bind>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForClause {
    pub variable: String,
    pub source: ForSource,
}

/// `<alias>.@<path> <op> @<value>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub alias: String,
    pub path: Bind,
    pub operator: Operator,
    pub value: Bind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    pub alias: String,
    pub path: Bind,
    pub direction: Bind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitClause {
    pub offset: Bind,
    pub count: Bind,
}

/// Per-row projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `RETURN alias`
    Row(String),
    /// `RETURN MERGE(alias, { field: variable, ... })`
    Merge {
        alias: String,
        fields: Vec<(String, String)>,
    },
    /// `COLLECT WITH COUNT INTO variable RETURN variable`
    Count(String),
}

/// A subquery bound with `LET`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subquery {
    pub variable: String,
    /// Wrap in `FIRST(...)` to yield a single element
    pub first: bool,
    pub body: Box<QueryBody>,
}

/// One fetch-and-project loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetch {
    pub for_clause: ForClause,
    /// ANDed together in a single `FILTER`
    pub filters: Vec<Condition>,
    pub sort: Option<SortClause>,
    pub limit: Option<LimitClause>,
    pub subqueries: Vec<Subquery>,
    pub projection: Projection,
}

/// Body of a node's query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryBody {
    Fetch(Fetch),
    /// Total count and page, returned as `{ total, items }`
    Counted {
        count: Subquery,
        rows: Subquery,
        total_field: String,
        items_field: String,
    },
}

/// A complete query: optional upfront declaration plus the root body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedQuery {
    /// Collections named in `WITH`, in gathering order
    pub declaration: Vec<Bind>,
    pub body: QueryBody,
}

impl ComposedQuery {
    /// Every bind reference in the query, in rendering order (with repeats)
    pub fn bind_references(&self) -> Vec<&Bind> {
        let mut refs: Vec<&Bind> = self.declaration.iter().collect();
        collect_body(&self.body, &mut refs);
        refs
    }

    /// Distinct bind-map keys referenced by the query
    pub fn bind_keys(&self) -> BTreeSet<String> {
        self.bind_references().into_iter().map(Bind::key).collect()
    }
}

fn collect_body<'a>(body: &'a QueryBody, refs: &mut Vec<&'a Bind>) {
    match body {
        QueryBody::Fetch(fetch) => collect_fetch(fetch, refs),
        QueryBody::Counted { count, rows, .. } => {
            collect_body(&count.body, refs);
            collect_body(&rows.body, refs);
        }
    }
}

fn collect_fetch<'a>(fetch: &'a Fetch, refs: &mut Vec<&'a Bind>) {
    match &fetch.for_clause.source {
        ForSource::Collection(bind) => refs.push(bind),
        ForSource::Traversal { start, edges, .. } => {
            if let StartVertex::Bound(bind) = start {
                refs.push(bind);
            }
            refs.extend(edges.iter());
        }
    }
    for condition in &fetch.filters {
        refs.push(&condition.path);
        refs.push(&condition.value);
    }
    if let Some(sort) = &fetch.sort {
        refs.push(&sort.path);
        refs.push(&sort.direction);
    }
    if let Some(limit) = &fetch.limit {
        refs.push(&limit.offset);
        refs.push(&limit.count);
    }
    for subquery in &fetch.subqueries {
        collect_body(&subquery.body, refs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_placeholder_and_key() {
        let value = Bind::Value("filterValue_3".to_string());
        let collection = Bind::Collection("collection_1".to_string());

        assert_eq!(value.placeholder(), "@filterValue_3");
        assert_eq!(value.key(), "filterValue_3");
        assert_eq!(collection.placeholder(), "@@collection_1");
        assert_eq!(collection.key(), "@collection_1");
        assert_eq!(collection.name(), "collection_1");
    }

    #[test]
    fn test_direction_keywords() {
        assert_eq!(Direction::default().keyword(), "ANY");
        assert_eq!(
            Direction::from(TraversalDirection::Outbound).keyword(),
            "OUTBOUND"
        );
        assert_eq!(
            Direction::from(TraversalDirection::Inbound).keyword(),
            "INBOUND"
        );
    }

    #[test]
    fn test_bind_references_cover_nested_bodies() {
        let inner = Fetch {
            for_clause: ForClause {
                variable: "vertex".to_string(),
                source: ForSource::Traversal {
                    depth: 1,
                    direction: Direction::Any,
                    start: StartVertex::Bound(Bind::Value("startVertex_3".to_string())),
                    edges: vec![Bind::Collection("edge_2".to_string())],
                },
            },
            filters: vec![],
            sort: None,
            limit: None,
            subqueries: vec![],
            projection: Projection::Row("vertex".to_string()),
        };
        let query = ComposedQuery {
            declaration: vec![Bind::Collection("with_4".to_string())],
            body: QueryBody::Fetch(Fetch {
                for_clause: ForClause {
                    variable: "doc".to_string(),
                    source: ForSource::Collection(Bind::Collection("collection_1".to_string())),
                },
                filters: vec![],
                sort: None,
                limit: None,
                subqueries: vec![Subquery {
                    variable: "child_5".to_string(),
                    first: false,
                    body: Box::new(QueryBody::Fetch(inner)),
                }],
                projection: Projection::Merge {
                    alias: "doc".to_string(),
                    fields: vec![("related".to_string(), "child_5".to_string())],
                },
            }),
        };

        let keys: Vec<String> = query.bind_keys().into_iter().collect();
        assert_eq!(
            keys,
            vec!["@collection_1", "@edge_2", "@with_4", "startVertex_3"]
        );
    }
}
