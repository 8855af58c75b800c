//! ArangoDB AQL renderer.
//!
//! Renders the clause IR to AQL:
//! - `WITH` declaration of traversal collections up front
//! - one `FOR` loop per node, traversals as `1..depth DIRECTION start edges`
//! - child nodes as `LET` subqueries, `FIRST(...)` for single-item children
//! - counted nodes as a count subquery plus a row subquery

use crate::ir::{
    Bind, ComposedQuery, Condition, Fetch, ForSource, Projection, QueryBody, StartVertex, Subquery,
};
use crate::render::QueryRenderer;
use arbor_config::RenderConfig;

/// AQL renderer with a pretty (multi-line) or compact (single-line) layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AqlRenderer {
    /// One clause per line, nested subqueries indented
    pub pretty: bool,
    /// Spaces per nesting level in pretty mode
    pub indent: usize,
}

impl Default for AqlRenderer {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

impl AqlRenderer {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            pretty: config.pretty,
            indent: config.indent,
        }
    }

    /// Single-line layout
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }

    fn join(&self, lines: Vec<(usize, String)>) -> String {
        if self.pretty {
            lines
                .into_iter()
                .map(|(level, text)| {
                    let indent = " ".repeat(level * self.indent);
                    format!("{}{}", indent, text)
                })
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            lines
                .into_iter()
                .map(|(_, text)| text)
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}

impl QueryRenderer for AqlRenderer {
    fn name(&self) -> &str {
        "aql"
    }

    fn render(&self, query: &ComposedQuery) -> String {
        let mut lines = Vec::new();

        if !query.declaration.is_empty() {
            lines.push((0, format!("WITH {}", placeholders(&query.declaration))));
        }
        render_body(&query.body, 0, &mut lines);

        self.join(lines)
    }
}

fn render_body(body: &QueryBody, level: usize, lines: &mut Vec<(usize, String)>) {
    match body {
        QueryBody::Fetch(fetch) => render_fetch(fetch, level, lines),
        QueryBody::Counted {
            count,
            rows,
            total_field,
            items_field,
        } => {
            render_subquery(count, level, lines);
            render_subquery(rows, level, lines);
            lines.push((
                level,
                format!(
                    "RETURN {{ \"{}\": {}, \"{}\": {} }}",
                    total_field, count.variable, items_field, rows.variable
                ),
            ));
        }
    }
}

fn render_subquery(subquery: &Subquery, level: usize, lines: &mut Vec<(usize, String)>) {
    let open = if subquery.first { "FIRST(" } else { "(" };
    lines.push((level, format!("LET {} = {}", subquery.variable, open)));
    render_body(&subquery.body, level + 1, lines);
    lines.push((level, ")".to_string()));
}

fn render_fetch(fetch: &Fetch, level: usize, lines: &mut Vec<(usize, String)>) {
    let source = match &fetch.for_clause.source {
        ForSource::Collection(collection) => collection.placeholder(),
        ForSource::Traversal {
            depth,
            direction,
            start,
            edges,
        } => {
            let start = match start {
                StartVertex::Bound(bind) => bind.placeholder(),
                StartVertex::Variable(alias) => alias.clone(),
            };
            format!(
                "1..{} {} {} {}",
                depth,
                direction.keyword(),
                start,
                placeholders(edges)
            )
        }
    };
    lines.push((
        level,
        format!("FOR {} IN {}", fetch.for_clause.variable, source),
    ));

    let inner = level + 1;

    if !fetch.filters.is_empty() {
        let conditions = fetch
            .filters
            .iter()
            .map(render_condition)
            .collect::<Vec<_>>()
            .join(" AND ");
        lines.push((inner, format!("FILTER {}", conditions)));
    }

    if let Some(sort) = &fetch.sort {
        lines.push((
            inner,
            format!(
                "SORT {}.{} {}",
                sort.alias,
                sort.path.placeholder(),
                sort.direction.placeholder()
            ),
        ));
    }

    if let Some(limit) = &fetch.limit {
        lines.push((
            inner,
            format!(
                "LIMIT {}, {}",
                limit.offset.placeholder(),
                limit.count.placeholder()
            ),
        ));
    }

    for subquery in &fetch.subqueries {
        render_subquery(subquery, inner, lines);
    }

    match &fetch.projection {
        Projection::Row(alias) => lines.push((inner, format!("RETURN {}", alias))),
        Projection::Merge { alias, fields } => {
            let fields = fields
                .iter()
                .map(|(field, variable)| format!("\"{}\": {}", field, variable))
                .collect::<Vec<_>>()
                .join(", ");
            let merged = format!("RETURN MERGE({}, {{ {} }})", alias, fields);
            lines.push((inner, merged));
        }
        Projection::Count(variable) => {
            lines.push((inner, format!("COLLECT WITH COUNT INTO {}", variable)));
            lines.push((inner, format!("RETURN {}", variable)));
        }
    }
}

fn render_condition(condition: &Condition) -> String {
    format!(
        "{}.{} {} {}",
        condition.alias,
        condition.path.placeholder(),
        condition.operator.as_aql(),
        condition.value.placeholder()
    )
}

fn placeholders(binds: &[Bind]) -> String {
    binds
        .iter()
        .map(Bind::placeholder)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Operator;
    use crate::ir::{Direction, ForClause, LimitClause, SortClause};

    fn value(name: &str) -> Bind {
        Bind::Value(name.to_string())
    }

    fn collection(name: &str) -> Bind {
        Bind::Collection(name.to_string())
    }

    fn scan(alias: &str, bind: &str) -> Fetch {
        Fetch {
            for_clause: ForClause {
                variable: alias.to_string(),
                source: ForSource::Collection(collection(bind)),
            },
            filters: vec![],
            sort: None,
            limit: None,
            subqueries: vec![],
            projection: Projection::Row(alias.to_string()),
        }
    }

    #[test]
    fn test_render_scan() {
        let query = ComposedQuery {
            declaration: vec![],
            body: QueryBody::Fetch(scan("doc", "collection_1")),
        };

        let pretty = AqlRenderer::default().render(&query);
        assert_eq!(pretty, "FOR doc IN @@collection_1\n  RETURN doc");

        let compact = AqlRenderer::compact().render(&query);
        assert_eq!(compact, "FOR doc IN @@collection_1 RETURN doc");
    }

    #[test]
    fn test_render_filters_are_anded() {
        let mut fetch = scan("doc", "collection_1");
        fetch.filters = vec![
            Condition {
                alias: "doc".to_string(),
                path: value("filterPath_2"),
                operator: Operator::Eq,
                value: value("filterValue_3"),
            },
            Condition {
                alias: "other".to_string(),
                path: value("filterPath_4"),
                operator: Operator::NotIn,
                value: value("filterValue_5"),
            },
        ];
        let query = ComposedQuery {
            declaration: vec![],
            body: QueryBody::Fetch(fetch),
        };

        let text = AqlRenderer::compact().render(&query);
        assert_eq!(
            text,
            "FOR doc IN @@collection_1 \
             FILTER doc.@filterPath_2 == @filterValue_3 \
             AND other.@filterPath_4 NOT IN @filterValue_5 \
             RETURN doc"
        );
    }

    #[test]
    fn test_render_sort_limit_and_traversal() {
        let fetch = Fetch {
            for_clause: ForClause {
                variable: "vertex".to_string(),
                source: ForSource::Traversal {
                    depth: 2,
                    direction: Direction::Outbound,
                    start: StartVertex::Variable("doc".to_string()),
                    edges: vec![collection("edge_1"), collection("edge_2")],
                },
            },
            filters: vec![],
            sort: Some(SortClause {
                alias: "vertex".to_string(),
                path: value("sortPath_3"),
                direction: value("sortDirection_4"),
            }),
            limit: Some(LimitClause {
                offset: value("offset_5"),
                count: value("limit_6"),
            }),
            subqueries: vec![],
            projection: Projection::Row("vertex".to_string()),
        };
        let query = ComposedQuery {
            declaration: vec![collection("with_7")],
            body: QueryBody::Fetch(fetch),
        };

        let text = AqlRenderer::default().render(&query);
        assert_eq!(
            text,
            [
                "WITH @@with_7",
                "FOR vertex IN 1..2 OUTBOUND doc @@edge_1, @@edge_2",
                "  SORT vertex.@sortPath_3 @sortDirection_4",
                "  LIMIT @offset_5, @limit_6",
                "  RETURN vertex",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_render_counted_body() {
        let mut count = scan("doc", "collection_1");
        count.projection = Projection::Count("length_3".to_string());
        let query = ComposedQuery {
            declaration: vec![],
            body: QueryBody::Counted {
                count: Subquery {
                    variable: "count_2".to_string(),
                    first: true,
                    body: Box::new(QueryBody::Fetch(count)),
                },
                rows: Subquery {
                    variable: "rows_4".to_string(),
                    first: false,
                    body: Box::new(QueryBody::Fetch(scan("doc", "collection_1"))),
                },
                total_field: "total".to_string(),
                items_field: "items".to_string(),
            },
        };

        let text = AqlRenderer::default().render(&query);
        assert_eq!(
            text,
            [
                "LET count_2 = FIRST(",
                "  FOR doc IN @@collection_1",
                "    COLLECT WITH COUNT INTO length_3",
                "    RETURN length_3",
                ")",
                "LET rows_4 = (",
                "  FOR doc IN @@collection_1",
                "    RETURN doc",
                ")",
                "RETURN { \"total\": count_2, \"items\": rows_4 }",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_custom_indent() {
        let renderer = AqlRenderer::from_config(&RenderConfig {
            pretty: true,
            indent: 4,
        });
        let query = ComposedQuery {
            declaration: vec![],
            body: QueryBody::Fetch(scan("doc", "collection_1")),
        };
        let text = renderer.render(&query);
        assert_eq!(text, "FOR doc IN @@collection_1\n    RETURN doc");
    }
}
