//! Traversal nodes: iterate vertices reachable over edge collections.
//!
//! ```text
//! FOR <alias> IN 1..<depth> <DIRECTION> <start> @@edge_N, @@edge_M
//! ```
//!
//! The start vertex is resolved in priority order:
//!
//! 1. an explicit `collection/key` handle, bound as a parameter
//! 2. a root selector naming another node's alias
//! 3. the alias of the tree root, when this node has a parent
//!
//! A root traversal with none of these fails with
//! [`ComposeError::MissingStartingVertex`].

use super::{BuildContext, QueryOptions, Selector};
use crate::error::{ComposeError, ComposeResult};
use crate::guard::{ensure_identifier, ensure_vertex_reference};
use crate::ir::{Direction, ForSource, StartVertex};
use arbor_config::TraversalDefaults;

/// Input describing a traversal node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversalSpec {
    /// Edge collections walked, each passed as a bind parameter
    pub edges: Vec<String>,
    /// Collections only named in the root `WITH` declaration
    pub related: Vec<String>,
    /// Explicit `collection/key` start
    pub start_vertex: Option<String>,
    /// Alias of another node to start from
    pub root_selector: Option<String>,
    /// Maximum hop count; configuration default when unset
    pub depth: Option<u32>,
    /// Edge direction; configuration default when unset
    pub direction: Option<Direction>,
    pub options: QueryOptions,
}

impl TraversalSpec {
    pub fn new<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            edges: edges.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related = related.into_iter().map(Into::into).collect();
        self
    }

    pub fn start_vertex(mut self, handle: impl Into<String>) -> Self {
        self.start_vertex = Some(handle.into());
        self
    }

    pub fn root_selector(mut self, alias: impl Into<String>) -> Self {
        self.root_selector = Some(alias.into());
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

/// Selector for graph traversals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalSelector {
    edges: Vec<String>,
    related: Vec<String>,
    start_vertex: Option<String>,
    root_selector: Option<String>,
    depth: u32,
    direction: Direction,
}

impl TraversalSelector {
    /// Resolve unset depth and direction from `defaults`
    pub fn from_spec(spec: &TraversalSpec, defaults: &TraversalDefaults) -> Self {
        Self {
            edges: spec.edges.clone(),
            related: spec.related.clone(),
            start_vertex: spec.start_vertex.clone(),
            root_selector: spec.root_selector.clone(),
            depth: spec.depth.unwrap_or(defaults.depth),
            direction: spec.direction.unwrap_or_else(|| defaults.direction.into()),
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn resolve_start(&self, ctx: &mut BuildContext<'_, '_>) -> ComposeResult<StartVertex> {
        if let Some(handle) = &self.start_vertex {
            let handle = ensure_vertex_reference(handle)?;
            let naming = ctx.naming();
            return Ok(StartVertex::Bound(
                ctx.bind_value(&naming.start_vertex, handle)?,
            ));
        }

        if let Some(alias) = &self.root_selector {
            return Ok(StartVertex::Variable(ensure_identifier(alias)?.to_string()));
        }

        let frame = ctx.frame();
        if frame.is_root() {
            return Err(ComposeError::MissingStartingVertex);
        }
        Ok(StartVertex::Variable(frame.root().alias().to_string()))
    }
}

impl Selector for TraversalSelector {
    fn kind(&self) -> &'static str {
        "traversal"
    }

    fn build_selector(
        &self,
        _alias: &str,
        ctx: &mut BuildContext<'_, '_>,
    ) -> ComposeResult<ForSource> {
        if self.depth == 0 {
            return Err(ComposeError::InvalidDepth(self.depth));
        }

        let start = self.resolve_start(ctx)?;

        if self.edges.is_empty() {
            return Err(ComposeError::MissingEdgeCollection);
        }
        let naming = ctx.naming();
        let edges = self
            .edges
            .iter()
            .map(|edge| ctx.bind_collection(&naming.edge, edge))
            .collect::<ComposeResult<Vec<_>>>()?;

        Ok(ForSource::Traversal {
            depth: self.depth,
            direction: self.direction,
            start,
            edges,
        })
    }

    fn related_collections(&self) -> &[String] {
        &self.related
    }

    fn set_root_selector(&mut self, alias: &str) -> ComposeResult<()> {
        self.root_selector = Some(ensure_identifier(alias)?.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Bind, QueryBody};
    use crate::node::{DocumentSpec, QueryNode};
    use arbor_config::TraversalDirection;
    use serde_json::json;

    fn traversal_source(node: &mut QueryNode) -> ForSource {
        let (composed, _) = node.compose().unwrap();
        let QueryBody::Fetch(fetch) = composed.body else {
            panic!("expected a plain fetch");
        };
        fetch.for_clause.source
    }

    #[test]
    fn test_root_without_start_fails() {
        let mut node = QueryNode::traversal(TraversalSpec::new(["tospaa"]));
        assert!(matches!(
            node.prepare(),
            Err(ComposeError::MissingStartingVertex)
        ));
    }

    #[test]
    fn test_malformed_start_vertex_fails() {
        let mut node = QueryNode::traversal(TraversalSpec::new(["tospaa"]).start_vertex("invalid"));
        assert!(matches!(
            node.prepare(),
            Err(ComposeError::InvalidVertexReference(ref v)) if v == "invalid"
        ));
    }

    #[test]
    fn test_explicit_start_is_bound() {
        let mut node =
            QueryNode::traversal(TraversalSpec::new(["tospaa"]).start_vertex("deneme/1-2"));
        let source = traversal_source(&mut node);

        assert_eq!(
            source,
            ForSource::Traversal {
                depth: 1,
                direction: Direction::Any,
                start: StartVertex::Bound(Bind::Value("startVertex_1".to_string())),
                edges: vec![Bind::Collection("edge_2".to_string())],
            }
        );
        assert_eq!(node.bind_vars()["startVertex_1"], json!("deneme/1-2"));
        assert_eq!(node.bind_vars()["@edge_2"], json!("tospaa"));
    }

    #[test]
    fn test_root_selector_used_at_root() {
        let mut node = QueryNode::traversal(TraversalSpec::new(["tospaa"]));
        node.set_root_selector("outer").unwrap();

        let ForSource::Traversal { start, .. } = traversal_source(&mut node) else {
            panic!("expected traversal");
        };
        assert_eq!(start, StartVertex::Variable("outer".to_string()));
    }

    #[test]
    fn test_root_selector_guarded() {
        let mut node = QueryNode::traversal(TraversalSpec::new(["tospaa"]));
        assert!(matches!(
            node.set_root_selector("doc._id"),
            Err(ComposeError::UnsafeIdentifier(_))
        ));

        let mut from_spec =
            QueryNode::traversal(TraversalSpec::new(["tospaa"]).root_selector("doc._id"));
        assert!(matches!(
            from_spec.prepare(),
            Err(ComposeError::UnsafeIdentifier(_))
        ));
    }

    #[test]
    fn test_document_node_rejects_root_selector() {
        let mut node = QueryNode::document(DocumentSpec::new("manifest"));
        assert!(matches!(
            node.set_root_selector("doc"),
            Err(ComposeError::NotImplemented)
        ));
    }

    #[test]
    fn test_start_priority_explicit_over_selector() {
        let mut node = QueryNode::traversal(
            TraversalSpec::new(["tospaa"])
                .start_vertex("deneme/1")
                .root_selector("outer"),
        );
        let ForSource::Traversal { start, .. } = traversal_source(&mut node) else {
            panic!("expected traversal");
        };
        assert!(matches!(start, StartVertex::Bound(_)));
    }

    #[test]
    fn test_nested_traversal_starts_from_tree_root() {
        let inner = QueryNode::traversal(TraversalSpec::new(["deeper"]))
            .with_alias("inner")
            .unwrap();
        let middle = QueryNode::traversal(TraversalSpec::new(["links"]))
            .with_child("next", inner)
            .unwrap();
        let mut root = QueryNode::document(DocumentSpec::new("manifest"))
            .with_child("linked", middle)
            .unwrap();

        let (composed, _) = root.compose().unwrap();
        let QueryBody::Fetch(root_fetch) = composed.body else {
            panic!("expected a plain fetch");
        };
        let QueryBody::Fetch(middle_fetch) = root_fetch.subqueries[0].body.as_ref() else {
            panic!("expected a plain fetch");
        };
        let QueryBody::Fetch(inner_fetch) = middle_fetch.subqueries[0].body.as_ref() else {
            panic!("expected a plain fetch");
        };

        for fetch in [middle_fetch, inner_fetch] {
            let ForSource::Traversal { start, .. } = &fetch.for_clause.source else {
                panic!("expected traversal");
            };
            assert_eq!(start, &StartVertex::Variable("doc".to_string()));
        }
    }

    #[test]
    fn test_depth_and_direction_defaults_from_config() {
        let defaults = TraversalDefaults {
            depth: 3,
            direction: TraversalDirection::Outbound,
        };
        let selector = TraversalSelector::from_spec(&TraversalSpec::new(["e"]), &defaults);
        assert_eq!(selector.depth(), 3);
        assert_eq!(selector.direction(), Direction::Outbound);

        let spec = TraversalSpec::new(["e"])
            .depth(2)
            .direction(Direction::Inbound);
        let explicit = TraversalSelector::from_spec(&spec, &defaults);
        assert_eq!(explicit.depth(), 2);
        assert_eq!(explicit.direction(), Direction::Inbound);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let mut node =
            QueryNode::traversal(TraversalSpec::new(["e"]).start_vertex("a/b").depth(0));
        assert!(matches!(node.prepare(), Err(ComposeError::InvalidDepth(0))));
    }

    #[test]
    fn test_missing_edges_rejected() {
        let spec = TraversalSpec::new(Vec::<String>::new()).start_vertex("a/b");
        let mut node = QueryNode::traversal(spec);
        assert!(matches!(
            node.prepare(),
            Err(ComposeError::MissingEdgeCollection)
        ));
    }

    #[test]
    fn test_multiple_edges_bound_in_order() {
        let mut node = QueryNode::traversal(
            TraversalSpec::new(["follows", "owns"]).start_vertex("users/alice"),
        );
        let ForSource::Traversal { edges, .. } = traversal_source(&mut node) else {
            panic!("expected traversal");
        };
        assert_eq!(
            edges,
            vec![
                Bind::Collection("edge_2".to_string()),
                Bind::Collection("edge_3".to_string())
            ]
        );
        assert_eq!(node.bind_vars()["@edge_3"], json!("owns"));
    }
}
