//! Query nodes and tree assembly.
//!
//! A [`QueryNode`] is one fetch or traversal step. Nodes own their children,
//! keyed by the output field each child is projected into. Preparing the
//! root walks the tree depth-first:
//!
//! 1. selector (delegated to the node's [`Selector`])
//! 2. filter, flattened into ANDed leaf conditions
//! 3. sort
//! 4. limit
//! 5. `WITH` declaration (root only)
//! 6. return projection
//! 7. children, each inlined as a `LET` subquery
//!
//! Every generated name comes from the root's [`NameAllocator`], so names
//! are unique across the whole query text and deterministic for a given
//! tree shape.

mod document;
mod traversal;

pub use document::{DocumentSelector, DocumentSpec};
pub use traversal::{TraversalSelector, TraversalSpec};

use crate::error::{ComposeError, ComposeResult};
use crate::filter::{flatten, FilterSpec};
use crate::guard::ensure_identifier;
use crate::ir::{
    Bind, ComposedQuery, Condition, Fetch, ForClause, ForSource, LimitClause, Projection,
    QueryBody, SortClause, Subquery,
};
use crate::params::{merge_own_wins, BindVars};
use crate::render::{AqlRenderer, PreparedQuery, QueryRenderer};
use crate::tick::NameAllocator;
use arbor_config::{ArborConfig, NamingConfig};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Sort order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort by one dot-path below the row alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    fn path(&self) -> Vec<String> {
        self.field.split('.').map(str::to_string).collect()
    }
}

/// `LIMIT offset, count`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitSpec {
    pub offset: u64,
    pub count: u64,
}

impl LimitSpec {
    pub fn new(offset: u64, count: u64) -> Self {
        Self { offset, count }
    }
}

/// Options shared by every node kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub filter: Option<FilterSpec>,
    pub sort: Option<SortSpec>,
    pub limit: Option<LimitSpec>,
    /// Return `{ total, items }` where `total` ignores sort and limit
    pub with_count: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, offset: u64, count: u64) -> Self {
        self.limit = Some(LimitSpec::new(offset, count));
        self
    }

    pub fn count(mut self) -> Self {
        self.with_count = true;
        self
    }

    /// A subquery over this node is reduced to its first element
    fn yields_single(&self) -> bool {
        self.with_count || self.limit.is_some_and(|limit| limit.count == 1)
    }
}

/// One level of the parent chain during assembly
#[derive(Debug, Clone, Copy)]
pub struct Frame<'f> {
    alias: &'f str,
    parent: Option<&'f Frame<'f>>,
}

impl<'f> Frame<'f> {
    pub fn alias(&self) -> &'f str {
        self.alias
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Walk parent links up to the frame without a parent
    pub fn root(&self) -> &Frame<'f> {
        let mut frame = self;
        while let Some(parent) = frame.parent {
            frame = parent;
        }
        frame
    }

    fn binds_alias(&self, alias: &str) -> bool {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if current.alias == alias {
                return true;
            }
            frame = current.parent;
        }
        false
    }
}

/// State handed to a node (and its selector) while it builds.
///
/// Holds the root's name allocator, the root's configuration, and the
/// building node's own bind-parameter map.
pub struct BuildContext<'c, 'f> {
    names: &'c mut NameAllocator,
    config: &'c ArborConfig,
    params: &'c mut BindVars,
    frame: &'c Frame<'f>,
}

impl<'c, 'f> BuildContext<'c, 'f> {
    pub fn frame(&self) -> &'c Frame<'f> {
        self.frame
    }

    pub fn naming(&self) -> &'c NamingConfig {
        &self.config.naming
    }

    /// Allocate a variable name
    pub fn allocate(&mut self, base: &str) -> ComposeResult<String> {
        self.names.allocate(base)
    }

    /// Allocate a value parameter and record its value. An existing entry
    /// under the same key is kept.
    pub fn bind_value(&mut self, base: &str, value: impl Into<Value>) -> ComposeResult<Bind> {
        let bind = Bind::Value(self.names.allocate(base)?);
        self.params
            .entry(bind.key())
            .or_insert_with(|| value.into());
        Ok(bind)
    }

    /// Allocate a collection parameter (`@@name`) for `collection`
    pub fn bind_collection(&mut self, base: &str, collection: &str) -> ComposeResult<Bind> {
        let bind = Bind::Collection(self.names.allocate(base)?);
        self.params
            .entry(bind.key())
            .or_insert_with(|| Value::String(collection.to_string()));
        Ok(bind)
    }
}

/// Produces the `FOR` source of a node.
///
/// The default implementation is the abstract base node: building it fails
/// with [`ComposeError::NotImplemented`].
pub trait Selector: fmt::Debug + Send + Sync {
    /// Short name used in logs
    fn kind(&self) -> &'static str {
        "base"
    }

    fn build_selector(
        &self,
        alias: &str,
        ctx: &mut BuildContext<'_, '_>,
    ) -> ComposeResult<ForSource> {
        let _ = (alias, ctx);
        Err(ComposeError::NotImplemented)
    }

    /// Collections this selector needs declared upfront with `WITH`
    fn related_collections(&self) -> &[String] {
        &[]
    }

    /// Start from another node's row alias instead of the default.
    /// Only traversals support this.
    fn set_root_selector(&mut self, alias: &str) -> ComposeResult<()> {
        let _ = alias;
        Err(ComposeError::NotImplemented)
    }
}

/// Selector of the abstract base node
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseSelector;

impl Selector for BaseSelector {}

struct BuiltNode {
    body: QueryBody,
    declaration: Vec<Bind>,
    bind_vars: BindVars,
}

/// One composable fetch-or-traversal step
#[derive(Debug)]
pub struct QueryNode {
    alias: String,
    options: QueryOptions,
    selector: Box<dyn Selector>,
    children: IndexMap<String, QueryNode>,
    config: Arc<ArborConfig>,
    /// Only consulted while this node is the root of a `prepare()`
    names: NameAllocator,
    bind_vars: BindVars,
}

impl QueryNode {
    /// Node with a custom selector
    pub fn new(
        alias: impl Into<String>,
        options: QueryOptions,
        selector: impl Selector + 'static,
        config: Arc<ArborConfig>,
    ) -> ComposeResult<Self> {
        let alias = alias.into();
        ensure_identifier(&alias)?;
        Ok(Self::from_parts(alias, options, Box::new(selector), config))
    }

    fn from_parts(
        alias: String,
        options: QueryOptions,
        selector: Box<dyn Selector>,
        config: Arc<ArborConfig>,
    ) -> Self {
        Self {
            alias,
            options,
            selector,
            children: IndexMap::new(),
            config,
            names: NameAllocator::new(),
            bind_vars: BindVars::new(),
        }
    }

    /// Abstract node without a selector; preparing it fails
    pub fn base(options: QueryOptions) -> Self {
        let config = Arc::new(ArborConfig::default());
        Self::from_parts(
            config.aliases.document.clone(),
            options,
            Box::new(BaseSelector),
            config,
        )
    }

    pub fn document(spec: DocumentSpec) -> Self {
        Self::document_with_config(spec, Arc::new(ArborConfig::default()))
    }

    pub fn document_with_config(spec: DocumentSpec, config: Arc<ArborConfig>) -> Self {
        let DocumentSpec {
            collection,
            options,
        } = spec;
        Self::from_parts(
            config.aliases.document.clone(),
            options,
            Box::new(DocumentSelector::new(collection)),
            config,
        )
    }

    pub fn traversal(spec: TraversalSpec) -> Self {
        Self::traversal_with_config(spec, Arc::new(ArborConfig::default()))
    }

    pub fn traversal_with_config(spec: TraversalSpec, config: Arc<ArborConfig>) -> Self {
        let selector = TraversalSelector::from_spec(&spec, &config.traversal);
        Self::from_parts(
            config.aliases.traversal.clone(),
            spec.options,
            Box::new(selector),
            config,
        )
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn kind(&self) -> &'static str {
        self.selector.kind()
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Bind parameters of this node and its subtree from the last
    /// `compose()` of the tree. Empty after a failed one.
    pub fn bind_vars(&self) -> &BindVars {
        &self.bind_vars
    }

    /// Rename the row alias
    pub fn set_alias(&mut self, alias: impl Into<String>) -> ComposeResult<()> {
        let alias = alias.into();
        ensure_identifier(&alias)?;
        if self.children.contains_key(&alias) {
            return Err(ComposeError::DuplicateFieldName(alias));
        }
        self.alias = alias;
        Ok(())
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> ComposeResult<Self> {
        self.set_alias(alias)?;
        Ok(self)
    }

    /// Start a traversal node from another node's row alias
    pub fn set_root_selector(&mut self, alias: &str) -> ComposeResult<()> {
        let alias = ensure_identifier(alias)?;
        self.selector.set_root_selector(alias)
    }

    /// Attach `child`, projected into the output field `field`
    pub fn add_child(
        &mut self,
        field: impl Into<String>,
        child: QueryNode,
    ) -> ComposeResult<&mut QueryNode> {
        let field = field.into();
        ensure_identifier(&field)?;
        if field == self.alias || self.children.contains_key(&field) {
            return Err(ComposeError::DuplicateFieldName(field));
        }
        Ok(self.children.entry(field).or_insert(child))
    }

    pub fn with_child(mut self, field: impl Into<String>, child: QueryNode) -> ComposeResult<Self> {
        self.add_child(field, child)?;
        Ok(self)
    }

    pub fn child(&self, field: &str) -> Option<&QueryNode> {
        self.children.get(field)
    }

    pub fn child_mut(&mut self, field: &str) -> Option<&mut QueryNode> {
        self.children.get_mut(field)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &QueryNode)> {
        self.children
            .iter()
            .map(|(field, child)| (field.as_str(), child))
    }

    /// Related collections of every traversal in this subtree, depth-first
    /// from this node to the leaves. Repeats are kept.
    pub fn related_collections(&self) -> Vec<String> {
        let mut collections = Vec::new();
        self.collect_related(&mut collections);
        collections
    }

    fn collect_related(&self, out: &mut Vec<String>) {
        out.extend(self.selector.related_collections().iter().cloned());
        for child in self.children.values() {
            child.collect_related(out);
        }
    }

    fn collect_aliases(&self, out: &mut Vec<String>) {
        out.push(self.alias.clone());
        for child in self.children.values() {
            child.collect_aliases(out);
        }
    }

    fn clear_bind_vars(&mut self) {
        self.bind_vars.clear();
        for child in self.children.values_mut() {
            child.clear_bind_vars();
        }
    }

    /// Build the clause IR and bind parameters for this node as the root.
    ///
    /// On failure every node of the tree is left with an empty
    /// [`bind_vars`](Self::bind_vars) map.
    pub fn compose(&mut self) -> ComposeResult<(ComposedQuery, BindVars)> {
        let config = Arc::clone(&self.config);
        let mut aliases = Vec::new();
        self.collect_aliases(&mut aliases);

        let mut names = std::mem::take(&mut self.names);
        names.reset();
        names.reserve(aliases);
        let built = self.build(&mut names, &config, None);
        self.names = names;

        let built = match built {
            Ok(built) => built,
            Err(err) => {
                self.clear_bind_vars();
                return Err(err);
            }
        };
        Ok((
            ComposedQuery {
                declaration: built.declaration,
                body: built.body,
            },
            built.bind_vars,
        ))
    }

    /// Compose and render with the layout from this node's configuration
    pub fn prepare(&mut self) -> ComposeResult<PreparedQuery> {
        let renderer = AqlRenderer::from_config(&self.config.render);
        self.prepare_with(&renderer)
    }

    /// Compose and render with `renderer`
    pub fn prepare_with(&mut self, renderer: &dyn QueryRenderer) -> ComposeResult<PreparedQuery> {
        let (composed, bind_vars) = self.compose()?;
        let query = renderer.render(&composed);

        debug!(
            alias = %self.alias,
            renderer = renderer.name(),
            params = bind_vars.len(),
            query_len = query.len(),
            "Prepared query"
        );

        Ok(PreparedQuery { query, bind_vars })
    }

    fn build(
        &mut self,
        names: &mut NameAllocator,
        config: &ArborConfig,
        parent: Option<&Frame<'_>>,
    ) -> ComposeResult<BuiltNode> {
        if let Some(parent) = parent {
            if parent.binds_alias(&self.alias) {
                return Err(ComposeError::ShadowedAlias(self.alias.clone()));
            }
        }

        let frame = Frame {
            alias: &self.alias,
            parent,
        };

        trace!(
            alias = %self.alias,
            kind = self.selector.kind(),
            root = frame.is_root(),
            children = self.children.len(),
            "Building query node"
        );

        let naming = &config.naming;
        let mut params = BindVars::new();
        let mut ctx = BuildContext {
            names,
            config,
            params: &mut params,
            frame: &frame,
        };

        // 1. selector
        let source = self.selector.build_selector(&self.alias, &mut ctx)?;
        let for_clause = ForClause {
            variable: self.alias.clone(),
            source,
        };

        // 2. filter
        let mut filters = Vec::new();
        if let Some(filter) = &self.options.filter {
            for leaf in flatten(filter)? {
                let alias = match &leaf.alias {
                    Some(alias) => ensure_identifier(alias)?.to_string(),
                    None => self.alias.clone(),
                };
                let path = ctx.bind_value(&naming.filter_path, path_value(&leaf.path))?;
                let value = ctx.bind_value(&naming.filter_value, leaf.value)?;
                filters.push(Condition {
                    alias,
                    path,
                    operator: leaf.operator,
                    value,
                });
            }
        }

        // 3. sort
        let sort = match &self.options.sort {
            Some(sort) => Some(SortClause {
                alias: self.alias.clone(),
                path: ctx.bind_value(&naming.sort_path, path_value(&sort.path()))?,
                direction: ctx.bind_value(&naming.sort_direction, sort.direction.as_str())?,
            }),
            None => None,
        };

        // 4. limit
        let limit = match self.options.limit {
            Some(limit) => Some(LimitClause {
                offset: ctx.bind_value(&naming.offset, limit.offset)?,
                count: ctx.bind_value(&naming.limit, limit.count)?,
            }),
            None => None,
        };

        // 5. declaration
        let mut declaration = Vec::new();
        if frame.is_root() {
            for collection in self.related_collections() {
                declaration.push(ctx.bind_collection(&naming.with, &collection)?);
            }
        }

        // 7. children, bound before the projection that names them
        let mut subqueries = Vec::with_capacity(self.children.len());
        let mut fields = Vec::with_capacity(self.children.len());
        for (field, child) in self.children.iter_mut() {
            let variable = ctx.allocate(&naming.child)?;
            let built = child.build(&mut *ctx.names, config, Some(&frame))?;
            merge_own_wins(&mut *ctx.params, built.bind_vars);

            subqueries.push(Subquery {
                variable: variable.clone(),
                first: child.options.yields_single(),
                body: Box::new(built.body),
            });
            fields.push((field.clone(), variable));
        }

        // 6. return
        let projection = if fields.is_empty() {
            Projection::Row(self.alias.clone())
        } else {
            Projection::Merge {
                alias: self.alias.clone(),
                fields,
            }
        };

        let rows = Fetch {
            for_clause,
            filters,
            sort,
            limit,
            subqueries,
            projection,
        };

        let body = if self.options.with_count {
            let total_field = ensure_identifier(&config.result.total_field)?.to_string();
            let items_field = ensure_identifier(&config.result.items_field)?.to_string();
            let count_variable = ctx.allocate(&naming.count)?;
            let length_variable = ctx.allocate(&naming.length)?;
            let rows_variable = ctx.allocate(&naming.rows)?;

            // Same selector and filter as the page, without sort, limit or children
            let count = Fetch {
                for_clause: rows.for_clause.clone(),
                filters: rows.filters.clone(),
                sort: None,
                limit: None,
                subqueries: Vec::new(),
                projection: Projection::Count(length_variable),
            };

            QueryBody::Counted {
                count: Subquery {
                    variable: count_variable,
                    first: true,
                    body: Box::new(QueryBody::Fetch(count)),
                },
                rows: Subquery {
                    variable: rows_variable,
                    first: false,
                    body: Box::new(QueryBody::Fetch(rows)),
                },
                total_field,
                items_field,
            }
        } else {
            QueryBody::Fetch(rows)
        };

        self.bind_vars = params.clone();

        Ok(BuiltNode {
            body,
            declaration,
            bind_vars: params,
        })
    }
}

fn path_value(path: &[String]) -> Value {
    Value::Array(path.iter().cloned().map(Value::String).collect())
}
