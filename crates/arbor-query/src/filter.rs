//! Filter trees and the flattener that turns them into leaf
//! conditions.
//!
//! A filter is a restricted tree: nested objects describe attribute paths
//! and every leaf is one comparison. All leaves are ANDed together; there is
//! no OR or NOT.
//!
//! # JSON form
//!
//! ```json
//! {
//!   "gitRepoInfo": { "owner": "Tospaa" },
//!   "stars": { "$operator": ">=", "$value": 10 },
//!   "name": { "$value": "arbor", "$alias": "repo" }
//! }
//! ```
//!
//! An object carrying any of `$value`, `$operator` or `$alias` is a leaf
//! filter object. Any other object is another nesting level.

use crate::error::{ComposeError, ComposeResult};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Marker key for the compared value of a leaf filter object
pub const VALUE_MARKER: &str = "$value";
/// Marker key for the comparison operator of a leaf filter object
pub const OPERATOR_MARKER: &str = "$operator";
/// Marker key for the row alias a leaf path is relative to
pub const ALIAS_MARKER: &str = "$alias";

/// Comparison operators a leaf condition may use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Operator {
    #[default]
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Like,
    RegexMatch,
    RegexNotMatch,
}

impl Operator {
    /// AQL token for this operator
    pub fn as_aql(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
            Self::RegexMatch => "=~",
            Self::RegexNotMatch => "!~",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_aql())
    }
}

impl FromStr for Operator {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "IN" => Ok(Self::In),
            "NOT IN" => Ok(Self::NotIn),
            "LIKE" => Ok(Self::Like),
            "=~" => Ok(Self::RegexMatch),
            "!~" => Ok(Self::RegexNotMatch),
            _ => Err(ComposeError::UnsupportedOperator(s.to_string())),
        }
    }
}

/// A leaf carrying an explicit value, operator and/or alias override
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafFilter {
    pub value: Value,
    pub operator: Operator,
    /// Row alias the path is relative to, instead of the node's own alias
    pub alias: Option<String>,
}

impl LeafFilter {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// One entry of a filter object
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEntry {
    /// Another nesting level; its keys extend the dot-path
    Nested(FilterSpec),
    /// Scalar, array or null compared with `==`
    Literal(Value),
    /// Explicit leaf filter object
    Leaf(LeafFilter),
}

/// Nested filter tree, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    entries: Vec<(String, FilterEntry)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn with(mut self, key: impl Into<String>, entry: FilterEntry) -> Self {
        self.entries.push((key.into(), entry));
        self
    }

    /// Append a literal equality entry
    pub fn eq(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(key, FilterEntry::Literal(value.into()))
    }

    /// Append a nested level
    pub fn nest(self, key: impl Into<String>, nested: FilterSpec) -> Self {
        self.with(key, FilterEntry::Nested(nested))
    }

    /// Append a leaf filter object
    pub fn leaf(self, key: impl Into<String>, leaf: LeafFilter) -> Self {
        self.with(key, FilterEntry::Leaf(leaf))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, FilterEntry)] {
        &self.entries
    }

    /// Build from a JSON object, preserving key order.
    pub fn from_json(value: &Value) -> ComposeResult<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Err(ComposeError::InvalidFilterValue {
                path: String::new(),
            }),
        }
    }

    fn from_map(map: &Map<String, Value>) -> ComposeResult<Self> {
        let mut spec = Self::new();
        for (key, value) in map {
            let entry = match value {
                Value::Object(inner) if is_leaf_object(inner) => {
                    FilterEntry::Leaf(leaf_from_map(inner)?)
                }
                Value::Object(inner) => FilterEntry::Nested(Self::from_map(inner)?),
                other => FilterEntry::Literal(other.clone()),
            };
            spec.entries.push((key.clone(), entry));
        }
        Ok(spec)
    }
}

impl TryFrom<Value> for FilterSpec {
    type Error = ComposeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

fn is_leaf_object(map: &Map<String, Value>) -> bool {
    map.contains_key(VALUE_MARKER)
        || map.contains_key(OPERATOR_MARKER)
        || map.contains_key(ALIAS_MARKER)
}

fn leaf_from_map(map: &Map<String, Value>) -> ComposeResult<LeafFilter> {
    let operator = match map.get(OPERATOR_MARKER) {
        None | Some(Value::Null) => Operator::default(),
        Some(Value::String(op)) => op.parse()?,
        Some(other) => return Err(ComposeError::UnsupportedOperator(other.to_string())),
    };
    let alias = match map.get(ALIAS_MARKER) {
        None | Some(Value::Null) => None,
        Some(Value::String(alias)) => Some(alias.clone()),
        Some(other) => return Err(ComposeError::UnsafeIdentifier(other.to_string())),
    };
    Ok(LeafFilter {
        value: map.get(VALUE_MARKER).cloned().unwrap_or(Value::Null),
        operator,
        alias,
    })
}

/// One flattened comparison
#[derive(Debug, Clone, PartialEq)]
pub struct LeafCondition {
    /// Attribute path below the row alias, one element per level
    pub path: Vec<String>,
    pub operator: Operator,
    pub alias: Option<String>,
    pub value: Value,
}

impl LeafCondition {
    /// Dotted form of the path, e.g. `gitRepoInfo.owner`
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

/// Flatten a filter depth-first, in entry order.
///
/// `{a: {b: 1, c: 2}, d: 3}` yields `a.b`, `a.c`, `d`.
pub fn flatten(spec: &FilterSpec) -> ComposeResult<Vec<LeafCondition>> {
    let mut leaves = Vec::new();
    let mut path = Vec::new();
    flatten_into(spec, &mut path, &mut leaves)?;
    Ok(leaves)
}

fn flatten_into(
    spec: &FilterSpec,
    path: &mut Vec<String>,
    leaves: &mut Vec<LeafCondition>,
) -> ComposeResult<()> {
    for (key, entry) in &spec.entries {
        path.push(key.clone());
        match entry {
            FilterEntry::Nested(nested) => flatten_into(nested, path, leaves)?,
            FilterEntry::Literal(value) => {
                leaves.push(leaf_condition(path, value, Operator::Eq, None)?);
            }
            FilterEntry::Leaf(leaf) => {
                leaves.push(leaf_condition(
                    path,
                    &leaf.value,
                    leaf.operator,
                    leaf.alias.clone(),
                )?);
            }
        }
        path.pop();
    }
    Ok(())
}

fn leaf_condition(
    path: &[String],
    value: &Value,
    operator: Operator,
    alias: Option<String>,
) -> ComposeResult<LeafCondition> {
    if !is_bindable(value) {
        return Err(ComposeError::InvalidFilterValue {
            path: path.join("."),
        });
    }
    Ok(LeafCondition {
        path: path.to_vec(),
        operator,
        alias,
        value: value.clone(),
    })
}

/// Scalars, null, and arrays of scalars
fn is_bindable(value: &Value) -> bool {
    match value {
        Value::Object(_) => false,
        Value::Array(items) => items
            .iter()
            .all(|item| !matches!(item, Value::Object(_) | Value::Array(_))),
        _ => true,
    }
}
