//! Document nodes: iterate every row of one collection.

use super::{BuildContext, QueryOptions, Selector};
use crate::error::ComposeResult;
use crate::ir::ForSource;

/// Input describing a document node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSpec {
    /// Collection name, always passed as a bind parameter
    pub collection: String,
    pub options: QueryOptions,
}

impl DocumentSpec {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            options: QueryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

/// `FOR <alias> IN @@collection_N`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSelector {
    collection: String,
}

impl DocumentSelector {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl Selector for DocumentSelector {
    fn kind(&self) -> &'static str {
        "document"
    }

    fn build_selector(
        &self,
        _alias: &str,
        ctx: &mut BuildContext<'_, '_>,
    ) -> ComposeResult<ForSource> {
        let naming = ctx.naming();
        let collection = ctx.bind_collection(&naming.collection, &self.collection)?;
        Ok(ForSource::Collection(collection))
    }
}
