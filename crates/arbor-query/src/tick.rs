//! Name allocation for generated bind parameters and variables.
//!
//! Subqueries are inlined as `LET` bindings inside their parent's loop, so a
//! generated name has to be unique across the whole query text. Only the
//! root of a tree hands out ticks; descendants borrow its allocator through
//! the build context.
//!
//! Row aliases are chosen by callers and may look like generated names
//! (`child_2`). The root reserves every alias of its tree before building,
//! and allocating a reserved name fails with
//! [`ComposeError::ShadowedAlias`].

use crate::error::{ComposeError, ComposeResult};
use crate::guard::ensure_identifier;
use std::collections::HashSet;

/// Monotonic tick counter shared by one builder tree.
#[derive(Debug, Default, Clone)]
pub struct NameAllocator {
    last: u64,
    reserved: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next tick, starting at 1.
    pub fn next_tick(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    /// Allocate `<base>_<tick>`. The base is checked by the identifier guard
    /// because the result is written verbatim into query text.
    pub fn allocate(&mut self, base: &str) -> ComposeResult<String> {
        let base = ensure_identifier(base)?;
        let name = format!("{}_{}", base, self.next_tick());
        if self.reserved.contains(&name) {
            return Err(ComposeError::ShadowedAlias(name));
        }
        Ok(name)
    }

    /// Names already taken in the query text
    pub fn reserve<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(names.into_iter().map(Into::into));
    }

    /// Number of ticks handed out so far
    pub fn issued(&self) -> u64 {
        self.last
    }

    pub(crate) fn reset(&mut self) {
        self.last = 0;
        self.reserved.clear();
    }
}
