//! Configuration sections for the query composer

pub mod naming;
pub mod query;
pub mod render;

pub use naming::*;
pub use query::*;
pub use render::*;
