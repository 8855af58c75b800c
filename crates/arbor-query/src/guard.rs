//! Identifier safety guard.
//!
//! Anything placed into query text without binding (row aliases, object
//! keys, generated-name bases) must pass [`ensure_identifier`]. Values never
//! come through here; they are always bound parameters.

use crate::error::{ComposeError, ComposeResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern for identifiers that may appear verbatim in AQL
static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9\-_]*$").unwrap());

/// Pattern for ArangoDB document handles: `collection/key`
static VERTEX_REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*/[A-Za-z0-9_\-:.@()+,=;$!*'%]+$").unwrap()
});

/// Returns true if `name` may be placed unescaped into query text
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// Validate `name` for verbatim placement, returning it unchanged on success.
pub fn ensure_identifier(name: &str) -> ComposeResult<&str> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(ComposeError::UnsafeIdentifier(name.to_string()))
    }
}

/// Validate a `collection/key` document handle.
pub fn ensure_vertex_reference(handle: &str) -> ComposeResult<&str> {
    if VERTEX_REFERENCE_RE.is_match(handle) {
        Ok(handle)
    } else {
        Err(ComposeError::InvalidVertexReference(handle.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("doc" ; "lowercase")]
    #[test_case("Vertex" ; "capitalized")]
    #[test_case("a1" ; "trailing digit")]
    #[test_case("git-repo_info" ; "dash and underscore")]
    fn test_accepts_identifier(name: &str) {
        assert_eq!(ensure_identifier(name).unwrap(), name);
    }

    #[test_case("" ; "empty")]
    #[test_case("1doc" ; "leading digit")]
    #[test_case("_doc" ; "leading underscore")]
    #[test_case("doc name" ; "space")]
    #[test_case("doc.field" ; "dot")]
    #[test_case("doc RETURN 1" ; "injected clause")]
    #[test_case("@doc" ; "bind marker")]
    #[test_case("dóc" ; "non ascii")]
    fn test_rejects_identifier(name: &str) {
        let err = ensure_identifier(name).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::UnsafeIdentifier(ref s) if s == name
        ));
    }

    #[test_case("deneme/1-2")]
    #[test_case("users/alice")]
    #[test_case("_system_things/key:with.punct@x")]
    fn test_accepts_vertex_reference(handle: &str) {
        assert!(ensure_vertex_reference(handle).is_ok());
    }

    #[test_case("invalid")]
    #[test_case("/key")]
    #[test_case("coll/")]
    #[test_case("coll/a/b")]
    #[test_case("1coll/key")]
    fn test_rejects_vertex_reference(handle: &str) {
        assert!(matches!(
            ensure_vertex_reference(handle),
            Err(ComposeError::InvalidVertexReference(_))
        ));
    }
}
