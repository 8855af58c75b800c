//! Bind-parameter maps.

use serde_json::Value;
use std::collections::BTreeMap;

/// Bind parameters keyed by generated name. Collection parameters carry a
/// leading `@` in their key.
pub type BindVars = BTreeMap<String, Value>;

/// Merge `incoming` into `own`, keeping `own`'s value for any key present
/// in both.
///
/// Generated names are unique per tree, so a collision indicates two maps
/// from different trees were combined; the node's own entries win.
pub fn merge_own_wins(own: &mut BindVars, incoming: BindVars) {
    for (key, value) in incoming {
        own.entry(key).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_adds_missing_keys() {
        let mut own = BindVars::from([("a_1".to_string(), json!(1))]);
        merge_own_wins(&mut own, BindVars::from([("b_2".to_string(), json!(2))]));

        assert_eq!(own.len(), 2);
        assert_eq!(own["b_2"], json!(2));
    }

    #[test]
    fn test_merge_keeps_own_value_on_collision() {
        let mut own = BindVars::from([("a_1".to_string(), json!("own"))]);
        merge_own_wins(
            &mut own,
            BindVars::from([
                ("a_1".to_string(), json!("incoming")),
                ("c_3".to_string(), json!(3)),
            ]),
        );

        assert_eq!(own["a_1"], json!("own"));
        assert_eq!(own["c_3"], json!(3));
    }
}
