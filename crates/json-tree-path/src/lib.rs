//! Path addressing for JSON trees.
//!
//! Two dialects address nodes inside a [`serde_json::Value`]:
//!
//! - simple paths, slash-delimited with optional indices: `a/b[2]/c`
//! - query paths with a root marker, recursive descent and filters:
//!   `$.items[?(@.id=='y')].qty`, `$..name`
//!
//! A path is a query path when it starts with `$` or contains `..`, `[?(`
//! or `==`; see [`PathParser::is_query`].
//!
//! # Example
//!
//! ```
//! use json_tree_path::{delete_value, get_value, set_value, QueryResult};
//! use serde_json::json;
//!
//! let mut doc = json!({"items": [{"id": "x", "qty": 1}, {"id": "y", "qty": 2}]});
//!
//! let qty = get_value(&doc, "$.items[?(@.id=='y')].qty");
//! assert_eq!(qty, QueryResult::One(&json!(2)));
//!
//! assert!(set_value(&mut doc, "$.items[?(@.id=='y')].qty", json!(9)));
//! assert!(set_value(&mut doc, "meta/tags[1]", json!("new")));
//! assert!(delete_value(&mut doc, "$.items[?(@.id=='x')]"));
//!
//! assert_eq!(
//!     doc,
//!     json!({"items": [{"id": "y", "qty": 9}], "meta": {"tags": [null, "new"]}})
//! );
//! ```
//!
//! Reads never fail: a path that matches nothing gives [`QueryResult::None`]
//! and writes that change nothing return `false`. Filter expressions outside
//! the supported `@.field <op> 'literal'` shape are dropped with a logged
//! warning; the `try_*` variants report them as [`ParseError`] instead.

use serde_json::Value;

mod types;
pub use types::*;

mod parser;
pub use parser::{ParseError, PathParser};

mod compare;

mod resolve;
pub use resolve::NodeResolver;

mod mutate;
pub use mutate::{Mutator, MAX_PADDED_INDEX};

mod util;
pub use util::{
    get_accessed_properties, path_expression_to_string, query_path_to_string,
    simple_path_to_string,
};

pub mod cli;

/// Read the value(s) at `path`.
pub fn get_value<'a>(tree: &'a Value, path: &str) -> QueryResult<'a> {
    let expression = PathParser::parse(path);
    QueryResult::from_matches(NodeResolver::resolve(tree, &expression))
}

/// Write `value` at `path`, creating intermediate structure for simple
/// paths. Returns whether anything was written.
///
/// An unsupported filter step is dropped, so the write lands one level up:
/// `$.items[?(@.qty > 1)]` would replace `items` as a whole. Use
/// [`try_set_value`] when the path is not known to be well formed.
pub fn set_value(tree: &mut Value, path: &str, value: Value) -> bool {
    let expression = PathParser::parse(path);
    Mutator::set(tree, &expression, value)
}

/// Remove the node(s) at `path`. Returns whether anything was removed.
///
/// An unsupported filter step is dropped, so the removal lands one level up:
/// `$.items[?(@.qty > 1)]` deletes `items` as a whole. Use
/// [`try_delete_value`] when the path is not known to be well formed.
pub fn delete_value(tree: &mut Value, path: &str) -> bool {
    let expression = PathParser::parse(path);
    Mutator::delete(tree, &expression)
}

/// Like [`get_value`], but an unsupported path step is an error.
pub fn try_get_value<'a>(tree: &'a Value, path: &str) -> Result<QueryResult<'a>, ParseError> {
    let expression = PathParser::parse_strict(path)?;
    Ok(QueryResult::from_matches(NodeResolver::resolve(tree, &expression)))
}

/// Like [`set_value`], but an unsupported path step is an error and the
/// tree is left alone.
pub fn try_set_value(tree: &mut Value, path: &str, value: Value) -> Result<bool, ParseError> {
    let expression = PathParser::parse_strict(path)?;
    Ok(Mutator::set(tree, &expression, value))
}

/// Like [`delete_value`], but an unsupported path step is an error and the
/// tree is left alone.
pub fn try_delete_value(tree: &mut Value, path: &str) -> Result<bool, ParseError> {
    let expression = PathParser::parse_strict(path)?;
    Ok(Mutator::delete(tree, &expression))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> Value {
        json!({"items": [{"id": "x", "qty": 1}, {"id": "y", "qty": 2}]})
    }

    #[test]
    fn test_get_cardinality() {
        let doc = fixture();
        assert_eq!(get_value(&doc, "$.missing"), QueryResult::None);
        assert_eq!(get_value(&doc, "items[0]/id"), QueryResult::One(&json!("x")));
        assert_eq!(
            get_value(&doc, "$..id"),
            QueryResult::Many(vec![&json!("x"), &json!("y")])
        );
    }

    #[test]
    fn test_scenario_filter_read_write_delete() {
        let mut doc = fixture();
        assert_eq!(get_value(&doc, "$.items[?(@.id=='y')].qty"), QueryResult::One(&json!(2)));

        assert!(set_value(&mut doc, "$.items[?(@.id=='y')].qty", json!(9)));
        assert_eq!(get_value(&doc, "$.items[?(@.id=='y')].qty"), QueryResult::One(&json!(9)));

        assert!(delete_value(&mut doc, "$.items[?(@.id=='y')]"));
        assert_eq!(doc, json!({"items": [{"id": "x", "qty": 1}]}));
    }

    #[test]
    fn test_unsupported_filter_degrades_to_parent() {
        let doc = fixture();
        // the filter step is dropped, leaving `$.items.qty`
        assert_eq!(get_value(&doc, "$.items[?(@.qty > 1)].qty"), QueryResult::None);
        assert_eq!(
            try_get_value(&doc, "$.items[?(@.qty > 1)].qty"),
            Err(ParseError::UnsupportedFilter("?(@.qty > 1)".into()))
        );
    }

    #[test]
    fn test_dropped_final_filter_mutates_parent() {
        let path = "$.items[?(@.qty > 1)]";

        let mut doc = fixture();
        assert_eq!(
            try_delete_value(&mut doc, path),
            Err(ParseError::UnsupportedFilter("?(@.qty > 1)".into()))
        );
        assert!(try_set_value(&mut doc, path, json!([])).is_err());
        assert_eq!(doc, fixture());

        assert!(delete_value(&mut doc, path));
        assert_eq!(doc, json!({}));

        let mut doc = fixture();
        assert!(set_value(&mut doc, path, json!([])));
        assert_eq!(doc, json!({"items": []}));
    }

    #[test]
    fn test_try_variants_leave_tree_alone_on_error() {
        let mut doc = fixture();
        assert!(try_set_value(&mut doc, "$.items[?(@.id)]", json!(0)).is_err());
        assert!(try_delete_value(&mut doc, "$.items[?(@.id)]").is_err());
        assert_eq!(doc, fixture());

        assert_eq!(try_set_value(&mut doc, "$.items[0].qty", json!(5)), Ok(true));
        assert_eq!(try_delete_value(&mut doc, "$.items[1]"), Ok(true));
        assert_eq!(doc, json!({"items": [{"id": "x", "qty": 5}]}));
    }
}
