//! In-place writes and deletions.
//!
//! Query paths are resolved to parent *locations* first, then each parent is
//! borrowed mutably on its own. Parents are visited in descending location
//! order: deeper nodes and later siblings first. A removal inside one parent
//! therefore never shifts the location of a parent that is still pending.

use serde_json::{Map, Value};

use crate::compare;
use crate::resolve::{child, parse_index, NodeResolver};
use crate::types::*;

/// Highest index a write may pad a sequence up to. Existing slots beyond it
/// can still be overwritten.
pub const MAX_PADDED_INDEX: usize = 1 << 20;

/// Applies `set` and `delete` to a tree.
pub struct Mutator;

impl Mutator {
    /// Write `value` at every node the expression denotes. Returns whether
    /// anything was written.
    pub fn set(tree: &mut Value, expression: &PathExpression, value: Value) -> bool {
        match expression {
            PathExpression::Simple(path) => Self::set_simple(tree, path, value),
            PathExpression::Query(path) => Self::set_query(tree, &path.tokens, value),
        }
    }

    /// Remove every node the expression denotes. Returns whether anything
    /// was removed.
    pub fn delete(tree: &mut Value, expression: &PathExpression) -> bool {
        match expression {
            PathExpression::Simple(path) => Self::delete_simple(tree, path),
            PathExpression::Query(path) => Self::delete_query(tree, &path.tokens),
        }
    }

    // ── simple paths ─────────────────────────────────────────────────────

    fn set_simple(tree: &mut Value, path: &SimplePath, value: Value) -> bool {
        let Some((last, intermediate)) = path.segments.split_last() else {
            log::debug!("Refusing to set an empty path");
            return false;
        };
        if !within_padding(tree, &path.segments) {
            log::debug!("Refusing to pad a sequence past index {MAX_PADDED_INDEX}");
            return false;
        }

        let mut current = tree;
        for segment in intermediate {
            current = match Self::step_or_create(current, segment) {
                Some(next) => next,
                None => {
                    log::debug!("Cannot create '{}': wrong node shape", segment.name);
                    return false;
                }
            };
        }

        Self::assign(current, last, value)
    }

    /// Move into `segment`, creating absent structure on the way.
    ///
    /// The only failure is an existing node of the wrong shape, and that is
    /// detected before anything below it is created.
    fn step_or_create<'a>(current: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
        let container = entry(current, &segment.name, segment.index.is_some())?;
        match segment.index {
            None => Some(container),
            Some(index) => match container {
                Value::Array(arr) => slot(arr, index),
                _ => None,
            },
        }
    }

    fn assign(current: &mut Value, segment: &Segment, value: Value) -> bool {
        match segment.index {
            None => {
                if current.is_null() {
                    *current = Value::Object(Map::new());
                }
                match current {
                    Value::Object(map) => {
                        map.insert(segment.name.clone(), value);
                        true
                    }
                    Value::Array(arr) => match parse_index(&segment.name).and_then(|idx| slot(arr, idx)) {
                        Some(target) => {
                            *target = value;
                            true
                        }
                        None => false,
                    },
                    _ => false,
                }
            }
            Some(index) => match entry(current, &segment.name, true) {
                Some(Value::Array(arr)) => match slot(arr, index) {
                    Some(target) => {
                        *target = value;
                        true
                    }
                    None => false,
                },
                _ => false,
            },
        }
    }

    fn delete_simple(tree: &mut Value, path: &SimplePath) -> bool {
        let Some((last, intermediate)) = path.segments.split_last() else {
            log::debug!("Refusing to delete an empty path");
            return false;
        };

        let mut current = tree;
        for segment in intermediate {
            current = match Self::step(current, segment) {
                Some(next) => next,
                None => return false,
            };
        }

        match last.index {
            None => remove_child(current, &last.name),
            Some(index) => match child_mut(current, &last.name) {
                Some(Value::Array(arr)) if index < arr.len() => {
                    arr.remove(index);
                    true
                }
                _ => false,
            },
        }
    }

    fn step<'a>(current: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
        let next = child_mut(current, &segment.name)?;
        match segment.index {
            None => Some(next),
            Some(index) => next.as_array_mut()?.get_mut(index),
        }
    }

    // ── query paths ──────────────────────────────────────────────────────

    fn set_query(tree: &mut Value, tokens: &[Token], value: Value) -> bool {
        let Some((last, parent_tokens)) = tokens.split_last() else {
            return false;
        };
        let mut modified = false;
        for location in Self::parent_locations(tree, parent_tokens) {
            let Some(parent) = NodeResolver::get_at_mut(tree, &location) else {
                continue;
            };
            modified |= Self::write(parent, last, &value);
        }
        modified
    }

    fn write(parent: &mut Value, token: &Token, value: &Value) -> bool {
        let target = match (token, parent) {
            (Token::Property(name), Value::Object(map)) => {
                map.insert(name.clone(), value.clone());
                return true;
            }
            (Token::Property(name), Value::Array(arr)) => parse_index(name).and_then(|idx| slot(arr, idx)),
            (Token::Index(index), Value::Array(arr)) => slot(arr, *index),
            (Token::Property(_) | Token::Index(_), _) => None,
            (Token::Filter(predicate), parent) => return Self::overwrite_matches(parent, predicate, value),
            (Token::Root | Token::Recursive, _) => {
                log::debug!("Cannot write through a trailing {token:?} token");
                return false;
            }
        };
        match target {
            Some(target) => {
                *target = value.clone();
                true
            }
            None => false,
        }
    }

    fn overwrite_matches(parent: &mut Value, predicate: &FilterPredicate, value: &Value) -> bool {
        let mut modified = false;
        match parent {
            Value::Array(arr) => {
                for item in arr.iter_mut().filter(|item| compare::matches(predicate, item)) {
                    *item = value.clone();
                    modified = true;
                }
            }
            Value::Object(map) => {
                for (_, item) in map.iter_mut().filter(|(_, item)| compare::matches(predicate, item)) {
                    *item = value.clone();
                    modified = true;
                }
            }
            _ => {}
        }
        modified
    }

    fn delete_query(tree: &mut Value, tokens: &[Token]) -> bool {
        let Some((last, parent_tokens)) = tokens.split_last() else {
            return false;
        };

        let mut modified = false;
        for location in Self::parent_locations(tree, parent_tokens) {
            let Some(parent) = NodeResolver::get_at_mut(tree, &location) else {
                continue;
            };
            modified |= Self::remove(parent, last);
        }
        modified
    }

    fn remove(parent: &mut Value, token: &Token) -> bool {
        match token {
            Token::Property(name) => remove_child(parent, name),
            Token::Index(index) => match parent {
                Value::Array(arr) if *index < arr.len() => {
                    arr.remove(*index);
                    true
                }
                _ => false,
            },
            Token::Filter(predicate) => match parent {
                Value::Array(arr) => {
                    let matched: Vec<usize> = arr
                        .iter()
                        .enumerate()
                        .filter(|(_, item)| compare::matches(predicate, item))
                        .map(|(idx, _)| idx)
                        .collect();
                    // Highest index first, so pending indices stay valid.
                    for idx in matched.iter().rev() {
                        arr.remove(*idx);
                    }
                    !matched.is_empty()
                }
                Value::Object(map) => {
                    let matched: Vec<String> = map
                        .iter()
                        .filter(|(_, item)| compare::matches(predicate, item))
                        .map(|(key, _)| key.clone())
                        .collect();
                    for key in &matched {
                        map.shift_remove(key);
                    }
                    !matched.is_empty()
                }
                _ => false,
            },
            Token::Root | Token::Recursive => {
                log::debug!("Cannot delete through a trailing {token:?} token");
                false
            }
        }
    }

    /// Distinct parent locations, deepest and right-most first.
    fn parent_locations(tree: &Value, parent_tokens: &[Token]) -> Vec<Location> {
        let mut locations = NodeResolver::locate_query(tree, parent_tokens);
        locations.sort_by(|a, b| b.cmp(a));
        locations.dedup();
        locations
    }
}

/// The child slot `name` of `current`, created when absent.
///
/// A `Null` node counts as absent: it is replaced by a mapping before the
/// child is looked up, and a `Null` child is replaced by an empty sequence
/// (`want_sequence`) or mapping.
fn entry<'a>(current: &'a mut Value, name: &str, want_sequence: bool) -> Option<&'a mut Value> {
    if current.is_null() {
        *current = Value::Object(Map::new());
    }
    let child = match current {
        Value::Object(map) => map.entry(name.to_string()).or_insert(Value::Null),
        Value::Array(arr) => slot(arr, parse_index(name)?)?,
        _ => return None,
    };
    if child.is_null() {
        *child = if want_sequence {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }
    Some(child)
}

/// Slot `index` of `arr`, padding with `Null` placeholders as needed.
/// `None` when reaching it would pad past [`MAX_PADDED_INDEX`].
fn slot(arr: &mut Vec<Value>, index: usize) -> Option<&mut Value> {
    if index >= arr.len() {
        if index > MAX_PADDED_INDEX {
            return None;
        }
        arr.resize(index + 1, Value::Null);
    }
    arr.get_mut(index)
}

/// Whether a simple `set` along `segments` only pads within
/// [`MAX_PADDED_INDEX`]. Checked up front so a refused write creates nothing.
fn within_padding(tree: &Value, segments: &[Segment]) -> bool {
    fn fits(arr: Option<&Vec<Value>>, index: usize) -> bool {
        index <= MAX_PADDED_INDEX || arr.is_some_and(|arr| index < arr.len())
    }

    let mut current = Some(tree);
    for segment in segments {
        if let (Some(Value::Array(arr)), Some(index)) = (current, parse_index(&segment.name)) {
            if !fits(Some(arr), index) {
                return false;
            }
        }
        let container = current.and_then(|node| child(node, &segment.name)).map(|(node, _)| node);
        current = match segment.index {
            None => container,
            Some(index) => {
                let arr = container.and_then(Value::as_array);
                if !fits(arr, index) {
                    return false;
                }
                arr.and_then(|arr| arr.get(index))
            }
        };
    }
    true
}

fn child_mut<'a>(value: &'a mut Value, name: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(name),
        Value::Array(arr) => arr.get_mut(parse_index(name)?),
        _ => None,
    }
}

fn remove_child(value: &mut Value, name: &str) -> bool {
    match value {
        Value::Object(map) => map.shift_remove(name).is_some(),
        Value::Array(arr) => match parse_index(name) {
            Some(idx) if idx < arr.len() => {
                arr.remove(idx);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PathParser;
    use serde_json::json;

    fn set(tree: &mut Value, path: &str, value: Value) -> bool {
        Mutator::set(tree, &PathParser::parse(path), value)
    }

    fn delete(tree: &mut Value, path: &str) -> bool {
        Mutator::delete(tree, &PathParser::parse(path))
    }

    #[test]
    fn test_set_simple_creates_structure() {
        let mut tree = json!({});
        assert!(set(&mut tree, "a/b/c", json!(1)));
        assert_eq!(tree, json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_set_simple_creates_sequences_for_indexed_segments() {
        let mut tree = json!({});
        assert!(set(&mut tree, "a/list[1]/name", json!("n")));
        assert_eq!(tree, json!({"a": {"list": [null, {"name": "n"}]}}));
    }

    #[test]
    fn test_set_simple_pads_sequence() {
        let mut tree = json!({"a": []});
        assert!(set(&mut tree, "a[5]", json!("v")));
        assert_eq!(tree, json!({"a": [null, null, null, null, null, "v"]}));
    }

    #[test]
    fn test_set_simple_never_shrinks() {
        let mut tree = json!({"a": [1, 2, 3]});
        assert!(set(&mut tree, "a[0]", json!(9)));
        assert_eq!(tree, json!({"a": [9, 2, 3]}));
    }

    #[test]
    fn test_set_simple_wrong_shape_is_untouched() {
        let original = json!({"a": {"b": {"k": 1}}});
        let mut tree = original.clone();
        assert!(!set(&mut tree, "a/b[2]/c", json!(1)));
        assert_eq!(tree, original);

        let original = json!({"a": "scalar"});
        let mut tree = original.clone();
        assert!(!set(&mut tree, "a/b", json!(1)));
        assert!(!set(&mut tree, "a/b/c", json!(1)));
        assert_eq!(tree, original);
    }

    #[test]
    fn test_set_simple_replaces_null_intermediate() {
        let mut tree = json!({"a": null});
        assert!(set(&mut tree, "a/b", json!(1)));
        assert_eq!(tree, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_set_empty_path_fails() {
        let mut tree = json!({"a": 1});
        assert!(!set(&mut tree, "", json!(2)));
        assert!(!set(&mut tree, "///", json!(2)));
        assert_eq!(tree, json!({"a": 1}));
    }

    #[test]
    fn test_delete_simple() {
        let mut tree = json!({"a": {"b": [1, 2, 3], "c": true}});
        assert!(delete(&mut tree, "a/b[1]"));
        assert!(delete(&mut tree, "a/c"));
        assert_eq!(tree, json!({"a": {"b": [1, 3]}}));
    }

    #[test]
    fn test_delete_simple_misses() {
        let original = json!({"a": {"b": [1]}});
        let mut tree = original.clone();
        assert!(!delete(&mut tree, "a/x"));
        assert!(!delete(&mut tree, "x/y"));
        assert!(!delete(&mut tree, "a/b[3]"));
        assert!(!delete(&mut tree, "a[0]"));
        assert_eq!(tree, original);
    }

    #[test]
    fn test_set_query_property_on_matched_parents() {
        let mut tree = json!({"list": [{"id": 1}, {"id": 2}, "scalar"]});
        assert!(set(&mut tree, "$.list..seen", json!(true)));
        assert_eq!(
            tree,
            json!({"list": [{"id": 1, "seen": true}, {"id": 2, "seen": true}, "scalar"]})
        );

        assert!(set(&mut tree, "$.list[?(@.id != '1')].id", json!(7)));
        assert_eq!(
            tree,
            json!({"list": [{"id": 1, "seen": true}, {"id": 7, "seen": true}, "scalar"]})
        );
    }

    #[test]
    fn test_set_query_adds_property_to_each_parent() {
        let mut tree = json!({"list": [{"id": "a"}, {"id": "b"}]});
        assert!(set(&mut tree, "$.list[?(@.id != 'none')].flag", json!(1)));
        assert_eq!(tree, json!({"list": [{"id": "a", "flag": 1}, {"id": "b", "flag": 1}]}));
    }

    #[test]
    fn test_set_query_after_recursive_writes_every_mapping() {
        let mut tree = json!({"name": "a", "child": {"name": "b", "other": {}}});
        assert!(set(&mut tree, "$..name", json!("z")));
        assert_eq!(
            tree,
            json!({"name": "z", "child": {"name": "z", "other": {"name": "z"}}})
        );
    }

    #[test]
    fn test_set_query_after_recursive_adds_missing_property() {
        let mut tree = json!({"a": {"b": {}}});
        assert!(set(&mut tree, "$..name", json!(1)));
        assert_eq!(tree, json!({"a": {"b": {"name": 1}, "name": 1}, "name": 1}));
    }

    #[test]
    fn test_set_query_index_pads() {
        let mut tree = json!({"a": [1]});
        assert!(set(&mut tree, "$.a[3]", json!(4)));
        assert_eq!(tree, json!({"a": [1, null, null, 4]}));
        assert!(!set(&mut tree, "$.missing[0]", json!(1)));
    }

    #[test]
    fn test_set_index_past_padding_limit_fails() {
        let original = json!({"a": [1, 2]});
        for path in [
            "a[18446744073709551615]",
            "$.a[18446744073709551615]",
            "a/18446744073709551615",
            "$.a.18446744073709551615",
            "a[99999999999]",
            "fresh[99999999999]/x",
            "fresh/list[99999999999]",
        ] {
            let mut tree = original.clone();
            assert!(!set(&mut tree, path, json!(1)), "{path}");
            assert_eq!(tree, original, "{path}");
        }
    }

    #[test]
    fn test_set_pads_up_to_limit() {
        let mut tree = json!({});
        let path = format!("a[{MAX_PADDED_INDEX}]");
        assert!(set(&mut tree, &path, json!(1)));
        assert_eq!(tree["a"].as_array().map(Vec::len), Some(MAX_PADDED_INDEX + 1));

        // slots that already exist past the limit stay writable
        let mut tree = json!({"a": Value::Array(vec![Value::Null; MAX_PADDED_INDEX + 2])});
        let path = format!("a[{}]", MAX_PADDED_INDEX + 1);
        assert!(set(&mut tree, &path, json!("last")));
        assert_eq!(tree["a"][MAX_PADDED_INDEX + 1], json!("last"));
    }

    #[test]
    fn test_set_query_filter_overwrites_matches() {
        let mut tree = json!({"m": {"a": {"k": "x"}, "b": {"k": "y"}}});
        assert!(set(&mut tree, "$.m[?(@.k=='x')]", json!({"k": "replaced"})));
        assert_eq!(tree, json!({"m": {"a": {"k": "replaced"}, "b": {"k": "y"}}}));
        assert!(!set(&mut tree, "$.m[?(@.k=='none')]", json!(0)));
    }

    #[test]
    fn test_set_query_trailing_root_fails() {
        let mut tree = json!({"a": 1});
        assert!(!set(&mut tree, "$", json!(2)));
        assert!(!set(&mut tree, "$..", json!(2)));
        assert_eq!(tree, json!({"a": 1}));
    }

    #[test]
    fn test_delete_filter_descending_order() {
        let mut tree = json!({"a": [{"x": 1}, {"x": 2}, {"x": 1}, {"x": 2}]});
        assert!(delete(&mut tree, "$.a[?(@.x=='1')]"));
        assert_eq!(tree, json!({"a": [{"x": 2}, {"x": 2}]}));
    }

    #[test]
    fn test_delete_filter_on_mapping() {
        let mut tree = json!({"m": {"a": {"k": 1}, "b": {"k": 2}, "c": {"k": 1}}});
        assert!(delete(&mut tree, "$.m[?(@.k=='1')]"));
        assert_eq!(tree, json!({"m": {"b": {"k": 2}}}));
    }

    #[test]
    fn test_delete_recursive_property_everywhere() {
        let mut tree = json!({"tmp": 1, "a": [{"tmp": 2, "keep": 1}, {"b": {"tmp": 3}}]});
        assert!(delete(&mut tree, "$..tmp"));
        assert_eq!(tree, json!({"a": [{"keep": 1}, {"b": {}}]}));
    }

    #[test]
    fn test_delete_nested_filters_across_parents() {
        let mut tree = json!({
            "groups": [
                {"kind": "x", "items": [{"kind": "x"}, {"kind": "y"}]},
                {"kind": "y", "items": [{"kind": "x"}]},
                {"kind": "x"}
            ]
        });
        assert!(delete(&mut tree, "$..[?(@.kind=='x')]"));
        assert_eq!(tree, json!({"groups": [{"kind": "y", "items": []}]}));
    }

    #[test]
    fn test_delete_query_index() {
        let mut tree = json!({"a": [1, 2, 3]});
        assert!(delete(&mut tree, "$.a[0]"));
        assert!(!delete(&mut tree, "$.a[5]"));
        assert_eq!(tree, json!({"a": [2, 3]}));
    }
}
