//! Node resolution: which nodes of a tree a parsed path denotes.

use serde_json::Value;

use crate::compare;
use crate::types::*;

/// A resolved node together with its location from the root.
type Located<'a> = (&'a Value, Location);

/// Resolves parsed paths against a tree.
pub struct NodeResolver;

impl NodeResolver {
    /// Every node the expression denotes. A simple path yields at most one.
    pub fn resolve<'a>(tree: &'a Value, expression: &PathExpression) -> Vec<&'a Value> {
        match expression {
            PathExpression::Simple(path) => Self::resolve_simple(tree, path).into_iter().collect(),
            PathExpression::Query(path) => Self::resolve_query(tree, &path.tokens),
        }
    }

    /// Locations of every node the expression denotes.
    pub fn locate(tree: &Value, expression: &PathExpression) -> Vec<Location> {
        match expression {
            PathExpression::Simple(path) => Self::walk_simple(tree, path)
                .map(|(_, location)| location)
                .into_iter()
                .collect(),
            PathExpression::Query(path) => Self::locate_query(tree, &path.tokens),
        }
    }

    pub fn resolve_simple<'a>(tree: &'a Value, path: &SimplePath) -> Option<&'a Value> {
        Self::walk_simple(tree, path).map(|(value, _)| value)
    }

    pub fn resolve_query<'a>(tree: &'a Value, tokens: &[Token]) -> Vec<&'a Value> {
        Self::eval_tokens(tree, tokens)
            .into_iter()
            .map(|(value, _)| value)
            .collect()
    }

    pub fn locate_query(tree: &Value, tokens: &[Token]) -> Vec<Location> {
        Self::eval_tokens(tree, tokens)
            .into_iter()
            .map(|(_, location)| location)
            .collect()
    }

    fn walk_simple<'a>(tree: &'a Value, path: &SimplePath) -> Option<Located<'a>> {
        let mut current = tree;
        let mut location = Location::new();

        for segment in &path.segments {
            let (child, component) = child(current, &segment.name)?;
            location.push(component);
            current = child;

            if let Some(index) = segment.index {
                let Value::Array(arr) = current else {
                    log::trace!("'{}' is not a sequence", segment.name);
                    return None;
                };
                current = arr.get(index)?;
                location.push(PathComponent::Index(index));
            }
        }

        Some((current, location))
    }

    fn eval_tokens<'a>(tree: &'a Value, tokens: &[Token]) -> Vec<Located<'a>> {
        let mut candidates: Vec<Located<'a>> = vec![(tree, Location::new())];

        for (position, token) in tokens.iter().enumerate() {
            let mut next = Vec::new();

            match token {
                Token::Root => next.push((tree, Location::new())),
                Token::Property(name) => {
                    for (value, location) in &candidates {
                        if let Some((child, component)) = child(*value, name) {
                            next.push((child, extend(location, component)));
                        }
                    }
                }
                Token::Index(index) => {
                    for (value, location) in &candidates {
                        if let Value::Array(arr) = *value {
                            if let Some(child) = arr.get(*index) {
                                next.push((child, extend(location, PathComponent::Index(*index))));
                            }
                        }
                    }
                }
                Token::Recursive => {
                    let include_self = position == 0 || tokens[position - 1] == Token::Root;
                    for (value, location) in &candidates {
                        if include_self {
                            next.push((*value, location.clone()));
                        }
                        Self::descend(*value, location, &mut next);
                    }
                }
                Token::Filter(predicate) => {
                    for (value, location) in &candidates {
                        Self::filter(*value, location, predicate, &mut next);
                    }
                }
            }

            candidates = next;
        }

        candidates
    }

    /// Pre-order walk over every descendant of `value`, excluding itself.
    fn descend<'a>(value: &'a Value, location: &Location, results: &mut Vec<Located<'a>>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let child_location = extend(location, PathComponent::Key(key.clone()));
                    results.push((child, child_location.clone()));
                    Self::descend(child, &child_location, results);
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate() {
                    let child_location = extend(location, PathComponent::Index(idx));
                    results.push((child, child_location.clone()));
                    Self::descend(child, &child_location, results);
                }
            }
            _ => {}
        }
    }

    fn filter<'a>(
        value: &'a Value,
        location: &Location,
        predicate: &FilterPredicate,
        results: &mut Vec<Located<'a>>,
    ) {
        match value {
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate() {
                    if compare::matches(predicate, child) {
                        results.push((child, extend(location, PathComponent::Index(idx))));
                    }
                }
            }
            Value::Object(map) => {
                for (key, child) in map {
                    if compare::matches(predicate, child) {
                        results.push((child, extend(location, PathComponent::Key(key.clone()))));
                    }
                }
            }
            _ => {}
        }
    }

    /// Follow a location from the root.
    pub fn get_at<'a>(tree: &'a Value, location: &[PathComponent]) -> Option<&'a Value> {
        let mut current = tree;
        for component in location {
            current = match (current, component) {
                (Value::Object(map), PathComponent::Key(key)) => map.get(key)?,
                (Value::Array(arr), PathComponent::Index(idx)) => arr.get(*idx)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Follow a location from the root, mutably.
    pub fn get_at_mut<'a>(tree: &'a mut Value, location: &[PathComponent]) -> Option<&'a mut Value> {
        let mut current = tree;
        for component in location {
            current = match (current, component) {
                (Value::Object(map), PathComponent::Key(key)) => map.get_mut(key)?,
                (Value::Array(arr), PathComponent::Index(idx)) => arr.get_mut(*idx)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Named child of a node: a mapping entry, or a sequence element when the
/// name is a canonical decimal index.
pub(crate) fn child<'a>(value: &'a Value, name: &str) -> Option<(&'a Value, PathComponent)> {
    match value {
        Value::Object(map) => map
            .get(name)
            .map(|child| (child, PathComponent::Key(name.to_string()))),
        Value::Array(arr) => {
            let idx = parse_index(name)?;
            arr.get(idx).map(|child| (child, PathComponent::Index(idx)))
        }
        _ => None,
    }
}

/// Canonical non-negative integer: digits only, no leading zero.
pub(crate) fn parse_index(name: &str) -> Option<usize> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == b'0') {
        return None;
    }
    if !bytes.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

fn extend(location: &Location, component: PathComponent) -> Location {
    let mut next = Vec::with_capacity(location.len() + 1);
    next.extend_from_slice(location);
    next.push(component);
    next
}
