//! Filter predicate evaluation.
//!
//! Predicates compare a field of the candidate against a string literal.
//! Equality is loose: the literal is coerced towards the field's type, so
//! `@.qty == '2'` matches a numeric `2`. Ordering compares strings
//! lexicographically and everything else numerically.

use std::cmp::Ordering;

use serde_json::Value;

use crate::types::{ComparisonOperator, FilterPredicate};

/// Check whether `candidate` satisfies `predicate`.
///
/// A candidate that is not a mapping, or lacks the field, has an absent
/// field: it never equals anything and never orders against anything.
pub fn matches(predicate: &FilterPredicate, candidate: &Value) -> bool {
    let field = match candidate {
        Value::Object(map) => map.get(&predicate.property),
        _ => None,
    };
    compare(predicate.operator, field, &predicate.value)
}

pub fn compare(operator: ComparisonOperator, field: Option<&Value>, literal: &str) -> bool {
    match operator {
        ComparisonOperator::Equal => loose_equals(field, literal),
        ComparisonOperator::NotEqual => !loose_equals(field, literal),
        ComparisonOperator::Less => ordering(field, literal) == Some(Ordering::Less),
        ComparisonOperator::LessEqual => matches!(
            ordering(field, literal),
            Some(Ordering::Less | Ordering::Equal)
        ),
        ComparisonOperator::Greater => ordering(field, literal) == Some(Ordering::Greater),
        ComparisonOperator::GreaterEqual => matches!(
            ordering(field, literal),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

fn loose_equals(field: Option<&Value>, literal: &str) -> bool {
    match field {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => s == literal,
        Some(Value::Number(n)) => match (n.as_f64(), to_number(literal)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        Some(Value::Bool(b)) => to_number(literal) == Some(bool_to_number(*b)),
        Some(v @ (Value::Array(_) | Value::Object(_))) => to_primitive_string(v) == literal,
    }
}

fn ordering(field: Option<&Value>, literal: &str) -> Option<Ordering> {
    let field = field?;
    match field {
        Value::String(s) => Some(s.as_str().cmp(literal)),
        Value::Array(_) | Value::Object(_) => Some(to_primitive_string(field).as_str().cmp(literal)),
        Value::Number(n) => n.as_f64()?.partial_cmp(&to_number(literal)?),
        Value::Bool(b) => bool_to_number(*b).partial_cmp(&to_number(literal)?),
        Value::Null => 0.0_f64.partial_cmp(&to_number(literal)?),
    }
}

fn bool_to_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Numeric reading of a literal. Blank strings read as zero, anything that
/// is not a plain decimal number reads as no number at all.
pub fn to_number(literal: &str) -> Option<f64> {
    let trimmed = literal.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// String form of a container, as used when one is compared with a string.
fn to_primitive_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(to_primitive_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
