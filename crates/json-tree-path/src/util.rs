//! Path expression helpers.

use std::fmt;

use crate::types::*;

/// Render a parsed expression back into path syntax.
pub fn path_expression_to_string(expression: &PathExpression) -> String {
    match expression {
        PathExpression::Simple(path) => simple_path_to_string(path),
        PathExpression::Query(path) => query_path_to_string(path),
    }
}

pub fn simple_path_to_string(path: &SimplePath) -> String {
    path.segments
        .iter()
        .map(|segment| match segment.index {
            Some(index) => format!("{}[{}]", segment.name, index),
            None => segment.name.clone(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub fn query_path_to_string(path: &QueryPath) -> String {
    let mut out = String::new();
    let mut after_recursive = false;

    for (position, token) in path.tokens.iter().enumerate() {
        match token {
            Token::Root => out.push('$'),
            Token::Property(name) if is_bare_name(name) => {
                if position > 0 && !after_recursive {
                    out.push('.');
                }
                out.push_str(name);
            }
            Token::Property(name) => {
                let quote = if name.contains('\'') { '"' } else { '\'' };
                out.push('[');
                out.push(quote);
                out.push_str(name);
                out.push(quote);
                out.push(']');
            }
            Token::Index(index) => out.push_str(&format!("[{index}]")),
            Token::Recursive => out.push_str(".."),
            Token::Filter(predicate) => out.push_str(&format!("[?({predicate})]")),
        }
        after_recursive = *token == Token::Recursive;
    }

    out
}

/// Property names a path reads, in order of appearance. Filter fields are
/// included.
pub fn get_accessed_properties(expression: &PathExpression) -> Vec<String> {
    match expression {
        PathExpression::Simple(path) => path.segments.iter().map(|s| s.name.clone()).collect(),
        PathExpression::Query(path) => path
            .tokens
            .iter()
            .filter_map(|token| match token {
                Token::Property(name) => Some(name.clone()),
                Token::Filter(predicate) => Some(predicate.property.clone()),
                _ => None,
            })
            .collect(),
    }
}

fn is_bare_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| matches!(c, '.' | '[' | ']' | '\'' | '"' | '$'))
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@.{} {} '{}'", self.property, self.operator.symbol(), self.value)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&path_expression_to_string(self))
    }
}
