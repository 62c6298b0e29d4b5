//! Path expression types shared by the parser, resolver and mutator.

use serde_json::Value;

/// One step of a slash-delimited path: `name` or `name[3]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Property name to move into.
    pub name: String,
    /// Optional element index inside the named sequence.
    pub index: Option<usize>,
}

impl Segment {
    pub fn new(name: impl Into<String>, index: Option<usize>) -> Self {
        Self { name: name.into(), index }
    }
}

/// Slash-delimited path, resolves to at most one node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimplePath {
    pub segments: Vec<Segment>,
}

impl SimplePath {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

/// Token of the query dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Root marker: `$`
    Root,
    /// Named access: `.name`, `['name']`
    Property(String),
    /// Positional access: `[0]`
    Index(usize),
    /// Recursive descent: `..`
    Recursive,
    /// Filter: `[?(@.id == 'x')]`
    Filter(FilterPredicate),
}

/// Query path, resolves to zero or more nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPath {
    pub tokens: Vec<Token>,
}

impl QueryPath {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

/// Comparison operators accepted inside a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,        // ==, ===
    NotEqual,     // !=, !==
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
}

impl ComparisonOperator {
    /// Parse an operator token. The strict-equality spellings map onto the
    /// loose ones.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "==" | "===" => Some(Self::Equal),
            "!=" | "!==" => Some(Self::NotEqual),
            "<" => Some(Self::Less),
            "<=" => Some(Self::LessEqual),
            ">" => Some(Self::Greater),
            ">=" => Some(Self::GreaterEqual),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
        }
    }
}

/// `@.<property> <operator> '<value>'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    /// Field of the candidate element that is compared.
    pub property: String,
    pub operator: ComparisonOperator,
    /// String literal on the right-hand side.
    pub value: String,
}

impl FilterPredicate {
    pub fn new(property: impl Into<String>, operator: ComparisonOperator, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Parsed path in either dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum PathExpression {
    Simple(SimplePath),
    Query(QueryPath),
}

impl PathExpression {
    pub fn is_query(&self) -> bool {
        matches!(self, PathExpression::Query(_))
    }
}

/// Outcome of a read.
///
/// The cardinality is part of the type: a query path that matched once gives
/// `One`, several matches give `Many`. Use [`QueryResult::into_vec`] when the
/// distinction does not matter.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult<'a> {
    None,
    One(&'a Value),
    Many(Vec<&'a Value>),
}

impl<'a> QueryResult<'a> {
    /// Collapse a list of matches by count.
    pub fn from_matches(mut matches: Vec<&'a Value>) -> Self {
        match matches.len() {
            0 => QueryResult::None,
            1 => QueryResult::One(matches.remove(0)),
            _ => QueryResult::Many(matches),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, QueryResult::None)
    }

    pub fn len(&self) -> usize {
        match self {
            QueryResult::None => 0,
            QueryResult::One(_) => 1,
            QueryResult::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The single match, if there is exactly one.
    pub fn one(&self) -> Option<&'a Value> {
        match self {
            QueryResult::One(value) => Some(*value),
            _ => None,
        }
    }

    pub fn into_vec(self) -> Vec<&'a Value> {
        match self {
            QueryResult::None => Vec::new(),
            QueryResult::One(value) => vec![value],
            QueryResult::Many(values) => values,
        }
    }

    /// Owned copy: `None` for no match, the bare value for one match, an
    /// array of values for several.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            QueryResult::None => None,
            QueryResult::One(value) => Some((*value).clone()),
            QueryResult::Many(values) => Some(Value::Array(values.iter().map(|v| (*v).clone()).collect())),
        }
    }
}

/// A component of a normalized location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathComponent {
    Key(String),
    Index(usize),
}

/// Normalized address of a node, from the root.
pub type Location = Vec<PathComponent>;
