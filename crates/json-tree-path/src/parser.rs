//! Path parser for both addressing dialects.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::types::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unsupported filter expression: [{0}]")]
    UnsupportedFilter(String),
    #[error("Unterminated bracket at offset {0}")]
    UnterminatedBracket(usize),
    #[error("Invalid bracket selector: [{0}]")]
    InvalidBracket(String),
}

fn segment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)\[(\d+)\]$").unwrap())
}

fn predicate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^@\.([\w$-]+)\s*(===|!==|==|!=|>=|<=|>|<)\s*'([^']*)'$").unwrap()
    })
}

/// Parser for simple and query paths.
///
/// Parsing never fails outright. Steps that cannot be understood are left
/// out of the expression and reported as diagnostics; [`PathParser::parse`]
/// logs them, [`PathParser::parse_strict`] turns the first one into an error.
pub struct PathParser<'a> {
    input: &'a str,
    pos: usize,
    diagnostics: Vec<ParseError>,
}

impl<'a> PathParser<'a> {
    /// Dialect rule: a path is a query iff it starts with `$` or contains
    /// `..`, `[?(` or `==`. Everything else is a simple path.
    pub fn is_query(input: &str) -> bool {
        input.starts_with('$')
            || input.contains("..")
            || input.contains("[?(")
            || input.contains("==")
    }

    /// Parse a path, logging and dropping any step that cannot be parsed.
    pub fn parse(input: &'a str) -> PathExpression {
        let (expression, diagnostics) = Self::parse_with_diagnostics(input);
        for diagnostic in &diagnostics {
            log::warn!("Skipping path step in '{input}': {diagnostic}");
        }
        expression
    }

    /// Parse a path, failing on the first step that cannot be parsed.
    pub fn parse_strict(input: &'a str) -> Result<PathExpression, ParseError> {
        let (expression, mut diagnostics) = Self::parse_with_diagnostics(input);
        if diagnostics.is_empty() {
            Ok(expression)
        } else {
            Err(diagnostics.remove(0))
        }
    }

    /// Parse a path and return the dropped steps alongside the expression.
    pub fn parse_with_diagnostics(input: &'a str) -> (PathExpression, Vec<ParseError>) {
        if Self::is_query(input) {
            let (query, diagnostics) = Self::parse_query(input);
            (PathExpression::Query(query), diagnostics)
        } else {
            (PathExpression::Simple(Self::parse_simple(input)), Vec::new())
        }
    }

    /// Parse the slash-delimited grammar.
    pub fn parse_simple(input: &str) -> SimplePath {
        let segments = input
            .split('/')
            .filter(|part| !part.is_empty())
            .map(Self::parse_segment)
            .collect();
        SimplePath::new(segments)
    }

    fn parse_segment(part: &str) -> Segment {
        if let Some(caps) = segment_regex().captures(part) {
            if let Ok(index) = caps[2].parse::<usize>() {
                return Segment::new(&caps[1], Some(index));
            }
        }
        Segment::new(part, None)
    }

    /// Parse the query grammar regardless of the dialect rule.
    pub fn parse_query(input: &'a str) -> (QueryPath, Vec<ParseError>) {
        let mut parser = Self {
            input,
            pos: 0,
            diagnostics: Vec::new(),
        };
        let tokens = parser.parse_tokens();
        (QueryPath::new(tokens), parser.diagnostics)
    }

    fn parse_tokens(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        if self.peek() == Some('$') {
            self.advance();
            tokens.push(Token::Root);
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.advance();
                    if self.peek() == Some('.') {
                        self.advance();
                        tokens.push(Token::Recursive);
                    }
                }
                '[' => {
                    if let Some(token) = self.parse_bracket() {
                        tokens.push(token);
                    }
                }
                _ => {
                    let name = self.parse_name();
                    tokens.push(Token::Property(name));
                }
            }
        }

        tokens
    }

    /// Bare property name: everything up to the next `.` or `[`.
    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '.' || c == '[' {
                break;
            }
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_bracket(&mut self) -> Option<Token> {
        let open = self.pos;
        self.advance();
        let body_start = self.pos;

        let mut quote: Option<char> = None;
        while let Some(c) = self.peek() {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '\'' || c == '"' => quote = Some(c),
                None if c == ']' => break,
                None => {}
            }
            self.advance();
        }

        if self.is_at_end() {
            self.diagnostics.push(ParseError::UnterminatedBracket(open));
            return None;
        }

        let body = &self.input[body_start..self.pos];
        self.advance();

        match Self::parse_bracket_body(body.trim()) {
            Ok(token) => Some(token),
            Err(err) => {
                self.diagnostics.push(err);
                None
            }
        }
    }

    fn parse_bracket_body(body: &str) -> Result<Token, ParseError> {
        if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
            return body
                .parse::<usize>()
                .map(Token::Index)
                .map_err(|_| ParseError::InvalidBracket(body.to_string()));
        }

        if let Some(name) = Self::unquote(body) {
            return Ok(Token::Property(name.to_string()));
        }

        if body.starts_with('?') {
            return Self::parse_filter(body).map(Token::Filter);
        }

        Err(ParseError::InvalidBracket(body.to_string()))
    }

    fn unquote(body: &str) -> Option<&str> {
        let first = body.chars().next()?;
        if (first == '\'' || first == '"') && body.len() >= 2 && body.ends_with(first) {
            let inner = &body[1..body.len() - 1];
            if !inner.contains(first) {
                return Some(inner);
            }
        }
        None
    }

    fn parse_filter(body: &str) -> Result<FilterPredicate, ParseError> {
        let unsupported = || ParseError::UnsupportedFilter(body.to_string());

        let inner = body
            .strip_prefix("?(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(unsupported)?;
        let caps = predicate_regex().captures(inner.trim()).ok_or_else(unsupported)?;
        let operator = ComparisonOperator::from_symbol(&caps[2]).ok_or_else(unsupported)?;

        Ok(FilterPredicate::new(&caps[1], operator, &caps[3]))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}
