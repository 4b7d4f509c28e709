//! The document query capability.
//!
//! The engine never walks documents itself; it hands an [`Expression`] to a
//! [`Query`] implementation and gets a [`Fragment`] back. [`PathQuery`] is the
//! provided implementation and understands a small path/predicate language:
//!
//! ```text
//! #(client_id==2)        first element of an array whose client_id is 2
//! #(client_id==2)#       all such elements
//! #(price>100)#|#(title=="Desk")
//!                        steps chained with '|', each narrowing the last
//! orders.0.product_id    member and index access
//! ```
//!
//! Literals are JSON literals. Operators are `==` (or `=`), `!=`, `<`, `<=`,
//! `>` and `>=`. A field name holding spaces, quotes, operator characters or
//! the step separator is written as a JSON string: `#("row id"==2)`.

use std::cmp::Ordering;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Number, Value};
use tracing::trace;

use crate::error::{DocjoinError, Result};
use crate::scalar::Operator;

lazy_static! {
    static ref PREDICATE: Regex =
        Regex::new(r#"^#\(\s*("(?:[^"\\]|\\.)*"|[^\s=!<>()"]+)\s*(==|!=|<=|>=|=|<|>)\s*(.+?)\s*\)(#?)$"#)
            .expect("predicate pattern compiles");
    static ref BARE_FIELD: Regex =
        Regex::new(r#"^[^\s=!<>()"|\\]+$"#).expect("field pattern compiles");
    static ref PATH: Regex = Regex::new(r"^[^#()\s|]+$").expect("path pattern compiles");
}

// ------------- Expression -------------
/// An opaque query expression as understood by a [`Query`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Expression(String);

impl Expression {
    pub const SEPARATOR: char = '|';

    pub fn new(expression: impl Into<String>) -> Self {
        Self(expression.into())
    }
    /// A single predicate step selecting the first match, or all matches when `all` is set.
    pub fn predicate(field: &str, operator: Operator, literal: &str, all: bool) -> Self {
        let suffix = if all { "#" } else { "" };
        let field = if BARE_FIELD.is_match(field) {
            field.to_string()
        } else {
            Value::String(field.to_string()).to_string()
        };
        Self(format!("#({}{}{}){}", field, operator, literal, suffix))
    }
    /// Appends `next` so that it runs over the result of `self`.
    pub fn chain(self, next: Expression) -> Self {
        if self.0.is_empty() {
            return next;
        }
        Self(format!("{}{}{}", self.0, Self::SEPARATOR, next.0))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Expression {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Expression {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

// ------------- Fragment -------------
/// The outcome of a query.
///
/// `Missing` is the explicit no-match sentinel, which is not the same thing as
/// a multi-match that happened to select nothing (`Many(vec![])`).
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Missing,
    One(Value),
    Many(Vec<Value>),
}

impl Fragment {
    pub fn is_missing(&self) -> bool {
        matches!(self, Fragment::Missing)
    }
    pub fn len(&self) -> usize {
        match self {
            Fragment::Missing => 0,
            Fragment::One(_) => 1,
            Fragment::Many(values) => values.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Fragment::Missing => Vec::new(),
            Fragment::One(value) => vec![value],
            Fragment::Many(values) => values,
        }
    }
}

/// Locates the fragment(s) of a parsed document selected by an expression.
pub trait Query {
    fn query(&self, document: &Value, expression: &Expression) -> Result<Fragment>;
}

// ------------- PathQuery -------------
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Predicate {
        field: String,
        operator: Operator,
        literal: Value,
        all: bool,
    },
    Path(Vec<String>),
}

/// Borrowed intermediate results, cloned into a [`Fragment`] only at the end.
enum Matches<'d> {
    Missing,
    One(&'d Value),
    Many(Vec<&'d Value>),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PathQuery;

impl PathQuery {
    pub fn new() -> Self {
        Self
    }

    fn compile(expression: &str) -> Result<Vec<Step>> {
        let mut steps = Vec::new();
        for (offset, step) in split_steps(expression) {
            steps.push(parse_step(step.trim(), offset)?);
        }
        Ok(steps)
    }
}

impl Query for PathQuery {
    fn query(&self, document: &Value, expression: &Expression) -> Result<Fragment> {
        if expression.is_empty() {
            return Ok(Fragment::One(document.clone()));
        }
        let steps = Self::compile(expression.as_str())?;
        let mut current = Matches::One(document);
        for step in &steps {
            current = apply(step, current);
            if let Matches::Missing = current {
                break;
            }
        }
        let fragment = match current {
            Matches::Missing => Fragment::Missing,
            Matches::One(value) => Fragment::One(value.clone()),
            Matches::Many(values) => Fragment::Many(values.into_iter().cloned().collect()),
        };
        trace!(%expression, matched = fragment.len(), "path query");
        Ok(fragment)
    }
}

// Splits on '|' outside of string literals, keeping the byte offset of every step.
fn split_steps(expression: &str) -> Vec<(usize, &str)> {
    let mut steps = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in expression.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == Expression::SEPARATOR {
            steps.push((start, &expression[start..i]));
            start = i + c.len_utf8();
        }
    }
    steps.push((start, &expression[start..]));
    steps
}

fn parse_step(step: &str, offset: usize) -> Result<Step> {
    if step.is_empty() {
        return Err(DocjoinError::parse("empty step in expression", offset));
    }
    if let Some(captures) = PREDICATE.captures(step) {
        let field = unquote(&captures[1], offset)?;
        let operator = captures[2]
            .parse::<Operator>()
            .map_err(|e| DocjoinError::parse(e.to_string(), offset))?;
        let literal: Value = serde_json::from_str(&captures[3]).map_err(|e| {
            DocjoinError::parse(format!("invalid literal {}: {}", &captures[3], e), offset)
        })?;
        if matches!(literal, Value::Array(_) | Value::Object(_)) {
            return Err(DocjoinError::parse(
                format!("literal {} is not a scalar", &captures[3]),
                offset,
            ));
        }
        return Ok(Step::Predicate {
            field,
            operator,
            literal,
            all: !captures[4].is_empty(),
        });
    }
    if PATH.is_match(step) {
        return Ok(Step::Path(step.split('.').map(str::to_string).collect()));
    }
    Err(DocjoinError::parse(format!("unrecognized step: {}", step), offset))
}

fn unquote(field: &str, offset: usize) -> Result<String> {
    if !field.starts_with('"') {
        return Ok(field.to_string());
    }
    serde_json::from_str(field)
        .map_err(|e| DocjoinError::parse(format!("invalid field name {}: {}", field, e), offset))
}

fn apply<'d>(step: &Step, current: Matches<'d>) -> Matches<'d> {
    match step {
        Step::Predicate {
            field,
            operator,
            literal,
            all,
        } => {
            let candidates: Vec<&'d Value> = match current {
                Matches::Missing => return Matches::Missing,
                Matches::One(Value::Array(items)) => items.iter().collect(),
                Matches::One(value) => vec![value],
                Matches::Many(values) => values,
            };
            let mut matched = candidates
                .into_iter()
                .filter(|candidate| holds(candidate, field, *operator, literal));
            if *all {
                Matches::Many(matched.collect())
            } else {
                match matched.next() {
                    Some(value) => Matches::One(value),
                    None => Matches::Missing,
                }
            }
        }
        Step::Path(segments) => match current {
            Matches::Missing => Matches::Missing,
            Matches::One(value) => match walk(value, segments) {
                Some(found) => Matches::One(found),
                None => Matches::Missing,
            },
            Matches::Many(values) => Matches::Many(
                values
                    .into_iter()
                    .filter_map(|value| walk(value, segments))
                    .collect(),
            ),
        },
    }
}

fn walk<'d>(mut value: &'d Value, segments: &[String]) -> Option<&'d Value> {
    for segment in segments {
        value = match value {
            Value::Object(members) => members.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(value)
}

enum Comparison {
    Ordered(Ordering),
    Equality(bool),
    Incomparable,
}

fn holds(candidate: &Value, field: &str, operator: Operator, literal: &Value) -> bool {
    // an absent field satisfies no operator, not even !=
    let Some(value) = candidate.get(field) else {
        return false;
    };
    match compare(value, literal) {
        Comparison::Ordered(ordering) => match operator {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
        },
        Comparison::Equality(equal) => match operator {
            Operator::Eq => equal,
            Operator::Ne => !equal,
            _ => false,
        },
        Comparison::Incomparable => operator == Operator::Ne,
    }
}

fn compare(left: &Value, right: &Value) -> Comparison {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match compare_numbers(a, b) {
            Some(ordering) => Comparison::Ordered(ordering),
            None => Comparison::Incomparable,
        },
        (Value::String(a), Value::String(b)) => Comparison::Ordered(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Comparison::Equality(a == b),
        (Value::Null, Value::Null) => Comparison::Equality(true),
        _ => Comparison::Incomparable,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}
