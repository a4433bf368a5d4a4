//! Tokenizer and parser for a column's free-text filter.
//!
//! A filter cell holds one or more conditions, e.g. `> 12345`, `IN a,b,c`,
//! `LIKE foo` or `> 100; < 200`. Operators are `>= <= != = ! < > IN LIKE`;
//! `;` separates stacked conditions.
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;
use tracing::debug;

use super::condition::{FilterCondition, FilterOp, ParseError};

/// User-facing description of the filter grammar.
pub const CONDITION_HELP: &str = "Valid values are one of (=, >, <, !, >=, <=, LIKE) followed by a value separated by a space.\n\
Or 'IN', followed by a list of values separated by commas.\n\
Separate multiple conditions with a semicolon.\n\
Examples:  > 12345; ! 3000, IN a,b,c,d";

lazy_static! {
    static ref OP_SEP: Regex =
        Regex::new(r"(?i)>=|<=|!=|=|!|<|>|;|\b(?:IN|LIKE)\s+").expect("valid operator regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Op(FilterOp),
    Separator,
    Value(&'a str),
}

/// Split on operator tokens, keeping them. Whitespace-only gaps are dropped.
fn tokenize(text: &str) -> Vec<Token<'_>> {
    fn push_value<'a>(tokens: &mut Vec<Token<'a>>, slice: &'a str) {
        let slice = slice.trim();
        if !slice.is_empty() {
            tokens.push(Token::Value(slice));
        }
    }

    let mut tokens = Vec::new();
    let mut last = 0;
    for m in OP_SEP.find_iter(text) {
        push_value(&mut tokens, &text[last..m.start()]);
        let symbol = m.as_str().trim();
        if symbol == ";" {
            tokens.push(Token::Separator);
        } else if let Ok(op) = FilterOp::from_str(symbol) {
            tokens.push(Token::Op(op));
        }
        last = m.end();
    }
    push_value(&mut tokens, &text[last..]);
    tokens
}

/// Parse a column's filter text into its conditions, in left-to-right order.
///
/// Empty or whitespace-only text is "no filter" and yields an empty list. Any
/// malformed piece fails the whole text; no partial result is returned.
pub fn parse_conditions(text: &str) -> Result<Vec<FilterCondition>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut conditions = Vec::new();
    let mut pending: Option<FilterOp> = None;
    for token in tokenize(text) {
        match token {
            Token::Op(op) => {
                if let Some(first) = pending {
                    return Err(ParseError::ConsecutiveOperators { first, second: op });
                }
                pending = Some(op);
            }
            Token::Value(value) => {
                conditions.push(FilterCondition::new(pending.take(), value)?);
            }
            Token::Separator => {
                if let Some(op) = pending {
                    return Err(ParseError::MissingValue(op));
                }
            }
        }
    }
    if let Some(op) = pending {
        return Err(ParseError::MissingValue(op));
    }
    if conditions.is_empty() {
        return Err(ParseError::NoConditions);
    }
    debug!(input = text, count = conditions.len(), "parsed filter conditions");
    Ok(conditions)
}
