//! # Text format parsers
//! This module contains the parsers for the two text formats the toolkit reads: the restricted
//! regular expression syntax (see [crate::regex]) and the grammar file format.
//!
//! ## Grammar file format
//! A grammar file is line-oriented; blank lines are allowed anywhere and structural lines are
//! stripped of leading/trailing whitespace:
//!
//! ```text
//! Grammar: Tiny
//!
//! Terminals Start
//! x: "x"
//! num: "[0-9]([0-9])*" STORE
//! ws: "[ \t\n]" IGNORE
//! Terminals End
//!
//! NonTerminals Start
//! E
//! NonTerminals End
//!
//! Productions Start
//! E -> E x num
//!    | num
//! Productions End
//!
//! Start Symbol: E
//! ```
//!
//! Each terminal line names a token, gives its regular expression in double quotes (in which
//! `\n` and `\t` are two-character escapes for newline and tab) and may carry one of the flags
//! `STORE` (keep the lexeme as the token value) or `IGNORE` (drop the token). Alternative
//! productions for the most recent nonterminal continue on lines starting with `|`, and the
//! literal RHS token `epsilon` denotes the empty production. Two optional sections, `Prefix`
//! and `Class Methods`, carry verbatim payload lines for downstream consumers and may appear
//! in any order after the start symbol.
//!
//! Parsing happens in two steps, as everywhere in this crate: [grammar()] produces a raw
//! [ParsedGrammar] checking only the shape of the file, and
//! [GrammarFile](crate::grammar::GrammarFile) validates it via `TryFrom`, reporting duplicate
//! or clashing names, undeclared symbols and malformed regular expressions as
//! [GrammarError](crate::grammar::GrammarError)s.

mod grammar;
mod regex;

use crate::regex::Regex;
use nom::{combinator::all_consuming, error::Error, Finish};
use thiserror::Error as ThisError;

/// A malformed regular expression.
#[derive(Clone, Copy, Debug, ThisError, PartialEq, Eq)]
#[error("malformed regular expression at offset {offset}")]
pub struct RegexParseError {
    /// Offset of the offending position, in characters.
    pub offset: usize,
}

/// A grammar file parsed for shape only; validation happens when converting to
/// [GrammarFile](crate::grammar::GrammarFile).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGrammar<'a> {
    pub name: &'a str,
    pub terminals: Vec<ParsedTerminalRule<'a>>,
    pub nonterminals: Vec<&'a str>,
    pub productions: Vec<ParsedProduction<'a>>,
    pub start: &'a str,
    pub prefix: Vec<&'a str>,
    pub methods: Vec<ParsedMethod<'a>>,
}

/// One line of the `Terminals` section: `name: "regex"` plus an optional flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTerminalRule<'a> {
    pub name: &'a str,
    /// The regex source, quotes stripped but escapes untouched.
    pub regex: &'a str,
    pub flag: Option<ParsedFlag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedFlag {
    Store,
    Ignore,
}

/// One block of the `Productions` section: a nonterminal and its `|`-separated alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProduction<'a> {
    pub lhs: &'a str,
    pub alternatives: Vec<Vec<&'a str>>,
}

/// One method of the `Class Methods` section: a signature plus per-class verbatim bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMethod<'a> {
    pub signature: &'a str,
    pub classes: Vec<ParsedClassBody<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClassBody<'a> {
    pub class: &'a str,
    pub lines: Vec<&'a str>,
}

/// Parses a regular expression in the restricted surface syntax. The whole input must parse.
pub fn regex(input: &str) -> Result<Regex, RegexParseError> {
    all_consuming(regex::expression)(input)
        .finish()
        .map(|(_, parsed)| parsed)
        .map_err(|error: Error<&str>| RegexParseError {
            offset: input.chars().count() - error.input.chars().count(),
        })
}

/// Parses a grammar file according to the format above. The whole input must parse. The result
/// is a [ParsedGrammar], which is not yet validated; use `TryInto` to convert it into a
/// [GrammarFile](crate::grammar::GrammarFile).
pub fn grammar(input: &str) -> Result<ParsedGrammar, Error<&str>> {
    all_consuming(grammar::full_grammar)(input)
        .finish()
        .map(|(_, parsed)| parsed)
}
