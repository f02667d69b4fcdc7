//! # parsnip
//!
//! `parsnip` is a compiler-construction toolkit: given regular expressions for tokens and a
//! context-free grammar for syntax, it produces a working longest-match lexer and an SLR(1)
//! bottom-up parser that computes a semantic value for any accepted input.
//!
//! The pipeline is built from small, separately usable pieces:
//!
//! * [regex] — a restricted regular expression language and its AST
//! * [nfa] — ε-NFAs with tagged accept states, Thompson construction, disjoint union
//! * [dfa] — subset construction and longest-match scanning
//! * [lexer] — priority-ordered tokenisation driven by one combined DFA
//! * [grammar] — symbols, productions, the [Cfg](grammar::Cfg) container and its analyses
//!   (nullability, FIRST/FOLLOW, an LL(1) diagnostic table)
//! * [lr0] — LR(0) items and the canonical item-set automaton
//! * [slr] — SLR(1) ACTION/GOTO construction and the shift-reduce driver
//! * [parser] — the text formats: regular expressions and the grammar file format
//!
//! ## Usage
//!
//! ```
//! use parsnip::grammar::{self, Cfg, NonTerminal, Production, Symbol, Terminal};
//! use parsnip::lexer::{Lexer, LexerRule, RuleFlags};
//! use parsnip::slr::SlrParser;
//!
//! // Tokens: identifiers (stored), '+', and spaces to discard.
//! let lexer = Lexer::new(vec![
//!     LexerRule::new(
//!         Terminal::new("plus"),
//!         parsnip::parser::regex("\\+").unwrap(),
//!         RuleFlags::default(),
//!     ),
//!     LexerRule::new(
//!         Terminal::new("id"),
//!         parsnip::parser::regex("[a-z]([a-z0-9])*").unwrap(),
//!         RuleFlags::store(),
//!     ),
//!     LexerRule::new(
//!         Terminal::new("ws"),
//!         parsnip::parser::regex(" ").unwrap(),
//!         RuleFlags::ignore(),
//!     ),
//! ]);
//!
//! // Grammar: E -> E plus id | id, augmented for SLR(1).
//! let e = NonTerminal::new("E");
//! let cfg = Cfg::new(
//!     vec![e.clone()],
//!     vec![Terminal::new("plus"), Terminal::new("id")],
//!     vec![
//!         Production::new(
//!             e.clone(),
//!             vec![
//!                 Symbol::NonTerminal(e.clone()),
//!                 Symbol::Terminal(Terminal::new("plus")),
//!                 Symbol::Terminal(Terminal::new("id")),
//!             ],
//!         ),
//!         Production::new(e.clone(), vec![Symbol::Terminal(Terminal::new("id"))]),
//!     ],
//!     e,
//! )
//! .into_augmented();
//!
//! let mut tokens = lexer.lex("x + y").unwrap();
//! tokens.push(grammar::dollar());
//! let tree = SlrParser::new(&cfg).parse(&tokens).unwrap();
//! assert_eq!(tree.to_string(), "E(E(id(x)), plus, id(y))");
//! ```
//!
//! Grammars are more conveniently read from the text format described in [parser]; see
//! [grammar::GrammarFile] for the validated artifact carrying the lexer rules and the grammar
//! together.
//!
//! The engine is single-threaded and build-once, read-many: construction produces immutable
//! tables (analyses are cached on the owning value on first access), and scanning and parsing
//! never mutate them, so one lexer and one table set serve any number of inputs.

pub mod dfa;
pub mod grammar;
pub mod lexer;
pub mod lr0;
pub mod nfa;
pub mod parser;
pub mod regex;
pub mod slr;
mod table;
#[cfg(test)]
mod tests;
mod util;
