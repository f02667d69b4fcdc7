//! The table-driven shift-reduce loop. [SlrParser] executes the SLR(1) tables of a [Cfg] against
//! a token stream (which must end with the `$` sentinel) and produces a semantic value through
//! caller-supplied shift/reduce callbacks, or a generic [ParseTree] by default.
//!
//! The driver keeps two parallel stacks: states and semantic values, with the invariant
//! `|states| == |values| + 1` at every rest point. Empty ACTION cells surface as
//! [ParseError::UnexpectedToken] with the set of terminals that would have been legal;
//! multi-action cells abort with [ConflictError] — the driver never picks an action from a
//! conflicted cell.

use std::fmt;

use thiserror::Error;

use crate::grammar::{Cfg, NonTerminal, Terminal};
use crate::slr::Action;

/// The default semantic value: a tree with a node per reduction and a leaf per shifted token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseTree {
    Leaf(Terminal),
    Node {
        head: NonTerminal,
        children: Vec<ParseTree>,
    },
}

impl ParseTree {
    /// The ordered children of this node; empty for leaves.
    pub fn children(&self) -> &[ParseTree] {
        match self {
            ParseTree::Leaf(_) => &[],
            ParseTree::Node { children, .. } => children,
        }
    }

    pub fn head(&self) -> Option<&NonTerminal> {
        match self {
            ParseTree::Leaf(_) => None,
            ParseTree::Node { head, .. } => Some(head),
        }
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTree::Leaf(token) => token.fmt(f),
            ParseTree::Node { head, children } => {
                write!(f, "{}(", head)?;
                let mut first = true;
                for child in children {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    child.fmt(f)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// An ACTION cell held more than one action; the grammar is not SLR(1) at this point.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("conflicting actions in state {state} on lookahead '{lookahead}': {}", fmt_actions(.actions))]
pub struct ConflictError {
    pub state: usize,
    pub lookahead: Terminal,
    pub actions: Vec<Action>,
}

/// A failed parse.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected token '{token}' at index {at}, expected one of: {}", fmt_terminals(.expected))]
    UnexpectedToken {
        /// Cursor position in the token stream.
        at: usize,
        token: Terminal,
        /// The terminals with a non-empty ACTION cell in the state the parser was in.
        expected: Vec<Terminal>,
    },
    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

fn fmt_terminals(terminals: &[Terminal]) -> String {
    terminals
        .iter()
        .map(|t| t.name().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn fmt_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(Action::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A table-driven SLR(1) parser over a grammar. The tables are built (and cached on the `Cfg`)
/// on first use; the parser itself is stateless and may be reused for any number of parses.
#[derive(Clone, Copy, Debug)]
pub struct SlrParser<'a> {
    cfg: &'a Cfg,
}

impl<'a> SlrParser<'a> {
    pub fn new(cfg: &'a Cfg) -> Self {
        SlrParser { cfg }
    }

    /// Parses with the default semantics: every shift contributes a [ParseTree::Leaf] and every
    /// reduction a [ParseTree::Node] whose children are the popped values.
    pub fn parse(&self, tokens: &[Terminal]) -> Result<ParseTree, ParseError> {
        self.parse_with(
            tokens,
            |token| ParseTree::Leaf(token.clone()),
            |head, children| ParseTree::Node {
                head: head.clone(),
                children,
            },
        )
    }

    /// Parses with caller-supplied semantics. `shift` maps each consumed token to a value;
    /// `reduce` folds the values popped for a reduction (in RHS order; empty for an
    /// ε-production) into the value for the LHS.
    ///
    /// The token stream must end with the `$` sentinel (see [crate::grammar::dollar]); running
    /// off its end is a caller bug and panics rather than erroring.
    pub fn parse_with<V>(
        &self,
        tokens: &[Terminal],
        mut shift: impl FnMut(&Terminal) -> V,
        mut reduce: impl FnMut(&NonTerminal, Vec<V>) -> V,
    ) -> Result<V, ParseError> {
        let table = self.cfg.slr1_table();
        let mut parser_stack: Vec<usize> = vec![0];
        let mut semantic_stack: Vec<V> = Vec::new();
        let mut cursor = 0usize;

        loop {
            assert_eq!(
                parser_stack.len(),
                semantic_stack.len() + 1,
                "parser and semantic stacks out of sync"
            );
            assert!(
                cursor < tokens.len(),
                "ran past the end of the input, is the $ sentinel missing?"
            );
            let lookahead = &tokens[cursor];
            let state = *parser_stack.last().unwrap();

            match table.actions(state, lookahead) {
                [] => {
                    return Err(ParseError::UnexpectedToken {
                        at: cursor,
                        token: lookahead.clone(),
                        expected: table.expected_terminals(state),
                    })
                }
                [Action::Shift(target)] => {
                    parser_stack.push(*target);
                    semantic_stack.push(shift(lookahead));
                    cursor += 1;
                }
                [Action::Reduce(index)] => {
                    let production = self.cfg.production(*index);
                    let count = production.len();
                    assert!(
                        parser_stack.len() > count,
                        "reduce by '{production}' would empty the parser stack"
                    );
                    parser_stack.truncate(parser_stack.len() - count);
                    let values = semantic_stack.split_off(semantic_stack.len() - count);
                    let target = table
                        .goto_state(*parser_stack.last().unwrap(), production.lhs())
                        .unwrap_or_else(|| {
                            panic!("no GOTO entry for {} after reduce", production.lhs())
                        });
                    parser_stack.push(target);
                    semantic_stack.push(reduce(production.lhs(), values));
                }
                [Action::Accept] => {
                    assert!(lookahead.is_dollar(), "accept on non-$ lookahead");
                    assert_eq!(
                        cursor,
                        tokens.len() - 1,
                        "tokens remain after the end-of-input sentinel"
                    );
                    assert!(
                        parser_stack.len() == 2 && parser_stack[0] == 0,
                        "unexpected entries on the parser stack at accept"
                    );
                    let value = semantic_stack.pop().expect("a value must remain at accept");
                    assert!(
                        semantic_stack.is_empty(),
                        "unexpected entries on the semantic stack at accept"
                    );
                    return Ok(value);
                }
                actions => {
                    return Err(ConflictError {
                        state,
                        lookahead: lookahead.clone(),
                        actions: actions.to_vec(),
                    }
                    .into())
                }
            }
        }
    }
}
