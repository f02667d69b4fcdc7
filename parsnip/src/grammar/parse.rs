use std::cell::OnceCell;
use std::collections::HashSet;

use thiserror::Error;

use crate::grammar::{dollar, Cfg, NonTerminal, Production, Symbol, Terminal};
use crate::lexer::{Lexer, LexerError, LexerRule, RuleFlags};
use crate::parser::{ParsedFlag, ParsedGrammar, RegexParseError};
use crate::slr::SlrParser;

/// A malformed grammar file, found while validating a
/// [ParsedGrammar](crate::parser::ParsedGrammar).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError<'a> {
    #[error("'{0}' appears twice in the terminal declarations")]
    DuplicateTerminal(&'a str),
    #[error("'{0}' appears twice in the nonterminal declarations")]
    DuplicateNonterminal(&'a str),
    #[error("'{0}' is declared as both a terminal and a nonterminal")]
    TerminalNonterminal(&'a str),
    #[error("the start symbol '{0}' is not a declared nonterminal")]
    StartNotNonterminal(&'a str),
    #[error("'{0}' has productions but is not a declared nonterminal")]
    ProductionsNotNonterminal(&'a str),
    #[error("'{symbol}' in a production for '{production}' is neither a declared symbol nor matched by any terminal regex")]
    UndeclaredSymbol {
        production: &'a str,
        symbol: &'a str,
    },
    #[error("'epsilon' must be the whole right-hand side in a production for '{production}'")]
    EpsilonNotAlone { production: &'a str },
    #[error("bad regex for terminal '{terminal}': {source}")]
    Regex {
        terminal: &'a str,
        source: RegexParseError,
    },
}

/// The per-method verbatim bodies of a `Class Methods` section, keyed by class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBodies {
    pub signature: String,
    pub classes: Vec<(String, Vec<String>)>,
}

/// A validated grammar file: the language name, the lexer rules, the grammar proper and the
/// verbatim payload sections. This is the artifact the CLI works with; the lexer and the
/// (plain and augmented) [Cfg] are built on first use and cached.
#[derive(Debug)]
pub struct GrammarFile {
    name: String,
    rules: Vec<LexerRule>,
    nonterminals: Vec<NonTerminal>,
    productions: Vec<Production>,
    start: NonTerminal,
    prefix: Vec<String>,
    methods: Vec<MethodBodies>,
    lexer: OnceCell<Lexer>,
    plain: OnceCell<Cfg>,
    augmented: OnceCell<Cfg>,
}

impl<'a> TryFrom<ParsedGrammar<'a>> for GrammarFile {
    type Error = GrammarError<'a>;

    fn try_from(value: ParsedGrammar<'a>) -> Result<Self, Self::Error> {
        use GrammarError::*;

        let mut terminal_names = HashSet::new();
        for rule in &value.terminals {
            if !terminal_names.insert(rule.name) {
                return Err(DuplicateTerminal(rule.name));
            }
        }
        let mut nonterminal_names = HashSet::new();
        for name in &value.nonterminals {
            if !nonterminal_names.insert(*name) {
                return Err(DuplicateNonterminal(name));
            }
            if terminal_names.contains(*name) {
                return Err(TerminalNonterminal(name));
            }
        }
        if !nonterminal_names.contains(value.start) {
            return Err(StartNotNonterminal(value.start));
        }

        let mut rules = Vec::with_capacity(value.terminals.len());
        for parsed in &value.terminals {
            let regex = crate::parser::regex(parsed.regex).map_err(|source| Regex {
                terminal: parsed.name,
                source,
            })?;
            let flags = match parsed.flag {
                Some(ParsedFlag::Store) => RuleFlags::store(),
                Some(ParsedFlag::Ignore) => RuleFlags::ignore(),
                None => RuleFlags::default(),
            };
            rules.push(LexerRule::new(Terminal::new(parsed.name), regex, flags));
        }

        let mut productions = Vec::new();
        for block in &value.productions {
            if !nonterminal_names.contains(block.lhs) {
                return Err(ProductionsNotNonterminal(block.lhs));
            }
            let lhs = NonTerminal::new(block.lhs);
            for alternative in &block.alternatives {
                if alternative.iter().any(|token| *token == "epsilon") {
                    if alternative.len() != 1 {
                        return Err(EpsilonNotAlone {
                            production: block.lhs,
                        });
                    }
                    productions.push(Production::empty(lhs.clone()));
                    continue;
                }
                let mut rhs = Vec::with_capacity(alternative.len());
                for token in alternative {
                    // Declared names win; a bare lexeme resolves through the first
                    // terminal regex accepting it, so productions may be written
                    // with literals like `E -> E + T`.
                    if nonterminal_names.contains(*token) {
                        rhs.push(Symbol::NonTerminal(NonTerminal::new(*token)));
                    } else if terminal_names.contains(*token) {
                        rhs.push(Symbol::Terminal(Terminal::new(*token)));
                    } else if let Some(rule) =
                        rules.iter().find(|rule| rule.regex.matches(token))
                    {
                        rhs.push(Symbol::Terminal(rule.terminal.clone()));
                    } else {
                        return Err(UndeclaredSymbol {
                            production: block.lhs,
                            symbol: token,
                        });
                    }
                }
                productions.push(Production::new(lhs.clone(), rhs));
            }
        }

        Ok(GrammarFile {
            name: value.name.to_string(),
            rules,
            nonterminals: value
                .nonterminals
                .iter()
                .map(|name| NonTerminal::new(*name))
                .collect(),
            productions,
            start: NonTerminal::new(value.start),
            prefix: value.prefix.iter().map(|line| line.to_string()).collect(),
            methods: value
                .methods
                .iter()
                .map(|method| MethodBodies {
                    signature: method.signature.to_string(),
                    classes: method
                        .classes
                        .iter()
                        .map(|body| {
                            (
                                body.class.to_string(),
                                body.lines.iter().map(|line| line.to_string()).collect(),
                            )
                        })
                        .collect(),
                })
                .collect(),
            lexer: OnceCell::new(),
            plain: OnceCell::new(),
            augmented: OnceCell::new(),
        })
    }
}

impl GrammarFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[LexerRule] {
        &self.rules
    }

    pub fn nonterminals(&self) -> &[NonTerminal] {
        &self.nonterminals
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn start(&self) -> &NonTerminal {
        &self.start
    }

    /// Verbatim lines of the `Prefix` sections.
    pub fn prefix(&self) -> &[String] {
        &self.prefix
    }

    /// The `Class Methods` sections.
    pub fn methods(&self) -> &[MethodBodies] {
        &self.methods
    }

    /// The lexer compiled from the terminal rules, built on first use.
    pub fn lexer(&self) -> &Lexer {
        self.lexer.get_or_init(|| Lexer::new(self.rules.clone()))
    }

    /// The grammar exactly as declared.
    pub fn cfg(&self) -> &Cfg {
        self.plain.get_or_init(|| self.build_cfg())
    }

    /// The grammar with the canonical start production added; this is what the SLR(1)
    /// construction and [GrammarFile::parser] work on.
    pub fn augmented_cfg(&self) -> &Cfg {
        self.augmented
            .get_or_init(|| self.build_cfg().into_augmented())
    }

    /// Lexes a source text and appends the `$` end-of-input sentinel, producing exactly the
    /// stream [GrammarFile::parser] expects.
    pub fn tokenize(&self, source: &str) -> Result<Vec<Terminal>, LexerError> {
        let mut tokens = self.lexer().lex(source)?;
        tokens.push(dollar());
        Ok(tokens)
    }

    /// A parser over the augmented grammar.
    pub fn parser(&self) -> SlrParser<'_> {
        SlrParser::new(self.augmented_cfg())
    }

    fn build_cfg(&self) -> Cfg {
        Cfg::new(
            self.nonterminals.clone(),
            self.rules.iter().map(|rule| rule.terminal.clone()).collect(),
            self.productions.clone(),
            self.start.clone(),
        )
    }
}
