use parsnip::grammar::{GrammarError, GrammarFile};
use parsnip::lexer::LexerError;
use parsnip::slr::ParseError;
use std::path::Path;
use std::{fs, io};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error reading {0}: {1}")]
    File(String, io::Error),
    #[error("error parsing grammar file: {0}")]
    GrammarParse(nom::error::Error<String>),
    #[error("error validating grammar file: {0}")]
    Grammar(String),
    #[error("error tokenizing input: {0}")]
    Lex(#[from] LexerError),
    #[error("error parsing input: {0}")]
    Parse(#[from] ParseError),
    #[error("nothing to parse: provide a file or --source")]
    NoInput,
}

/// Loads the grammar file, builds the lexer and the SLR(1) tables in-process, then lexes and
/// parses the requested input and renders the resulting semantic value.
pub fn run_parser(
    grammar_path: &Path,
    filename: Option<&Path>,
    source: Option<&str>,
) -> Result<String, Error> {
    let grammar_text = fs::read_to_string(grammar_path)
        .map_err(|error| Error::File(grammar_path.display().to_string(), error))?;
    let parsed = parsnip::parser::grammar(&grammar_text)
        .map_err(|error| Error::GrammarParse(nom::error::Error::new(error.input.to_string(), error.code)))?;
    let file: GrammarFile = parsed
        .try_into()
        .map_err(|error: GrammarError| Error::Grammar(error.to_string()))?;

    let input = match (filename, source) {
        (_, Some(literal)) => literal.to_string(),
        (Some(path), None) => fs::read_to_string(path)
            .map_err(|error| Error::File(path.display().to_string(), error))?,
        (None, None) => return Err(Error::NoInput),
    };

    let tokens = file.tokenize(&input)?;
    let tree = file.parser().parse(&tokens)?;
    Ok(tree.to_string())
}
