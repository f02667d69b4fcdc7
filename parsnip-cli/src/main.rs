use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod demo;
mod run;

/// Lexer and SLR(1) parser generation toolkit.
#[derive(Debug, Parser)]
#[command(name = "parsnip", version, about)]
pub struct ParsnipArgs {
    /// Run the regular expression demo
    #[arg(long)]
    regex: bool,
    /// Run the NFA construction demo
    #[arg(long)]
    nfa: bool,
    /// Run the DFA and longest-match scanning demo
    #[arg(long)]
    dfa: bool,
    /// Run the lexer demo
    #[arg(long)]
    lexer: bool,
    /// Run the grammar analysis demo (FIRST/FOLLOW and the SLR tables)
    #[arg(long)]
    cfg: bool,
    #[command(subcommand)]
    command: Option<ParsnipCommand>,
}

#[derive(Debug, Subcommand)]
pub enum ParsnipCommand {
    /// Build a parser from a grammar file and run it on some input
    Parser {
        /// Path to the grammar file
        grammar: PathBuf,
        /// File to parse
        filename: Option<PathBuf>,
        /// Parse a literal string instead of a file
        #[arg(long)]
        source: Option<String>,
    },
}

fn main() -> ExitCode {
    let args = ParsnipArgs::parse();

    if let Some(ParsnipCommand::Parser {
        grammar,
        filename,
        source,
    }) = &args.command
    {
        return match run::run_parser(grammar, filename.as_deref(), source.as_deref()) {
            Ok(output) => {
                println!("{output}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("{error}");
                ExitCode::FAILURE
            }
        };
    }

    let mut ran_any = false;
    if args.regex {
        demo::regex_demo();
        ran_any = true;
    }
    if args.nfa {
        demo::nfa_demo();
        ran_any = true;
    }
    if args.dfa {
        demo::dfa_demo();
        ran_any = true;
    }
    if args.lexer {
        demo::lexer_demo();
        ran_any = true;
    }
    if args.cfg {
        demo::cfg_demo();
        ran_any = true;
    }

    if !ran_any {
        let _ = ParsnipArgs::command().print_help();
    }
    ExitCode::SUCCESS
}
