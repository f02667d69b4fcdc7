use crate::parser::{
    ParsedClassBody, ParsedFlag, ParsedGrammar, ParsedMethod, ParsedProduction,
    ParsedTerminalRule,
};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till, take_till1};
use nom::character::complete::{char as just, line_ending, not_line_ending, space0, space1};
use nom::combinator::{eof, map, opt, recognize, value, verify};
use nom::error::{Error, ErrorKind};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::{Err, IResult};

pub(crate) fn full_grammar(input: &str) -> IResult<&str, ParsedGrammar> {
    let (input, _) = many0(space_line)(input)?;
    let (input, name) = grammar_header(input)?;
    let (input, _) = many0(space_line)(input)?;
    let (input, terminals) = terminals_section(input)?;
    let (input, _) = many0(space_line)(input)?;
    let (input, nonterminals) = nonterminals_section(input)?;
    let (input, _) = many0(space_line)(input)?;
    let (input, productions) = productions_section(input)?;
    let (input, _) = many0(space_line)(input)?;
    let (input, start) = start_line(input)?;

    // The optional sections may appear in any order, each any number of times.
    let mut prefix = Vec::new();
    let mut methods = Vec::new();
    let (mut input, _) = many0(space_line)(input)?;
    loop {
        if let Ok((rest, mut lines)) = prefix_section(input) {
            prefix.append(&mut lines);
            (input, _) = many0(space_line)(rest)?;
        } else if let Ok((rest, mut parsed)) = class_methods_section(input) {
            methods.append(&mut parsed);
            (input, _) = many0(space_line)(rest)?;
        } else {
            break;
        }
    }

    Ok((
        input,
        ParsedGrammar {
            name,
            terminals,
            nonterminals,
            productions,
            start,
            prefix,
            methods,
        },
    ))
}

fn grammar_header(input: &str) -> IResult<&str, &str> {
    map(
        delimited(pair(space0, tag("Grammar:")), not_line_ending, line_end),
        str::trim,
    )(input)
}

fn terminals_section(input: &str) -> IResult<&str, Vec<ParsedTerminalRule>> {
    delimited(
        pair(section_line("Terminals Start"), many0(space_line)),
        many0(terminated(terminal_rule, many0(space_line))),
        section_line("Terminals End"),
    )(input)
}

fn terminal_rule(input: &str) -> IResult<&str, ParsedTerminalRule> {
    map(
        tuple((
            preceded(space0, terminal_name),
            preceded(pair(just(':'), space0), regex_literal),
            opt(preceded(space1, flag)),
            pair(space0, line_end),
        )),
        |(name, regex, flag, _)| ParsedTerminalRule { name, regex, flag },
    )(input)
}

fn terminal_name(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace() || c == ':')(input)
}

fn regex_literal(input: &str) -> IResult<&str, &str> {
    delimited(just('"'), take_till(|c| c == '"' || c == '\n'), just('"'))(input)
}

fn flag(input: &str) -> IResult<&str, ParsedFlag> {
    alt((
        value(ParsedFlag::Store, tag("STORE")),
        value(ParsedFlag::Ignore, tag("IGNORE")),
    ))(input)
}

fn nonterminals_section(input: &str) -> IResult<&str, Vec<&str>> {
    delimited(
        pair(section_line("NonTerminals Start"), many0(space_line)),
        many0(terminated(nonterminal_line, many0(space_line))),
        section_line("NonTerminals End"),
    )(input)
}

fn nonterminal_line(input: &str) -> IResult<&str, &str> {
    delimited(space0, symbol_name, pair(space0, line_end))(input)
}

fn productions_section(input: &str) -> IResult<&str, Vec<ParsedProduction>> {
    delimited(
        pair(section_line("Productions Start"), many0(space_line)),
        many0(terminated(production_block, many0(space_line))),
        section_line("Productions End"),
    )(input)
}

fn production_block(input: &str) -> IResult<&str, ParsedProduction> {
    map(
        pair(
            pair(
                delimited(space0, symbol_name, delimited(space0, tag("->"), space0)),
                terminated(symbol_list, pair(space0, line_end)),
            ),
            many0(alternative_line),
        ),
        |((lhs, first), mut rest)| {
            let mut alternatives = vec![first];
            alternatives.append(&mut rest);
            ParsedProduction { lhs, alternatives }
        },
    )(input)
}

/// Subsequent alternatives continue on `|` lines, reusing the block's nonterminal.
fn alternative_line(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        many0(space_line),
        delimited(
            tuple((space0, just('|'), space0)),
            symbol_list,
            pair(space0, line_end),
        ),
    )(input)
}

fn symbol_list(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(space1, symbol_name)(input)
}

fn symbol_name(input: &str) -> IResult<&str, &str> {
    verify(take_till1(|c: char| c.is_whitespace()), |name: &str| {
        !["|", "->", "→"].contains(&name)
    })(input)
}

fn start_line(input: &str) -> IResult<&str, &str> {
    delimited(
        pair(space0, pair(tag("Start Symbol:"), space0)),
        symbol_name,
        pair(space0, line_end),
    )(input)
}

fn prefix_section(input: &str) -> IResult<&str, Vec<&str>> {
    let (input, _) = section_line("Prefix Start")(input)?;
    verbatim_until(input, "Prefix End")
}

fn class_methods_section(input: &str) -> IResult<&str, Vec<ParsedMethod>> {
    let (input, _) = section_line("Class Methods Start")(input)?;
    let (mut input, _) = many0(space_line)(input)?;
    let mut methods = Vec::new();
    while let Ok((rest, method)) = method_block(input) {
        methods.push(method);
        (input, _) = many0(space_line)(rest)?;
    }
    let (input, _) = section_line("Class Methods End")(input)?;
    Ok((input, methods))
}

fn method_block(input: &str) -> IResult<&str, ParsedMethod> {
    let (input, signature) = map(
        delimited(
            pair(space0, pair(tag("Method Start"), space1)),
            not_line_ending,
            line_end,
        ),
        str::trim,
    )(input)?;
    let (mut input, _) = many0(space_line)(input)?;
    let mut classes = Vec::new();
    loop {
        match class_block(input) {
            Ok((rest, class)) => {
                classes.push(class);
                (input, _) = many0(space_line)(rest)?;
            }
            Err(error) => {
                if classes.is_empty() {
                    return Err(error);
                }
                break;
            }
        }
    }
    let (input, end_signature) = map(
        delimited(
            pair(space0, pair(tag("Method End"), space1)),
            not_line_ending,
            line_end,
        ),
        str::trim,
    )(input)?;
    if end_signature != signature {
        return Err(Err::Error(Error::new(input, ErrorKind::Verify)));
    }
    Ok((
        input,
        ParsedMethod {
            signature,
            classes,
        },
    ))
}

fn class_block(input: &str) -> IResult<&str, ParsedClassBody> {
    let (input, class) = delimited(
        pair(space0, pair(tag("Class Start"), space1)),
        symbol_name,
        pair(space0, line_end),
    )(input)?;
    let sentinel = format!("Class End {class}");
    let (input, lines) = verbatim_until(input, &sentinel)?;
    Ok((input, ParsedClassBody { class, lines }))
}

/// Collects raw lines (untrimmed, blank lines included) until a line whose trimmed content
/// equals the sentinel. The sentinel line is consumed but not returned.
fn verbatim_until<'a>(mut input: &'a str, sentinel: &str) -> IResult<&'a str, Vec<&'a str>> {
    let mut lines = Vec::new();
    loop {
        let at_end = input.is_empty();
        let (rest, line) = terminated(not_line_ending, line_end)(input)?;
        if line.trim() == sentinel {
            return Ok((rest, lines));
        }
        if at_end {
            // Ran off the end of the file without seeing the sentinel.
            return Err(Err::Error(Error::new(input, ErrorKind::Tag)));
        }
        lines.push(line);
        input = rest;
    }
}

fn section_line<'a>(header: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
    move |input| value((), tuple((space0, tag(header), space0, line_end)))(input)
}

fn line_end(input: &str) -> IResult<&str, &str> {
    alt((line_ending, eof))(input)
}

fn space_line(input: &str) -> IResult<&str, ()> {
    // A blank line must consume *something*, otherwise many0(space_line)
    // would loop forever at end of input.
    value(
        (),
        verify(
            recognize(terminated(space0, line_end)),
            |consumed: &str| !consumed.is_empty(),
        ),
    )(input)
}
