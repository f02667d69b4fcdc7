use crate::regex::{is_metacharacter, Regex};
use nom::branch::alt;
use nom::character::complete::{anychar, char as just};
use nom::combinator::{cut, map, opt, verify};
use nom::multi::many0;
use nom::sequence::{pair, preceded, separated_pair, terminated};
use nom::IResult;

/// The restricted surface syntax is bracket-explicit, so this parser needs no precedence
/// handling at all: a `(` always opens either an alternation `(r + r)` (exactly one top-level
/// `+`) or a starred group `(r)*`, and everything else is a character, an escape or a class.
pub(crate) fn expression(input: &str) -> IResult<&str, Regex> {
    map(many0(element), |elements| {
        // Concatenation nests to the right; the empty sequence is ε.
        let mut elements = elements.into_iter().rev();
        match elements.next() {
            None => Regex::Epsilon,
            Some(last) => elements.fold(last, |acc, element| Regex::concat(element, acc)),
        }
    })(input)
}

fn element(input: &str) -> IResult<&str, Regex> {
    alt((class, group, map(single_char, Regex::Char)))(input)
}

/// `(r + r)` becomes an alternation as-is; a group without a top-level `+` must be starred.
/// Once the `(` has matched, failures are hard: `(` can start nothing else, and cutting keeps
/// the reported offset inside the group rather than backtracking to its start.
fn group(input: &str) -> IResult<&str, Regex> {
    let (rest, (lhs, alternative)) = preceded(
        just('('),
        cut(terminated(
            pair(expression, opt(preceded(just('+'), expression))),
            just(')'),
        )),
    )(input)?;
    match alternative {
        Some(rhs) => Ok((rest, Regex::or(lhs, rhs))),
        None => {
            let (rest, _) = cut(just('*'))(rest)?;
            Ok((rest, Regex::star(lhs)))
        }
    }
}

/// `[...]` desugars to an alternation of its members; `[]` is the empty language.
fn class(input: &str) -> IResult<&str, Regex> {
    map(
        preceded(just('['), cut(terminated(many0(class_item), just(']')))),
        |items| {
            let mut chars = items.into_iter().flatten().map(Regex::Char).rev();
            match chars.next() {
                None => Regex::Empty,
                Some(last) => chars.fold(last, |acc, c| Regex::or(c, acc)),
            }
        },
    )(input)
}

fn class_item(input: &str) -> IResult<&str, Vec<char>> {
    alt((
        map(
            verify(
                separated_pair(class_char, just('-'), class_char),
                |(from, to)| from <= to,
            ),
            |(from, to)| (from..=to).collect(),
        ),
        map(class_char, |c| vec![c]),
    ))(input)
}

fn class_char(input: &str) -> IResult<&str, char> {
    alt((escaped_char, verify(anychar, |c| *c != ']' && *c != '\\')))(input)
}

fn single_char(input: &str) -> IResult<&str, char> {
    alt((escaped_char, normal_char))(input)
}

fn normal_char(input: &str) -> IResult<&str, char> {
    verify(anychar, |c| !is_metacharacter(*c))(input)
}

/// `\` escapes the metacharacters; `\n` and `\t` decode to the control characters.
fn escaped_char(input: &str) -> IResult<&str, char> {
    map(preceded(just('\\'), anychar), |c| match c {
        'n' => '\n',
        't' => '\t',
        c => c,
    })(input)
}
