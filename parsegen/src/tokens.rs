//! Parsing of typed token strings such as `char:;` or `repeat:digit`.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{all_consuming, rest, value},
    sequence::separated_pair,
    IResult,
};

use crate::error::{Error, Result};
use crate::rule::RuleKind;

/// The kind prefix of a token string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Char,
    CharIn,
    String,
    CiString,
    Rule,
    Repeat,
}

fn kind(input: &str) -> IResult<&str, TokenKind> {
    // Longer prefixes first, `char_in` would otherwise match as `char`.
    alt((
        value(TokenKind::CharIn, tag("char_in")),
        value(TokenKind::Char, tag("char")),
        value(TokenKind::CiString, tag("ci_string")),
        value(TokenKind::String, tag("string")),
        value(TokenKind::Rule, tag("rule")),
        value(TokenKind::Repeat, tag("repeat")),
    ))(input)
}

/// Split a token string into its kind and its raw payload. The payload is
/// everything after the first `:` and is not trimmed.
pub fn token(input: &str) -> IResult<&str, (TokenKind, &str)> {
    all_consuming(separated_pair(kind, char(':'), rest))(input)
}

/// Build the rule kind described by a token string. `name` is only used for
/// error reporting.
pub fn parse_token(name: &str, input: &str) -> Result<RuleKind> {
    let invalid = || Error::RuleDefinition {
        name: name.to_owned(),
        token: input.to_owned(),
    };

    let (_, (kind, payload)) = token(input).map_err(|_| invalid())?;
    if payload.is_empty() {
        return Err(invalid());
    }

    let kind = match kind {
        TokenKind::Char => {
            let mut chars = payload.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => RuleKind::Char(c),
                _ => return Err(invalid()),
            }
        }
        TokenKind::CharIn => RuleKind::CharIn(payload.chars().collect()),
        TokenKind::String => RuleKind::String(payload.to_owned()),
        TokenKind::CiString => RuleKind::CiString(payload.to_owned()),
        TokenKind::Rule => RuleKind::Lookup {
            target: payload.to_owned(),
            resolved: None,
        },
        TokenKind::Repeat => RuleKind::Repeat {
            target: payload.to_owned(),
            resolved: None,
        },
    };
    Ok(kind)
}
