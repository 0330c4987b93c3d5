use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{alpha1, alphanumeric1, char},
    combinator::{all_consuming, consumed, opt, recognize, value},
    multi::{many0, many0_count, separated_list1},
    sequence::{delimited, pair, tuple},
    IResult,
};

/// How a reference inside a section should be looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Token,
    Sequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Optional,
    Repeating,
}

/// One alternative of a section, e.g. `&expr` or `digits/Opt/Rep`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Set by a leading `&` (sequence) or `@` (token).
    pub forced: Option<Class>,
    pub name: String,
    pub optional: bool,
    pub repeating: bool,
}

/// The content of a quoted terminal, without its quotes.
pub fn terminal(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(tag("\""), take_until("\""), tag("\"")),
        delimited(tag("\'"), take_until("\'"), tag("\'")),
    ))(input)
}

/// A reference name. Generated names contain `:` so it is allowed after the
/// first character.
pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_"), tag(":")))),
    ))(input)
}

fn flag(input: &str) -> IResult<&str, Flag> {
    alt((
        value(Flag::Optional, tag("/Opt")),
        value(Flag::Repeating, tag("/Rep")),
    ))(input)
}

fn class(input: &str) -> IResult<&str, Class> {
    alt((
        value(Class::Sequence, char('&')),
        value(Class::Token, char('@')),
    ))(input)
}

pub fn reference(input: &str) -> IResult<&str, Reference> {
    let (rem, (forced, name, flags)) = tuple((opt(class), identifier, many0(flag)))(input)?;
    Ok((
        rem,
        Reference {
            forced,
            name: name.to_owned(),
            optional: flags.contains(&Flag::Optional),
            repeating: flags.contains(&Flag::Repeating),
        },
    ))
}

/// Alternatives separated by `|`, along with the text they were read from.
pub fn section(input: &str) -> IResult<&str, (&str, Vec<Reference>)> {
    consumed(separated_list1(char('|'), reference))(input)
}

/// Sections separated by `,`. The whole input must be consumed.
pub fn sections(input: &str) -> IResult<&str, Vec<(&str, Vec<Reference>)>> {
    all_consuming(separated_list1(char(','), section))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Debug;

    struct TestCase<T> {
        input: &'static str,
        // Some indicates success, None indicates error.
        out: Option<IResult<&'static str, T>>,
    }

    fn assert_test_cases<T, F>(f: F, tests: Vec<TestCase<T>>)
    where
        T: Debug + Eq,
        F: Fn(&'static str) -> IResult<&'static str, T>,
    {
        for t in tests {
            let res = f(t.input);
            match t.out {
                Some(out) => assert_eq!(res, out),
                None => assert!(res.is_err(), "expected error: {:?}", res),
            }
        }
    }

    fn plain(name: &str) -> Reference {
        Reference {
            forced: None,
            name: name.to_owned(),
            optional: false,
            repeating: false,
        }
    }

    #[test]
    fn parse_terminal() {
        let tests = vec![
            TestCase {
                input: "\"hello\"",
                out: Some(Ok(("", "hello"))),
            },
            TestCase {
                input: "\"hello\" world",
                out: Some(Ok((" world", "hello"))),
            },
            TestCase {
                input: "'+',num",
                out: Some(Ok((",num", "+"))),
            },
            TestCase {
                input: "'it\"s'",
                out: Some(Ok(("", "it\"s"))),
            },
            TestCase {
                input: "'hello\" world",
                out: None,
            },
        ];

        assert_test_cases(terminal, tests);
    }

    #[test]
    fn parse_identifier() {
        let tests = vec![
            TestCase {
                input: "hello",
                out: Some(Ok(("", "hello"))),
            },
            TestCase {
                input: "hello world",
                out: Some(Ok((" world", "hello"))),
            },
            TestCase {
                input: "expr:::group:1:0/Opt",
                out: Some(Ok(("/Opt", "expr:::group:1:0"))),
            },
            TestCase {
                input: "_x1,y",
                out: Some(Ok((",y", "_x1"))),
            },
            TestCase {
                input: "1abc",
                out: None,
            },
        ];

        assert_test_cases(identifier, tests);
    }

    #[test]
    fn parse_reference() {
        let tests = vec![
            TestCase {
                input: "num",
                out: Some(Ok(("", plain("num")))),
            },
            TestCase {
                input: "&num|x",
                out: Some(Ok((
                    "|x",
                    Reference {
                        forced: Some(Class::Sequence),
                        ..plain("num")
                    },
                ))),
            },
            TestCase {
                input: "@num",
                out: Some(Ok((
                    "",
                    Reference {
                        forced: Some(Class::Token),
                        ..plain("num")
                    },
                ))),
            },
            TestCase {
                input: "g:::repeat:0:1/Opt/Rep",
                out: Some(Ok((
                    "",
                    Reference {
                        optional: true,
                        repeating: true,
                        ..plain("g:::repeat:0:1")
                    },
                ))),
            },
            TestCase {
                input: "g/Rep",
                out: Some(Ok((
                    "",
                    Reference {
                        repeating: true,
                        ..plain("g")
                    },
                ))),
            },
        ];

        assert_test_cases(reference, tests);
    }

    #[test]
    fn parse_sections() {
        let tests = vec![
            TestCase {
                input: "a,b|c",
                out: Some(Ok((
                    "",
                    vec![
                        ("a", vec![plain("a")]),
                        ("b|c", vec![plain("b"), plain("c")]),
                    ],
                ))),
            },
            TestCase {
                input: "a",
                out: Some(Ok(("", vec![("a", vec![plain("a")])]))),
            },
            TestCase {
                input: "a,",
                out: None,
            },
            TestCase {
                input: "a,'b'",
                out: None,
            },
            TestCase {
                input: "",
                out: None,
            },
        ];

        assert_test_cases(sections, tests);
    }
}
