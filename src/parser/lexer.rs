// Lexical helpers for the session command language

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, satisfy, space0},
    combinator::{map, map_res, not, peek, value},
    number::complete::double,
    sequence::{delimited, terminated},
    IResult,
};

/// Wrap a parser so it skips spaces and tabs on both sides (not newlines)
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(space0, inner, space0)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A keyword that is not the prefix of a longer word
pub fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(
        tag_no_case(kw),
        not(peek(satisfy(is_word_char))),
    )
}

/// Bare word: letters, digits and `_ - . # /`
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| is_word_char(c) || "-.#/".contains(c)),
        String::from,
    )(input)
}

/// Double-quoted string without escapes
pub fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        String::from,
    )(input)
}

/// A quoted string or a bare word
pub fn word(input: &str) -> IResult<&str, String> {
    alt((string_literal, identifier))(input)
}

pub fn number_literal(input: &str) -> IResult<&str, f64> {
    double(input)
}

pub fn index_literal(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

pub fn boolean(input: &str) -> IResult<&str, bool> {
    alt((
        value(true, alt((keyword("yes"), keyword("true")))),
        value(false, alt((keyword("no"), keyword("false")))),
    ))(input)
}

/// Column name, or `None` for `none` / `--None--`
pub fn column_choice(input: &str) -> IResult<&str, Option<String>> {
    map(word, |w| {
        if w.eq_ignore_ascii_case("none") || w == crate::graph_state::NO_SELECTION {
            None
        } else {
            Some(w)
        }
    })(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_boundary() {
        assert!(keyword("x")("x height").is_ok());
        assert!(keyword("x")("xray").is_err());
        assert!(keyword("chart")("CHART heatmap").is_ok());
    }

    #[test]
    fn test_word() {
        assert_eq!(word("\"body mass\" rest"), Ok((" rest", "body mass".to_string())));
        assert_eq!(word("#ff0000"), Ok(("", "#ff0000".to_string())));
    }

    #[test]
    fn test_column_choice() {
        assert_eq!(column_choice("none"), Ok(("", None)));
        assert_eq!(column_choice("--None--"), Ok(("", None)));
        assert_eq!(column_choice("weight"), Ok(("", Some("weight".to_string()))));
    }

    #[test]
    fn test_boolean() {
        assert_eq!(boolean("yes"), Ok(("", true)));
        assert_eq!(boolean("no"), Ok(("", false)));
        assert!(boolean("maybe").is_err());
    }
}
