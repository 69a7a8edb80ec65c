// Script parser: commands separated by `|`, `;` or newlines

use super::ast::Script;
use super::command::parse_command;
use super::lexer::ws;
use nom::{
    branch::alt,
    character::complete::{char, multispace0, one_of},
    combinator::{eof, map},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, terminated},
    IResult,
};

fn separator(input: &str) -> IResult<&str, ()> {
    map(many1(ws(one_of("|;\n\r"))), |_| ())(input)
}

fn comment(input: &str) -> IResult<&str, ()> {
    map(
        terminated(char('#'), nom::bytes::complete::take_till(|c| c == '\n')),
        |_| (),
    )(input)
}

/// Parse a complete script; blank lines and `#` comment lines are skipped
pub fn parse_script(input: &str) -> IResult<&str, Script> {
    let (input, _) = many0(alt((separator, map(ws(comment), |_| ()))))(input)?;
    let (input, commands) = separated_list0(
        many1(alt((separator, map(ws(comment), |_| ())))),
        parse_command,
    )(input)?;
    let (input, _) = many0(alt((separator, map(ws(comment), |_| ()))))(input)?;
    let (input, _) = delimited(multispace0, eof, multispace0)(input)?;
    Ok((input, Script { commands }))
}

/// Parse a script, reporting where parsing stopped on failure
pub fn parse(input: &str) -> anyhow::Result<Script> {
    match parse_script(input) {
        Ok((_, script)) => Ok(script),
        Err(e) => {
            let at = match &e {
                nom::Err::Error(inner) | nom::Err::Failure(inner) => inner.input,
                nom::Err::Incomplete(_) => "",
            };
            let line = at.lines().next().unwrap_or("").trim();
            anyhow::bail!("Failed to parse session script near '{}': {:?}", line, e.map(|inner| inner.code))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_state::{ChartType, KeySlot};
    use crate::parser::ast::Command;

    #[test]
    fn test_parse_mixed_separators() {
        let script = parse("x height | y weight; chart heatmap\nbrush 0 0 650 650").unwrap();
        assert_eq!(script.commands.len(), 4);
        assert_eq!(script.commands[2], Command::Chart(ChartType::Heatmap));
    }

    #[test]
    fn test_parse_blank_lines_and_comments() {
        let text = "\n# pick columns\ncolor group\n\n  # then drill down\nbrush 1 1 100 100\n";
        let script = parse(text).unwrap();
        assert_eq!(
            script.commands,
            vec![
                Command::Key {
                    slot: KeySlot::Color,
                    column: Some("group".into())
                },
                Command::Brush {
                    x1: 1.0,
                    y1: 1.0,
                    x2: 100.0,
                    y2: 100.0,
                    link: None
                },
            ]
        );
    }

    #[test]
    fn test_parse_empty_script() {
        assert_eq!(parse("").unwrap(), Script::default());
        assert_eq!(parse("  ;; | ").unwrap(), Script::default());
    }

    #[test]
    fn test_parse_error_reports_position() {
        let err = parse("x height | zoom 3").unwrap_err();
        assert!(err.to_string().contains("zoom 3"));
    }
}
