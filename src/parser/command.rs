// Parsers for individual session commands

use super::ast::Command;
use super::lexer::{boolean, column_choice, index_literal, keyword, number_literal, word, ws};
use crate::encoding::Endpoint;
use crate::graph_state::{ChartType, KeySlot};
use crate::palette::{Rgb, Shape};
use nom::{
    branch::alt,
    combinator::{map, map_res, opt, value},
    sequence::{preceded, tuple},
    IResult,
};

/// chart <type>
pub fn parse_chart(input: &str) -> IResult<&str, Command> {
    let (input, _) = ws(keyword("chart"))(input)?;
    let (input, chart) = ws(map_res(word, |w| w.parse::<ChartType>()))(input)?;
    Ok((input, Command::Chart(chart)))
}

fn key_slot(input: &str) -> IResult<&str, KeySlot> {
    alt((
        value(KeySlot::X, keyword("x")),
        value(KeySlot::Y, keyword("y")),
        value(KeySlot::Color, keyword("color")),
        value(KeySlot::Size, keyword("size")),
        value(KeySlot::Shape, keyword("shape")),
    ))(input)
}

/// x|y|color|size|shape <column|none>
pub fn parse_key(input: &str) -> IResult<&str, Command> {
    let (input, slot) = ws(key_slot)(input)?;
    let (input, column) = ws(column_choice)(input)?;
    Ok((input, Command::Key { slot, column }))
}

/// brush x1 y1 x2 y2 [on N]
pub fn parse_brush(input: &str) -> IResult<&str, Command> {
    let (input, _) = ws(keyword("brush"))(input)?;
    let (input, (x1, y1, x2, y2)) = tuple((
        ws(number_literal),
        ws(number_literal),
        ws(number_literal),
        ws(number_literal),
    ))(input)?;
    let (input, link) = opt(preceded(ws(keyword("on")), ws(index_literal)))(input)?;
    Ok((input, Command::Brush { x1, y1, x2, y2, link }))
}

pub fn parse_focus(input: &str) -> IResult<&str, Command> {
    map(preceded(ws(keyword("focus")), ws(index_literal)), Command::Focus)(input)
}

pub fn parse_confirm(input: &str) -> IResult<&str, Command> {
    map(preceded(ws(keyword("confirm")), ws(boolean)), Command::Confirm)(input)
}

fn color(input: &str) -> IResult<&str, Rgb> {
    map_res(word, |w| w.parse::<Rgb>())(input)
}

/// recolor <category> <color>
pub fn parse_recolor(input: &str) -> IResult<&str, Command> {
    let (input, _) = ws(keyword("recolor"))(input)?;
    let (input, category) = ws(word)(input)?;
    let (input, color) = ws(color)(input)?;
    Ok((input, Command::Recolor { category, color }))
}

/// endpoint low|high <color>
pub fn parse_endpoint(input: &str) -> IResult<&str, Command> {
    let (input, _) = ws(keyword("endpoint"))(input)?;
    let (input, endpoint) = ws(alt((
        value(Endpoint::Low, keyword("low")),
        value(Endpoint::High, keyword("high")),
    )))(input)?;
    let (input, color) = ws(color)(input)?;
    Ok((input, Command::Endpoint { endpoint, color }))
}

/// reshape <category> <shape>
pub fn parse_reshape(input: &str) -> IResult<&str, Command> {
    let (input, _) = ws(keyword("reshape"))(input)?;
    let (input, category) = ws(word)(input)?;
    let (input, shape) = ws(map_res(word, |w| w.parse::<Shape>()))(input)?;
    Ok((input, Command::Reshape { category, shape }))
}

/// group <column>
pub fn parse_group(input: &str) -> IResult<&str, Command> {
    map(preceded(ws(keyword("group")), ws(word)), Command::Group)(input)
}

pub fn parse_start(input: &str) -> IResult<&str, Command> {
    map(preceded(ws(keyword("start")), ws(index_literal)), Command::Start)(input)
}

pub fn parse_search(input: &str) -> IResult<&str, Command> {
    map(preceded(ws(keyword("search")), ws(word)), Command::Search)(input)
}

pub fn parse_details(input: &str) -> IResult<&str, Command> {
    map(preceded(ws(keyword("details")), ws(word)), Command::Details)(input)
}

/// Any single command
pub fn parse_command(input: &str) -> IResult<&str, Command> {
    alt((
        parse_chart,
        parse_brush,
        parse_focus,
        parse_confirm,
        parse_recolor,
        parse_endpoint,
        parse_reshape,
        parse_group,
        parse_start,
        parse_search,
        parse_details,
        parse_key,
    ))(input)
}
