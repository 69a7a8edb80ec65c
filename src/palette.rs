// Colors, categorical palettes and point symbols

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque 8-bit RGB color. Serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Linear blend in RGB space, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> String {
        c.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Accepts `#rrggbb`, `#rgb`, `rgb(r, g, b)` and a handful of names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| format!("invalid hex color '{}'", s));
        }
        if let Some(body) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            let parts: Vec<u8> = body
                .split(',')
                .filter_map(|p| p.trim().parse::<u8>().ok())
                .collect();
            return match parts.as_slice() {
                [r, g, b] => Ok(Rgb(*r, *g, *b)),
                _ => Err(format!("invalid rgb() color '{}'", s)),
            };
        }
        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Rgb::BLACK),
            "white" => Ok(Rgb::WHITE),
            "red" => Ok(Rgb(255, 0, 0)),
            "green" => Ok(Rgb(0, 128, 0)),
            "blue" => Ok(Rgb(0, 0, 255)),
            "darkblue" => Ok(Rgb(0, 0, 139)),
            "lightgrey" | "lightgray" => Ok(Rgb(211, 211, 211)),
            "grey" | "gray" => Ok(Rgb(128, 128, 128)),
            "yellow" => Ok(Rgb(255, 255, 0)),
            "orange" => Ok(Rgb(255, 165, 0)),
            "purple" => Ok(Rgb(128, 0, 128)),
            _ => Err(format!("unknown color '{}'", s)),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some(Rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

pub const CATEGORY10: [Rgb; 10] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0x8c, 0x56, 0x4b),
    Rgb(0xe3, 0x77, 0xc2),
    Rgb(0x7f, 0x7f, 0x7f),
    Rgb(0xbc, 0xbd, 0x22),
    Rgb(0x17, 0xbe, 0xcf),
];

pub const CATEGORY20: [Rgb; 20] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xae, 0xc7, 0xe8),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0xff, 0xbb, 0x78),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0x98, 0xdf, 0x8a),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0xff, 0x98, 0x96),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0xc5, 0xb0, 0xd5),
    Rgb(0x8c, 0x56, 0x4b),
    Rgb(0xc4, 0x9c, 0x94),
    Rgb(0xe3, 0x77, 0xc2),
    Rgb(0xf7, 0xb6, 0xd2),
    Rgb(0x7f, 0x7f, 0x7f),
    Rgb(0xc7, 0xc7, 0xc7),
    Rgb(0xbc, 0xbd, 0x22),
    Rgb(0xdb, 0xdb, 0x8d),
    Rgb(0x17, 0xbe, 0xcf),
    Rgb(0x9e, 0xda, 0xe5),
];

/// Heatmap ramp, light to dark
pub const HEAT_COLORS: [Rgb; 5] = [
    Rgb(0xff, 0xff, 0xcc),
    Rgb(0xfe, 0xd9, 0x76),
    Rgb(0xfd, 0x8d, 0x3c),
    Rgb(0xe3, 0x1a, 0x1c),
    Rgb(0xb3, 0x00, 0x00),
];

/// The most categories a categorical color encoding accepts
pub const MAX_COLOR_CATEGORIES: usize = CATEGORY20.len();

/// Default base color of a fresh chain
pub fn default_preferred_color() -> Rgb {
    CATEGORY10[0]
}

/// Palette for `count` categories: category10 up to ten, category20 beyond.
pub fn categorical_palette(count: usize) -> &'static [Rgb] {
    if count <= CATEGORY10.len() {
        &CATEGORY10
    } else {
        &CATEGORY20
    }
}

/// Point symbol used by the shape encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    Circle,
    Cross,
    Diamond,
    Square,
    TriangleDown,
    TriangleUp,
}

impl Shape {
    pub const ALL: [Shape; 6] = [
        Shape::Circle,
        Shape::Cross,
        Shape::Diamond,
        Shape::Square,
        Shape::TriangleDown,
        Shape::TriangleUp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Cross => "cross",
            Shape::Diamond => "diamond",
            Shape::Square => "square",
            Shape::TriangleDown => "triangle-down",
            Shape::TriangleUp => "triangle-up",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shape::ALL
            .iter()
            .copied()
            .find(|shape| shape.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown shape '{}'", s))
    }
}
