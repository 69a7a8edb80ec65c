// Syntax tree of the session command language

use crate::encoding::Endpoint;
use crate::graph_state::{ChartType, KeySlot};
use crate::palette::{Rgb, Shape};

/// A parsed session script
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub commands: Vec<Command>,
}

/// One user interaction
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch the focused link's chart type
    Chart(ChartType),
    /// Choose a column for a key selector; `None` clears an optional key
    Key {
        slot: KeySlot,
        column: Option<String>,
    },
    /// Drag a rectangle in chart pixels, on the focused link unless `link` is given
    Brush {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        link: Option<usize>,
    },
    Focus(usize),
    /// Answer for the next yes/no prompt
    Confirm(bool),
    Recolor {
        category: String,
        color: Rgb,
    },
    Endpoint {
        endpoint: Endpoint,
        color: Rgb,
    },
    Reshape {
        category: String,
        shape: Shape,
    },
    /// Split the timeline groups on another column
    Group(String),
    /// Restart the chain on a timeline group
    Start(usize),
    /// Autocomplete a data point name
    Search(String),
    Details(String),
}
