// Compiled chart geometry, in chart pixel space (origin top-left)

use serde::Serialize;

use crate::heatmap::Heatmap;
use crate::legend::Legend;
use crate::palette::{Rgb, Shape};
use crate::scale::AxisScale;

/// One scatterplot symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointMark {
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub area: f64,
    pub shape: Shape,
    pub color: Rgb,
}

/// One barchart bar. The anchor is the data point the bar grows down from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarMark {
    pub row: usize,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellMark {
    /// Index into `Heatmap::cells`
    pub cell: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub count: usize,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewBar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// All bars of one entity in the barchart overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewMark {
    pub row: usize,
    pub peak: f64,
    pub bars: Vec<OverviewBar>,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// The polyline of one entity across the date columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineMark {
    pub row: usize,
    pub segments: Vec<Segment>,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "marks", rename_all = "snake_case")]
pub enum Marks {
    Points(Vec<PointMark>),
    Bars(Vec<BarMark>),
    Cells(Vec<CellMark>),
    Overview(Vec<OverviewMark>),
    Timelines(Vec<TimelineMark>),
}

impl Marks {
    pub fn len(&self) -> usize {
        match self {
            Marks::Points(m) => m.len(),
            Marks::Bars(m) => m.len(),
            Marks::Cells(m) => m.len(),
            Marks::Overview(m) => m.len(),
            Marks::Timelines(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    /// Pixel position along the axis, chart space
    pub position: f64,
    /// Possibly shortened label
    pub label: String,
    pub full_label: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub ticks: Vec<Tick>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneGraph {
    pub marks: Marks,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub legend: Legend,
}

/// Everything derived from a graph state's keys and encodings
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    pub heatmap: Option<Heatmap>,
    pub scene: SceneGraph,
}
