// Compile a graph state's data, keys and encodings into pixel geometry

use crate::data::{parse_number, Dataset};
use crate::encoding::{Encodings, DEFAULT_SYMBOL_AREA};
use crate::error::{Result, ValidationError};
use crate::graph_state::{ChartType, Keys};
use crate::heatmap::{build_heatmap, Heatmap};
use crate::ir::{
    Axis, BarMark, CellMark, Marks, OverviewBar, OverviewMark, PointMark, SceneGraph, Segment, Tick,
    TimelineMark, View,
};
use crate::legend::build_legend;
use crate::palette::{Rgb, Shape};
use crate::scale::{distinct_values, infer_scale, AxisScale};
use crate::timeseries::TimeSeriesLayout;
use crate::ChartOptions;

/// Widest a barchart bar may be
pub const MAX_BAR_WIDTH: f64 = 60.0;
/// Narrower bars than this mean too many categories
pub const MIN_BAR_WIDTH: f64 = 1.5;
const BAR_GAP: f64 = 3.0;
const OVERVIEW_BAR_GAP: f64 = 5.0;
const OVERVIEW_BAR_PADDING: f64 = 5.0;
const MAX_VISIBLE_TICKS: usize = 10;
const MAX_VISIBLE_DATE_TICKS: usize = 8;

/// Everything the compiler reads from a graph state
pub struct CompileInput<'a> {
    pub data: &'a Dataset,
    pub chart: ChartType,
    pub keys: &'a Keys,
    pub encodings: &'a Encodings,
    pub preferred: Rgb,
    pub options: &'a ChartOptions,
    pub layout: Option<&'a TimeSeriesLayout>,
}

pub fn compile(input: &CompileInput) -> Result<View> {
    let options = input.options;

    let (x_scale, y_scale) = match input.chart {
        ChartType::BarchartOverview | ChartType::Timeline => {
            let layout = input
                .layout
                .ok_or(ValidationError::UnavailableChartType(input.chart))?;
            let x = layout.x_scale(options.x_range());
            let y_range = (options.inner_height() - 1.0, 0.0);
            let y = layout.y_scale(input.data, y_range);
            (AxisScale::Point(x), AxisScale::Linear(y))
        }
        _ => (
            infer_scale(
                input.data,
                &input.keys.x,
                options.x_range(),
                options.scale_padding,
                options.inference,
            )?,
            infer_scale(
                input.data,
                &input.keys.y,
                options.y_range(),
                options.scale_padding,
                options.inference,
            )?,
        ),
    };

    let heatmap = if input.chart == ChartType::Heatmap {
        Some(build_heatmap(
            input.data,
            &input.keys.x,
            &input.keys.y,
            &x_scale,
            &y_scale,
            options.heat_squares,
        )?)
    } else {
        None
    };

    let marks = match input.chart {
        ChartType::Scatterplot => Marks::Points(point_marks(input, &x_scale, &y_scale)?),
        ChartType::Barchart => Marks::Bars(bar_marks(input, &x_scale, &y_scale)?),
        ChartType::Heatmap => match &heatmap {
            Some(h) => Marks::Cells(cell_marks(options, h, &x_scale, &y_scale)),
            None => Marks::Cells(Vec::new()),
        },
        ChartType::BarchartOverview => Marks::Overview(overview_marks(input, &x_scale, &y_scale)),
        ChartType::Timeline => Marks::Timelines(timeline_marks(input, &x_scale, &y_scale)),
    };

    let (x_title, y_title, x_limit) = match input.chart {
        ChartType::BarchartOverview | ChartType::Timeline => {
            ("Date".to_string(), "Value".to_string(), MAX_VISIBLE_DATE_TICKS)
        }
        _ => (input.keys.x.clone(), input.keys.y.clone(), MAX_VISIBLE_TICKS),
    };
    let (ox, oy) = options.plot_origin();
    let scene = SceneGraph {
        marks,
        x_axis: build_axis(x_title, &x_scale, ox, x_limit, options.max_label_length),
        y_axis: build_axis(y_title, &y_scale, oy, MAX_VISIBLE_TICKS, options.max_label_length),
        legend: build_legend(input.chart, input.keys, input.encodings, heatmap.as_ref()),
    };

    tracing::debug!(chart = %input.chart, marks = scene.marks.len(), "compiled view");

    Ok(View {
        x_scale,
        y_scale,
        heatmap,
        scene,
    })
}

// =============================================================================
// Axes
// =============================================================================

/// Shorten non-numeric labels to "..." plus their last `max_len` characters
pub fn format_label(label: &str, max_len: usize) -> String {
    let count = label.chars().count();
    if parse_number(label).is_some() || count <= max_len {
        return label.to_string();
    }
    let tail: String = label.chars().skip(count - max_len).collect();
    format!("...{}", tail)
}

/// Which of `n` ticks stay visible when at most about `limit` fit
pub fn tick_visibility(n: usize, limit: usize) -> Vec<bool> {
    if n <= limit || limit == 0 {
        return vec![true; n];
    }
    let interval = n / limit;
    (0..n).map(|i| i % interval == 0 || i + 1 == n).collect()
}

fn build_axis(title: String, scale: &AxisScale, offset: f64, limit: usize, max_len: usize) -> Axis {
    let raw = scale.ticks();
    let visible = tick_visibility(raw.len(), limit);
    let ticks = raw
        .into_iter()
        .zip(visible)
        .map(|((position, label), visible)| Tick {
            position: offset + position,
            label: format_label(&label, max_len),
            full_label: label,
            visible,
        })
        .collect();
    Axis { title, ticks }
}

// =============================================================================
// Marks
// =============================================================================

/// Chart-space position of a data point; values off the scale land on 0
fn anchor(
    options: &ChartOptions,
    x_scale: &AxisScale,
    y_scale: &AxisScale,
    raw_x: &str,
    raw_y: &str,
) -> (f64, f64) {
    let (ox, oy) = options.plot_origin();
    let x = x_scale.map_value(raw_x).map(|p| ox + p).unwrap_or(0.0);
    let y = y_scale.map_value(raw_y).map(|p| oy + p).unwrap_or(0.0);
    (x, y)
}

fn fill_color(input: &CompileInput, row: usize) -> Result<Rgb> {
    match (&input.keys.color, &input.encodings.color) {
        (Some(key), Some(encoding)) => {
            let col = input.data.column_index(key)?;
            Ok(encoding
                .color_for(input.data.value(row, col))
                .unwrap_or(input.preferred))
        }
        _ => Ok(input.preferred),
    }
}

fn point_marks(input: &CompileInput, xs: &AxisScale, ys: &AxisScale) -> Result<Vec<PointMark>> {
    let data = input.data;
    let x_col = data.column_index(&input.keys.x)?;
    let y_col = data.column_index(&input.keys.y)?;
    let size = match (&input.keys.size, &input.encodings.size) {
        (Some(key), Some(scale)) => Some((data.column_index(key)?, scale)),
        _ => None,
    };
    let shape = match (&input.keys.shape, &input.encodings.shape) {
        (Some(key), Some(dict)) => Some((data.column_index(key)?, dict)),
        _ => None,
    };

    (0..data.len())
        .map(|row| {
            let (x, y) = anchor(input.options, xs, ys, data.value(row, x_col), data.value(row, y_col));
            let area = size
                .and_then(|(col, scale)| parse_number(data.value(row, col)).map(|v| scale.map(v)))
                .unwrap_or(DEFAULT_SYMBOL_AREA);
            let shape = shape
                .and_then(|(col, dict)| dict.get(data.value(row, col)).copied())
                .unwrap_or(Shape::Circle);
            Ok(PointMark {
                row,
                x,
                y,
                area,
                shape,
                color: fill_color(input, row)?,
            })
        })
        .collect()
}

/// Bar width for the x axis, or `TooManyBars` when bars would be unreadable
pub fn bar_width(options: &ChartOptions, bars: usize) -> Result<f64> {
    let usable = options.inner_width() * (1.0 - options.scale_padding * 2.0);
    let width = usable / bars.max(1) as f64 - BAR_GAP;
    if width < MIN_BAR_WIDTH {
        return Err(ValidationError::TooManyBars { width });
    }
    Ok(width.min(MAX_BAR_WIDTH))
}

fn bar_marks(input: &CompileInput, xs: &AxisScale, ys: &AxisScale) -> Result<Vec<BarMark>> {
    let data = input.data;
    let options = input.options;
    let x_col = data.column_index(&input.keys.x)?;
    let y_col = data.column_index(&input.keys.y)?;

    let bars = match xs {
        AxisScale::Point(p) => p.categories.len(),
        AxisScale::Linear(_) => distinct_values(data, x_col).len(),
    };
    let width = bar_width(options, bars)?;
    let baseline = options.height as f64 - options.svg_padding - options.chart_padding;

    (0..data.len())
        .map(|row| {
            let (ax, ay) = anchor(options, xs, ys, data.value(row, x_col), data.value(row, y_col));
            Ok(BarMark {
                row,
                anchor_x: ax,
                anchor_y: ay,
                x: ax - width / 2.0,
                y: ay,
                width,
                height: (baseline - ay).max(0.0),
                color: fill_color(input, row)?,
            })
        })
        .collect()
}

/// Pixel span (start, length) of a heatmap bin along one axis
fn cell_span(scale: &AxisScale, origin: f64, extent: f64, offset: f64, full: f64) -> (f64, f64) {
    match scale {
        AxisScale::Linear(l) => {
            let a = l.map(origin);
            let b = l.map(origin + extent);
            (offset + a.min(b), (b - a).abs())
        }
        AxisScale::Point(p) if p.categories.len() <= 1 => (offset, full),
        AxisScale::Point(p) => {
            let step = p.step();
            let center = offset + p.slot_position(origin as usize);
            if step >= 0.0 {
                (center - step / 2.0, step * extent)
            } else {
                // descending axis: the bin grows upward from its first slot
                let tick = -step;
                let bottom = center + tick / 2.0;
                (bottom - tick * extent, tick * extent)
            }
        }
    }
}

fn cell_marks(options: &ChartOptions, heatmap: &Heatmap, xs: &AxisScale, ys: &AxisScale) -> Vec<CellMark> {
    let (ox, oy) = options.plot_origin();
    heatmap
        .cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let (x, width) = cell_span(xs, cell.x, cell.width, ox, options.inner_width());
            let (y, height) = cell_span(ys, cell.y, cell.height, oy, options.inner_height());
            CellMark {
                cell: i,
                x,
                y,
                width,
                height,
                count: cell.count,
                color: heatmap.color_for(cell.count),
            }
        })
        .collect()
}

fn overview_marks(input: &CompileInput, xs: &AxisScale, ys: &AxisScale) -> Vec<OverviewMark> {
    let (AxisScale::Point(xp), AxisScale::Linear(yl)) = (xs, ys) else {
        return Vec::new();
    };
    let Some(layout) = input.layout else {
        return Vec::new();
    };
    let options = input.options;
    let data = input.data;
    let (ox, _) = options.plot_origin();
    let labels = layout.labels();

    let usable = options.inner_width() * (1.0 - options.scale_padding * 2.0);
    let width = (usable / data.headers.len().max(1) as f64 - OVERVIEW_BAR_GAP).max(1.0);
    let floor = options.height as f64 - options.svg_padding - options.chart_padding - OVERVIEW_BAR_PADDING;

    let mut marks: Vec<OverviewMark> = (0..data.len())
        .map(|row| {
            let mut peak = f64::NEG_INFINITY;
            let bars = layout
                .columns
                .iter()
                .zip(&labels)
                .map(|(column, label)| {
                    let value = parse_number(data.value(row, column.index)).unwrap_or(yl.domain.0);
                    peak = peak.max(value);
                    let top = yl.map(value);
                    OverviewBar {
                        x: ox + xp.map(label).unwrap_or(0.0) - width / 2.0,
                        y: top + OVERVIEW_BAR_PADDING - 1.0,
                        width,
                        height: (floor - top).max(0.0),
                    }
                })
                .collect();
            OverviewMark {
                row,
                peak,
                bars,
                color: input.preferred,
            }
        })
        .collect();

    // tallest first, so shorter bars are drawn over them
    marks.sort_by(|a, b| b.peak.total_cmp(&a.peak).then(a.row.cmp(&b.row)));
    marks
}

fn timeline_marks(input: &CompileInput, xs: &AxisScale, ys: &AxisScale) -> Vec<TimelineMark> {
    let (AxisScale::Point(xp), AxisScale::Linear(yl)) = (xs, ys) else {
        return Vec::new();
    };
    let Some(layout) = input.layout else {
        return Vec::new();
    };
    let (ox, oy) = input.options.plot_origin();
    let labels = layout.labels();

    (0..input.data.len())
        .map(|row| {
            let points: Vec<(f64, f64)> = layout
                .columns
                .iter()
                .zip(&labels)
                .map(|(column, label)| {
                    let value = layout.value(input.data, row, column);
                    (ox + xp.map(label).unwrap_or(0.0), oy + yl.map(value))
                })
                .collect();
            let segments = points
                .windows(2)
                .map(|w| Segment {
                    x1: w[0].0,
                    y1: w[0].1,
                    x2: w[1].0,
                    y2: w[1].1,
                })
                .collect();
            TimelineMark {
                row,
                segments,
                color: input.preferred,
            }
        })
        .collect()
}
