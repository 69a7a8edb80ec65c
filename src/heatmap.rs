// Heatmap binning

use serde::Serialize;

use crate::data::{parse_number, Dataset};
use crate::error::Result;
use crate::palette::{Rgb, HEAT_COLORS};
use crate::scale::{AxisScale, ColumnKind};

/// Bin layout along one heatmap axis, in axis space.
///
/// Continuous axes bin the scale domain; categorical axes bin category
/// slots (the first category is slot 1).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisBins {
    pub kind: ColumnKind,
    pub min: f64,
    pub step: f64,
    pub count: usize,
    /// Extent of the last categorical bin when the categories do not divide evenly
    pub remainder: f64,
}

impl AxisBins {
    pub fn for_scale(scale: &AxisScale, desired: usize) -> Self {
        let desired = desired.max(1);
        match scale {
            AxisScale::Linear(l) => Self {
                kind: ColumnKind::Continuous,
                min: l.domain.0,
                step: (l.domain.1 - l.domain.0).abs() / desired as f64,
                count: desired,
                remainder: 0.0,
            },
            AxisScale::Point(p) => {
                let n = p.categories.len().max(1);
                let step = n.div_ceil(desired).max(1);
                Self {
                    kind: ColumnKind::Categorical,
                    min: 1.0,
                    step: step as f64,
                    count: n.div_ceil(step),
                    remainder: (n % step) as f64,
                }
            }
        }
    }

    /// Bin of an axis-space value, clamped so every row lands somewhere
    pub fn bin_of(&self, value: Option<f64>) -> usize {
        let last = self.count.saturating_sub(1);
        match value {
            Some(v) if self.step > 0.0 && v.is_finite() => {
                let bin = ((v - self.min) / self.step).floor();
                if bin <= 0.0 {
                    0
                } else {
                    (bin as usize).min(last)
                }
            }
            _ => 0,
        }
    }

    pub fn origin(&self, bin: usize) -> f64 {
        self.min + self.step * bin as f64
    }

    pub fn extent(&self, bin: usize) -> f64 {
        if bin + 1 == self.count && self.remainder > 0.0 {
            self.remainder
        } else {
            self.step
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    /// Bin origin in axis space
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Category at the bin origin, for categorical axes
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub count: usize,
    /// Row indices into the dataset the heatmap was built from
    pub members: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub x_bins: AxisBins,
    pub y_bins: AxisBins,
    /// Row-major, bottom row first
    pub cells: Vec<HeatmapCell>,
}

impl Heatmap {
    pub fn count_range(&self) -> (usize, usize) {
        let min = self.cells.iter().map(|c| c.count).min().unwrap_or(0);
        let max = self.cells.iter().map(|c| c.count).max().unwrap_or(0);
        (min, max)
    }

    pub fn color_for(&self, count: usize) -> Rgb {
        let (min, max) = self.count_range();
        heat_color(count as f64, min as f64, max as f64)
    }
}

/// Five-stop ramp spread evenly over [min, max]
pub fn heat_color(value: f64, min: f64, max: f64) -> Rgb {
    if max <= min {
        return HEAT_COLORS[0];
    }
    let segments = (HEAT_COLORS.len() - 1) as f64;
    let t = ((value - min) / (max - min)).clamp(0.0, 1.0) * segments;
    let seg = (t.floor() as usize).min(HEAT_COLORS.len() - 2);
    HEAT_COLORS[seg].lerp(HEAT_COLORS[seg + 1], t - seg as f64)
}

fn axis_value(scale: &AxisScale, raw: &str) -> Option<f64> {
    match scale {
        AxisScale::Linear(_) => parse_number(raw),
        AxisScale::Point(p) => p.slot_of(raw).map(|s| s as f64),
    }
}

fn bin_label(scale: &AxisScale, bins: &AxisBins, bin: usize) -> Option<String> {
    match scale {
        AxisScale::Point(p) => Some(p.slot_label(bins.origin(bin) as usize).to_string()),
        AxisScale::Linear(_) => None,
    }
}

/// Bin every row of `data` into a grid of roughly `target_cells` cells
pub fn build_heatmap(
    data: &Dataset,
    x_key: &str,
    y_key: &str,
    x_scale: &AxisScale,
    y_scale: &AxisScale,
    target_cells: usize,
) -> Result<Heatmap> {
    let x_col = data.column_index(x_key)?;
    let y_col = data.column_index(y_key)?;

    let desired = (target_cells as f64).sqrt().floor() as usize;
    let x_bins = AxisBins::for_scale(x_scale, desired);
    let y_bins = AxisBins::for_scale(y_scale, desired);

    let mut cells = Vec::with_capacity(x_bins.count * y_bins.count);
    for row in 0..y_bins.count {
        for col in 0..x_bins.count {
            cells.push(HeatmapCell {
                x: x_bins.origin(col),
                y: y_bins.origin(row),
                width: x_bins.extent(col),
                height: y_bins.extent(row),
                x_label: bin_label(x_scale, &x_bins, col),
                y_label: bin_label(y_scale, &y_bins, row),
                count: 0,
                members: Vec::new(),
            });
        }
    }

    for index in 0..data.len() {
        let col = x_bins.bin_of(axis_value(x_scale, data.value(index, x_col)));
        let row = y_bins.bin_of(axis_value(y_scale, data.value(index, y_col)));
        let cell = &mut cells[row * x_bins.count + col];
        cell.count += 1;
        cell.members.push(index);
    }

    tracing::debug!(
        cols = x_bins.count,
        rows = y_bins.count,
        points = data.len(),
        "built heatmap"
    );

    Ok(Heatmap { x_bins, y_bins, cells })
}
