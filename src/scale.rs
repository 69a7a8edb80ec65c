// Column kind inference and pixel scales

use serde::{Deserialize, Serialize};

use crate::data::{parse_number, Dataset};
use crate::error::{Result, ValidationError};

/// Whether a column is plotted on a point (ordinal) or linear axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Categorical,
    Continuous,
}

/// How the kind of a column is decided from its raw values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferenceStrategy {
    /// Look only at the first row: numeric means continuous
    #[default]
    FirstRow,
    /// Continuous when every non-empty value is numeric (and one exists)
    Vote,
}

pub fn infer_kind(data: &Dataset, column: usize, strategy: InferenceStrategy) -> ColumnKind {
    let numeric = match strategy {
        InferenceStrategy::FirstRow => data
            .rows
            .first()
            .map(|_| parse_number(data.value(0, column)).is_some())
            .unwrap_or(false),
        InferenceStrategy::Vote => {
            let mut seen = false;
            let all_numeric = data
                .column(column)
                .filter(|v| !v.trim().is_empty())
                .all(|v| {
                    seen = true;
                    parse_number(v).is_some()
                });
            seen && all_numeric
        }
    };

    if numeric {
        ColumnKind::Continuous
    } else {
        ColumnKind::Categorical
    }
}

// =============================================================================
// Linear scale
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Extend the domain outward to multiples of the tick step
    pub fn nice(mut self, count: usize) -> Self {
        let (d0, d1) = self.domain;
        let step = tick_step(d0, d1, count);
        if step > 0.0 {
            self.domain = ((d0 / step).floor() * step, (d1 / step).ceil() * step);
        }
        self
    }

    /// Round tick values inside the domain
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let step = tick_step(d0, d1, count);
        if step <= 0.0 {
            return vec![d0];
        }
        let first = (d0 / step).ceil() as i64;
        let last = (d1 / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Tick step for `count` ticks over [start, stop]: 1, 2 or 5 times a power of ten
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let span = stop - start;
    if !span.is_finite() || span <= 0.0 || count == 0 {
        return 0.0;
    }
    let mut step = 10f64.powf((span / count as f64).log10().floor());
    let err = count as f64 / span * step;
    if err <= 0.15 {
        step *= 10.0;
    } else if err <= 0.35 {
        step *= 5.0;
    } else if err <= 0.75 {
        step *= 2.0;
    }
    step
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 {
        (-step.log10().floor()).max(0.0) as usize
    } else {
        0
    };
    let text = format!("{:.*}", decimals, value);
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

// =============================================================================
// Point scale
// =============================================================================

/// Ordinal scale placing categories at evenly spaced points.
///
/// One padding slot is reserved at each end so no category sits on the
/// axis line: category `i` occupies slot `i + 1` of `len + 2`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointScale {
    pub categories: Vec<String>,
    pub range: (f64, f64),
    /// Tick labels of the two padding slots
    pub pad_labels: (String, String),
}

impl PointScale {
    pub fn new(categories: Vec<String>, range: (f64, f64)) -> Self {
        Self {
            categories,
            range,
            pad_labels: (String::new(), " ".to_string()),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.categories.len() + 2
    }

    /// Distance between adjacent slots (negative on a descending range)
    pub fn step(&self) -> f64 {
        (self.range.1 - self.range.0) / (self.slot_count() - 1) as f64
    }

    pub fn slot_position(&self, slot: usize) -> f64 {
        self.range.0 + self.step() * slot as f64
    }

    pub fn slot_of(&self, value: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == value).map(|i| i + 1)
    }

    pub fn map(&self, value: &str) -> Option<f64> {
        self.slot_of(value).map(|slot| self.slot_position(slot))
    }

    /// Pixel positions of every slot, padding included
    pub fn slot_positions(&self) -> Vec<f64> {
        (0..self.slot_count()).map(|s| self.slot_position(s)).collect()
    }

    pub fn slot_label(&self, slot: usize) -> &str {
        if slot == 0 {
            &self.pad_labels.0
        } else if slot > self.categories.len() {
            &self.pad_labels.1
        } else {
            &self.categories[slot - 1]
        }
    }
}

// =============================================================================
// Axis scale
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AxisScale {
    Point(PointScale),
    Linear(LinearScale),
}

impl AxisScale {
    pub fn kind(&self) -> ColumnKind {
        match self {
            AxisScale::Point(_) => ColumnKind::Categorical,
            AxisScale::Linear(_) => ColumnKind::Continuous,
        }
    }

    /// Pixel position of a raw value, `None` when it is not on the scale
    pub fn map_value(&self, raw: &str) -> Option<f64> {
        match self {
            AxisScale::Point(p) => p.map(raw),
            AxisScale::Linear(l) => parse_number(raw).map(|v| l.map(v)),
        }
    }

    pub fn range(&self) -> (f64, f64) {
        match self {
            AxisScale::Point(p) => p.range,
            AxisScale::Linear(l) => l.range,
        }
    }

    /// Tick positions and labels; point scales tick every slot
    pub fn ticks(&self) -> Vec<(f64, String)> {
        match self {
            AxisScale::Point(p) => (0..p.slot_count())
                .map(|s| (p.slot_position(s), p.slot_label(s).to_string()))
                .collect(),
            AxisScale::Linear(l) => {
                let step = tick_step(l.domain.0, l.domain.1, 10);
                l.ticks(10)
                    .into_iter()
                    .map(|v| (l.map(v), format_tick(v, step)))
                    .collect()
            }
        }
    }
}

/// Distinct values of a column in first-seen order
pub fn distinct_values(data: &Dataset, column: usize) -> Vec<String> {
    let mut seen = indexmap::IndexSet::new();
    for value in data.column(column) {
        if !seen.contains(value) {
            seen.insert(value.to_string());
        }
    }
    seen.into_iter().collect()
}

/// Numeric extent of a column, ignoring values that do not parse
pub fn numeric_extent(data: &Dataset, column: usize) -> Option<(f64, f64)> {
    data.column(column)
        .filter_map(parse_number)
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Build the axis scale for `key` over the pixel `range`.
///
/// Continuous domains are padded by `padding` of their span (or by a tenth
/// of the value when every value is equal) and then niced.
pub fn infer_scale(
    data: &Dataset,
    key: &str,
    range: (f64, f64),
    padding: f64,
    strategy: InferenceStrategy,
) -> Result<AxisScale> {
    let column = data.column_index(key)?;
    if data.is_empty() {
        return Err(ValidationError::EmptyColumn { key: key.to_string() });
    }

    match infer_kind(data, column, strategy) {
        ColumnKind::Categorical => Ok(AxisScale::Point(PointScale::new(
            distinct_values(data, column),
            range,
        ))),
        ColumnKind::Continuous => {
            let (min, max) = numeric_extent(data, column)
                .ok_or_else(|| ValidationError::EmptyColumn { key: key.to_string() })?;
            let pad = if min == max {
                (max * 0.1).abs()
            } else {
                (max - min) * padding
            };
            Ok(AxisScale::Linear(
                LinearScale::new((min - pad, max + pad), range).nice(10),
            ))
        }
    }
}
