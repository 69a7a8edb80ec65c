// Color, size and shape encodings with their persistence rules

use indexmap::IndexMap;
use serde::Serialize;
use std::rc::Rc;

use crate::data::{parse_number, Dataset};
use crate::error::{Result, ValidationError};
use crate::graph_state::KeySlot;
use crate::palette::{categorical_palette, Rgb, Shape, MAX_COLOR_CATEGORIES};
use crate::scale::{distinct_values, infer_kind, numeric_extent, ColumnKind, InferenceStrategy, LinearScale};

/// Symbol area range of the size encoding
pub const SIZE_RANGE: (f64, f64) = (20.0, 200.0);

/// Symbol area used when no size key is set
pub const DEFAULT_SYMBOL_AREA: f64 = 75.0;

/// Which end of a continuous color scale an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuousColor {
    pub domain: (f64, f64),
    pub low: Rgb,
    pub high: Rgb,
}

impl ContinuousColor {
    pub fn color_at(&self, value: f64) -> Rgb {
        let (d0, d1) = self.domain;
        let t = if d1 == d0 { 0.0 } else { (value - d0) / (d1 - d0) };
        self.low.lerp(self.high, t)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColorEncoding {
    Categorical { colors: IndexMap<String, Rgb> },
    Continuous(ContinuousColor),
}

impl ColorEncoding {
    pub fn color_for(&self, raw: &str) -> Option<Rgb> {
        match self {
            ColorEncoding::Categorical { colors } => colors.get(raw).copied(),
            ColorEncoding::Continuous(scale) => parse_number(raw).map(|v| scale.color_at(v)),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColorEncoding::Categorical { .. } => ColumnKind::Categorical,
            ColorEncoding::Continuous(_) => ColumnKind::Continuous,
        }
    }
}

/// Shape assigned to each category, in first-seen order
pub type ShapeDict = IndexMap<String, Shape>;

/// The visual encodings of one graph state.
///
/// Color and shape are shared with parent links and copied on write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encodings {
    pub color: Option<Rc<ColorEncoding>>,
    pub size: Option<LinearScale>,
    pub shape: Option<Rc<ShapeDict>>,
    /// Key the shape dictionary was assigned for
    pub shape_key: Option<String>,
}

/// Build the color encoding for `key`.
///
/// A categorical column keeps the previous colors positionally when the
/// category count is unchanged; a continuous column keeps the previous
/// endpoint colors.
pub fn encode_color(
    data: &Dataset,
    key: &str,
    previous: Option<&ColorEncoding>,
    preferred: Rgb,
    strategy: InferenceStrategy,
) -> Result<ColorEncoding> {
    let column = data.column_index(key)?;

    match infer_kind(data, column, strategy) {
        ColumnKind::Categorical => {
            let categories = distinct_values(data, column);
            if categories.len() > MAX_COLOR_CATEGORIES {
                return Err(ValidationError::TooManyCategories {
                    slot: KeySlot::Color,
                    key: key.to_string(),
                    count: categories.len(),
                    max: MAX_COLOR_CATEGORIES,
                });
            }

            let colors = match previous {
                Some(ColorEncoding::Categorical { colors: prev }) if prev.len() == categories.len() => {
                    categories
                        .into_iter()
                        .zip(prev.values().copied())
                        .collect()
                }
                _ => {
                    let palette = categorical_palette(categories.len());
                    categories
                        .into_iter()
                        .enumerate()
                        .map(|(i, c)| (c, palette[i % palette.len()]))
                        .collect()
                }
            };
            Ok(ColorEncoding::Categorical { colors })
        }
        ColumnKind::Continuous => {
            let domain = numeric_extent(data, column)
                .ok_or_else(|| ValidationError::EmptyColumn { key: key.to_string() })?;
            let (low, high) = match previous {
                Some(ColorEncoding::Continuous(prev)) => (prev.low, prev.high),
                _ => (Rgb::WHITE, preferred),
            };
            Ok(ColorEncoding::Continuous(ContinuousColor { domain, low, high }))
        }
    }
}

/// Build the size scale for `key`; only continuous columns are accepted
pub fn encode_size(data: &Dataset, key: &str, strategy: InferenceStrategy) -> Result<LinearScale> {
    let column = data.column_index(key)?;
    if infer_kind(data, column, strategy) != ColumnKind::Continuous {
        return Err(ValidationError::NotNumeric {
            slot: KeySlot::Size,
            key: key.to_string(),
        });
    }
    let domain = numeric_extent(data, column)
        .ok_or_else(|| ValidationError::EmptyColumn { key: key.to_string() })?;
    Ok(LinearScale::new(domain, SIZE_RANGE))
}

/// Build or keep the shape dictionary for `key`.
///
/// The cardinality limit is always enforced; a new dictionary is assigned
/// only when the key changed or there is nothing to keep.
pub fn encode_shape(
    data: &Dataset,
    key: &str,
    previous: Option<&Rc<ShapeDict>>,
    key_changed: bool,
) -> Result<Rc<ShapeDict>> {
    let column = data.column_index(key)?;
    let categories = distinct_values(data, column);
    if categories.len() > Shape::ALL.len() {
        return Err(ValidationError::TooManyCategories {
            slot: KeySlot::Shape,
            key: key.to_string(),
            count: categories.len(),
            max: Shape::ALL.len(),
        });
    }

    match previous {
        Some(prev) if !key_changed => Ok(Rc::clone(prev)),
        _ => Ok(Rc::new(
            categories.into_iter().zip(Shape::ALL.iter().copied()).collect(),
        )),
    }
}
