// Legend model for color, size and shape encodings

use serde::Serialize;

use crate::encoding::{ColorEncoding, Encodings, Endpoint};
use crate::graph_state::{ChartType, Keys};
use crate::heatmap::Heatmap;
use crate::palette::{Rgb, Shape};

const CONTINUOUS_STEPS: usize = 5;

/// What an edit on a legend row changes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "edit", content = "target", rename_all = "snake_case")]
pub enum LegendEdit {
    CategoryColor(String),
    EndpointColor(Endpoint),
    CategoryShape(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendRow {
    pub label: String,
    pub color: Option<Rgb>,
    pub shape: Option<Shape>,
    pub area: Option<f64>,
    pub edit: Option<LegendEdit>,
}

impl LegendRow {
    fn swatch(label: String, color: Rgb, edit: Option<LegendEdit>) -> Self {
        Self { label, color: Some(color), shape: None, area: None, edit }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendSection {
    pub title: String,
    pub rows: Vec<LegendRow>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Legend {
    pub sections: Vec<LegendSection>,
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Evenly spaced values over [lo, hi]; a flat domain yields one value
fn steps(lo: f64, hi: f64) -> Vec<f64> {
    let step = (hi - lo) / (CONTINUOUS_STEPS - 1) as f64;
    if step == 0.0 || !step.is_finite() {
        return vec![lo];
    }
    (0..CONTINUOUS_STEPS).map(|i| lo + step * i as f64).collect()
}

fn color_section(title: &str, encoding: &ColorEncoding) -> LegendSection {
    let rows = match encoding {
        ColorEncoding::Categorical { colors } => colors
            .iter()
            .map(|(category, color)| {
                LegendRow::swatch(
                    category.clone(),
                    *color,
                    Some(LegendEdit::CategoryColor(category.clone())),
                )
            })
            .collect(),
        ColorEncoding::Continuous(scale) => {
            let values = steps(scale.domain.0, scale.domain.1);
            let last = values.len() - 1;
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let edit = if i == 0 {
                        Some(LegendEdit::EndpointColor(Endpoint::Low))
                    } else if i == last {
                        Some(LegendEdit::EndpointColor(Endpoint::High))
                    } else {
                        None
                    };
                    LegendRow::swatch(format_value(v), scale.color_at(v), edit)
                })
                .collect()
        }
    };
    LegendSection { title: title.to_string(), rows }
}

fn heat_section(heatmap: &Heatmap) -> LegendSection {
    let (lo, hi) = heatmap.count_range();
    let rows = steps(lo as f64, hi as f64)
        .into_iter()
        .map(|v| LegendRow::swatch(format_value(v.round()), heatmap.color_for(v.round() as usize), None))
        .collect();
    LegendSection {
        title: "Number of Data Points".to_string(),
        rows,
    }
}

pub fn build_legend(
    chart: ChartType,
    keys: &Keys,
    encodings: &Encodings,
    heatmap: Option<&Heatmap>,
) -> Legend {
    let mut sections = Vec::new();

    if let Some(heatmap) = heatmap {
        sections.push(heat_section(heatmap));
    }

    if matches!(chart, ChartType::Scatterplot | ChartType::Barchart) {
        if let (Some(key), Some(color)) = (&keys.color, &encodings.color) {
            sections.push(color_section(key, color));
        }
    }

    if chart == ChartType::Scatterplot {
        if let (Some(key), Some(size)) = (&keys.size, &encodings.size) {
            let rows = steps(size.domain.0, size.domain.1)
                .into_iter()
                .map(|v| LegendRow {
                    label: format_value(v),
                    color: None,
                    shape: Some(Shape::Circle),
                    area: Some(size.map(v)),
                    edit: None,
                })
                .collect();
            sections.push(LegendSection { title: key.clone(), rows });
        }

        if let (Some(key), Some(shapes)) = (&keys.shape, &encodings.shape) {
            let rows = shapes
                .iter()
                .map(|(category, shape)| LegendRow {
                    label: category.clone(),
                    color: None,
                    shape: Some(*shape),
                    area: None,
                    edit: Some(LegendEdit::CategoryShape(category.clone())),
                })
                .collect();
            sections.push(LegendSection { title: key.clone(), rows });
        }
    }

    Legend { sections }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ContinuousColor;
    use indexmap::IndexMap;
    use std::rc::Rc;

    fn keys_with_color() -> Keys {
        Keys {
            x: "x".into(),
            y: "y".into(),
            color: Some("c".into()),
            size: None,
            shape: None,
        }
    }

    #[test]
    fn test_continuous_color_legend_has_five_steps() {
        let encodings = Encodings {
            color: Some(Rc::new(ColorEncoding::Continuous(ContinuousColor {
                domain: (0.0, 8.0),
                low: Rgb::WHITE,
                high: Rgb::BLACK,
            }))),
            ..Default::default()
        };
        let legend = build_legend(ChartType::Scatterplot, &keys_with_color(), &encodings, None);
        let rows = &legend.sections[0].rows;
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2].label, "4");
        assert_eq!(rows[0].edit, Some(LegendEdit::EndpointColor(Endpoint::Low)));
        assert_eq!(rows[4].edit, Some(LegendEdit::EndpointColor(Endpoint::High)));
        assert_eq!(rows[1].edit, None);
    }

    #[test]
    fn test_flat_continuous_legend_breaks_after_one_row() {
        let encodings = Encodings {
            color: Some(Rc::new(ColorEncoding::Continuous(ContinuousColor {
                domain: (3.0, 3.0),
                low: Rgb::WHITE,
                high: Rgb::BLACK,
            }))),
            ..Default::default()
        };
        let legend = build_legend(ChartType::Barchart, &keys_with_color(), &encodings, None);
        assert_eq!(legend.sections[0].rows.len(), 1);
    }

    #[test]
    fn test_heatmap_hides_color_section() {
        let mut colors = IndexMap::new();
        colors.insert("a".to_string(), Rgb::BLACK);
        let encodings = Encodings {
            color: Some(Rc::new(ColorEncoding::Categorical { colors })),
            ..Default::default()
        };
        let legend = build_legend(ChartType::Heatmap, &keys_with_color(), &encodings, None);
        assert!(legend.sections.is_empty());
        let scatter = build_legend(ChartType::Scatterplot, &keys_with_color(), &encodings, None);
        assert_eq!(
            scatter.sections[0].rows[0].edit,
            Some(LegendEdit::CategoryColor("a".into()))
        );
    }
}
