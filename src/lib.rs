// Library exports for chainplot

pub mod chain;
pub mod compiler;
pub mod csv_reader;
pub mod data;
pub mod encoding;
pub mod error;
pub mod graph;
pub mod graph_state;
pub mod heatmap;
pub mod ir;
pub mod legend;
pub mod palette;
pub mod parser;
pub mod runtime;
pub mod scale;
pub mod selection;
pub mod timeseries;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::scale::InferenceStrategy;

pub use chain::Chain;
pub use data::Dataset;
pub use error::ValidationError;
pub use graph_state::{ChartType, GraphState, KeySlot};

/// Chart geometry and behaviour knobs shared by every link of a chain
#[derive(Debug, Clone, Deserialize)]
pub struct ChartOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_svg_padding")]
    pub svg_padding: f64,
    #[serde(default = "default_chart_padding")]
    pub chart_padding: f64,
    /// Fraction of the data span added to each end of a continuous domain
    #[serde(default = "default_scale_padding")]
    pub scale_padding: f64,
    #[serde(default = "default_max_label_length")]
    pub max_label_length: usize,
    /// Target number of heatmap cells
    #[serde(default = "default_heat_squares")]
    pub heat_squares: usize,
    /// Index of the first date column in time-series data
    #[serde(default = "default_timeline_start")]
    pub timeline_start: usize,
    /// Brushes thinner than this (px) are clicks
    #[serde(default = "default_min_brush")]
    pub min_brush: f64,
    #[serde(default)]
    pub inference: InferenceStrategy,
}

fn default_width() -> u32 { 650 }
fn default_height() -> u32 { 650 }
fn default_svg_padding() -> f64 { 5.0 }
fn default_chart_padding() -> f64 { 40.0 }
fn default_scale_padding() -> f64 { 0.05 }
fn default_max_label_length() -> usize { 7 }
fn default_heat_squares() -> usize { 400 }
fn default_timeline_start() -> usize { 4 }
fn default_min_brush() -> f64 { 3.0 }

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            svg_padding: default_svg_padding(),
            chart_padding: default_chart_padding(),
            scale_padding: default_scale_padding(),
            max_label_length: default_max_label_length(),
            heat_squares: default_heat_squares(),
            timeline_start: default_timeline_start(),
            min_brush: default_min_brush(),
            inference: InferenceStrategy::default(),
        }
    }
}

impl ChartOptions {
    /// Load options from a JSON file; absent fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Top-left corner of the plot area in chart pixels
    pub fn plot_origin(&self) -> (f64, f64) {
        (self.svg_padding + self.chart_padding, self.svg_padding)
    }

    pub fn inner_width(&self) -> f64 {
        self.width as f64 - self.svg_padding * 2.0 - self.chart_padding * 2.0
    }

    pub fn inner_height(&self) -> f64 {
        self.height as f64 - self.svg_padding * 2.0 - self.chart_padding
    }

    pub fn x_range(&self) -> (f64, f64) {
        (0.0, self.inner_width())
    }

    /// Descending, so larger values sit higher on screen
    pub fn y_range(&self) -> (f64, f64) {
        (self.inner_height(), 0.0)
    }

    /// Bins per axis for the heatmap
    pub fn heat_bins(&self) -> usize {
        ((self.heat_squares as f64).sqrt().floor() as usize).max(1)
    }
}
