// Draw a compiled scene with plotters

use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::HashSet;
use std::path::Path;

use crate::graph_state::GraphState;
use crate::ir::{Axis, Marks, PointMark, SceneGraph};
use crate::legend::Legend;
use crate::palette::{Rgb, Shape};
use crate::ChartOptions;

/// Room to the right of the chart for the legend
const LEGEND_WIDTH: u32 = 200;
const LEGEND_ROW_HEIGHT: i32 = 18;
const TICK_LENGTH: i32 = 6;
const BAR_OPACITY: f64 = 0.1;
const FONT: &str = "sans-serif";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => Ok(ImageFormat::Png),
            Some("svg") => Ok(ImageFormat::Svg),
            _ => anyhow::bail!("Cannot render to '{}': use a .png or .svg file", path.display()),
        }
    }
}

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

fn px(v: f64) -> i32 {
    v.round() as i32
}

/// Canvas sized for one chart and its legend
pub struct Canvas<'a> {
    scene: &'a SceneGraph,
    options: &'a ChartOptions,
    highlighted: HashSet<usize>,
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(state: &'a GraphState) -> Self {
        let options = state.options();
        Self {
            scene: state.scene(),
            options,
            highlighted: state.highlighted().iter().copied().collect(),
            width: options.width + LEGEND_WIDTH,
            height: options.height,
        }
    }

    pub fn render(&self, format: ImageFormat) -> Result<Vec<u8>> {
        match format {
            ImageFormat::Png => self.render_png(),
            ImageFormat::Svg => self.render_svg(),
        }
    }

    fn render_png(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; (self.width * self.height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            self.draw(&root)?;
            root.present().context("Failed to present drawing")?;
        }

        let mut png_bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_bytes)
            .write_image(&buffer, self.width, self.height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
        Ok(png_bytes)
    }

    fn render_svg(&self) -> Result<Vec<u8>> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            self.draw(&root)?;
            root.present().context("Failed to present drawing")?;
        }
        Ok(svg.into_bytes())
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE).context("Failed to fill background")?;
        self.draw_marks(root)?;
        self.draw_axes(root)?;
        self.draw_legend(root, &self.scene.legend)?;
        Ok(())
    }

    fn draw_marks<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        match &self.scene.marks {
            Marks::Points(points) => {
                for point in points {
                    draw_point(root, point, self.highlighted.contains(&point.row))?;
                }
            }
            Marks::Bars(bars) => {
                for bar in bars {
                    let corners = [(px(bar.x), px(bar.y)), (px(bar.x + bar.width), px(bar.y + bar.height))];
                    root.draw(&Rectangle::new(corners, color(bar.color).mix(BAR_OPACITY).filled()))
                        .context("Failed to draw bar")?;
                    if self.highlighted.contains(&bar.row) {
                        root.draw(&Rectangle::new(corners, BLACK.stroke_width(2)))
                            .context("Failed to draw bar outline")?;
                    }
                }
            }
            Marks::Cells(cells) => {
                for cell in cells {
                    let corners = [
                        (px(cell.x), px(cell.y)),
                        (px(cell.x + cell.width), px(cell.y + cell.height)),
                    ];
                    root.draw(&Rectangle::new(corners, color(cell.color).filled()))
                        .context("Failed to draw heatmap cell")?;
                }
            }
            Marks::Overview(marks) => {
                for mark in marks {
                    let style = if self.highlighted.contains(&mark.row) {
                        BLACK.filled()
                    } else {
                        color(mark.color).filled()
                    };
                    for bar in &mark.bars {
                        root.draw(&Rectangle::new(
                            [(px(bar.x), px(bar.y)), (px(bar.x + bar.width), px(bar.y + bar.height))],
                            style,
                        ))
                        .context("Failed to draw overview bar")?;
                    }
                }
            }
            Marks::Timelines(marks) => {
                for mark in marks {
                    let width = if self.highlighted.contains(&mark.row) { 3 } else { 1 };
                    let style = color(mark.color).stroke_width(width);
                    for s in &mark.segments {
                        root.draw(&PathElement::new(
                            vec![(px(s.x1), px(s.y1)), (px(s.x2), px(s.y2))],
                            style,
                        ))
                        .context("Failed to draw timeline")?;
                    }
                }
            }
        }
        Ok(())
    }

    fn draw_axes<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let (ox, oy) = self.options.plot_origin();
        let left = px(ox);
        let right = px(ox + self.options.inner_width());
        let top = px(oy);
        let bottom = px(oy + self.options.inner_height());

        root.draw(&PathElement::new(vec![(left, bottom), (right, bottom)], BLACK))
            .context("Failed to draw x axis")?;
        root.draw(&PathElement::new(vec![(left, top), (left, bottom)], BLACK))
            .context("Failed to draw y axis")?;

        let label_style = (FONT, 11).into_font().color(&BLACK);
        draw_ticks(root, &self.scene.x_axis, |pos| {
            (
                vec![(px(pos), bottom), (px(pos), bottom + TICK_LENGTH)],
                (px(pos) - 10, bottom + TICK_LENGTH + 2),
            )
        }, &label_style)?;
        draw_ticks(root, &self.scene.y_axis, |pos| {
            (
                vec![(left - TICK_LENGTH, px(pos)), (left, px(pos))],
                (2, px(pos) - 6),
            )
        }, &label_style)?;

        let title_style = (FONT, 13).into_font().color(&BLACK);
        root.draw(&Text::new(
            self.scene.x_axis.title.clone(),
            ((left + right) / 2, bottom + 22),
            title_style.clone(),
        ))
        .context("Failed to draw x axis title")?;
        root.draw(&Text::new(self.scene.y_axis.title.clone(), (2, top), title_style))
            .context("Failed to draw y axis title")?;
        Ok(())
    }

    fn draw_legend<DB>(&self, root: &DrawingArea<DB, Shift>, legend: &Legend) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let x = self.options.width as i32 + 10;
        let mut y = px(self.options.svg_padding) + 10;
        let title_style = (FONT, 13).into_font().color(&BLACK);
        let row_style = (FONT, 11).into_font().color(&BLACK);

        for section in &legend.sections {
            root.draw(&Text::new(section.title.clone(), (x, y), title_style.clone()))
                .context("Failed to draw legend title")?;
            y += LEGEND_ROW_HEIGHT;
            for row in &section.rows {
                let swatch = row.color.unwrap_or(Rgb(128, 128, 128));
                let area = row.area.unwrap_or(crate::encoding::DEFAULT_SYMBOL_AREA);
                let mark = PointMark {
                    row: 0,
                    x: (x + 6) as f64,
                    y: (y + 6) as f64,
                    area: area.min(120.0),
                    shape: row.shape.unwrap_or(Shape::Square),
                    color: swatch,
                };
                draw_point(root, &mark, false)?;
                root.draw(&Text::new(row.label.clone(), (x + 20, y), row_style.clone()))
                    .context("Failed to draw legend row")?;
                y += LEGEND_ROW_HEIGHT;
            }
            y += LEGEND_ROW_HEIGHT / 2;
        }
        Ok(())
    }
}

fn draw_ticks<DB, F>(root: &DrawingArea<DB, Shift>, axis: &Axis, place: F, style: &TextStyle) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    F: Fn(f64) -> (Vec<(i32, i32)>, (i32, i32)),
{
    for tick in axis.ticks.iter().filter(|t| t.visible) {
        let (line, label_at) = place(tick.position);
        root.draw(&PathElement::new(line, BLACK))
            .context("Failed to draw tick")?;
        root.draw(&Text::new(tick.label.clone(), label_at, style.clone()))
            .context("Failed to draw tick label")?;
    }
    Ok(())
}

/// Symbol of `point.area` square pixels, outlined when highlighted
fn draw_point<DB>(root: &DrawingArea<DB, Shift>, point: &PointMark, highlighted: bool) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x, y) = (px(point.x), px(point.y));
    let r = (point.area / std::f64::consts::PI).sqrt().max(1.0);
    let ri = px(r);
    let fill = color(point.color).filled();
    let outline = BLACK.stroke_width(if highlighted { 2 } else { 1 });

    let polygon = |offsets: &[(f64, f64)]| -> Vec<(i32, i32)> {
        offsets
            .iter()
            .map(|(dx, dy)| (px(point.x + dx * r), px(point.y + dy * r)))
            .collect()
    };

    match point.shape {
        Shape::Circle => {
            root.draw(&Circle::new((x, y), ri, fill)).context("Failed to draw point")?;
            if highlighted {
                root.draw(&Circle::new((x, y), ri, outline)).context("Failed to draw point")?;
            }
        }
        Shape::Square => {
            let corners = [(x - ri, y - ri), (x + ri, y + ri)];
            root.draw(&Rectangle::new(corners, fill)).context("Failed to draw point")?;
            if highlighted {
                root.draw(&Rectangle::new(corners, outline)).context("Failed to draw point")?;
            }
        }
        Shape::Cross => {
            let arm = 0.35;
            let outline_points = polygon(&[
                (-arm, -1.0), (arm, -1.0), (arm, -arm), (1.0, -arm), (1.0, arm), (arm, arm),
                (arm, 1.0), (-arm, 1.0), (-arm, arm), (-1.0, arm), (-1.0, -arm), (-arm, -arm),
            ]);
            draw_polygon(root, outline_points, fill, highlighted.then_some(outline))?;
        }
        Shape::Diamond => {
            let points = polygon(&[(0.0, -1.3), (0.8, 0.0), (0.0, 1.3), (-0.8, 0.0)]);
            draw_polygon(root, points, fill, highlighted.then_some(outline))?;
        }
        Shape::TriangleUp => {
            let points = polygon(&[(0.0, -1.2), (1.1, 0.8), (-1.1, 0.8)]);
            draw_polygon(root, points, fill, highlighted.then_some(outline))?;
        }
        Shape::TriangleDown => {
            let points = polygon(&[(0.0, 1.2), (1.1, -0.8), (-1.1, -0.8)]);
            draw_polygon(root, points, fill, highlighted.then_some(outline))?;
        }
    }
    Ok(())
}

fn draw_polygon<DB>(
    root: &DrawingArea<DB, Shift>,
    points: Vec<(i32, i32)>,
    fill: ShapeStyle,
    outline: Option<ShapeStyle>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    if let Some(style) = outline {
        let mut closed = points.clone();
        if let Some(first) = points.first() {
            closed.push(*first);
        }
        root.draw(&Polygon::new(points, fill)).context("Failed to draw point")?;
        root.draw(&PathElement::new(closed, style)).context("Failed to draw point")?;
    } else {
        root.draw(&Polygon::new(points, fill)).context("Failed to draw point")?;
    }
    Ok(())
}

/// Render `state` and write it to `path`, PNG or SVG by extension
pub fn save(state: &GraphState, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path)?;
    let bytes = Canvas::new(state).render(format)?;
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), ?format, "rendered chart");
    Ok(())
}
