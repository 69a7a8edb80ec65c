// Map brush rectangles back to the rows under them

use serde::Serialize;

use crate::graph_state::{ChartType, GraphState};
use crate::heatmap::Heatmap;
use crate::ir::{BarMark, Marks, OverviewMark, PointMark, TimelineMark, View};
use crate::scale::AxisScale;
use crate::ChartOptions;

/// A brush rectangle in chart pixels, normalized so (x1, y1) is top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionRect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl SelectionRect {
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x1: a.0.min(b.0),
            y1: a.1.min(b.1),
            x2: a.0.max(b.0),
            y2: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Too thin in either direction to be a drag
    pub fn is_click(&self, min_size: f64) -> bool {
        self.width() < min_size || self.height() < min_size
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        self.x1 < x && x < self.x2 && self.y1 < y && y < self.y2
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The rectangle was a click; nothing changes
    Click,
    /// Selected rows of the graph's dataset. May be empty.
    Rows(Vec<usize>),
}

/// Rows of `state` inside `rect`, using the rule of the displayed chart
pub fn select(state: &GraphState, rect: SelectionRect) -> Selection {
    if rect.is_click(state.options().min_brush) {
        return Selection::Click;
    }

    Selection::Rows(rows_under(state.chart_type(), state.view(), state.options(), rect))
}

/// Rows under `rect` when `view` is displayed as `chart`. Marks of another chart type select nothing.
fn rows_under(chart: ChartType, view: &View, options: &ChartOptions, rect: SelectionRect) -> Vec<usize> {
    match (chart, &view.scene.marks, &view.heatmap) {
        (ChartType::Scatterplot, Marks::Points(points), _) => select_points(points, rect),
        (ChartType::Barchart, Marks::Bars(bars), _) => select_bars(bars, rect),
        (ChartType::Heatmap, Marks::Cells(_), Some(heatmap)) => {
            select_cells(heatmap, &view.x_scale, &view.y_scale, options, rect)
        }
        (ChartType::BarchartOverview, Marks::Overview(marks), _) => select_overview(marks, rect),
        (ChartType::Timeline, Marks::Timelines(marks), _) => select_timelines(marks, rect),
        (chart, _, _) => {
            tracing::warn!(%chart, "no selection rule for the displayed marks");
            Vec::new()
        }
    }
}

fn select_points(points: &[PointMark], rect: SelectionRect) -> Vec<usize> {
    points
        .iter()
        .filter(|p| rect.contains(p.x, p.y))
        .map(|p| p.row)
        .collect()
}

/// Bars hang from their anchor, so only the anchor's top needs to be above the rectangle's bottom
fn select_bars(bars: &[BarMark], rect: SelectionRect) -> Vec<usize> {
    bars.iter()
        .filter(|b| rect.x1 < b.anchor_x && b.anchor_x < rect.x2 && b.anchor_y < rect.y2)
        .map(|b| b.row)
        .collect()
}

fn select_overview(marks: &[OverviewMark], rect: SelectionRect) -> Vec<usize> {
    let mut rows: Vec<usize> = marks
        .iter()
        .filter(|m| !m.bars.is_empty() && m.bars.iter().all(|b| rect.contains(b.x, b.y)))
        .map(|m| m.row)
        .collect();
    rows.sort_unstable();
    rows
}

fn select_timelines(marks: &[TimelineMark], rect: SelectionRect) -> Vec<usize> {
    marks
        .iter()
        .filter(|m| {
            !m.segments.is_empty()
                && m.segments
                    .iter()
                    .all(|s| rect.contains(s.x1, s.y1) && rect.contains(s.x2, s.y2))
        })
        .map(|m| m.row)
        .collect()
}

// =============================================================================
// Heatmap
// =============================================================================

/// Pixel position (relative to the plot origin) in heatmap axis space.
///
/// Categorical axes return the first slot bound at or past the pixel,
/// searching in the direction the slots run.
fn to_axis_space(scale: &AxisScale, pixel: f64) -> f64 {
    match scale {
        AxisScale::Linear(l) => l.invert(pixel),
        AxisScale::Point(p) => {
            let positions = p.slot_positions();
            let ascending = p.step() >= 0.0;
            let bound = positions
                .iter()
                .position(|&pos| if ascending { pixel <= pos } else { pixel >= pos })
                .unwrap_or(positions.len());
            bound as f64
        }
    }
}

/// The brush in axis space. Axis values grow upward, so `top` > `bottom`.
struct AxisRect {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

fn select_cells(
    heatmap: &Heatmap,
    x_scale: &AxisScale,
    y_scale: &AxisScale,
    options: &ChartOptions,
    rect: SelectionRect,
) -> Vec<usize> {
    let (ox, oy) = options.plot_origin();
    let area = AxisRect {
        left: to_axis_space(x_scale, rect.x1 - ox),
        right: to_axis_space(x_scale, rect.x2 - ox),
        top: to_axis_space(y_scale, rect.y1 - oy),
        bottom: to_axis_space(y_scale, rect.y2 - oy),
    };

    heatmap
        .cells
        .iter()
        .filter(|cell| {
            let (left, right) = (cell.x, cell.x + cell.width);
            let (bottom, top) = (cell.y, cell.y + cell.height);

            // the cell's left edge lies inside the brush, or a brush edge cuts the cell
            let x_in = area.left < left && left < area.right;
            let box_x_in = (left <= area.left && area.left < right) || (left < area.right && area.right <= right);
            let y_in = area.bottom < top && top < area.top;
            let box_y_in = (bottom < area.top && area.top <= top) || (bottom <= area.bottom && area.bottom < top);

            (x_in || box_x_in) && (y_in || box_y_in)
        })
        .flat_map(|cell| cell.members.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::graph_state::KeySlot;
    use crate::palette::default_preferred_color;
    use crate::timeseries::TimeSeriesLayout;
    use std::rc::Rc;

    fn make_state(rows: Vec<Vec<String>>) -> GraphState {
        let data = Dataset::new(
            vec!["name".into(), "x".into(), "y".into(), "group".into()],
            rows,
        );
        GraphState::root(
            Rc::new(data),
            Rc::new(ChartOptions::default()),
            None,
            default_preferred_color(),
        )
        .unwrap()
    }

    fn grid_rows() -> Vec<Vec<String>> {
        (0..16)
            .map(|i| {
                vec![
                    format!("p{}", i),
                    format!("{}", (i % 4) * 10),
                    format!("{}", (i / 4) * 10),
                    format!("g{}", i % 2),
                ]
            })
            .collect()
    }

    fn point(state: &GraphState, row: usize) -> (f64, f64) {
        match &state.scene().marks {
            Marks::Points(points) => {
                let p = points.iter().find(|p| p.row == row).unwrap();
                (p.x, p.y)
            }
            _ => panic!("expected points"),
        }
    }

    #[test]
    fn test_rect_normalization_and_click() {
        let rect = SelectionRect::from_corners((50.0, 80.0), (10.0, 20.0));
        assert_eq!(rect, SelectionRect { x1: 10.0, y1: 20.0, x2: 50.0, y2: 80.0 });
        assert!(SelectionRect::from_corners((0.0, 0.0), (2.9, 100.0)).is_click(3.0));
        assert!(!SelectionRect::from_corners((0.0, 0.0), (3.0, 3.0)).is_click(3.0));

        let state = make_state(grid_rows());
        let click = SelectionRect::from_corners((0.0, 0.0), (650.0, 1.0));
        assert_eq!(select(&state, click), Selection::Click);
    }

    #[test]
    fn test_scatter_selects_exactly_bounded_points() {
        let state = make_state(grid_rows());
        // rows 5 and 6 are neighbours in the second grid row
        let (ax, ay) = point(&state, 5);
        let (bx, by) = point(&state, 6);
        let rect = SelectionRect::from_corners(
            (ax.min(bx) - 1.0, ay.min(by) - 1.0),
            (ax.max(bx) + 1.0, ay.max(by) + 1.0),
        );
        assert_eq!(select(&state, rect), Selection::Rows(vec![5, 6]));
    }

    #[test]
    fn test_scatter_edges_are_exclusive() {
        let state = make_state(grid_rows());
        let (x, y) = point(&state, 0);
        let rect = SelectionRect::from_corners((x, y - 10.0), (x + 10.0, y + 10.0));
        assert_eq!(select(&state, rect), Selection::Rows(vec![]));
    }

    #[test]
    fn test_bar_selection_ignores_rect_top() {
        let mut state = make_state(grid_rows());
        state.set_key(KeySlot::X, Some("group")).unwrap();
        state
            .switch_chart_type(ChartType::Barchart, &mut |_: &str| true)
            .unwrap();
        let bars = match &state.scene().marks {
            Marks::Bars(bars) => bars.clone(),
            _ => panic!("expected bars"),
        };
        let g0 = bars.iter().find(|b| b.row == 0).unwrap();
        // a strip below every anchor, around the g0 column only
        let rect = SelectionRect::from_corners((g0.anchor_x - 5.0, 600.0), (g0.anchor_x + 5.0, 640.0));
        let Selection::Rows(rows) = select(&state, rect) else {
            panic!("expected rows");
        };
        assert_eq!(rows, vec![0, 2, 4, 6, 8, 10, 12, 14]);
    }

    #[test]
    fn test_heatmap_rect_inside_one_cell() {
        let mut state = make_state(grid_rows());
        state
            .switch_chart_type(ChartType::Heatmap, &mut |_: &str| true)
            .unwrap();
        let heatmap = state.view().heatmap.clone().unwrap();
        let cells = match &state.scene().marks {
            Marks::Cells(cells) => cells.clone(),
            _ => panic!("expected cells"),
        };
        let target = cells.iter().find(|c| c.count > 0).unwrap();
        let rect = SelectionRect::from_corners(
            (target.x + target.width * 0.25, target.y + target.height * 0.25),
            (target.x + target.width * 0.75, target.y + target.height * 0.75),
        );
        let Selection::Rows(rows) = select(&state, rect) else {
            panic!("expected rows");
        };
        assert_eq!(rows, heatmap.cells[target.cell].members);
    }

    #[test]
    fn test_heatmap_full_rect_selects_every_row() {
        let mut state = make_state(grid_rows());
        state.set_key(KeySlot::X, Some("group")).unwrap();
        state
            .switch_chart_type(ChartType::Heatmap, &mut |_: &str| true)
            .unwrap();
        let rect = SelectionRect::from_corners((0.0, 0.0), (650.0, 650.0));
        let Selection::Rows(mut rows) = select(&state, rect) else {
            panic!("expected rows");
        };
        rows.sort_unstable();
        assert_eq!(rows, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_heatmap_categorical_column() {
        let mut state = make_state(grid_rows());
        state.set_key(KeySlot::X, Some("group")).unwrap();
        state
            .switch_chart_type(ChartType::Heatmap, &mut |_: &str| true)
            .unwrap();
        let options = ChartOptions::default();
        // "g0" sits at a third of the plot width, "g1" at two thirds
        let third = options.inner_width() / 3.0;
        let (ox, _) = options.plot_origin();
        let rect = SelectionRect::from_corners((ox + third - 20.0, 0.0), (ox + third + 20.0, 650.0));
        let Selection::Rows(mut rows) = select(&state, rect) else {
            panic!("expected rows");
        };
        rows.sort_unstable();
        assert_eq!(rows, vec![0, 2, 4, 6, 8, 10, 12, 14]);
    }

    fn make_series_state(chart: ChartType) -> GraphState {
        let rows = [
            ["alpha", "tools", "5", "1", "3"],
            ["beta", "tools", "2", "4", "6"],
            ["gamma", "games", "9", "7", "8"],
            ["delta", "games", "0", "2", "1"],
            ["epsilon", "tools", "4", "4", "4"],
        ]
        .iter()
        .map(|r| {
            let mut row = vec![r[0].to_string(), r[1].to_string(), String::new(), "web".to_string()];
            row.extend(r[2..].iter().map(|v| v.to_string()));
            row
        })
        .collect();
        let headers = ["name", "category", "keywords", "source", "2021-03-01", "2021-01-01", "2021-02-01"];
        let data = Dataset::new(headers.iter().map(|h| h.to_string()).collect(), rows);
        let layout = TimeSeriesLayout::detect(&data, 4).unwrap();
        let mut state = GraphState::root(
            Rc::new(data),
            Rc::new(ChartOptions::default()),
            Some(Rc::new(layout)),
            default_preferred_color(),
        )
        .unwrap();
        state.switch_chart_type(chart, &mut |_: &str| true).unwrap();
        state
    }

    /// Smallest rectangle around `corners`, grown by one pixel
    fn around(corners: &[(f64, f64)]) -> SelectionRect {
        let x1 = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let x2 = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let y1 = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let y2 = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);
        SelectionRect::from_corners((x1 - 1.0, y1 - 1.0), (x2 + 1.0, y2 + 1.0))
    }

    fn overview_bars(state: &GraphState, row: usize) -> Vec<(f64, f64)> {
        match &state.scene().marks {
            Marks::Overview(marks) => marks
                .iter()
                .find(|m| m.row == row)
                .unwrap()
                .bars
                .iter()
                .map(|b| (b.x, b.y))
                .collect(),
            _ => panic!("expected overview marks"),
        }
    }

    #[test]
    fn test_overview_needs_every_bar_of_a_node() {
        let state = make_series_state(ChartType::BarchartOverview);
        // gamma (row 2) is the only node with every value above 6
        let bars = overview_bars(&state, 2);
        let rect = around(&bars);
        assert_eq!(select(&state, rect), Selection::Rows(vec![2]));

        // pull the right edge in past gamma's last bar
        let last_x = bars.iter().map(|b| b.0).fold(f64::NEG_INFINITY, f64::max);
        let short = SelectionRect { x2: last_x - 1.0, ..rect };
        assert_eq!(select(&state, short), Selection::Rows(vec![]));
    }

    #[test]
    fn test_overview_rows_come_back_in_row_order() {
        let state = make_series_state(ChartType::BarchartOverview);
        let Marks::Overview(marks) = &state.scene().marks else {
            panic!("expected overview marks");
        };
        // drawn tallest first
        assert_eq!(marks[0].row, 2);
        let rect = SelectionRect::from_corners((0.0, 0.0), (650.0, 650.0));
        assert_eq!(select(&state, rect), Selection::Rows(vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn test_timeline_needs_every_segment_endpoint() {
        let state = make_series_state(ChartType::Timeline);
        let Marks::Timelines(marks) = &state.scene().marks else {
            panic!("expected timelines");
        };
        let gamma = marks.iter().find(|m| m.row == 2).unwrap();
        let ends: Vec<(f64, f64)> = gamma
            .segments
            .iter()
            .flat_map(|s| [(s.x1, s.y1), (s.x2, s.y2)])
            .collect();
        let rect = around(&ends);
        assert_eq!(select(&state, rect), Selection::Rows(vec![2]));

        let first_x = ends.iter().map(|e| e.0).fold(f64::INFINITY, f64::min);
        let short = SelectionRect { x1: first_x + 1.0, ..rect };
        assert_eq!(select(&state, short), Selection::Rows(vec![]));
    }

    #[test]
    fn test_marks_of_another_chart_select_nothing() {
        let state = make_state(grid_rows());
        let rect = SelectionRect::from_corners((0.0, 0.0), (650.0, 650.0));
        let rows = rows_under(ChartType::Barchart, state.view(), state.options(), rect);
        assert!(rows.is_empty());
        let rows = rows_under(ChartType::Scatterplot, state.view(), state.options(), rect);
        assert_eq!(rows.len(), 16);
    }
}
