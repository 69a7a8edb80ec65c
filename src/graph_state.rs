// Per-chart state: chart type, encoding keys, encodings and the compiled view

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::compiler::{compile, CompileInput};
use crate::data::Dataset;
use crate::encoding::{encode_color, encode_shape, encode_size, ColorEncoding, Encodings, Endpoint};
use crate::error::{Result, ValidationError};
use crate::ir::{SceneGraph, View};
use crate::palette::{Rgb, Shape};
use crate::timeseries::TimeSeriesLayout;
use crate::ChartOptions;

/// Selector value meaning "no column"
pub const NO_SELECTION: &str = "--None--";

const HEATMAP_PROMPT: &str =
    "Switching to the heatmap clears the highlighted points. Do you want to continue?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartType {
    Scatterplot,
    Heatmap,
    Barchart,
    BarchartOverview,
    Timeline,
}

impl ChartType {
    pub const ALL: [ChartType; 5] = [
        ChartType::Scatterplot,
        ChartType::Heatmap,
        ChartType::Barchart,
        ChartType::BarchartOverview,
        ChartType::Timeline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartType::Scatterplot => "scatterplot",
            ChartType::Heatmap => "heatmap",
            ChartType::Barchart => "barchart",
            ChartType::BarchartOverview => "barchart-overview",
            ChartType::Timeline => "timeline",
        }
    }

    pub fn requires_time_series(self) -> bool {
        matches!(self, ChartType::BarchartOverview | ChartType::Timeline)
    }

    /// Key selectors the user may change while this chart is shown
    pub fn enabled_slots(self) -> &'static [KeySlot] {
        match self {
            ChartType::Scatterplot => &KeySlot::ALL,
            ChartType::Barchart => &[KeySlot::X, KeySlot::Y, KeySlot::Color],
            ChartType::Heatmap => &[KeySlot::X, KeySlot::Y],
            ChartType::BarchartOverview | ChartType::Timeline => &[],
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match wanted.as_str() {
            "scatter" => return Ok(ChartType::Scatterplot),
            "bar" => return Ok(ChartType::Barchart),
            "overview" => return Ok(ChartType::BarchartOverview),
            _ => {}
        }
        ChartType::ALL
            .iter()
            .copied()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| format!("unknown chart type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySlot {
    X,
    Y,
    Color,
    Size,
    Shape,
}

impl KeySlot {
    pub const ALL: [KeySlot; 5] = [KeySlot::X, KeySlot::Y, KeySlot::Color, KeySlot::Size, KeySlot::Shape];

    pub fn name(self) -> &'static str {
        match self {
            KeySlot::X => "x",
            KeySlot::Y => "y",
            KeySlot::Color => "color",
            KeySlot::Size => "size",
            KeySlot::Shape => "shape",
        }
    }

    /// Color, size and shape may be unset
    pub fn is_optional(self) -> bool {
        !matches!(self, KeySlot::X | KeySlot::Y)
    }
}

impl fmt::Display for KeySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeySlot {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        KeySlot::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown key selector '{}'", s))
    }
}

/// Column chosen for each encoding channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keys {
    pub x: String,
    pub y: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub shape: Option<String>,
}

impl Keys {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            color: None,
            size: None,
            shape: None,
        }
    }

    pub fn get(&self, slot: KeySlot) -> Option<&str> {
        match slot {
            KeySlot::X => Some(&self.x),
            KeySlot::Y => Some(&self.y),
            KeySlot::Color => self.color.as_deref(),
            KeySlot::Size => self.size.as_deref(),
            KeySlot::Shape => self.shape.as_deref(),
        }
    }

    /// Assign a slot. `None` on x or y is ignored; those are always set.
    pub fn set(&mut self, slot: KeySlot, value: Option<String>) {
        match slot {
            KeySlot::X => {
                if let Some(v) = value {
                    self.x = v;
                }
            }
            KeySlot::Y => {
                if let Some(v) = value {
                    self.y = v;
                }
            }
            KeySlot::Color => self.color = value,
            KeySlot::Size => self.size = value,
            KeySlot::Shape => self.shape = value,
        }
    }
}

/// Answers the yes/no prompts a chart transition may raise
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Edits issued from the legend's color and shape choosers
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    SetCategoryColor { category: String, color: Rgb },
    SetEndpointColor { endpoint: Endpoint, color: Rgb },
    SetCategoryShape { category: String, shape: Shape },
}

/// Outcome of a state change that was not rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Applied,
    Declined,
}

#[derive(Debug, Clone)]
pub struct GraphState {
    chart: ChartType,
    keys: Keys,
    prev_keys: Keys,
    preferred: Rgb,
    encodings: Encodings,
    data: Rc<Dataset>,
    selected: Vec<usize>,
    view: View,
    options: Rc<ChartOptions>,
    layout: Option<Rc<TimeSeriesLayout>>,
}

impl GraphState {
    /// First link of a chain. Time-series data starts on its first two date
    /// columns, anything else on columns 1 and 2.
    pub fn root(
        data: Rc<Dataset>,
        options: Rc<ChartOptions>,
        layout: Option<Rc<TimeSeriesLayout>>,
        preferred: Rgb,
    ) -> Result<Self> {
        let (xi, yi) = match &layout {
            Some(l) => (l.start, l.start + 1),
            None => (1, 2),
        };
        let column = |i: usize| {
            data.headers
                .get(i)
                .cloned()
                .ok_or_else(|| ValidationError::UnknownColumn(format!("#{}", i)))
        };
        let keys = Keys::new(column(xi)?, column(yi)?);

        let state = Self::assemble(
            ChartType::Scatterplot,
            keys,
            preferred,
            Encodings::default(),
            data,
            options,
            layout,
        )?;
        tracing::info!(rows = state.data.len(), x = %state.keys.x, y = %state.keys.y, "created root graph");
        Ok(state)
    }

    /// New link showing `rows` of `parent`, inheriting its chart type, keys
    /// and encodings.
    pub fn child(parent: &GraphState, rows: &[usize]) -> Result<Self> {
        Self::assemble(
            parent.chart,
            parent.keys.clone(),
            parent.preferred,
            parent.encodings.clone(),
            Rc::new(parent.data.subset(rows)),
            Rc::clone(&parent.options),
            parent.layout.clone(),
        )
    }

    /// Compile the first view, dropping optional keys that do not validate
    /// on these rows.
    fn assemble(
        chart: ChartType,
        mut keys: Keys,
        preferred: Rgb,
        encodings: Encodings,
        data: Rc<Dataset>,
        options: Rc<ChartOptions>,
        layout: Option<Rc<TimeSeriesLayout>>,
    ) -> Result<Self> {
        loop {
            let basis = Basis {
                data: &data,
                options: &options,
                layout: layout.as_deref(),
                preferred,
                encodings: &encodings,
            };
            match build_view(&basis, chart, &keys) {
                Ok((encodings, view)) => {
                    return Ok(Self {
                        chart,
                        prev_keys: keys.clone(),
                        keys,
                        preferred,
                        encodings,
                        data,
                        selected: Vec::new(),
                        view,
                        options,
                        layout,
                    });
                }
                Err(e) => match e.slot().filter(|s| s.is_optional() && keys.get(*s).is_some()) {
                    Some(slot) => {
                        tracing::warn!(%slot, error = %e, "dropping inherited key");
                        keys.set(slot, None);
                    }
                    None => return Err(e),
                },
            }
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn chart_type(&self) -> ChartType {
        self.chart
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    pub fn prev_keys(&self) -> &Keys {
        &self.prev_keys
    }

    pub fn encodings(&self) -> &Encodings {
        &self.encodings
    }

    pub fn preferred_color(&self) -> Rgb {
        self.preferred
    }

    pub fn data(&self) -> &Rc<Dataset> {
        &self.data
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn layout(&self) -> Option<&TimeSeriesLayout> {
        self.layout.as_deref()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.view.scene
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn is_time_series(&self) -> bool {
        self.layout.is_some()
    }

    pub fn available_chart_types(&self) -> Vec<ChartType> {
        ChartType::ALL
            .iter()
            .copied()
            .filter(|c| self.is_time_series() || !c.requires_time_series())
            .collect()
    }

    /// Rows drawn highlighted. The heatmap shows cells, never rows.
    pub fn highlighted(&self) -> &[usize] {
        if self.chart == ChartType::Heatmap {
            &[]
        } else {
            &self.selected
        }
    }

    pub(crate) fn set_selected(&mut self, rows: Vec<usize>) {
        self.selected = rows;
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Change one encoding key. On rejection the key keeps its old value
    /// and the compiled view is untouched.
    pub fn set_key(&mut self, slot: KeySlot, value: Option<&str>) -> Result<Transition> {
        if !self.chart.enabled_slots().contains(&slot) {
            return Err(ValidationError::SelectorDisabled {
                slot,
                chart: self.chart,
            });
        }

        let value = value.filter(|v| *v != NO_SELECTION).map(String::from);
        match &value {
            Some(v) => {
                self.data.column_index(v)?;
            }
            None if !slot.is_optional() => {
                return Err(ValidationError::UnknownColumn(NO_SELECTION.to_string()));
            }
            None => {}
        }

        let current = self.keys.get(slot).map(String::from);
        if current == value {
            return Ok(Transition::Unchanged);
        }

        self.prev_keys.set(slot, current);
        let mut keys = self.keys.clone();
        keys.set(slot, value);

        match self.build(self.chart, &keys) {
            Ok((encodings, view)) => {
                tracing::debug!(%slot, key = ?keys.get(slot), "key changed");
                self.keys = keys;
                self.encodings = encodings;
                self.view = view;
                Ok(Transition::Applied)
            }
            Err(e) => {
                tracing::warn!(%slot, error = %e, "rejected key change");
                Err(e)
            }
        }
    }

    /// Switch the chart type. Showing the heatmap while rows are selected
    /// asks `confirm` first.
    pub fn switch_chart_type(&mut self, target: ChartType, confirm: &mut dyn Confirm) -> Result<Transition> {
        if target == self.chart {
            return Ok(Transition::Unchanged);
        }
        if target.requires_time_series() && !self.is_time_series() {
            return Err(ValidationError::UnavailableChartType(target));
        }
        if target == ChartType::Heatmap && !self.selected.is_empty() && !confirm.confirm(HEATMAP_PROMPT) {
            tracing::debug!("heatmap switch declined");
            return Ok(Transition::Declined);
        }

        self.prev_keys.shape = self.keys.shape.clone();
        let keys = self.keys.clone();
        match self.build(target, &keys) {
            Ok((encodings, view)) => {
                tracing::debug!(from = %self.chart, to = %target, "chart type changed");
                self.chart = target;
                self.encodings = encodings;
                self.view = view;
                Ok(Transition::Applied)
            }
            Err(e) => {
                tracing::warn!(chart = %target, error = %e, "rejected chart type change");
                Err(e)
            }
        }
    }

    /// Apply a legend edit. Shared encodings are copied before they change.
    pub fn apply_edit(&mut self, edit: &EditCommand) -> Result<()> {
        let mut encodings = self.encodings.clone();
        match edit {
            EditCommand::SetCategoryColor { category, color } => {
                let target = encodings
                    .color
                    .as_mut()
                    .map(Rc::make_mut)
                    .and_then(|enc| match enc {
                        ColorEncoding::Categorical { colors } => colors.get_mut(category),
                        ColorEncoding::Continuous(_) => None,
                    })
                    .ok_or_else(|| ValidationError::NotFound(category.clone()))?;
                *target = *color;
            }
            EditCommand::SetEndpointColor { endpoint, color } => {
                let scale = encodings
                    .color
                    .as_mut()
                    .map(Rc::make_mut)
                    .and_then(|enc| match enc {
                        ColorEncoding::Continuous(scale) => Some(scale),
                        ColorEncoding::Categorical { .. } => None,
                    })
                    .ok_or_else(|| ValidationError::NotFound(format!("{:?} color", endpoint)))?;
                match endpoint {
                    Endpoint::Low => scale.low = *color,
                    Endpoint::High => scale.high = *color,
                }
            }
            EditCommand::SetCategoryShape { category, shape } => {
                let target = encodings
                    .shape
                    .as_mut()
                    .map(Rc::make_mut)
                    .and_then(|dict| dict.get_mut(category))
                    .ok_or_else(|| ValidationError::NotFound(category.clone()))?;
                *target = *shape;
            }
        }

        let previous = std::mem::replace(&mut self.encodings, encodings);
        let keys = self.keys.clone();
        match self.build(self.chart, &keys) {
            Ok((encodings, view)) => {
                self.encodings = encodings;
                self.view = view;
                Ok(())
            }
            Err(e) => {
                self.encodings = previous;
                Err(e)
            }
        }
    }

    fn build(&self, chart: ChartType, keys: &Keys) -> Result<(Encodings, View)> {
        let basis = Basis {
            data: &self.data,
            options: &self.options,
            layout: self.layout.as_deref(),
            preferred: self.preferred,
            encodings: &self.encodings,
        };
        build_view(&basis, chart, keys)
    }
}

/// What a recomputation reads besides the chart type and keys
struct Basis<'a> {
    data: &'a Dataset,
    options: &'a ChartOptions,
    layout: Option<&'a TimeSeriesLayout>,
    preferred: Rgb,
    encodings: &'a Encodings,
}

/// Compute encodings and the view for `chart`/`keys` from scratch.
///
/// Color is encoded for scatterplots and barcharts, size and shape for
/// scatterplots only; other channels keep their previous encodings.
fn build_view(basis: &Basis, chart: ChartType, keys: &Keys) -> Result<(Encodings, View)> {
    let strategy = basis.options.inference;
    let previous = basis.encodings;
    let mut encodings = previous.clone();

    if matches!(chart, ChartType::Scatterplot | ChartType::Barchart) {
        if let Some(key) = &keys.color {
            let color = encode_color(basis.data, key, previous.color.as_deref(), basis.preferred, strategy)?;
            encodings.color = Some(Rc::new(color));
        }
    }

    if chart == ChartType::Scatterplot {
        if let Some(key) = &keys.size {
            encodings.size = Some(encode_size(basis.data, key, strategy)?);
        }
        match &keys.shape {
            Some(key) => {
                let changed = previous.shape_key.as_deref() != Some(key.as_str());
                encodings.shape = Some(encode_shape(basis.data, key, previous.shape.as_ref(), changed)?);
                encodings.shape_key = Some(key.clone());
            }
            None => encodings.shape_key = None,
        }
    }

    let view = compile(&CompileInput {
        data: basis.data,
        chart,
        keys,
        encodings: &encodings,
        preferred: basis.preferred,
        options: basis.options,
        layout: basis.layout,
    })?;
    Ok((encodings, view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Marks;
    use crate::palette::default_preferred_color;

    fn make_data(groups: usize) -> Rc<Dataset> {
        let rows = (0..30)
            .map(|i| {
                vec![
                    format!("p{}", i),
                    format!("{}", i),
                    format!("{}", (i * 3) % 11),
                    format!("g{}", i % groups),
                    format!("s{}", i % 3),
                ]
            })
            .collect();
        Rc::new(Dataset::new(
            vec!["name".into(), "a".into(), "b".into(), "group".into(), "kind".into()],
            rows,
        ))
    }

    fn make_state(groups: usize) -> GraphState {
        GraphState::root(
            make_data(groups),
            Rc::new(ChartOptions::default()),
            None,
            default_preferred_color(),
        )
        .unwrap()
    }

    fn yes() -> impl FnMut(&str) -> bool {
        |_: &str| true
    }

    #[test]
    fn test_root_defaults() {
        let state = make_state(3);
        assert_eq!(state.chart_type(), ChartType::Scatterplot);
        assert_eq!(state.keys().x, "a");
        assert_eq!(state.keys().y, "b");
        assert_eq!(state.available_chart_types().len(), 3);
        assert_eq!(state.scene().marks.len(), 30);
    }

    #[test]
    fn test_set_key_records_previous() {
        let mut state = make_state(3);
        assert_eq!(state.set_key(KeySlot::X, Some("group")), Ok(Transition::Applied));
        assert_eq!(state.keys().x, "group");
        assert_eq!(state.prev_keys().x, "a");
        assert_eq!(state.set_key(KeySlot::X, Some("group")), Ok(Transition::Unchanged));
    }

    #[test]
    fn test_color_rejection_rolls_back() {
        let mut state = make_state(25);
        state.set_key(KeySlot::Color, Some("kind")).unwrap();
        let before = state.encodings().color.clone();
        let scene_before = state.scene().clone();

        let err = state.set_key(KeySlot::Color, Some("group")).unwrap_err();
        assert!(matches!(err, ValidationError::TooManyCategories { count: 25, .. }));
        assert_eq!(state.keys().color.as_deref(), Some("kind"));
        assert_eq!(state.encodings().color, before);
        assert_eq!(state.scene(), &scene_before);
    }

    #[test]
    fn test_size_rejects_categorical_column() {
        let mut state = make_state(3);
        let err = state.set_key(KeySlot::Size, Some("group")).unwrap_err();
        assert!(matches!(err, ValidationError::NotNumeric { .. }));
        assert_eq!(state.keys().size, None);
        assert_eq!(state.set_key(KeySlot::Size, Some("a")), Ok(Transition::Applied));
    }

    #[test]
    fn test_disabled_selectors() {
        let mut state = make_state(3);
        state.switch_chart_type(ChartType::Heatmap, &mut yes()).unwrap();
        assert_eq!(
            state.set_key(KeySlot::Color, Some("group")),
            Err(ValidationError::SelectorDisabled {
                slot: KeySlot::Color,
                chart: ChartType::Heatmap
            })
        );
        assert!(state.set_key(KeySlot::Y, Some("group")).is_ok());
    }

    #[test]
    fn test_overview_requires_time_series() {
        let mut state = make_state(3);
        assert_eq!(
            state.switch_chart_type(ChartType::Timeline, &mut yes()),
            Err(ValidationError::UnavailableChartType(ChartType::Timeline))
        );
    }

    #[test]
    fn test_heatmap_switch_asks_when_rows_selected() {
        let mut state = make_state(3);
        state.set_selected(vec![1, 2]);
        let mut asked = 0;
        let mut decline = |_: &str| {
            asked += 1;
            false
        };
        assert_eq!(
            state.switch_chart_type(ChartType::Heatmap, &mut decline),
            Ok(Transition::Declined)
        );
        assert_eq!(asked, 1);
        assert_eq!(state.chart_type(), ChartType::Scatterplot);

        assert_eq!(
            state.switch_chart_type(ChartType::Heatmap, &mut yes()),
            Ok(Transition::Applied)
        );
        assert!(state.highlighted().is_empty());
        assert!(matches!(state.scene().marks, Marks::Cells(_)));

        state.switch_chart_type(ChartType::Scatterplot, &mut yes()).unwrap();
        assert_eq!(state.highlighted(), &[1, 2]);
    }

    #[test]
    fn test_too_many_bars_rolls_back_x() {
        let rows = (0..400)
            .map(|i| {
                vec![
                    format!("n{}", i),
                    format!("c{}", i),
                    format!("{}", i),
                    format!("f{}", i % 4),
                ]
            })
            .collect();
        let data = Rc::new(Dataset::new(
            vec!["name".into(), "cat".into(), "v".into(), "few".into()],
            rows,
        ));
        let mut state =
            GraphState::root(data, Rc::new(ChartOptions::default()), None, default_preferred_color()).unwrap();

        // 400 categories cannot be drawn as bars
        state.switch_chart_type(ChartType::Barchart, &mut yes()).unwrap_err();
        assert_eq!(state.chart_type(), ChartType::Scatterplot);

        state.set_key(KeySlot::X, Some("few")).unwrap();
        state.switch_chart_type(ChartType::Barchart, &mut yes()).unwrap();
        let err = state.set_key(KeySlot::X, Some("cat")).unwrap_err();
        assert!(matches!(err, ValidationError::TooManyBars { .. }));
        assert_eq!(state.keys().x, "few");
        assert_eq!(state.prev_keys().x, "few");
    }

    #[test]
    fn test_edits_are_copy_on_write() {
        let mut parent = make_state(3);
        parent.set_key(KeySlot::Color, Some("group")).unwrap();
        let mut child = GraphState::child(&parent, &[0, 1, 2]).unwrap();
        assert_eq!(parent.encodings().color, child.encodings().color);

        child
            .apply_edit(&EditCommand::SetCategoryColor {
                category: "g0".into(),
                color: Rgb(1, 2, 3),
            })
            .unwrap();
        let child_color = child.encodings().color.as_ref().unwrap().color_for("g0");
        let parent_color = parent.encodings().color.as_ref().unwrap().color_for("g0");
        assert_eq!(child_color, Some(Rgb(1, 2, 3)));
        assert_ne!(parent_color, Some(Rgb(1, 2, 3)));
    }

    #[test]
    fn test_shape_edit_survives_other_key_changes() {
        let mut state = make_state(3);
        state.set_key(KeySlot::Shape, Some("kind")).unwrap();
        state
            .apply_edit(&EditCommand::SetCategoryShape {
                category: "s1".into(),
                shape: Shape::Square,
            })
            .unwrap();
        state.set_key(KeySlot::X, Some("b")).unwrap();
        assert_eq!(
            state.encodings().shape.as_ref().unwrap().get("s1"),
            Some(&Shape::Square)
        );

        state.set_key(KeySlot::Shape, Some("group")).unwrap();
        assert_eq!(
            state.encodings().shape.as_ref().unwrap().get("g1"),
            Some(&Shape::Cross)
        );
    }

    #[test]
    fn test_endpoint_edit_requires_continuous_color() {
        let mut state = make_state(3);
        state.set_key(KeySlot::Color, Some("group")).unwrap();
        let edit = EditCommand::SetEndpointColor {
            endpoint: Endpoint::High,
            color: Rgb::BLACK,
        };
        assert!(state.apply_edit(&edit).is_err());

        state.set_key(KeySlot::Color, Some("a")).unwrap();
        state.apply_edit(&edit).unwrap();
        assert_eq!(
            state.encodings().color.as_ref().unwrap().color_for("29"),
            Some(Rgb::BLACK)
        );
    }

    #[test]
    fn test_child_drops_invalid_inherited_size_key() {
        let data = Rc::new(Dataset::new(
            vec!["name".into(), "x".into(), "y".into(), "w".into()],
            vec![
                vec!["a".into(), "1".into(), "1".into(), "3".into()],
                vec!["b".into(), "2".into(), "2".into(), "heavy".into()],
            ],
        ));
        let mut parent =
            GraphState::root(data, Rc::new(ChartOptions::default()), None, default_preferred_color()).unwrap();
        parent.set_key(KeySlot::Size, Some("w")).unwrap();
        let child = GraphState::child(&parent, &[1]).unwrap();
        assert_eq!(child.keys().size, None);
        assert_eq!(child.data().len(), 1);
    }

    #[test]
    fn test_chart_type_parsing() {
        assert_eq!("heatmap".parse::<ChartType>(), Ok(ChartType::Heatmap));
        assert_eq!("barchart_overview".parse::<ChartType>(), Ok(ChartType::BarchartOverview));
        assert_eq!("Scatter".parse::<ChartType>(), Ok(ChartType::Scatterplot));
        assert!("pie".parse::<ChartType>().is_err());
    }
}
