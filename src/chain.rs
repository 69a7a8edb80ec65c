// The drilldown chain: each link shows the rows selected on the link before it

use serde::Serialize;
use std::rc::Rc;

use crate::data::Dataset;
use crate::error::{Result, ValidationError};
use crate::graph_state::{ChartType, GraphState, Keys};
use crate::legend::Legend;
use crate::palette::{default_preferred_color, Rgb};
use crate::selection::{select, Selection, SelectionRect};
use crate::timeseries::{group_timelines, TimeSeriesLayout, TimelineGroup, DEFAULT_CATEGORY_COLUMN};
use crate::ChartOptions;

/// What a brush did to the chain
#[derive(Debug, Clone, PartialEq)]
pub enum BrushOutcome {
    /// Below the drag threshold
    Click,
    /// Nothing under the rectangle; the chain is untouched
    Empty,
    /// Rows were selected and a new link appended at `child`
    Extended { child: usize, rows: usize },
}

#[derive(Debug, Clone)]
pub struct Chain {
    links: Vec<GraphState>,
    /// The full loaded dataset, for timeline groups
    source: Rc<Dataset>,
    options: Rc<ChartOptions>,
    layout: Option<Rc<TimeSeriesLayout>>,
    /// Column that splits the timeline groups
    group_column: usize,
}

impl Chain {
    /// Start a chain over `data`. Time-series data must carry date columns
    /// from `options.timeline_start` onward.
    pub fn new(data: Dataset, options: ChartOptions, time_series: bool) -> Result<Self> {
        let layout = if time_series {
            Some(Rc::new(TimeSeriesLayout::detect(&data, options.timeline_start)?))
        } else {
            None
        };
        let source = Rc::new(data);
        let options = Rc::new(options);
        let root = GraphState::root(
            Rc::clone(&source),
            Rc::clone(&options),
            layout.clone(),
            default_preferred_color(),
        )?;

        Ok(Self {
            links: vec![root],
            source,
            options,
            layout,
            group_column: DEFAULT_CATEGORY_COLUMN,
        })
    }

    pub fn links(&self) -> &[GraphState] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn link(&self, index: usize) -> Result<&GraphState> {
        self.links
            .get(index)
            .ok_or_else(|| ValidationError::NotFound(format!("link {}", index)))
    }

    pub fn link_mut(&mut self, index: usize) -> Result<&mut GraphState> {
        self.links
            .get_mut(index)
            .ok_or_else(|| ValidationError::NotFound(format!("link {}", index)))
    }

    pub fn last_index(&self) -> usize {
        self.links.len().saturating_sub(1)
    }

    pub fn source(&self) -> &Dataset {
        &self.source
    }

    pub fn is_time_series(&self) -> bool {
        self.layout.is_some()
    }

    /// Discard every link after `parent` and append a child showing `rows`
    pub fn extend(&mut self, parent: usize, rows: &[usize]) -> Result<usize> {
        self.link(parent)?;
        self.links.truncate(parent + 1);
        let child = GraphState::child(&self.links[parent], rows)?;
        self.links.push(child);
        tracing::info!(parent, rows = rows.len(), depth = self.links.len(), "extended chain");
        Ok(parent + 1)
    }

    /// Brush on link `index`. A non-empty selection replaces the link's
    /// selected rows and drills down into them.
    pub fn brush(&mut self, index: usize, rect: SelectionRect) -> Result<BrushOutcome> {
        match select(self.link(index)?, rect) {
            Selection::Click => Ok(BrushOutcome::Click),
            Selection::Rows(rows) if rows.is_empty() => Ok(BrushOutcome::Empty),
            Selection::Rows(rows) => {
                let count = rows.len();
                let child = self.extend(index, &rows)?;
                self.links[index].set_selected(rows);
                Ok(BrushOutcome::Extended { child, rows: count })
            }
        }
    }

    /// Throw the whole chain away and start over on `data`
    pub fn start(&mut self, data: Dataset, preferred: Rgb) -> Result<()> {
        self.restart(Rc::new(data), preferred)
    }

    fn restart(&mut self, data: Rc<Dataset>, preferred: Rgb) -> Result<()> {
        let root = GraphState::root(
            data,
            Rc::clone(&self.options),
            self.layout.clone(),
            preferred,
        )?;
        self.links = vec![root];
        tracing::info!("started new chain");
        Ok(())
    }

    pub fn timeline_groups(&self) -> Vec<TimelineGroup> {
        group_timelines(&self.source, self.group_column)
    }

    pub fn group_column(&self) -> usize {
        self.group_column
    }

    /// Split the timeline groups on `key`. A new column starts the chain
    /// over on the full dataset.
    pub fn set_group_column(&mut self, key: &str) -> Result<()> {
        if self.layout.is_none() {
            return Err(ValidationError::InvalidTimeSeries(
                "timeline groups need time-series data".to_string(),
            ));
        }
        let column = self.source.column_index(key)?;
        if column == self.group_column {
            return Ok(());
        }
        self.restart(Rc::clone(&self.source), default_preferred_color())?;
        self.group_column = column;
        tracing::info!(column = key, groups = self.timeline_groups().len(), "regrouped timelines");
        Ok(())
    }

    /// Start over on one timeline group, drawn in the group's color
    pub fn start_group(&mut self, group: usize) -> Result<()> {
        let group = self
            .timeline_groups()
            .into_iter()
            .nth(group)
            .ok_or_else(|| ValidationError::NotFound(format!("timeline group {}", group)))?;
        self.start(self.source.subset(&group.rows), group.color)
    }

    pub fn summary(&self) -> Vec<LinkSummary> {
        self.links
            .iter()
            .enumerate()
            .map(|(index, link)| LinkSummary {
                index,
                chart: link.chart_type(),
                keys: link.keys().clone(),
                rows: link.data().len(),
                selected: link.selected().to_vec(),
                marks: link.scene().marks.len(),
                legend: link.scene().legend.clone(),
            })
            .collect()
    }
}

/// Serializable snapshot of one link
#[derive(Debug, Clone, Serialize)]
pub struct LinkSummary {
    pub index: usize,
    pub chart: ChartType,
    pub keys: Keys,
    pub rows: usize,
    pub selected: Vec<usize>,
    pub marks: usize,
    pub legend: Legend,
}
