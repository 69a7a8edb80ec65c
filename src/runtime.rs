// Session runtime: replays parsed commands against a chain

use serde::Serialize;

use crate::chain::{BrushOutcome, Chain, LinkSummary};
use crate::error::{Result, ValidationError};
use crate::graph_state::{EditCommand, Transition};
use crate::parser::ast::{Command, Script};
use crate::selection::SelectionRect;
use crate::timeseries::{autocomplete, find_by_name, node_details, NodeDetails};

/// A rejected command. The session carries on as if it had not been issued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    /// Position of the command in the script
    pub command: usize,
    pub message: String,
}

/// Output of the informational commands
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Note {
    Search { term: String, matches: Vec<String> },
    Details(NodeDetails),
}

/// Everything a session produced, ready for `serde_json`
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub focus: usize,
    pub links: Vec<LinkSummary>,
    pub notices: Vec<Notice>,
    pub notes: Vec<Note>,
}

pub struct Session {
    chain: Chain,
    focus: usize,
    /// Answer for the next yes/no prompt; prompts default to yes
    pending_answer: Option<bool>,
    notices: Vec<Notice>,
    notes: Vec<Note>,
}

impl Session {
    pub fn new(chain: Chain) -> Self {
        Self {
            focus: chain.last_index(),
            chain,
            pending_answer: None,
            notices: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Link the next command acts on
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Run every command of `script`. Rejections become notices.
    pub fn execute(&mut self, script: &Script) {
        for (index, command) in script.commands.iter().enumerate() {
            if let Err(e) = self.run(command) {
                tracing::warn!(command = index, error = %e, "command rejected");
                self.notices.push(Notice {
                    command: index,
                    message: e.to_string(),
                });
            }
        }
    }

    /// Run one command against the focused link
    pub fn run(&mut self, command: &Command) -> Result<()> {
        tracing::debug!(?command, focus = self.focus, "running command");
        match command {
            Command::Chart(chart) => {
                let pending = &mut self.pending_answer;
                let outcome = self
                    .chain
                    .link_mut(self.focus)?
                    .switch_chart_type(*chart, &mut |_: &str| pending.take().unwrap_or(true))?;
                if outcome == Transition::Declined {
                    tracing::info!(chart = %chart, "chart switch declined");
                }
            }
            Command::Key { slot, column } => {
                self.chain
                    .link_mut(self.focus)?
                    .set_key(*slot, column.as_deref())?;
            }
            Command::Brush { x1, y1, x2, y2, link } => {
                let index = link.unwrap_or(self.focus);
                let rect = SelectionRect::from_corners((*x1, *y1), (*x2, *y2));
                match self.chain.brush(index, rect)? {
                    BrushOutcome::Extended { child, rows } => {
                        tracing::debug!(child, rows, "brush selected rows");
                        self.focus = child;
                    }
                    BrushOutcome::Empty | BrushOutcome::Click => self.focus = index,
                }
            }
            Command::Focus(index) => {
                self.chain.link(*index)?;
                self.focus = *index;
            }
            Command::Confirm(answer) => self.pending_answer = Some(*answer),
            Command::Recolor { category, color } => self.edit(EditCommand::SetCategoryColor {
                category: category.clone(),
                color: *color,
            })?,
            Command::Endpoint { endpoint, color } => self.edit(EditCommand::SetEndpointColor {
                endpoint: *endpoint,
                color: *color,
            })?,
            Command::Reshape { category, shape } => self.edit(EditCommand::SetCategoryShape {
                category: category.clone(),
                shape: *shape,
            })?,
            Command::Group(column) => {
                self.chain.set_group_column(column)?;
                self.focus = 0;
            }
            Command::Start(group) => {
                if !self.chain.is_time_series() {
                    return Err(ValidationError::InvalidTimeSeries(
                        "timeline groups need time-series data".to_string(),
                    ));
                }
                self.chain.start_group(*group)?;
                self.focus = 0;
            }
            Command::Search(term) => {
                let matches = autocomplete(self.chain.source(), term);
                self.notes.push(Note::Search {
                    term: term.clone(),
                    matches,
                });
            }
            Command::Details(name) => {
                let link = self.chain.link(self.focus)?;
                let row = find_by_name(link.data(), name)?;
                self.notes
                    .push(Note::Details(node_details(link.data(), row, link.layout())));
            }
        }
        Ok(())
    }

    fn edit(&mut self, edit: EditCommand) -> Result<()> {
        self.chain.link_mut(self.focus)?.apply_edit(&edit)
    }

    pub fn report(&self) -> Report {
        Report {
            focus: self.focus,
            links: self.chain.summary(),
            notices: self.notices.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::graph_state::{ChartType, KeySlot};
    use crate::palette::Rgb;
    use crate::parser;
    use crate::ChartOptions;

    fn make_session() -> Session {
        let rows = (0..12)
            .map(|i| {
                vec![
                    format!("item{}", i),
                    format!("{}", i),
                    format!("{}", (i * 7) % 12),
                    format!("g{}", i % 3),
                    format!("{}", i * 10),
                ]
            })
            .collect();
        let data = Dataset::new(
            vec!["name".into(), "a".into(), "b".into(), "group".into(), "weight".into()],
            rows,
        );
        Session::new(Chain::new(data, ChartOptions::default(), false).unwrap())
    }

    fn run_script(session: &mut Session, text: &str) {
        let script = parser::parse(text).unwrap();
        session.execute(&script);
    }

    #[test]
    fn test_keys_and_brush_move_focus() {
        let mut session = make_session();
        run_script(&mut session, "color group | size weight | brush 0 0 650 650");
        assert!(session.notices().is_empty());
        assert_eq!(session.chain().len(), 2);
        assert_eq!(session.focus(), 1);

        let child = session.chain().link(1).unwrap();
        assert_eq!(child.keys().color.as_deref(), Some("group"));
        assert_eq!(child.keys().size.as_deref(), Some("weight"));
    }

    #[test]
    fn test_rejection_becomes_notice() {
        let mut session = make_session();
        run_script(&mut session, "size group; x missing; color group");
        let commands: Vec<usize> = session.notices().iter().map(|n| n.command).collect();
        assert_eq!(commands, vec![0, 1]);
        assert!(session.notices()[1].message.contains("missing"));
        // the session kept going
        let root = session.chain().link(0).unwrap();
        assert_eq!(root.keys().color.as_deref(), Some("group"));
        assert_eq!(root.keys().size, None);
    }

    #[test]
    fn test_declined_heatmap_keeps_chart() {
        let mut session = make_session();
        run_script(&mut session, "brush 0 0 650 650; focus 0; confirm no; chart heatmap");
        assert_eq!(session.chain().link(0).unwrap().chart_type(), ChartType::Scatterplot);

        run_script(&mut session, "chart heatmap");
        assert_eq!(session.chain().link(0).unwrap().chart_type(), ChartType::Heatmap);
    }

    #[test]
    fn test_confirm_waits_for_a_prompt() {
        let mut session = make_session();
        run_script(
            &mut session,
            "brush 0 0 650 650; focus 0; confirm no; chart barchart; chart heatmap",
        );
        assert!(session.notices().is_empty(), "{:?}", session.notices());
        assert_eq!(session.chain().link(0).unwrap().chart_type(), ChartType::Barchart);

        // the answer was used up by the heatmap prompt
        run_script(&mut session, "chart heatmap");
        assert_eq!(session.chain().link(0).unwrap().chart_type(), ChartType::Heatmap);
    }

    #[test]
    fn test_group_command_regroups_timelines() {
        let data = Dataset::new(
            vec!["name".into(), "kind".into(), "keywords".into(), "source".into(), "2020-01-01".into(), "2020-02-01".into()],
            vec![
                vec!["a".into(), "x".into(), "".into(), "web".into(), "1".into(), "2".into()],
                vec!["b".into(), "x".into(), "".into(), "store".into(), "2".into(), "3".into()],
                vec!["c".into(), "y".into(), "".into(), "store".into(), "3".into(), "1".into()],
            ],
        );
        let mut session = Session::new(Chain::new(data, ChartOptions::default(), true).unwrap());
        run_script(&mut session, "brush 0 0 650 650; group source; start 2");
        assert!(session.notices().is_empty(), "{:?}", session.notices());
        assert_eq!(session.focus(), 0);
        assert_eq!(session.chain().len(), 1);
        assert_eq!(session.chain().link(0).unwrap().data().len(), 2);
    }

    #[test]
    fn test_edits_apply_to_focused_link() {
        let mut session = make_session();
        run_script(&mut session, "color group | recolor g1 #010203 | shape group | reshape g0 square");
        assert!(session.notices().is_empty());
        let root = session.chain().link(0).unwrap();
        let color = root.encodings().color.as_ref().unwrap();
        assert_eq!(color.color_for("g1"), Some(Rgb(1, 2, 3)));
        let shapes = root.encodings().shape.as_ref().unwrap();
        assert_eq!(shapes.get("g0").map(|s| s.name()), Some("square"));
    }

    #[test]
    fn test_disabled_selector_on_heatmap() {
        let mut session = make_session();
        run_script(&mut session, "chart heatmap | color group");
        assert_eq!(session.notices().len(), 1);
        let root = session.chain().link(0).unwrap();
        assert_eq!(root.keys().get(KeySlot::Color), None);
    }

    #[test]
    fn test_start_requires_time_series() {
        let mut session = make_session();
        run_script(&mut session, "start 1");
        assert_eq!(session.notices().len(), 1);
        assert_eq!(session.chain().len(), 1);
    }

    #[test]
    fn test_search_and_details_notes() {
        let mut session = make_session();
        run_script(&mut session, "search ITEM1 | details item3 | details nobody");
        assert_eq!(session.notices().len(), 1);
        match &session.notes()[0] {
            Note::Search { matches, .. } => {
                assert_eq!(matches, &vec!["item1".to_string(), "item10".into(), "item11".into()])
            }
            other => panic!("unexpected note {:?}", other),
        }
        match &session.notes()[1] {
            Note::Details(details) => assert_eq!(details.name, "item3"),
            other => panic!("unexpected note {:?}", other),
        }
    }

    #[test]
    fn test_report_serializes() {
        let mut session = make_session();
        run_script(&mut session, "brush 0 0 650 650");
        let json = serde_json::to_value(session.report()).unwrap();
        assert_eq!(json["focus"], 1);
        assert_eq!(json["links"].as_array().unwrap().len(), 2);
        assert_eq!(json["links"][0]["chart"], "scatterplot");
    }
}
