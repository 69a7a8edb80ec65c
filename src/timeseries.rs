// Time-series datasets: date columns, timeline groups, search and details

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::data::{parse_number, Dataset};
use crate::error::{Result, ValidationError};
use crate::palette::{Rgb, CATEGORY10};
use crate::scale::{distinct_values, LinearScale, PointScale};

/// Column holding whitespace-separated keywords
pub const KEYWORD_COLUMN: usize = 2;

/// Column timeline groups are split on by default
pub const DEFAULT_CATEGORY_COLUMN: usize = 1;

/// Most names returned by [`autocomplete`]
pub const MAX_SUGGESTIONS: usize = 10;

const DATE_LABEL_FORMAT: &str = "%a %b %d %Y";

/// Parse a date-valued column header
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").ok())
}

pub fn date_label(date: NaiveDate) -> String {
    date.format(DATE_LABEL_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateColumn {
    pub index: usize,
    pub key: String,
    pub date: NaiveDate,
}

/// The date-valued measurement columns of a time-series dataset, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesLayout {
    pub start: usize,
    pub columns: Vec<DateColumn>,
}

impl TimeSeriesLayout {
    /// Every header from `start` onward must be a date; at least two are needed
    pub fn detect(data: &Dataset, start: usize) -> Result<Self> {
        let mut columns = data
            .headers
            .iter()
            .enumerate()
            .skip(start)
            .map(|(index, key)| {
                parse_date(key)
                    .map(|date| DateColumn { index, key: key.clone(), date })
                    .ok_or_else(|| {
                        ValidationError::InvalidTimeSeries(format!("column '{}' is not a date", key))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        if columns.len() < 2 {
            return Err(ValidationError::InvalidTimeSeries(format!(
                "expected at least two date columns from column {}, found {}",
                start,
                columns.len()
            )));
        }
        columns.sort_by_key(|c| c.date);

        Ok(Self { start, columns })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| date_label(c.date)).collect()
    }

    /// Point scale over the dates, padded by a day on each side
    pub fn x_scale(&self, range: (f64, f64)) -> PointScale {
        let mut scale = PointScale::new(self.labels(), range);
        if let (Some(first), Some(last)) = (self.columns.first(), self.columns.last()) {
            scale.pad_labels = (
                date_label(first.date - Duration::days(1)),
                date_label(last.date + Duration::days(1)),
            );
        }
        scale
    }

    /// Value of one row in one date column; missing values read as 0
    pub fn value(&self, data: &Dataset, row: usize, column: &DateColumn) -> f64 {
        parse_number(data.value(row, column.index)).unwrap_or(0.0)
    }

    /// Linear scale over every date-column value, unpadded
    pub fn y_scale(&self, data: &Dataset, range: (f64, f64)) -> LinearScale {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for row in 0..data.len() {
            for column in &self.columns {
                let v = self.value(data, row, column);
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        if !lo.is_finite() {
            lo = 0.0;
            hi = 0.0;
        }
        LinearScale::new((lo, hi), range)
    }
}

// =============================================================================
// Timeline groups
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineGroup {
    pub header: String,
    pub rows: Vec<usize>,
    pub color: Rgb,
}

/// "All Data" plus one group per category of `category_column`
pub fn group_timelines(data: &Dataset, category_column: usize) -> Vec<TimelineGroup> {
    let mut groups = vec![TimelineGroup {
        header: "All Data".to_string(),
        rows: (0..data.len()).collect(),
        color: CATEGORY10[0],
    }];

    for (k, category) in distinct_values(data, category_column).into_iter().enumerate() {
        let rows = (0..data.len())
            .filter(|&r| data.value(r, category_column) == category)
            .collect();
        groups.push(TimelineGroup {
            header: format!("Category: {}", category),
            rows,
            color: CATEGORY10[k % CATEGORY10.len()],
        });
    }
    groups
}

// =============================================================================
// Search
// =============================================================================

/// Sorted display names containing `term`, case-insensitively
pub fn autocomplete(data: &Dataset, term: &str) -> Vec<String> {
    let needle = term.to_lowercase();
    let mut names: Vec<String> = (0..data.len())
        .map(|r| data.name(r).to_string())
        .filter(|name| name.to_lowercase().contains(&needle))
        .collect();
    names.sort();
    names.dedup();
    names.truncate(MAX_SUGGESTIONS);
    names
}

pub fn find_by_name(data: &Dataset, name: &str) -> Result<usize> {
    (0..data.len())
        .find(|&r| data.name(r) == name)
        .ok_or_else(|| ValidationError::NotFound(name.to_string()))
}

// =============================================================================
// Node details
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordWeight {
    pub word: String,
    pub font_size: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDetails {
    pub name: String,
    pub fields: Vec<(String, String)>,
    pub words: Vec<WordWeight>,
    /// (date label, value) per date column
    pub timeline: Vec<(String, f64)>,
}

/// Font sizes shrink from 40 to 8 in order of first appearance
fn word_weights(raw: &str) -> Vec<WordWeight> {
    let mut words: Vec<String> = Vec::new();
    for word in raw.split_whitespace() {
        if !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }

    let (large, small) = (40.0, 8.0);
    let n = words.len();
    words
        .into_iter()
        .enumerate()
        .map(|(i, word)| {
            let font_size = if n < 2 {
                (large + small) / 2.0
            } else {
                large + (small - large) * i as f64 / (n - 1) as f64
            };
            WordWeight {
                word,
                font_size,
                color: CATEGORY10[i % CATEGORY10.len()],
            }
        })
        .collect()
}

pub fn node_details(data: &Dataset, row: usize, layout: Option<&TimeSeriesLayout>) -> NodeDetails {
    let fields = data
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.clone(), data.value(row, i).to_string()))
        .collect();

    let timeline = layout
        .map(|l| {
            l.columns
                .iter()
                .map(|c| (date_label(c.date), l.value(data, row, c)))
                .collect()
        })
        .unwrap_or_default();

    NodeDetails {
        name: data.name(row).to_string(),
        fields,
        words: word_weights(data.value(row, KEYWORD_COLUMN)),
        timeline,
    }
}
