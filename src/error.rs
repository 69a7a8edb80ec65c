use thiserror::Error;

use crate::graph_state::{ChartType, KeySlot};

/// Recoverable rejections raised while building or changing a chart.
///
/// Every variant leaves the session usable: the change that triggered it is
/// rolled back and the previously compiled view stays in place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("'{0}' is not a .csv file")]
    WrongFileType(String),

    #[error("column '{key}' has {count} categories; the {slot} encoding allows at most {max}")]
    TooManyCategories {
        slot: KeySlot,
        key: String,
        count: usize,
        max: usize,
    },

    #[error("column '{key}' is not numeric and cannot be used for {slot}")]
    NotNumeric { slot: KeySlot, key: String },

    #[error("too many categories on the x axis: bars would be {width:.2}px wide")]
    TooManyBars { width: f64 },

    #[error("column '{key}' has no usable values")]
    EmptyColumn { key: String },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("the {slot} selector is disabled for {chart}")]
    SelectorDisabled { slot: KeySlot, chart: ChartType },

    #[error("{0} is only available for time-series data")]
    UnavailableChartType(ChartType),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid time-series data: {0}")]
    InvalidTimeSeries(String),
}

impl ValidationError {
    /// The key selector a rejection belongs to, when there is one
    pub fn slot(&self) -> Option<KeySlot> {
        match self {
            ValidationError::TooManyCategories { slot, .. }
            | ValidationError::NotNumeric { slot, .. }
            | ValidationError::SelectorDisabled { slot, .. } => Some(*slot),
            ValidationError::TooManyBars { .. } => Some(KeySlot::X),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
