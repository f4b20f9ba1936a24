use crate::charts::ChartSpec;
use crate::view::{ViewEvent, ViewState, ViewUpdate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical dimension a row of the summary file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingVar {
    PayType,
    VendorId,
    RateCode,
}

impl GroupingVar {
    pub const ALL: [GroupingVar; 3] = [Self::PayType, Self::VendorId, Self::RateCode];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PayType => "paytype",
            Self::VendorId => "vendorid",
            Self::RateCode => "ratecode",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|var| var.as_str() == value)
    }

    /// Dropdown label shown next to the grouping selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::PayType => "Form of Payment: Cash/Credit",
            Self::VendorId => "Vendor: Creative Mobile Tech (CMT)/Curb",
            Self::RateCode => "Destination: In-City/Suburb/JFK/EWR",
        }
    }

    /// Number of facet columns before panels wrap onto a new row.
    pub fn facet_columns(self) -> usize {
        match self {
            Self::PayType | Self::VendorId => 1,
            Self::RateCode => 2,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for GroupingVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level dataset selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    #[serde(alias = "fares")]
    Revenue,
    Mileage,
}

impl Series {
    pub const ALL: [Series; 2] = [Self::Revenue, Self::Mileage];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Mileage => "mileage",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::Mileage => "Mileage",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric column plotted on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    DailyFare,
    DailyMiles,
}

impl Metric {
    pub fn value(self, record: &TripRecord) -> f64 {
        match self {
            Self::DailyFare => record.daily_fare,
            Self::DailyMiles => record.daily_miles,
        }
    }
}

/// One pre-aggregated day for one group of one grouping dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub category_date: NaiveDate,
    pub group: String,
    pub var: GroupingVar,
    pub daily_fare: f64,
    pub daily_miles: f64,
}

/// The loaded summary file. Never mutated after loading.
#[derive(Debug, Clone, Default)]
pub struct TripTable {
    rows: Vec<TripRecord>,
}

impl TripTable {
    pub fn new(rows: Vec<TripRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TripRecord] {
        &self.rows
    }

    pub fn for_var(&self, var: GroupingVar) -> impl Iterator<Item = &TripRecord> {
        self.rows.iter().filter(move |row| row.var == var)
    }

    /// Rows whose date falls inside `start..=end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> TripTable {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.category_date >= start && row.category_date <= end)
            .cloned()
            .collect();
        TripTable { rows }
    }
}

/// A dated vertical marker drawn across every facet panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub date: NaiveDate,
    pub color: String,
    pub dash: Option<String>,
    pub label: String,
}

impl ReferenceLine {
    pub fn new(date: NaiveDate, color: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            date,
            color: color.into(),
            dash: None,
            label: label.into(),
        }
    }

    pub fn dashed(mut self, dash: impl Into<String>) -> Self {
        self.dash = Some(dash.into());
        self
    }
}

/// Optional selection carried in the page URL so the page works without script.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub series: Option<Series>,
    pub grouping: Option<GroupingVar>,
    pub about: Option<bool>,
}

impl PageQuery {
    pub fn into_state(self) -> ViewState {
        let defaults = ViewState::default();
        ViewState {
            series: self.series.unwrap_or(defaults.series),
            grouping: self.grouping.unwrap_or(defaults.grouping),
            info_panel_visible: self.about.unwrap_or(defaults.info_panel_visible),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub state: ViewState,
    pub event: ViewEvent,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewResponse {
    pub state: ViewState,
    pub chart_visible: bool,
    pub toggle_label: String,
    pub subhead: String,
    /// Plotly.js figure; absent when the chart display is left untouched.
    pub figure: Option<serde_json::Value>,
}

impl From<ViewUpdate<'_>> for ViewResponse {
    fn from(update: ViewUpdate<'_>) -> Self {
        Self {
            state: update.state,
            chart_visible: update.chart_visible,
            toggle_label: update.toggle_label.to_string(),
            subhead: update.subhead.to_string(),
            figure: update.chart.map(ChartSpec::to_figure),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub rows: usize,
    pub charts: usize,
}
