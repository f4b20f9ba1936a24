use crate::charts::{ChartSpec, build_chart};
use crate::models::{GroupingVar, Metric, ReferenceLine, Series, TripTable};
use chrono::NaiveDate;
use tracing::info;

/// Per-series chart settings.
#[derive(Debug, Clone)]
pub struct SeriesConfig {
    pub series: Series,
    pub metric: Metric,
    pub title: &'static str,
    pub y_axis_label: &'static str,
    /// Inclusive date window applied before charting; `None` keeps every row.
    pub window: Option<(NaiveDate, NaiveDate)>,
    pub years: &'static str,
    pub reference_lines: Vec<ReferenceLine>,
}

impl SeriesConfig {
    pub fn for_series(series: Series) -> Self {
        match series {
            Series::Revenue => Self {
                series,
                metric: Metric::DailyFare,
                title: "Daily Yellow Cab Fares, 2011-2024 <br> In 2025 US Dollars",
                y_axis_label: "Millions of USD",
                window: None,
                years: "2011–2024",
                reference_lines: vec![uber_launch(), covid_emergency()],
            },
            Series::Mileage => Self {
                series,
                metric: Metric::DailyMiles,
                title: "Daily Yellow Cab Mileage, 2017-2024",
                y_axis_label: "Miles Traveled",
                window: Some((ymd(2017, 1, 1), ymd(2024, 12, 31))),
                years: "2017–2024",
                reference_lines: vec![covid_emergency()],
            },
        }
    }

    /// Subheading shown under the page title for this series.
    pub fn subhead(&self) -> String {
        format!("Manhattan Yellow Cabs,<br>{}", self.years)
    }

    pub fn build(&self, table: &TripTable, grouping: GroupingVar) -> ChartSpec {
        let windowed;
        let source = match self.window {
            Some((start, end)) => {
                windowed = table.between(start, end);
                &windowed
            }
            None => table,
        };
        build_chart(
            source,
            self.metric,
            grouping,
            grouping.facet_columns(),
            self.title,
            self.y_axis_label,
            &self.reference_lines,
        )
    }
}

fn uber_launch() -> ReferenceLine {
    ReferenceLine::new(ymd(2011, 5, 4), "black", "Uber Intro'd<br>NYC").dashed("dash")
}

fn covid_emergency() -> ReferenceLine {
    ReferenceLine::new(ymd(2020, 3, 13), "#39FF14", "COVID-19 Declared <br> Natl Emergency")
}

// Only called with literal calendar dates.
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Every (series, grouping) chart, built once at startup and read-only afterwards.
#[derive(Debug)]
pub struct ChartCache {
    charts: Vec<ChartSpec>,
    subheads: Vec<String>,
}

impl ChartCache {
    pub fn build(table: &TripTable) -> Self {
        let mut charts = Vec::with_capacity(Series::ALL.len() * GroupingVar::ALL.len());
        let mut subheads = Vec::with_capacity(Series::ALL.len());

        for series in Series::ALL {
            let config = SeriesConfig::for_series(series);
            for grouping in GroupingVar::ALL {
                let chart = config.build(table, grouping);
                info!(
                    %series,
                    %grouping,
                    panels = chart.panels.len(),
                    markers = chart.markers.len(),
                    "built chart"
                );
                charts.push(chart);
            }
            subheads.push(config.subhead());
        }

        Self { charts, subheads }
    }

    pub fn get(&self, series: Series, grouping: GroupingVar) -> &ChartSpec {
        &self.charts[series.index() * GroupingVar::ALL.len() + grouping.index()]
    }

    pub fn subhead(&self, series: Series) -> &str {
        &self.subheads[series.index()]
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}
