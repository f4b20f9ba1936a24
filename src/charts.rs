//! Faceted stacked-area chart descriptions.
//!
//! A [`ChartSpec`] is a plain description of one chart: one facet panel per
//! group with its dated points, plus the reference markers drawn across every
//! panel. [`ChartSpec::to_figure`] turns it into a Plotly.js figure for the page.

use crate::models::{GroupingVar, Metric, ReferenceLine, TripTable};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value, json};

/// Plotly's default qualitative palette.
const PALETTE: [&str; 10] = [
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

const X_AXIS_LABEL: &str = "Date";
const LINE_WIDTH: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetPanel {
    pub group: String,
    pub color: String,
    pub y_axis_label: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceMarker {
    pub date: NaiveDate,
    pub color: String,
    pub dash: Option<String>,
    pub width: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub metric: Metric,
    pub grouping: GroupingVar,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub facet_columns: usize,
    pub panels: Vec<FacetPanel>,
    pub markers: Vec<ReferenceMarker>,
}

/// Builds the stacked-area chart of `metric` for the rows of `table` whose
/// `var` equals `grouping`, one facet panel per distinct group.
///
/// Panels keep the order in which their group first appears in the table.
/// Points inside a panel are sorted by date.
pub fn build_chart(
    table: &TripTable,
    metric: Metric,
    grouping: GroupingVar,
    facet_columns: usize,
    title: &str,
    y_axis_label: &str,
    reference_lines: &[ReferenceLine],
) -> ChartSpec {
    let mut panels: Vec<FacetPanel> = Vec::new();
    for record in table.for_var(grouping) {
        let point = ChartPoint {
            date: record.category_date,
            value: metric.value(record),
        };
        match panels.iter_mut().find(|panel| panel.group == record.group) {
            Some(panel) => panel.points.push(point),
            None => {
                let color = PALETTE[panels.len() % PALETTE.len()].to_string();
                panels.push(FacetPanel {
                    group: record.group.clone(),
                    color,
                    y_axis_label: y_axis_label.to_string(),
                    points: vec![point],
                });
            }
        }
    }
    for panel in &mut panels {
        panel.points.sort_by_key(|point| point.date);
    }

    let markers = reference_lines
        .iter()
        .map(|line| ReferenceMarker {
            date: line.date,
            color: line.color.clone(),
            dash: line.dash.clone(),
            width: LINE_WIDTH,
            label: line.label.clone(),
        })
        .collect();

    ChartSpec {
        title: title.to_string(),
        metric,
        grouping,
        x_axis_label: X_AXIS_LABEL.to_string(),
        y_axis_label: y_axis_label.to_string(),
        facet_columns: facet_columns.max(1),
        panels,
        markers,
    }
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn facet_rows(&self) -> usize {
        self.panels.len().div_ceil(self.facet_columns)
    }

    pub fn panel(&self, group: &str) -> Option<&FacetPanel> {
        self.panels.iter().find(|panel| panel.group == group)
    }

    /// Renders the chart as a Plotly.js figure (`{"data": [...], "layout": {...}}`).
    pub fn to_figure(&self) -> Value {
        let mut layout = Map::new();
        layout.insert("title".into(), json!({ "text": self.title }));
        layout.insert("showlegend".into(), json!(true));
        layout.insert("hovermode".into(), json!("x unified"));

        if self.panels.is_empty() {
            layout.insert("xaxis".into(), axis_layout(&self.x_axis_label, "date"));
            layout.insert("yaxis".into(), axis_layout(&self.y_axis_label, "linear"));
            return json!({ "data": [], "layout": layout });
        }

        layout.insert(
            "grid".into(),
            json!({
                "rows": self.facet_rows(),
                "columns": self.facet_columns,
                "pattern": "independent",
                "roworder": "top to bottom",
            }),
        );

        let mut traces = Vec::with_capacity(self.panels.len());
        let mut shapes = Vec::new();
        let mut annotations = Vec::new();

        for (index, panel) in self.panels.iter().enumerate() {
            let suffix = axis_suffix(index);
            let x_ref = format!("x{suffix}");
            let y_ref = format!("y{suffix}");

            traces.push(json!({
                "type": "scatter",
                "mode": "lines",
                "name": panel.group,
                "legendgroup": panel.group,
                "stackgroup": format!("stack{suffix}"),
                "line": { "color": panel.color },
                "fillcolor": panel.color,
                "x": panel.points.iter().map(|p| p.date.to_string()).collect::<Vec<_>>(),
                "y": panel.points.iter().map(|p| p.value).collect::<Vec<_>>(),
                "xaxis": x_ref,
                "yaxis": y_ref,
            }));

            let mut x_axis = axis_layout(&self.x_axis_label, "date");
            if index > 0 {
                x_axis["matches"] = json!("x");
            }
            layout.insert(format!("xaxis{suffix}"), x_axis);
            layout.insert(format!("yaxis{suffix}"), axis_layout(&panel.y_axis_label, "linear"));

            for marker in &self.markers {
                let mut line = json!({ "color": marker.color, "width": marker.width });
                if let Some(dash) = &marker.dash {
                    line["dash"] = json!(dash);
                }
                shapes.push(json!({
                    "type": "line",
                    "xref": x_ref,
                    "yref": format!("{y_ref} domain"),
                    "x0": marker.date.to_string(),
                    "x1": marker.date.to_string(),
                    "y0": 0,
                    "y1": 1,
                    "line": line,
                }));
                annotations.push(json!({
                    "xref": x_ref,
                    "yref": format!("{y_ref} domain"),
                    "x": marker.date.to_string(),
                    "y": 1,
                    "text": marker.label,
                    "showarrow": false,
                    "xanchor": "left",
                    "yanchor": "top",
                }));
            }
        }

        layout.insert("shapes".into(), Value::Array(shapes));
        layout.insert("annotations".into(), Value::Array(annotations));

        json!({ "data": traces, "layout": layout })
    }
}

// Plotly names the first axis pair `x`/`y`, then `x2`/`y2`, ...
fn axis_suffix(index: usize) -> String {
    if index == 0 {
        String::new()
    } else {
        (index + 1).to_string()
    }
}

fn axis_layout(title: &str, kind: &str) -> Value {
    json!({ "title": { "text": title }, "type": kind })
}
