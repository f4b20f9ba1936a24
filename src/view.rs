//! Reactive view state for the dashboard page.
//!
//! The chart region and the About panel share one viewport and are never
//! shown together: opening the panel hides the chart (and no chart is
//! emitted for that transition), closing it shows the chart for the current
//! selection again. Selecting a series or grouping always emits the matching
//! precomputed chart and leaves the panel alone.

use crate::charts::ChartSpec;
use crate::dashboard::ChartCache;
use crate::models::{GroupingVar, Series};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub series: Series,
    pub grouping: GroupingVar,
    pub info_panel_visible: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            series: Series::Revenue,
            grouping: GroupingVar::PayType,
            info_panel_visible: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ViewEvent {
    SelectSeries(Series),
    SelectGrouping(GroupingVar),
    ToggleInfoPanel,
}

/// What the page should display after a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewUpdate<'a> {
    pub state: ViewState,
    pub chart_visible: bool,
    pub toggle_label: &'static str,
    pub subhead: &'a str,
    /// `None` when the chart display is left untouched.
    pub chart: Option<&'a ChartSpec>,
}

pub struct ViewController<'a> {
    cache: &'a ChartCache,
}

impl<'a> ViewController<'a> {
    pub fn new(cache: &'a ChartCache) -> Self {
        Self { cache }
    }

    /// Full view for a state, as shown on first load.
    pub fn render(&self, state: ViewState) -> ViewUpdate<'a> {
        let chart = (!state.info_panel_visible).then(|| self.cache.get(state.series, state.grouping));
        self.update(state, chart)
    }

    pub fn apply(&self, state: ViewState, event: ViewEvent) -> ViewUpdate<'a> {
        let mut next = state;
        let chart = match event {
            ViewEvent::SelectSeries(series) => {
                next.series = series;
                Some(self.cache.get(next.series, next.grouping))
            }
            ViewEvent::SelectGrouping(grouping) => {
                next.grouping = grouping;
                Some(self.cache.get(next.series, next.grouping))
            }
            ViewEvent::ToggleInfoPanel => {
                next.info_panel_visible = !state.info_panel_visible;
                if next.info_panel_visible {
                    None
                } else {
                    Some(self.cache.get(next.series, next.grouping))
                }
            }
        };
        debug!(?event, ?next, "view transition");
        self.update(next, chart)
    }

    fn update(&self, state: ViewState, chart: Option<&'a ChartSpec>) -> ViewUpdate<'a> {
        ViewUpdate {
            state,
            chart_visible: !state.info_panel_visible,
            toggle_label: if state.info_panel_visible { "Back" } else { "About" },
            subhead: self.cache.subhead(state.series),
            chart,
        }
    }
}
