use crate::charts::ChartSpec;
use crate::errors::AppError;
use crate::models::{GroupingVar, HealthResponse, PageQuery, Series, ViewRequest, ViewResponse};
use crate::state::AppState;
use crate::ui::render_index;
use crate::view::{ViewController, ViewState};
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use serde_json::Value;

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let controller = ViewController::new(&state.charts);
    let view = controller.render(query.into_state());
    let figure = current_figure(&state, view.state);
    Ok(Html(render_index(&view, &figure)?))
}

pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        rows: state.rows,
        charts: state.charts.len(),
    })
}

pub async fn get_view(
    State(state): State<AppState>,
    Query(view_state): Query<ViewState>,
) -> Json<ViewResponse> {
    let controller = ViewController::new(&state.charts);
    Json(controller.render(view_state).into())
}

pub async fn post_view(
    State(state): State<AppState>,
    Json(request): Json<ViewRequest>,
) -> Json<ViewResponse> {
    let controller = ViewController::new(&state.charts);
    Json(controller.apply(request.state, request.event).into())
}

pub async fn get_chart(
    State(state): State<AppState>,
    Path((series, grouping)): Path<(Series, GroupingVar)>,
) -> Json<Value> {
    Json(state.charts.get(series, grouping).to_figure())
}

pub async fn get_chart_spec(
    State(state): State<AppState>,
    Path((series, grouping)): Path<(Series, GroupingVar)>,
) -> Json<ChartSpec> {
    Json(state.charts.get(series, grouping).clone())
}

// The page always embeds the figure for the current selection, even while the
// About panel hides it, so closing the panel needs no round trip.
fn current_figure(state: &AppState, view_state: ViewState) -> Value {
    state
        .charts
        .get(view_state.series, view_state.grouping)
        .to_figure()
}
