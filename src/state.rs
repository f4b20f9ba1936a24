use crate::dashboard::ChartCache;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub charts: Arc<ChartCache>,
    pub rows: usize,
}

impl AppState {
    pub fn new(charts: ChartCache, rows: usize) -> Self {
        Self {
            charts: Arc::new(charts),
            rows,
        }
    }
}
