pub mod app;
pub mod charts;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod ui;
pub mod view;

pub use app::router;
pub use dashboard::ChartCache;
pub use state::AppState;
pub use storage::{load_table, resolve_data_path};
