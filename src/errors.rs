use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Load-time failures of the summary file. All of them are fatal.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read data file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid date `{value}`")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: unknown grouping variable `{value}`")]
    UnknownVar { row: usize, value: String },

    #[error("row {row}: non-finite value in column `{column}`")]
    NonFinite { row: usize, column: &'static str },

    #[error("row {row}: duplicate entry for var `{var}`, group `{group}` on {date}")]
    DuplicateRow {
        row: usize,
        var: String,
        group: String,
        date: String,
    },
}
