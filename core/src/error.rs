use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data source not found at: {path}")]
    DataSourceNotFound { path: String },

    #[error("Required column '{column}' missing from data source")]
    MissingColumn { column: String },

    #[error("Invalid value in row {row}, column '{column}': '{value}'")]
    InvalidValue { row: usize, column: String, value: String },

    #[error("Cannot build risk state from an empty population")]
    EmptyPopulation,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
