use thiserror::Error;

#[derive(Error, Debug)]
pub enum KindredError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("Column '{0}' not found in CSV input")]
    ColumnNotFound(String),

    #[error("'{from}' and '{to}' are unrelated, no path possible")]
    UnrelatedPair { from: String, to: String },

    #[error("Path error: {0}")]
    Path(String),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Inconsistent input:\n{0}")]
    Inconsistent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, KindredError>;
