use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot decode image '{}': {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Malformed or missing input records.
    #[error("data error: {0}")]
    Data(String),

    /// Inconsistent hyperparameters or architecture.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("shape mismatch: expected {expected}, found {found}")]
    Shape { expected: String, found: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
        Error::Io { path: path.into(), source }
    }

    pub fn data(message: impl Into<String>) -> Error {
        Error::Data(message.into())
    }

    pub fn config(message: impl Into<String>) -> Error {
        Error::Config(message.into())
    }

    pub fn shape(expected: impl ToString, found: impl ToString) -> Error {
        Error::Shape { expected: expected.to_string(), found: found.to_string() }
    }
}
