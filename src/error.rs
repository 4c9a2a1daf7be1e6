//! Error type shared by the loader, indexer, extractor and datasets.

use std::path::PathBuf;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json parse error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid annotation at {path}: {msg}")]
    Annotation { path: PathBuf, msg: String },
    #[error("decoder error for {path}: {msg}")]
    Decoder { path: PathBuf, msg: String },
    #[error("resize failed: {0}")]
    Resize(String),
    #[error("sequence buffer holds {got} values, shape {shape:?} needs {expected}")]
    ShapeMismatch {
        shape: [usize; 4],
        expected: usize,
        got: usize,
    },
    #[error("roi {roi:?} exceeds {width}x{height} frame")]
    RoiOutOfBounds {
        roi: [u32; 4],
        width: u32,
        height: u32,
    },
    #[error("sample index {index} out of range for dataset of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("short read from {path} at frame {start}: expected {expected} frames, got {got}")]
    ShortRead {
        path: PathBuf,
        start: usize,
        expected: usize,
        got: usize,
    },
    #[error("no frames readable from {path} at frame {start}")]
    EmptySequence { path: PathBuf, start: usize },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl DatasetError {
    pub(crate) fn decoder(path: impl Into<PathBuf>, msg: impl ToString) -> Self {
        DatasetError::Decoder {
            path: path.into(),
            msg: msg.to_string(),
        }
    }
}
