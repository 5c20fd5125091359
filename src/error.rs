use std::io;

use thiserror::Error;

use crate::store::ElementType;

pub type Result<T> = std::result::Result<T, GeffError>;

#[derive(Debug, Error)]
pub enum GeffError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("no geff_version found in group metadata")]
    MissingVersion,
    #[error("unsupported geff version: {0}")]
    UnsupportedVersion(String),
    #[error("malformed geff version: {0:?}")]
    MalformedVersion(String),
    #[error("required attribute {0:?} is missing")]
    MissingAttribute(&'static str),
    #[error("required dataset {0:?} not found")]
    MissingDataset(String),
    #[error("{path}: expected length {expected}, found {actual}")]
    LengthMismatch {
        path: String,
        expected: usize,
        actual: usize,
    },
    #[error("{path}: expected {expected}-dimensional dataset, found {actual}-dimensional")]
    RankMismatch {
        path: String,
        expected: usize,
        actual: usize,
    },
    #[error("{path}: cannot read {actual} data as {requested}")]
    TypeMismatch {
        path: String,
        requested: ElementType,
        actual: ElementType,
    },
    #[error("block {grid_position:?} of {path}: {source}")]
    BlockIo {
        path: String,
        grid_position: Vec<u64>,
        source: Box<GeffError>,
    },
    #[error("invalid axis: {0}")]
    InvalidAxis(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl GeffError {
    /// Wraps a store failure with the dataset path and grid coordinate of the
    /// block being transferred. An error that is already a `BlockIo` keeps its
    /// original coordinate.
    pub(crate) fn into_block_io(self, path: &str, grid_position: &[u64]) -> GeffError {
        match self {
            err @ GeffError::BlockIo { .. } => err,
            other => GeffError::BlockIo {
                path: path.to_string(),
                grid_position: grid_position.to_vec(),
                source: Box::new(other),
            },
        }
    }
}
