//! Path-adapter error type.

use eco_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("path search failed: {0}")]
    Search(#[from] SpatialError),

    #[error("path index {index} is past the end of a {len}-step path")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type PathResult<T> = Result<T, PathError>;
