//! Spatial-subsystem error type.

use glam::IVec3;
use thiserror::Error;

/// Errors produced by `eco-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no path from {from} to {to}")]
    NoPath { from: IVec3, to: IVec3 },

    #[error("path origin {0} is not valid for the movement profile")]
    InvalidOrigin(IVec3),

    #[error("zero-length search direction")]
    ZeroDirection,

    #[error(transparent)]
    Core(#[from] eco_core::CoreError),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
