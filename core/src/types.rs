//! types.rs
//! Crate error type.

use std::collections::TryReserveError;
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

use crate::backend::BackendError;

/// Error returned by every stream operation.
#[derive(Debug, Error)]
pub enum CompressError {
    /// Bad constructor or helper argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Use after finalize.
    #[error("{0}")]
    InvalidState(&'static str),

    /// Buffer reservation failed or the instance lock is poisoned.
    #[error("resource error: {0}")]
    Resource(String),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Reading from the source of a stream helper failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<TryReserveError> for CompressError {
    fn from(e: TryReserveError) -> Self {
        CompressError::Resource(e.to_string())
    }
}

impl<T> From<PoisonError<T>> for CompressError {
    fn from(_: PoisonError<T>) -> Self {
        CompressError::Resource("instance lock poisoned".into())
    }
}
