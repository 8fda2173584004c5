use std::io;

use thiserror::Error;

use crate::oid::Oid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not a valid object name {oid}")]
    NotFound { oid: Oid },

    #[error("Corrupt object: {0}")]
    CorruptObject(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptObject(reason.into())
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
