//! Loose-object store in the git format: content-addressed blobs, trees
//! and commits, plus a builder that snapshots a directory into a tree.

pub mod error;
pub mod oid;
pub mod repository;

pub use error::{Error, Result};
pub use oid::Oid;
pub use repository::Repository;
