//! Collision-safe finalization of downloaded capture artifacts.
//!
//! A download accumulates in a [`tempfile::NamedTempFile`] and is only
//! exposed under its final name by [`finalize`]. A file already occupying that
//! name is renamed aside with a timestamp suffix, never overwritten.

pub use error::{FinalizeError, Result};
pub use finalize::{Finalized, finalize, move_file};
pub use naming::{
    BACKUP_TIME_FORMAT, backup_path, conservative_file_name, encrypted_file_name,
    fallback_file_name, fingerprint, identifier,
};

mod error;
mod finalize;
mod naming;
