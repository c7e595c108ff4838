use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::naming;
use crate::{FinalizeError, Result};

/// Result of installing a downloaded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    pub path:       PathBuf,
    /// Where a previous file at `path` was moved, if there was one.
    pub backup:     Option<PathBuf>,
    /// `hex(fingerprint) + hex(key)` when the artifact is encrypted.
    pub identifier: Option<String>,
}

/// Install `temp` inside `dir`.
///
/// With a non-empty key the name is derived from the key fingerprint and the
/// identifier is returned; otherwise `fallback_name` is used. An existing file
/// at the destination is renamed aside with a timestamp suffix first.
pub fn finalize(
    temp: NamedTempFile,
    dir: &Path,
    key: Option<&[u8]>,
    fallback_name: &str,
) -> Result<Finalized> {
    let key = key.filter(|key| !key.is_empty());
    let (name, identifier) = match key {
        Some(key) => (naming::encrypted_file_name(key), Some(naming::identifier(key))),
        None => (fallback_name.to_owned(), None),
    };

    let dest = dir.join(name);
    let backup = backup_existing(&dest)?;
    install(temp, &dest)?;
    info!(path = %dest.display(), "artifact finalized");

    Ok(Finalized {
        path: dest,
        backup,
        identifier,
    })
}

fn backup_existing(dest: &Path) -> Result<Option<PathBuf>> {
    let meta = match fs::symlink_metadata(dest) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(FinalizeError::Inspect {
                path: dest.to_path_buf(),
                source,
            });
        }
    };

    let backup_err = |source| FinalizeError::Backup {
        path: dest.to_path_buf(),
        source,
    };

    if meta.is_dir() {
        return Err(backup_err(io::Error::other("destination is a directory")));
    }

    let backup = naming::backup_path(dest, Utc::now());
    if fs::symlink_metadata(&backup).is_ok() {
        return Err(backup_err(io::Error::from(io::ErrorKind::AlreadyExists)));
    }

    move_file(dest, &backup).map_err(backup_err)?;
    info!(from = %dest.display(), to = %backup.display(), "existing file backed up");
    Ok(Some(backup))
}

fn install(temp: NamedTempFile, dest: &Path) -> Result<()> {
    match temp.persist_noclobber(dest) {
        Ok(_) => Ok(()),
        Err(err) => recover_install(err.error, err.file, dest),
    }
}

/// Handle a failed rename of `file` onto `dest`. Across devices the data is
/// copied instead; on any failure `file` stays on disk for manual recovery.
fn recover_install(error: io::Error, file: NamedTempFile, dest: &Path) -> Result<()> {
    let source = if is_cross_device(&error) {
        debug!(temp = %file.path().display(), "temp file on another device, copying");
        match copy_noclobber(file.path(), dest) {
            // Dropping `file` removes the source copy.
            Ok(()) => return Ok(()),
            Err(copy_err) => copy_err,
        }
    } else {
        error
    };

    let move_err = |temp: PathBuf, source| FinalizeError::Move {
        temp,
        dest: dest.to_path_buf(),
        source,
    };
    let temp = file.path().to_path_buf();
    match file.keep() {
        Ok((_, kept)) => Err(move_err(kept, source)),
        Err(keep_err) => Err(move_err(temp, keep_err.error)),
    }
}

/// Rename, falling back to copy and remove across devices.
pub fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(err) if is_cross_device(&err) => {
            fs::copy(src, dest)?;
            fs::remove_file(src)
        }
        Err(err) => Err(err),
    }
}

/// Copy `src` next to `dest` and publish it without clobbering, so a partial
/// copy never appears under the final name.
fn copy_noclobber(src: &Path, dest: &Path) -> io::Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".kcap-stage-")
        .tempfile_in(dir)?;
    let mut from = fs::File::open(src)?;
    io::copy(&mut from, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist_noclobber(dest).map_err(|err| err.error)?;
    Ok(())
}

fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(18) || err.kind() == io::ErrorKind::CrossesDevices
}
