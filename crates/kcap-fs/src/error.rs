use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FinalizeError {
    #[error("unable to create a backup of {}: {source}", path.display())]
    Backup { path: PathBuf, source: io::Error },

    #[error(
        "unable to rename downloaded data to {}, file exists at {}: {source}",
        dest.display(),
        temp.display()
    )]
    Move {
        temp:   PathBuf,
        dest:   PathBuf,
        source: io::Error,
    },

    #[error("unable to inspect destination {}: {source}", path.display())]
    Inspect { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, FinalizeError>;
