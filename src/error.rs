use std::path::PathBuf;

use thiserror::Error;

/// Reasons a mirror request is refused before any filesystem work.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Please set both source and destination paths")]
    MissingPaths,

    #[error("Source and destination cannot be the same directory")]
    SamePath,

    #[error("Destination {} lies inside source {}", .destination.display(), .source_root.display())]
    DestinationInsideSource {
        source_root: PathBuf,
        destination: PathBuf,
    },

    #[error("An operation is already running")]
    AlreadyRunning,
}
