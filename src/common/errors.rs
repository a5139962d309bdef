//! Typed failures raised by transfer stages and platform collaborators.

use std::io;
use thiserror::Error;

/// Failure of a single transfer stage.
///
/// Region resolution has no error type on purpose: it degrades to an
/// unresolved locator and the caller gates on that.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("failed to open source {path}: {source}")]
    OpenSource {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to allocate {size} byte transfer buffer")]
    AllocateBuffer { size: usize },
    #[error("failed to open destination {path}: {source}")]
    OpenDestination {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("copy failed: {0}")]
    Copy(#[source] io::Error),
    #[error("short write: destination accepted {written} of {requested} bytes")]
    ShortWrite { requested: usize, written: usize },
    #[error("failed to close destination: {0}")]
    Close(#[source] io::Error),
}

/// Failure mounting the protected-storage partition.
#[derive(Debug, Error)]
pub enum MountError {
    #[error("protected storage root {0} is not accessible")]
    RootUnavailable(String),
    #[error("loader variant requires an explicit device path, none configured")]
    DeviceMissing,
    #[error("mount failed: {0}")]
    Io(#[from] io::Error),
}
