use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur in the Infinity filesystem.
///
/// Construction errors (`InvalidKey`, `MissingArchive`) abort building the
/// filesystem. Everything else is reported per operation and leaves the
/// filesystem usable.
#[derive(Error, Debug)]
pub enum FsError {
    /// An I/O error from the underlying archive or index file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No resource or synthetic directory has this name.
    #[error("File not found: {0}")]
    NotFound(String),

    /// A mutating operation was attempted on the read-only filesystem.
    #[error("Permission denied: {0} is not supported on a read-only filesystem")]
    PermissionDenied(&'static str),

    /// The KEY file could not be read or is malformed.
    #[error("Invalid KEY file {path}: {source}")]
    InvalidKey {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A BIF archive header could not be parsed.
    #[error("Invalid BIF file {path}: {reason}")]
    InvalidArchive { path: String, reason: String },

    /// A KEY resource entry points at an archive index the KEY does not list.
    #[error("Resource {resource} references archive #{index}, which is not in the KEY file")]
    MissingArchive { resource: String, index: u32 },

    /// The archive was parsed but did not describe this resource.
    #[error("File metadata not loaded correctly for {0}")]
    Unresolved(String),

    /// A release without a matching acquire.
    #[error("Archive {0} is not open")]
    NotAcquired(String),

    /// I/O on a file after it was closed.
    #[error("File {0} is already closed")]
    Closed(String),

    /// A filter pattern failed to compile.
    #[error("Invalid filter pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The idle cache needs room for at least one archive.
    #[error("Handle cache capacity must be non-zero")]
    InvalidCapacity,
}

impl FsError {
    /// Whether this is the "does not exist" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            FsError::NotFound(_) => true,
            FsError::Io(err) => err.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Whether this error was caused by a rejected mutating operation.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, FsError::PermissionDenied(_))
    }
}

/// Allows `FsError` to surface through the `std::io` traits.
impl From<FsError> for io::Error {
    fn from(error: FsError) -> Self {
        let kind = match &error {
            FsError::Io(err) => err.kind(),
            FsError::NotFound(_) => io::ErrorKind::NotFound,
            FsError::PermissionDenied(_) => io::ErrorKind::PermissionDenied,
            FsError::InvalidKey { .. }
            | FsError::InvalidArchive { .. }
            | FsError::MissingArchive { .. }
            | FsError::Unresolved(_) => io::ErrorKind::InvalidData,
            FsError::InvalidPattern { .. } | FsError::InvalidCapacity => {
                io::ErrorKind::InvalidInput
            }
            FsError::NotAcquired(_) | FsError::Closed(_) => io::ErrorKind::Other,
        };
        match error {
            FsError::Io(err) => err,
            other => io::Error::new(kind, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FsError>;
