//! Error types for the handle layer and the driver capability interface.

use std::io;

/// Filesystem error type with contextual variants.
///
/// Every driver operation returns `Result<T, FsError>`. The boundary API of
/// [`FileSystem`](crate::FileSystem) and [`Handle`](crate::Handle) collapses
/// these into `false`, `0` or an empty handle; the `try_*` methods and the
/// `std::io` trait impls hand them back to the caller instead.
///
/// # Examples
///
/// ```rust
/// use fatfs_handle::FsError;
///
/// let err = FsError::NotFound { path: "/missing".into() };
/// assert_eq!(err.to_string(), "not found: /missing");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The handle does not hold the kind of resource the operation needs.
    #[error("{operation}: resource unavailable")]
    ResourceUnavailable {
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: String,
    },

    /// Path already exists when it shouldn't.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: String,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Path does not fit in the fixed path buffer.
    #[error("path too long: {len} > {max}")]
    PathTooLong {
        /// Length of the rejected path in bytes.
        len: usize,
        /// Capacity of the path buffer.
        max: usize,
    },

    /// Mode string is not one of the recognised POSIX modes.
    #[error("invalid open mode: {mode:?}")]
    InvalidMode {
        /// The rejected mode string.
        mode: String,
    },

    /// Expected a file but found something else.
    #[error("not a file: {path}")]
    NotAFile {
        /// The path that is not a file.
        path: String,
    },

    /// Expected a directory but found something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: String,
    },

    /// Directory is not empty when it should be.
    #[error("directory not empty: {path}")]
    DirectoryNotEmpty {
        /// The path to the non-empty directory.
        path: String,
    },

    /// Access mode of the open resource forbids the operation.
    #[error("{operation}: permission denied: {path}")]
    PermissionDenied {
        /// The path where permission was denied.
        path: String,
        /// The operation that was denied.
        operation: &'static str,
    },

    /// Seek target falls before the start of the file or overflows.
    #[error("seek out of range")]
    SeekOutOfRange,

    /// Driver resource is invalid or already released.
    #[error("invalid driver resource")]
    InvalidHandle,

    /// Value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File contents could not be deserialized.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Opaque failure reported by the underlying driver.
    #[error("driver error: {0}")]
    Driver(String),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl From<io::Error> for FsError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FsError::NotFound {
                path: String::new(),
            },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied {
                path: String::new(),
                operation: "io",
            },
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists {
                path: String::new(),
                operation: "io",
            },
            _ => FsError::Io {
                operation: "io",
                path: String::new(),
                source: error,
            },
        }
    }
}

impl From<FsError> for io::Error {
    fn from(error: FsError) -> Self {
        let kind = match &error {
            FsError::Io { source, .. } => source.kind(),
            FsError::NotFound { .. } => io::ErrorKind::NotFound,
            FsError::AlreadyExists { .. } => io::ErrorKind::AlreadyExists,
            FsError::PermissionDenied { .. } => io::ErrorKind::PermissionDenied,
            FsError::PathTooLong { .. }
            | FsError::InvalidMode { .. }
            | FsError::SeekOutOfRange => io::ErrorKind::InvalidInput,
            FsError::Deserialization(_) => io::ErrorKind::InvalidData,
            FsError::ResourceUnavailable { .. } | FsError::InvalidHandle => {
                io::ErrorKind::Unsupported
            }
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = FsError::NotFound {
            path: "/missing".into(),
        };
        assert_eq!(err.to_string(), "not found: /missing");
    }

    #[test]
    fn already_exists_display() {
        let err = FsError::AlreadyExists {
            path: "/exists".into(),
            operation: "open",
        };
        assert_eq!(err.to_string(), "open: already exists: /exists");
    }

    #[test]
    fn path_too_long_display() {
        let err = FsError::PathTooLong { len: 300, max: 256 };
        assert_eq!(err.to_string(), "path too long: 300 > 256");
    }

    #[test]
    fn invalid_mode_display() {
        let err = FsError::InvalidMode { mode: "rw".into() };
        assert_eq!(err.to_string(), "invalid open mode: \"rw\"");
    }

    #[test]
    fn from_io_not_found() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        assert!(matches!(FsError::from(io_err), FsError::NotFound { .. }));
    }

    #[test]
    fn from_io_already_exists() {
        let io_err = io::Error::new(io::ErrorKind::AlreadyExists, "test");
        assert!(matches!(FsError::from(io_err), FsError::AlreadyExists { .. }));
    }

    #[test]
    fn from_io_other() {
        let io_err = io::Error::other("test");
        assert!(matches!(FsError::from(io_err), FsError::Io { .. }));
    }

    #[test]
    fn into_io_keeps_kind() {
        let err: io::Error = FsError::NotFound { path: "/a".into() }.into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err: io::Error = FsError::ResourceUnavailable { operation: "read" }.into();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);

        let err: io::Error = FsError::Driver("disk".into()).into();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }
}
