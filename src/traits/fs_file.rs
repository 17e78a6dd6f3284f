//! File stream operations of the driver.

use crate::{FsError, OpenFlags};

/// File stream operations of a FAT driver.
///
/// An open file is represented by the associated [`File`](FsFile::File)
/// resource. Releasing it consumes the value, so a resource cannot be closed
/// twice.
///
/// # Concurrency
///
/// Methods use `&self`; drivers keep their mutable state behind interior
/// mutability. No `Send + Sync` bound is required because the handle layer
/// is single-threaded and never shares a driver across threads.
///
/// # Object Safety
///
/// This trait is object-safe once `File` is named, e.g. `dyn FsFile<File = u32>`.
pub trait FsFile {
    /// Driver-level open file.
    type File;

    /// Open or create a file.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the file does not exist and `flags` don't create it
    /// - [`FsError::AlreadyExists`] if `flags.create_new` is set and the file exists
    /// - [`FsError::NotAFile`] if the path is a directory
    fn open_file(&self, path: &str, flags: OpenFlags) -> Result<Self::File, FsError>;

    /// Release an open file.
    fn close_file(&self, file: Self::File) -> Result<(), FsError>;

    /// Read into `buf` from the current position, advancing it.
    ///
    /// Returns the number of bytes transferred; fewer than `buf.len()` at end of file.
    ///
    /// # Errors
    ///
    /// - [`FsError::PermissionDenied`] if the file wasn't opened for reading
    fn read(&self, file: &mut Self::File, buf: &mut [u8]) -> Result<usize, FsError>;

    /// Write `data` at the current position, advancing it.
    ///
    /// # Errors
    ///
    /// - [`FsError::PermissionDenied`] if the file wasn't opened for writing
    fn write(&self, file: &mut Self::File, data: &[u8]) -> Result<usize, FsError>;

    /// Move the position to the absolute offset `pos`.
    fn seek(&self, file: &mut Self::File, pos: u64) -> Result<(), FsError>;

    /// Current position.
    fn tell(&self, file: &Self::File) -> Result<u64, FsError>;

    /// Current size in bytes.
    fn size(&self, file: &Self::File) -> Result<u64, FsError>;

    /// Returns `true` if the position is at or past the end of the file.
    fn is_eof(&self, file: &Self::File) -> Result<bool, FsError>;

    /// Flush cached data of the file to the medium.
    fn sync(&self, file: &mut Self::File) -> Result<(), FsError>;
}
