//! Path-addressed operations of the driver.

use crate::{FsError, Metadata};

/// Path-addressed operations of a FAT driver.
///
/// These work on names alone and need no open resource.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsPath`.
pub trait FsPath {
    /// Look up an entry by path.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    fn stat(&self, path: &str) -> Result<Metadata, FsError>;

    /// Create a single directory. The parent must exist.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the parent does not exist
    /// - [`FsError::AlreadyExists`] if the path already exists
    fn create_dir(&self, path: &str) -> Result<(), FsError>;

    /// Rename or move a file or directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `from` does not exist
    /// - [`FsError::AlreadyExists`] if `to` already exists
    fn rename(&self, from: &str, to: &str) -> Result<(), FsError>;

    /// Remove a file or an empty directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::DirectoryNotEmpty`] if the directory still has entries
    fn unlink(&self, path: &str) -> Result<(), FsError>;
}
