//! Fixed-capacity path buffer.
//!
//! FAT long file names are limited to 255 characters; a handle stores the
//! path it was opened with in a buffer of [`MAX_PATH_LEN`] bytes. Every
//! mutation is bounds-checked and reports [`FsError::PathTooLong`] instead of
//! truncating.

use std::fmt;

use crate::FsError;

/// Capacity of a path buffer in bytes.
pub const MAX_PATH_LEN: usize = 256;

/// Path separator.
pub const SEPARATOR: char = '/';

/// The root path.
pub const ROOT: &str = "/";

/// Owned, bounds-checked path of at most [`MAX_PATH_LEN`] bytes.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct FixedPath {
    buf: String,
}

impl FixedPath {
    /// Copy `path` into a new buffer.
    ///
    /// # Errors
    ///
    /// - [`FsError::PathTooLong`] if `path` exceeds [`MAX_PATH_LEN`]
    pub fn new(path: &str) -> Result<Self, FsError> {
        check_len(path.len())?;
        let mut buf = String::with_capacity(MAX_PATH_LEN);
        buf.push_str(path);
        Ok(Self { buf })
    }

    /// The root path `/`.
    pub fn root() -> Self {
        Self {
            buf: ROOT.to_owned(),
        }
    }

    /// View as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` for the empty path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns `true` for the root path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.buf == ROOT
    }

    /// Append `tail` verbatim.
    ///
    /// On error the buffer is left unchanged.
    pub fn push_str(&mut self, tail: &str) -> Result<(), FsError> {
        check_len(self.buf.len() + tail.len())?;
        self.buf.push_str(tail);
        Ok(())
    }

    /// Path of the child `name` inside this directory.
    ///
    /// A separator is inserted unless the path is empty or already ends
    /// with one.
    ///
    /// ```rust
    /// use fatfs_handle::FixedPath;
    ///
    /// assert_eq!(FixedPath::root().join("a").unwrap().as_str(), "/a");
    /// assert_eq!(FixedPath::new("/a").unwrap().join("b").unwrap().as_str(), "/a/b");
    /// ```
    pub fn join(&self, name: &str) -> Result<Self, FsError> {
        let mut child = self.clone();
        if !child.buf.is_empty() && !child.buf.ends_with(SEPARATOR) {
            child.push_str("/")?;
        }
        child.push_str(name)?;
        Ok(child)
    }
}

fn check_len(len: usize) -> Result<(), FsError> {
    if len > MAX_PATH_LEN {
        return Err(FsError::PathTooLong {
            len,
            max: MAX_PATH_LEN,
        });
    }
    Ok(())
}

impl AsRef<str> for FixedPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for FixedPath {
    fn eq(&self, other: &str) -> bool {
        self.buf == other
    }
}

impl PartialEq<&str> for FixedPath {
    fn eq(&self, other: &&str) -> bool {
        self.buf == *other
    }
}

impl TryFrom<&str> for FixedPath {
    type Error = FsError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl fmt::Display for FixedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

impl fmt::Debug for FixedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.buf, f)
    }
}
