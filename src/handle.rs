//! # Handle
//!
//! A [`Handle`] is either an open file, an open directory, or empty. It owns
//! at most one driver resource and releases it exactly once, on
//! [`close`](Handle::close) or when dropped.
//!
//! ## Boundary Convention
//!
//! The stream-style methods never fail loudly: reads and writes on the wrong
//! variant transfer 0 bytes, seeks return `false`, positions return `None`
//! and directory iteration returns an empty handle. Driver errors collapse the
//! same way and are logged at `debug` level. The `try_*` methods and the
//! [`std::io`] impls report the underlying [`FsError`] instead.
//!
//! ## Directory Iteration
//!
//! [`open_next_file`](Handle::open_next_file) walks a directory one entry at
//! a time. Once the end is reached the handle stays exhausted until
//! [`rewind_directory`](Handle::rewind_directory):
//!
//! ```rust
//! use fatfs_handle::{FileSystem, MemoryDriver, OpenFlags};
//!
//! let fs = FileSystem::new(MemoryDriver::new());
//! assert!(fs.mkdir("/logs"));
//! drop(fs.open_mode("/logs/boot.txt", "w"));
//!
//! let mut dir = fs.open("/logs", OpenFlags::READ);
//! let child = dir.open_next_file(OpenFlags::READ);
//! assert_eq!(child.name(), "/logs/boot.txt");
//! assert!(!dir.open_next_file(OpenFlags::READ).is_open());
//!
//! dir.rewind_directory();
//! assert!(dir.open_next_file(OpenFlags::READ).is_open());
//! ```

use std::fmt;
use std::io;

use crate::{DirEntry, Driver, FileType, FixedPath, FsError, OpenFlags, SeekMode};

/// Dual-mode handle over a driver file or directory.
///
/// Handles borrow the driver they were opened from, so any number of them
/// can be alive while a directory tree is walked.
///
/// The inherent `read`, `write`, `flush` and `seek` methods shadow the
/// [`std::io`] trait methods of the same name; call those through the trait
/// (`io::Read::read(&mut handle, buf)`) or via adapters such as
/// `read_to_end` when the error matters.
pub struct Handle<'a, D: Driver> {
    resource: Resource<'a, D>,
}

enum Resource<'a, D: Driver> {
    Empty,
    File {
        driver: &'a D,
        file: D::File,
        path: FixedPath,
    },
    Directory {
        driver: &'a D,
        dir: D::Dir,
        path: FixedPath,
        cursor: Option<Cursor>,
    },
}

/// Iteration state of a directory handle, allocated on first use.
#[derive(Debug, Default)]
struct Cursor {
    exhausted: bool,
    last: Option<DirEntry>,
}

fn collapse<T>(operation: &str, result: Result<T, FsError>, fallback: T) -> T {
    result.unwrap_or_else(|e| {
        log::debug!("{operation}: {e}");
        fallback
    })
}

impl<'a, D: Driver> Handle<'a, D> {
    /// An empty handle that owns nothing.
    pub fn empty() -> Self {
        Self {
            resource: Resource::Empty,
        }
    }

    /// Wrap an open driver file opened at `name`.
    ///
    /// # Errors
    ///
    /// - [`FsError::PathTooLong`] if `name` does not fit the path buffer;
    ///   `file` is closed before returning
    pub fn from_file(driver: &'a D, file: D::File, name: &str) -> Result<Self, FsError> {
        match FixedPath::new(name) {
            Ok(path) => Ok(Self::with_file(driver, file, path)),
            Err(e) => {
                if let Err(close_err) = driver.close_file(file) {
                    log::warn!("from_file: closing {name} failed: {close_err}");
                }
                Err(e)
            }
        }
    }

    /// Wrap an open driver directory cursor opened at `name`.
    ///
    /// # Errors
    ///
    /// - [`FsError::PathTooLong`] if `name` does not fit the path buffer;
    ///   `dir` is closed before returning
    pub fn from_dir(driver: &'a D, dir: D::Dir, name: &str) -> Result<Self, FsError> {
        match FixedPath::new(name) {
            Ok(path) => Ok(Self::with_dir(driver, dir, path)),
            Err(e) => {
                if let Err(close_err) = driver.close_dir(dir) {
                    log::warn!("from_dir: closing {name} failed: {close_err}");
                }
                Err(e)
            }
        }
    }

    pub(crate) fn with_file(driver: &'a D, file: D::File, path: FixedPath) -> Self {
        Self {
            resource: Resource::File { driver, file, path },
        }
    }

    pub(crate) fn with_dir(driver: &'a D, dir: D::Dir, path: FixedPath) -> Self {
        Self {
            resource: Resource::Directory {
                driver,
                dir,
                path,
                cursor: None,
            },
        }
    }

    /// Returns `true` unless the handle is empty.
    #[inline]
    pub fn is_open(&self) -> bool {
        !matches!(self.resource, Resource::Empty)
    }

    /// Which kind of resource the handle holds, `None` when empty.
    pub fn kind(&self) -> Option<FileType> {
        match self.resource {
            Resource::Empty => None,
            Resource::File { .. } => Some(FileType::File),
            Resource::Directory { .. } => Some(FileType::Directory),
        }
    }

    /// Path the handle was opened with; empty for an empty handle.
    pub fn name(&self) -> &str {
        match &self.resource {
            Resource::Empty => "",
            Resource::File { path, .. } | Resource::Directory { path, .. } => path.as_str(),
        }
    }

    /// Returns `true` for directory handles.
    ///
    /// A file handle asks the driver whether its stored path is a directory,
    /// which covers a path that was replaced by a directory after opening.
    pub fn is_directory(&self) -> bool {
        match &self.resource {
            Resource::Directory { .. } => true,
            Resource::File { driver, path, .. } => driver
                .stat(path.as_str())
                .map(|meta| meta.is_dir())
                .unwrap_or(false),
            Resource::Empty => false,
        }
    }

    fn file(&self) -> Option<(&'a D, &D::File)> {
        match &self.resource {
            Resource::File { driver, file, .. } => Some((*driver, file)),
            _ => None,
        }
    }

    fn file_mut(&mut self, operation: &'static str) -> Result<(&'a D, &mut D::File), FsError> {
        match &mut self.resource {
            Resource::File { driver, file, .. } => Ok((*driver, file)),
            _ => Err(FsError::ResourceUnavailable { operation }),
        }
    }

    /// Read into `buf`, returning the number of bytes transferred.
    pub fn try_read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        let (driver, file) = self.file_mut("read")?;
        driver.read(file, buf)
    }

    /// Read into `buf`; 0 at end of file, on a non-file handle or on error.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        collapse("read", self.try_read(buf), 0)
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        (self.read(&mut byte) == 1).then_some(byte[0])
    }

    /// Read a single byte without consuming it.
    pub fn peek(&mut self) -> Option<u8> {
        let byte = self.read_byte()?;
        if let Ok((driver, file)) = self.file_mut("peek") {
            let rewound = driver
                .tell(file)
                .and_then(|pos| driver.seek(file, pos.saturating_sub(1)));
            collapse("peek", rewound, ());
        }
        Some(byte)
    }

    /// Write `data`, returning the number of bytes written.
    pub fn try_write(&mut self, data: &[u8]) -> Result<usize, FsError> {
        let (driver, file) = self.file_mut("write")?;
        driver.write(file, data)
    }

    /// Write `data`; 0 on a non-file handle or on error.
    pub fn write(&mut self, data: &[u8]) -> usize {
        collapse("write", self.try_write(data), 0)
    }

    /// Write a single byte.
    pub fn write_byte(&mut self, byte: u8) -> usize {
        self.write(&[byte])
    }

    /// Returns `true` if a file handle has bytes left to read.
    pub fn available(&self) -> bool {
        self.file()
            .map(|(driver, file)| collapse("available", driver.is_eof(file), true))
            .is_some_and(|eof| !eof)
    }

    /// Synchronise the file to the medium.
    pub fn try_flush(&mut self) -> Result<(), FsError> {
        let (driver, file) = self.file_mut("flush")?;
        driver.sync(file)
    }

    /// Synchronise the file to the medium; no-op for other handles.
    pub fn flush(&mut self) {
        if self.file().is_some() {
            collapse("flush", self.try_flush(), ());
        }
    }

    /// Move to `offset` relative to `mode`, returning the new position.
    ///
    /// `SeekMode::End` counts backwards: the target is `size - offset`.
    ///
    /// # Errors
    ///
    /// - [`FsError::ResourceUnavailable`] if this is not a file handle
    /// - [`FsError::SeekOutOfRange`] if the target is negative or overflows
    pub fn try_seek_from(&mut self, offset: u64, mode: SeekMode) -> Result<u64, FsError> {
        let (driver, file) = self.file_mut("seek")?;
        let target = match mode {
            SeekMode::Start => Some(offset),
            SeekMode::Current => driver.tell(file)?.checked_add(offset),
            SeekMode::End => driver.size(file)?.checked_sub(offset),
        }
        .ok_or(FsError::SeekOutOfRange)?;
        driver.seek(file, target)?;
        driver.tell(file)
    }

    /// Move to the absolute position `pos`.
    pub fn seek(&mut self, pos: u64) -> bool {
        self.seek_from(pos, SeekMode::Start)
    }

    /// Move to `offset` relative to `mode`; `false` on failure.
    pub fn seek_from(&mut self, offset: u64, mode: SeekMode) -> bool {
        if self.file().is_none() {
            return false;
        }
        collapse("seek", self.try_seek_from(offset, mode).map(|_| true), false)
    }

    /// Current position of a file handle.
    pub fn position(&self) -> Option<u64> {
        let (driver, file) = self.file()?;
        driver.tell(file).ok()
    }

    /// Size of a file handle in bytes.
    pub fn size(&self) -> Option<u64> {
        let (driver, file) = self.file()?;
        driver.size(file).ok()
    }

    /// Release the driver resource and become empty.
    ///
    /// # Errors
    ///
    /// Whatever the driver reports while closing. The handle is empty
    /// afterwards either way.
    pub fn try_close(&mut self) -> Result<(), FsError> {
        match std::mem::replace(&mut self.resource, Resource::Empty) {
            Resource::Empty => Ok(()),
            Resource::File { driver, file, .. } => driver.close_file(file),
            Resource::Directory { driver, dir, .. } => driver.close_dir(dir),
        }
    }

    /// Release the driver resource and become empty. Closing twice is a no-op.
    pub fn close(&mut self) {
        let (path, result) = match std::mem::replace(&mut self.resource, Resource::Empty) {
            Resource::Empty => return,
            Resource::File { driver, file, path } => (path, driver.close_file(file)),
            Resource::Directory { driver, dir, path, .. } => (path, driver.close_dir(dir)),
        };
        if let Err(e) = result {
            log::warn!("close {path}: {e}");
        }
    }

    /// Open the next entry of a directory handle.
    ///
    /// Returns `Ok(None)` once the directory is exhausted, and keeps doing so
    /// until [`rewind_directory`](Self::rewind_directory). Subdirectories are
    /// opened as directory handles; everything else as a file with `flags`.
    ///
    /// # Errors
    ///
    /// - [`FsError::ResourceUnavailable`] if this is not a directory handle
    /// - [`FsError::PathTooLong`] if the child path does not fit
    /// - driver errors while reading the entry (the handle becomes exhausted)
    ///   or opening the child (iteration can continue)
    pub fn try_open_next_file(&mut self, flags: OpenFlags) -> Result<Option<Handle<'a, D>>, FsError> {
        let Resource::Directory {
            driver,
            dir,
            path,
            cursor,
        } = &mut self.resource
        else {
            return Err(FsError::ResourceUnavailable {
                operation: "open_next_file",
            });
        };
        let driver = *driver;
        let cursor = cursor.get_or_insert_with(Cursor::default);
        if cursor.exhausted {
            return Ok(None);
        }

        let entry = loop {
            let next = driver.read_dir_entry(dir).inspect_err(|_| {
                cursor.exhausted = true;
            })?;
            match next {
                Some(entry) if entry.is_placeholder() => continue,
                Some(entry) if !entry.name.is_empty() => break entry,
                _ => {
                    cursor.exhausted = true;
                    cursor.last = None;
                    return Ok(None);
                }
            }
        };

        let child = path.join(&entry.name)?;
        let is_dir = entry.is_dir();
        cursor.last = Some(entry);
        let handle = if is_dir {
            Handle::with_dir(driver, driver.open_dir(child.as_str())?, child)
        } else {
            Handle::with_file(driver, driver.open_file(child.as_str(), flags)?, child)
        };
        Ok(Some(handle))
    }

    /// Open the next entry of a directory handle; empty when exhausted or
    /// when the entry cannot be opened.
    pub fn open_next_file(&mut self, flags: OpenFlags) -> Handle<'a, D> {
        if !matches!(self.resource, Resource::Directory { .. }) {
            return Handle::empty();
        }
        collapse("open_next_file", self.try_open_next_file(flags), None).unwrap_or_default()
    }

    /// The entry most recently returned by directory iteration.
    pub fn current_entry(&self) -> Option<&DirEntry> {
        match &self.resource {
            Resource::Directory {
                cursor: Some(cursor),
                ..
            } => cursor.last.as_ref(),
            _ => None,
        }
    }

    /// Restart directory iteration from the first entry.
    pub fn rewind_directory(&mut self) {
        let Resource::Directory {
            driver,
            dir,
            cursor,
            ..
        } = &mut self.resource
        else {
            return;
        };
        if collapse("rewind_directory", driver.rewind_dir(dir).map(|_| true), false) {
            *cursor = None;
        }
    }
}

impl<D: Driver> Default for Handle<'_, D> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<D: Driver> Drop for Handle<'_, D> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<D: Driver> fmt::Debug for Handle<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.resource {
            Resource::Empty => "Empty",
            Resource::File { .. } => "File",
            Resource::Directory { .. } => "Directory",
        };
        f.debug_struct("Handle")
            .field("kind", &kind)
            .field("path", &self.name())
            .finish()
    }
}

impl<D: Driver> io::Read for Handle<'_, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.try_read(buf)?)
    }
}

impl<D: Driver> io::Write for Handle<'_, D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.try_write(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.try_flush()?)
    }
}

impl<D: Driver> io::Seek for Handle<'_, D> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (driver, file) = self.file_mut("seek")?;
        let target = match pos {
            io::SeekFrom::Start(n) => Some(n),
            io::SeekFrom::Current(n) => driver.tell(file)?.checked_add_signed(n),
            io::SeekFrom::End(n) => driver.size(file)?.checked_add_signed(n),
        }
        .ok_or(FsError::SeekOutOfRange)?;
        driver.seek(file, target)?;
        Ok(driver.tell(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FsDir, FsFile, FsPath, MemoryDriver};
    use std::io::{Read, Seek, SeekFrom, Write};

    fn file_handle<'a>(driver: &'a MemoryDriver, path: &str, data: &[u8]) -> Handle<'a, MemoryDriver> {
        let file = driver.open_file(path, OpenFlags::WRITE).unwrap();
        let mut handle = Handle::from_file(driver, file, path).unwrap();
        assert_eq!(handle.write(data), data.len());
        assert!(handle.seek(0));
        handle
    }

    #[test]
    fn empty_handle_is_inert() {
        let mut handle: Handle<'_, MemoryDriver> = Handle::default();
        let mut buf = [0u8; 4];
        assert!(!handle.is_open());
        assert_eq!(handle.kind(), None);
        assert_eq!(handle.read(&mut buf), 0);
        assert_eq!(handle.read_byte(), None);
        assert_eq!(handle.peek(), None);
        assert_eq!(handle.write(b"x"), 0);
        assert!(!handle.available());
        assert!(!handle.seek(0));
        assert_eq!(handle.position(), None);
        assert_eq!(handle.size(), None);
        assert!(!handle.is_directory());
        assert!(!handle.open_next_file(OpenFlags::READ).is_open());
        handle.flush();
        handle.rewind_directory();
        handle.close();
        assert_eq!(handle.name(), "");
    }

    #[test]
    fn directory_handle_refuses_stream_ops() {
        let driver = MemoryDriver::new();
        let dir = driver.open_dir("/").unwrap();
        let mut handle = Handle::from_dir(&driver, dir, "/").unwrap();
        let mut buf = [0u8; 2];
        assert!(handle.is_directory());
        assert_eq!(handle.read(&mut buf), 0);
        assert_eq!(handle.write(b"ab"), 0);
        assert_eq!(handle.position(), None);
        assert!(!handle.available());
        assert!(matches!(
            handle.try_read(&mut buf),
            Err(FsError::ResourceUnavailable { operation: "read" })
        ));
    }

    #[test]
    fn close_is_idempotent() {
        let driver = MemoryDriver::new();
        let mut handle = file_handle(&driver, "/a", b"x");
        assert_eq!(driver.open_resources(), 1);
        handle.close();
        assert!(!handle.is_open());
        handle.close();
        assert!(handle.try_close().is_ok());
        drop(handle);
        assert_eq!(driver.open_resources(), 0);
    }

    #[test]
    fn drop_releases_resource() {
        let driver = MemoryDriver::new();
        {
            let _handle = file_handle(&driver, "/a", b"x");
            let dir = driver.open_dir("/").unwrap();
            let _dir = Handle::from_dir(&driver, dir, "/").unwrap();
            assert_eq!(driver.open_resources(), 2);
        }
        assert_eq!(driver.open_resources(), 0);
    }

    #[test]
    fn over_long_name_closes_resource() {
        let driver = MemoryDriver::new();
        let file = driver.open_file("/a", OpenFlags::WRITE).unwrap();
        let name = "n".repeat(crate::MAX_PATH_LEN + 1);
        let err = Handle::from_file(&driver, file, &name).unwrap_err();
        assert!(matches!(err, FsError::PathTooLong { .. }));
        assert_eq!(driver.open_resources(), 0);
    }

    #[test]
    fn peek_does_not_advance() {
        let driver = MemoryDriver::new();
        let mut handle = file_handle(&driver, "/p", b"xy");
        assert_eq!(handle.peek(), Some(b'x'));
        assert_eq!(handle.position(), Some(0));
        assert_eq!(handle.read_byte(), Some(b'x'));
        assert_eq!(handle.peek(), Some(b'y'));
        assert_eq!(handle.read_byte(), Some(b'y'));
        assert_eq!(handle.peek(), None);
        assert!(!handle.available());
    }

    #[test]
    fn seek_modes() {
        let driver = MemoryDriver::new();
        let mut handle = file_handle(&driver, "/s", b"0123456789");
        assert!(handle.seek_from(3, SeekMode::End));
        assert_eq!(handle.position(), Some(7));
        assert!(handle.seek(2));
        assert!(handle.seek_from(4, SeekMode::Current));
        assert_eq!(handle.position(), Some(6));
        assert_eq!(handle.read_byte(), Some(b'6'));
        assert!(!handle.seek_from(11, SeekMode::End));
        assert_eq!(handle.position(), Some(7));
    }

    #[test]
    fn huge_seek_fails_without_growing_file() {
        let driver = MemoryDriver::new();
        let mut handle = file_handle(&driver, "/big", b"abc");
        assert!(!handle.seek(u64::MAX / 2));
        assert!(!handle.seek_from(u64::MAX / 2, SeekMode::Current));
        assert_eq!(handle.size(), Some(3));
        assert_eq!(handle.position(), Some(0));
        assert!(matches!(
            handle.try_seek_from(u64::MAX / 2, SeekMode::Start),
            Err(FsError::SeekOutOfRange)
        ));
    }

    #[test]
    fn io_traits_round_trip() {
        let driver = MemoryDriver::new();
        let file = driver.open_file("/io", OpenFlags::WRITE).unwrap();
        let mut handle = Handle::from_file(&driver, file, "/io").unwrap();
        handle.write_all(b"hello world").unwrap();
        Write::flush(&mut handle).unwrap();
        assert_eq!(Seek::seek(&mut handle, SeekFrom::End(-5)).unwrap(), 6);
        let mut tail = String::new();
        handle.read_to_string(&mut tail).unwrap();
        assert_eq!(tail, "world");
        assert!(Seek::seek(&mut handle, SeekFrom::Current(-20)).is_err());
    }

    #[test]
    fn io_errors_carry_kind() {
        let driver = MemoryDriver::new();
        let dir = driver.open_dir("/").unwrap();
        let mut handle = Handle::from_dir(&driver, dir, "/").unwrap();
        let err = Read::read(&mut handle, &mut [0u8; 1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn write_to_read_only_handle_returns_zero() {
        let driver = MemoryDriver::new();
        drop(file_handle(&driver, "/r", b"abc"));
        let file = driver.open_file("/r", OpenFlags::READ).unwrap();
        let mut handle = Handle::from_file(&driver, file, "/r").unwrap();
        assert_eq!(handle.write(b"zz"), 0);
        assert!(matches!(
            handle.try_write(b"zz"),
            Err(FsError::PermissionDenied { .. })
        ));
        assert_eq!(driver.contents("/r").unwrap(), b"abc");
    }

    #[test]
    fn file_handle_is_directory_asks_driver() {
        let driver = MemoryDriver::new();
        let handle = file_handle(&driver, "/f", b"");
        assert!(!handle.is_directory());
        assert!(driver.stat("/f").unwrap().is_file());
    }

    #[test]
    fn iteration_is_sticky_until_rewind() {
        let driver = MemoryDriver::new();
        drop(file_handle(&driver, "/one", b"1"));
        let dir = driver.open_dir("/").unwrap();
        let mut handle = Handle::from_dir(&driver, dir, "/").unwrap();

        let first = handle.open_next_file(OpenFlags::READ);
        assert_eq!(first.name(), "/one");
        assert_eq!(handle.current_entry().map(|e| e.name.as_str()), Some("one"));
        drop(first);

        // A file created after exhaustion is not seen until rewind.
        assert!(!handle.open_next_file(OpenFlags::READ).is_open());
        drop(file_handle(&driver, "/two", b"2"));
        assert!(!handle.open_next_file(OpenFlags::READ).is_open());
        assert!(handle.current_entry().is_none());

        handle.rewind_directory();
        assert_eq!(handle.open_next_file(OpenFlags::READ).name(), "/one");
        assert_eq!(handle.open_next_file(OpenFlags::READ).name(), "/two");
    }

    #[test]
    fn iteration_on_file_handle_is_unavailable() {
        let driver = MemoryDriver::new();
        let mut handle = file_handle(&driver, "/f", b"");
        assert!(matches!(
            handle.try_open_next_file(OpenFlags::READ),
            Err(FsError::ResourceUnavailable { .. })
        ));
    }

    #[test]
    fn debug_shows_kind_and_path() {
        let driver = MemoryDriver::new();
        let handle = file_handle(&driver, "/dbg", b"");
        assert_eq!(
            format!("{handle:?}"),
            r#"Handle { kind: "File", path: "/dbg" }"#
        );
    }
}
