//! Filesystem entry point: opening handles and path-level operations.

use crate::mode;
use crate::{DirEntry, Driver, FixedPath, FsError, Handle, OpenFlags};

/// Pattern that matches every directory entry.
const MATCH_ALL: &str = "*";

/// Entry point over a FAT driver.
///
/// Boolean and [`Handle`] results follow the boundary convention: failures
/// come back as `false` or an empty handle and are logged at `debug` level.
/// [`try_open`](Self::try_open) and [`try_rmdir`](Self::try_rmdir) report
/// the error instead.
///
/// # Example
///
/// ```rust
/// use fatfs_handle::{FileSystem, MemoryDriver};
///
/// let fs = FileSystem::new(MemoryDriver::new());
/// let mut log = fs.open_mode("/log.txt", "w");
/// assert_eq!(log.write(b"abc"), 3);
/// log.close();
///
/// let mut log = fs.open_mode("/log.txt", "r");
/// let mut buf = [0u8; 3];
/// assert_eq!(log.read(&mut buf), 3);
/// assert_eq!(&buf, b"abc");
/// ```
#[derive(Debug, Default)]
pub struct FileSystem<D> {
    driver: D,
}

impl<D: Driver> FileSystem<D> {
    /// Wrap a driver.
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// The wrapped driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Unwrap the driver. All handles must have been dropped.
    pub fn into_inner(self) -> D {
        self.driver
    }

    /// Open `path` as a directory or file.
    ///
    /// The root and existing directories open as directory handles. Existing
    /// files open with `flags`; a missing path is opened as a file, which
    /// creates it when `flags` allow.
    ///
    /// # Errors
    ///
    /// - [`FsError::PathTooLong`] if `path` exceeds [`MAX_PATH_LEN`](crate::MAX_PATH_LEN)
    /// - whatever the driver reports for `stat`, `open_dir` or `open_file`
    pub fn try_open(&self, path: &str, flags: OpenFlags) -> Result<Handle<'_, D>, FsError> {
        let fixed = FixedPath::new(path)?;
        if fixed.is_root() {
            let dir = self.driver.open_dir(fixed.as_str())?;
            return Ok(Handle::with_dir(&self.driver, dir, fixed));
        }
        match self.driver.stat(fixed.as_str()) {
            Ok(meta) if meta.is_dir() => {
                let dir = self.driver.open_dir(fixed.as_str())?;
                Ok(Handle::with_dir(&self.driver, dir, fixed))
            }
            Ok(_) | Err(FsError::NotFound { .. }) => {
                let file = self.driver.open_file(fixed.as_str(), flags)?;
                Ok(Handle::with_file(&self.driver, file, fixed))
            }
            Err(e) => Err(e),
        }
    }

    /// Open `path`; an empty handle on failure.
    pub fn open(&self, path: &str, flags: OpenFlags) -> Handle<'_, D> {
        self.try_open(path, flags).unwrap_or_else(|e| {
            log::debug!("open {path}: {e}");
            Handle::empty()
        })
    }

    /// Open `path` with a POSIX mode string such as `"r"` or `"a+"`.
    ///
    /// An unrecognised mode yields an empty handle.
    pub fn open_mode(&self, path: &str, mode: &str) -> Handle<'_, D> {
        match mode::translate(mode) {
            Some(flags) => self.open(path, flags),
            None => {
                log::debug!("open {path}: invalid mode {mode:?}");
                Handle::empty()
            }
        }
    }

    /// Returns `true` if `path` exists.
    pub fn exists(&self, path: &str) -> bool {
        self.driver.stat(path).is_ok()
    }

    /// Create a single directory level.
    pub fn mkdir(&self, path: &str) -> bool {
        report("mkdir", path, self.driver.create_dir(path))
    }

    /// Rename or move `from` to `to`.
    pub fn rename(&self, from: &str, to: &str) -> bool {
        report("rename", from, self.driver.rename(from, to))
    }

    /// Remove a single file or empty directory.
    pub fn remove(&self, path: &str) -> bool {
        report("remove", path, self.driver.unlink(path))
    }

    /// Remove a directory and everything below it.
    ///
    /// Children that cannot be removed are skipped; the result reflects the
    /// removal of `path` itself. A file path is simply removed.
    pub fn rmdir(&self, path: &str) -> bool {
        report("rmdir", path, self.remove_tree(path, false))
    }

    /// Remove a directory and everything below it, stopping at the first
    /// failure.
    ///
    /// # Errors
    ///
    /// - [`FsError::PathTooLong`] if a child path does not fit
    /// - the first error the driver reports while enumerating or removing
    pub fn try_rmdir(&self, path: &str) -> Result<(), FsError> {
        self.remove_tree(path, true)
    }

    fn remove_tree(&self, path: &str, strict: bool) -> Result<(), FsError> {
        let base = FixedPath::new(path)?;
        let first = match self.driver.find_first(base.as_str(), MATCH_ALL) {
            Ok((dir, first)) => Some((Enumeration::new(&self.driver, dir), first)),
            Err(FsError::NotADirectory { .. }) => None,
            Err(e) if strict => return Err(e),
            Err(e) => {
                log::debug!("rmdir {path}: enumeration failed: {e}");
                None
            }
        };

        if let Some((mut enumeration, mut entry)) = first {
            while let Some(current) = entry {
                let child = base.join(&current.name);
                let removed = child.and_then(|child| {
                    if current.is_dir() {
                        self.remove_tree(child.as_str(), strict)
                    } else {
                        self.driver.unlink(child.as_str())
                    }
                });
                match removed {
                    Err(e) if strict => return Err(e),
                    Err(e) => log::debug!("rmdir {path}: skipping {}: {e}", current.name),
                    Ok(()) => {}
                }
                entry = match enumeration.next() {
                    Ok(next) => next,
                    Err(e) if strict => return Err(e),
                    Err(e) => {
                        log::debug!("rmdir {path}: enumeration failed: {e}");
                        None
                    }
                };
            }
            match enumeration.close() {
                Err(e) if strict => return Err(e),
                Err(e) => log::debug!("rmdir {path}: closing enumeration failed: {e}"),
                Ok(()) => {}
            }
        }

        self.driver.unlink(base.as_str())
    }
}

fn report(operation: &str, path: &str, result: Result<(), FsError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::debug!("{operation} {path}: {e}");
            false
        }
    }
}

/// Open enumeration cursor that is closed when dropped.
struct Enumeration<'a, D: Driver> {
    driver: &'a D,
    dir: Option<D::Dir>,
}

impl<'a, D: Driver> Enumeration<'a, D> {
    fn new(driver: &'a D, dir: D::Dir) -> Self {
        Self {
            driver,
            dir: Some(dir),
        }
    }

    fn next(&mut self) -> Result<Option<DirEntry>, FsError> {
        match self.dir.as_mut() {
            Some(dir) => self.driver.find_next(dir, MATCH_ALL),
            None => Ok(None),
        }
    }

    fn close(mut self) -> Result<(), FsError> {
        match self.dir.take() {
            Some(dir) => self.driver.close_dir(dir),
            None => Ok(()),
        }
    }
}

impl<D: Driver> Drop for Enumeration<'_, D> {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = self.driver.close_dir(dir) {
                log::warn!("closing enumeration failed: {e}");
            }
        }
    }
}
