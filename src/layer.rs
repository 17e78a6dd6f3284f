//! # Driver Middleware
//!
//! Tower-style composition for drivers.
//!
//! ```text
//! Driver ──▶ Layer::layer() ──▶ Wrapped Driver
//! ```
//!
//! A middleware is a wrapper struct implementing the driver traits plus a
//! [`Layer`] that builds it. The wrapped type is still a [`Driver`], so it
//! plugs straight into [`FileSystem`](crate::FileSystem):
//!
//! ```rust
//! use fatfs_handle::{FileSystem, LayerExt, MemoryDriver, TraceLayer};
//!
//! let fs = FileSystem::new(MemoryDriver::new().layer(TraceLayer::new("ram")));
//! assert!(fs.mkdir("/logs"));
//! assert!(fs.driver().inner().open_resources() == 0);
//! ```

use std::fmt;

use crate::{DirEntry, Driver, FsDir, FsError, FsFile, FsPath, Metadata, OpenFlags};

/// A layer that wraps a driver to add functionality.
///
/// # Design Notes
///
/// - `layer(self, driver)` consumes both the layer and the driver
/// - the resulting `Driver` type should implement the driver traits again
///
/// # Example
///
/// ```rust
/// use fatfs_handle::Layer;
///
/// struct Counting<D> {
///     inner: D,
/// }
///
/// struct CountingLayer;
///
/// impl<D> Layer<D> for CountingLayer {
///     type Driver = Counting<D>;
///
///     fn layer(self, driver: D) -> Self::Driver {
///         Counting { inner: driver }
///     }
/// }
/// ```
pub trait Layer<D> {
    /// The driver type after applying this layer.
    type Driver;

    /// Wrap `driver` with this layer's functionality.
    fn layer(self, driver: D) -> Self::Driver;
}

/// Fluent `.layer()` on any [`Driver`].
pub trait LayerExt: Driver + Sized {
    /// Apply a layer to this driver.
    fn layer<L: Layer<Self>>(self, layer: L) -> L::Driver {
        layer.layer(self)
    }
}

impl<D: Driver> LayerExt for D {}

/// Builds [`Traced`] drivers.
#[derive(Debug, Clone)]
pub struct TraceLayer {
    label: String,
}

impl TraceLayer {
    /// Trace records are prefixed with `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl<D> Layer<D> for TraceLayer {
    type Driver = Traced<D>;

    fn layer(self, driver: D) -> Traced<D> {
        Traced {
            inner: driver,
            label: self.label,
        }
    }
}

/// Driver wrapper that logs every call at `trace` level and forwards it
/// unchanged.
#[derive(Debug)]
pub struct Traced<D> {
    inner: D,
    label: String,
}

impl<D> Traced<D> {
    /// The wrapped driver.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Unwrap the driver.
    pub fn into_inner(self) -> D {
        self.inner
    }

    fn trace<T>(&self, call: fmt::Arguments<'_>, result: Result<T, FsError>) -> Result<T, FsError> {
        match &result {
            Ok(_) => log::trace!("{}: {call}: ok", self.label),
            Err(e) => log::trace!("{}: {call}: {e}", self.label),
        }
        result
    }
}

impl<D: FsFile> FsFile for Traced<D> {
    type File = D::File;

    fn open_file(&self, path: &str, flags: OpenFlags) -> Result<D::File, FsError> {
        self.trace(
            format_args!("open_file {path} {:#04x}", flags.bits()),
            self.inner.open_file(path, flags),
        )
    }

    fn close_file(&self, file: D::File) -> Result<(), FsError> {
        self.trace(format_args!("close_file"), self.inner.close_file(file))
    }

    fn read(&self, file: &mut D::File, buf: &mut [u8]) -> Result<usize, FsError> {
        let len = buf.len();
        self.trace(format_args!("read {len}"), self.inner.read(file, buf))
    }

    fn write(&self, file: &mut D::File, data: &[u8]) -> Result<usize, FsError> {
        self.trace(
            format_args!("write {}", data.len()),
            self.inner.write(file, data),
        )
    }

    fn seek(&self, file: &mut D::File, pos: u64) -> Result<(), FsError> {
        self.trace(format_args!("seek {pos}"), self.inner.seek(file, pos))
    }

    fn tell(&self, file: &D::File) -> Result<u64, FsError> {
        self.trace(format_args!("tell"), self.inner.tell(file))
    }

    fn size(&self, file: &D::File) -> Result<u64, FsError> {
        self.trace(format_args!("size"), self.inner.size(file))
    }

    fn is_eof(&self, file: &D::File) -> Result<bool, FsError> {
        self.trace(format_args!("is_eof"), self.inner.is_eof(file))
    }

    fn sync(&self, file: &mut D::File) -> Result<(), FsError> {
        self.trace(format_args!("sync"), self.inner.sync(file))
    }
}

impl<D: FsDir> FsDir for Traced<D> {
    type Dir = D::Dir;

    fn open_dir(&self, path: &str) -> Result<D::Dir, FsError> {
        self.trace(format_args!("open_dir {path}"), self.inner.open_dir(path))
    }

    fn close_dir(&self, dir: D::Dir) -> Result<(), FsError> {
        self.trace(format_args!("close_dir"), self.inner.close_dir(dir))
    }

    fn read_dir_entry(&self, dir: &mut D::Dir) -> Result<Option<DirEntry>, FsError> {
        self.trace(format_args!("read_dir_entry"), self.inner.read_dir_entry(dir))
    }

    fn rewind_dir(&self, dir: &mut D::Dir) -> Result<(), FsError> {
        self.trace(format_args!("rewind_dir"), self.inner.rewind_dir(dir))
    }

    fn find_first(
        &self,
        path: &str,
        pattern: &str,
    ) -> Result<(D::Dir, Option<DirEntry>), FsError> {
        self.trace(
            format_args!("find_first {path} {pattern}"),
            self.inner.find_first(path, pattern),
        )
    }

    fn find_next(&self, dir: &mut D::Dir, pattern: &str) -> Result<Option<DirEntry>, FsError> {
        self.trace(
            format_args!("find_next {pattern}"),
            self.inner.find_next(dir, pattern),
        )
    }
}

impl<D: FsPath> FsPath for Traced<D> {
    fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        self.trace(format_args!("stat {path}"), self.inner.stat(path))
    }

    fn create_dir(&self, path: &str) -> Result<(), FsError> {
        self.trace(format_args!("create_dir {path}"), self.inner.create_dir(path))
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), FsError> {
        self.trace(
            format_args!("rename {from} {to}"),
            self.inner.rename(from, to),
        )
    }

    fn unlink(&self, path: &str) -> Result<(), FsError> {
        self.trace(format_args!("unlink {path}"), self.inner.unlink(path))
    }
}
