//! # Driver Capability Interface
//!
//! The primitive operations the handle layer needs from a FAT driver.
//!
//! ## Component Traits
//!
//! | Trait | Covers |
//! |-------|--------|
//! | [`FsFile`] | open/close, read, write, seek, tell, size, eof, sync |
//! | [`FsDir`] | open/close directory cursors, read next entry, rewind, find first/next |
//! | [`FsPath`] | stat, create directory, rename, unlink |
//!
//! ## Blanket Implementation
//!
//! [`Driver`] is implemented for every type that implements the three
//! component traits. Implement the components and you get `Driver` for free:
//!
//! ```rust
//! use fatfs_handle::{Driver, DirEntry, FsDir, FsError, FsFile, FsPath, Metadata, OpenFlags};
//!
//! struct NullDriver;
//!
//! # impl FsFile for NullDriver {
//! #     type File = ();
//! #     fn open_file(&self, p: &str, _: OpenFlags) -> Result<(), FsError> { Err(FsError::NotFound { path: p.into() }) }
//! #     fn close_file(&self, _: ()) -> Result<(), FsError> { Ok(()) }
//! #     fn read(&self, _: &mut (), _: &mut [u8]) -> Result<usize, FsError> { Ok(0) }
//! #     fn write(&self, _: &mut (), _: &[u8]) -> Result<usize, FsError> { Ok(0) }
//! #     fn seek(&self, _: &mut (), _: u64) -> Result<(), FsError> { Ok(()) }
//! #     fn tell(&self, _: &()) -> Result<u64, FsError> { Ok(0) }
//! #     fn size(&self, _: &()) -> Result<u64, FsError> { Ok(0) }
//! #     fn is_eof(&self, _: &()) -> Result<bool, FsError> { Ok(true) }
//! #     fn sync(&self, _: &mut ()) -> Result<(), FsError> { Ok(()) }
//! # }
//! # impl FsDir for NullDriver {
//! #     type Dir = ();
//! #     fn open_dir(&self, p: &str) -> Result<(), FsError> { Err(FsError::NotFound { path: p.into() }) }
//! #     fn close_dir(&self, _: ()) -> Result<(), FsError> { Ok(()) }
//! #     fn read_dir_entry(&self, _: &mut ()) -> Result<Option<DirEntry>, FsError> { Ok(None) }
//! #     fn rewind_dir(&self, _: &mut ()) -> Result<(), FsError> { Ok(()) }
//! # }
//! # impl FsPath for NullDriver {
//! #     fn stat(&self, p: &str) -> Result<Metadata, FsError> { Err(FsError::NotFound { path: p.into() }) }
//! #     fn create_dir(&self, _: &str) -> Result<(), FsError> { Ok(()) }
//! #     fn rename(&self, _: &str, _: &str) -> Result<(), FsError> { Ok(()) }
//! #     fn unlink(&self, _: &str) -> Result<(), FsError> { Ok(()) }
//! # }
//! fn use_driver<D: Driver>(_driver: &D) {}
//! use_driver(&NullDriver);
//! ```
//!
//! ## Concurrency
//!
//! Drivers are single-owner. Methods take `&self` so that several handles can
//! borrow the same driver while a directory is being walked; the driver keeps
//! its mutable state behind interior mutability and does no locking of its own.

mod fs_dir;
mod fs_file;
mod fs_path;

pub use fs_dir::FsDir;
pub use fs_file::FsFile;
pub use fs_path::FsPath;

/// A complete FAT driver: files, directory cursors and path operations.
///
/// # Blanket Implementation
///
/// Automatically implemented for any type implementing [`FsFile`], [`FsDir`]
/// and [`FsPath`]. Never implement it directly.
///
/// # Example
///
/// ```rust
/// use fatfs_handle::{Driver, FsError, OpenFlags};
///
/// fn copy_file<D: Driver>(driver: &D, src: &str, dst: &str) -> Result<u64, FsError> {
///     let mut from = driver.open_file(src, OpenFlags::READ)?;
///     let mut to = driver.open_file(dst, OpenFlags::WRITE)?;
///     let mut buf = [0u8; 512];
///     let mut total = 0;
///     loop {
///         let n = driver.read(&mut from, &mut buf)?;
///         if n == 0 {
///             break;
///         }
///         driver.write(&mut to, &buf[..n])?;
///         total += n as u64;
///     }
///     driver.close_file(from)?;
///     driver.close_file(to)?;
///     Ok(total)
/// }
/// ```
pub trait Driver: FsFile + FsDir + FsPath {}

impl<T: FsFile + FsDir + FsPath> Driver for T {}
