//! # fatfs-handle
//!
//! File-like handles over a **FAT filesystem driver**.
//!
//! Application code written against POSIX-style files (open, read, write,
//! seek, close, directory listing, recursive delete) runs unchanged on top of
//! any driver that implements the [`Driver`] capability set. Files and
//! directories share one [`Handle`] type.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use fatfs_handle::{FileSystem, MemoryDriver, OpenFlags};
//!
//! let fs = FileSystem::new(MemoryDriver::new());
//! fs.mkdir("/logs");
//!
//! let mut log = fs.open_mode("/logs/boot.txt", "w");
//! log.write(b"ok\n");
//! log.close();
//!
//! let mut dir = fs.open("/logs", OpenFlags::READ);
//! loop {
//!     let entry = dir.open_next_file(OpenFlags::READ);
//!     if !entry.is_open() {
//!         break;
//!     }
//!     println!("{} ({} bytes)", entry.name(), entry.size().unwrap_or(0));
//! }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`FileSystem`] | Entry point: open, exists, mkdir, rename, remove, rmdir |
//! | [`Handle`] | Open file, open directory, or empty |
//! | [`OpenFlags`] | Driver access flags; built from mode strings by [`mode`] |
//! | [`FixedPath`] | Bounds-checked path of at most [`MAX_PATH_LEN`] bytes |
//! | [`FsError`] | Error type with context |
//! | [`MemoryDriver`] | RAM-backed driver with FAT-like behaviour |
//!
//! ---
//!
//! ## Trait Hierarchy
//!
//! ```text
//! FsFile + FsDir + FsPath = Driver
//! ```
//!
//! [`Driver`] has a **blanket implementation**. Implement the three
//! component traits and you get it for free. Wrap a driver in middleware with
//! [`LayerExt::layer`]; [`TraceLayer`] logs every driver call.
//!
//! ---
//!
//! ## Error Handling
//!
//! Driver operations return `Result<T, FsError>`. The handle-level API keeps
//! a forgiving boundary: failures become `false`, `0`, `None` or an empty
//! handle and are logged at `debug` level through the [`log`] facade. When the
//! reason matters, use the `try_*` methods or the [`std::io`] impls on
//! [`Handle`]:
//!
//! ```rust
//! use fatfs_handle::{FileSystem, FsError, MemoryDriver, mode};
//!
//! let fs = FileSystem::new(MemoryDriver::new());
//! drop(fs.open_mode("/once", "w"));
//!
//! assert!(!fs.open_mode("/once", "wx").is_open());
//! let err = fs.try_open("/once", mode::translate("wx").unwrap()).unwrap_err();
//! assert!(matches!(err, FsError::AlreadyExists { .. }));
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! Drivers are single-owner. Methods take `&self` so that several handles can
//! borrow one driver during a directory walk; no trait requires `Send` or
//! `Sync`.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Metadata`], [`DirEntry`], [`OpenFlags`], etc., plus `FsExtJson` |

// Private modules
mod error;
#[cfg(feature = "serde")]
mod ext;
mod filesystem;
mod handle;
mod layer;
mod memory;
mod path;
mod traits;
mod types;

pub mod mode;
pub mod pattern;

// Public re-exports - error types
pub use error::FsError;

// Public re-exports - core types
pub use path::{FixedPath, MAX_PATH_LEN, ROOT, SEPARATOR};
pub use types::{Attributes, DirEntry, FileType, Metadata, OpenFlags, SeekMode};

// Public re-exports - driver traits
pub use traits::{Driver, FsDir, FsFile, FsPath};

// Public re-exports - handle layer
pub use filesystem::FileSystem;
pub use handle::Handle;

// Public re-exports - infrastructure
pub use layer::{Layer, LayerExt, TraceLayer, Traced};
pub use memory::{MemDir, MemFile, MemoryDriver};

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::FsExtJson;
