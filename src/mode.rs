//! POSIX `fopen`-style mode strings.
//!
//! | mode  | flags |
//! |-------|-------|
//! | `r`   | read |
//! | `r+`  | read, write |
//! | `w`   | create always, write |
//! | `w+`  | create always, write, read |
//! | `a`   | open append, write |
//! | `a+`  | open append, write, read |
//! | `wx`  | create new, write |
//! | `w+x` | create new, write, read |

use std::str::FromStr;

use crate::{FsError, OpenFlags};

/// Longest accepted mode string.
pub const MAX_MODE_LEN: usize = 3;

/// Translate a mode string into access flags.
///
/// Returns `None` for anything not in the table above, including every
/// string longer than [`MAX_MODE_LEN`].
///
/// ```rust
/// use fatfs_handle::{mode, OpenFlags};
///
/// assert_eq!(mode::translate("r"), Some(OpenFlags::READ));
/// assert_eq!(mode::translate("rw"), None);
/// ```
pub fn translate(mode: &str) -> Option<OpenFlags> {
    if mode.len() > MAX_MODE_LEN {
        return None;
    }
    let read_write = |read| OpenFlags {
        read,
        write: true,
        ..OpenFlags::default()
    };
    let flags = match mode {
        "r" => OpenFlags::READ,
        "r+" => read_write(true),
        "w" => OpenFlags {
            create_always: true,
            ..read_write(false)
        },
        "w+" => OpenFlags {
            create_always: true,
            ..read_write(true)
        },
        "a" => OpenFlags {
            append: true,
            ..read_write(false)
        },
        "a+" => OpenFlags {
            append: true,
            ..read_write(true)
        },
        "wx" => OpenFlags {
            create_new: true,
            ..read_write(false)
        },
        "w+x" => OpenFlags {
            create_new: true,
            ..read_write(true)
        },
        _ => return None,
    };
    Some(flags)
}

impl FromStr for OpenFlags {
    type Err = FsError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        translate(mode).ok_or_else(|| FsError::InvalidMode {
            mode: mode.to_owned(),
        })
    }
}
