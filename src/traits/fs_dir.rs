//! Directory cursor operations of the driver.

use crate::pattern;
use crate::{DirEntry, FsError};

/// Directory cursor operations of a FAT driver.
///
/// A driver exposes directories one raw entry at a time. Entries come back
/// in on-disk order, removed entries may show up as placeholders (see
/// [`DirEntry::is_placeholder`]), and `Ok(None)` marks the end of the
/// enumeration.
///
/// # Object Safety
///
/// This trait is object-safe once `Dir` is named, e.g. `dyn FsDir<Dir = u32>`.
pub trait FsDir {
    /// Driver-level directory cursor.
    type Dir;

    /// Open a directory cursor positioned before the first entry.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if the path is a file
    fn open_dir(&self, path: &str) -> Result<Self::Dir, FsError>;

    /// Release a directory cursor.
    fn close_dir(&self, dir: Self::Dir) -> Result<(), FsError>;

    /// Read the next raw entry, or `None` at the end of the directory.
    fn read_dir_entry(&self, dir: &mut Self::Dir) -> Result<Option<DirEntry>, FsError>;

    /// Move the cursor back before the first entry.
    fn rewind_dir(&self, dir: &mut Self::Dir) -> Result<(), FsError>;

    /// Open `path` and return the cursor with the first entry matching `pattern`.
    ///
    /// The cursor stays open even when no entry matches; the caller closes it.
    fn find_first(
        &self,
        path: &str,
        pattern: &str,
    ) -> Result<(Self::Dir, Option<DirEntry>), FsError> {
        let mut dir = self.open_dir(path)?;
        match self.find_next(&mut dir, pattern) {
            Ok(entry) => Ok((dir, entry)),
            Err(e) => {
                if let Err(close_err) = self.close_dir(dir) {
                    log::warn!("find_first: closing {path} failed: {close_err}");
                }
                Err(e)
            }
        }
    }

    /// Next live entry matching `pattern`, skipping placeholders.
    fn find_next(&self, dir: &mut Self::Dir, pattern: &str) -> Result<Option<DirEntry>, FsError> {
        while let Some(entry) = self.read_dir_entry(dir)? {
            if entry.name.is_empty() {
                return Ok(None);
            }
            if !entry.is_placeholder() && pattern::matches(pattern, &entry.name) {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attributes;
    use std::cell::RefCell;

    /// Cursor over a fixed listing.
    struct ListingDir {
        entries: Vec<DirEntry>,
        closed: RefCell<usize>,
    }

    impl ListingDir {
        fn new(names: &[(&str, Attributes)]) -> Self {
            Self {
                entries: names
                    .iter()
                    .map(|&(name, attributes)| DirEntry {
                        name: name.into(),
                        attributes,
                        size: 0,
                    })
                    .collect(),
                closed: RefCell::new(0),
            }
        }
    }

    impl FsDir for ListingDir {
        type Dir = usize;

        fn open_dir(&self, _: &str) -> Result<usize, FsError> {
            Ok(0)
        }

        fn close_dir(&self, _: usize) -> Result<(), FsError> {
            *self.closed.borrow_mut() += 1;
            Ok(())
        }

        fn read_dir_entry(&self, dir: &mut usize) -> Result<Option<DirEntry>, FsError> {
            let entry = self.entries.get(*dir).cloned();
            *dir += 1;
            Ok(entry)
        }

        fn rewind_dir(&self, dir: &mut usize) -> Result<(), FsError> {
            *dir = 0;
            Ok(())
        }
    }

    #[test]
    fn fs_dir_is_object_safe() {
        fn _check(_: &dyn FsDir<Dir = u32>) {}
    }

    #[test]
    fn find_skips_placeholders_and_filters() {
        let fs = ListingDir::new(&[
            ("old.log", Attributes::DELETED),
            ("a.txt", Attributes::ARCHIVE),
            ("b.log", Attributes::ARCHIVE),
            ("sub", Attributes::DIRECTORY),
        ]);

        let (mut dir, first) = fs.find_first("/", "*.log").unwrap();
        assert_eq!(first.unwrap().name, "b.log");
        assert_eq!(fs.find_next(&mut dir, "*.log").unwrap(), None);

        fs.rewind_dir(&mut dir).unwrap();
        let names: Vec<_> = std::iter::from_fn(|| fs.find_next(&mut dir, "*").unwrap())
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["a.txt", "b.log", "sub"]);
        fs.close_dir(dir).unwrap();
        assert_eq!(*fs.closed.borrow(), 1);
    }

    #[test]
    fn empty_name_ends_enumeration() {
        let fs = ListingDir::new(&[("", Attributes::ARCHIVE), ("late", Attributes::ARCHIVE)]);
        let (_, first) = fs.find_first("/", "*").unwrap();
        assert_eq!(first, None);
    }
}
