//! RAM-backed FAT driver.
//!
//! [`MemoryDriver`] implements the full capability set without any media. It
//! mimics the parts of FAT behaviour the handle layer depends on:
//!
//! - directory entries are returned in creation order, not sorted
//! - removing an entry leaves a placeholder slot behind, reported with
//!   [`Attributes::DELETED`] until the directory is recreated
//! - open modes follow FatFs: `create_new` fails on existing files,
//!   `create_always` truncates, `append` starts at the end
//! - read-only entries cannot be opened for writing, renamed or removed
//! - an object that is still open cannot be removed
//!
//! Names are compared case-sensitively.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::path::ROOT;
use crate::{Attributes, DirEntry, FileType, FsDir, FsError, FsFile, FsPath, Metadata, OpenFlags};

/// Largest file FAT can hold.
const MAX_FILE_SIZE: u64 = u32::MAX as u64;

/// Characters FAT does not allow in a long file name.
const INVALID_NAME_CHARS: &[char] = &['"', '*', ':', '<', '>', '?', '|', '\\'];

/// In-memory FAT driver.
///
/// # Example
///
/// ```rust
/// use fatfs_handle::{FsFile, MemoryDriver, OpenFlags};
///
/// let driver = MemoryDriver::new();
/// let mut file = driver.open_file("/hello.txt", OpenFlags::WRITE).unwrap();
/// driver.write(&mut file, b"hi").unwrap();
/// driver.close_file(file).unwrap();
/// assert_eq!(driver.contents("/hello.txt").unwrap(), b"hi");
/// ```
#[derive(Debug, Default)]
pub struct MemoryDriver {
    state: RefCell<State>,
}

/// Open file of a [`MemoryDriver`].
#[derive(Debug)]
pub struct MemFile {
    id: u64,
    path: String,
    pos: u64,
    flags: OpenFlags,
}

/// Open directory cursor of a [`MemoryDriver`].
#[derive(Debug)]
pub struct MemDir {
    id: u64,
    path: String,
    index: usize,
}

#[derive(Debug)]
struct State {
    files: HashMap<String, FileNode>,
    dirs: HashMap<String, DirNode>,
    /// Live resource ids and the path each one refers to.
    open: HashMap<u64, String>,
    next_id: u64,
}

#[derive(Debug, Default)]
struct FileNode {
    data: Vec<u8>,
    attributes: Attributes,
}

#[derive(Debug, Default)]
struct DirNode {
    slots: Vec<Slot>,
    attributes: Attributes,
}

#[derive(Debug)]
struct Slot {
    name: String,
    live: bool,
}

impl Default for State {
    fn default() -> Self {
        let mut dirs = HashMap::new();
        dirs.insert(ROOT.to_owned(), DirNode::default());
        Self {
            files: HashMap::new(),
            dirs,
            open: HashMap::new(),
            next_id: 1,
        }
    }
}

impl MemoryDriver {
    /// Create a driver holding an empty root directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of file and directory resources currently open.
    pub fn open_resources(&self) -> usize {
        self.state.borrow().open.len()
    }

    /// Contents of the file at `path`, if it exists.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        let path = normalize(path).ok()?;
        self.state.borrow().files.get(&path).map(|f| f.data.clone())
    }

    /// Set or clear the read-only attribute of a file or directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    pub fn set_read_only(&self, path: &str, read_only: bool) -> Result<(), FsError> {
        let path = normalize(path)?;
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        let attributes = match (state.files.get_mut(&path), state.dirs.get_mut(&path)) {
            (Some(file), _) => &mut file.attributes,
            (_, Some(dir)) => &mut dir.attributes,
            _ => return Err(FsError::NotFound { path }),
        };
        if read_only {
            attributes.0 |= Attributes::READ_ONLY.0;
        } else {
            attributes.0 &= !Attributes::READ_ONLY.0;
        }
        Ok(())
    }
}

/// Collapse repeated separators and make the path absolute.
fn normalize(path: &str) -> Result<String, FsError> {
    if path.is_empty() {
        return Err(FsError::NotFound {
            path: String::new(),
        });
    }
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    Ok(format!("/{}", parts.join("/")))
}

/// Split a normalized, non-root path into parent and final name.
fn split(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some(("", name)) => (ROOT, name),
        Some((parent, name)) => (parent, name),
        None => (ROOT, path),
    }
}

fn child_path(dir: &str, name: &str) -> String {
    if dir == ROOT {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

impl State {
    fn allocate(&mut self, path: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.open.insert(id, path.to_owned());
        id
    }

    fn check_open(&self, id: u64) -> Result<(), FsError> {
        if self.open.contains_key(&id) {
            Ok(())
        } else {
            Err(FsError::InvalidHandle)
        }
    }

    fn release(&mut self, id: u64) -> Result<(), FsError> {
        self.open.remove(&id).map(|_| ()).ok_or(FsError::InvalidHandle)
    }

    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path) || self.dirs.contains_key(path)
    }

    /// Returns `true` if `path` or anything below it is open.
    fn is_busy(&self, path: &str) -> bool {
        self.open.values().any(|p| {
            p == path
                || p.strip_prefix(path)
                    .is_some_and(|rest| rest.starts_with('/') || path == ROOT)
        })
    }

    fn read_only(&self, path: &str) -> bool {
        let attributes = match (self.files.get(path), self.dirs.get(path)) {
            (Some(file), _) => file.attributes,
            (_, Some(dir)) => dir.attributes,
            _ => return false,
        };
        attributes.contains(Attributes::READ_ONLY)
    }

    /// Add a live slot for `path` to its parent directory.
    fn link(&mut self, path: &str) -> Result<(), FsError> {
        let (parent, name) = split(path);
        if name.contains(INVALID_NAME_CHARS) || name.chars().any(char::is_control) {
            return Err(FsError::Driver(format!("invalid name: {name:?}")));
        }
        if self.files.contains_key(parent) {
            return Err(FsError::NotADirectory {
                path: parent.to_owned(),
            });
        }
        let dir = self.dirs.get_mut(parent).ok_or_else(|| FsError::NotFound {
            path: parent.to_owned(),
        })?;
        dir.slots.push(Slot {
            name: name.to_owned(),
            live: true,
        });
        Ok(())
    }

    /// Turn the live slot for `path` into a placeholder.
    fn unlink_slot(&mut self, path: &str) {
        let (parent, name) = split(path);
        if let Some(dir) = self.dirs.get_mut(parent) {
            if let Some(slot) = dir.slots.iter_mut().find(|s| s.live && s.name == name) {
                slot.live = false;
            }
        }
    }

    fn file(&self, file: &MemFile) -> Result<&FileNode, FsError> {
        self.check_open(file.id)?;
        self.files.get(&file.path).ok_or_else(|| FsError::NotFound {
            path: file.path.clone(),
        })
    }

    fn file_mut(&mut self, file: &MemFile) -> Result<&mut FileNode, FsError> {
        self.check_open(file.id)?;
        self.files.get_mut(&file.path).ok_or_else(|| FsError::NotFound {
            path: file.path.clone(),
        })
    }
}

impl FsFile for MemoryDriver {
    type File = MemFile;

    fn open_file(&self, path: &str, flags: OpenFlags) -> Result<MemFile, FsError> {
        let path = normalize(path)?;
        let mut state = self.state.borrow_mut();
        if state.dirs.contains_key(&path) {
            return Err(FsError::NotAFile { path });
        }
        if state.files.contains_key(&path) {
            if flags.create_new {
                return Err(FsError::AlreadyExists {
                    path,
                    operation: "open",
                });
            }
            if state.read_only(&path) && (flags.write || flags.create_always) {
                return Err(FsError::PermissionDenied {
                    path,
                    operation: "open",
                });
            }
            if flags.create_always {
                if let Some(node) = state.files.get_mut(&path) {
                    node.data.clear();
                }
            }
        } else if flags.creates() {
            state.link(&path)?;
            state.files.insert(
                path.clone(),
                FileNode {
                    data: Vec::new(),
                    attributes: Attributes::ARCHIVE,
                },
            );
        } else {
            return Err(FsError::NotFound { path });
        }

        let pos = if flags.append {
            state.files.get(&path).map_or(0, |f| f.data.len() as u64)
        } else {
            0
        };
        let id = state.allocate(&path);
        Ok(MemFile {
            id,
            path,
            pos,
            flags,
        })
    }

    fn close_file(&self, file: MemFile) -> Result<(), FsError> {
        self.state.borrow_mut().release(file.id)
    }

    fn read(&self, file: &mut MemFile, buf: &mut [u8]) -> Result<usize, FsError> {
        let state = self.state.borrow();
        let node = state.file(file)?;
        if !file.flags.read {
            return Err(FsError::PermissionDenied {
                path: file.path.clone(),
                operation: "read",
            });
        }
        let start = (file.pos as usize).min(node.data.len());
        let n = buf.len().min(node.data.len() - start);
        buf[..n].copy_from_slice(&node.data[start..start + n]);
        file.pos += n as u64;
        Ok(n)
    }

    fn write(&self, file: &mut MemFile, data: &[u8]) -> Result<usize, FsError> {
        let mut state = self.state.borrow_mut();
        let node = state.file_mut(file)?;
        if !file.flags.write {
            return Err(FsError::PermissionDenied {
                path: file.path.clone(),
                operation: "write",
            });
        }
        let start = file.pos as usize;
        let end = start + data.len();
        if end as u64 > MAX_FILE_SIZE {
            return Err(FsError::Driver(format!("file too large: {}", file.path)));
        }
        if node.data.len() < end {
            node.data.resize(end, 0);
        }
        node.data[start..end].copy_from_slice(data);
        node.attributes = node.attributes | Attributes::ARCHIVE;
        file.pos = end as u64;
        Ok(data.len())
    }

    fn seek(&self, file: &mut MemFile, pos: u64) -> Result<(), FsError> {
        let mut state = self.state.borrow_mut();
        let node = state.file_mut(file)?;
        let len = node.data.len() as u64;
        file.pos = if pos <= len {
            pos
        } else if file.flags.write {
            // Seeking past the end of a writable file extends it.
            if pos > MAX_FILE_SIZE {
                return Err(FsError::SeekOutOfRange);
            }
            let new_len = usize::try_from(pos).map_err(|_| FsError::SeekOutOfRange)?;
            node.data.resize(new_len, 0);
            pos
        } else {
            len
        };
        Ok(())
    }

    fn tell(&self, file: &MemFile) -> Result<u64, FsError> {
        self.state.borrow().check_open(file.id)?;
        Ok(file.pos)
    }

    fn size(&self, file: &MemFile) -> Result<u64, FsError> {
        Ok(self.state.borrow().file(file)?.data.len() as u64)
    }

    fn is_eof(&self, file: &MemFile) -> Result<bool, FsError> {
        Ok(file.pos >= self.size(file)?)
    }

    fn sync(&self, file: &mut MemFile) -> Result<(), FsError> {
        self.state.borrow().file(file).map(|_| ())
    }
}

impl FsDir for MemoryDriver {
    type Dir = MemDir;

    fn open_dir(&self, path: &str) -> Result<MemDir, FsError> {
        let path = normalize(path)?;
        let mut state = self.state.borrow_mut();
        if !state.dirs.contains_key(&path) {
            return Err(if state.files.contains_key(&path) {
                FsError::NotADirectory { path }
            } else {
                FsError::NotFound { path }
            });
        }
        let id = state.allocate(&path);
        Ok(MemDir { id, path, index: 0 })
    }

    fn close_dir(&self, dir: MemDir) -> Result<(), FsError> {
        self.state.borrow_mut().release(dir.id)
    }

    fn read_dir_entry(&self, dir: &mut MemDir) -> Result<Option<DirEntry>, FsError> {
        let state = self.state.borrow();
        state.check_open(dir.id)?;
        let node = state.dirs.get(&dir.path).ok_or_else(|| FsError::NotFound {
            path: dir.path.clone(),
        })?;
        let Some(slot) = node.slots.get(dir.index) else {
            return Ok(None);
        };
        dir.index += 1;

        if !slot.live {
            return Ok(Some(DirEntry {
                name: slot.name.clone(),
                attributes: Attributes::DELETED,
                size: 0,
            }));
        }
        let path = child_path(&dir.path, &slot.name);
        let (attributes, size) = match (state.files.get(&path), state.dirs.get(&path)) {
            (Some(file), _) => (file.attributes, file.data.len() as u64),
            (_, Some(sub)) => (sub.attributes | Attributes::DIRECTORY, 0),
            _ => return Err(FsError::Driver(format!("dangling entry: {path}"))),
        };
        Ok(Some(DirEntry {
            name: slot.name.clone(),
            attributes,
            size,
        }))
    }

    fn rewind_dir(&self, dir: &mut MemDir) -> Result<(), FsError> {
        self.state.borrow().check_open(dir.id)?;
        dir.index = 0;
        Ok(())
    }
}

impl FsPath for MemoryDriver {
    fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        let path = normalize(path)?;
        let state = self.state.borrow();
        if let Some(file) = state.files.get(&path) {
            Ok(Metadata {
                file_type: FileType::File,
                size: file.data.len() as u64,
                attributes: file.attributes,
            })
        } else if let Some(dir) = state.dirs.get(&path) {
            Ok(Metadata {
                file_type: FileType::Directory,
                size: 0,
                attributes: dir.attributes | Attributes::DIRECTORY,
            })
        } else {
            Err(FsError::NotFound { path })
        }
    }

    fn create_dir(&self, path: &str) -> Result<(), FsError> {
        let path = normalize(path)?;
        let mut state = self.state.borrow_mut();
        if state.exists(&path) {
            return Err(FsError::AlreadyExists {
                path,
                operation: "mkdir",
            });
        }
        state.link(&path)?;
        state.dirs.insert(path, DirNode::default());
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), FsError> {
        let (from, to) = (normalize(from)?, normalize(to)?);
        let mut state = self.state.borrow_mut();
        if from == ROOT || !state.exists(&from) {
            return Err(FsError::NotFound { path: from });
        }
        if state.exists(&to) {
            return Err(FsError::AlreadyExists {
                path: to,
                operation: "rename",
            });
        }
        if state.read_only(&from) {
            return Err(FsError::PermissionDenied {
                path: from,
                operation: "rename",
            });
        }
        if state.is_busy(&from) {
            return Err(FsError::Driver(format!("object is open: {from}")));
        }
        let subtree = format!("{from}/");
        if to.starts_with(&subtree) {
            return Err(FsError::Driver(format!("cannot move {from} into itself")));
        }

        state.link(&to)?;
        state.unlink_slot(&from);
        let moved = |path: &str| -> Option<String> {
            if path == from {
                Some(to.clone())
            } else {
                path.strip_prefix(&subtree).map(|rest| child_path(&to, rest))
            }
        };
        let files: Vec<String> = state
            .files
            .keys()
            .filter(|p| moved(p.as_str()).is_some())
            .cloned()
            .collect();
        for old in files {
            if let (Some(node), Some(new)) = (state.files.remove(&old), moved(&old)) {
                state.files.insert(new, node);
            }
        }
        let dirs: Vec<String> = state
            .dirs
            .keys()
            .filter(|p| moved(p.as_str()).is_some())
            .cloned()
            .collect();
        for old in dirs {
            if let (Some(node), Some(new)) = (state.dirs.remove(&old), moved(&old)) {
                state.dirs.insert(new, node);
            }
        }
        Ok(())
    }

    fn unlink(&self, path: &str) -> Result<(), FsError> {
        let path = normalize(path)?;
        let mut state = self.state.borrow_mut();
        if path == ROOT {
            return Err(FsError::PermissionDenied {
                path,
                operation: "unlink",
            });
        }
        if !state.exists(&path) {
            return Err(FsError::NotFound { path });
        }
        if state.read_only(&path) {
            return Err(FsError::PermissionDenied {
                path,
                operation: "unlink",
            });
        }
        if state.is_busy(&path) {
            return Err(FsError::Driver(format!("object is open: {path}")));
        }
        if let Some(dir) = state.dirs.get(&path) {
            if dir.slots.iter().any(|s| s.live) {
                return Err(FsError::DirectoryNotEmpty { path });
            }
            state.dirs.remove(&path);
        } else {
            state.files.remove(&path);
        }
        state.unlink_slot(&path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(driver: &MemoryDriver, path: &str, data: &[u8]) {
        let mut file = driver.open_file(path, OpenFlags::WRITE).unwrap();
        driver.write(&mut file, data).unwrap();
        driver.close_file(file).unwrap();
    }

    fn names(driver: &MemoryDriver, path: &str) -> Vec<(String, bool)> {
        let mut dir = driver.open_dir(path).unwrap();
        let mut out = Vec::new();
        while let Some(entry) = driver.read_dir_entry(&mut dir).unwrap() {
            let placeholder = entry.is_placeholder();
            out.push((entry.name, placeholder));
        }
        driver.close_dir(dir).unwrap();
        out
    }

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize("/").unwrap(), "/");
        assert_eq!(normalize("//a//b/").unwrap(), "/a/b");
        assert_eq!(normalize("a").unwrap(), "/a");
        assert!(normalize("").is_err());
    }

    #[test]
    fn split_parent_and_name() {
        assert_eq!(split("/a"), ("/", "a"));
        assert_eq!(split("/a/b"), ("/a", "b"));
    }

    #[test]
    fn entries_keep_creation_order() {
        let driver = MemoryDriver::new();
        write_file(&driver, "/zeta", b"");
        driver.create_dir("/alpha").unwrap();
        write_file(&driver, "/mid", b"");
        assert_eq!(
            names(&driver, "/"),
            [
                ("zeta".to_string(), false),
                ("alpha".to_string(), false),
                ("mid".to_string(), false)
            ]
        );
    }

    #[test]
    fn unlink_leaves_placeholder() {
        let driver = MemoryDriver::new();
        write_file(&driver, "/a", b"1");
        write_file(&driver, "/b", b"2");
        driver.unlink("/a").unwrap();
        assert_eq!(
            names(&driver, "/"),
            [("a".to_string(), true), ("b".to_string(), false)]
        );
    }

    #[test]
    fn create_new_fails_on_existing() {
        let driver = MemoryDriver::new();
        write_file(&driver, "/a", b"1");
        let flags = OpenFlags {
            create_new: true,
            write: true,
            ..OpenFlags::default()
        };
        assert!(matches!(
            driver.open_file("/a", flags),
            Err(FsError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn read_requires_read_access() {
        let driver = MemoryDriver::new();
        let mut file = driver.open_file("/a", OpenFlags::APPEND).unwrap();
        let mut buf = [0u8; 4];
        assert!(matches!(
            driver.read(&mut file, &mut buf),
            Err(FsError::PermissionDenied { .. })
        ));
        driver.close_file(file).unwrap();
    }

    #[test]
    fn append_starts_at_end() {
        let driver = MemoryDriver::new();
        write_file(&driver, "/log", b"abc");
        let mut file = driver.open_file("/log", OpenFlags::APPEND).unwrap();
        assert_eq!(driver.tell(&file).unwrap(), 3);
        driver.write(&mut file, b"de").unwrap();
        driver.close_file(file).unwrap();
        assert_eq!(driver.contents("/log").unwrap(), b"abcde");
    }

    #[test]
    fn seek_past_end_clamps_when_read_only() {
        let driver = MemoryDriver::new();
        write_file(&driver, "/f", b"abc");
        let mut file = driver.open_file("/f", OpenFlags::READ).unwrap();
        driver.seek(&mut file, 10).unwrap();
        assert_eq!(driver.tell(&file).unwrap(), 3);
        assert!(driver.is_eof(&file).unwrap());
        driver.close_file(file).unwrap();
    }

    #[test]
    fn seek_past_end_extends_when_writable() {
        let driver = MemoryDriver::new();
        let mut file = driver.open_file("/f", OpenFlags::WRITE).unwrap();
        driver.seek(&mut file, 4).unwrap();
        assert_eq!(driver.size(&file).unwrap(), 4);
        driver.close_file(file).unwrap();
    }

    #[test]
    fn seek_beyond_fat_limit_is_rejected() {
        let driver = MemoryDriver::new();
        let mut file = driver.open_file("/f", OpenFlags::WRITE).unwrap();
        driver.write(&mut file, b"abc").unwrap();
        assert!(matches!(
            driver.seek(&mut file, MAX_FILE_SIZE + 1),
            Err(FsError::SeekOutOfRange)
        ));
        assert!(matches!(
            driver.seek(&mut file, u64::MAX / 2),
            Err(FsError::SeekOutOfRange)
        ));
        assert_eq!(driver.size(&file).unwrap(), 3);
        assert_eq!(driver.tell(&file).unwrap(), 3);
        driver.close_file(file).unwrap();
    }

    #[test]
    fn unlink_refuses_open_and_non_empty() {
        let driver = MemoryDriver::new();
        driver.create_dir("/d").unwrap();
        write_file(&driver, "/d/f", b"x");
        assert!(matches!(
            driver.unlink("/d"),
            Err(FsError::DirectoryNotEmpty { .. })
        ));

        let file = driver.open_file("/d/f", OpenFlags::READ).unwrap();
        assert!(matches!(driver.unlink("/d/f"), Err(FsError::Driver(_))));
        driver.close_file(file).unwrap();
        driver.unlink("/d/f").unwrap();
        driver.unlink("/d").unwrap();
        assert!(driver.stat("/d").is_err());
    }

    #[test]
    fn read_only_blocks_write_and_unlink() {
        let driver = MemoryDriver::new();
        write_file(&driver, "/ro", b"x");
        driver.set_read_only("/ro", true).unwrap();
        assert!(matches!(
            driver.open_file("/ro", OpenFlags::WRITE),
            Err(FsError::PermissionDenied { .. })
        ));
        assert!(matches!(
            driver.unlink("/ro"),
            Err(FsError::PermissionDenied { .. })
        ));
        driver.set_read_only("/ro", false).unwrap();
        driver.unlink("/ro").unwrap();
    }

    #[test]
    fn rename_moves_subtree() {
        let driver = MemoryDriver::new();
        driver.create_dir("/a").unwrap();
        driver.create_dir("/a/b").unwrap();
        write_file(&driver, "/a/b/f", b"data");
        driver.rename("/a", "/z").unwrap();
        assert_eq!(driver.contents("/z/b/f").unwrap(), b"data");
        assert!(driver.stat("/a").is_err());
        assert!(driver.stat("/z/b").unwrap().is_dir());
        assert!(driver.rename("/z", "/z/inner").is_err());
    }

    #[test]
    fn rename_refuses_open_subtree() {
        let driver = MemoryDriver::new();
        driver.create_dir("/a").unwrap();
        write_file(&driver, "/a/f", b"x");
        let file = driver.open_file("/a/f", OpenFlags::READ).unwrap();
        assert!(matches!(driver.rename("/a", "/b"), Err(FsError::Driver(_))));
        driver.close_file(file).unwrap();
        driver.rename("/a", "/b").unwrap();
    }

    #[test]
    fn double_close_is_rejected() {
        let driver = MemoryDriver::new();
        let dir = driver.open_dir("/").unwrap();
        let id = dir.id;
        driver.close_dir(dir).unwrap();
        let again = MemDir {
            id,
            path: "/".into(),
            index: 0,
        };
        assert!(matches!(driver.close_dir(again), Err(FsError::InvalidHandle)));
        assert_eq!(driver.open_resources(), 0);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let driver = MemoryDriver::new();
        assert!(driver.create_dir("/a:b").is_err());
        assert!(driver.open_file("/what?", OpenFlags::WRITE).is_err());
    }
}
