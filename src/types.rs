//! Core types shared by the driver interface and the handle layer.

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// FAT attribute byte of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes(pub u8);

impl Attributes {
    /// Read-only entry.
    pub const READ_ONLY: Self = Self(0x01);
    /// Hidden entry.
    pub const HIDDEN: Self = Self(0x02);
    /// System entry.
    pub const SYSTEM: Self = Self(0x04);
    /// Volume label.
    pub const VOLUME_ID: Self = Self(0x08);
    /// Subdirectory.
    pub const DIRECTORY: Self = Self(0x10);
    /// Archive bit, set on every file the driver writes.
    pub const ARCHIVE: Self = Self(0x20);
    /// Placeholder left behind by a removed entry.
    pub const DELETED: Self = Self(0xFF);

    /// Get the raw attribute byte.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` for the removed-entry placeholder.
    #[inline]
    pub const fn is_deleted(self) -> bool {
        self.0 == Self::DELETED.0
    }

    /// Returns `true` if the directory bit is set.
    ///
    /// The deleted placeholder has every bit set, so callers check
    /// [`is_deleted`](Self::is_deleted) first.
    #[inline]
    pub const fn is_dir(self) -> bool {
        self.0 & Self::DIRECTORY.0 != 0
    }
}

impl std::ops::BitOr for Attributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Result of a driver `stat` call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Type of the entry.
    pub file_type: FileType,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Raw FAT attributes.
    pub attributes: Attributes,
}

impl Metadata {
    /// Returns `true` if this is a regular file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// One raw entry read from a directory cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirEntry {
    /// Name of the entry (not the full path).
    pub name: String,
    /// Raw FAT attributes.
    pub attributes: Attributes,
    /// Size in bytes.
    pub size: u64,
}

impl DirEntry {
    /// Returns `true` if the entry is a subdirectory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        !self.attributes.is_deleted() && self.attributes.is_dir()
    }

    /// Returns `true` if the entry is a removed-entry placeholder.
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.attributes.is_deleted()
    }
}

/// Origin for [`Handle::seek_from`](crate::Handle::seek_from).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekMode {
    /// Absolute offset from the start of the file.
    Start,
    /// Forward offset from the current position.
    Current,
    /// Backward offset from the end of the file.
    End,
}

/// Access flags for opening a file.
///
/// Mirrors the FatFs access byte. At most one of the disposition flags
/// (`create_new`, `create_always`, `open_always`) is meaningful; `append`
/// implies `open_always`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenFlags {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Create the file, failing if it exists.
    pub create_new: bool,
    /// Create the file, truncating it if it exists.
    pub create_always: bool,
    /// Open the file, creating it if it does not exist.
    pub open_always: bool,
    /// Like `open_always`, with the position set to the end of the file.
    pub append: bool,
}

impl OpenFlags {
    /// FatFs `FA_READ`.
    pub const FA_READ: u8 = 0x01;
    /// FatFs `FA_WRITE`.
    pub const FA_WRITE: u8 = 0x02;
    /// FatFs `FA_CREATE_NEW`.
    pub const FA_CREATE_NEW: u8 = 0x04;
    /// FatFs `FA_CREATE_ALWAYS`.
    pub const FA_CREATE_ALWAYS: u8 = 0x08;
    /// FatFs `FA_OPEN_ALWAYS`.
    pub const FA_OPEN_ALWAYS: u8 = 0x10;
    /// FatFs `FA_OPEN_APPEND`.
    pub const FA_OPEN_APPEND: u8 = 0x30;

    /// Read-only access to an existing file.
    pub const READ: Self = Self {
        read: true,
        write: false,
        create_new: false,
        create_always: false,
        open_always: false,
        append: false,
    };

    /// Read and write access, creating or truncating the file.
    pub const WRITE: Self = Self {
        read: true,
        write: true,
        create_new: false,
        create_always: true,
        open_always: false,
        append: false,
    };

    /// Write access positioned at the end, creating the file if needed.
    pub const APPEND: Self = Self {
        read: false,
        write: true,
        create_new: false,
        create_always: false,
        open_always: false,
        append: true,
    };

    /// Returns `true` if opening with these flags may create the file.
    #[inline]
    pub const fn creates(&self) -> bool {
        self.create_new || self.create_always || self.open_always || self.append
    }

    /// Encode as a FatFs access byte.
    pub const fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.read {
            bits |= Self::FA_READ;
        }
        if self.write {
            bits |= Self::FA_WRITE;
        }
        if self.create_new {
            bits |= Self::FA_CREATE_NEW;
        }
        if self.create_always {
            bits |= Self::FA_CREATE_ALWAYS;
        }
        if self.append {
            bits |= Self::FA_OPEN_APPEND;
        } else if self.open_always {
            bits |= Self::FA_OPEN_ALWAYS;
        }
        bits
    }

    /// Decode a FatFs access byte. Unknown bits are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        let append = bits & Self::FA_OPEN_APPEND == Self::FA_OPEN_APPEND;
        Self {
            read: bits & Self::FA_READ != 0,
            write: bits & Self::FA_WRITE != 0,
            create_new: bits & Self::FA_CREATE_NEW != 0,
            create_always: bits & Self::FA_CREATE_ALWAYS != 0,
            open_always: !append && bits & Self::FA_OPEN_ALWAYS != 0,
            append,
        }
    }
}
