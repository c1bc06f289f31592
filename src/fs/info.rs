//! fs::info
//!
//! Metadata of files and directories.
//!
//! A [`FileInfo`] is returned by [`Handle::stat`](super::Handle::stat) and
//! by [`DirEntry::info`](super::DirEntry::info). There is no native file
//! behind an entry, so [`FileInfo::sys`] is always `None`.

use std::any::Any;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::core::types::{EntryKind, TreeEntry};
use crate::git::Tree;

/// The type part of a [`FileMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
    /// A mode git does not define; no OS file type corresponds to it.
    Irregular,
}

/// Type and permission bits, as an OS would report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode {
    file_type: FileType,
    permissions: u32,
}

impl FileMode {
    /// Map a git entry kind onto OS file mode bits.
    ///
    /// Git only records whether a file is executable, so permissions are
    /// the conventional `0o644`/`0o755`; directories, symlinks and
    /// submodules get `0o777`.
    pub fn from_entry_kind(kind: EntryKind) -> Self {
        let (file_type, permissions) = match kind {
            EntryKind::Regular | EntryKind::Deprecated => (FileType::Regular, 0o644),
            EntryKind::Executable => (FileType::Regular, 0o755),
            EntryKind::Directory | EntryKind::Submodule => (FileType::Directory, 0o777),
            EntryKind::Symlink => (FileType::Symlink, 0o777),
            EntryKind::Unknown(_) => (FileType::Irregular, 0),
        };
        Self {
            file_type,
            permissions,
        }
    }

    /// The type part.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// The Unix permission bits.
    pub fn permissions(&self) -> u32 {
        self.permissions
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    pub fn is_regular(&self) -> bool {
        self.file_type == FileType::Regular
    }
}

impl fmt::Display for FileMode {
    /// `ls -l` style, e.g. `-rw-r--r--` or `drwxrwxrwx`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.file_type {
            FileType::Regular => '-',
            FileType::Directory => 'd',
            FileType::Symlink => 'L',
            FileType::Irregular => '?',
        };
        let mut text = String::with_capacity(10);
        text.push(kind);
        for shift in [6, 3, 0] {
            let bits = (self.permissions >> shift) & 0o7;
            text.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            text.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            text.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        f.write_str(&text)
    }
}

/// Immutable description of one file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    entry: TreeEntry,
    size: u64,
    mtime: DateTime<Utc>,
}

impl FileInfo {
    /// Describe a tree entry.
    ///
    /// `size` must be determined beforehand by asking the owning tree for
    /// the size at the entry's path; it is 0 for directories. An entry kind
    /// without an OS equivalent yields an [`FileType::Irregular`] mode
    /// rather than an error.
    pub fn new(entry: TreeEntry, size: u64, mtime: DateTime<Utc>) -> Self {
        Self { entry, size, mtime }
    }

    /// Describe `tree` itself as a directory named `name`.
    pub fn from_tree(tree: &Tree, name: &str, mtime: DateTime<Utc>) -> Self {
        Self {
            entry: TreeEntry::new(name, EntryKind::Directory, tree.id().clone()),
            size: 0,
            mtime,
        }
    }

    /// Base name of the file or directory.
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// Size in bytes; always 0 for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Type and permission bits.
    pub fn mode(&self) -> FileMode {
        FileMode::from_entry_kind(self.entry.kind)
    }

    /// Modification time, the author time of the viewed commit.
    pub fn mod_time(&self) -> DateTime<Utc> {
        self.mtime
    }

    /// True only for git sub-trees (submodules are not directories here).
    pub fn is_dir(&self) -> bool {
        self.entry.kind == EntryKind::Directory
    }

    /// Underlying native data; there is none.
    pub fn sys(&self) -> Option<&dyn Any> {
        None
    }

    /// The tree entry this record describes.
    pub fn entry(&self) -> &TreeEntry {
        &self.entry
    }
}
