//! fs::dir_entry
//!
//! Entries produced by listing a directory.

use chrono::{DateTime, Utc};

use super::info::{FileInfo, FileMode};
use crate::core::types::TreeEntry;

/// One entry read from a directory.
///
/// Unlike a handle it holds no open stream; it only describes the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    info: FileInfo,
}

impl DirEntry {
    /// Create an entry from a tree entry, its precomputed size and the
    /// shared modification time.
    pub fn new(entry: TreeEntry, size: u64, mtime: DateTime<Utc>) -> Self {
        Self {
            info: FileInfo::new(entry, size, mtime),
        }
    }

    /// The final path segment, e.g. `hello.rs`, never a full path.
    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn is_dir(&self) -> bool {
        self.info.is_dir()
    }

    /// Type and permission bits of the entry.
    pub fn file_type(&self) -> FileMode {
        self.info.mode()
    }

    /// Full metadata, captured at the time of the listing.
    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    pub fn into_info(self) -> FileInfo {
        self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EntryKind, ObjectId};

    #[test]
    fn delegates_to_info() {
        let mtime = DateTime::from_timestamp(0, 0).unwrap();
        let entry = DirEntry::new(
            TreeEntry::new("canary.txt", EntryKind::Regular, ObjectId::zero()),
            6,
            mtime,
        );
        assert_eq!(entry.name(), "canary.txt");
        assert!(!entry.is_dir());
        assert!(entry.file_type().is_regular());
        assert_eq!(entry.info().size(), 6);
        assert_eq!(entry.info().mod_time(), mtime);
        assert_eq!(entry.into_info().name(), "canary.txt");
    }

    #[test]
    fn directory_entry() {
        let entry = DirEntry::new(
            TreeEntry::new("folder", EntryKind::Directory, ObjectId::zero()),
            0,
            DateTime::UNIX_EPOCH,
        );
        assert!(entry.is_dir());
        assert!(entry.file_type().is_dir());
    }
}
