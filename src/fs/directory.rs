//! fs::directory
//!
//! Open directories and their resumable listing.
//!
//! # State
//!
//! A directory handle is either positioned at entry `i` of its tree
//! (`0 <= i <= N`) or closed. The position only ever moves forward. Being
//! at `N` means the listing is exhausted, which is not the same as being
//! closed: an exhausted directory keeps answering [`Listing::End`], a
//! closed one fails with [`FsError::ClosedDirectory`].

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use tracing::warn;

use super::dir_entry::DirEntry;
use super::error::FsError;
use super::info::FileInfo;
use crate::git::{ObjectStore, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    At(usize),
    Closed,
}

/// Result of one listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The next batch of entries, never empty.
    Entries(Vec<DirEntry>),
    /// No entries remain.
    End,
}

impl Listing {
    pub fn is_end(&self) -> bool {
        matches!(self, Listing::End)
    }

    /// The entries of this batch; empty at the end.
    pub fn into_entries(self) -> Vec<DirEntry> {
        match self {
            Listing::Entries(entries) => entries,
            Listing::End => Vec::new(),
        }
    }
}

/// An open git directory.
pub struct Directory {
    store: Arc<dyn ObjectStore>,
    tree: Arc<Tree>,
    info: FileInfo,
    cursor: Cursor,
}

impl Directory {
    /// Open a directory over `tree`, described by `info`.
    pub fn new(store: Arc<dyn ObjectStore>, tree: Arc<Tree>, info: FileInfo) -> Self {
        Self {
            store,
            tree,
            info,
            cursor: Cursor::At(0),
        }
    }

    /// Metadata of this directory. Works even after close.
    pub fn stat(&self) -> &FileInfo {
        &self.info
    }

    /// Read the next entries.
    ///
    /// With `n > 0` at most `n` entries are returned. With `n <= 0` all
    /// remaining entries are returned at once. Once no entries remain,
    /// every call returns [`Listing::End`] until the directory is closed.
    ///
    /// # Errors
    ///
    /// - [`FsError::ClosedDirectory`] after [`Directory::close`]
    pub fn read_dir(&mut self, n: isize) -> Result<Listing, FsError> {
        let index = match self.cursor {
            Cursor::At(index) => index,
            Cursor::Closed => return Err(FsError::ClosedDirectory),
        };

        let remaining = self.tree.len().saturating_sub(index);
        let count = if n <= 0 {
            remaining
        } else {
            remaining.min(n.unsigned_abs())
        };
        if count == 0 {
            return Ok(Listing::End);
        }

        let mtime = self.info.mod_time();
        let entries = self.tree.entries()[index..index + count]
            .iter()
            .map(|entry| {
                let size = if entry.kind.is_file() {
                    self.entry_size(&entry.name)
                } else {
                    0
                };
                DirEntry::new(entry.clone(), size, mtime)
            })
            .collect();

        self.cursor = Cursor::At(index + count);
        Ok(Listing::Entries(entries))
    }

    fn entry_size(&self, name: &str) -> u64 {
        self.tree
            .size_of_path(self.store.as_ref(), name)
            .unwrap_or_else(|e| {
                warn!(entry = name, error = %e, "cannot determine entry size");
                0
            })
    }

    /// Close the directory. Closing twice is fine; listing afterwards is not.
    pub fn close(&mut self) -> io::Result<()> {
        self.cursor = Cursor::Closed;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.cursor == Cursor::Closed
    }
}

impl Read for Directory {
    /// A directory is never a byte source.
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directory")
            .field("info", &self.info)
            .field("entries", &self.tree.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::memory::{MemoryRepository, TreeBuilder};
    use chrono::DateTime;

    fn root_dir() -> Directory {
        let mut repo = MemoryRepository::new();
        let root = TreeBuilder::new()
            .file("README", "\"remote\" git repository\n")
            .file("fodder/empty", "")
            .file("folder/subfolder/canary.txt", "chirp!\n")
            .executable("folder/subfolder/schkript.sh", "#!/bin/sh\n")
            .build(&mut repo);
        let tree = repo.find_tree(&root).unwrap();
        let info = FileInfo::from_tree(&tree, ".", DateTime::from_timestamp(1234, 0).unwrap());
        Directory::new(Arc::new(repo), Arc::new(tree), info)
    }

    fn names(listing: Listing) -> Vec<String> {
        listing
            .into_entries()
            .into_iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    #[test]
    fn reads_en_bloc() {
        let mut dir = root_dir();
        let mut entries = names(dir.read_dir(-1).unwrap());
        entries.sort();
        assert_eq!(entries, ["README", "fodder", "folder"]);

        assert_eq!(dir.read_dir(-1).unwrap(), Listing::End);
        assert_eq!(dir.stat().name(), ".");
        assert!(dir.stat().is_dir());
    }

    #[test]
    fn reads_piece_wise() {
        let mut dir = root_dir();
        let mut seen = Vec::new();
        for _ in 0..3 {
            let batch = names(dir.read_dir(1).unwrap());
            assert_eq!(batch.len(), 1);
            assert!(!seen.contains(&batch[0]));
            seen.push(batch[0].clone());
        }
        assert!(dir.read_dir(1).unwrap().is_end());
        assert!(dir.read_dir(5).unwrap().is_end());
        assert!(dir.read_dir(0).unwrap().is_end());
    }

    #[test]
    fn oversized_request_returns_the_rest() {
        let mut dir = root_dir();
        assert_eq!(names(dir.read_dir(2).unwrap()).len(), 2);
        assert_eq!(names(dir.read_dir(100).unwrap()).len(), 1);
        assert!(dir.read_dir(100).unwrap().is_end());
    }

    #[test]
    fn entries_carry_size_and_shared_mtime() {
        let mut dir = root_dir();
        let mtime = dir.stat().mod_time();
        for entry in dir.read_dir(0).unwrap().into_entries() {
            assert_eq!(entry.info().mod_time(), mtime);
            match entry.name() {
                "README" => assert_eq!(entry.info().size(), 24),
                _ => {
                    assert!(entry.is_dir());
                    assert_eq!(entry.info().size(), 0);
                }
            }
        }
    }

    #[test]
    fn wont_list_after_close() {
        let mut dir = root_dir();
        dir.close().unwrap();
        assert_eq!(dir.read_dir(-1), Err(FsError::ClosedDirectory));
        assert_eq!(dir.read_dir(1), Err(FsError::ClosedDirectory));
        // closing again is fine and stat keeps working
        dir.close().unwrap();
        assert_eq!(dir.stat().name(), ".");
    }

    #[test]
    fn close_after_exhaustion_still_errors() {
        let mut dir = root_dir();
        dir.read_dir(0).unwrap();
        assert!(dir.read_dir(1).unwrap().is_end());
        dir.close().unwrap();
        assert!(dir.read_dir(1).is_err());
    }

    #[test]
    fn never_reads_bytes() {
        let mut dir = root_dir();
        let mut buf = [0u8; 256];
        assert_eq!(dir.read(&mut buf).unwrap(), 0);
        dir.close().unwrap();
        assert_eq!(dir.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn missing_blob_reports_zero_size() {
        let mut repo = MemoryRepository::new();
        let root = TreeBuilder::new()
            .dangling("ghost", crate::core::types::EntryKind::Regular)
            .build(&mut repo);
        let tree = repo.find_tree(&root).unwrap();
        let info = FileInfo::from_tree(&tree, ".", DateTime::UNIX_EPOCH);
        let mut dir = Directory::new(Arc::new(repo), Arc::new(tree), info);

        let entries = dir.read_dir(0).unwrap().into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].info().size(), 0);
    }
}
