//! git
//!
//! The repository backend seam: every lookup of blobs, trees, commits and
//! remote references goes through the traits in this module.
//!
//! # Architecture
//!
//! The file system layer never talks to `git2` directly. It only sees:
//!
//! - [`ObjectStore`] - fetch blobs and trees by content id
//! - [`RepositoryBackend`] - additionally resolve revisions and commits
//! - [`remote::ReferenceLister`] - list the references of a remote
//!
//! Two implementations ship with the crate:
//!
//! - [`GitBackend`] - a libgit2 clone of a remote repository
//! - [`memory::MemoryRepository`] - a fully in-memory repository, used by
//!   the tests and by embedders that assemble trees themselves
//!
//! # Invariants
//!
//! - Stores are never mutated once handed to a file system.
//! - All operations return strong types ([`ObjectId`], [`TreeEntry`]).
//! - No other module calls git2.

mod interface;
pub mod memory;
pub mod remote;

pub use interface::GitBackend;
pub use remote::{GitRemoteLister, RefKind, ReferenceLister, RemoteRef};

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use thiserror::Error;

use crate::core::path;
use crate::core::types::{EntryKind, ObjectId, TreeEntry, TypeError};

/// Errors from repository backend operations.
///
/// Categorized so that the file system layer can map them onto its own
/// "not found" and "invalid" conditions.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Object not found in the store.
    #[error("object not found: {id}")]
    ObjectNotFound {
        /// The id that was not found
        id: String,
    },

    /// Object exists but has a different type than requested.
    #[error("object {id} is not a {expected}")]
    WrongObjectType {
        /// The id of the object
        id: String,
        /// The expected object type
        expected: &'static str,
    },

    /// A path segment is missing from a tree.
    #[error("entry not found: {path}")]
    EntryNotFound {
        /// The path that was looked up
        path: String,
    },

    /// An intermediate path segment is not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was looked up
        path: String,
    },

    /// Revision specifier could not be resolved.
    #[error("revision not found: {revision}")]
    RevisionNotFound {
        /// The revision specifier
        revision: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {id}")]
    InvalidObjectId {
        /// The invalid id string
        id: String,
    },

    /// A network operation was cancelled or ran past its deadline.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal git2 or I/O error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl BackendError {
    /// True for the "does not exist" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::ObjectNotFound { .. }
                | BackendError::EntryNotFound { .. }
                | BackendError::DirectoryNotFound { .. }
                | BackendError::RevisionNotFound { .. }
        )
    }
}

impl From<TypeError> for BackendError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidObjectId(msg) => BackendError::InvalidObjectId { id: msg },
        }
    }
}

/// A readable, closable byte stream over one blob.
pub trait BlobStream: Read + Send {
    /// Release the stream. Reading afterwards is an error.
    fn close(&mut self) -> io::Result<()>;
}

/// Contents of a blob as held by a store.
#[derive(Clone)]
enum BlobData {
    Loaded(Arc<[u8]>),
    /// The store knows the blob's size but cannot produce its bytes.
    Unreadable { size: u64, reason: String },
}

/// A blob object: size plus the means to open a byte stream over it.
#[derive(Clone)]
pub struct Blob {
    id: ObjectId,
    data: BlobData,
}

impl Blob {
    /// Create a blob from its contents.
    pub fn new(id: ObjectId, contents: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id,
            data: BlobData::Loaded(contents.into()),
        }
    }

    /// Create a blob whose contents cannot be streamed.
    pub fn unreadable(id: ObjectId, size: u64, reason: impl Into<String>) -> Self {
        Self {
            id,
            data: BlobData::Unreadable {
                size,
                reason: reason.into(),
            },
        }
    }

    /// The blob's content id.
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// Size of the blob contents in bytes.
    pub fn size(&self) -> u64 {
        match &self.data {
            BlobData::Loaded(bytes) => bytes.len() as u64,
            BlobData::Unreadable { size, .. } => *size,
        }
    }

    /// Open a byte stream over the blob contents.
    pub fn reader(&self) -> io::Result<Box<dyn BlobStream>> {
        match &self.data {
            BlobData::Loaded(bytes) => Ok(Box::new(BlobReader {
                inner: Some(io::Cursor::new(Arc::clone(bytes))),
            })),
            BlobData::Unreadable { reason, .. } => Err(io::Error::other(format!(
                "cannot stream blob {}: {}",
                self.id, reason
            ))),
        }
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("id", &self.id)
            .field("size", &self.size())
            .finish()
    }
}

/// Stream over shared, already loaded blob contents.
struct BlobReader {
    inner: Option<io::Cursor<Arc<[u8]>>>,
}

impl Read for BlobReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(cursor) => cursor.read(buf),
            None => Err(io::Error::other("read from released blob stream")),
        }
    }
}

impl BlobStream for BlobReader {
    fn close(&mut self) -> io::Result<()> {
        self.inner = None;
        Ok(())
    }
}

/// A tree object: the ordered entries of one directory.
///
/// Git never stores empty trees for sub-directories, so a tree reached
/// through a parent entry always has at least one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    id: ObjectId,
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a tree from its id and entries, keeping the entry order.
    pub fn new(id: ObjectId, entries: Vec<TreeEntry>) -> Self {
        Self { id, entries }
    }

    /// The tree's content id.
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// The entries in tree order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the tree has no entries (only possible for a root tree).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct child entry by name.
    pub fn entry(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Find the entry at a slash-separated path below this tree.
    ///
    /// Intermediate segments must name sub-trees, which are fetched from
    /// `store` as the walk descends.
    ///
    /// # Errors
    ///
    /// - [`BackendError::DirectoryNotFound`] if an intermediate segment is
    ///   missing or not a directory
    /// - [`BackendError::EntryNotFound`] if the final segment is missing
    /// - any store error while fetching intermediate sub-trees
    pub fn find_entry(&self, store: &dyn ObjectStore, path: &str) -> Result<TreeEntry, BackendError> {
        let (parent, name) = path::split_parent(path);
        let owned;
        let dir = match parent {
            None => self,
            Some(parent) => {
                owned = self.descend(store, parent, path)?;
                &owned
            }
        };
        dir.entry(name)
            .cloned()
            .ok_or_else(|| BackendError::EntryNotFound {
                path: path.to_string(),
            })
    }

    fn descend(&self, store: &dyn ObjectStore, dirs: &str, path: &str) -> Result<Tree, BackendError> {
        let mut current: Option<Tree> = None;
        for segment in dirs.split('/') {
            let tree = current.as_ref().unwrap_or(self);
            let entry = match tree.entry(segment) {
                Some(entry) if entry.kind.is_dir() => entry,
                _ => {
                    return Err(BackendError::DirectoryNotFound {
                        path: path.to_string(),
                    })
                }
            };
            let next = store.find_tree(&entry.id)?;
            current = Some(next);
        }
        Ok(current.unwrap_or_else(|| self.clone()))
    }

    /// Size in bytes of the blob at `path`.
    ///
    /// # Errors
    ///
    /// Fails like [`Tree::find_entry`], and with
    /// [`BackendError::WrongObjectType`] if the path names a directory or
    /// submodule.
    pub fn size_of_path(&self, store: &dyn ObjectStore, path: &str) -> Result<u64, BackendError> {
        let entry = self.find_entry(store, path)?;
        if matches!(entry.kind, EntryKind::Directory | EntryKind::Submodule) {
            return Err(BackendError::WrongObjectType {
                id: entry.id.to_string(),
                expected: "blob",
            });
        }
        store.blob_size(&entry.id)
    }
}

/// A commit object, reduced to what a file system view needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The commit id
    pub id: ObjectId,
    /// Id of the root tree
    pub tree_id: ObjectId,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::Utc>,
}

impl Commit {
    /// Fetch the commit's root tree.
    pub fn tree(&self, store: &dyn ObjectStore) -> Result<Tree, BackendError> {
        store.find_tree(&self.tree_id)
    }
}

/// Read access to blobs and trees by content id.
///
/// Shared read-only by every handle of a file system.
pub trait ObjectStore: Send + Sync {
    /// Fetch a blob.
    ///
    /// # Errors
    ///
    /// - [`BackendError::ObjectNotFound`] if no blob has this id
    fn find_blob(&self, id: &ObjectId) -> Result<Blob, BackendError>;

    /// Fetch a tree.
    ///
    /// # Errors
    ///
    /// - [`BackendError::ObjectNotFound`] if no tree has this id
    fn find_tree(&self, id: &ObjectId) -> Result<Tree, BackendError>;

    /// Size of a blob without necessarily loading its contents.
    fn blob_size(&self, id: &ObjectId) -> Result<u64, BackendError> {
        self.find_blob(id).map(|blob| blob.size())
    }
}

/// A full repository: an object store plus revision and commit lookup.
pub trait RepositoryBackend: ObjectStore {
    /// Human readable location (remote URL or path) for error messages.
    fn location(&self) -> &str;

    /// Resolve a revision specifier (`HEAD`, branch, tag, refname or full
    /// commit id) to the id of a commit.
    fn resolve_revision(&self, revision: &str) -> Result<ObjectId, BackendError>;

    /// Fetch a commit.
    fn find_commit(&self, id: &ObjectId) -> Result<Commit, BackendError>;
}
