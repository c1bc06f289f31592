//! git::memory
//!
//! A repository held entirely in memory.
//!
//! Objects are content addressed with SHA-256 over a git-style header and
//! payload, so identical contents share one id just like in git. Trees are
//! kept in git's canonical entry order.
//!
//! # Example
//!
//! ```
//! use gitrepofs::git::memory::{MemoryRepository, TreeBuilder};
//! use gitrepofs::git::RepositoryBackend;
//!
//! let mut repo = MemoryRepository::new();
//! let tree = TreeBuilder::new()
//!     .file("README", "hello")
//!     .executable("bin/run.sh", "#!/bin/sh\n")
//!     .build(&mut repo);
//! let commit = repo.insert_commit(tree, chrono::DateTime::UNIX_EPOCH);
//! repo.set_ref("refs/tags/v1.0", commit.clone());
//!
//! assert_eq!(repo.resolve_revision("v1.0").unwrap(), commit);
//! ```

use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};

use super::remote::{RefKind, ReferenceLister, RemoteRef};
use super::{BackendError, Blob, Commit, ObjectStore, RepositoryBackend, Tree};
use crate::core::context::FetchContext;
use crate::core::types::{EntryKind, ObjectId, TreeEntry};

/// Prefixes tried, in order, when resolving a short revision name.
const REVISION_PREFIXES: [&str; 4] = ["", "refs/", "refs/tags/", "refs/heads/"];

/// An in-memory repository implementing every backend trait.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    blobs: HashMap<ObjectId, Blob>,
    trees: HashMap<ObjectId, Tree>,
    commits: HashMap<ObjectId, Commit>,
    refs: BTreeMap<String, ObjectId>,
    head: Option<String>,
}

fn content_id(kind: &str, payload: &[u8]) -> ObjectId {
    let mut hasher = Sha256::new();
    hasher.update(format!("{} {}\0", kind, payload.len()).as_bytes());
    hasher.update(payload);
    // A hex SHA-256 digest is always a valid 64 character id.
    ObjectId::new(hex::encode(hasher.finalize())).unwrap_or_else(|_| ObjectId::zero())
}

/// Git orders tree entries by name, comparing directories as if their
/// name had a trailing slash.
fn git_order_key(entry: &TreeEntry) -> Vec<u8> {
    let mut key = entry.name.as_bytes().to_vec();
    if entry.kind.is_dir() {
        key.push(b'/');
    }
    key
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a blob and return its id.
    pub fn insert_blob(&mut self, contents: impl AsRef<[u8]>) -> ObjectId {
        let contents = contents.as_ref();
        let id = content_id("blob", contents);
        self.blobs
            .entry(id.clone())
            .or_insert_with(|| Blob::new(id.clone(), contents));
        id
    }

    /// Store a blob of `size` bytes whose contents cannot be streamed.
    pub fn insert_unreadable_blob(&mut self, size: u64, reason: &str) -> ObjectId {
        let id = content_id("unreadable", format!("{}:{}", size, reason).as_bytes());
        self.blobs
            .insert(id.clone(), Blob::unreadable(id.clone(), size, reason));
        id
    }

    /// Store a tree, sorting its entries into git order, and return its id.
    pub fn insert_tree(&mut self, mut entries: Vec<TreeEntry>) -> ObjectId {
        entries.sort_by_key(git_order_key);

        let mut payload = Vec::new();
        for entry in &entries {
            payload.extend_from_slice(format!("{:o} {}\0", entry.kind.raw(), entry.name).as_bytes());
            payload.extend_from_slice(entry.id.as_str().as_bytes());
        }
        let id = content_id("tree", &payload);
        self.trees
            .entry(id.clone())
            .or_insert_with(|| Tree::new(id.clone(), entries));
        id
    }

    /// Store a commit of `tree` authored at `author_time`.
    pub fn insert_commit(
        &mut self,
        tree: ObjectId,
        author_time: chrono::DateTime<chrono::Utc>,
    ) -> ObjectId {
        let payload = format!(
            "tree {}\nauthor {}\nparents {}\n",
            tree,
            author_time.timestamp(),
            self.commits.len()
        );
        let id = content_id("commit", payload.as_bytes());
        self.commits.insert(
            id.clone(),
            Commit {
                id: id.clone(),
                tree_id: tree,
                author_time,
            },
        );
        id
    }

    /// Create or move a reference, e.g. `refs/tags/v1.0`.
    pub fn set_ref(&mut self, name: impl Into<String>, target: ObjectId) {
        self.refs.insert(name.into(), target);
    }

    /// Point `HEAD` at the reference `name`.
    pub fn set_head(&mut self, name: impl Into<String>) {
        self.head = Some(name.into());
    }

    fn lookup_ref(&self, name: &str) -> Option<&ObjectId> {
        REVISION_PREFIXES
            .iter()
            .find_map(|prefix| self.refs.get(&format!("{}{}", prefix, name)))
    }
}

impl ObjectStore for MemoryRepository {
    fn find_blob(&self, id: &ObjectId) -> Result<Blob, BackendError> {
        self.blobs
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::ObjectNotFound { id: id.to_string() })
    }

    fn find_tree(&self, id: &ObjectId) -> Result<Tree, BackendError> {
        self.trees
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::ObjectNotFound { id: id.to_string() })
    }
}

impl RepositoryBackend for MemoryRepository {
    fn location(&self) -> &str {
        "memory"
    }

    fn resolve_revision(&self, revision: &str) -> Result<ObjectId, BackendError> {
        let not_found = || BackendError::RevisionNotFound {
            revision: revision.to_string(),
        };

        let target = if revision == "HEAD" {
            self.head
                .as_deref()
                .and_then(|head| self.refs.get(head))
                .cloned()
        } else {
            self.lookup_ref(revision).cloned().or_else(|| {
                ObjectId::new(revision)
                    .ok()
                    .filter(|id| self.commits.contains_key(id))
            })
        };

        target.ok_or_else(not_found)
    }

    fn find_commit(&self, id: &ObjectId) -> Result<Commit, BackendError> {
        self.commits
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::ObjectNotFound { id: id.to_string() })
    }
}

impl ReferenceLister for MemoryRepository {
    fn list_references(
        &self,
        ctx: &FetchContext,
        _remote_url: &str,
    ) -> Result<Vec<RemoteRef>, BackendError> {
        if ctx.is_done() {
            return Err(BackendError::Cancelled);
        }
        let mut refs = Vec::with_capacity(self.refs.len() + 1);
        if let Some(head) = &self.head {
            refs.push(RemoteRef {
                name: "HEAD".to_string(),
                kind: RefKind::Symbolic,
                target: self.refs.get(head).cloned(),
            });
        }
        refs.extend(
            self.refs
                .iter()
                .map(|(name, id)| RemoteRef::direct(name.clone(), id.clone())),
        );
        Ok(refs)
    }
}

enum Content {
    Bytes(Vec<u8>),
    Unreadable(u64),
    Dangling,
}

/// Assembles nested trees from slash-separated file paths.
///
/// Intermediate directories are created implicitly, so, as in git, there
/// are no empty directories.
#[derive(Default)]
pub struct TreeBuilder {
    files: Vec<(String, EntryKind, Content)>,
}

impl TreeBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular file.
    pub fn file(self, path: &str, contents: impl AsRef<[u8]>) -> Self {
        self.entry(path, EntryKind::Regular, contents)
    }

    /// Add an executable file.
    pub fn executable(self, path: &str, contents: impl AsRef<[u8]>) -> Self {
        self.entry(path, EntryKind::Executable, contents)
    }

    /// Add a blob-backed entry of any kind (symlinks store their target).
    pub fn entry(mut self, path: &str, kind: EntryKind, contents: impl AsRef<[u8]>) -> Self {
        self.files.push((
            path.to_string(),
            kind,
            Content::Bytes(contents.as_ref().to_vec()),
        ));
        self
    }

    /// Add a file whose blob exists but cannot be streamed.
    pub fn unreadable(mut self, path: &str, size: u64) -> Self {
        self.files
            .push((path.to_string(), EntryKind::Regular, Content::Unreadable(size)));
        self
    }

    /// Add an entry whose object is missing from the store.
    pub fn dangling(mut self, path: &str, kind: EntryKind) -> Self {
        self.files.push((path.to_string(), kind, Content::Dangling));
        self
    }

    /// Write all trees and blobs into `repo`, returning the root tree id.
    pub fn build(self, repo: &mut MemoryRepository) -> ObjectId {
        let files = self
            .files
            .into_iter()
            .map(|(path, kind, content)| {
                let segments = path.split('/').map(str::to_string).collect();
                (segments, kind, content)
            })
            .collect();
        write_level(repo, files)
    }
}

fn write_level(
    repo: &mut MemoryRepository,
    files: Vec<(Vec<String>, EntryKind, Content)>,
) -> ObjectId {
    let mut entries = Vec::new();
    let mut dirs: BTreeMap<String, Vec<(Vec<String>, EntryKind, Content)>> = BTreeMap::new();

    for (mut segments, kind, content) in files {
        let name = segments.remove(0);
        if !segments.is_empty() {
            dirs.entry(name).or_default().push((segments, kind, content));
            continue;
        }
        let id = match content {
            Content::Bytes(bytes) => repo.insert_blob(bytes),
            Content::Unreadable(size) => repo.insert_unreadable_blob(size, "simulated read failure"),
            Content::Dangling => content_id("dangling", name.as_bytes()),
        };
        entries.push(TreeEntry::new(name, kind, id));
    }

    for (name, children) in dirs {
        let id = write_level(repo, children);
        entries.push(TreeEntry::new(name, EntryKind::Directory, id));
    }

    repo.insert_tree(entries)
}
