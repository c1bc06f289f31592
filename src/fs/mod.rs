//! fs
//!
//! A read-only file system over one git tree.
//!
//! # Overview
//!
//! [`GitFs`] exposes the tree of a single commit through the usual file
//! system verbs: [`GitFs::open`] hands out a [`Node`], which is either a
//! [`File`] streaming blob contents or a [`Directory`] listing sub-tree
//! entries in pages. Every object reports the author time of the commit as
//! its modification time.
//!
//! # Paths
//!
//! Names are relative and `/`-separated. The root is `"."`. Empty names,
//! leading or doubled slashes and `.`/`..` segments are rejected with
//! [`PathErrorKind::Invalid`]. Errors always report the name exactly as
//! given.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use gitrepofs::fs::GitFs;
//! use gitrepofs::git::memory::{MemoryRepository, TreeBuilder};
//!
//! let mut repo = MemoryRepository::new();
//! let tree = TreeBuilder::new()
//!     .file("README", "hello\n")
//!     .file("docs/guide.md", "# Guide\n")
//!     .build(&mut repo);
//! let commit = repo.insert_commit(tree, chrono::DateTime::UNIX_EPOCH);
//! repo.set_ref("refs/heads/main", commit);
//! repo.set_head("refs/heads/main");
//!
//! let fs = GitFs::from_backend(Arc::new(repo), "main").unwrap();
//! assert_eq!(fs.read_file("README").unwrap(), b"hello\n");
//!
//! let names: Vec<String> = fs
//!     .read_dir(".")
//!     .unwrap()
//!     .iter()
//!     .map(|e| e.name().to_string())
//!     .collect();
//! assert_eq!(names, ["README", "docs"]);
//! ```

mod dir_entry;
mod directory;
mod error;
mod file;
mod handle;
mod info;

pub use dir_entry::DirEntry;
pub use directory::{Directory, Listing};
pub use error::{FsError, PathError, PathErrorKind, ResolveError};
pub use file::File;
pub use handle::{Handle, Node};
pub use info::{FileInfo, FileMode, FileType};

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::core::config::{Config, FetchConfig};
use crate::core::context::FetchContext;
use crate::core::path::{self, ROOT};
use crate::core::types::TreeEntry;
use crate::git::{BackendError, GitBackend, ObjectStore, RepositoryBackend, Tree};

/// A read-only view of one git tree.
///
/// Cloning is cheap; clones share the object store and the root tree.
#[derive(Clone)]
pub struct GitFs {
    store: Arc<dyn ObjectStore>,
    tree: Arc<Tree>,
    mtime: DateTime<Utc>,
}

impl GitFs {
    /// Create a file system over `tree`, whose objects are looked up in
    /// `store`. Every file and directory reports `mtime`.
    pub fn new(store: Arc<dyn ObjectStore>, tree: Tree, mtime: DateTime<Utc>) -> Self {
        Self {
            store,
            tree: Arc::new(tree),
            mtime,
        }
    }

    /// Clone `remote_url` and view the tree of `revision`.
    ///
    /// The clone lands in a private scratch directory on disk, below
    /// `fetch.scratch_dir` or the system temporary directory. It is removed
    /// once the returned file system and all handles opened from it are
    /// dropped.
    ///
    /// Fetch settings come from the configuration file, see
    /// [`Config::load`]. `revision` can be `HEAD`, a branch, a tag, a full
    /// reference name or a full commit id.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Config`] if the configuration file is broken
    /// - see [`GitFs::for_revision_with`] for the rest
    pub fn for_revision(
        ctx: &FetchContext,
        remote_url: &str,
        revision: &str,
    ) -> Result<Self, ResolveError> {
        let loaded = Config::load()?;
        for warning in &loaded.warnings {
            warn!(path = %warning.path.display(), "{}", warning.message);
        }
        Self::for_revision_with(ctx, remote_url, revision, &loaded.config.fetch())
    }

    /// Like [`GitFs::for_revision`], with explicit fetch settings.
    ///
    /// The configured timeout, if any, tightens the deadline of `ctx`.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Cancelled`] if `ctx` is cancelled or expires
    ///   while cloning
    /// - [`ResolveError::Clone`] if the remote cannot be cloned
    /// - [`ResolveError::NoSuchRevision`], [`ResolveError::InvalidCommit`]
    ///   and [`ResolveError::InvalidTree`] as for [`GitFs::from_backend`]
    pub fn for_revision_with(
        ctx: &FetchContext,
        remote_url: &str,
        revision: &str,
        config: &FetchConfig,
    ) -> Result<Self, ResolveError> {
        let ctx = match config.timeout() {
            Some(timeout) => ctx.clone().with_timeout(timeout),
            None => ctx.clone(),
        };

        let backend = GitBackend::clone_remote(&ctx, remote_url, config).map_err(|e| match e {
            BackendError::Cancelled => ResolveError::Cancelled {
                remote_url: remote_url.to_string(),
            },
            source => ResolveError::Clone {
                remote_url: remote_url.to_string(),
                source,
            },
        })?;

        Self::from_backend(Arc::new(backend), revision)
    }

    /// View the tree of `revision` in an already available repository.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::NoSuchRevision`] if `revision` does not resolve
    /// - [`ResolveError::InvalidCommit`] if it resolves to no readable commit
    /// - [`ResolveError::InvalidTree`] if the commit's tree is unreadable
    pub fn from_backend<B>(backend: Arc<B>, revision: &str) -> Result<Self, ResolveError>
    where
        B: RepositoryBackend + 'static,
    {
        let remote_url = backend.location().to_string();

        let commit_id =
            backend
                .resolve_revision(revision)
                .map_err(|source| ResolveError::NoSuchRevision {
                    revision: revision.to_string(),
                    remote_url: remote_url.clone(),
                    source,
                })?;
        debug!(revision, commit = %commit_id, "resolved revision");

        let commit = backend
            .find_commit(&commit_id)
            .map_err(|source| ResolveError::InvalidCommit {
                revision: revision.to_string(),
                remote_url: remote_url.clone(),
                source,
            })?;

        let tree = commit
            .tree(backend.as_ref())
            .map_err(|source| ResolveError::InvalidTree {
                revision: revision.to_string(),
                remote_url: remote_url.clone(),
                source,
            })?;

        info!(
            remote_url = %remote_url,
            revision,
            commit = %commit.id.short(12),
            "opened file system"
        );
        Ok(Self::new(backend, tree, commit.author_time))
    }

    /// Modification time reported for every file and directory.
    pub fn mod_time(&self) -> DateTime<Utc> {
        self.mtime
    }

    /// The root tree of this file system.
    pub fn root_tree(&self) -> &Tree {
        &self.tree
    }

    /// Open the named file or directory.
    ///
    /// # Errors
    ///
    /// All errors carry op `"open"` and `name` unchanged:
    ///
    /// - [`PathErrorKind::Invalid`] for malformed names, entries that are
    ///   neither file nor directory (symlinks, submodules) and blobs that
    ///   cannot be streamed
    /// - [`PathErrorKind::NotFound`] for missing paths and objects missing
    ///   from the store
    pub fn open(&self, name: &str) -> Result<Node, PathError> {
        if !path::valid_path(name) {
            return Err(PathError::open(name, PathErrorKind::Invalid));
        }
        if name == ROOT {
            return Ok(Node::Directory(self.root_directory()));
        }

        let entry = self
            .tree
            .find_entry(self.store.as_ref(), name)
            .map_err(|e| {
                debug!(name, error = %e, "entry lookup failed");
                PathError::open(name, PathErrorKind::NotFound)
            })?;

        if entry.kind.is_file() {
            self.open_file(name, entry).map(Node::File)
        } else if entry.kind.is_dir() {
            self.open_dir(name, entry).map(Node::Directory)
        } else {
            Err(PathError::open(name, PathErrorKind::Invalid))
        }
    }

    fn root_directory(&self) -> Directory {
        let info = FileInfo::from_tree(&self.tree, ROOT, self.mtime);
        Directory::new(Arc::clone(&self.store), Arc::clone(&self.tree), info)
    }

    fn open_file(&self, name: &str, entry: TreeEntry) -> Result<File, PathError> {
        let blob = self
            .store
            .find_blob(&entry.id)
            .map_err(|_| PathError::open(name, PathErrorKind::NotFound))?;
        let info = FileInfo::new(entry, blob.size(), self.mtime);
        File::new(info, &blob).ok_or_else(|| PathError::open(name, PathErrorKind::Invalid))
    }

    fn open_dir(&self, name: &str, entry: TreeEntry) -> Result<Directory, PathError> {
        let tree = self
            .store
            .find_tree(&entry.id)
            .map_err(|_| PathError::open(name, PathErrorKind::NotFound))?;
        let info = FileInfo::from_tree(&tree, path::base_name(name), self.mtime);
        Ok(Directory::new(Arc::clone(&self.store), Arc::new(tree), info))
    }

    /// Read the whole named file.
    ///
    /// # Errors
    ///
    /// Path failures arrive as a [`PathError`] inside the [`io::Error`];
    /// a directory reports [`PathErrorKind::IsADirectory`] with op `"read"`.
    pub fn read_file(&self, name: &str) -> io::Result<Vec<u8>> {
        let mut file = match self.open(name)? {
            Node::File(file) => file,
            Node::Directory(_) => {
                return Err(PathError::new("read", name, PathErrorKind::IsADirectory).into());
            }
        };
        let mut contents = Vec::with_capacity(file.stat().size() as usize);
        file.read_to_end(&mut contents)?;
        file.close()?;
        Ok(contents)
    }

    /// List the named directory, sorted by entry name.
    ///
    /// # Errors
    ///
    /// - errors of [`GitFs::open`]
    /// - [`PathErrorKind::NotADirectory`] with op `"readdir"` for files
    pub fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>, PathError> {
        let mut dir = match self.open(name)? {
            Node::Directory(dir) => dir,
            Node::File(_) => {
                return Err(PathError::new("readdir", name, PathErrorKind::NotADirectory));
            }
        };
        // A fresh handle is open, so listing cannot fail.
        let mut entries = dir
            .read_dir(-1)
            .map(Listing::into_entries)
            .unwrap_or_default();
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(entries)
    }

    /// Describe the named file or directory.
    pub fn stat(&self, name: &str) -> Result<FileInfo, PathError> {
        let node = self.open(name)?;
        Ok(node.stat().clone())
    }
}

impl fmt::Debug for GitFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitFs")
            .field("tree", self.tree.id())
            .field("mtime", &self.mtime)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EntryKind;
    use crate::git::memory::{MemoryRepository, TreeBuilder};

    const README: &str = "\"remote\" git repository\n";

    fn mtime() -> DateTime<Utc> {
        DateTime::from_timestamp(1_690_000_000, 0).unwrap()
    }

    fn fixture() -> GitFs {
        let mut repo = MemoryRepository::new();
        let tree = TreeBuilder::new()
            .file("README", README)
            .file("fodder/empty", "")
            .file("folder/subfolder/canary.txt", "chirp!\n")
            .executable("folder/subfolder/schkript.sh", "#!/bin/sh\necho hi\n")
            .entry("link", EntryKind::Symlink, "README")
            .entry("vendor", EntryKind::Submodule, "")
            .dangling("ghost.txt", EntryKind::Regular)
            .dangling("hollow", EntryKind::Directory)
            .unreadable("broken.bin", 42)
            .build(&mut repo);
        let commit = repo.insert_commit(tree, mtime());
        repo.set_ref("refs/heads/master", commit);
        repo.set_head("refs/heads/master");
        GitFs::from_backend(Arc::new(repo), "HEAD").unwrap()
    }

    mod open {
        use super::*;

        fn open_err(fs: &GitFs, name: &str) -> PathError {
            fs.open(name).unwrap_err()
        }

        #[test]
        fn root_lists_top_level() {
            let fs = fixture();
            let mut node = fs.open(".").unwrap();
            assert!(node.is_dir());
            assert_eq!(node.stat().name(), ".");
            assert_eq!(node.stat().mod_time(), mtime());

            let entries = node.read_dir(0).unwrap().unwrap().into_entries();
            assert_eq!(entries.len(), fs.root_tree().len());
        }

        #[test]
        fn regular_file() {
            let fs = fixture();
            let mut node = fs.open("folder/subfolder/canary.txt").unwrap();
            let mut contents = String::new();
            node.read_to_string(&mut contents).unwrap();
            assert!(contents.contains("chirp!"));
            assert_eq!(node.stat().name(), "canary.txt");
            assert_eq!(node.stat().size(), contents.len() as u64);
            node.close().unwrap();
        }

        #[test]
        fn executable_file() {
            let fs = fixture();
            let node = fs.open("folder/subfolder/schkript.sh").unwrap();
            assert_eq!(node.stat().mode().permissions(), 0o755);
        }

        #[test]
        fn sub_directory_named_by_last_segment() {
            let fs = fixture();
            let node = fs.open("folder/subfolder").unwrap();
            assert!(node.is_dir());
            assert_eq!(node.stat().name(), "subfolder");
            assert_eq!(node.stat().size(), 0);
        }

        #[test]
        fn invalid_names_are_reported_verbatim() {
            let fs = fixture();
            for name in ["", "/a/b", "a//b", "a/", "./README", "folder/../README"] {
                let err = open_err(&fs, name);
                assert_eq!(err.kind, PathErrorKind::Invalid, "{:?}", name);
                assert_eq!(err.op, "open");
                assert_eq!(err.path, name);
            }
        }

        #[test]
        fn missing_paths() {
            let fs = fixture();
            for name in ["nope", "folder/folder/canary.txt", "README/child"] {
                let err = open_err(&fs, name);
                assert_eq!(err.kind, PathErrorKind::NotFound, "{:?}", name);
                assert_eq!(err.path, name);
            }
        }

        #[test]
        fn symlinks_and_submodules_are_invalid() {
            let fs = fixture();
            assert_eq!(open_err(&fs, "link").kind, PathErrorKind::Invalid);
            assert_eq!(open_err(&fs, "vendor").kind, PathErrorKind::Invalid);
        }

        #[test]
        fn objects_missing_from_store() {
            let fs = fixture();
            assert_eq!(open_err(&fs, "ghost.txt").kind, PathErrorKind::NotFound);
            assert_eq!(open_err(&fs, "hollow").kind, PathErrorKind::NotFound);
        }

        #[test]
        fn unstreamable_blob_is_invalid() {
            let fs = fixture();
            assert_eq!(open_err(&fs, "broken.bin").kind, PathErrorKind::Invalid);
        }
    }

    mod helpers {
        use super::*;

        #[test]
        fn read_file_returns_contents() {
            let fs = fixture();
            assert_eq!(fs.read_file("README").unwrap(), README.as_bytes());
            assert!(fs.read_file("fodder/empty").unwrap().is_empty());
        }

        #[test]
        fn read_file_on_directory() {
            let fs = fixture();
            let err = fs.read_file("folder").unwrap_err();
            let inner = err
                .get_ref()
                .and_then(|e| e.downcast_ref::<PathError>())
                .unwrap();
            assert_eq!(inner.op, "read");
            assert_eq!(inner.kind, PathErrorKind::IsADirectory);
        }

        #[test]
        fn read_file_on_missing_path() {
            let fs = fixture();
            let err = fs.read_file("missing").unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::NotFound);
        }

        #[test]
        fn read_dir_is_sorted() {
            let fs = fixture();
            let names: Vec<String> = fs
                .read_dir("folder/subfolder")
                .unwrap()
                .iter()
                .map(|e| e.name().to_string())
                .collect();
            assert_eq!(names, ["canary.txt", "schkript.sh"]);

            let root = fs.read_dir(".").unwrap();
            let mut sorted: Vec<&str> = root.iter().map(|e| e.name()).collect();
            sorted.sort();
            assert_eq!(root.iter().map(|e| e.name()).collect::<Vec<_>>(), sorted);
        }

        #[test]
        fn read_dir_on_file() {
            let fs = fixture();
            let err = fs.read_dir("README").unwrap_err();
            assert_eq!(err.op, "readdir");
            assert_eq!(err.kind, PathErrorKind::NotADirectory);
        }

        #[test]
        fn stat_root_and_file() {
            let fs = fixture();
            let root = fs.stat(".").unwrap();
            assert_eq!(root.name(), ".");
            assert!(root.is_dir());
            assert_eq!(root.size(), 0);

            let readme = fs.stat("README").unwrap();
            assert_eq!(readme.size(), README.len() as u64);
            assert_eq!(readme.mod_time(), fs.mod_time());
        }
    }

    mod resolve {
        use super::*;

        fn repo() -> (MemoryRepository, crate::core::types::ObjectId) {
            let mut repo = MemoryRepository::new();
            let tree = TreeBuilder::new().file("a", "1").build(&mut repo);
            let commit = repo.insert_commit(tree, mtime());
            repo.set_ref("refs/tags/v1.0", commit.clone());
            (repo, commit)
        }

        #[test]
        fn unknown_revision() {
            let (repo, _) = repo();
            let err = GitFs::from_backend(Arc::new(repo), "invalidref").unwrap_err();
            match err {
                ResolveError::NoSuchRevision {
                    revision,
                    remote_url,
                    ..
                } => {
                    assert_eq!(revision, "invalidref");
                    assert_eq!(remote_url, "memory");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn tag_and_commit_id() {
            let (repo, commit) = repo();
            let repo = Arc::new(repo);
            let by_tag = GitFs::from_backend(Arc::clone(&repo), "v1.0").unwrap();
            let by_id = GitFs::from_backend(repo, commit.as_str()).unwrap();
            assert_eq!(by_tag.root_tree().id(), by_id.root_tree().id());
            assert_eq!(by_tag.mod_time(), mtime());
        }

        #[test]
        fn missing_tree_is_invalid_tree() {
            let mut repo = MemoryRepository::new();
            let commit = repo.insert_commit(crate::core::types::ObjectId::zero(), mtime());
            repo.set_ref("refs/heads/broken", commit);
            let err = GitFs::from_backend(Arc::new(repo), "broken").unwrap_err();
            assert!(matches!(err, ResolveError::InvalidTree { .. }));
        }

        #[test]
        fn cancelled_clone() {
            let ctx = FetchContext::background();
            ctx.cancel_token().cancel();
            let err = GitFs::for_revision_with(
                &ctx,
                "https://example.invalid/repo.git",
                "HEAD",
                &FetchConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, ResolveError::Cancelled { .. }));
        }

        #[test]
        fn unvalidated_huge_timeout_does_not_panic() {
            let ctx = FetchContext::background();
            ctx.cancel_token().cancel();
            let config = FetchConfig {
                timeout_secs: Some(u64::MAX),
                ..Default::default()
            };
            let err = GitFs::for_revision_with(
                &ctx,
                "https://example.invalid/repo.git",
                "HEAD",
                &config,
            )
            .unwrap_err();
            assert!(matches!(err, ResolveError::Cancelled { .. }));
        }
    }
}
