//! git::interface
//!
//! Repository backend implementation using git2.
//!
//! This module is the only place in the crate that imports `git2` for
//! object access. [`GitBackend`] fetches a remote repository into a
//! private scratch area owned by the backend itself; callers never see or
//! clean up a working directory.
//!
//! # Error Handling
//!
//! git2 errors are normalized into [`BackendError`] variants, keeping the
//! "not found" family distinct so the file system layer can report it as
//! such.
//!
//! # Example
//!
//! ```no_run
//! use gitrepofs::core::config::FetchConfig;
//! use gitrepofs::core::context::FetchContext;
//! use gitrepofs::git::{GitBackend, RepositoryBackend};
//!
//! let backend = GitBackend::clone_remote(
//!     &FetchContext::background(),
//!     "https://example.com/froozle/baduzle.git",
//!     &FetchConfig::default(),
//! )?;
//! let commit = backend.resolve_revision("v1.0")?;
//! println!("v1.0 is at {}", commit.short(7));
//! # Ok::<(), gitrepofs::git::BackendError>(())
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;
use tracing::{debug, info};

use super::{Blob, BackendError, Commit, ObjectStore, RepositoryBackend, Tree};
use crate::core::config::FetchConfig;
use crate::core::context::FetchContext;
use crate::core::types::{EntryKind, ObjectId, TreeEntry};

/// Refspecs mirroring all branches and tags of the remote one to one.
const MIRROR_REFSPECS: [&str; 2] = ["+refs/heads/*:refs/heads/*", "+refs/tags/*:refs/tags/*"];

impl BackendError {
    /// Create a BackendError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => BackendError::ObjectNotFound {
                id: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => BackendError::InvalidObjectId {
                id: context.to_string(),
            },
            git2::ErrorCode::User => BackendError::Cancelled,
            _ => BackendError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

/// A git repository fetched through libgit2.
///
/// The libgit2 repository sits behind a mutex so the backend can be shared
/// between handles as `Send + Sync`.
pub struct GitBackend {
    repo: Mutex<git2::Repository>,
    location: String,
    /// Keeps the clone alive; removed on drop.
    _scratch: Option<TempDir>,
}

impl GitBackend {
    /// Fetch all branches and tags of `remote_url` into a private bare
    /// repository and point its `HEAD` at the remote's default branch.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Cancelled`] if `ctx` is cancelled or expires
    ///   during the transfer
    /// - [`BackendError::Internal`] for transport and storage failures
    pub fn clone_remote(
        ctx: &FetchContext,
        remote_url: &str,
        config: &FetchConfig,
    ) -> Result<Self, BackendError> {
        if ctx.is_done() {
            return Err(BackendError::Cancelled);
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("gitrepofs-");
        let scratch = match &config.scratch_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
        .map_err(|e| BackendError::Internal {
            message: format!("cannot create scratch directory: {}", e),
        })?;

        let repo = git2::Repository::init_bare(scratch.path())
            .map_err(|e| BackendError::from_git2(e, remote_url))?;

        info!(remote_url, scratch = %scratch.path().display(), "fetching remote repository");
        Self::fetch_mirror(&repo, ctx, remote_url, config)?;
        debug!(remote_url, "fetch complete");

        Ok(Self {
            repo: Mutex::new(repo),
            location: remote_url.to_string(),
            _scratch: Some(scratch),
        })
    }

    fn fetch_mirror(
        repo: &git2::Repository,
        ctx: &FetchContext,
        remote_url: &str,
        config: &FetchConfig,
    ) -> Result<(), BackendError> {
        let mut remote = repo
            .remote_anonymous(remote_url)
            .map_err(|e| BackendError::from_git2(e, remote_url))?;

        let mut options = git2::FetchOptions::new();
        options.remote_callbacks(cancellable_callbacks(ctx));
        options.download_tags(git2::AutotagOption::All);
        if config.proxy_auto() {
            let mut proxy = git2::ProxyOptions::new();
            proxy.auto();
            options.proxy_options(proxy);
        }

        remote
            .fetch(&MIRROR_REFSPECS, Some(&mut options), None)
            .map_err(|e| {
                if ctx.is_done() {
                    BackendError::Cancelled
                } else {
                    BackendError::from_git2(e, remote_url)
                }
            })?;

        // The advertised default branch survives the disconnect after fetch.
        match remote.default_branch() {
            Ok(branch) => {
                if let Some(name) = branch.as_str() {
                    repo.set_head(name)
                        .map_err(|e| BackendError::from_git2(e, name))?;
                    debug!(head = name, "HEAD follows remote default branch");
                }
            }
            Err(e) => debug!(error = e.message(), "remote advertises no default branch"),
        }

        Ok(())
    }

    /// Open an existing local repository (bare or not) in place.
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let repo = git2::Repository::open(path).map_err(|e| BackendError::Internal {
            message: format!("not a git repository: {}: {}", path.display(), e.message()),
        })?;
        Ok(Self {
            repo: Mutex::new(repo),
            location: path.display().to_string(),
            _scratch: None,
        })
    }

    fn repo(&self) -> Result<MutexGuard<'_, git2::Repository>, BackendError> {
        self.repo.lock().map_err(|_| BackendError::Internal {
            message: "repository lock poisoned".to_string(),
        })
    }
}

impl std::fmt::Debug for GitBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitBackend")
            .field("location", &self.location)
            .finish()
    }
}

/// Remote callbacks that abort the transfer once `ctx` is done.
fn cancellable_callbacks(ctx: &FetchContext) -> git2::RemoteCallbacks<'static> {
    let mut callbacks = git2::RemoteCallbacks::new();
    let transfer_ctx = ctx.clone();
    callbacks.transfer_progress(move |_| !transfer_ctx.is_done());
    let sideband_ctx = ctx.clone();
    callbacks.sideband_progress(move |_| !sideband_ctx.is_done());
    callbacks
}

fn to_git2_oid(id: &ObjectId) -> Result<git2::Oid, BackendError> {
    git2::Oid::from_str(id.as_str()).map_err(|e| BackendError::from_git2(e, id.as_str()))
}

fn from_git2_oid(oid: git2::Oid) -> Result<ObjectId, BackendError> {
    ObjectId::new(oid.to_string()).map_err(BackendError::from)
}

impl ObjectStore for GitBackend {
    fn find_blob(&self, id: &ObjectId) -> Result<Blob, BackendError> {
        let oid = to_git2_oid(id)?;
        let repo = self.repo()?;
        let blob = repo
            .find_blob(oid)
            .map_err(|e| BackendError::from_git2(e, id.as_str()))?;
        Ok(Blob::new(id.clone(), blob.content()))
    }

    fn find_tree(&self, id: &ObjectId) -> Result<Tree, BackendError> {
        let oid = to_git2_oid(id)?;
        let repo = self.repo()?;
        let tree = repo
            .find_tree(oid)
            .map_err(|e| BackendError::from_git2(e, id.as_str()))?;

        let mut entries = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            entries.push(TreeEntry {
                name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
                kind: EntryKind::from_raw(entry.filemode() as u32),
                id: from_git2_oid(entry.id())?,
            });
        }
        Ok(Tree::new(id.clone(), entries))
    }

    fn blob_size(&self, id: &ObjectId) -> Result<u64, BackendError> {
        let oid = to_git2_oid(id)?;
        let repo = self.repo()?;
        let odb = repo
            .odb()
            .map_err(|e| BackendError::from_git2(e, id.as_str()))?;
        let (size, kind) = odb
            .read_header(oid)
            .map_err(|e| BackendError::from_git2(e, id.as_str()))?;
        if kind != git2::ObjectType::Blob {
            return Err(BackendError::WrongObjectType {
                id: id.to_string(),
                expected: "blob",
            });
        }
        Ok(size as u64)
    }
}

impl RepositoryBackend for GitBackend {
    fn location(&self) -> &str {
        &self.location
    }

    fn resolve_revision(&self, revision: &str) -> Result<ObjectId, BackendError> {
        let repo = self.repo()?;
        let not_found = |_| BackendError::RevisionNotFound {
            revision: revision.to_string(),
        };
        let object = repo.revparse_single(revision).map_err(not_found)?;
        let commit = object.peel_to_commit().map_err(not_found)?;
        debug!(revision, commit = %commit.id(), "resolved revision");
        from_git2_oid(commit.id())
    }

    fn find_commit(&self, id: &ObjectId) -> Result<Commit, BackendError> {
        let oid = to_git2_oid(id)?;
        let repo = self.repo()?;
        let commit = repo
            .find_commit(oid)
            .map_err(|e| BackendError::from_git2(e, id.as_str()))?;

        let author_time = chrono::DateTime::from_timestamp(commit.author().when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH);

        Ok(Commit {
            id: id.clone(),
            tree_id: from_git2_oid(commit.tree_id())?,
            author_time,
        })
    }
}
