//! fs::error
//!
//! Error types of the file system layer.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::git::BackendError;

/// Why a path operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathErrorKind {
    /// Malformed path, or an entry that is neither file nor directory.
    Invalid,
    /// Missing path segment, or an object missing from the store.
    NotFound,
    /// A directory operation on a file.
    NotADirectory,
    /// A file operation on a directory.
    IsADirectory,
}

impl fmt::Display for PathErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PathErrorKind::Invalid => "invalid argument",
            PathErrorKind::NotFound => "file does not exist",
            PathErrorKind::NotADirectory => "not a directory",
            PathErrorKind::IsADirectory => "is a directory",
        };
        f.write_str(text)
    }
}

impl From<PathErrorKind> for io::ErrorKind {
    fn from(kind: PathErrorKind) -> Self {
        match kind {
            PathErrorKind::Invalid => io::ErrorKind::InvalidInput,
            PathErrorKind::NotFound => io::ErrorKind::NotFound,
            PathErrorKind::NotADirectory | PathErrorKind::IsADirectory => io::ErrorKind::Other,
        }
    }
}

/// A failed operation on a path, carrying the operation name and the path
/// exactly as the caller gave it.
///
/// # Example
///
/// ```
/// use gitrepofs::fs::{PathError, PathErrorKind};
///
/// let err = PathError::new("open", "/a/b", PathErrorKind::Invalid);
/// assert_eq!(err.to_string(), "open /a/b: invalid argument");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{op} {path}: {kind}")]
pub struct PathError {
    /// Operation name, e.g. `"open"`
    pub op: &'static str,
    /// The path as given by the caller
    pub path: String,
    /// What went wrong
    pub kind: PathErrorKind,
}

impl PathError {
    /// Create a path error.
    pub fn new(op: &'static str, path: impl Into<String>, kind: PathErrorKind) -> Self {
        Self {
            op,
            path: path.into(),
            kind,
        }
    }

    pub(crate) fn open(path: &str, kind: PathErrorKind) -> Self {
        Self::new("open", path, kind)
    }
}

impl From<PathError> for io::Error {
    fn from(err: PathError) -> Self {
        io::Error::new(err.kind.into(), err)
    }
}

/// Misuse of an open handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsError {
    /// Listing a directory after it was closed.
    #[error("closed directory")]
    ClosedDirectory,

    /// Reading a file after it was closed.
    #[error("closed file")]
    ClosedFile,
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        io::Error::other(err)
    }
}

/// Errors from constructing a file system for a remote revision.
///
/// Each variant names the step that failed together with the remote and
/// revision involved.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Cloning or fetching the remote failed.
    #[error("cannot clone remote repository '{remote_url}': {source}")]
    Clone {
        remote_url: String,
        #[source]
        source: BackendError,
    },

    /// The revision does not exist in the repository.
    #[error("no such revision '{revision}' in remote repository '{remote_url}'")]
    NoSuchRevision {
        revision: String,
        remote_url: String,
        #[source]
        source: BackendError,
    },

    /// The revision resolved to an id that is not a readable commit.
    #[error("invalid commit for revision '{revision}' in remote repository '{remote_url}'")]
    InvalidCommit {
        revision: String,
        remote_url: String,
        #[source]
        source: BackendError,
    },

    /// The commit's root tree could not be read.
    #[error("invalid tree for revision '{revision}' in remote repository '{remote_url}'")]
    InvalidTree {
        revision: String,
        remote_url: String,
        #[source]
        source: BackendError,
    },

    /// The clone was cancelled or ran past its deadline.
    #[error("cloning remote repository '{remote_url}' was cancelled")]
    Cancelled { remote_url: String },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
