//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ObjectId`] - Git object identifier (SHA), the content identity of a
//!   blob, tree or commit
//! - [`EntryKind`] - Type/permission class of a tree entry
//! - [`TreeEntry`] - One named entry of a git tree
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use gitrepofs::core::types::{EntryKind, ObjectId};
//!
//! let id = ObjectId::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert_eq!(id.short(7), "abc123d");
//!
//! assert_eq!(EntryKind::from_raw(0o100755), EntryKind::Executable);
//! assert!(ObjectId::new("not-a-sha").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),
}

/// A validated Git object id.
///
/// Accepts SHA-1 (40 hex characters) and SHA-256 (64 hex characters)
/// object ids. Ids are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use gitrepofs::core::types::ObjectId;
///
/// let id = ObjectId::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(id.as_str(), "abc123def4567890abc123def4567890abc12345");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// The zero id (40 zeros for SHA-1).
    const ZERO_SHA1: &'static str = "0000000000000000000000000000000000000000";

    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidObjectId` if the string is not a valid hex id.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into().to_ascii_lowercase();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// The zero/null object id, which never names a stored object.
    pub fn zero() -> Self {
        Self(Self::ZERO_SHA1.to_string())
    }

    /// Check if this is the zero/null object id.
    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| c == '0')
    }

    /// Get an abbreviated form of the id.
    ///
    /// Returns the first `len` characters, or the full id if `len` is larger.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(id: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if id.len() != 40 && id.len() != 64 {
            return Err(TypeError::InvalidObjectId(format!(
                "expected 40 or 64 hex characters, got {}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidObjectId(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a git tree entry, as encoded by its file mode.
///
/// Git only records a handful of modes. Anything else is preserved as
/// [`EntryKind::Unknown`] so that callers can still describe the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular, non-executable file (`100644`).
    Regular,
    /// Executable file (`100755`).
    Executable,
    /// Sub-tree (`040000`).
    Directory,
    /// Symbolic link (`120000`).
    Symlink,
    /// Gitlink to a submodule commit (`160000`).
    Submodule,
    /// Group-writable regular file written by ancient git versions (`100664`).
    Deprecated,
    /// Any other mode, including the empty mode.
    Unknown(u32),
}

impl EntryKind {
    /// Classify a raw git file mode.
    pub fn from_raw(mode: u32) -> Self {
        match mode {
            0o100644 => EntryKind::Regular,
            0o100755 => EntryKind::Executable,
            0o040000 => EntryKind::Directory,
            0o120000 => EntryKind::Symlink,
            0o160000 => EntryKind::Submodule,
            0o100664 => EntryKind::Deprecated,
            other => EntryKind::Unknown(other),
        }
    }

    /// The raw git file mode for this kind.
    pub fn raw(&self) -> u32 {
        match self {
            EntryKind::Regular => 0o100644,
            EntryKind::Executable => 0o100755,
            EntryKind::Directory => 0o040000,
            EntryKind::Symlink => 0o120000,
            EntryKind::Submodule => 0o160000,
            EntryKind::Deprecated => 0o100664,
            EntryKind::Unknown(mode) => *mode,
        }
    }

    /// True for the kinds that can be opened as a readable file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::Regular | EntryKind::Executable)
    }

    /// True for sub-trees.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

/// One entry of a git tree: the final path segment, its kind and the id of
/// the blob or sub-tree it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Final path segment only, never containing a `/`.
    pub name: String,
    /// Kind derived from the entry's file mode.
    pub kind: EntryKind,
    /// Content identity used to fetch the blob or sub-tree.
    pub id: ObjectId,
}

impl TreeEntry {
    /// Create a tree entry.
    pub fn new(name: impl Into<String>, kind: EntryKind, id: ObjectId) -> Self {
        Self {
            name: name.into(),
            kind,
            id,
        }
    }
}
