//! gitrepofs - read-only file system access to git commit trees
//!
//! gitrepofs clones a remote repository, resolves a revision to a commit and
//! exposes the commit's tree as a read-only file system. A small helper
//! finds the latest released version tagged in a remote.
//!
//! # Architecture
//!
//! - [`fs`] - File system view: open, read, list and stat
//! - [`git`] - Backend seam: object store, revisions, remote listing
//! - [`version`] - Latest-version selection over remote tags
//! - [`core`] - Strong types, paths, cancellation and configuration
//!
//! # Example
//!
//! ```no_run
//! use gitrepofs::core::context::FetchContext;
//! use gitrepofs::fs::GitFs;
//!
//! let ctx = FetchContext::background();
//! let fs = GitFs::for_revision(&ctx, "https://github.com/example/repo.git", "HEAD").unwrap();
//! let readme = fs.read_file("README").unwrap();
//! println!("{}", String::from_utf8_lossy(&readme));
//! ```
//!
//! # Invariants
//!
//! 1. Nothing is ever written to the viewed repository
//! 2. Every object of one file system reports the same modification time
//! 3. Errors report paths exactly as the caller gave them

pub mod core;
pub mod fs;
pub mod git;
pub mod version;

pub use crate::fs::{GitFs, Handle, Node};
pub use crate::version::{latest_release_tag, PrefixedTagMatcher, Release};
