//! core
//!
//! Core types and plumbing shared by the file system and version layers.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ObjectId, EntryKind, TreeEntry
//! - [`path`] - Path validation and splitting
//! - [`context`] - Cancellation and deadlines for network operations
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod context;
pub mod path;
pub mod types;
