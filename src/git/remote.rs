//! git::remote
//!
//! Listing the references advertised by a remote repository, the
//! equivalent of `git ls-remote`. No objects are transferred.

use tracing::debug;

use super::BackendError;
use crate::core::context::FetchContext;
use crate::core::types::ObjectId;

/// Whether a reference points at an object or at another reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Points directly at an object id.
    Direct,
    /// Points at another reference, like `HEAD -> refs/heads/main`.
    Symbolic,
}

/// One reference advertised by a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    /// Full reference name, e.g. `refs/tags/v1.0`
    pub name: String,
    /// Direct or symbolic
    pub kind: RefKind,
    /// Object the reference resolves to, if advertised
    pub target: Option<ObjectId>,
}

impl RemoteRef {
    /// A direct reference to `target`.
    pub fn direct(name: impl Into<String>, target: ObjectId) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Direct,
            target: Some(target),
        }
    }

    /// A symbolic reference.
    pub fn symbolic(name: impl Into<String>, target: Option<ObjectId>) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Symbolic,
            target,
        }
    }
}

/// Something that can list the references of a remote repository.
pub trait ReferenceLister {
    /// List all references advertised by `remote_url`.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Cancelled`] if `ctx` is done before or during listing
    /// - [`BackendError::Internal`] for transport failures
    fn list_references(
        &self,
        ctx: &FetchContext,
        remote_url: &str,
    ) -> Result<Vec<RemoteRef>, BackendError>;
}

/// Lists remote references through libgit2.
#[derive(Debug, Clone)]
pub struct GitRemoteLister {
    proxy_auto: bool,
}

impl GitRemoteLister {
    /// Create a lister, optionally with proxy auto-detection.
    pub fn new(proxy_auto: bool) -> Self {
        Self { proxy_auto }
    }
}

impl Default for GitRemoteLister {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReferenceLister for GitRemoteLister {
    fn list_references(
        &self,
        ctx: &FetchContext,
        remote_url: &str,
    ) -> Result<Vec<RemoteRef>, BackendError> {
        if ctx.is_done() {
            return Err(BackendError::Cancelled);
        }

        let mut remote = git2::Remote::create_detached(remote_url).map_err(|e| {
            BackendError::Internal {
                message: format!("{}: {}", remote_url, e.message()),
            }
        })?;

        let mut callbacks = git2::RemoteCallbacks::new();
        let sideband_ctx = ctx.clone();
        callbacks.sideband_progress(move |_| !sideband_ctx.is_done());

        let proxy = if self.proxy_auto {
            let mut proxy = git2::ProxyOptions::new();
            proxy.auto();
            Some(proxy)
        } else {
            None
        };

        let connection = remote
            .connect_auth(git2::Direction::Fetch, Some(callbacks), proxy)
            .map_err(|e| {
                if ctx.is_done() {
                    BackendError::Cancelled
                } else {
                    BackendError::Internal {
                        message: format!("{}: {}", remote_url, e.message()),
                    }
                }
            })?;

        let heads = connection.list().map_err(|e| BackendError::Internal {
            message: format!("{}: {}", remote_url, e.message()),
        })?;

        let mut refs = Vec::with_capacity(heads.len());
        for head in heads {
            let target = ObjectId::new(head.oid().to_string()).ok();
            let reference = match head.symref_target() {
                Some(_) => RemoteRef::symbolic(head.name(), target),
                None => RemoteRef {
                    name: head.name().to_string(),
                    kind: RefKind::Direct,
                    target,
                },
            };
            refs.push(reference);
        }

        if ctx.is_done() {
            return Err(BackendError::Cancelled);
        }
        debug!(remote_url, count = refs.len(), "listed remote references");
        Ok(refs)
    }
}
