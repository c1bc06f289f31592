//! version
//!
//! Finding the latest released version tagged in a remote repository.
//!
//! A [`VersionMatcher`] turns reference names into version strings, or
//! rejects them. [`latest_release_tag`] lists the references of a remote,
//! runs the matcher over every direct reference and keeps the highest
//! version by semantic version precedence, see [`semver`].
//!
//! # Example
//!
//! ```no_run
//! use gitrepofs::core::context::FetchContext;
//! use gitrepofs::version::{latest_release_tag, PrefixedTagMatcher};
//!
//! let matcher = PrefixedTagMatcher::new("libfoo-").unwrap();
//! let release = latest_release_tag(
//!     &FetchContext::background(),
//!     "https://example.com/libfoo.git",
//!     &matcher,
//! )
//! .unwrap();
//! println!("{} at {}", release.version, release.reference);
//! ```

pub mod semver;

use std::cmp::Ordering;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::core::context::FetchContext;
use crate::git::{BackendError, GitRemoteLister, RefKind, ReferenceLister, RemoteRef};

/// Errors from version selection.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The remote's references could not be listed.
    #[error("cannot list references in remote repository '{remote_url}': {source}")]
    ListReferences {
        remote_url: String,
        #[source]
        source: BackendError,
    },

    /// No reference yielded a valid version.
    #[error("no matching version reference in remote repository '{remote_url}'")]
    NoMatch { remote_url: String },

    /// Listing was cancelled or ran past its deadline.
    #[error("listing references in remote repository '{remote_url}' was cancelled")]
    Cancelled { remote_url: String },

    /// The tag pattern could not be compiled.
    #[error("invalid tag pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Extracts a version string from a reference name.
///
/// `None` or an empty string means the reference is not a version.
pub trait VersionMatcher {
    fn version_of(&self, refname: &str) -> Option<String>;
}

impl<F> VersionMatcher for F
where
    F: Fn(&str) -> Option<String>,
{
    fn version_of(&self, refname: &str) -> Option<String> {
        self(refname)
    }
}

/// Matches tags of the form `refs/tags/<prefix>[v]MAJOR[.MINOR[.PATCH]]`.
///
/// The prefix is matched literally. Versions are reported with a leading
/// `v` whether or not the tag carries one.
///
/// # Example
///
/// ```
/// use gitrepofs::version::{PrefixedTagMatcher, VersionMatcher};
///
/// let matcher = PrefixedTagMatcher::new("libfoo-").unwrap();
/// assert_eq!(matcher.version_of("refs/tags/libfoo-1.2").as_deref(), Some("v1.2"));
/// assert_eq!(matcher.version_of("refs/tags/libfoo1.2"), None);
/// assert_eq!(matcher.version_of("refs/heads/libfoo-v1.2.3"), None);
/// ```
#[derive(Debug, Clone)]
pub struct PrefixedTagMatcher {
    pattern: Regex,
}

impl PrefixedTagMatcher {
    /// Create a matcher for tags starting with `prefix`.
    pub fn new(prefix: &str) -> Result<Self, VersionError> {
        let pattern = Regex::new(&format!(
            r"^refs/tags/{}(v?[0-9]+(?:\.[0-9]+(?:\.[0-9]+)?)?)$",
            regex::escape(prefix)
        ))?;
        Ok(Self { pattern })
    }

    /// Create a matcher for plain version tags like `v1.2.3` or `1.2`.
    pub fn semver() -> Result<Self, VersionError> {
        Self::new("")
    }
}

impl VersionMatcher for PrefixedTagMatcher {
    fn version_of(&self, refname: &str) -> Option<String> {
        let version = self.pattern.captures(refname)?.get(1)?.as_str();
        Some(normalize(version))
    }
}

/// A selected version together with the reference it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Version string, always with a leading `v`
    pub version: String,
    /// Full reference name, e.g. `refs/tags/v1.1.1`
    pub reference: String,
}

fn normalize(version: &str) -> String {
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{}", version)
    }
}

/// Pick the highest version among the direct references in `refs`.
///
/// Symbolic references are skipped. Versions that are not valid semantic
/// versions never win. On equal precedence the earlier reference is kept.
pub fn select_latest<M>(refs: &[RemoteRef], matcher: &M) -> Option<Release>
where
    M: VersionMatcher + ?Sized,
{
    let mut latest: Option<Release> = None;
    for reference in refs.iter().filter(|r| r.kind == RefKind::Direct) {
        let Some(version) = matcher
            .version_of(&reference.name)
            .filter(|v| !v.is_empty())
            .map(|v| normalize(&v))
        else {
            continue;
        };
        let current = latest.as_ref().map_or("", |l| l.version.as_str());
        if semver::compare(&version, current) != Ordering::Greater {
            continue;
        }
        latest = Some(Release {
            version,
            reference: reference.name.clone(),
        });
    }
    latest
}

/// Find the latest version tagged in `remote_url`.
///
/// # Errors
///
/// - [`VersionError::Cancelled`] if `ctx` is cancelled or expires
/// - [`VersionError::ListReferences`] if the remote cannot be listed
/// - [`VersionError::NoMatch`] if no reference yields a valid version
pub fn latest_release_tag<M>(
    ctx: &FetchContext,
    remote_url: &str,
    matcher: &M,
) -> Result<Release, VersionError>
where
    M: VersionMatcher + ?Sized,
{
    latest_release_tag_with(&GitRemoteLister::default(), ctx, remote_url, matcher)
}

/// Like [`latest_release_tag`], listing references through `lister`.
pub fn latest_release_tag_with<L, M>(
    lister: &L,
    ctx: &FetchContext,
    remote_url: &str,
    matcher: &M,
) -> Result<Release, VersionError>
where
    L: ReferenceLister + ?Sized,
    M: VersionMatcher + ?Sized,
{
    let refs = lister
        .list_references(ctx, remote_url)
        .map_err(|e| match e {
            BackendError::Cancelled => VersionError::Cancelled {
                remote_url: remote_url.to_string(),
            },
            source => VersionError::ListReferences {
                remote_url: remote_url.to_string(),
                source,
            },
        })?;
    debug!(remote_url, count = refs.len(), "listed remote references");

    let release = select_latest(&refs, matcher).ok_or_else(|| VersionError::NoMatch {
        remote_url: remote_url.to_string(),
    })?;
    debug!(
        remote_url,
        version = %release.version,
        reference = %release.reference,
        "selected latest version"
    );
    Ok(release)
}
