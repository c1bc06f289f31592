//! Integration tests for latest-version selection against real remotes.

use std::path::Path;
use std::process::Command;

use gitrepofs::core::context::FetchContext;
use gitrepofs::git::{GitRemoteLister, RefKind, ReferenceLister};
use gitrepofs::version::{
    latest_release_tag, latest_release_tag_with, PrefixedTagMatcher, Release, VersionError,
};
use tempfile::TempDir;

fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// A repository tagged `v1.0`, `v1.1.1`, `libfoo-2.0`, `libfoo-v2.1` and
/// `nightly`.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path();

        run_git(path, &["init", "-q"]);
        run_git(path, &["checkout", "-q", "-b", "master"]);
        run_git(path, &["config", "user.email", "brian@palace.example"]);
        run_git(path, &["config", "user.name", "Brian"]);
        run_git(path, &["config", "tag.gpgsign", "false"]);

        std::fs::write(path.join("README"), "first\n").unwrap();
        run_git(path, &["add", "README"]);
        run_git(path, &["commit", "-q", "-m", "first"]);
        run_git(path, &["tag", "v1.0"]);
        run_git(path, &["tag", "libfoo-2.0"]);

        std::fs::write(path.join("README"), "second\n").unwrap();
        run_git(path, &["commit", "-q", "-am", "second"]);
        run_git(path, &["tag", "-a", "v1.1.1", "-m", "release"]);
        run_git(path, &["tag", "libfoo-v2.1"]);
        run_git(path, &["tag", "nightly"]);

        Self { dir }
    }

    fn url(&self) -> String {
        self.dir.path().display().to_string()
    }
}

#[test]
fn finds_latest_and_greatest_version() {
    let repo = TestRepo::new();
    let release = latest_release_tag(
        &FetchContext::background(),
        &repo.url(),
        &PrefixedTagMatcher::semver().unwrap(),
    )
    .unwrap();
    assert_eq!(
        release,
        Release {
            version: "v1.1.1".to_string(),
            reference: "refs/tags/v1.1.1".to_string(),
        }
    );
}

#[test]
fn honours_tag_prefix() {
    let repo = TestRepo::new();
    let release = latest_release_tag(
        &FetchContext::background(),
        &repo.url(),
        &PrefixedTagMatcher::new("libfoo-").unwrap(),
    )
    .unwrap();
    assert_eq!(release.version, "v2.1");
    assert_eq!(release.reference, "refs/tags/libfoo-v2.1");
}

#[test]
fn reports_missing_match() {
    let repo = TestRepo::new();
    let never = |_: &str| -> Option<String> { None };
    let err = latest_release_tag(&FetchContext::background(), &repo.url(), &never).unwrap_err();
    assert!(matches!(err, VersionError::NoMatch { .. }));
}

#[test]
fn reports_unlistable_remote() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope").display().to_string();
    let err = latest_release_tag(
        &FetchContext::background(),
        &missing,
        &PrefixedTagMatcher::semver().unwrap(),
    )
    .unwrap_err();
    match err {
        VersionError::ListReferences { remote_url, .. } => assert_eq!(remote_url, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn lister_marks_head_symbolic() {
    let repo = TestRepo::new();
    let refs = GitRemoteLister::new(false)
        .list_references(&FetchContext::background(), &repo.url())
        .unwrap();

    let head = refs.iter().find(|r| r.name == "HEAD").unwrap();
    assert_eq!(head.kind, RefKind::Symbolic);
    let tag = refs.iter().find(|r| r.name == "refs/tags/v1.0").unwrap();
    assert_eq!(tag.kind, RefKind::Direct);
    assert!(tag.target.is_some());
}

#[test]
fn cancelled_listing() {
    let repo = TestRepo::new();
    let ctx = FetchContext::background();
    ctx.cancel_token().cancel();
    let err = latest_release_tag_with(
        &GitRemoteLister::default(),
        &ctx,
        &repo.url(),
        &PrefixedTagMatcher::semver().unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, VersionError::Cancelled { .. }));
}
