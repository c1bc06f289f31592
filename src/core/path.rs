//! core::path
//!
//! Logical path rules for the read-only file system view.
//!
//! Paths are unrooted, slash-separated sequences of segments like `x/y/z`.
//! The root directory on its own is named `.`. Apart from that single
//! case, neither `.` nor `..` segments are allowed, and empty segments
//! (leading, trailing or doubled slashes, or the empty path) are rejected.
//! Backslashes carry no meaning and are ordinary segment characters.

/// The name of the root directory.
pub const ROOT: &str = ".";

/// Report whether `name` is a valid logical path.
///
/// # Example
///
/// ```
/// use gitrepofs::core::path::valid_path;
///
/// assert!(valid_path("."));
/// assert!(valid_path("folder/subfolder/canary.txt"));
/// assert!(!valid_path(""));
/// assert!(!valid_path("/a/b"));
/// assert!(!valid_path("a//b"));
/// assert!(!valid_path("a/../b"));
/// ```
pub fn valid_path(name: &str) -> bool {
    if name == ROOT {
        return true;
    }
    name.split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// The final segment of a valid path; `.` for the root.
pub fn base_name(name: &str) -> &str {
    match name.rsplit_once('/') {
        Some((_, last)) => last,
        None => name,
    }
}

/// Split a valid, non-root path into its parent and final segment.
pub(crate) fn split_parent(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('/') {
        Some((parent, last)) => (Some(parent), last),
        None => (None, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod valid_path {
        use super::*;

        #[test]
        fn root_is_valid() {
            assert!(valid_path("."));
        }

        #[test]
        fn relative_paths_are_valid() {
            assert!(valid_path("README"));
            assert!(valid_path("folder/subfolder"));
            assert!(valid_path("folder/subfolder/canary.txt"));
            assert!(valid_path(".hidden"));
            assert!(valid_path("a/...b"));
            assert!(valid_path(r"back\slash"));
        }

        #[test]
        fn empty_rejected() {
            assert!(!valid_path(""));
        }

        #[test]
        fn rooted_rejected() {
            assert!(!valid_path("/"));
            assert!(!valid_path("/a/b"));
        }

        #[test]
        fn trailing_and_doubled_slashes_rejected() {
            assert!(!valid_path("a/"));
            assert!(!valid_path("a//b"));
            assert!(!valid_path("./"));
        }

        #[test]
        fn dot_segments_rejected() {
            assert!(!valid_path("./a"));
            assert!(!valid_path("a/."));
            assert!(!valid_path(".."));
            assert!(!valid_path("a/../b"));
        }
    }

    #[test]
    fn base_name_of_paths() {
        assert_eq!(base_name("."), ".");
        assert_eq!(base_name("README"), "README");
        assert_eq!(base_name("folder/subfolder"), "subfolder");
    }

    #[test]
    fn split_parent_of_paths() {
        assert_eq!(split_parent("README"), (None, "README"));
        assert_eq!(split_parent("a/b/c"), (Some("a/b"), "c"));
    }
}
