//! version::semver
//!
//! Semantic version precedence for `v`-prefixed version strings.
//!
//! Accepted forms are `vMAJOR`, `vMAJOR.MINOR` and
//! `vMAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`. Missing MINOR and PATCH count
//! as 0. Numbers carry no leading zeros and may be of any length. Build
//! metadata never affects ordering.
//!
//! Strings that do not parse are all equal to each other and order below
//! every valid version.
//!
//! # Example
//!
//! ```
//! use std::cmp::Ordering;
//! use gitrepofs::version::semver::compare;
//!
//! assert_eq!(compare("v1.1.1", "v1.0"), Ordering::Greater);
//! assert_eq!(compare("v1.2", "v1.2.0"), Ordering::Equal);
//! assert_eq!(compare("v2.0.0-rc.1", "v2.0.0"), Ordering::Less);
//! assert_eq!(compare("1.0", "v0.0.1"), Ordering::Less);
//! ```

use std::cmp::Ordering;

/// A parsed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    major: String,
    minor: String,
    patch: String,
    prerelease: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Identifier {
    Numeric(String),
    Alphanumeric(String),
}

impl Version {
    /// Parse a `v`-prefixed version string.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix('v')?;

        let (major, rest) = number(rest)?;
        let Some(rest) = rest.strip_prefix('.') else {
            return rest.is_empty().then(|| Self::release(major, "0", "0"));
        };

        let (minor, rest) = number(rest)?;
        let Some(rest) = rest.strip_prefix('.') else {
            return rest.is_empty().then(|| Self::release(major, minor, "0"));
        };

        let (patch, rest) = number(rest)?;
        let (prerelease, rest) = match rest.strip_prefix('-') {
            Some(tail) => {
                let end = tail.find('+').unwrap_or(tail.len());
                (prerelease(&tail[..end])?, &tail[end..])
            }
            None => (Vec::new(), rest),
        };
        if let Some(build) = rest.strip_prefix('+') {
            if !build.split('.').all(valid_identifier) {
                return None;
            }
        } else if !rest.is_empty() {
            return None;
        }

        Some(Self {
            major: major.to_string(),
            minor: minor.to_string(),
            patch: patch.to_string(),
            prerelease,
        })
    }

    fn release(major: &str, minor: &str, patch: &str) -> Self {
        Self {
            major: major.to_string(),
            minor: minor.to_string(),
            patch: patch.to_string(),
            prerelease: Vec::new(),
        }
    }

    /// True for pre-release versions such as `v1.0.0-rc.1`.
    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_numbers(&self.major, &other.major)
            .then_with(|| compare_numbers(&self.minor, &other.minor))
            .then_with(|| compare_numbers(&self.patch, &other.patch))
            .then_with(|| compare_prereleases(&self.prerelease, &other.prerelease))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// True if `text` is a valid version string.
pub fn is_valid(text: &str) -> bool {
    Version::parse(text).is_some()
}

/// Compare two version strings by precedence.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Split off a leading decimal number without leading zeros.
fn number(text: &str) -> Option<(&str, &str)> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let digits = &text[..end];
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }
    Some((digits, &text[end..]))
}

fn valid_identifier(ident: &str) -> bool {
    !ident.is_empty()
        && ident
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn prerelease(text: &str) -> Option<Vec<Identifier>> {
    text.split('.')
        .map(|ident| {
            if !valid_identifier(ident) {
                None
            } else if ident.chars().all(|c| c.is_ascii_digit()) {
                (ident == "0" || !ident.starts_with('0'))
                    .then(|| Identifier::Numeric(ident.to_string()))
            } else {
                Some(Identifier::Alphanumeric(ident.to_string()))
            }
        })
        .collect()
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_prereleases(a: &[Identifier], b: &[Identifier]) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    for (x, y) in a.iter().zip(b) {
        let order = match (x, y) {
            (Identifier::Numeric(x), Identifier::Numeric(y)) => compare_numbers(x, y),
            (Identifier::Numeric(_), Identifier::Alphanumeric(_)) => Ordering::Less,
            (Identifier::Alphanumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
            (Identifier::Alphanumeric(x), Identifier::Alphanumeric(y)) => x.cmp(y),
        };
        if order != Ordering::Equal {
            return order;
        }
    }
    a.len().cmp(&b.len())
}
