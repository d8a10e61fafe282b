//! Dot-delimited version parsing and comparison
//!
//! Versions are compared as zero-padded tuples of non-negative integers,
//! left to right. This is plain lexicographic ordering, not semver
//! precedence: pre-release and build metadata are not understood, so a
//! segment like `0-beta` coerces to 0.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// One numeric component, stored as its decimal digits without leading zeros.
///
/// An empty digit string represents zero. Keeping the digits instead of a
/// fixed-width integer means there is no upper bound on a component's value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
struct Part(String);

impl Part {
    fn parse(segment: &str) -> Self {
        let segment = segment.trim();
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Part::default();
        }
        Part(segment.trim_start_matches('0').to_string())
    }
}

impl Ord for Part {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Part {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A parsed version string such as `1.2.3`
///
/// Equality follows the ordering, so `1.2` and `1.2.0` are equal.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parts: Vec<Part>,
}

impl Version {
    /// Parse a dot-delimited version. Never fails: non-numeric or empty
    /// segments become 0.
    pub fn parse(version: &str) -> Self {
        Self {
            raw: version.to_string(),
            parts: version.split('.').map(Part::parse).collect(),
        }
    }

    /// The string this version was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let zero = Part::default();
        let len = self.parts.len().max(other.parts.len());

        for i in 0..len {
            let ours = self.parts.get(i).unwrap_or(&zero);
            let theirs = other.parts.get(i).unwrap_or(&zero);
            match ours.cmp(theirs) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }

        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Version {
    fn from(version: &str) -> Self {
        Version::parse(version)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Outcome of comparing the running version against the remote one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatus {
    pub has_update: bool,
    pub current_version: Version,
    pub latest_version: Version,
}

/// Compare the running version with the remote one.
///
/// `has_update` is true only when `remote` is strictly greater than
/// `current` under zero-padded tuple ordering. A current version that is
/// ahead of the remote is reported as no update.
pub fn compare(current: &str, remote: &str) -> UpdateStatus {
    let current_version = Version::parse(current);
    let latest_version = Version::parse(remote);

    UpdateStatus {
        has_update: latest_version > current_version,
        current_version,
        latest_version,
    }
}
