//! Lock file / manifest compatibility
//!
//! A lock file is "in sync" when every range the manifest declares is
//! satisfied by the version the lock file recorded for that package.

use crate::manifest::range::{is_semver, parse_version, NpmRange};
use crate::manifest::LockedDependency;
use std::collections::BTreeMap;

/// Check every declared dependency against the locked set.
///
/// Packages that only appear in `locked` are ignored, and an empty
/// `declared` map is trivially satisfied.
pub fn all_satisfied(
    declared: &BTreeMap<String, String>,
    locked: &BTreeMap<String, LockedDependency>,
) -> bool {
    declared.iter().all(|(name, wanted)| {
        locked
            .get(name)
            .and_then(|entry| entry.version.as_deref())
            .is_some_and(|version| version_satisfies(version, wanted))
    })
}

/// Whether a locked version satisfies a declared range.
///
/// References that are not semver at all (git URLs, `github:` shorthands,
/// tarball paths) only match when both sides are the identical string.
pub fn version_satisfies(locked: &str, declared: &str) -> bool {
    if let (Some(version), Some(range)) = (parse_version(locked), NpmRange::parse(declared)) {
        return range.matches(&version);
    }
    !is_semver(locked) && !is_semver(declared) && locked == declared
}
