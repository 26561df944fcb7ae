//! Install strategies and the fallback plan

use std::fmt;

/// One way of asking the package manager to populate the dependency directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStrategy {
    /// Strict install that honours the lock file exactly (`npm ci`)
    Clean,
    /// Install from the manifest alone, leaving the lock file untouched
    IgnoreLock,
    /// Regular install; may rewrite the lock file
    Plain,
}

impl InstallStrategy {
    /// Package manager arguments for this strategy
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            Self::Clean => &["ci"],
            Self::IgnoreLock => &["install", "--no-package-lock"],
            Self::Plain => &["install"],
        }
    }

    /// Whether a successful run may have changed the lock file on disk
    pub fn rewrites_lockfile(&self) -> bool {
        matches!(self, Self::Plain)
    }
}

impl fmt::Display for InstallStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clean => "clean",
            Self::IgnoreLock => "ignore-lock",
            Self::Plain => "plain",
        };
        write!(f, "{}", name)
    }
}

/// Ordered strategies to try, first success wins
pub fn select_plan(lock_present: bool, lock_in_sync: bool) -> Vec<InstallStrategy> {
    use InstallStrategy::*;

    match (lock_present, lock_in_sync) {
        (false, _) => vec![IgnoreLock],
        (true, true) => vec![Clean, IgnoreLock, Plain],
        // the lock is untrustworthy, let the package manager repair it first
        (true, false) => vec![Plain, IgnoreLock],
    }
}
