//! npm-install-quick - fast npm installs from fingerprinted snapshots
//!
//! Fingerprints everything that decides the contents of `node_modules`
//! (manifest, lock file, `.npmrc`, Node.js version). A matching snapshot
//! is restored; otherwise npm installs and a new snapshot is saved.

pub mod cli;
pub mod config;
pub mod disk;
pub mod error;
pub mod fingerprint;
pub mod install;
pub mod manifest;
pub mod snapshot;
pub mod ui;

pub use error::{QuickError, QuickResult};
