//! Snapshot storage for installed dependency trees
//!
//! A snapshot is a gzip-compressed tarball of the dependency directory,
//! keyed by the stakeholder fingerprint it was installed under.
//!
//! # Lifecycle
//!
//! | Event | Effect |
//! |-------|--------|
//! | Fresh install succeeds | `save` writes `{project}-dependencies-{fp}.tar.gz` unless it exists |
//! | Fingerprint hit | `restore` replaces the dependency directory |
//! | Stakeholders change | New fingerprint, new file; the old one stays |

pub mod archiver;
pub mod store;

pub use archiver::{Archiver, TarArchiver};
pub use store::{SaveOutcome, SnapshotArtifact, SnapshotStore, StoredSnapshot, ARCHIVE_EXTENSION};
