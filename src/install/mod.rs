//! Dependency installation
//!
//! Chooses between restoring a snapshot and running the package manager,
//! and walks the fallback plan of install strategies.

pub mod orchestrator;
pub mod runner;
pub mod strategy;

pub use orchestrator::{
    Assessment, InstallDecision, InstallOptions, Orchestrator, Outcome, RunReport, Warnings,
};
pub use runner::{probe_runtime_version, NpmCommand, PackageManager};
pub use strategy::{select_plan, InstallStrategy};
