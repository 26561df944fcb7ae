//! CLI command implementations

pub mod completions;
pub mod config;
pub mod fingerprint;
pub mod install;
pub mod list;
pub mod status;

pub use completions::execute as completions;
pub use config::execute as config;
pub use fingerprint::execute as fingerprint;
pub use install::execute as install;
pub use list::execute as list;
pub use status::execute as status;
