//! Command-line interface

pub mod args;
pub mod commands;
pub mod project;

pub use args::{Cli, Commands};
