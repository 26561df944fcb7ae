//! Terminal output
//!
//! Fancy output (cliclack spinners, coloured banners) in a terminal, plain
//! prefixed lines in CI or when piped.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    boxed, command_echo, intro, key_value, key_value_status, outro_failure, outro_success,
    step_error_detail, step_info, step_ok, warning_box,
};
pub use progress::TaskSpinner;
