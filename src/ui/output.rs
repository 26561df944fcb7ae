//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::{style, Style};
use std::path::Path;

/// Display intro banner
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}", style(title).cyan().bold());
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        println!("  {} {}", style("[OK]").green(), message);
    }
}

/// Display an info step
pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::info(message).ok();
    } else {
        println!("  {} {}", style("[INFO]").cyan(), message);
    }
}

/// Display an error step with detail
pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::error(format!("{}: {}", message, style(detail).red())).ok();
    } else {
        println!("  {} {}: {}", style("[FAIL]").red(), message, detail);
    }
}

/// Print styled key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Print styled key-value with status color
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    let value_style = if ok {
        Style::new().green()
    } else {
        Style::new().yellow()
    };

    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value_style.apply_to(value));
    } else {
        let prefix = if ok { "[OK]" } else { "[WARN]" };
        println!("  {} {}: {}", prefix, key, value);
    }
}

/// Echo an external command before it runs
pub fn command_echo(ctx: &UiContext, cwd: &Path, program: &str, args: &[&str]) {
    if !ctx.echo_commands() {
        return;
    }
    let quoted: Vec<String> = args.iter().map(|a| format!("'{}'", a)).collect();
    println!();
    println!("{}", style(format!("[{}]", cwd.display())).dim());
    println!("$ {} {}", style(program).bold(), quoted.join(" "));
}

/// Frame a message in a box of asterisks
pub fn boxed(message: &str) -> Vec<String> {
    let width = message.chars().count();
    vec![
        "*".repeat(width + 4),
        format!("*{}*", " ".repeat(width + 2)),
        format!("* {} *", message),
        format!("*{}*", " ".repeat(width + 2)),
        "*".repeat(width + 4),
    ]
}

/// Print an attention-grabbing warning to stderr
pub fn warning_box(ctx: &UiContext, message: &str) {
    eprintln!();
    for line in boxed(message) {
        if ctx.use_fancy_output() {
            eprintln!("    {}", style(line).yellow().bold());
        } else {
            eprintln!("    {}", line);
        }
    }
}

/// Final success banner, with a reminder when warnings were shown
pub fn outro_success(ctx: &UiContext, warned: bool) {
    println!();
    if warned {
        println!(
            " {} Please note the warning(s) mentioned above",
            style("?").yellow().bold()
        );
    }
    if ctx.use_fancy_output() {
        cliclack::outro(style("✓ Success").green().bold()).ok();
    } else {
        println!(" {} Success", style("✓").green());
        println!();
    }
}

/// Final failure banner
pub fn outro_failure(ctx: &UiContext) {
    if ctx.use_fancy_output() {
        cliclack::outro(style("✗ Failure").red().bold()).ok();
    } else {
        eprintln!();
        eprintln!(" {} Failure", style("✗").red());
        eprintln!();
    }
}
