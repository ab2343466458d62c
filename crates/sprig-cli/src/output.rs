//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use sprig_core::{RestackOutcome, RestackStep};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

/// Whether quiet mode is on.
pub fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
///
/// Use for indented detail lines that accompany info or warn messages.
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Recovery steps after a rebase stopped on conflicts (always to stderr).
pub fn conflict_help() {
    eprintln!();
    eprintln!("To resolve:");
    eprintln!("  1. Fix the conflicts in the files listed by `git status`");
    eprintln!("  2. Stage them: git add <files>");
    eprintln!("  3. Resume: sprig continue");
    eprintln!();
    eprintln!("Or give up on this rebase: git rebase --abort");
}

/// Format one restack step for display.
#[must_use]
pub fn restack_line(step: &RestackStep) -> String {
    match step.outcome {
        RestackOutcome::Restacked => format!(
            "  {} {} onto {}",
            "✓".green(),
            step.branch.cyan(),
            step.parent
        ),
        RestackOutcome::UpToDate => {
            format!("  {} {} {}", "·".dimmed(), step.branch, "(up to date)".dimmed())
        }
    }
}

/// Print every step of a restack (suppressed in quiet mode).
pub fn restack_steps(steps: &[RestackStep]) {
    for step in steps {
        detail(&restack_line(step));
    }
}
