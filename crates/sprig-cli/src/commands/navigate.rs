//! `sprig up`, `sprig down`, `sprig top` and `sprig bottom` - Move around a stack.

use anyhow::Result;
use colored::Colorize;

use crate::commands::utils;
use crate::output;
use crate::prompt::TerminalPrompter;
use crate::services::NavigateService;

/// Which way to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up(usize),
    Down(usize),
    Top,
    Bottom,
}

/// Run a navigation command.
pub fn run(direction: Direction) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    utils::ensure_on_branch(&repo)?;

    let service = NavigateService::new(&repo, &state, &TerminalPrompter);
    let nav = match direction {
        Direction::Up(count) => service.up(count)?,
        Direction::Down(count) => service.down(count)?,
        Direction::Top => service.top()?,
        Direction::Bottom => service.bottom()?,
    };

    match nav.steps {
        0 => output::info(&format!("Already on {}", nav.branch.cyan())),
        1 => output::success(&format!("Checked out {}", nav.branch.cyan())),
        n => output::success(&format!("Checked out {} ({n} levels)", nav.branch.cyan())),
    }
    Ok(())
}
