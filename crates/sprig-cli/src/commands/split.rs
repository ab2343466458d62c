//! `sprig split` command - Carve part of the current branch into a new parent.

use anyhow::Result;
use colored::Colorize;
use sprig_core::{BranchName, Error, Prompter};
use sprig_git::{CommitSummary, Oid};

use crate::commands::utils;
use crate::output;
use crate::prompt::TerminalPrompter;
use crate::services::{SplitAnalysis, SplitMode, SplitService};

/// Options for the split command.
pub struct SplitOptions {
    pub by_commit: bool,
    pub by_hunk: bool,
    /// Pathspecs for file mode.
    pub by_file: Vec<String>,
    /// Name of the new branch; prompted when `None`.
    pub name: Option<String>,
}

impl SplitOptions {
    /// The mode picked by flags, if any.
    fn mode(&self) -> Option<SplitMode> {
        if self.by_commit {
            Some(SplitMode::ByCommit)
        } else if self.by_hunk {
            Some(SplitMode::ByHunk)
        } else if self.by_file.is_empty() {
            None
        } else {
            Some(SplitMode::ByFile(self.by_file.clone()))
        }
    }
}

const MODE_CHOICES: [&str; 3] = ["commit", "hunk", "file"];

/// Run the split command.
pub fn run(opts: &SplitOptions) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    utils::ensure_on_branch(&repo)?;
    let service = SplitService::new(&repo, &state);
    let prompter = TerminalPrompter;

    let analysis = service.analyze()?;
    output::info(&format!(
        "{} has {} commit(s) over {}",
        analysis.branch.cyan(),
        analysis.commits.len(),
        analysis.parent
    ));

    let mode = match opts.mode().or_else(|| analysis.default_mode()) {
        Some(mode) => mode,
        None => pick_mode(&prompter)?,
    };

    let new_name = match &opts.name {
        Some(name) => name.clone(),
        None => {
            let suggested = BranchName::split_base_of(&analysis.branch).ok();
            utils::answered(prompter.input("Name for the new branch", suggested.as_deref())?)?
        }
    };
    let new_name = new_name.trim();

    let result = match mode {
        SplitMode::ByCommit => {
            let selected = pick_commits(&prompter, &analysis, new_name)?;
            service.by_commit(&analysis, new_name, &selected)?
        }
        SplitMode::ByHunk => {
            output::info("Stage the hunks that belong on the new branch");
            service.by_hunk(&analysis, new_name)?
        }
        SplitMode::ByFile(patterns) => service.by_file(&analysis, new_name, &patterns)?,
    };

    output::success(&format!(
        "Split {} out of {}",
        result.new_branch.cyan(),
        result.branch.cyan()
    ));
    output::detail(&format!(
        "  {} -> {} -> {}",
        result.parent, result.new_branch, result.branch
    ));
    output::restack_steps(&result.restacked);

    Ok(())
}

fn pick_mode(prompter: &impl Prompter) -> Result<SplitMode> {
    let options: Vec<String> = MODE_CHOICES.iter().map(|&m| m.to_string()).collect();
    let descriptions = vec![
        "- move the oldest commits".to_string(),
        "- pick hunks interactively".to_string(),
        "- move files matching patterns".to_string(),
    ];
    let choice = utils::answered(prompter.select_one(
        "How should the branch be split?",
        &options,
        Some(descriptions.as_slice()),
    )?)?;

    Ok(match choice.as_str() {
        "commit" => SplitMode::ByCommit,
        "hunk" => SplitMode::ByHunk,
        _ => {
            let patterns = utils::answered(
                prompter.input("File patterns for the new branch (space separated)", None)?,
            )?;
            SplitMode::ByFile(patterns.split_whitespace().map(String::from).collect())
        }
    })
}

/// Ask which commits go to the new branch and map the labels back to ids.
fn pick_commits(
    prompter: &impl Prompter,
    analysis: &SplitAnalysis,
    new_name: &str,
) -> Result<Vec<Oid>> {
    let labels: Vec<String> = analysis.commits.iter().map(CommitSummary::label).collect();
    let picked = utils::answered(prompter.multi_select(
        &format!("Commits for '{new_name}' (oldest first)"),
        &labels,
    )?)?;
    if picked.is_empty() {
        return Err(Error::NothingSelected("no commits selected".into()).into());
    }

    Ok(analysis
        .commits
        .iter()
        .filter(|c| picked.contains(&c.label()))
        .map(|c| c.oid)
        .collect())
}
