//! `sprig parent`, `sprig children` and `sprig info` - Graph queries.

use anyhow::Result;
use colored::Colorize;

use crate::commands::utils;
use crate::output;
use crate::services::{BranchInfo, InfoService};

/// Resolve an optional branch argument against the current branch.
fn branch_or_current(repo: &sprig_git::Repository, branch: Option<&str>) -> Result<String> {
    match branch {
        Some(branch) => Ok(branch.to_string()),
        None => utils::ensure_on_branch(repo),
    }
}

/// Print the parent of a branch, alone on stdout.
pub fn run_parent(branch: Option<&str>) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let branch = branch_or_current(&repo, branch)?;

    let parent = InfoService::new(&repo, &state).parent(&branch)?;
    println!("{parent}");
    Ok(())
}

/// List the children of a branch.
pub fn run_children(branch: Option<&str>) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let branch = branch_or_current(&repo, branch)?;

    let children = InfoService::new(&repo, &state).children(&branch)?;
    if children.is_empty() {
        output::info(&format!("Branch '{branch}' has no children"));
        return Ok(());
    }
    output::info(&format!("Children of '{branch}':"));
    for child in &children {
        output::detail(&format!("  {child}"));
    }
    Ok(())
}

/// Show where a branch sits in its stack.
pub fn run(branch: Option<&str>) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    let branch = branch_or_current(&repo, branch)?;

    let info = InfoService::new(&repo, &state).info(&branch)?;
    for line in info_lines(&info) {
        output::detail(&line);
    }
    Ok(())
}

fn info_lines(info: &BranchInfo) -> Vec<String> {
    let mut lines = vec![format!("Branch:      {}", info.name.cyan())];
    if let Some(commit) = &info.commit {
        lines.push(format!("Commit:      {}", commit.short_id.yellow()));
        lines.push(format!("Message:     {}", commit.summary));
    }
    if !info.tracked {
        lines.push(format!("Status:      {}", "Not tracked".yellow()));
        lines.push(String::new());
        lines.push(format!("Run 'sprig track {}' to add it to a stack", info.name));
        return lines;
    }

    let kind = if info.is_trunk { "Trunk" } else { "Stacked branch" };
    lines.push(format!("Type:        {kind}"));
    if !info.is_trunk {
        let parent = info.parent.as_deref().unwrap_or("None (root)");
        lines.push(format!("Parent:      {parent}"));
    }
    let children = if info.children.is_empty() {
        "None".to_string()
    } else {
        info.children.join(", ")
    };
    lines.push(format!("Children:    {children}"));
    match info.depth {
        Some(depth) => lines.push(format!("Stack depth: {depth}")),
        None => lines.push(format!("Stack depth: {}", "disconnected from trunk".yellow())),
    }
    if info.path.len() > 1 {
        lines.push(format!("Path:        {}", info.path.join(" -> ")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn tracked(name: &str) -> BranchInfo {
        BranchInfo {
            name: name.into(),
            is_trunk: false,
            tracked: true,
            commit: None,
            parent: Some("a".into()),
            children: vec!["c".into(), "d".into()],
            depth: Some(2),
            path: vec!["main".into(), "a".into(), name.into()],
        }
    }

    #[test]
    #[serial]
    fn test_info_lines_for_stacked_branch() {
        colored::control::set_override(false);
        let lines = info_lines(&tracked("b"));

        assert!(lines.contains(&"Parent:      a".to_string()));
        assert!(lines.contains(&"Children:    c, d".to_string()));
        assert!(lines.contains(&"Stack depth: 2".to_string()));
        assert!(lines.contains(&"Path:        main -> a -> b".to_string()));
        colored::control::unset_override();
    }

    #[test]
    #[serial]
    fn test_info_lines_for_untracked_branch() {
        colored::control::set_override(false);
        let info = BranchInfo {
            tracked: false,
            parent: None,
            children: Vec::new(),
            depth: None,
            path: Vec::new(),
            ..tracked("loose")
        };
        let lines = info_lines(&info);

        assert!(lines.contains(&"Status:      Not tracked".to_string()));
        assert!(lines.iter().any(|l| l.contains("sprig track loose")));
        assert!(!lines.iter().any(|l| l.starts_with("Parent")));
        colored::control::unset_override();
    }
}
