use anyhow::{Context, Result};
use sprig_core::{Error, State, StateStore};
use sprig_git::{GitOps, Repository};

/// Open the repository containing the working directory.
pub fn open_repo() -> Result<Repository> {
    Repository::open_current().context("Not inside a git repository")
}

/// Helper to open repo and state, requiring `sprig init` to have run.
///
/// State lives under the common git directory so linked worktrees share it.
pub fn open_repo_and_state() -> Result<(Repository, State)> {
    let repo = open_repo()?;
    let state = State::new(repo.common_dir()?)?;

    if !state.is_initialized() {
        return Err(Error::NotInitialized.into());
    }

    Ok((repo, state))
}

/// Name of the checked-out branch, failing on a detached HEAD.
pub fn ensure_on_branch(repo: &Repository) -> Result<String> {
    Ok(repo.current_branch()?)
}

/// Unwrap a prompt answer, treating a cancelled prompt as [`Error::Cancelled`].
pub fn answered<T>(answer: Option<T>) -> Result<T> {
    answer.ok_or_else(|| Error::Cancelled.into())
}
