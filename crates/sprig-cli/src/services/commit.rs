//! Commit service: a new commit on the current branch, asking what to stage
//! when the command line does not say.

use sprig_core::{Error, Prompter, RestackStep, Result, StateStore};
use sprig_git::GitOps;

use super::{current_branch, load_graph, restack_children};

/// How changes reach the index before committing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Staging {
    /// Use what is already staged.
    #[default]
    Index,
    /// Stage every change first.
    All,
    /// Pick hunks interactively first.
    Patch,
}

impl Staging {
    /// Staging selected by the `--all` and `--patch` flags.
    #[must_use]
    pub const fn from_flags(all: bool, patch: bool) -> Self {
        if patch {
            Self::Patch
        } else if all {
            Self::All
        } else {
            Self::Index
        }
    }

    /// Stage changes into the index.
    pub fn apply<G: GitOps>(self, git: &G) -> sprig_git::Result<()> {
        match self {
            Self::Index => Ok(()),
            Self::All => git.stage_all(),
            Self::Patch => git.stage_interactive(),
        }
    }
}

/// Answer to "what should be committed?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    Staged,
    All,
    Patch,
    Abort,
}

impl CommitAction {
    const STAGED: &'static str = "Commit staged changes";
    const ALL: &'static str = "Stage all changes and commit";
    const PATCH: &'static str = "Select changes to commit";
    const ABORT: &'static str = "Abort";

    /// Labels offered at the prompt. Committing the index as it is is only
    /// offered when something is staged.
    #[must_use]
    pub fn choices(has_staged: bool) -> Vec<String> {
        let mut choices = Vec::with_capacity(4);
        if has_staged {
            choices.push(Self::STAGED.to_string());
        }
        choices.extend([Self::ALL, Self::PATCH, Self::ABORT].map(String::from));
        choices
    }

    /// Parse a prompt label.
    #[must_use]
    pub fn from_choice(choice: &str) -> Self {
        match choice {
            Self::STAGED => Self::Staged,
            Self::ALL => Self::All,
            Self::PATCH => Self::Patch,
            _ => Self::Abort,
        }
    }
}

/// What a commit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing ended up staged, so no commit was made.
    NothingToCommit,
    Committed { branch: String },
}

/// Service for commits with trait-based dependencies.
pub struct CommitService<'a, G: GitOps, S: StateStore, P: Prompter> {
    git: &'a G,
    state: &'a S,
    prompter: &'a P,
}

impl<'a, G: GitOps, S: StateStore, P: Prompter> CommitService<'a, G, S, P> {
    /// Create a new commit service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S, prompter: &'a P) -> Self {
        Self {
            git,
            state,
            prompter,
        }
    }

    /// Commit on the current branch, then restack its descendants.
    ///
    /// Staged changes are committed directly when a message is given or
    /// `staging` already chose what to stage. Otherwise the user picks what
    /// to commit, and is asked for a message if none was given. Trunk's
    /// stacks are left for `sprig restack`.
    ///
    /// # Errors
    /// Returns [`Error::Cancelled`] if the user aborts or cancels a prompt,
    /// and the first conflict while restacking descendants.
    pub fn commit(
        &self,
        message: Option<&str>,
        staging: Staging,
        steps: &mut Vec<RestackStep>,
    ) -> Result<CommitOutcome> {
        let (trunk, _, graph) = load_graph(self.git, self.state)?;
        let branch = current_branch(self.git)?;

        staging.apply(self.git)?;
        let staged = self.git.has_staged_changes()?;
        if !staged && (staging != Staging::Index || self.git.is_clean()?) {
            return Ok(CommitOutcome::NothingToCommit);
        }

        let action = if staged && (message.is_some() || staging != Staging::Index) {
            CommitAction::Staged
        } else {
            self.pick_action(staged)?
        };
        match action {
            CommitAction::Staged => {}
            CommitAction::All => Staging::All.apply(self.git)?,
            CommitAction::Patch => Staging::Patch.apply(self.git)?,
            CommitAction::Abort => return Err(Error::Cancelled),
        }
        if !self.git.has_staged_changes()? {
            return Ok(CommitOutcome::NothingToCommit);
        }

        let message = match message {
            Some(message) => message.to_string(),
            None => ask_message(self.prompter)?,
        };
        self.git.commit(&message)?;
        tracing::info!(branch = %branch, "committed");

        if branch != trunk && graph.contains(&branch) {
            restack_children(self.git, self.state, &branch, steps)?;
        }
        Ok(CommitOutcome::Committed { branch })
    }

    fn pick_action(&self, has_staged: bool) -> Result<CommitAction> {
        let question = if has_staged {
            "What would you like to commit?"
        } else {
            "No staged changes. What would you like to do?"
        };
        let choice = self
            .prompter
            .select_one(question, &CommitAction::choices(has_staged), None)?;
        Ok(choice.map_or(CommitAction::Abort, |c| CommitAction::from_choice(&c)))
    }
}

/// Ask for a commit message, rejecting an empty one.
pub fn ask_message<P: Prompter>(prompter: &P) -> Result<String> {
    let message = prompter
        .input("Commit message", None)?
        .ok_or(Error::Cancelled)?;
    let message = message.trim();
    if message.is_empty() {
        return Err(Error::InvalidOperation(
            "commit message cannot be empty".into(),
        ));
    }
    Ok(message.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_mocks::{Answer, MockGitOps, MockStateStore, ScriptedPrompter};

    /// main <- a <- b, on a.
    fn stack() -> (MockGitOps, MockStateStore) {
        let git = MockGitOps::new()
            .with_branch_on("a", "main")
            .with_branch_on("b", "a")
            .with_current_branch("a");
        let state = MockStateStore::new().with_tracked(&[("a", "main"), ("b", "a")]);
        (git, state)
    }

    #[test]
    fn test_commit_staged_with_message_restacks_children() {
        let (git, state) = stack();
        let git = git.with_staged_changes();
        let prompter = ScriptedPrompter::default();
        let mut steps = Vec::new();

        let outcome = CommitService::new(&git, &state, &prompter)
            .commit(Some("Add thing"), Staging::Index, &mut steps)
            .unwrap();

        assert_eq!(outcome, CommitOutcome::Committed { branch: "a".into() });
        assert!(git.called("commit Add thing"));
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].branch, "b");
        assert_eq!(git.base_of("b"), Some(git.tip_of("a")));
        assert_eq!(git.current(), "a");
        assert!(prompter.asked.borrow().is_empty());
    }

    #[test]
    fn test_only_unstaged_changes_asks_what_to_stage() {
        let (git, state) = stack();
        let git = git.with_unstaged_changes();
        let prompter = ScriptedPrompter::new(vec![Answer::Select(
            "Stage all changes and commit".into(),
        )]);

        CommitService::new(&git, &state, &prompter)
            .commit(Some("Add thing"), Staging::Index, &mut Vec::new())
            .unwrap();

        assert!(git.called("add -A"));
        assert!(git.called("commit Add thing"));
        assert_eq!(
            prompter.asked.borrow().as_slice(),
            ["No staged changes. What would you like to do?"]
        );
    }

    #[test]
    fn test_without_message_asks_action_then_message() {
        let (git, state) = stack();
        let git = git.with_staged_changes();
        let prompter = ScriptedPrompter::new(vec![
            Answer::Select("Commit staged changes".into()),
            Answer::Input("  Tidy up  ".into()),
        ]);

        CommitService::new(&git, &state, &prompter)
            .commit(None, Staging::Index, &mut Vec::new())
            .unwrap();

        assert!(git.called("commit Tidy up"));
        assert!(git.calls_starting("add").is_empty());
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_all_flag_skips_action_prompt() {
        let (git, state) = stack();
        let git = git.with_unstaged_changes();
        let prompter = ScriptedPrompter::new(vec![Answer::Input("Everything".into())]);

        CommitService::new(&git, &state, &prompter)
            .commit(None, Staging::All, &mut Vec::new())
            .unwrap();

        assert!(git.called("add -A"));
        assert!(git.called("commit Everything"));
        assert_eq!(prompter.asked.borrow().as_slice(), ["Commit message"]);
    }

    #[test]
    fn test_clean_tree_has_nothing_to_commit() {
        let (git, state) = stack();
        let outcome = CommitService::new(&git, &state, &ScriptedPrompter::default())
            .commit(Some("msg"), Staging::Index, &mut Vec::new())
            .unwrap();

        assert_eq!(outcome, CommitOutcome::NothingToCommit);
        assert!(git.calls_starting("commit").is_empty());
    }

    #[test]
    fn test_patch_selecting_nothing() {
        let (git, state) = stack();
        let git = git.with_unstaged_changes().with_empty_selection();

        let outcome = CommitService::new(&git, &state, &ScriptedPrompter::default())
            .commit(Some("msg"), Staging::Patch, &mut Vec::new())
            .unwrap();

        assert_eq!(outcome, CommitOutcome::NothingToCommit);
        assert!(git.called("add --patch"));
        assert!(git.calls_starting("commit").is_empty());
    }

    #[test]
    fn test_abort_and_empty_message() {
        let (git, state) = stack();
        let git = git.with_unstaged_changes();
        let aborting = ScriptedPrompter::new(vec![Answer::Select("Abort".into())]);
        let err = CommitService::new(&git, &state, &aborting)
            .commit(None, Staging::Index, &mut Vec::new())
            .unwrap_err();
        assert!(err.is_cancelled());

        let blank = ScriptedPrompter::new(vec![
            Answer::Select("Stage all changes and commit".into()),
            Answer::Input("   ".into()),
        ]);
        let err = CommitService::new(&git, &state, &blank)
            .commit(None, Staging::Index, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
        assert!(git.calls_starting("commit").is_empty());
    }

    #[test]
    fn test_commit_on_trunk_leaves_stacks() {
        let (git, state) = stack();
        let git = git.with_current_branch("main").with_staged_changes();
        let mut steps = Vec::new();

        CommitService::new(&git, &state, &ScriptedPrompter::default())
            .commit(Some("Hotfix"), Staging::Index, &mut steps)
            .unwrap();

        assert!(git.called("commit Hotfix"));
        assert!(steps.is_empty());
        assert!(git.calls_starting("rebase").is_empty());
    }

    #[test]
    fn test_action_choices() {
        assert_eq!(CommitAction::choices(false).len(), 3);
        let with_staged = CommitAction::choices(true);
        assert_eq!(CommitAction::from_choice(&with_staged[0]), CommitAction::Staged);
        assert_eq!(CommitAction::from_choice("whatever"), CommitAction::Abort);
        assert_eq!(Staging::from_flags(true, true), Staging::Patch);
        assert_eq!(Staging::from_flags(true, false), Staging::All);
    }
}
