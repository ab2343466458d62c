//! Error types for sprig-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sprig-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a Git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepository,

    /// The trunk config doesn't exist yet.
    #[error("sprig not initialized in this repository - run `sprig init` first")]
    NotInitialized,

    /// `init` was run twice.
    #[error("sprig is already initialized (trunk: {0})")]
    AlreadyInitialized(String),

    /// The configured trunk branch no longer exists.
    #[error("trunk branch '{0}' does not exist")]
    TrunkMissing(String),

    /// Branch not found.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// A branch with this name already exists.
    #[error("branch '{0}' already exists")]
    BranchExists(String),

    /// Invalid branch name.
    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName {
        /// The invalid name.
        name: String,
        /// Why the name is invalid.
        reason: String,
    },

    /// Branch has no metadata entry.
    #[error("branch '{0}' is not tracked - run `sprig track` first")]
    NotTracked(String),

    /// Branch already has a metadata entry.
    #[error("branch '{branch}' is already tracked (parent: {parent})")]
    AlreadyTracked { branch: String, parent: String },

    /// Tracked branch whose parent is gone.
    #[error("parent of '{0}' no longer exists")]
    MissingParent(String),

    /// Reparenting would make a branch its own ancestor.
    #[error("cannot move '{branch}' onto '{target}': '{target}' is a descendant of '{branch}'")]
    CycleWouldForm { branch: String, target: String },

    /// The persisted parent map contains a cycle.
    #[error("cyclic dependency detected at branch '{0}'")]
    CycleDetected(String),

    /// Rebase stopped on conflicts.
    #[error("conflict while rebasing '{branch}' onto '{parent}'")]
    RebaseConflict { branch: String, parent: String },

    /// Rebase failed and metadata was restored.
    #[error("failed to rebase '{branch}' onto '{onto}': {reason}")]
    RebaseFailed {
        branch: String,
        onto: String,
        reason: String,
    },

    /// Squash-merge stopped on conflicts.
    #[error("conflict while merging '{branch}' into '{into}'")]
    MergeConflict { branch: String, into: String },

    /// Fold failed after the squash-merge; manual recovery needed.
    #[error("fold of '{branch}' into '{parent}' stopped after merging: {reason}")]
    FoldIncomplete {
        branch: String,
        parent: String,
        reason: String,
    },

    /// Split was aborted and the partial branch cleaned up.
    #[error("split aborted: {0}")]
    SplitAborted(String),

    /// A selection produced nothing to act on.
    #[error("nothing selected: {0}")]
    NothingSelected(String),

    /// Working tree has uncommitted changes.
    #[error("working tree has uncommitted changes - commit or stash them first")]
    DirtyWorkingTree,

    /// Tracked files changed but not staged.
    #[error("unstaged changes present - stage them with --all or --patch")]
    UnstagedChanges,

    /// Operation is not valid for this branch.
    #[error("{0}")]
    InvalidOperation(String),

    /// A revision could not be resolved.
    #[error("cannot resolve '{reference}': {reason}")]
    RefResolution { reference: String, reason: String },

    /// Metadata could not be written.
    #[error("failed to save metadata: {0}")]
    MetadataPersist(String),

    /// Compensating action failed after an earlier failure.
    #[error("{original}; rollback also failed: {rollback}")]
    RollbackFailed {
        /// The error that triggered the rollback.
        original: Box<Error>,
        /// The error raised by the rollback itself.
        rollback: Box<Error>,
    },

    /// Prompt could not be shown or read.
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// The user cancelled at a prompt. Not a failure.
    #[error("cancelled")]
    Cancelled,

    /// State file parsing error.
    #[error("failed to parse {file}: {message}")]
    StateParseError { file: PathBuf, message: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Git operation error.
    #[error("git error: {0}")]
    Git(#[from] sprig_git::Error),
}

impl Error {
    /// Whether this error is the user backing out of a prompt.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Attach a rollback failure to this error.
    #[must_use]
    pub fn with_rollback_failure(self, rollback: Self) -> Self {
        Self::RollbackFailed {
            original: Box::new(self),
            rollback: Box::new(rollback),
        }
    }
}
