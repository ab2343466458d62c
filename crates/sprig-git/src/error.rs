//! Error types for sprig-git.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a git repository.
    #[error("not a git repository")]
    NotARepository,

    /// Branch not found.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// Revision could not be resolved to a commit.
    #[error("cannot resolve revision: {0}")]
    RefNotFound(String),

    /// HEAD is detached (not on a branch).
    #[error("HEAD is detached - checkout a branch first")]
    DetachedHead,

    /// Rebase stopped on conflicts.
    #[error("rebase conflict in: {0:?}")]
    RebaseConflict(Vec<String>),

    /// Rebase failed without leaving a rebase in progress.
    #[error("rebase failed: {0}")]
    RebaseFailed(String),

    /// A git subprocess exited unsuccessfully.
    #[error("git {command} failed: {stderr}")]
    CommandFailed {
        /// The arguments passed to git.
        command: String,
        /// Captured standard error (or output) of the command.
        stderr: String,
    },

    /// The git binary could not be spawned.
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}
