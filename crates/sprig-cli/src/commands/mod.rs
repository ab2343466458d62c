//! CLI command definitions and handlers.

pub mod commit;
pub mod completions;
pub mod continue_;
pub mod create;
pub mod delete;
pub mod fold;
pub mod info;
pub mod init;
pub mod modify;
pub mod move_branch;
pub mod navigate;
pub mod rename;
pub mod restack;
pub mod split;
pub mod sync;
pub mod track;
pub mod untrack;
pub mod utils;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Sprig - stacked branches that stay on top of their parents.
#[derive(Parser)]
#[command(name = "sprig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Only print errors and essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize sprig in the current repository.
    Init {
        /// Trunk branch (prompted when omitted).
        #[arg(long)]
        trunk: Option<String>,
    },

    /// Start tracking an existing branch.
    Track {
        /// Branch to track (defaults to the current branch).
        branch: Option<String>,

        /// Parent branch (prompted when omitted).
        #[arg(long, short)]
        parent: Option<String>,
    },

    /// Stop tracking a branch, moving its children to its parent.
    Untrack {
        /// Branch to untrack (defaults to the current branch).
        branch: Option<String>,

        /// Skip the confirmation.
        #[arg(long, short)]
        force: bool,
    },

    /// Create a branch on top of the current one.
    #[command(alias = "c")]
    Create {
        /// Name of the new branch.
        name: String,

        /// Commit staged changes with this message.
        #[arg(long, short)]
        message: Option<String>,

        /// Stage all changes before committing (needs --message).
        #[arg(long, short, requires = "message")]
        all: bool,
    },

    /// Amend the current branch with staged changes and restack above it.
    ///
    /// A branch with no commits of its own gets a new commit instead.
    #[command(alias = "m")]
    Modify {
        /// Add a new commit instead of amending.
        #[arg(long = "commit", short = 'c')]
        new_commit: bool,

        /// Stage all changes first.
        #[arg(long, short, conflicts_with = "patch")]
        all: bool,

        /// Pick hunks to stage first.
        #[arg(long, short)]
        patch: bool,

        /// Commit message (an amend keeps the old one when omitted).
        #[arg(long, short)]
        message: Option<String>,
    },

    /// Commit on the current branch and restack above it.
    #[command(alias = "ci")]
    Commit {
        /// Commit message (prompted when omitted).
        #[arg(long, short)]
        message: Option<String>,

        /// Stage all changes first.
        #[arg(long, short, conflicts_with = "patch")]
        all: bool,

        /// Pick hunks to stage first.
        #[arg(long, short)]
        patch: bool,
    },

    /// Rebase the current branch onto its parent, then its descendants.
    ///
    /// On trunk, every stack is restacked.
    #[command(alias = "rs")]
    Restack {
        /// Restack only the current branch, not its descendants.
        #[arg(long)]
        only: bool,
    },

    /// Finish a rebase stopped on conflicts and restack what is left.
    #[command(alias = "resume")]
    Continue,

    /// Move a branch onto a different parent.
    #[command(name = "move", alias = "mv")]
    Move {
        /// New parent (same as --onto).
        target: Option<String>,

        /// New parent (prompted when omitted).
        #[arg(long, short, conflicts_with = "target")]
        onto: Option<String>,

        /// Branch to move (defaults to the current branch).
        #[arg(long, short)]
        source: Option<String>,
    },

    /// Squash the current branch into its parent.
    Fold {
        /// Keep the branch, moved up next to its parent.
        #[arg(long, short)]
        keep: bool,

        /// Skip the confirmation.
        #[arg(long, short)]
        force: bool,
    },

    /// Split the current branch into a new parent and itself.
    Split {
        /// Move the oldest commits to the new branch.
        #[arg(long = "by-commit", short = 'c', conflicts_with_all = ["by_hunk", "by_file"])]
        by_commit: bool,

        /// Pick hunks for the new branch interactively.
        #[arg(long = "by-hunk", short = 'u', conflicts_with = "by_file")]
        by_hunk: bool,

        /// Move files matching this pathspec (repeatable).
        #[arg(long = "by-file", short = 'f', value_name = "PATTERN")]
        by_file: Vec<String>,

        /// Name of the new branch (prompted, defaulting to `<branch>-base`).
        #[arg(long, short)]
        name: Option<String>,
    },

    /// Delete a branch, moving its children to its parent.
    #[command(alias = "rm")]
    Delete {
        /// Branch to delete (prompted when omitted).
        branch: Option<String>,

        /// Skip the confirmation.
        #[arg(long, short)]
        force: bool,
    },

    /// Rename a branch and keep its place in the stack.
    Rename {
        /// New name (prompted when omitted).
        new_name: Option<String>,

        /// Branch to rename (defaults to the current branch).
        #[arg(long, short)]
        branch: Option<String>,
    },

    /// Update trunk from the remote, clean up, and restack everything.
    Sync {
        /// Answer every prompt with yes.
        #[arg(long, short)]
        force: bool,

        /// Skip the final restack.
        #[arg(long)]
        no_restack: bool,
    },

    /// Print the parent of a branch.
    Parent {
        /// Branch to ask about (defaults to the current branch).
        branch: Option<String>,
    },

    /// List the children of a branch.
    Children {
        /// Branch to ask about (defaults to the current branch).
        branch: Option<String>,
    },

    /// Show a branch's commit, parent, children and place in its stack.
    Info {
        /// Branch to ask about (defaults to the current branch).
        branch: Option<String>,
    },

    /// Check out a child of the current branch.
    #[command(alias = "u")]
    Up {
        /// Levels to climb.
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        steps: u16,
    },

    /// Check out the parent of the current branch.
    #[command(alias = "d")]
    Down {
        /// Levels to descend.
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        steps: u16,
    },

    /// Check out the tip of the current stack.
    #[command(alias = "t")]
    Top,

    /// Check out the first branch above trunk in the current stack.
    #[command(alias = "b")]
    Bottom,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_move_flags() {
        let cli = Cli::try_parse_from(["sprig", "move", "--onto", "main", "-s", "feature"]).unwrap();
        let Commands::Move { target, onto, source } = cli.command else {
            panic!("expected move");
        };
        assert_eq!(target, None);
        assert_eq!(onto.as_deref(), Some("main"));
        assert_eq!(source.as_deref(), Some("feature"));
    }

    #[test]
    fn test_split_modes_conflict() {
        assert!(Cli::try_parse_from(["sprig", "split", "-c", "-u"]).is_err());
        assert!(Cli::try_parse_from(["sprig", "split", "-u", "-f", "*.rs"]).is_err());
        let cli = Cli::try_parse_from(["sprig", "split", "-f", "*.json", "-f", "docs/**"]).unwrap();
        let Commands::Split { by_file, .. } = cli.command else {
            panic!("expected split");
        };
        assert_eq!(by_file, vec!["*.json", "docs/**"]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sprig", "sync", "-q", "--no-restack"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Sync { no_restack: true, force: false }));
    }

    #[test]
    fn test_parse_modify_flags() {
        let cli = Cli::try_parse_from(["sprig", "m", "-c", "-a", "-m", "More"]).unwrap();
        let Commands::Modify { new_commit, all, patch, message } = cli.command else {
            panic!("expected modify");
        };
        assert!(new_commit && all && !patch);
        assert_eq!(message.as_deref(), Some("More"));
        assert!(Cli::try_parse_from(["sprig", "commit", "-a", "-p"]).is_err());
    }

    #[test]
    fn test_navigation_steps() {
        let cli = Cli::try_parse_from(["sprig", "up"]).unwrap();
        assert!(matches!(cli.command, Commands::Up { steps: 1 }));
        let cli = Cli::try_parse_from(["sprig", "down", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Down { steps: 3 }));
        assert!(Cli::try_parse_from(["sprig", "up", "0"]).is_err());
    }

    #[test]
    fn test_create_all_requires_message() {
        assert!(Cli::try_parse_from(["sprig", "create", "x", "-a"]).is_err());
        assert!(Cli::try_parse_from(["sprig", "create", "x", "-a", "-m", "msg"]).is_ok());
    }
}
