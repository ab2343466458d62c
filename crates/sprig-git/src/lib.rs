//! # sprig-git
//!
//! Git operations for sprig. Read-only inspection goes through git2-rs;
//! anything that touches the working tree, the index or an in-progress
//! rebase is delegated to the `git` binary.

mod error;
mod repository;
mod traits;

pub use error::{Error, Result};
pub use git2::Oid;
pub use repository::Repository;
pub use traits::{CommitSummary, GitOps};
