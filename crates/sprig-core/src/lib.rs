//! # sprig-core
//!
//! Core library for sprig, a stacked-branch workflow manager.
//!
//! - [`Metadata`]: the persisted parent map of tracked branches
//! - [`BranchGraph`]: the in-memory forest rebuilt from metadata and live branches
//! - [`RestackEngine`]: staleness checks and parent-before-child rebasing
//! - [`State`]: on-disk persistence under `<git common dir>/sprig/`

pub mod branch_name;
pub mod config;
pub mod error;
pub mod graph;
pub mod metadata;
pub mod prompt;
pub mod restack;
pub mod state;
pub mod traits;

pub use branch_name::BranchName;
pub use config::{Settings, SyncSettings, TrunkConfig};
pub use error::{Error, Result};
pub use graph::{BranchGraph, Node};
pub use metadata::{BranchMetadata, Metadata};
pub use prompt::Prompter;
pub use restack::{RestackEngine, RestackOutcome, RestackReport, RestackStep};
pub use state::State;
pub use traits::StateStore;
