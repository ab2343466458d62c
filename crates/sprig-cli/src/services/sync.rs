//! Sync service: bring trunk up to date with the remote, prune metadata,
//! delete merged branches and restack everything that rebases cleanly.
//!
//! Nothing here stops at the first problem. Fetch failures, a trunk that
//! could not be updated, branches that failed to delete and conflicted
//! restacks all end up in the [`SyncReport`].

use sprig_core::{Error, Prompter, RestackEngine, RestackReport, Result, StateStore};
use sprig_git::GitOps;

use super::{load_graph, return_to};

/// Options for one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Answer every prompt affirmatively.
    pub force: bool,
    /// Run the bulk restack (also requires `sync.restack` in settings).
    pub restack: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            force: false,
            restack: true,
        }
    }
}

/// Progress notifications, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Fetching,
    Fetched,
    SyncingTrunk,
    CleaningStale,
    DeletingMerged,
    Restacking,
}

/// What happened to trunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrunkSync {
    /// No remote-tracking branch for trunk.
    NoRemote,
    UpToDate,
    FastForwarded,
    /// Diverged, and reset to the remote.
    Reset,
    /// Diverged, and the user declined the reset.
    Skipped,
    Failed(String),
}

/// Answer to "delete this merged branch?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergedAnswer {
    Yes,
    No,
    /// Yes to this and every later branch.
    All,
    /// Stop deleting; sync carries on.
    Quit,
}

impl MergedAnswer {
    /// Labels offered at the prompt.
    pub const CHOICES: [&'static str; 4] = ["yes", "no", "all", "quit"];

    /// Parse a prompt label.
    #[must_use]
    pub fn from_choice(choice: &str) -> Self {
        match choice {
            "yes" | "y" => Self::Yes,
            "all" | "a" => Self::All,
            "quit" | "q" => Self::Quit,
            _ => Self::No,
        }
    }
}

/// Aggregate outcome of a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub fetch_error: Option<String>,
    pub trunk: TrunkSync,
    /// Metadata entries dropped because their branch is gone.
    pub stale_removed: Vec<String>,
    /// Merged branches deleted.
    pub deleted: Vec<String>,
    /// Merged branches that could not be deleted, with the reason.
    pub delete_failures: Vec<(String, String)>,
    /// `None` when restacking was turned off.
    pub restack: Option<RestackReport>,
}

impl SyncReport {
    const fn new() -> Self {
        Self {
            fetch_error: None,
            trunk: TrunkSync::NoRemote,
            stale_removed: Vec::new(),
            deleted: Vec::new(),
            delete_failures: Vec::new(),
            restack: None,
        }
    }
}

/// Service for sync with trait-based dependencies.
pub struct SyncService<'a, G: GitOps, S: StateStore, P: Prompter> {
    git: &'a G,
    state: &'a S,
    prompter: &'a P,
}

impl<'a, G: GitOps, S: StateStore, P: Prompter> SyncService<'a, G, S, P> {
    /// Create a new sync service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S, prompter: &'a P) -> Self {
        Self {
            git,
            state,
            prompter,
        }
    }

    /// Run a full sync, reporting each phase to `progress` as it starts.
    ///
    /// # Errors
    /// Returns [`Error::Cancelled`] if the user cancels a confirmation, and
    /// propagates failures to load state or build the graph. Everything else
    /// is recorded in the report.
    pub fn run(&self, opts: SyncOptions, progress: impl Fn(SyncPhase)) -> Result<SyncReport> {
        let trunk = self.state.trunk()?;
        let settings = self.state.load_settings()?.sync;
        let original = self.git.current_branch().ok();
        let mut report = SyncReport::new();

        progress(SyncPhase::Fetching);
        if let Err(e) = self.git.fetch_remote(&settings.remote) {
            tracing::warn!(remote = %settings.remote, error = %e, "fetch failed");
            report.fetch_error = Some(e.to_string());
        }
        progress(SyncPhase::Fetched);

        progress(SyncPhase::SyncingTrunk);
        report.trunk = self.sync_trunk(&trunk, &settings.remote, opts.force)?;

        progress(SyncPhase::CleaningStale);
        report.stale_removed = self.clean_stale(opts.force)?;

        if settings.delete_merged {
            progress(SyncPhase::DeletingMerged);
            self.delete_merged(&trunk, opts.force, &mut report)?;
        }

        if opts.restack && settings.restack {
            progress(SyncPhase::Restacking);
            let (_, _, graph) = load_graph(self.git, self.state)?;
            report.restack = Some(RestackEngine::new(self.git).restack_all_best_effort(&graph));
        }

        if let Some(original) = original {
            return_to(self.git, &original);
        }
        Ok(report)
    }

    /// Fast-forward trunk to `<remote>/<trunk>`, or reset it after
    /// confirmation when it has diverged.
    ///
    /// Git failures end up in [`TrunkSync::Failed`]; only a cancelled
    /// confirmation is an error.
    pub fn sync_trunk(&self, trunk: &str, remote: &str, force: bool) -> Result<TrunkSync> {
        if !self.git.has_remote_branch(trunk, remote) {
            return Ok(TrunkSync::NoRemote);
        }
        let remote_ref = format!("{remote}/{trunk}");

        let tips = self
            .git
            .commit_ref(trunk)
            .and_then(|local| {
                self.git
                    .commit_ref(&remote_ref)
                    .map(|upstream| (local, upstream))
            });
        match tips {
            Ok((local, upstream)) if local == upstream => return Ok(TrunkSync::UpToDate),
            Ok(_) => {}
            Err(e) => return Ok(trunk_failed(trunk, &e)),
        }

        let behind = match self.git.is_ancestor(trunk, &remote_ref) {
            Ok(behind) => behind,
            Err(e) => return Ok(trunk_failed(trunk, &e)),
        };

        if behind {
            let result = self
                .git
                .checkout(trunk)
                .and_then(|()| self.git.merge_ff_only(&remote_ref));
            return Ok(match result {
                Ok(()) => {
                    tracing::info!(trunk, remote = %remote_ref, "fast-forwarded");
                    TrunkSync::FastForwarded
                }
                Err(e) => TrunkSync::Failed(e.to_string()),
            });
        }

        if !force {
            let question = format!("'{trunk}' has diverged from '{remote_ref}'. Reset it?");
            match self.prompter.confirm(&question, false)? {
                None => return Err(Error::Cancelled),
                Some(false) => return Ok(TrunkSync::Skipped),
                Some(true) => {}
            }
        }

        Ok(match self.git.reset_branch(trunk, &remote_ref) {
            Ok(()) => {
                tracing::info!(trunk, remote = %remote_ref, "reset");
                TrunkSync::Reset
            }
            Err(e) => TrunkSync::Failed(e.to_string()),
        })
    }

    /// Drop metadata entries whose branch no longer exists, moving their
    /// children up to the entry's parent.
    pub fn clean_stale(&self, force: bool) -> Result<Vec<String>> {
        let mut metadata = self.state.load_metadata()?;
        let live = self.git.list_branches()?;
        let stale = metadata.stale_entries(&live);
        if stale.is_empty() {
            return Ok(stale);
        }

        if !force {
            let question = format!(
                "Remove {} stale branch(es) from metadata ({})?",
                stale.len(),
                stale.join(", ")
            );
            match self.prompter.confirm(&question, true)? {
                None => return Err(Error::Cancelled),
                Some(false) => return Ok(Vec::new()),
                Some(true) => {}
            }
        }

        for name in &stale {
            let parent = metadata.parent(name).map(String::from);
            if let Some(parent) = parent {
                for child in metadata.children(name) {
                    metadata.update_parent(&child, &parent)?;
                }
            }
            metadata.untrack(name);
        }
        self.state.save_metadata(&metadata)?;
        tracing::info!(count = stale.len(), "removed stale metadata");
        Ok(stale)
    }

    /// Tracked branches merged into trunk, skipping branches that have no
    /// commits of their own.
    pub fn merged_branches(&self, trunk: &str) -> Result<Vec<String>> {
        let metadata = self.state.load_metadata()?;
        let mut merged = Vec::new();

        for name in metadata.names() {
            if name == trunk || !self.git.branch_exists(name) {
                continue;
            }
            if let Some(parent) = metadata.parent(name) {
                let same_tip = matches!(
                    (self.git.commit_ref(name), self.git.commit_ref(parent)),
                    (Ok(a), Ok(b)) if a == b
                );
                if same_tip {
                    continue;
                }
            }
            match self.git.is_merged_into(name, trunk) {
                Ok(true) => merged.push(name.to_string()),
                Ok(false) => {}
                Err(e) => tracing::debug!(branch = name, error = %e, "merge check failed"),
            }
        }
        Ok(merged)
    }

    fn delete_merged(&self, trunk: &str, force: bool, report: &mut SyncReport) -> Result<()> {
        let merged = self.merged_branches(trunk)?;
        let mut delete_all = force;

        for branch in merged {
            if !delete_all {
                let question = format!("'{branch}' is merged into '{trunk}'. Delete it?");
                let options: Vec<String> =
                    MergedAnswer::CHOICES.iter().map(ToString::to_string).collect();
                let answer = self
                    .prompter
                    .select_one(&question, &options, None)?
                    .map_or(MergedAnswer::Quit, |choice| MergedAnswer::from_choice(&choice));
                match answer {
                    MergedAnswer::Yes => {}
                    MergedAnswer::No => continue,
                    MergedAnswer::All => delete_all = true,
                    MergedAnswer::Quit => break,
                }
            }

            match self.delete_one(&branch, trunk) {
                Ok(()) => report.deleted.push(branch),
                Err(e) => {
                    tracing::warn!(branch = %branch, error = %e, "could not delete merged branch");
                    report.delete_failures.push((branch, e.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Delete a merged branch, moving its children to its parent.
    fn delete_one(&self, branch: &str, trunk: &str) -> Result<()> {
        if self.git.current_branch().ok().as_deref() == Some(branch) {
            self.git.checkout(trunk)?;
        }
        self.git.delete_branch(branch, true)?;

        let mut metadata = self.state.load_metadata()?;
        let parent = metadata
            .parent(branch)
            .map_or_else(|| trunk.to_string(), String::from);
        for child in metadata.children(branch) {
            metadata.update_parent(&child, &parent)?;
            tracing::info!(branch = %child, parent = %parent, "reparented");
        }
        metadata.untrack(branch);
        self.state.save_metadata(&metadata)?;
        tracing::info!(branch, "deleted merged branch");
        Ok(())
    }
}

fn trunk_failed(trunk: &str, err: &sprig_git::Error) -> TrunkSync {
    tracing::warn!(trunk, error = %err, "could not sync trunk");
    TrunkSync::Failed(err.to_string())
}
