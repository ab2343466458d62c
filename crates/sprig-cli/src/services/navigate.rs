//! Navigate service: checking out branches above or below the current one.

use sprig_core::{BranchGraph, Error, Prompter, Result, StateStore};
use sprig_git::GitOps;

use super::{current_branch, load_graph};

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub branch: String,
    /// Levels travelled; 0 when already there.
    pub steps: usize,
}

/// Service for stack navigation with trait-based dependencies.
pub struct NavigateService<'a, G: GitOps, S: StateStore, P: Prompter> {
    git: &'a G,
    state: &'a S,
    prompter: &'a P,
}

impl<'a, G: GitOps, S: StateStore, P: Prompter> NavigateService<'a, G, S, P> {
    /// Create a new navigate service.
    #[must_use]
    pub const fn new(git: &'a G, state: &'a S, prompter: &'a P) -> Self {
        Self {
            git,
            state,
            prompter,
        }
    }

    /// Move `count` levels up the stack, asking which child to take at forks.
    ///
    /// Stops early at a branch without children.
    ///
    /// # Errors
    /// Fails if the current branch has no children at all.
    pub fn up(&self, count: usize) -> Result<Navigation> {
        let (graph, start) = self.load()?;
        let mut target = start.clone();

        for moved in 0..count.max(1) {
            let children = graph.children(&target);
            target = match children {
                [] if moved == 0 => {
                    return Err(Error::InvalidOperation(format!(
                        "'{start}' has no children"
                    )));
                }
                [] => break,
                [only] => only.clone(),
                _ => self.pick(&format!("Multiple children of '{target}'. Which one?"), children)?,
            };
        }
        self.go(&graph, &start, target)
    }

    /// Move `count` levels down the stack, stopping at trunk.
    ///
    /// # Errors
    /// Fails on trunk, or when the branch is cut off from trunk.
    pub fn down(&self, count: usize) -> Result<Navigation> {
        let (graph, start) = self.load()?;
        let path = stack_path(&graph, &start)?;
        let depth = path.len() - 1;
        let target = path[depth - count.max(1).min(depth)].clone();
        self.go(&graph, &start, target)
    }

    /// Jump to the tip of the stack, asking when the stack forks.
    pub fn top(&self) -> Result<Navigation> {
        let (graph, start) = self.load()?;
        let tops: Vec<String> = graph
            .descendants(&start)
            .into_iter()
            .filter(|name| graph.children(name).is_empty())
            .collect();

        let target = match tops.as_slice() {
            [] => start.clone(),
            [only] => only.clone(),
            _ => self.pick("Multiple stack tops. Which one?", &tops)?,
        };
        self.go(&graph, &start, target)
    }

    /// Jump to the first branch above trunk in the current stack.
    ///
    /// # Errors
    /// Fails on trunk, or when the branch is cut off from trunk.
    pub fn bottom(&self) -> Result<Navigation> {
        let (graph, start) = self.load()?;
        let path = stack_path(&graph, &start)?;
        let target = path[1].clone();
        self.go(&graph, &start, target)
    }

    fn load(&self) -> Result<(BranchGraph, String)> {
        let (_, _, graph) = load_graph(self.git, self.state)?;
        let current = current_branch(self.git)?;
        if !graph.contains(&current) {
            return Err(Error::NotTracked(current));
        }
        Ok((graph, current))
    }

    fn pick(&self, question: &str, options: &[String]) -> Result<String> {
        self.prompter
            .select_one(question, options, None)?
            .ok_or(Error::Cancelled)
    }

    fn go(&self, graph: &BranchGraph, start: &str, target: String) -> Result<Navigation> {
        let steps = match (graph.depth(start), graph.depth(&target)) {
            (Some(from), Some(to)) => from.abs_diff(to),
            _ => hops(graph, &target, start),
        };
        if target != start {
            self.git.checkout(&target)?;
            tracing::debug!(from = start, to = %target, steps, "navigated");
        }
        Ok(Navigation {
            branch: target,
            steps,
        })
    }
}

/// Parent links from `from` down to its ancestor `to`.
fn hops(graph: &BranchGraph, from: &str, to: &str) -> usize {
    let mut count = 0;
    let mut current = from;
    while current != to {
        let Some(parent) = graph.parent(current) else {
            break;
        };
        current = parent;
        count += 1;
    }
    count
}

/// Path from trunk to `branch`, which must not be trunk itself.
fn stack_path(graph: &BranchGraph, branch: &str) -> Result<Vec<String>> {
    if graph.is_trunk(branch) {
        return Err(Error::InvalidOperation(format!(
            "already on trunk '{branch}'"
        )));
    }
    graph
        .find_path(branch)
        .ok_or_else(|| Error::MissingParent(branch.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_mocks::{Answer, MockGitOps, MockStateStore, ScriptedPrompter};

    /// main <- a <- b <- {c, d}, d <- e.
    fn forked(current: &str) -> (MockGitOps, MockStateStore) {
        let git = MockGitOps::new()
            .with_branch_on("a", "main")
            .with_branch_on("b", "a")
            .with_branch_on("c", "b")
            .with_branch_on("d", "b")
            .with_branch_on("e", "d")
            .with_current_branch(current);
        let state = MockStateStore::new().with_tracked(&[
            ("a", "main"),
            ("b", "a"),
            ("c", "b"),
            ("d", "b"),
            ("e", "d"),
        ]);
        (git, state)
    }

    #[test]
    fn test_up_single_child() {
        let (git, state) = forked("main");
        let nav = NavigateService::new(&git, &state, &ScriptedPrompter::default())
            .up(2)
            .unwrap();

        assert_eq!(nav, Navigation { branch: "b".into(), steps: 2 });
        assert_eq!(git.current(), "b");
    }

    #[test]
    fn test_up_asks_at_fork_and_stops_at_leaf() {
        let (git, state) = forked("b");
        let prompter = ScriptedPrompter::new(vec![Answer::Select("c".into())]);

        let nav = NavigateService::new(&git, &state, &prompter).up(3).unwrap();

        assert_eq!(nav, Navigation { branch: "c".into(), steps: 1 });
        assert_eq!(prompter.asked.borrow().as_slice(), ["Multiple children of 'b'. Which one?"]);
    }

    #[test]
    fn test_up_without_children_fails() {
        let (git, state) = forked("e");
        let err = NavigateService::new(&git, &state, &ScriptedPrompter::default())
            .up(1)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidOperation(_)));
        assert!(git.calls_starting("checkout").is_empty());
    }

    #[test]
    fn test_down_clamps_at_trunk() {
        let (git, state) = forked("e");
        let prompter = ScriptedPrompter::default();
        let service = NavigateService::new(&git, &state, &prompter);

        assert_eq!(service.down(1).unwrap(), Navigation { branch: "d".into(), steps: 1 });
        assert_eq!(service.down(10).unwrap(), Navigation { branch: "main".into(), steps: 3 });
        assert_eq!(git.current(), "main");
        assert!(matches!(service.down(1).unwrap_err(), Error::InvalidOperation(_)));
    }

    #[test]
    fn test_top_picks_among_leaves() {
        let (git, state) = forked("a");
        let prompter = ScriptedPrompter::new(vec![Answer::Select("e".into())]);

        let nav = NavigateService::new(&git, &state, &prompter).top().unwrap();

        assert_eq!(nav, Navigation { branch: "e".into(), steps: 3 });
        assert_eq!(git.current(), "e");
    }

    #[test]
    fn test_top_at_leaf_stays() {
        let (git, state) = forked("c");
        let nav = NavigateService::new(&git, &state, &ScriptedPrompter::default())
            .top()
            .unwrap();

        assert_eq!(nav, Navigation { branch: "c".into(), steps: 0 });
        assert!(git.calls_starting("checkout").is_empty());
    }

    #[test]
    fn test_bottom_goes_to_stack_base() {
        let (git, state) = forked("e");
        let prompter = ScriptedPrompter::default();
        let service = NavigateService::new(&git, &state, &prompter);

        assert_eq!(service.bottom().unwrap(), Navigation { branch: "a".into(), steps: 3 });
        git.checkout("main").unwrap();
        assert!(matches!(service.bottom().unwrap_err(), Error::InvalidOperation(_)));
    }

    #[test]
    fn test_untracked_or_cancelled() {
        let (git, state) = forked("b");
        let git = git.with_branch_on("loose", "main").with_current_branch("loose");
        let err = NavigateService::new(&git, &state, &ScriptedPrompter::default())
            .up(1)
            .unwrap_err();
        assert!(matches!(err, Error::NotTracked(b) if b == "loose"));

        git.checkout("b").unwrap();
        let cancelling = ScriptedPrompter::new(vec![Answer::Cancel]);
        let err = NavigateService::new(&git, &state, &cancelling).top().unwrap_err();
        assert!(err.is_cancelled());
    }
}
