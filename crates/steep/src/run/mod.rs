//! Depth-first scheduler over the execution forest.

use crate::{
    ctx::{
        TestCtx,
        panic_message,
    },
    env::Env,
    graph::{
        TestGraph,
        execution::ExecId,
    },
    test::Test,
};
use indexmap::IndexMap;
use std::panic::{
    self,
    AssertUnwindSafe,
};
use tracing::{
    debug,
    instrument,
    trace,
};

pub mod state;

use state::NodeState;

/// Message attached to scopes skipped because an ancestor failed or skipped.
pub const DEPENDENCY_SKIP: &str = "steep skipped: dependency failed";

/// Runs execution nodes of one graph, tracking the state of every node it
/// reaches.
#[derive(Debug)]
pub struct Runner<'g> {
    graph: &'g TestGraph,
    states: IndexMap<ExecId, NodeState>,
}

/// A test instance replayed on the path to the visited node.
struct Replayed {
    label: String,
    test: Box<dyn Test>,
}

impl<'g> Runner<'g> {
    pub fn new(graph: &'g TestGraph) -> Self {
        Self {
            graph,
            states: IndexMap::new(),
        }
    }
    pub fn state(
        &self,
        x: ExecId,
    ) -> NodeState {
        self.states.get(&x).copied().unwrap_or_default()
    }
    pub fn states(&self) -> &IndexMap<ExecId, NodeState> {
        &self.states
    }
    fn state_mut(
        &mut self,
        x: ExecId,
    ) -> &mut NodeState {
        self.states.entry(x).or_default()
    }
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            states: self
                .states
                .iter()
                .map(|(&x, &state)| (self.graph.label(x), state))
                .collect(),
        }
    }

    /// Visits `x` and, depending on its outcome, runs or skips the subtree
    /// below it. Everything happens in a nested scope named by the label of
    /// `x`.
    ///
    /// A node this runner already finished is left alone, so every node
    /// runs at most once per runner.
    pub fn run(
        &mut self,
        ctx: &mut dyn TestCtx,
        x: ExecId,
    ) {
        let label = self.graph.label(x);
        if self.state(x).is_terminal() {
            debug!(%label, state = %self.state(x), "already visited");
            return;
        }
        ctx.scope(&label, &mut |ctx| self.visit(ctx, x));
    }

    #[instrument(skip(self, ctx))]
    fn visit(
        &mut self,
        ctx: &mut dyn TestCtx,
        x: ExecId,
    ) {
        self.state_mut(x).advance(NodeState::Running);
        let history = self.replay(ctx, x);
        Self::cleanup(ctx, history);

        let state = if ctx.failed() {
            NodeState::Failed
        } else if ctx.skipped() {
            NodeState::Skipped
        } else {
            NodeState::Passed
        };
        self.state_mut(x).advance(state);
        debug!(%state, "visited");

        let children = self.graph.expect_xnode(x).children;
        if state.blocks_children() {
            for child in children {
                self.skip(ctx, child);
            }
        } else {
            for child in children {
                self.run(ctx, child);
            }
        }
    }

    /// Runs fresh clones of every test from the root down to `x`, threading
    /// the environment chain through them. Returns the instances that ran,
    /// nearest first.
    fn replay(
        &self,
        ctx: &mut dyn TestCtx,
        x: ExecId,
    ) -> Vec<Replayed> {
        let mut env = Env::new();
        let mut history = Vec::new();
        for id in self.graph.ancestry(x) {
            if ctx.failed() || ctx.skipped() {
                trace!(%id, "path already failed, not running further");
                break;
            }
            let node = self.graph.expect_xnode(id);
            let mut test = self.graph.instantiate(id);
            if !node.is_root() {
                if let Err(err) = env.load(test.as_fields_mut()) {
                    debug!(label = node.label(), %err, "dependencies unresolved");
                    ctx.error(format!("{}: {}", node.label(), err));
                    break;
                }
            }
            trace!(label = node.label(), "run");
            guarded(ctx, node.label(), "run", |ctx| test.run(ctx));
            let saved = env.save_from(test.as_fields(), node.label());
            history.push(Replayed {
                label: node.label,
                test,
            });
            match saved {
                Ok(next) => env = next,
                Err(err) => {
                    ctx.error(err.to_string());
                    break;
                },
            }
        }
        history.reverse();
        history
    }

    fn cleanup(
        ctx: &mut dyn TestCtx,
        history: Vec<Replayed>,
    ) {
        for Replayed { label, mut test } in history {
            trace!(%label, "after");
            guarded(ctx, &label, "after", |ctx| test.after(ctx));
        }
    }

    /// Reports `x` and its whole subtree skipped without instantiating any
    /// of their tests.
    fn skip(
        &mut self,
        ctx: &mut dyn TestCtx,
        x: ExecId,
    ) {
        if self.state(x).is_terminal() {
            return;
        }
        let node = self.graph.expect_xnode(x);
        ctx.scope(node.label(), &mut |ctx| {
            ctx.skip(DEPENDENCY_SKIP);
            self.state_mut(x).advance(NodeState::Skipped);
            for &child in node.children() {
                self.skip(ctx, child);
            }
        });
    }
}

/// Runs one test hook, turning a panic into a failure of the current scope.
fn guarded(
    ctx: &mut dyn TestCtx,
    label: &str,
    hook: &str,
    f: impl FnOnce(&mut dyn TestCtx),
) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| f(&mut *ctx)));
    if let Err(payload) = result {
        ctx.error(format!(
            "{}: {} panicked: {}",
            label,
            hook,
            panic_message(&*payload)
        ));
    }
}

/// Final state of every execution node a run reached, keyed by label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    states: IndexMap<String, NodeState>,
}

impl RunSummary {
    pub fn state(
        &self,
        label: &str,
    ) -> Option<NodeState> {
        self.states.get(label).copied()
    }
    pub fn states(&self) -> &IndexMap<String, NodeState> {
        &self.states
    }
    pub fn count(
        &self,
        state: NodeState,
    ) -> usize {
        self.states.values().filter(|&&s| s == state).count()
    }
    pub fn len(&self) -> usize {
        self.states.len()
    }
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
