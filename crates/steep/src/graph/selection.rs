use crate::{
    ctx::TestCtx,
    error::PlanError,
    graph::{
        TestGraph,
        TestGraphRef,
        execution::ExecId,
        logical::LogicalId,
    },
    run::{
        RunSummary,
        Runner,
    },
    test::Test,
};
use indexmap::IndexSet;
use itertools::Itertools;
use std::collections::HashSet;

/// An ordered set of logical nodes of one graph, used as the parents of the
/// next test added with [`Selection::child`].
#[derive(Debug, Clone)]
pub struct Selection {
    graph: TestGraphRef,
    nodes: Vec<LogicalId>,
}

impl Selection {
    /// Creates a new graph holding `test` as its only root.
    pub fn new<T: Test>(test: T) -> Result<Self, PlanError> {
        TestGraphRef::default().root(test)
    }
    pub(crate) fn from_nodes(
        graph: TestGraphRef,
        nodes: Vec<LogicalId>,
    ) -> Self {
        Self { graph, nodes }
    }
    pub fn graph(&self) -> &TestGraphRef {
        &self.graph
    }
    pub fn nodes(&self) -> &[LogicalId] {
        &self.nodes
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds `test` as a child of every selected node and selects it.
    pub fn child<T: Test>(
        &self,
        test: T,
    ) -> Result<Selection, PlanError> {
        let id = self.graph.insert_node(Box::new(test), &self.nodes)?;
        Ok(Self::from_nodes(self.graph.clone(), vec![id]))
    }

    /// Union of both selections, keeping the first occurrence of each node.
    ///
    /// Panics if `other` belongs to a different graph.
    #[track_caller]
    pub fn and(
        &self,
        other: &Selection,
    ) -> Selection {
        assert!(
            self.graph.ptr_eq(&other.graph),
            "cannot combine selections of different test graphs"
        );
        let nodes: IndexSet<LogicalId> = self
            .nodes
            .iter()
            .chain(other.nodes.iter())
            .copied()
            .collect();
        Self::from_nodes(self.graph.clone(), nodes.into_iter().collect())
    }

    /// Execution nodes of all selected logical nodes.
    pub fn xnodes(&self) -> Vec<ExecId> {
        self.nodes
            .iter()
            .flat_map(|&id| self.graph.expect_lnode(id).xnodes.clone())
            .collect()
    }

    /// Terminal execution nodes reachable from the selection.
    ///
    /// Panics if one execution node is reached twice.
    #[track_caller]
    pub fn leaves(&self) -> Vec<ExecId> {
        let mut seen = HashSet::new();
        let graph: &TestGraph = &self.graph;
        self.xnodes()
            .into_iter()
            .flat_map(|x| graph.leaves(x))
            .inspect(|&leaf| {
                assert!(
                    seen.insert(leaf),
                    "double-counting leaves: {} reached twice",
                    graph.label(leaf),
                );
            })
            .collect()
    }

    /// Labels of the selected execution nodes.
    pub fn labels(&self) -> Vec<String> {
        self.xnodes()
            .into_iter()
            .map(|x| self.graph.label(x))
            .collect_vec()
    }

    /// Runs every execution tree rooted at a root of the graph, in creation
    /// order, regardless of which nodes are selected.
    pub fn run(
        &self,
        ctx: &mut dyn TestCtx,
    ) -> RunSummary {
        let mut runner = Runner::new(&self.graph);
        for root in self.graph.roots() {
            runner.run(ctx, root);
        }
        runner.summary()
    }
}
