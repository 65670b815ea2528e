use std::sync::{
    Arc,
    atomic::{
        AtomicUsize,
        Ordering,
    },
};

use crate::{
    ctx::SCOPE_SEPARATOR,
    error::PlanError,
    fields::Classification,
    graph::{
        execution::{
            ExecId,
            ExecNode,
            make_label,
        },
        logical::{
            LogicalId,
            LogicalNode,
        },
        selection::Selection,
    },
    test::{
        Test,
        test_name,
    },
};
use dashmap::{
    DashMap,
    DashSet,
    mapref::one::Ref,
};
use itertools::Itertools;
use tracing::debug;

pub mod execution;
pub mod logical;
pub mod selection;
pub mod visualization;

/// Thread-safe reference to a [`TestGraph`].
#[derive(Debug, Clone, Default)]
pub struct TestGraphRef(pub Arc<TestGraph>);

impl TestGraphRef {
    pub fn new(g: TestGraph) -> Self {
        Self::from(g)
    }
    /// Adds a root test and selects it.
    pub fn root<T: Test>(
        &self,
        test: T,
    ) -> Result<Selection, PlanError> {
        let id = self.insert_root(Box::new(test))?;
        Ok(Selection::from_nodes(self.clone(), vec![id]))
    }
    pub fn ptr_eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<TestGraph> for TestGraphRef {
    fn from(g: TestGraph) -> Self {
        Self(Arc::new(g))
    }
}

impl std::ops::Deref for TestGraphRef {
    type Target = TestGraph;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Arena of logical and execution nodes.
///
/// Nodes are addressed by id handles and never removed. Once created, a node
/// only changes by gaining children.
#[derive(Debug, Default)]
pub struct TestGraph {
    /// Id counter shared by logical and execution nodes
    next_id: AtomicUsize,
    lnodes: DashMap<LogicalId, LogicalNode>,
    xnodes: DashMap<ExecId, ExecNode>,
    /// Next `#NN` suffix to try per base label
    suffixes: DashMap<String, usize>,
    /// Every label handed out so far
    labels: DashSet<String>,
}

impl TestGraph {
    pub fn new() -> Self {
        Self::default()
    }
    fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
    /// `base`, or `base#NN` with the lowest `NN` not handed out before.
    ///
    /// A test name may itself contain `#NN`, so the generated label is
    /// checked against every label taken so far.
    fn unique_label(
        &self,
        base: String,
    ) -> String {
        let mut n = self.suffixes.get(&base).map_or(0, |n| *n);
        loop {
            let label = match n {
                0 => base.clone(),
                n => format!("{}#{:02}", base, n),
            };
            n += 1;
            if self.labels.insert(label.clone()) {
                self.suffixes.insert(base, n);
                return label;
            }
        }
    }
    pub fn lnode_count(&self) -> usize {
        self.lnodes.len()
    }
    pub fn xnode_count(&self) -> usize {
        self.xnodes.len()
    }

    /// Inserts a logical node without parents and its single execution node.
    pub fn insert_root(
        &self,
        test: Box<dyn Test>,
    ) -> Result<LogicalId, PlanError> {
        self.insert_node(test, &[])
    }

    /// Inserts a logical node below every node in `parents`, creating one
    /// execution node per execution node of each parent.
    ///
    /// Fails without touching the graph if the fields of `test` cannot be
    /// classified or its name contains the scope separator `/`.
    pub fn insert_node(
        &self,
        test: Box<dyn Test>,
        parents: &[LogicalId],
    ) -> Result<LogicalId, PlanError> {
        Classification::of(&*test)?;
        let name = test_name(&*test);
        if name.contains(SCOPE_SEPARATOR) {
            return Err(PlanError::SeparatorInName(name));
        }
        let id = LogicalId(self.next_id());

        // (parent execution node, name of its logical node)
        let upstream: Vec<(Option<ExecId>, Option<String>)> =
            if parents.is_empty() {
                vec![(None, None)]
            } else {
                parents
                    .iter()
                    .flat_map(|&pid| {
                        let parent = self.expect_lnode(pid);
                        let parent_name = parent.name.clone();
                        parent
                            .xnodes
                            .iter()
                            .map(|&px| (Some(px), Some(parent_name.clone())))
                            .collect_vec()
                    })
                    .collect()
            };

        let xnodes = upstream
            .into_iter()
            .enumerate()
            .map(|(index, (parent, parent_name))| {
                let xid = ExecId(self.next_id());
                let label = self.unique_label(make_label(
                    &name,
                    index,
                    parent_name.as_deref(),
                ));
                self.xnodes.insert(xid, ExecNode {
                    id: xid,
                    index,
                    lnode: id,
                    parent,
                    children: Vec::new(),
                    label,
                });
                if let Some(parent) = parent {
                    self.expect_xnode_mut(parent).children.push(xid);
                }
                xid
            })
            .collect_vec();

        for &pid in parents {
            self.expect_lnode_mut(pid).children.push(id);
        }
        debug!(%id, name = %name, xnodes = xnodes.len(), "insert test node");
        self.lnodes.insert(id, LogicalNode {
            id,
            name,
            test,
            parents: parents.to_vec(),
            children: Vec::new(),
            xnodes,
        });
        Ok(id)
    }

    pub fn get_lnode(
        &self,
        id: LogicalId,
    ) -> Option<Ref<'_, LogicalId, LogicalNode>> {
        self.lnodes.get(&id)
    }
    #[track_caller]
    pub fn expect_lnode(
        &self,
        id: LogicalId,
    ) -> Ref<'_, LogicalId, LogicalNode> {
        self.get_lnode(id)
            .unwrap_or_else(|| panic!("logical node {} not in graph", id))
    }
    #[track_caller]
    fn expect_lnode_mut(
        &self,
        id: LogicalId,
    ) -> dashmap::mapref::one::RefMut<'_, LogicalId, LogicalNode> {
        self.lnodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("logical node {} not in graph", id))
    }
    pub fn get_xnode(
        &self,
        id: ExecId,
    ) -> Option<ExecNode> {
        self.xnodes.get(&id).map(|x| x.clone())
    }
    #[track_caller]
    pub fn expect_xnode(
        &self,
        id: ExecId,
    ) -> ExecNode {
        self.get_xnode(id)
            .unwrap_or_else(|| panic!("execution node {} not in graph", id))
    }
    #[track_caller]
    fn expect_xnode_mut(
        &self,
        id: ExecId,
    ) -> dashmap::mapref::one::RefMut<'_, ExecId, ExecNode> {
        self.xnodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("execution node {} not in graph", id))
    }

    /// Name of the logical node behind an execution node.
    pub fn name(
        &self,
        id: ExecId,
    ) -> String {
        let lnode = self.expect_xnode(id).lnode;
        self.expect_lnode(lnode).name.clone()
    }
    pub fn label(
        &self,
        id: ExecId,
    ) -> String {
        self.expect_xnode(id).label
    }
    /// Fresh copy of the test behind an execution node.
    pub fn instantiate(
        &self,
        id: ExecId,
    ) -> Box<dyn Test> {
        let lnode = self.expect_xnode(id).lnode;
        self.expect_lnode(lnode).instantiate()
    }

    /// Execution nodes without a parent, in creation order.
    pub fn roots(&self) -> Vec<ExecId> {
        self.xnodes
            .iter()
            .filter(|entry| entry.value().is_root())
            .map(|entry| *entry.key())
            .sorted()
            .collect()
    }
    /// Execution nodes from the root down to and including `id`.
    pub fn ancestry(
        &self,
        id: ExecId,
    ) -> Vec<ExecId> {
        let mut path = vec![id];
        let mut current = self.expect_xnode(id).parent;
        while let Some(parent) = current {
            path.push(parent);
            current = self.expect_xnode(parent).parent;
        }
        path.reverse();
        path
    }
    /// All execution nodes below `id` in depth-first order, excluding `id`.
    pub fn descendants(
        &self,
        id: ExecId,
    ) -> Vec<ExecId> {
        let mut out = Vec::new();
        for child in self.expect_xnode(id).children {
            out.push(child);
            out.extend(self.descendants(child));
        }
        out
    }
    /// Terminal execution nodes reachable from `id`, depth-first. A leaf is
    /// its own only leaf.
    pub fn leaves(
        &self,
        id: ExecId,
    ) -> Vec<ExecId> {
        let node = self.expect_xnode(id);
        if node.is_leaf() {
            return vec![id];
        }
        node.children
            .iter()
            .flat_map(|&child| self.leaves(child))
            .collect()
    }
}
