use crate::{
    graph::execution::ExecId,
    test::Test,
};
use derive_more::{
    Deref,
    Display,
    From,
};
use std::fmt;

/// Handle of a [`LogicalNode`] in its [`TestGraph`](super::TestGraph).
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Display, From, Deref,
)]
#[display("L{_0}")]
pub struct LogicalId(pub usize);

/// A declared test and its place in the dependency graph.
///
/// A logical node may have several parents. It owns one execution node per
/// execution node of each of its parents, or exactly one when it is a root.
pub struct LogicalNode {
    pub(crate) id: LogicalId,
    pub(crate) name: String,
    pub(crate) test: Box<dyn Test>,
    pub(crate) parents: Vec<LogicalId>,
    pub(crate) children: Vec<LogicalId>,
    pub(crate) xnodes: Vec<ExecId>,
}

impl LogicalNode {
    pub fn id(&self) -> LogicalId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn parents(&self) -> &[LogicalId] {
        &self.parents
    }
    pub fn children(&self) -> &[LogicalId] {
        &self.children
    }
    pub fn xnodes(&self) -> &[ExecId] {
        &self.xnodes
    }
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
    /// Fresh copy of the declared test value.
    pub fn instantiate(&self) -> Box<dyn Test> {
        self.test.clone_box()
    }
}

impl fmt::Debug for LogicalNode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("LogicalNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parents", &self.parents)
            .field("children", &self.children)
            .field("xnodes", &self.xnodes)
            .finish()
    }
}
