use crate::graph::logical::LogicalId;
use derive_more::{
    Deref,
    Display,
    From,
};

/// Handle of an [`ExecNode`] in its [`TestGraph`](super::TestGraph).
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Display, From, Deref,
)]
#[display("X{_0}")]
pub struct ExecId(pub usize);

/// One concrete run of a logical node along one path. Every execution node
/// has at most one parent, so execution nodes form a forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecNode {
    pub(crate) id: ExecId,
    pub(crate) index: usize,
    pub(crate) lnode: LogicalId,
    pub(crate) parent: Option<ExecId>,
    pub(crate) children: Vec<ExecId>,
    pub(crate) label: String,
}

impl ExecNode {
    pub fn id(&self) -> ExecId {
        self.id
    }
    /// Position among the execution nodes of the same logical node.
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn lnode(&self) -> LogicalId {
        self.lnode
    }
    pub fn parent(&self) -> Option<ExecId> {
        self.parent
    }
    pub fn children(&self) -> &[ExecId] {
        &self.children
    }
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// `<name>.<index>` for roots, `<name>.<index>.<parent name>` otherwise.
/// The graph appends `#NN` when the same label comes up again.
pub(crate) fn make_label(
    name: &str,
    index: usize,
    parent_name: Option<&str>,
) -> String {
    match parent_name {
        None => format!("{}.{}", name, index),
        Some(parent) => format!("{}.{}.{}", name, index, parent),
    }
}
