use crate::graph::{
    TestGraph,
    execution::ExecId,
};
use petgraph::{
    dot::{
        Config,
        Dot,
    },
    graph::{
        DiGraph,
        NodeIndex,
    },
};
use std::collections::HashMap;

impl TestGraph {
    /// The execution forest as a petgraph graph with labels as node weights.
    pub fn to_petgraph(&self) -> DiGraph<String, &'static str> {
        let mut pg = DiGraph::new();
        let mut indices: HashMap<ExecId, NodeIndex> = HashMap::new();
        let mut stack = self.roots();
        stack.reverse();
        while let Some(x) = stack.pop() {
            let node = self.expect_xnode(x);
            let index = pg.add_node(node.label().to_string());
            if let Some(parent) = node.parent() {
                pg.add_edge(indices[&parent], index, "then");
            }
            indices.insert(x, index);
            stack.extend(node.children().iter().rev());
        }
        pg
    }

    /// Graphviz rendering of the execution forest.
    pub fn to_dot(&self) -> String {
        let pg = self.to_petgraph();
        format!("{}", Dot::with_config(&pg, &[Config::EdgeNoLabel]))
    }
}
