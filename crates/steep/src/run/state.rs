use derive_more::Display;

/// Lifecycle of one execution node during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum NodeState {
    #[default]
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
}

impl NodeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Skipped)
    }
    /// Whether the children of a node in this state must be skipped.
    pub fn blocks_children(&self) -> bool {
        matches!(self, Self::Failed | Self::Skipped)
    }
    pub fn can_become(
        &self,
        next: NodeState,
    ) -> bool {
        use NodeState::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Skipped)
                | (Running, Passed)
                | (Running, Failed)
                | (Running, Skipped)
        )
    }
    /// Moves to `next`, panicking on a transition the runner never makes.
    #[track_caller]
    pub fn advance(
        &mut self,
        next: NodeState,
    ) {
        assert!(
            self.can_become(next),
            "invalid node state transition {} -> {}",
            self,
            next,
        );
        *self = next;
    }
}
