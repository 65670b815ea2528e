//! Dependency graphs of stateful tests.
//!
//! Tests are declared as a logical graph in which a test may depend on the
//! saved state of the tests before it, and a test with several parents runs
//! once per path reaching it. Values travel between tests through an
//! environment chain driven by `#[steep(save)]`, `#[steep(load)]` and
//! `#[steep(match)]` field tags.
//!
//! ```rust,ignore
//! let root = Selection::new(Setup::default())?;
//! let alice = root.child(Connect::player("alice"))?;
//! let bob = root.child(Connect::player("bob"))?;
//! alice.and(&bob).child(Request::default())?;
//! steep::run(&root).assert_passed();
//! ```

extern crate self as steep;

pub mod ctx;
pub mod env;
pub mod error;
pub mod fields;
pub mod graph;
pub mod run;

// Logging utilities (tracing setup for tests)
pub mod logging;

#[cfg(test)]
mod tests;

pub use steep_macros::Fields;

pub use crate::{
    ctx::{
        Outcome,
        Recorder,
        Report,
        ScopeReport,
        TestCtx,
    },
    env::{
        Env,
        layer::{
            Layer,
            LayerData,
        },
    },
    error::{
        Error,
        ErrorKind,
        HiddenRole,
        PlanError,
        RunError,
    },
    fields::{
        Classification,
        FieldSpec,
        Fields,
        Roles,
        Value,
        vacant::Vacant,
    },
    graph::{
        TestGraph,
        TestGraphRef,
        execution::{
            ExecId,
            ExecNode,
        },
        logical::{
            LogicalId,
            LogicalNode,
        },
        selection::Selection,
    },
    run::{
        RunSummary,
        Runner,
        state::NodeState,
    },
    test::{
        Failing,
        PASS,
        Passing,
        Skipping,
        Test,
    },
};

/// Runs the whole graph `selection` belongs to, every root in creation
/// order with all of its descendants, against a fresh [`Recorder`] and
/// returns what it recorded. Which nodes are selected does not matter.
pub fn run(selection: &Selection) -> Report {
    let mut recorder = Recorder::new("steep");
    selection.run(&mut recorder);
    recorder.finish()
}
