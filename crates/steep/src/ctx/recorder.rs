//! In-memory [`TestCtx`] recording a tree of scope outcomes.

use super::{
    SCOPE_SEPARATOR,
    TestCtx,
    panic_message,
};
use derive_more::Display;
use std::{
    fmt,
    panic::{
        self,
        AssertUnwindSafe,
    },
};
use tracing::{
    debug,
    error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Outcome {
    #[display("PASS")]
    Passed,
    #[display("FAIL")]
    Failed,
    #[display("SKIP")]
    Skipped,
}

/// Context that records every scope it runs instead of reporting to an
/// outer harness. A panic inside a scope fails that scope only.
#[derive(Debug)]
pub struct Recorder {
    path: String,
    name: String,
    failed: bool,
    skipped: bool,
    messages: Vec<String>,
    children: Vec<ScopeReport>,
}

impl Recorder {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            failed: false,
            skipped: false,
            messages: Vec::new(),
            children: Vec::new(),
        }
    }
    fn nested(
        &self,
        name: &str,
    ) -> Self {
        Self {
            path: format!("{}{}{}", self.path, SCOPE_SEPARATOR, name),
            name: name.to_string(),
            failed: false,
            skipped: false,
            messages: Vec::new(),
            children: Vec::new(),
        }
    }
    fn outcome(&self) -> Outcome {
        if self.failed {
            Outcome::Failed
        } else if self.skipped {
            Outcome::Skipped
        } else {
            Outcome::Passed
        }
    }
    fn into_scope_report(self) -> ScopeReport {
        ScopeReport {
            outcome: self.outcome(),
            name: self.name,
            messages: self.messages,
            children: self.children,
        }
    }
    pub fn finish(self) -> Report {
        Report {
            root: self.into_scope_report(),
        }
    }
}

impl TestCtx for Recorder {
    fn name(&self) -> &str {
        &self.path
    }
    fn scope(
        &mut self,
        name: &str,
        body: &mut dyn FnMut(&mut dyn TestCtx),
    ) -> bool {
        let mut child = self.nested(name);
        let span = tracing::debug_span!("scope", path = %child.path);
        let result = {
            let _enter = span.enter();
            panic::catch_unwind(AssertUnwindSafe(|| body(&mut child)))
        };
        if let Err(payload) = result {
            let message = format!("panicked: {}", panic_message(&*payload));
            error!(path = %child.path, "{}", message);
            child.failed = true;
            child.messages.push(message);
        }
        let report = child.into_scope_report();
        debug!(name = %report.name, outcome = %report.outcome, "scope finished");
        let passed = report.outcome != Outcome::Failed;
        if !passed {
            self.failed = true;
        }
        self.children.push(report);
        passed
    }
    fn error(
        &mut self,
        message: String,
    ) {
        error!(path = %self.path, "{}", message);
        self.failed = true;
        self.messages.push(message);
    }
    fn failed(&self) -> bool {
        self.failed
    }
    fn skip(
        &mut self,
        reason: &str,
    ) {
        debug!(path = %self.path, reason, "skip");
        self.skipped = true;
        self.messages.push(reason.to_string());
    }
    fn skipped(&self) -> bool {
        self.skipped
    }
    fn log(
        &mut self,
        message: &str,
    ) {
        tracing::info!(path = %self.path, "{}", message);
        self.messages.push(message.to_string());
    }
}

/// Recorded outcome of one scope and its nested scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeReport {
    pub name: String,
    pub outcome: Outcome,
    pub messages: Vec<String>,
    pub children: Vec<ScopeReport>,
}

impl ScopeReport {
    /// Nested scope at the `/`-separated `path`, relative to this scope.
    pub fn find(
        &self,
        path: &str,
    ) -> Option<&ScopeReport> {
        path.split(SCOPE_SEPARATOR).try_fold(self, |scope, name| {
            scope.children.iter().find(|child| child.name == name)
        })
    }
    fn flatten_into(
        &self,
        prefix: &str,
        out: &mut Vec<(String, Outcome)>,
    ) {
        for child in &self.children {
            let path = if prefix.is_empty() {
                child.name.clone()
            } else {
                format!("{}{}{}", prefix, SCOPE_SEPARATOR, child.name)
            };
            out.push((path.clone(), child.outcome));
            child.flatten_into(&path, out);
        }
    }
    fn write_tree(
        &self,
        f: &mut fmt::Formatter<'_>,
        depth: usize,
    ) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}--- {}: {}",
            "",
            self.outcome,
            self.name,
            indent = depth * 4
        )?;
        for message in &self.messages {
            writeln!(f, "{:indent$}{}", "", message, indent = depth * 4 + 8)?;
        }
        self.children
            .iter()
            .try_for_each(|child| child.write_tree(f, depth + 1))
    }
}

/// Everything a [`Recorder`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    root: ScopeReport,
}

impl Report {
    pub fn root(&self) -> &ScopeReport {
        &self.root
    }
    pub fn passed(&self) -> bool {
        self.root.outcome != Outcome::Failed
    }
    /// Scope at the `/`-separated `path` below the root scope.
    pub fn find(
        &self,
        path: &str,
    ) -> Option<&ScopeReport> {
        self.root.find(path)
    }
    pub fn outcome(
        &self,
        path: &str,
    ) -> Option<Outcome> {
        self.find(path).map(|scope| scope.outcome)
    }
    /// All nested scopes depth-first with their paths below the root.
    pub fn outcomes(&self) -> Vec<(String, Outcome)> {
        let mut out = Vec::new();
        self.root.flatten_into("", &mut out);
        out
    }
    pub fn count(
        &self,
        outcome: Outcome,
    ) -> usize {
        self.outcomes()
            .into_iter()
            .filter(|(_, o)| *o == outcome)
            .count()
    }
    /// Panics with the full report unless every scope passed or skipped.
    #[track_caller]
    pub fn assert_passed(&self) {
        assert!(self.passed(), "test graph failed:\n{}", self);
    }
}

impl fmt::Display for Report {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        self.root.write_tree(f, 0)
    }
}
