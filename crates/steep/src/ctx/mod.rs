//! Execution context consumed from the host test runner.

use std::any::Any;

pub mod recorder;

pub use recorder::{
    Outcome,
    Recorder,
    Report,
    ScopeReport,
};

/// Separator of nested scope names in scope paths.
pub const SCOPE_SEPARATOR: char = '/';

/// The reporting scope a test runs in.
///
/// Scopes nest: [`TestCtx::scope`] runs `body` in a child scope to completion
/// before returning. A failure inside a child scope also fails its parents.
pub trait TestCtx {
    /// Full name of the current scope.
    fn name(&self) -> &str;

    /// Runs `body` synchronously in a nested scope named `name`. Returns
    /// whether the nested scope passed.
    fn scope(
        &mut self,
        name: &str,
        body: &mut dyn FnMut(&mut dyn TestCtx),
    ) -> bool;

    /// Reports a non-fatal failure of the current scope.
    fn error(
        &mut self,
        message: String,
    );

    fn failed(&self) -> bool;

    /// Marks the current scope skipped.
    fn skip(
        &mut self,
        reason: &str,
    );

    fn skipped(&self) -> bool;

    fn log(
        &mut self,
        message: &str,
    ) {
        tracing::info!(scope = self.name(), "{}", message);
    }
}

/// Text of a panic payload caught with `catch_unwind`.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
