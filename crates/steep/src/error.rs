//! Error kinds of a test plan.
//!
//! A [`PlanError`] is a defect in how tests were wired together and can be
//! found without running anything. A [`RunError`] means the structure is
//! sound but the values produced along the live execution path never
//! satisfied a match condition.

use itertools::Itertools;
use std::fmt;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Plan,
    Run,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("test plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("test run error: {0}")]
    Run(#[from] RunError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Plan(_) => ErrorKind::Plan,
            Self::Run(_) => ErrorKind::Run,
        }
    }
    pub fn is_plan(&self) -> bool {
        self.kind() == ErrorKind::Plan
    }
    pub fn is_run(&self) -> bool {
        self.kind() == ErrorKind::Run
    }
}

/// A role tag found on a field that is not visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenRole {
    pub field: &'static str,
    pub roles: String,
}

impl fmt::Display for HiddenRole {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{{{}: {}}}", self.field, self.roles)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("missing required field: {0:?}")]
    MissingField(String),
    #[error("missing {} required fields: [{}]", .0.len(), .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("field {0} was only found with unmatching types")]
    WrongType(String),
    #[error("failed to set required field: {0:?}")]
    Unset(String),
    #[error("test name {0:?} contains '/', which separates report scopes")]
    SeparatorInName(String),
    #[error(
        "unable to read field {} in {type_name}: a field that is not visible cannot be tagged {}",
        .hidden.field,
        .hidden.roles
    )]
    HiddenField {
        type_name: &'static str,
        hidden: HiddenRole,
    },
    #[error(
        "role tags encountered on {} hidden fields of {type_name}: [{}]",
        .hidden.len(),
        .hidden.iter().join(", ")
    )]
    HiddenFields {
        type_name: &'static str,
        hidden: Vec<HiddenRole>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("field {0} was only found with unmatching values")]
    UnmatchedValue(String),
    #[error("required match fields not encountered on the same layer")]
    NotCoResident,
}
