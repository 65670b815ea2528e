use crate::*;
use std::sync::{
    Arc,
    Mutex,
};

pub mod env;
pub mod recorder;

/// Hook invocations, shared by every clone of the tests holding it.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(
        &self,
        entry: impl Into<String>,
    ) {
        self.0.lock().unwrap().push(entry.into());
    }
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Pass,
    Fail,
    Skip,
    Panic,
}

/// Journals its hooks as `run <name>` and `after <name>`.
#[derive(Debug, Clone, Fields)]
pub struct Step {
    name: &'static str,
    behavior: Behavior,
    journal: Journal,
}

impl Step {
    pub fn new(
        name: &'static str,
        journal: &Journal,
    ) -> Self {
        Self {
            name,
            behavior: Behavior::Pass,
            journal: journal.clone(),
        }
    }
    pub fn with(
        mut self,
        behavior: Behavior,
    ) -> Self {
        self.behavior = behavior;
        self
    }
}

impl Test for Step {
    fn run(
        &mut self,
        ctx: &mut dyn TestCtx,
    ) {
        self.journal.record(format!("run {}", self.name));
        match self.behavior {
            Behavior::Pass => {},
            Behavior::Fail => ctx.error(format!("{} failed", self.name)),
            Behavior::Skip => ctx.skip("not today"),
            Behavior::Panic => panic!("{} exploded", self.name),
        }
    }
    fn after(
        &mut self,
        _ctx: &mut dyn TestCtx,
    ) {
        self.journal.record(format!("after {}", self.name));
    }
    fn name(&self) -> String {
        self.name.to_string()
    }
}

/// Root of the host/player scenario.
#[derive(Debug, Clone, Default, Fields)]
pub struct Host {
    #[steep(save)]
    pub role: String,
    #[steep(save)]
    pub id: u32,
}

impl Host {
    pub fn new(id: u32) -> Self {
        Self {
            role: "host".into(),
            id,
        }
    }
}

impl Test for Host {
    fn run(
        &mut self,
        _ctx: &mut dyn TestCtx,
    ) {
    }
}

#[derive(Debug, Clone, Default, Fields)]
pub struct Player {
    #[steep(save)]
    pub role: String,
    #[steep(save)]
    pub name: String,
    #[steep(save)]
    pub id: u32,
}

impl Player {
    pub fn new(
        name: &str,
        id: u32,
    ) -> Self {
        Self {
            role: "player".into(),
            name: name.into(),
            id,
        }
    }
}

impl Test for Player {
    fn run(
        &mut self,
        _ctx: &mut dyn TestCtx,
    ) {
    }
    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Looks up the id of one player and fails unless it is `expected`.
#[derive(Debug, Clone, Default, Fields)]
pub struct Request {
    #[steep(match)]
    pub role: String,
    #[steep(match)]
    pub name: String,
    #[steep(load)]
    pub id: u32,
    expected: u32,
}

impl Request {
    pub fn player(
        name: &str,
        expected: u32,
    ) -> Self {
        Self {
            role: "player".into(),
            name: name.into(),
            id: 0,
            expected,
        }
    }
}

impl Test for Request {
    fn run(
        &mut self,
        ctx: &mut dyn TestCtx,
    ) {
        if self.id != self.expected {
            ctx.error(format!("expected id {} but saw {}", self.expected, self.id));
        }
    }
}

/// Looks up an id by role only.
#[derive(Debug, Clone, Default, Fields)]
pub struct RoleRequest {
    #[steep(match)]
    pub role: String,
    #[steep(load)]
    pub id: u32,
}

impl RoleRequest {
    pub fn new(role: &str) -> Self {
        Self {
            role: role.into(),
            id: 0,
        }
    }
}

impl Test for RoleRequest {
    fn run(
        &mut self,
        _ctx: &mut dyn TestCtx,
    ) {
    }
}
