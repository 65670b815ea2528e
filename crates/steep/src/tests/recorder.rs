use crate::{
    NodeState,
    Outcome,
    Recorder,
    TestCtx,
    init_test_tracing,
};
use pretty_assertions::assert_eq;

#[test]
fn nested_scopes_build_a_tree() {
    let _tracing = init_test_tracing!();
    let mut recorder = Recorder::new("top");
    let passed = recorder.scope("outer", &mut |ctx| {
        assert_eq!(ctx.name(), "top/outer");
        ctx.scope("inner", &mut |ctx| {
            assert_eq!(ctx.name(), "top/outer/inner");
            ctx.log("hello");
        });
    });
    assert!(passed);
    let report = recorder.finish();
    assert!(report.passed());
    assert_eq!(
        report.outcomes(),
        vec![
            ("outer".to_string(), Outcome::Passed),
            ("outer/inner".to_string(), Outcome::Passed),
        ]
    );
    assert_eq!(report.find("outer/inner").unwrap().messages, vec!["hello"]);
    assert_eq!(report.find("outer/missing"), None);
}

#[test]
fn failure_fails_every_enclosing_scope() {
    let _tracing = init_test_tracing!();
    let mut recorder = Recorder::new("top");
    let passed = recorder.scope("outer", &mut |ctx| {
        let inner = ctx.scope("inner", &mut |ctx| {
            ctx.error("nope".into());
            assert!(ctx.failed());
        });
        assert!(!inner);
        assert!(ctx.failed());
    });
    assert!(!passed);
    recorder.scope("sibling", &mut |_| {});
    let report = recorder.finish();
    assert!(!report.passed());
    assert_eq!(report.outcome("outer"), Some(Outcome::Failed));
    assert_eq!(report.outcome("outer/inner"), Some(Outcome::Failed));
    assert_eq!(report.outcome("sibling"), Some(Outcome::Passed));
    assert_eq!(report.count(Outcome::Failed), 2);
}

#[test]
fn skip_is_not_a_failure() {
    let _tracing = init_test_tracing!();
    let mut recorder = Recorder::new("top");
    let passed = recorder.scope("lazy", &mut |ctx| {
        ctx.skip("later");
        assert!(ctx.skipped());
        assert!(!ctx.failed());
    });
    assert!(passed);
    let report = recorder.finish();
    assert!(report.passed());
    assert_eq!(report.outcome("lazy"), Some(Outcome::Skipped));
}

#[test]
fn failure_wins_over_skip() {
    let _tracing = init_test_tracing!();
    let mut recorder = Recorder::new("top");
    recorder.scope("both", &mut |ctx| {
        ctx.error("broken".into());
        ctx.skip("and skipped");
    });
    assert_eq!(recorder.finish().outcome("both"), Some(Outcome::Failed));
}

#[test]
fn panic_inside_scope_is_captured() {
    let _tracing = init_test_tracing!();
    let mut recorder = Recorder::new("top");
    let passed = recorder.scope("boom", &mut |_| panic!("kaboom"));
    assert!(!passed);
    recorder.scope("after", &mut |_| {});
    let report = recorder.finish();
    let boom = report.find("boom").unwrap();
    assert_eq!(boom.outcome, Outcome::Failed);
    assert_eq!(boom.messages, vec!["panicked: kaboom"]);
    assert_eq!(report.outcome("after"), Some(Outcome::Passed));
}

#[test]
fn report_renders_as_tree() {
    let _tracing = init_test_tracing!();
    let mut recorder = Recorder::new("top");
    recorder.scope("a", &mut |ctx| {
        ctx.scope("b", &mut |ctx| ctx.error("bad".into()));
    });
    let rendered = recorder.finish().to_string();
    assert_eq!(
        rendered,
        [
            "--- FAIL: top",
            "    --- FAIL: a",
            "        --- FAIL: b",
            "                bad",
            "",
        ]
        .join("\n")
    );
}

#[test]
fn node_state_transitions() {
    let mut state = NodeState::default();
    assert_eq!(state, NodeState::Pending);
    assert!(state.can_become(NodeState::Skipped));
    assert!(!state.can_become(NodeState::Passed));
    state.advance(NodeState::Running);
    assert!(!state.is_terminal());
    state.advance(NodeState::Failed);
    assert!(state.is_terminal());
    assert!(state.blocks_children());
    assert!(!NodeState::Passed.blocks_children());
}

#[test]
#[should_panic(expected = "invalid node state transition Passed -> Running")]
fn node_state_rejects_rerun() {
    let mut state = NodeState::Passed;
    state.advance(NodeState::Running);
}
