use super::{
    Host,
    Player,
    Request,
    RoleRequest,
};
use crate::{
    Env,
    Error,
    Fields,
    PASS,
    PlanError,
    RunError,
    fields::downcast,
    init_test_tracing,
};
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, Default, Fields)]
struct Foo {
    #[steep(save, load)]
    pub foo: i32,
}

#[derive(Debug, Clone, Default, Fields)]
struct Bar {
    #[steep(save)]
    pub bar: String,
    #[steep(save)]
    pub foo: i32,
}

#[derive(Debug, Clone, Default, Fields)]
struct WideFoo {
    #[steep(save)]
    pub foo: i64,
}

#[derive(Debug, Clone, Default, Fields)]
struct Hidden {
    #[steep(save)]
    foo: i32,
}

#[derive(Debug, Clone, Default, Fields)]
struct ManyHidden {
    #[steep(save)]
    foo: i32,
    #[steep(load, match)]
    bar: String,
    pub visible: bool,
}

fn foo_of(env: &Env) -> Option<i32> {
    env.get("foo").and_then(downcast::<i32>).copied()
}

#[test]
fn save_without_fields_keeps_chain() {
    let _tracing = init_test_tracing!();
    let env = Env::new().save(&PASS).unwrap();
    assert!(env.is_empty());

    let env = Env::from_test(&Foo { foo: 5 }).unwrap();
    let same = env.save(&PASS).unwrap();
    assert_eq!(same.depth(), 1);
}

#[test]
fn save_creates_layer() {
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Foo { foo: 5 }).unwrap();
    assert_eq!(env.depth(), 1);
    assert_eq!(foo_of(&env), Some(5));
    assert_eq!(env.head().unwrap().origin(), None);
}

#[test]
fn save_keeps_declaration_order() {
    let _tracing = init_test_tracing!();
    let env = Env::new()
        .save_from(
            &Bar {
                bar: "x".into(),
                foo: 1,
            },
            "Bar.0",
        )
        .unwrap();
    let head = env.head().unwrap();
    assert_eq!(head.data().names().collect::<Vec<_>>(), vec!["bar", "foo"]);
    assert_eq!(head.origin(), Some("Bar.0"));
    assert_eq!(env.to_string(), r#"{[bar="x"], [foo=1]}"#);
}

#[test]
fn save_extends_existing_chain() {
    let _tracing = init_test_tracing!();
    let first = Env::from_test(&Foo { foo: 5 }).unwrap();
    let second = first.save(&Foo { foo: 7 }).unwrap();
    assert_eq!(second.depth(), 2);
    assert_eq!(foo_of(&second), Some(7));
    // layers are shared, never changed
    assert_eq!(foo_of(&first), Some(5));
}

#[test]
fn save_rejects_hidden_field() {
    let _tracing = init_test_tracing!();
    let err = Env::new().save(&Hidden { foo: 5 }).unwrap_err();
    assert!(matches!(
        err,
        PlanError::HiddenField { type_name: "Hidden", ref hidden } if hidden.field == "foo"
    ));
}

#[test]
fn hidden_fields_are_aggregated() {
    let _tracing = init_test_tracing!();
    let err = Env::new().save(&ManyHidden::default()).unwrap_err();
    match &err {
        PlanError::HiddenFields { type_name, hidden } => {
            assert_eq!(*type_name, "ManyHidden");
            assert_eq!(
                hidden.iter().map(|h| h.field).collect::<Vec<_>>(),
                vec!["foo", "bar"]
            );
        },
        other => panic!("unexpected error: {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("foo: save"), "{message}");
    assert!(message.contains("bar: load,match"), "{message}");
}

#[test]
fn load_an_int() {
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Foo { foo: 5 }).unwrap();
    let mut test = Foo::default();
    env.load(&mut test).unwrap();
    assert_eq!(test.foo, 5);
}

#[test]
fn load_nearest_value_wins() {
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Foo { foo: 5 })
        .unwrap()
        .save(&Foo { foo: 7 })
        .unwrap();
    let mut test = Foo::default();
    env.load(&mut test).unwrap();
    assert_eq!(test.foo, 7);
}

#[test]
fn loads_can_fail() {
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Bar {
        bar: "x".into(),
        foo: 0,
    })
    .unwrap();
    // only a zero was saved, which still counts as a value
    let mut test = Foo::default();
    env.load(&mut test).unwrap();

    let err = Env::new().load(&mut Foo::default()).unwrap_err();
    assert_eq!(err, Error::Plan(PlanError::Unset("foo".into())));
    assert!(err.is_plan());
}

#[test]
fn load_never_coerces_types() {
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&WideFoo { foo: 5 }).unwrap();
    let err = env.load(&mut Foo::default()).unwrap_err();
    assert_eq!(err, Error::from(PlanError::Unset("foo".into())));
}

#[test]
fn load_skips_preset_field() {
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Foo { foo: 3 }).unwrap();
    let mut test = Foo { foo: 5 };
    env.load(&mut test).unwrap();
    assert_eq!(test.foo, 5);

    // preset fields need no value in the chain at all
    Env::new().load(&mut Foo { foo: 5 }).unwrap();
}

fn host_env() -> Env {
    Env::new().save_from(&Host::new(1), "Host.0").unwrap()
}

#[test]
fn match_required_field_missing() {
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Foo { foo: 5 }).unwrap();
    let err = env.load(&mut RoleRequest::new("host")).unwrap_err();
    assert_eq!(err, Error::from(PlanError::MissingField("role".into())));
    assert_eq!(err.to_string(), r#"test plan error: missing required field: "role""#);
}

#[test]
fn match_required_fields_missing() {
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Foo { foo: 5 }).unwrap();
    let err = env.load(&mut Request::player("bob", 3)).unwrap_err();
    assert_eq!(
        err,
        Error::from(PlanError::MissingFields(vec![
            "role".into(),
            "name".into(),
        ]))
    );
}

#[test]
fn match_field_with_wrong_type() {
    #[derive(Debug, Clone, Default, Fields)]
    struct NumericRole {
        #[steep(save)]
        pub role: u8,
        #[steep(save)]
        pub id: u32,
    }
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&NumericRole { role: 1, id: 1 }).unwrap();
    let err = env.load(&mut RoleRequest::new("host")).unwrap_err();
    assert_eq!(err, Error::from(PlanError::WrongType("role".into())));
}

#[test]
fn match_field_with_wrong_value() {
    let _tracing = init_test_tracing!();
    let alice = host_env().save(&Player::new("alice", 2)).unwrap();
    let mut test = Request::player("bob", 3);
    let err = alice.load(&mut test).unwrap_err();
    assert_eq!(err, Error::from(RunError::UnmatchedValue("name".into())));
    assert!(err.is_run());
    // never falls back to a default
    assert_eq!(test.id, 0);
}

#[test]
fn match_fields_not_co_resident() {
    #[derive(Debug, Clone, Default, Fields)]
    struct Named {
        #[steep(save)]
        pub name: String,
        #[steep(save)]
        pub id: u32,
    }
    #[derive(Debug, Clone, Default, Fields)]
    struct Roled {
        #[steep(save)]
        pub role: String,
    }
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Roled {
        role: "player".into(),
    })
    .unwrap()
    .save(&Named {
        name: "bob".into(),
        id: 3,
    })
    .unwrap();
    let err = env.load(&mut Request::player("bob", 3)).unwrap_err();
    assert_eq!(err, Error::from(RunError::NotCoResident));
    assert_eq!(
        err.to_string(),
        "test run error: required match fields not encountered on the same layer"
    );
}

#[test]
fn simple_match() {
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Player::new("alice", 5)).unwrap();
    let mut test = Request::player("alice", 5);
    env.load(&mut test).unwrap();
    assert_eq!(test.id, 5);
}

#[test]
fn ancestor_match() {
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Player::new("alice", 5))
        .unwrap()
        .save(&Player::new("bob", 3))
        .unwrap();
    let mut test = Request::player("alice", 5);
    env.load(&mut test).unwrap();
    assert_eq!(test.id, 5);
}

#[test]
fn host_and_players_resolve_their_ids() {
    let _tracing = init_test_tracing!();
    let host = host_env();
    let alice = host.save_from(&Player::new("alice", 2), "alice.0.Host").unwrap();
    let bob = host.save_from(&Player::new("bob", 3), "bob.0.Host").unwrap();

    let mut test = Request::player("bob", 3);
    bob.load(&mut test).unwrap();
    assert_eq!(test.id, 3);

    let mut test = Request::player("alice", 2);
    alice.load(&mut test).unwrap();
    assert_eq!(test.id, 2);

    for env in [&alice, &bob] {
        let mut test = RoleRequest::new("host");
        env.load(&mut test).unwrap();
        assert_eq!(test.id, 1);
    }
}

#[test]
fn match_keeps_ancestors_of_matching_layer() {
    #[derive(Debug, Clone, Default, Fields)]
    struct Lookup {
        #[steep(match)]
        pub name: String,
        #[steep(load)]
        pub id: u32,
        #[steep(load)]
        pub foo: i32,
    }
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Foo { foo: 42 })
        .unwrap()
        .save(&Player::new("alice", 2))
        .unwrap()
        .save(&Player::new("bob", 3))
        .unwrap();
    let matched = env
        .matching(&Lookup {
            name: "alice".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(matched.depth(), 2);

    let mut test = Lookup {
        name: "alice".into(),
        ..Default::default()
    };
    env.load(&mut test).unwrap();
    assert_eq!(test.id, 2);
    assert_eq!(test.foo, 42);
}

#[test]
fn match_drops_conflicting_ancestor_layers() {
    #[derive(Debug, Clone, Default, Fields)]
    struct Tagged {
        #[steep(save)]
        pub name: String,
        #[steep(save)]
        pub token: String,
    }
    #[derive(Debug, Clone, Default, Fields)]
    struct TokenLookup {
        #[steep(match)]
        pub name: String,
        #[steep(load)]
        pub token: String,
    }
    let _tracing = init_test_tracing!();
    let env = Env::from_test(&Tagged {
        name: "bob".into(),
        token: "secret".into(),
    })
    .unwrap()
    .save(&Player::new("alice", 2))
    .unwrap();

    let mut test = TokenLookup {
        name: "alice".into(),
        token: String::new(),
    };
    let err = env.load(&mut test).unwrap_err();
    assert_eq!(err, Error::from(PlanError::Unset("token".into())));

    let mut test = TokenLookup {
        name: "bob".into(),
        token: String::new(),
    };
    env.load(&mut test).unwrap();
    assert_eq!(test.token, "secret");
}

#[test]
fn matching_without_match_fields_is_identity() {
    let _tracing = init_test_tracing!();
    let env = host_env();
    let same = env.matching(&Foo::default()).unwrap();
    assert_eq!(same.depth(), env.depth());
    assert_eq!(same.to_string(), env.to_string());
}
