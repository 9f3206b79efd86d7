use ltl_domain::*;
use ltl_model::*;
use std::collections::BTreeSet;

/// A robot that may only pass a door another agent opens.
fn door_model() -> TransitionSystemModel {
    let mut m = TransitionSystemModel::new("door");
    m.add_variable(Variable::new_boolean("open", false))
        .add_variable(Variable::new_int("pos", 0, 2, 0));
    m.add_transition(
        Transition::parse("open_door", "!open", &["open := true"])
            .unwrap()
            .with_agent("keeper"),
    )
    .add_transition(
        Transition::parse("close_door", "open && pos != 1", &["open := false"])
            .unwrap()
            .with_agent("keeper"),
    )
    .add_transition(
        Transition::parse("approach", "pos == 0", &["pos := 1"])
            .unwrap()
            .with_agent("robot"),
    )
    .add_transition(
        Transition::parse("pass", "pos == 1 && open", &["pos := 2"])
            .unwrap()
            .with_agent("robot"),
    );
    m.add_predicate("through", Predicate::parse("pos == 2").unwrap());
    m.add_predicate("at_door", Predicate::parse("pos == 1").unwrap());
    m
}

fn reachable(m: &mut TransitionSystemModel) -> BTreeSet<ModelState> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![m.initial().unwrap()];
    while let Some(s) = stack.pop() {
        if seen.insert(s.clone()) {
            stack.extend(m.successors(&s).unwrap());
        }
    }
    seen
}

#[test]
fn state_space() {
    let mut m = door_model();
    let states = reachable(&mut m);
    assert_eq!(states.len(), 6);
    let mut e = m.evaluator();
    assert_eq!(states.iter().filter(|s| e.holds(s, "through").unwrap()).count(), 2);
    assert_eq!(states.iter().filter(|s| e.holds(s, "at_door").unwrap()).count(), 2);
    // the robot only gets through an open door
    assert!(states
        .iter()
        .filter(|s| m.value(s, "pos") == Some(Value::Int(2)))
        .any(|s| e.holds(s, "open").unwrap()));
}

#[test]
fn model_round_trips_through_json() {
    let m = door_model();
    let json = serde_json::to_string_pretty(&m).unwrap();
    let mut back = TransitionSystemModel::from_json(&json).unwrap();
    let mut original = door_model();
    assert_eq!(reachable(&mut back), reachable(&mut original));
}

#[test]
fn invalid_json_is_rejected() {
    assert!(matches!(
        TransitionSystemModel::from_json(r#"{ "name": 3 }"#),
        Err(MCError::Config(_))
    ));
}

#[test]
fn reductions_are_configured_from_options() {
    let mut m = door_model();
    m.configure(&ProgramOptions {
        partial_order_reduction: true,
        slicing: true,
        ample_set_size: 0,
        visible: hashset!["through".to_string()],
    })
    .unwrap();
    // everything influences the robot's position through the door guard
    assert_eq!(m.active_transitions().count(), 4);
    let s0 = m.initial().unwrap();
    // the keeper reads the robot's position and the robot moves visibly: no ample set
    assert_eq!(m.ample(&s0).unwrap(), None);
}
