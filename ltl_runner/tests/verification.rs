use ltl_domain::*;
use ltl_formal::*;
use ltl_model::*;
use ltl_runner::*;

fn ring(p_at: Option<u32>) -> GraphProgram {
    let mut g = GraphProgram::new(0);
    g.edge(0, 1).edge(1, 2).edge(2, 0).edge(1, 3).edge(3, 3);
    if let Some(n) = p_at {
        g.label(n, "p");
    }
    g
}

fn check(property: &str, g: GraphProgram, directives: Directives) -> RunReport<Node> {
    let labels = g.labels();
    let mut v = Verification::new(property, g, labels, directives).unwrap();
    let report = v.run();
    assert_eq!(v.program().disposals(), 1);
    report
}

#[test]
fn globally_not_p() {
    let report = check("G !p", ring(None), Directives::default());
    assert!(report.is_pass());
    assert_eq!(report.property, "G !p");
    assert!(report.stats.product_nodes > 0);
    assert!(report.finished >= report.started);
    assert_eq!(report.run_id.get_version_num(), 4);

    let report = check("G !p", ring(Some(3)), Directives::default());
    let c = report.counterexample().unwrap();
    assert!(c
        .prefix
        .iter()
        .chain(c.cycle.iter())
        .any(|s| s.program == Node(3)));
    assert!(!c.cycle.is_empty());
}

#[test]
fn p_only_where_it_cannot_be_reached() {
    // 1 is labelled p but nothing leads there
    let mut g = GraphProgram::new(0);
    g.edge(0, 0).edge(1, 0).label(1, "p");
    let report = check("G !p", g, Directives::default());
    assert!(report.is_pass());
}

#[test]
fn p_at_the_initial_state() {
    let mut g = GraphProgram::new(0);
    g.edge(0, 0).edge(1, 0).label(0, "p");
    let report = check("G !p", g, Directives::default());
    let c = report.counterexample().unwrap();
    assert!(!c.prefix.is_empty() && !c.cycle.is_empty());
    assert!(c
        .prefix
        .iter()
        .chain(c.cycle.iter())
        .all(|s| s.program == Node(0)));
    assert!(c
        .prefix
        .iter()
        .any(|s| s.property.literals().contains(&Formula::prop("p"))));
}

#[test]
fn liveness_with_an_escape() {
    // every run may leave the ring for the sink at 3
    let report = check("G F p", ring(Some(0)), Directives::default());
    let c = report.counterexample().unwrap();
    assert!(c.cycle.iter().all(|s| s.program == Node(3)));

    let report = check("F G !p", ring(Some(0)), Directives::default());
    assert!(report.is_violation());
}

#[test]
fn syntax_errors_are_rejected() {
    let g = ring(None);
    let labels = g.labels();
    assert!(matches!(
        Verification::new("G (p", g, labels, Directives::default()),
        Err(MCError::Syntax(_))
    ));
}

#[test]
fn eager_generation_agrees_with_on_the_fly() {
    let eager = Directives {
        on_the_fly_program: false,
        on_the_fly_property: false,
        ..Directives::default()
    };
    for (property, p_at) in [("G !p", None), ("G !p", Some(2)), ("p U X p", Some(1))] {
        let lazy = check(property, ring(p_at), Directives::default());
        let generated = check(property, ring(p_at), eager.clone());
        assert_eq!(lazy.outcome, generated.outcome, "{property}");
    }
}

#[test]
fn evaluation_errors_end_the_run() {
    let g = ring(None);
    let broken = |_: &Node, prop: &str| -> MCResult<bool> {
        Err(MCError::Evaluation(format!("cannot decide {prop}")))
    };
    let mut v = Verification::new("G !p", g, broken, Directives::default()).unwrap();
    let report = v.run();
    assert!(matches!(report.outcome, Outcome::Error(MCError::Evaluation(_))));
    assert!(v.is_disposed());
}

#[test]
fn advisories_are_reported_but_do_not_block() {
    let mut g = ring(None);
    g.construct(Construct::new(ConstructKind::Communication, "agent `a`, line 3"));
    let directives = Directives::default().with_por(true);
    let report = check("G (p -> X p)", g, directives);
    assert!(report.is_pass());
    assert!(report.advisories.contains(&Advisory::NotStutterInvariant));
    assert!(report.advisories.contains(&Advisory::Unsupported {
        construct: Construct::new(ConstructKind::Communication, "agent `a`, line 3"),
        concern: Concern::BreaksReduction,
    }));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"], "Pass");
    assert_eq!(json["advisories"].as_array().unwrap().len(), 3);
}

/// A robot that may only pass a door another agent opens.
fn door_model() -> TransitionSystemModel {
    let mut m = TransitionSystemModel::new("door");
    m.add_variable(Variable::new_boolean("open", false))
        .add_variable(Variable::new_int("pos", 0, 2, 0));
    m.add_transition(Transition::parse("open_door", "!open", &["open := true"]).unwrap().with_agent("keeper"))
        .add_transition(
            Transition::parse("close_door", "open && pos != 1", &["open := false"])
                .unwrap()
                .with_agent("keeper"),
        )
        .add_transition(Transition::parse("approach", "pos == 0", &["pos := 1"]).unwrap().with_agent("robot"))
        .add_transition(Transition::parse("pass", "pos == 1 && open", &["pos := 2"]).unwrap().with_agent("robot"));
    m.add_predicate("through", Predicate::parse("pos == 2").unwrap());
    m.add_predicate("at_door", Predicate::parse("pos == 1").unwrap());
    m
}

#[test]
fn door_model_end_to_end() {
    let m = door_model();
    let evaluator = m.evaluator();
    let mut v = Verification::new("G !through", m, evaluator, Directives::default()).unwrap();
    let report = v.run();
    let c = report.counterexample().unwrap();
    assert!(c
        .prefix
        .iter()
        .chain(c.cycle.iter())
        .any(|s| v.program().value(&s.program, "pos") == Some(Value::Int(2))));
    assert!(v.program().is_disposed());

    // the keeper may close the door behind the robot
    let m = door_model();
    let evaluator = m.evaluator();
    let mut v = Verification::new("G (through -> open)", m, evaluator, Directives::default()).unwrap();
    assert!(v.run().is_violation());

    // and once through, the robot stays through
    let m = door_model();
    let evaluator = m.evaluator();
    let mut v = Verification::new("G (through -> G through)", m, evaluator, Directives::default()).unwrap();
    assert!(v.run().is_pass());
}

/// Agents counting private counters up to 2, and back to 0 when `wrap`.
fn counters(agents: usize, wrap: bool) -> TransitionSystemModel {
    let steps: &[(i32, i32)] = if wrap { &[(0, 1), (1, 2), (2, 0)] } else { &[(0, 1), (1, 2)] };
    let mut m = TransitionSystemModel::new("counters");
    for i in 0..agents {
        let c = format!("c_{i}");
        m.add_variable(Variable::new_int(&c, 0, 2, 0));
        for (from, to) in steps {
            m.add_transition(
                Transition::parse(
                    &format!("step_{i}_{from}"),
                    &format!("{c} == {from}"),
                    &[&format!("{c} := {to}")],
                )
                .unwrap()
                .with_agent(&format!("agent_{i}")),
            );
        }
    }
    m.add_predicate("wrapped", Predicate::parse("c_0 == 2").unwrap());
    m.add_predicate("overflow", Predicate::parse("c_0 == 3").unwrap());
    m
}

#[test]
fn reduction_keeps_the_verdict() {
    for property in ["G !overflow", "G !wrapped", "G (wrapped -> F !wrapped)"] {
        let mut stats = vec![];
        for por in [false, true] {
            let m = counters(3, true);
            let evaluator = m.evaluator();
            let directives = Directives::default().with_por(por);
            let mut v = Verification::new(property, m, evaluator, directives).unwrap();
            assert!(v.advisories().is_empty());
            let report = v.run();
            stats.push((report.is_pass(), report.stats));
        }
        let (full, reduced) = (&stats[0], &stats[1]);
        assert_eq!(full.0, reduced.0, "{property}");
        if full.0 {
            assert!(reduced.1.visited_nodes <= full.1.visited_nodes, "{property}");
        }
        assert_eq!(full.1.reduced_nodes, 0);
    }
}

#[test]
fn reduction_shrinks_a_full_search() {
    let run = |por: bool| {
        let m = counters(3, false);
        let evaluator = m.evaluator();
        let mut v =
            Verification::new("G !overflow", m, evaluator, Directives::default().with_por(por)).unwrap();
        v.run()
    };
    let full = run(false);
    let reduced = run(true);
    assert!(full.is_pass() && reduced.is_pass());
    assert!(reduced.stats.reduced_nodes > 0);
    // one interleaving per agent instead of all 27 states
    assert_eq!(full.stats.visited_nodes, 28);
    assert_eq!(reduced.stats.visited_nodes, 8);
}
