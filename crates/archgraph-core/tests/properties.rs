use archgraph_core::config::LayerRuleConfig;
use archgraph_core::cycles::find_cycles;
use archgraph_core::{
    analyze, AnalysisContext, Category, Config, DependencyGraph, FactSet, FileFacts, RuleRef,
    ScoringModel, Severity, Violation,
};
use proptest::prelude::*;

const MAX_FILES: usize = 8;

fn file_name(i: usize) -> String {
    format!("src/f{i}.ts")
}

/// Files `src/f0.ts ..` with relative imports given as `(from, to, line)`.
fn facts_from(n: usize, edges: &[(usize, usize, usize)]) -> Vec<FileFacts> {
    (0..n)
        .map(|i| {
            edges
                .iter()
                .filter(|(from, _, _)| *from == i)
                .fold(FileFacts::new(&file_name(i)), |file, (_, to, line)| {
                    file.with_import(&format!("./f{to}"), *line)
                })
        })
        .collect()
}

fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize, usize)>)> {
    (1..=MAX_FILES).prop_flat_map(|n| {
        let edge = (0..n, 0..n, 1..50usize);
        (Just(n), prop::collection::vec(edge, 0..20))
    })
}

fn arb_dag() -> impl Strategy<Value = (usize, Vec<(usize, usize, usize)>)> {
    arb_graph().prop_map(|(n, edges)| {
        let forward = edges
            .into_iter()
            .filter(|(from, to, _)| from < to)
            .collect();
        (n, forward)
    })
}

fn arb_violation() -> impl Strategy<Value = Violation> {
    let rule = RuleRef {
        from: "*".to_string(),
        to: "*".to_string(),
    };
    prop_oneof![
        (1..100usize).prop_map(move |line| Violation::layer(
            "a.ts",
            line,
            Severity::Blocked,
            0,
            rule.clone(),
            "./b"
        )),
        (1..100usize).prop_map(|line| Violation::layer(
            "a.ts",
            line,
            Severity::Warning,
            1,
            RuleRef {
                from: "x".to_string(),
                to: "y".to_string(),
            },
            "./c"
        )),
        (1..100usize).prop_map(|line| Violation::circular(
            "a.ts",
            line,
            vec!["a.ts".to_string(), "b.ts".to_string()]
        )),
        (1..100usize, 201..500usize)
            .prop_map(|(line, length)| Violation::complexity("a.ts", line, "f", length)),
    ]
}

fn rules_config() -> Config {
    let mut config = Config::default();
    config.rules.forbidden = vec![
        LayerRuleConfig::new("src/f0.ts", "*", Severity::Warning),
        LayerRuleConfig::new("*", "src/f1.ts", Severity::Blocked),
    ];
    config
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn report_is_independent_of_input_order(
        (files, shuffled) in arb_graph().prop_flat_map(|(n, edges)| {
            let files = facts_from(n, &edges);
            (Just(files.clone()), Just(files).prop_shuffle())
        })
    ) {
        let config = rules_config();
        let a = analyze(&FactSet::new(files), &config).unwrap();
        let b = analyze(&FactSet::new(shuffled), &config).unwrap();
        prop_assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn analysis_is_idempotent((n, edges) in arb_graph()) {
        let facts = FactSet::new(facts_from(n, &edges));
        let config = rules_config();
        let first = analyze(&facts, &config).unwrap();
        let second = analyze(&facts, &config).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn reported_cycles_follow_real_edges((n, edges) in arb_graph()) {
        let ctx = AnalysisContext::compile(&Config::default()).unwrap();
        let graph = DependencyGraph::build(&FactSet::new(facts_from(n, &edges)), &ctx).unwrap();
        for cycle in find_cycles(&graph) {
            prop_assert!(!cycle.is_empty());
            let len = cycle.len();
            for i in 0..len {
                let from = cycle.members[i];
                let to = cycle.members[(i + 1) % len];
                prop_assert!(graph.has_edge(from, to));
            }
            // Canonical rotation starts at the smallest member.
            prop_assert_eq!(cycle.members.iter().min(), cycle.members.first());
        }
    }

    #[test]
    fn every_node_on_a_cycle_is_reported((n, edges) in arb_graph()) {
        let ctx = AnalysisContext::compile(&Config::default()).unwrap();
        let graph = DependencyGraph::build(&FactSet::new(facts_from(n, &edges)), &ctx).unwrap();
        let cycles = find_cycles(&graph);
        for (from, to, _) in &edges {
            if from == to {
                let idx = graph.index_of(&file_name(*from)).unwrap();
                prop_assert!(cycles.iter().any(|c| c.members == vec![idx]));
            } else if edges.iter().any(|(f, t, _)| f == to && t == from) {
                let idx = graph.index_of(&file_name(*from)).unwrap();
                prop_assert!(cycles.iter().any(|c| c.members.len() > 1 && c.members.contains(&idx)));
            }
        }
    }

    #[test]
    fn acyclic_graph_has_no_circular_violations((n, edges) in arb_dag()) {
        let report = analyze(&FactSet::new(facts_from(n, &edges)), &Config::default()).unwrap();
        prop_assert_eq!(report.summary.circular_dependencies, 0);
        prop_assert!(report.violations.iter().all(|v| v.category != Category::Circular));
    }

    #[test]
    fn self_import_yields_one_cycle(occurrences in 1..10usize) {
        let file = (1..=occurrences).fold(FileFacts::new("src/a.ts"), |f, line| {
            f.with_import("./a", line)
        });
        let report = analyze(&FactSet::new(vec![file]), &Config::default()).unwrap();
        prop_assert_eq!(report.summary.circular_dependencies, 1);
        prop_assert_eq!(report.violations.len(), 1);
        prop_assert_eq!(report.violations[0].line, 1);
    }

    #[test]
    fn edge_matching_k_rules_yields_k_violations(k in 0..6usize, misses in 0..4usize) {
        let mut config = Config::default();
        for _ in 0..k {
            config.rules.forbidden.push(LayerRuleConfig::new("*", "*", Severity::Blocked));
        }
        for _ in 0..misses {
            config.rules.forbidden.push(LayerRuleConfig::new("service", "*", Severity::Blocked));
        }
        let facts = FactSet::new(vec![
            FileFacts::new("src/a.ts").with_import("./b", 1),
            FileFacts::new("src/b.ts"),
        ]);
        let report = analyze(&facts, &config).unwrap();
        prop_assert_eq!(report.violations.len(), k);
    }

    #[test]
    fn score_never_increases_when_violations_are_added(
        base in prop::collection::vec(arb_violation(), 0..40),
        extra in arb_violation(),
    ) {
        let model = ScoringModel::default();
        let before = model.calculate(&base);
        let mut more = base.clone();
        more.push(extra);
        let after = model.calculate(&more);
        prop_assert!(after.total <= before.total);
        prop_assert!(after.grade >= before.grade);
        prop_assert_eq!(model.calculate(&base), before);
    }
}
