//! Property-based tests over randomly generated fact sets
//!
//! Small node domains keep the generated graphs dense enough to exercise
//! recursion, joins and negation.

use crate::support::*;
use datalog::{
    evaluate, optimise, BuiltinRegistry, Configuration, EvaluationContext, EvaluationStrategy,
    FactDatabase, KnowledgeBase, Literal, Query, Rule, Term,
};
use proptest::prelude::*;

fn edges_strategy(nodes: i64, max_edges: usize) -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0..nodes, 0..nodes), 0..max_edges)
}

fn int_query(predicate: &str, constant: i64) -> Query {
    Query::new(vec![Literal::positive(datalog::Atom::new(
        predicate,
        vec![Term::int(constant), term("Y")],
    ))])
}

fn run(rules: &[Rule], facts: FactDatabase, strategy: EvaluationStrategy) -> FactDatabase {
    let registry = BuiltinRegistry::standard();
    let config = Configuration {
        strategy,
        ..Configuration::default()
    };
    let ctx = EvaluationContext::new(&registry, &config);
    evaluate(rules, facts, &ctx).expect("program evaluates").0
}

/// Answers with and without magic sets
fn both_answers(
    facts: &FactDatabase,
    rules: &[Rule],
    query: &Query,
) -> (datalog::QueryResult, datalog::QueryResult) {
    let execute = |magic_sets: bool| {
        let config = Configuration {
            magic_sets,
            ..Configuration::default()
        };
        KnowledgeBase::new(facts.clone(), rules.to_vec(), config, BuiltinRegistry::standard())
            .expect("valid program")
            .execute(query)
            .expect("query evaluates")
    };
    (execute(true), execute(false))
}

fn reachability_with_negation() -> Vec<Rule> {
    // reach(X, Y) :- edge(X, Y).
    // reach(X, Z) :- reach(X, Y), edge(Y, Z).
    // cut(X, Y) :- node(X), node(Y), not reach(X, Y).
    vec![
        rule(atom("reach", &["X", "Y"]), vec![pos("edge", &["X", "Y"])]),
        rule(
            atom("reach", &["X", "Z"]),
            vec![pos("reach", &["X", "Y"]), pos("edge", &["Y", "Z"])],
        ),
        rule(
            atom("cut", &["X", "Y"]),
            vec![
                pos("node", &["X"]),
                pos("node", &["Y"]),
                neg("reach", &["X", "Y"]),
            ],
        ),
    ]
}

fn triples_strategy(nodes: i64, max: usize) -> impl Strategy<Value = Vec<(i64, i64, i64)>> {
    prop::collection::vec((0..nodes, 0..nodes, 0..nodes), 0..max)
}

fn int_triples(db: &mut FactDatabase, name: &str, triples: &[(i64, i64, i64)]) {
    for &(a, b, c) in triples {
        db.insert_atom(&datalog::Atom::new(
            name,
            vec![Term::int(a), Term::int(b), Term::int(c)],
        ))
        .expect("ternary facts");
    }
}

/// Bindings reach `a(X, A, B)` from both the head and `b(X, A)`
fn multiple_edge_rules() -> Vec<Rule> {
    // a(X, Y, Z) :- c(X, Y, Z).
    // a(X, Y, Z) :- b(X, A), a(X, A, B), c(B, Y, Z).
    vec![
        rule(atom("a", &["X", "Y", "Z"]), vec![pos("c", &["X", "Y", "Z"])]),
        rule(
            atom("a", &["X", "Y", "Z"]),
            vec![
                pos("b", &["X", "A"]),
                pos("a", &["X", "A", "B"]),
                pos("c", &["B", "Y", "Z"]),
            ],
        ),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn test_semi_naive_equals_naive(edges in edges_strategy(6, 14)) {
        let mut facts = FactDatabase::new();
        int_pairs(&mut facts, "parent", &edges);

        let semi = run(&ancestor_rules(), facts.clone(), EvaluationStrategy::SemiNaive);
        let naive = run(&ancestor_rules(), facts, EvaluationStrategy::Naive);
        prop_assert_eq!(semi, naive);
    }

    #[test]
    fn test_magic_sets_preserve_transitive_closure(
        edges in edges_strategy(6, 14),
        source in 0..6i64,
    ) {
        let mut facts = FactDatabase::new();
        int_pairs(&mut facts, "parent", &edges);

        let (optimised, plain) = both_answers(&facts, &ancestor_rules(), &int_query("ancestor", source));
        prop_assert_eq!(optimised, plain);
    }

    #[test]
    fn test_magic_sets_preserve_same_generation(
        up in edges_strategy(5, 8),
        flat in edges_strategy(5, 8),
        down in edges_strategy(5, 8),
        source in 0..5i64,
    ) {
        let mut facts = FactDatabase::new();
        int_pairs(&mut facts, "up", &up);
        int_pairs(&mut facts, "flat", &flat);
        int_pairs(&mut facts, "down", &down);

        let (optimised, plain) =
            both_answers(&facts, &same_generation_rules(), &int_query("sg", source));
        prop_assert_eq!(optimised, plain);
    }

    #[test]
    fn test_magic_sets_preserve_negation(
        edges in edges_strategy(5, 10),
        source in 0..5i64,
    ) {
        let mut facts = FactDatabase::new();
        int_pairs(&mut facts, "edge", &edges);
        for n in 0..5 {
            facts
                .insert_atom(&datalog::Atom::new("node", vec![Term::int(n)]))
                .expect("unary facts");
        }

        let (optimised, plain) =
            both_answers(&facts, &reachability_with_negation(), &int_query("cut", source));
        prop_assert_eq!(optimised, plain);
    }

    #[test]
    fn test_magic_sets_keep_base_facts_of_derived_predicates(
        edges in edges_strategy(6, 10),
        known in edges_strategy(6, 6),
        source in 0..6i64,
    ) {
        let mut facts = FactDatabase::new();
        int_pairs(&mut facts, "parent", &edges);
        int_pairs(&mut facts, "ancestor", &known);

        let (optimised, plain) = both_answers(&facts, &ancestor_rules(), &int_query("ancestor", source));
        prop_assert_eq!(optimised, plain);
    }

    #[test]
    fn test_magic_sets_preserve_labeled_rules(
        b in edges_strategy(4, 8),
        c in triples_strategy(4, 10),
        a in triples_strategy(4, 4),
        x in 0..4i64,
        y in 0..4i64,
        bind_second in any::<bool>(),
    ) {
        let mut facts = FactDatabase::new();
        int_pairs(&mut facts, "b", &b);
        int_triples(&mut facts, "c", &c);
        int_triples(&mut facts, "a", &a);

        let second = if bind_second { Term::int(y) } else { term("Y") };
        let query = Query::new(vec![Literal::positive(datalog::Atom::new(
            "a",
            vec![Term::int(x), second, term("Z")],
        ))]);
        let (optimised, plain) = both_answers(&facts, &multiple_edge_rules(), &query);
        prop_assert_eq!(optimised, plain);
    }

    #[test]
    fn test_adornment_is_deterministic(source in 0..5i64, bound_second in any::<bool>()) {
        let query = if bound_second {
            Query::new(vec![Literal::positive(datalog::Atom::new(
                "sg",
                vec![term("X"), Term::int(source)],
            ))])
        } else {
            int_query("sg", source)
        };
        let first = optimise(&same_generation_rules(), &query);
        let second = optimise(&same_generation_rules(), &query);
        prop_assert_eq!(first, second);
    }
}
