//! End-to-end scenarios over small hand-written programs

use crate::support::*;
use datalog::{
    evaluate, optimise, stratify, BuiltinRegistry, Configuration, EvaluationContext,
    EvaluationStrategy, FactDatabase, KnowledgeBase, Literal, MagicSetsError, Predicate, Query,
    QueryResult, Rule, Term,
};

fn answer(
    facts: &FactDatabase,
    rules: &[Rule],
    query: &Query,
    magic_sets: bool,
) -> anyhow::Result<(QueryResult, bool)> {
    let config = Configuration {
        magic_sets,
        ..Configuration::default()
    };
    let kb = KnowledgeBase::new(
        facts.clone(),
        rules.to_vec(),
        config,
        BuiltinRegistry::standard(),
    )?;
    let result = kb.execute(query)?;
    Ok((result, kb.optimisation_succeeded()))
}

fn same_generation_facts() -> FactDatabase {
    facts(vec![
        atom("up", &["john", "p"]),
        atom("flat", &["p", "q"]),
        atom("flat", &["q", "r"]),
        atom("flat", &["r", "s"]),
        atom("down", &["s", "y"]),
        atom("flat", &["john", "ann"]),
        // Unrelated to john
        atom("up", &["mary", "m"]),
        atom("flat", &["m", "n"]),
        atom("flat", &["n", "o"]),
        atom("flat", &["o", "k"]),
        atom("down", &["k", "z"]),
    ])
}

#[test]
fn test_same_generation() -> anyhow::Result<()> {
    let rules = same_generation_rules();
    let query = query(vec![pos("sg", &["john", "Y"])]);

    let (optimised, used_magic) = answer(&same_generation_facts(), &rules, &query, true)?;
    let (plain, _) = answer(&same_generation_facts(), &rules, &query, false)?;
    assert!(used_magic);
    assert_eq!(optimised, plain);
    assert_eq!(optimised.tuples(), vec![vec![term("ann")], vec![term("y")]]);
    Ok(())
}

#[test]
fn test_same_generation_rewrite_derives_only_relevant_facts() -> anyhow::Result<()> {
    let rules = same_generation_rules();
    let query = query(vec![pos("sg", &["john", "Y"])]);
    let rewritten = optimise(&rules, &query)?;

    let registry = BuiltinRegistry::standard();
    let config = Configuration::default();
    let ctx = EvaluationContext::new(&registry, &config);
    let (model, _) = evaluate(&rewritten.rules, same_generation_facts(), &ctx)?;

    let magic = model
        .iter()
        .find(|(predicate, _)| matches!(predicate, Predicate::Magic(_)))
        .map(|(_, relation)| relation.sorted())
        .unwrap_or_default();
    // mary's branch is never asked about
    assert_eq!(magic, vec![vec![term("john")], vec![term("p")], vec![term("r")]]);
    Ok(())
}

#[test]
fn test_equality_builtin_in_rule_body() -> anyhow::Result<()> {
    // r(b, b). r(c, c).   p(U, V, W) :- r(V, W), EQ(U, a).   ?- p(U, V, W).
    let facts = facts(vec![atom("r", &["b", "b"]), atom("r", &["c", "c"])]);
    let rules = vec![rule(
        atom("p", &["U", "V", "W"]),
        vec![
            pos("r", &["V", "W"]),
            Literal::builtin("EQ", vec![term("U"), term("a")]),
        ],
    )];
    let query = query(vec![pos("p", &["U", "V", "W"])]);

    let (result, used_magic) = answer(&facts, &rules, &query, true)?;
    assert!(!used_magic);
    assert_eq!(
        result.tuples(),
        vec![
            vec![term("a"), term("b"), term("b")],
            vec![term("a"), term("c"), term("c")],
        ]
    );
    Ok(())
}

fn conjunctive_rules() -> Vec<Rule> {
    vec![
        rule(atom("p", &["X", "Y"]), vec![pos("c", &["X", "Y"])]),
        rule(atom("r", &["X", "Y", "Z"]), vec![pos("c", &["X", "Y", "Z"])]),
        rule(atom("s", &["X", "Y"]), vec![pos("c", &["X", "Y"])]),
    ]
}

fn conjunctive_facts() -> FactDatabase {
    facts(vec![
        atom("c", &["x1", "a"]),
        atom("c", &["x2", "a"]),
        atom("c", &["e", "y1"]),
        atom("c", &["b", "x1", "y1"]),
        atom("c", &["b", "x2", "y2"]),
        atom("c", &["d", "x1", "y3"]),
    ])
}

#[test]
fn test_conjunctive_query_shared_constant() -> anyhow::Result<()> {
    // ?- p(X, a), r(b, X, Y), s(e, Y).
    let query = query(vec![
        pos("p", &["X", "a"]),
        pos("r", &["b", "X", "Y"]),
        pos("s", &["e", "Y"]),
    ]);
    let rewritten = optimise(&conjunctive_rules(), &query)?;
    let rendered: Vec<String> = rewritten.rules.iter().map(|r| r.to_string()).collect();
    assert!(rendered.contains(&"magic_r^bbf(b, X) :- p^fb(X, a).".to_string()));
    assert!(rendered.contains(&"magic_s^bb(e, Y) :- p^fb(X, a), r^bbf(b, X, Y).".to_string()));

    let (optimised, used_magic) = answer(&conjunctive_facts(), &conjunctive_rules(), &query, true)?;
    let (plain, _) = answer(&conjunctive_facts(), &conjunctive_rules(), &query, false)?;
    assert!(used_magic);
    assert_eq!(optimised, plain);
    assert_eq!(optimised.tuples(), vec![vec![term("x1"), term("y1")]]);
    Ok(())
}

#[test]
fn test_all_variable_query_falls_back() -> anyhow::Result<()> {
    // ?- a(A, B), b(C, D), c(E, F).
    let rules = vec![
        rule(atom("a", &["X", "Y"]), vec![pos("e", &["X", "Y"])]),
        rule(atom("b", &["X", "Y"]), vec![pos("e", &["Y", "X"])]),
        rule(atom("c", &["X", "Y"]), vec![pos("e", &["X", "X"]), pos("e", &["Y", "Y"])]),
    ];
    let query = query(vec![
        pos("a", &["A", "B"]),
        pos("b", &["C", "D"]),
        pos("c", &["E", "F"]),
    ]);
    assert!(matches!(
        optimise(&rules, &query),
        Err(MagicSetsError::UnrewritableQuery { .. })
    ));

    let facts = facts(vec![atom("e", &["k", "k"])]);
    let (result, used_magic) = answer(&facts, &rules, &query, true)?;
    assert!(!used_magic);
    assert_eq!(result.variables.len(), 6);
    assert_eq!(result.len(), 1);
    Ok(())
}

#[test]
fn test_stratification_examples() {
    // p(X) :- r(X).  p(X) :- p(X).  q(X) :- s(X), not p(X).
    let stratified = vec![
        rule(atom("p", &["X"]), vec![pos("r", &["X"])]),
        rule(atom("p", &["X"]), vec![pos("p", &["X"])]),
        rule(atom("q", &["X"]), vec![pos("s", &["X"]), neg("p", &["X"])]),
    ];
    let strata = stratify(&stratified).expect("no cycle through negation");
    let p = strata.stratum_of(&Predicate::plain("p", 1)).unwrap();
    let q = strata.stratum_of(&Predicate::plain("q", 1)).unwrap();
    assert!(p < q);

    // p(X) :- r(X), not q(X).  q(X) :- r(X), not p(X).
    let cyclic = vec![
        rule(atom("p", &["X"]), vec![pos("r", &["X"]), neg("q", &["X"])]),
        rule(atom("q", &["X"]), vec![pos("r", &["X"]), neg("p", &["X"])]),
    ];
    assert!(stratify(&cyclic).is_err());
}

#[test]
fn test_negation_under_magic_sets() -> anyhow::Result<()> {
    // q(X) :- s(X), not p(X).   p(X) :- t(X).
    let rules = vec![
        rule(atom("q", &["X"]), vec![pos("s", &["X"]), neg("p", &["X"])]),
        rule(atom("p", &["X"]), vec![pos("t", &["X"])]),
    ];
    let facts = facts(vec![
        atom("s", &["a"]),
        atom("s", &["b"]),
        atom("t", &["b"]),
    ]);

    let (holds, used_magic) = answer(&facts, &rules, &query(vec![pos("q", &["a"])]), true)?;
    assert!(used_magic);
    assert!(holds.holds());
    let (fails, _) = answer(&facts, &rules, &query(vec![pos("q", &["b"])]), true)?;
    assert!(!fails.holds());

    // Unbound: no seed, evaluated without magic sets
    let (all, used_magic) = answer(&facts, &rules, &query(vec![pos("q", &["X"])]), true)?;
    assert!(!used_magic);
    assert_eq!(all.tuples(), vec![vec![term("a")]]);
    Ok(())
}

#[test]
fn test_seed_is_idempotent() -> anyhow::Result<()> {
    let query = query(vec![pos("ancestor", &["a", "Y"])]);
    let rewritten = optimise(&ancestor_rules(), &query)?;
    let seed = rewritten
        .rules
        .iter()
        .find(|r| r.body.is_empty())
        .cloned()
        .expect("bound query has a seed");

    // The seed fired twice still yields one magic tuple
    let mut rules = rewritten.rules.clone();
    rules.push(seed.clone());
    let facts = facts(vec![atom("parent", &["a", "b"])]);
    let registry = BuiltinRegistry::standard();
    let config = Configuration::default();
    let ctx = EvaluationContext::new(&registry, &config);
    let (model, _) = evaluate(&rules, facts, &ctx)?;
    let magic = model
        .relation(&seed.head.predicate)
        .expect("seed relation exists");
    assert_eq!(magic.len(), 1);
    Ok(())
}

#[test]
fn test_arithmetic_recursion() -> anyhow::Result<()> {
    // count(0).  count(Y) :- count(X), LESS(X, 5), ADD(X, 1, Y).
    let rules = vec![
        Rule::fact(datalog::Atom::new("count", vec![Term::int(0)])),
        rule(
            atom("count", &["Y"]),
            vec![
                pos("count", &["X"]),
                Literal::builtin("LESS", vec![term("X"), Term::int(5)]),
                Literal::builtin("ADD", vec![term("X"), Term::int(1), term("Y")]),
            ],
        ),
    ];
    let (result, _) = answer(&FactDatabase::new(), &rules, &query(vec![pos("count", &["N"])]), true)?;
    assert_eq!(result.len(), 6);
    Ok(())
}

#[test]
fn test_configuration_from_json() -> anyhow::Result<()> {
    let config: Configuration =
        serde_json::from_str(r#"{ "strategy": "naive", "magic_sets": false }"#)?;
    assert_eq!(config.strategy, EvaluationStrategy::Naive);

    let mut facts = FactDatabase::new();
    int_pairs(&mut facts, "parent", &[(1, 2), (2, 3)]);
    let kb = KnowledgeBase::new(facts, ancestor_rules(), config, BuiltinRegistry::standard())?;
    let result = kb.execute(&query(vec![Literal::positive(datalog::Atom::new(
        "ancestor",
        vec![Term::int(1), term("Y")],
    ))]))?;
    assert!(!kb.optimisation_succeeded());
    assert_eq!(result.tuples(), vec![vec![Term::int(2)], vec![Term::int(3)]]);
    Ok(())
}
