//! Magic-sets rewriting
//!
//! Bottom-up evaluation computes every fact a program implies, even when a
//! query only asks about a few constants. Magic sets rewrite the program so
//! that evaluation only derives facts relevant to the query: each adorned
//! predicate `p^a` gets a guard `magic_p^a` holding the bound arguments `p^a`
//! is actually asked for, and every rule for `p^a` is guarded by it.
//!
//! # Generated Rules
//!
//! - **Seeds**: `magic_q^a(c).` for the bindings the query supplies directly
//! - **Magic rules**: for a body literal `p^a(..)` of an adorned rule,
//!   `magic_p^a(bound args) :- magic_head, literals passing bindings to it`
//! - **Labeled rules**: when bindings reach a literal along several SIP
//!   edges, one `label_p_i^a'` rule per edge and a magic rule joining them
//! - **Rewritten rules**: `head^a :- magic_head^a, body` with body literals
//!   over derived predicates adorned
//! - **Base-fact rules** ([`base_fact_rules`]): `p^a(..) :- magic_p^a, p(..)`
//!   for derived predicates that also have stored facts
//!
//! Rules for predicates that are only referenced plainly (under negation,
//! for instance) are kept unchanged.
//!
//! # Example
//!
//! ```ignore
//! // sg(X, Y) :- flat(X, Y).
//! // ?- sg(john, Y).
//! let result = optimise(&rules, &query)?;
//! // magic_sg^bf(john).
//! // sg^bf(X, Y) :- magic_sg^bf(X), flat(X, Y).
//! // ?- sg^bf(john, Y).
//! ```

use crate::adornment::{AdornedProgram, AdornedRule};
use crate::sip::{NodeId, Sip, HEAD};
use datalog_ast::{AdornedPredicate, Atom, Literal, Predicate, Query, Rule, Term};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use tracing::{debug, trace};

/// Magic-sets rewriting is not applicable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MagicSetsError {
    /// No positive query literal carries a constant to seed the rewriting
    #[error("query '{query}' has no bound argument to seed magic sets")]
    UnrewritableQuery { query: String },
}

/// Rewritten rules together with the query to run against them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicSetsResult {
    pub rules: Vec<Rule>,
    pub query: Query,
}

/// Rewrite `rules` for answering `query`
///
/// Fails when the query binds nothing, in which case the original program
/// should be evaluated instead.
pub fn optimise(rules: &[Rule], query: &Query) -> Result<MagicSetsResult, MagicSetsError> {
    let seeded = query.body.iter().any(|literal| match literal {
        Literal::Positive(atom) => atom.terms.iter().any(|t| t.is_ground()),
        _ => false,
    });
    if !seeded {
        return Err(MagicSetsError::UnrewritableQuery {
            query: query.to_string(),
        });
    }

    let program = AdornedProgram::new(rules, query);
    let mut output = RuleSet::default();

    query_rules(&program.query, &program.query_sip, &mut output);
    for adorned in &program.rules {
        magic_rules(adorned, &mut output);
        output.push(rewritten_rule(adorned));
    }
    keep_plain_rules(rules, &program.query, &mut output);

    debug!(
        adorned = program.adorned_predicates.len(),
        rules = output.rules.len(),
        "rewrote program with magic sets"
    );
    Ok(MagicSetsResult {
        rules: output.rules,
        query: program.query,
    })
}

/// Rules in insertion order, without duplicates
#[derive(Default)]
struct RuleSet {
    rules: Vec<Rule>,
    seen: HashSet<Rule>,
    labels: usize,
}

impl RuleSet {
    /// Label numbers are unique over the whole rewrite, so labeled rules of
    /// different body occurrences never share a relation
    fn next_label(&mut self) -> usize {
        self.labels += 1;
        self.labels
    }

    fn push(&mut self, rule: Rule) {
        if self.seen.insert(rule.clone()) {
            trace!(rule = %rule, "generated rule");
            self.rules.push(rule);
        }
    }
}

/// `magic_p^a(bound args)` for a literal over an adorned predicate
///
/// `None` when the literal is not adorned or nothing is bound.
pub fn magic_atom(atom: &Atom) -> Option<Atom> {
    let adorned = atom.predicate.adorned()?;
    if adorned.is_all_free() {
        return None;
    }
    Some(Atom::with_predicate(
        Predicate::Magic(adorned.clone()),
        adorned.bound_terms(&atom.terms),
    ))
}

/// Rules carrying base facts of derived predicates into their adorned copies
///
/// Rewritten rules derive into `p^a` while base facts stay under plain `p`.
/// For every adorned head whose plain predicate satisfies `has_base_facts`
/// this yields `p^a(X1, .., Xn) :- magic_p^a(bound Xi), p(X1, .., Xn).`
pub fn base_fact_rules(rules: &[Rule], has_base_facts: impl Fn(&Predicate) -> bool) -> Vec<Rule> {
    let mut output = RuleSet::default();
    for rule in rules {
        let Some(adorned) = rule.head.predicate.adorned() else {
            continue;
        };
        let plain = Predicate::Plain(adorned.signature);
        if !has_base_facts(&plain) {
            continue;
        }
        let terms: Vec<Term> = (1..=adorned.signature.arity)
            .map(|i| Term::var(&format!("X{i}")))
            .collect();
        let head = Atom::with_predicate(rule.head.predicate.clone(), terms.clone());
        let mut body = Vec::with_capacity(2);
        if let Some(guard) = magic_atom(&head) {
            body.push(Literal::Positive(guard));
        }
        body.push(Literal::Positive(Atom::with_predicate(plain, terms)));
        output.push(Rule::new(head, body));
    }
    output.rules
}

fn positive_adorned(literal: &Literal) -> Option<&Atom> {
    match literal {
        Literal::Positive(atom) if atom.predicate.adorned().is_some() => Some(atom),
        _ => None,
    }
}

/// Literals of `body` (parallel to `sip.order()`) at the given nodes, in SIP order
fn select_body(sip: &Sip, body: &[Literal], nodes: &BTreeSet<NodeId>) -> Vec<Literal> {
    sip.order()
        .iter()
        .zip(body)
        .filter(|(node, _)| nodes.contains(node))
        .map(|(_, literal)| literal.clone())
        .collect()
}

/// Body of a rule deriving bindings passed from `source`: the source, every
/// literal it depends on, and the head's magic guard if the head passes
fn restricted_body(adorned: &AdornedRule, source: NodeId, head_magic: Option<&Atom>) -> Vec<Literal> {
    let mut passers = adorned.sip.depends(source);
    passers.insert(source);
    let mut body = Vec::new();
    if passers.contains(&HEAD) {
        if let Some(guard) = head_magic {
            body.push(Literal::Positive(guard.clone()));
        }
    }
    body.extend(select_body(&adorned.sip, &adorned.rule.body, &passers));
    body
}

fn magic_rules(adorned: &AdornedRule, output: &mut RuleSet) {
    let head_magic = magic_atom(&adorned.rule.head);
    for (&node, literal) in adorned.sip.order().iter().zip(&adorned.rule.body) {
        let Some(target) = positive_adorned(literal) else {
            continue;
        };
        let Some(target_magic) = magic_atom(target) else {
            continue;
        };

        let edges = adorned.sip.edges_entering(node);
        match edges.as_slice() {
            [] => {
                // Only constants are bound
                let body = head_magic.iter().cloned().map(Literal::Positive).collect();
                output.push(Rule::new(target_magic, body));
            }
            [edge] => {
                let body = restricted_body(adorned, edge.source, head_magic.as_ref());
                output.push(Rule::new(target_magic, body));
            }
            edges => {
                let Some(target_adorned) = target.predicate.adorned() else {
                    continue;
                };
                let mut labels = Vec::with_capacity(edges.len());
                for edge in edges {
                    let partial = AdornedPredicate::from_terms(
                        target_adorned.signature,
                        &target.terms,
                        |v| edge.variables.contains(v),
                    );
                    let label = Atom::with_predicate(
                        Predicate::Labeled {
                            predicate: partial.clone(),
                            label: output.next_label(),
                        },
                        partial.bound_terms(&target.terms),
                    );
                    let body = restricted_body(adorned, edge.source, head_magic.as_ref());
                    output.push(Rule::new(label.clone(), body));
                    labels.push(Literal::Positive(label));
                }
                output.push(Rule::new(target_magic, labels));
            }
        }
    }
}

/// `head^a :- magic_head^a, body`
fn rewritten_rule(adorned: &AdornedRule) -> Rule {
    let mut body = Vec::with_capacity(adorned.rule.body.len() + 1);
    if let Some(guard) = magic_atom(&adorned.rule.head) {
        body.push(Literal::Positive(guard));
    }
    body.extend(adorned.rule.body.iter().cloned());
    Rule::new(adorned.rule.head.clone(), body)
}

/// Seeds and magic rules for the query literals
fn query_rules(query: &Query, sip: &Sip, output: &mut RuleSet) {
    // Query literals parallel to `sip.order()`
    let mut positions: Vec<usize> = (0..query.body.len()).collect();
    positions.sort_by_key(|&p| sip.rank(sip.node_at(p)));
    positions.dedup_by_key(|p| sip.node_at(*p));
    let ordered: Vec<Literal> = positions.iter().map(|&p| query.body[p].clone()).collect();

    for (&node, literal) in sip.order().iter().zip(&ordered) {
        let Some(target) = positive_adorned(literal) else {
            continue;
        };
        let Some(target_magic) = magic_atom(target) else {
            continue;
        };
        let body = select_body(sip, &ordered, &sip.depends(node));
        output.push(Rule::new(target_magic, body));
    }
}

/// Keep the original rules of every derived predicate still referenced plainly
fn keep_plain_rules(rules: &[Rule], query: &Query, output: &mut RuleSet) {
    let derived: HashSet<&Predicate> = rules.iter().map(|r| &r.head.predicate).collect();
    let mut needed: BTreeSet<Predicate> = BTreeSet::new();
    let mut pending: Vec<Predicate> = Vec::new();

    let mut note = |literal: &Literal, pending: &mut Vec<Predicate>| {
        if let Some(atom) = literal.atom() {
            if atom.predicate.is_plain()
                && derived.contains(&atom.predicate)
                && needed.insert(atom.predicate.clone())
            {
                pending.push(atom.predicate.clone());
            }
        }
    };

    for literal in query.body.iter().chain(output.rules.iter().flat_map(|r| &r.body)) {
        note(literal, &mut pending);
    }
    let mut kept = Vec::new();
    while let Some(predicate) = pending.pop() {
        for rule in rules.iter().filter(|r| r.head.predicate == predicate) {
            for literal in &rule.body {
                note(literal, &mut pending);
            }
            kept.push(rule);
        }
    }
    // Program order for the kept rules
    for rule in rules {
        if kept.contains(&rule) {
            output.push(rule.clone());
        }
    }
}
