//! Adorned programs
//!
//! Adorning specialises every derived predicate for the binding pattern it
//! is called with. Starting from the query, each rule defining a requested
//! adorned predicate is copied with its head adorned and its body ordered by
//! the rule's SIP; every positive body literal over a derived predicate is
//! adorned with the variables bound when it is reached, and any adorned
//! predicate not seen before is queued for the same treatment.
//!
//! The query itself is handled as the body of a rule with a nullary head, so
//! bindings made by earlier query literals flow into later ones exactly as
//! they do inside a rule.
//!
//! Negated literals, builtins and literals over predicates without rules
//! (base relations) are never adorned.

use crate::sip::Sip;
use datalog_ast::{AdornedPredicate, Atom, Literal, Predicate, Query, Rule, Symbol, Term};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// A rule specialised for one adornment of its head
#[derive(Debug, Clone)]
pub struct AdornedRule {
    /// Adorned head; body in SIP order with adorned literals
    ///
    /// `rule.body[k]` is the literal of node `sip.order()[k]`.
    pub rule: Rule,
    /// SIP of the original rule under the head's bindings
    pub sip: Sip,
    /// Index of the rule this was adorned from
    pub source: usize,
}

/// The result of adorning a rule set for a query
#[derive(Debug, Clone)]
pub struct AdornedProgram {
    /// Adorned rules, in the order their adorned predicates were requested
    pub rules: Vec<AdornedRule>,
    /// The query with its derived positive literals adorned, in query order
    pub query: Query,
    /// SIP of the query as a rule body
    pub query_sip: Sip,
    /// Every adorned predicate that was requested
    pub adorned_predicates: Vec<AdornedPredicate>,
}

fn query_head() -> Atom {
    Atom::with_predicate(Predicate::plain("?-", 0), Vec::new())
}

/// Adorned predicates waiting for their rules to be adorned
#[derive(Default)]
struct Worklist {
    queue: VecDeque<AdornedPredicate>,
    seen: BTreeSet<AdornedPredicate>,
}

impl Worklist {
    fn request(&mut self, predicate: &AdornedPredicate) {
        if self.seen.insert(predicate.clone()) {
            self.queue.push_back(predicate.clone());
        }
    }

    fn next(&mut self) -> Option<AdornedPredicate> {
        self.queue.pop_front()
    }
}

impl AdornedProgram {
    pub fn new(rules: &[Rule], query: &Query) -> Self {
        let derived: HashSet<Predicate> = rules.iter().map(|r| r.head.predicate.clone()).collect();
        let mut worklist = Worklist::default();

        let query_sip = Sip::new(&query_head(), &query.body, &BTreeSet::new());
        let mut query_body = Vec::with_capacity(query.body.len());
        for (position, literal) in query.body.iter().enumerate() {
            let bound = query_sip.bound_variables(query_sip.node_at(position));
            let (adorned, requested) = adorn_literal(literal, &bound, &derived);
            if let Some(predicate) = requested {
                worklist.request(&predicate);
            }
            query_body.push(adorned);
        }

        let mut adorned_predicates = Vec::new();
        let mut adorned_rules = Vec::new();
        while let Some(predicate) = worklist.next() {
            let target = Predicate::Plain(predicate.signature);
            for (source, rule) in rules.iter().enumerate() {
                if rule.head.predicate != target {
                    continue;
                }
                let (rule, sip) = adorn_rule(rule, &predicate, &derived, &mut worklist);
                adorned_rules.push(AdornedRule { rule, sip, source });
            }
            adorned_predicates.push(predicate);
        }

        AdornedProgram {
            rules: adorned_rules,
            query: Query::new(query_body),
            query_sip,
            adorned_predicates,
        }
    }
}

/// Variables at the bound positions of `terms`
fn bound_head_variables(adorned: &AdornedPredicate, terms: &[Term]) -> BTreeSet<Symbol> {
    adorned
        .bound_terms(terms)
        .iter()
        .flat_map(|t| t.variables())
        .collect()
}

fn adorn_rule(
    rule: &Rule,
    predicate: &AdornedPredicate,
    derived: &HashSet<Predicate>,
    worklist: &mut Worklist,
) -> (Rule, Sip) {
    let bound = bound_head_variables(predicate, &rule.head.terms);
    let sip = Sip::new(&rule.head, &rule.body, &bound);
    let head = Atom::with_predicate(Predicate::Adorned(predicate.clone()), rule.head.terms.clone());
    let mut body = Vec::with_capacity(sip.order().len());
    for &node in sip.order() {
        let (adorned, requested) =
            adorn_literal(sip.literal(node), &sip.bound_variables(node), derived);
        if let Some(p) = requested {
            worklist.request(&p);
        }
        body.push(adorned);
    }
    (Rule::new(head, body), sip)
}

/// Adorn a positive literal over a derived predicate
///
/// Returns the literal (unchanged when it is not adorned) and the adorned
/// predicate it now refers to.
fn adorn_literal(
    literal: &Literal,
    bound: &BTreeSet<Symbol>,
    derived: &HashSet<Predicate>,
) -> (Literal, Option<AdornedPredicate>) {
    match literal {
        Literal::Positive(atom) if derived.contains(&atom.predicate) => {
            let Predicate::Plain(signature) = atom.predicate else {
                return (literal.clone(), None);
            };
            let adorned = AdornedPredicate::from_terms(signature, &atom.terms, |v| bound.contains(v));
            let literal = Literal::Positive(Atom::with_predicate(
                Predicate::Adorned(adorned.clone()),
                atom.terms.clone(),
            ));
            (literal, Some(adorned))
        }
        _ => (literal.clone(), None),
    }
}
