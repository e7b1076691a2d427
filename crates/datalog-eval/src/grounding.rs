//! Rule grounding: matching rule bodies against a fact database
//!
//! Bodies are planned once, then matched literal by literal. Each literal
//! either extends the current substitution (positive literals and builtins)
//! or filters it (negated literals and builtin checks).
//!
//! # Key Functions
//!
//! - `plan_body`: order a body so builtins and negations run once their inputs are bound
//! - `ground_rule`: all head instances derivable from the full database
//! - `ground_rule_semi_naive_with_delta`: head instances using at least one delta tuple
//! - `satisfy_body`: all substitutions satisfying a planned body
//!
//! # Example
//!
//! ```ignore
//! // Given rule: ancestor(X, Z) :- parent(X, Y), parent(Y, Z)
//! // And facts: parent(a, b), parent(b, c)
//! // Produces: ancestor(a, c)
//! let rule = PlannedRule::new(rule, &registry, &config.safety);
//! let groundings = ground_rule(&rule, &db, &ctx)?;
//! ```

use crate::config::DivideByZeroBehaviour;
use crate::error::EvaluationError;
use crate::evaluation::EvaluationContext;
use datalog_ast::{is_anonymous, Atom, Literal, Rule, Symbol};
use datalog_builtins::{BuiltinError, BuiltinRegistry};
use datalog_core::{unify_all, FactDatabase, Substitution};
use datalog_safety::{limited_variables, SafetyOptions};
use std::collections::BTreeSet;

/// Order `body` for evaluation
///
/// Positive literals keep their relative order. A builtin is scheduled as
/// soon as its binding pattern can be evaluated, a negated literal as soon
/// as its limited variables are bound. Literals that never become ready are
/// left at the end in their original order.
pub fn plan_body(
    body: &[Literal],
    registry: &BuiltinRegistry,
    options: &SafetyOptions,
) -> Vec<Literal> {
    let limited = limited_variables(body, registry, options);
    let mut bound: BTreeSet<Symbol> = BTreeSet::new();
    let mut order: Vec<usize> = Vec::with_capacity(body.len());
    let mut deferred: Vec<usize> = Vec::new();

    let ready = |literal: &Literal, bound: &BTreeSet<Symbol>| match literal {
        Literal::Positive(_) => true,
        Literal::Negative(atom) => atom
            .variables()
            .iter()
            .filter(|v| !is_anonymous(v) && limited.contains(*v))
            .all(|v| bound.contains(v)),
        Literal::Builtin(builtin) => {
            let flags: Vec<bool> = builtin
                .terms
                .iter()
                .map(|term| term.variables().iter().all(|v| bound.contains(v)))
                .collect();
            registry
                .get(&builtin.name)
                .is_some_and(|definition| definition.binding().can_evaluate(&flags))
        }
    };

    for (position, literal) in body.iter().enumerate() {
        if literal.is_positive() {
            order.push(position);
            bound.extend(literal.variables());
        } else {
            deferred.push(position);
        }
        while let Some(index) = deferred.iter().position(|&p| ready(&body[p], &bound)) {
            let position = deferred.remove(index);
            if body[position].is_builtin() {
                bound.extend(body[position].variables());
            }
            order.push(position);
        }
    }
    order.extend(deferred);
    order.into_iter().map(|p| body[p].clone()).collect()
}

/// A rule whose body has been planned for evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRule {
    pub rule: Rule,
    body: Vec<Literal>,
}

impl PlannedRule {
    pub fn new(rule: Rule, registry: &BuiltinRegistry, options: &SafetyOptions) -> Self {
        let body = plan_body(&rule.body, registry, options);
        PlannedRule { rule, body }
    }

    /// Body in evaluation order
    pub fn body(&self) -> &[Literal] {
        &self.body
    }

    pub fn head(&self) -> &Atom {
        &self.rule.head
    }
}

/// Where each positive literal reads its tuples from
struct Matcher<'a> {
    full: &'a FactDatabase,
    delta: Option<(&'a FactDatabase, usize)>,
    ctx: &'a EvaluationContext<'a>,
}

impl Matcher<'_> {
    fn source(&self, index: usize) -> &FactDatabase {
        match self.delta {
            Some((delta, at)) if at == index => delta,
            _ => self.full,
        }
    }

    fn satisfy(
        &self,
        body: &[Literal],
        index: usize,
        subst: Substitution,
        out: &mut Vec<Substitution>,
    ) -> Result<(), EvaluationError> {
        let Some(literal) = body.get(index) else {
            out.push(subst);
            return Ok(());
        };

        match literal {
            Literal::Positive(atom) => {
                for extended in self.source(index).query(atom, &subst) {
                    self.satisfy(body, index + 1, extended, out)?;
                }
            }
            Literal::Negative(atom) => {
                // Negation always reads the full database, never the delta
                if !self.full.matches_any(atom, &subst) {
                    self.satisfy(body, index + 1, subst, out)?;
                }
            }
            Literal::Builtin(builtin) => {
                let Some(definition) = self.ctx.registry.get(&builtin.name) else {
                    return Err(EvaluationError::UnknownBuiltin {
                        name: builtin.name.as_str().to_string(),
                    });
                };
                let args = subst.apply_all(&builtin.terms);
                let completed = match definition.evaluate(&args) {
                    Ok(completed) => completed,
                    Err(BuiltinError::DivideByZero { .. })
                        if self.ctx.config.divide_by_zero == DivideByZeroBehaviour::Discard =>
                    {
                        None
                    }
                    Err(source) => {
                        return Err(EvaluationError::BuiltinEvaluation {
                            literal: Literal::builtin(builtin.name.as_str(), args.clone())
                                .to_string(),
                            source,
                        })
                    }
                };
                if let Some(completed) = completed {
                    let mut extended = subst;
                    if unify_all(&args, &completed, &mut extended) {
                        self.satisfy(body, index + 1, extended, out)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Every substitution satisfying `body` (already planned) against `db`
pub fn satisfy_body(
    body: &[Literal],
    db: &FactDatabase,
    ctx: &EvaluationContext<'_>,
) -> Result<Vec<Substitution>, EvaluationError> {
    let matcher = Matcher {
        full: db,
        delta: None,
        ctx,
    };
    let mut out = Vec::new();
    matcher.satisfy(body, 0, Substitution::new(), &mut out)?;
    Ok(out)
}

fn instantiate_head(head: &Atom, subst: &Substitution) -> Result<Atom, EvaluationError> {
    let fact = subst.apply_atom(head);
    if !fact.is_ground() {
        return Err(EvaluationError::NonGroundFact {
            fact: fact.to_string(),
        });
    }
    Ok(fact)
}

/// Ground a rule against the whole database
pub fn ground_rule(
    rule: &PlannedRule,
    db: &FactDatabase,
    ctx: &EvaluationContext<'_>,
) -> Result<Vec<Atom>, EvaluationError> {
    satisfy_body(rule.body(), db, ctx)?
        .iter()
        .map(|subst| instantiate_head(rule.head(), subst))
        .collect()
}

/// Ground a rule using at least one tuple from `delta`
///
/// Each positive literal whose predicate has delta tuples takes a turn
/// reading from the delta while the others read from `db`, which already
/// contains the delta.
pub fn ground_rule_semi_naive_with_delta(
    rule: &PlannedRule,
    db: &FactDatabase,
    delta: &FactDatabase,
    ctx: &EvaluationContext<'_>,
) -> Result<Vec<Atom>, EvaluationError> {
    let mut facts = Vec::new();
    for (index, literal) in rule.body().iter().enumerate() {
        let Literal::Positive(atom) = literal else {
            continue;
        };
        if !delta.has_tuples(&atom.predicate) {
            continue;
        }
        let matcher = Matcher {
            full: db,
            delta: Some((delta, index)),
            ctx,
        };
        let mut substitutions = Vec::new();
        matcher.satisfy(rule.body(), 0, Substitution::new(), &mut substitutions)?;
        for subst in &substitutions {
            facts.push(instantiate_head(rule.head(), subst)?);
        }
    }
    Ok(facts)
}
