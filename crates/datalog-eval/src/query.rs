//! Query evaluation
//!
//! This module implements query evaluation against a fact database.
//! A query's answer is a relation over its variables, in order of first
//! appearance.
//!
//! # Query Types
//!
//! - **Ground queries**: No variables; the answer has arity 0 and holds the
//!   empty tuple iff the query is true
//! - **Variable queries**: One tuple per distinct binding of the variables
//!
//! # Example
//!
//! ```ignore
//! // Query: ?- parent(X, mary).
//! let result = evaluate_query(&query, &db, &registry, &config)?;
//! // result.variables == [X], result.relation == {(john), (alice)}
//! ```

use crate::config::Configuration;
use crate::error::EvaluationError;
use crate::evaluation::EvaluationContext;
use crate::grounding::{plan_body, satisfy_body};
use datalog_ast::{Atom, Predicate, Query, Rule, Symbol, Term};
use datalog_builtins::BuiltinRegistry;
use datalog_core::{FactDatabase, Relation};
use datalog_safety::check_rule_safety;

/// Answer to a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Output variables, in order of first appearance in the query
    pub variables: Vec<Symbol>,
    /// One tuple per answer, parallel to `variables`
    pub relation: Relation,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.relation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relation.is_empty()
    }

    /// Whether the query has at least one answer
    pub fn holds(&self) -> bool {
        !self.relation.is_empty()
    }

    /// Answers in a stable order
    pub fn tuples(&self) -> Vec<Vec<Term>> {
        self.relation.sorted()
    }

    /// Answers as variable bindings
    pub fn bindings(&self) -> Vec<Vec<(Symbol, Term)>> {
        self.tuples()
            .into_iter()
            .map(|tuple| self.variables.iter().copied().zip(tuple).collect())
            .collect()
    }
}

/// The query body as a rule with a nullary head, for safety checking
fn query_rule(query: &Query) -> Rule {
    Rule::new(
        Atom::with_predicate(Predicate::plain("?-", 0), Vec::new()),
        query.body.clone(),
    )
}

/// Evaluate a query against a fact database
///
/// Fails when the query is unsafe (a negated or builtin variable no
/// positive literal limits) or a builtin raises an error.
pub fn evaluate_query(
    query: &Query,
    db: &FactDatabase,
    registry: &BuiltinRegistry,
    config: &Configuration,
) -> Result<QueryResult, EvaluationError> {
    check_rule_safety(&query_rule(query), registry, &config.safety)?;

    let ctx = EvaluationContext::new(registry, config);
    let body = plan_body(&query.body, registry, &config.safety);
    let variables = query.variables();

    let mut relation = Relation::new(variables.len());
    for subst in satisfy_body(&body, db, &ctx)? {
        let tuple: Vec<Term> = variables
            .iter()
            .map(|var| subst.apply(&Term::Variable(*var)))
            .collect();
        relation.add(tuple)?;
    }
    Ok(QueryResult {
        variables,
        relation,
    })
}
