//! Whole programs: base facts, rules and the queries to answer

use crate::config::Configuration;
use crate::error::EvaluationError;
use crate::knowledge_base::KnowledgeBase;
use crate::query::QueryResult;
use datalog_ast::{Atom, Query, Rule};
use datalog_builtins::BuiltinRegistry;
use datalog_core::{FactDatabase, FactError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub facts: FactDatabase,
    pub rules: Vec<Rule>,
    pub queries: Vec<Query>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ground atom as a base fact, returning whether it was new
    pub fn add_fact(&mut self, fact: &Atom) -> Result<bool, FactError> {
        self.facts.insert_atom(fact)
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn add_query(&mut self, query: Query) {
        self.queries.push(query);
    }
}

/// Answer every query of `program`, in order
pub fn evaluate_program(
    program: &Program,
    config: &Configuration,
    registry: &BuiltinRegistry,
) -> Result<Vec<QueryResult>, EvaluationError> {
    let kb = KnowledgeBase::new(
        program.facts.clone(),
        program.rules.clone(),
        config.clone(),
        registry.clone(),
    )?;
    program.queries.iter().map(|query| kb.execute(query)).collect()
}
