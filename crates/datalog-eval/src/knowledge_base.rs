//! Knowledge bases: validated programs that answer queries
//!
//! A knowledge base owns its base facts and rules. Each query is first
//! rewritten with magic sets so that only facts relevant to the query's
//! constants are derived; when the query binds nothing the full model of
//! the program is computed once and reused by later queries.
//!
//! Base facts of predicates that also have rules are carried into the
//! rewritten program's adorned relations, guarded by the same magic sets.
//!
//! Queries never modify the base facts, so a failing query leaves the
//! knowledge base usable.

use crate::config::Configuration;
use crate::error::EvaluationError;
use crate::evaluation::{evaluate, EvaluationContext};
use crate::query::{evaluate_query, QueryResult};
use datalog_ast::{Query, Rule};
use datalog_builtins::BuiltinRegistry;
use datalog_core::FactDatabase;
use datalog_magic::{base_fact_rules, optimise, MagicSetsError};
use datalog_safety::{check_program_safety, stratify};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tracing::{debug, info};

#[derive(Debug)]
pub struct KnowledgeBase {
    facts: FactDatabase,
    rules: Vec<Rule>,
    config: Configuration,
    registry: BuiltinRegistry,
    /// Full model of the unrewritten program, computed on first use
    model: OnceLock<FactDatabase>,
    optimised: AtomicBool,
}

impl KnowledgeBase {
    /// Create a knowledge base, rejecting unsafe or non-stratifiable rules
    /// and unknown builtins up front
    pub fn new(
        facts: FactDatabase,
        rules: Vec<Rule>,
        config: Configuration,
        registry: BuiltinRegistry,
    ) -> Result<Self, EvaluationError> {
        check_program_safety(&rules, &registry, &config.safety)?;
        let stratification = stratify(&rules)?;
        info!(
            facts = facts.len(),
            rules = rules.len(),
            strata = stratification.num_strata,
            "created knowledge base"
        );
        Ok(KnowledgeBase {
            facts,
            rules,
            config,
            registry,
            model: OnceLock::new(),
            optimised: AtomicBool::new(false),
        })
    }

    pub fn facts(&self) -> &FactDatabase {
        &self.facts
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Whether the last executed query ran on a magic-sets rewritten program
    pub fn optimisation_succeeded(&self) -> bool {
        self.optimised.load(Ordering::Relaxed)
    }

    fn context(&self) -> EvaluationContext<'_> {
        EvaluationContext::new(&self.registry, &self.config)
    }

    /// The full model of the program, computed once
    pub fn model(&self) -> Result<&FactDatabase, EvaluationError> {
        if let Some(model) = self.model.get() {
            return Ok(model);
        }
        let (model, stats) = evaluate(&self.rules, self.facts.clone(), &self.context())?;
        debug!(?stats, "computed full model");
        Ok(self.model.get_or_init(|| model))
    }

    /// Answer a query
    pub fn execute(&self, query: &Query) -> Result<QueryResult, EvaluationError> {
        if self.config.magic_sets {
            match optimise(&self.rules, query) {
                Ok(rewritten) => {
                    let mut rules = rewritten.rules;
                    let bridges = base_fact_rules(&rules, |p| self.facts.has_tuples(p));
                    rules.extend(bridges);
                    let (model, stats) = evaluate(&rules, self.facts.clone(), &self.context())?;
                    info!(query = %query, facts_derived = stats.facts_derived, "answered with magic sets");
                    self.optimised.store(true, Ordering::Relaxed);
                    return evaluate_query(&rewritten.query, &model, &self.registry, &self.config);
                }
                Err(MagicSetsError::UnrewritableQuery { .. }) => {
                    info!(query = %query, "magic sets not applicable, using the full model");
                }
            }
        }
        self.optimised.store(false, Ordering::Relaxed);
        let model = self.model()?;
        evaluate_query(query, model, &self.registry, &self.config)
    }
}
