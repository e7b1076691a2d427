//! Datalog evaluation
//!
//! This module provides the main entry point for evaluating Datalog programs.
//! Programs are checked for safety, stratified, and every stratum is run to
//! its fixpoint before the next one starts, so negated literals always read
//! relations that are already complete.
//!
//! # Algorithm
//!
//! Semi-naive evaluation of one stratum:
//!
//! 1. Round 1 applies every rule to the whole database
//! 2. The tuples that were new in a round form the delta for the next one
//! 3. Later rounds only consider derivations that use at least one delta tuple
//! 4. The stratum has converged once a round derives nothing new
//!
//! Within a round all rules read the database as it was at the start of the
//! round; new tuples are collected separately and merged at the boundary.
//!
//! # Example
//!
//! ```ignore
//! use datalog_eval::{evaluate, EvaluationContext};
//!
//! let ctx = EvaluationContext::new(&registry, &config);
//! let (model, stats) = evaluate(&rules, facts, &ctx)?;
//! ```

use crate::config::{Configuration, EvaluationStrategy};
use crate::error::EvaluationError;
use crate::grounding::{ground_rule, ground_rule_semi_naive_with_delta, PlannedRule};
use datalog_ast::Rule;
use datalog_builtins::BuiltinRegistry;
use datalog_core::FactDatabase;
use datalog_safety::{check_program_safety, stratify};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Builtins and configuration shared by every step of an evaluation
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub registry: &'a BuiltinRegistry,
    pub config: &'a Configuration,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(registry: &'a BuiltinRegistry, config: &'a Configuration) -> Self {
        EvaluationContext { registry, config }
    }
}

/// Statistics about evaluation performance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvaluationStats {
    /// Number of strata evaluated
    pub strata: usize,
    /// Number of fixed-point iterations performed, over all strata
    pub iterations: usize,
    /// Total number of rule applications (rule evaluated once = 1 application)
    pub rule_applications: usize,
    /// Number of new facts derived (not counting duplicates)
    pub facts_derived: usize,
}

/// Progress of one stratum's fixpoint computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixpointState {
    Initializing,
    Iterating { round: usize },
    Converged { rounds: usize },
    Failed,
}

/// Time and size limits of one evaluation
struct Limits {
    started: Instant,
    timeout: Option<Duration>,
    max_tuples: Option<usize>,
    derived: usize,
}

impl Limits {
    fn new(config: &Configuration) -> Self {
        Limits {
            started: Instant::now(),
            timeout: config.timeout(),
            max_tuples: config.max_tuples,
            derived: 0,
        }
    }

    /// Account for a finished round
    fn after_round(&mut self, new_tuples: usize) -> Result<(), EvaluationError> {
        self.derived += new_tuples;
        if let Some(limit) = self.max_tuples {
            if self.derived > limit {
                warn!(limit, derived = self.derived, "tuple limit exceeded");
                return Err(EvaluationError::TupleLimitExceeded { limit });
            }
        }
        if let Some(timeout) = self.timeout {
            if self.started.elapsed() >= timeout {
                let limit_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(limit_ms, "evaluation timed out");
                return Err(EvaluationError::Timeout { limit_ms });
            }
        }
        Ok(())
    }
}

/// Evaluate a Datalog program to fixed point.
///
/// This is the main entry point for Datalog evaluation. It:
/// 1. Checks that all rules are safe and only use registered builtins
/// 2. Stratifies the program to handle negation correctly
/// 3. Evaluates each stratum with the configured strategy
///
/// `facts` is consumed and returned extended with every derived fact. No
/// partial model is returned on failure.
pub fn evaluate(
    rules: &[Rule],
    facts: FactDatabase,
    ctx: &EvaluationContext<'_>,
) -> Result<(FactDatabase, EvaluationStats), EvaluationError> {
    check_program_safety(rules, ctx.registry, &ctx.config.safety)?;
    let stratification = stratify(rules)?;

    let mut db = facts;
    let mut stats = EvaluationStats::default();
    let mut limits = Limits::new(ctx.config);

    for (stratum, stratum_rules) in stratification.strata().enumerate() {
        let planned: Vec<PlannedRule> = stratum_rules
            .iter()
            .map(|rule| PlannedRule::new(rule.clone(), ctx.registry, &ctx.config.safety))
            .collect();
        debug!(stratum, rules = planned.len(), "evaluating stratum");

        let result = match ctx.config.strategy {
            EvaluationStrategy::SemiNaive => {
                semi_naive_evaluate(&planned, db, ctx, &mut limits, &mut stats)
            }
            EvaluationStrategy::Naive => naive_evaluate(&planned, db, ctx, &mut limits, &mut stats),
        };
        db = match result {
            Ok(db) => db,
            Err(error) => {
                let state = FixpointState::Failed;
                warn!(stratum, ?state, %error, "stratum failed");
                return Err(error);
            }
        };
        stats.strata += 1;
    }

    debug!(
        strata = stats.strata,
        iterations = stats.iterations,
        facts_derived = stats.facts_derived,
        "evaluation finished"
    );
    Ok((db, stats))
}

/// Fixed-point evaluation of one stratum using deltas.
///
/// After the first round, only derivations that use at least one fact
/// derived in the previous round are considered.
fn semi_naive_evaluate(
    rules: &[PlannedRule],
    initial_facts: FactDatabase,
    ctx: &EvaluationContext<'_>,
    limits: &mut Limits,
    stats: &mut EvaluationStats,
) -> Result<FactDatabase, EvaluationError> {
    let mut db = initial_facts;
    let mut delta = FactDatabase::new();
    let mut state = FixpointState::Initializing;

    loop {
        let round = match state {
            FixpointState::Iterating { round } => round + 1,
            _ => 1,
        };
        state = FixpointState::Iterating { round };
        stats.iterations += 1;

        let mut new_delta = FactDatabase::new();
        for rule in rules {
            stats.rule_applications += 1;
            // First round: every fact counts as new
            let derived = if round == 1 {
                ground_rule(rule, &db, ctx)?
            } else {
                ground_rule_semi_naive_with_delta(rule, &db, &delta, ctx)?
            };
            for fact in derived {
                if !db.contains(&fact.predicate, &fact.terms) && new_delta.insert_atom(&fact)? {
                    stats.facts_derived += 1;
                }
            }
        }
        debug!(?state, delta = new_delta.len(), "fixpoint round");

        if new_delta.is_empty() {
            state = FixpointState::Converged { rounds: round };
            debug!(?state, "stratum converged");
            break;
        }

        db.merge(&new_delta)?;
        limits.after_round(new_delta.len())?;
        delta = new_delta;
    }

    Ok(db)
}

/// Naive evaluation: repeatedly apply all rules against all facts until
/// nothing new is derived.
fn naive_evaluate(
    rules: &[PlannedRule],
    initial_facts: FactDatabase,
    ctx: &EvaluationContext<'_>,
    limits: &mut Limits,
    stats: &mut EvaluationStats,
) -> Result<FactDatabase, EvaluationError> {
    let mut db = initial_facts;
    let mut round = 0;

    loop {
        round += 1;
        stats.iterations += 1;

        let mut new_facts = FactDatabase::new();
        for rule in rules {
            stats.rule_applications += 1;
            for fact in ground_rule(rule, &db, ctx)? {
                if !db.contains(&fact.predicate, &fact.terms) && new_facts.insert_atom(&fact)? {
                    stats.facts_derived += 1;
                }
            }
        }
        let state = FixpointState::Iterating { round };
        debug!(?state, new = new_facts.len(), "naive round");

        if new_facts.is_empty() {
            let state = FixpointState::Converged { rounds: round };
            debug!(?state, "stratum converged");
            break;
        }
        db.merge(&new_facts)?;
        limits.after_round(new_facts.len())?;
    }

    Ok(db)
}
