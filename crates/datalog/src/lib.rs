//! Stratified Datalog with magic-sets query optimisation
//!
//! Re-exports the public API of the workspace crates:
//!
//! - terms, literals, rules and queries from `datalog-ast`
//! - relations, fact databases and unification from `datalog-core`
//! - the builtin registry from `datalog-builtins`
//! - safety analysis and stratification from `datalog-safety`
//! - SIPs, adornment and rewriting from `datalog-magic`
//! - evaluation, queries and knowledge bases from `datalog-eval`
//!
//! # Example
//!
//! ```ignore
//! use datalog::{Atom, BuiltinRegistry, Configuration, FactDatabase, KnowledgeBase, Literal, Query, Rule, Term};
//!
//! let kb = KnowledgeBase::new(facts, rules, Configuration::default(), BuiltinRegistry::standard())?;
//! let answer = kb.execute(&Query::new(vec![Literal::positive(Atom::new(
//!     "sg",
//!     vec![Term::atom("john"), Term::var("Y")],
//! ))]))?;
//! ```

pub use datalog_ast::{
    is_anonymous, sym, AdornedPredicate, Adornment, Atom, BuiltinAtom, Literal, Predicate, Query,
    Rule, Signature, Symbol, Term, Tuple, Value,
};
pub use datalog_builtins::{
    Arithmetic, ArithmeticOp, BindingPattern, Builtin, BuiltinError, BuiltinRegistry, CompOp,
    Comparison, Equality,
};
pub use datalog_core::{unify, unify_all, unify_atoms, ArityMismatch, FactDatabase, FactError, Relation, Substitution};
pub use datalog_eval::{
    evaluate, evaluate_program, evaluate_query, Configuration, DivideByZeroBehaviour,
    EvaluationContext, EvaluationError, EvaluationStats, EvaluationStrategy, KnowledgeBase,
    Program, QueryResult,
};
pub use datalog_magic::{base_fact_rules, optimise, AdornedProgram, MagicSetsError, MagicSetsResult, Sip};
pub use datalog_safety::{
    check_program_safety, check_rule_safety, stratify, SafetyError, SafetyOptions,
    Stratification, StratificationError,
};
