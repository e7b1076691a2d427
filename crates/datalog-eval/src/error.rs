use datalog_builtins::BuiltinError;
use datalog_core::{ArityMismatch, FactError};
use datalog_safety::{SafetyError, StratificationError};
use thiserror::Error;

/// Errors that can occur during evaluation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// Program violates safety rules
    #[error(transparent)]
    Safety(#[from] SafetyError),
    /// Program is not stratifiable (cycle through negation)
    #[error(transparent)]
    Stratification(#[from] StratificationError),
    #[error(transparent)]
    Arity(#[from] ArityMismatch),
    /// A builtin raised an error while evaluating a rule body
    #[error("evaluating {literal} failed: {source}")]
    BuiltinEvaluation {
        literal: String,
        #[source]
        source: BuiltinError,
    },
    #[error("unknown builtin {name}")]
    UnknownBuiltin { name: String },
    /// A rule produced a fact with variables left in it
    #[error("derived non-ground fact {fact}")]
    NonGroundFact { fact: String },
    #[error("evaluation exceeded its time limit of {limit_ms} ms")]
    Timeout { limit_ms: u64 },
    #[error("evaluation derived more than {limit} tuples")]
    TupleLimitExceeded { limit: usize },
}

impl From<FactError> for EvaluationError {
    fn from(err: FactError) -> Self {
        match err {
            FactError::Arity(mismatch) => EvaluationError::Arity(mismatch),
            FactError::NonGround { fact } => EvaluationError::NonGroundFact { fact },
        }
    }
}
