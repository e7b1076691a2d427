//! Builtin predicates
//!
//! Builtins are predicates computed by code instead of stored relations:
//! comparisons, equality, and arithmetic. A builtin receives its argument
//! tuple with some positions possibly unbound (still variables) and either
//! completes the tuple, reports that no completion exists, or fails with an
//! error such as a division by zero.
//!
//! Builtins are looked up by name in a [`BuiltinRegistry`] that is built by
//! the caller and passed to safety analysis and evaluation; there is no
//! process-wide registry.
//!
//! # Example
//!
//! ```ignore
//! let registry = BuiltinRegistry::standard();
//! let add = registry.get(&sym("ADD")).unwrap();
//! // ADD(2, Y, 5) solves Y = 3
//! let completed = add.evaluate(&[Term::int(2), Term::var("Y"), Term::int(5)])?;
//! ```

mod builtins;
mod numeric;
mod registry;

use datalog_ast::Term;
use std::fmt;
use thiserror::Error;

pub use builtins::{Arithmetic, ArithmeticOp, CompOp, Comparison, Equality};
pub use registry::BuiltinRegistry;

/// Errors raised by builtin evaluation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuiltinError {
    #[error("division by zero in {builtin}")]
    DivideByZero { builtin: String },
    #[error("integer overflow in {builtin}")]
    Overflow { builtin: String },
    #[error("{builtin} expects {expected} arguments, got {found}")]
    WrongArity {
        builtin: String,
        expected: usize,
        found: usize,
    },
    #[error("{builtin} cannot be evaluated with unbound arguments ({args})")]
    Unbound { builtin: String, args: String },
}

/// Which argument positions a builtin can compute from the others
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingPattern {
    /// Every argument must be bound; the builtin only tests
    Check,
    /// Two arguments, either of which can be computed from the other
    Equality,
    /// Any single argument can be computed from all the others
    Solvable,
    /// Only the last argument can be computed from the others
    Function,
}

impl BindingPattern {
    /// Whether a call with the given bound positions can be evaluated
    pub fn can_evaluate(self, bound: &[bool]) -> bool {
        let unbound = bound.iter().filter(|b| !**b).count();
        match self {
            BindingPattern::Check => unbound == 0,
            BindingPattern::Equality | BindingPattern::Solvable => unbound <= 1,
            BindingPattern::Function => {
                unbound == 0 || (unbound == 1 && bound.last() == Some(&false))
            }
        }
    }
}

/// A builtin predicate
pub trait Builtin: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn arity(&self) -> usize;

    fn binding(&self) -> BindingPattern;

    /// Complete `args`, whose unbound positions are variables
    ///
    /// Returns `Ok(None)` when the check fails or no completion exists.
    fn evaluate(&self, args: &[Term]) -> Result<Option<Vec<Term>>, BuiltinError>;
}

pub(crate) fn check_arity(builtin: &dyn Builtin, args: &[Term]) -> Result<(), BuiltinError> {
    if args.len() == builtin.arity() {
        Ok(())
    } else {
        Err(BuiltinError::WrongArity {
            builtin: builtin.name().to_string(),
            expected: builtin.arity(),
            found: args.len(),
        })
    }
}

pub(crate) fn unbound(builtin: &dyn Builtin, args: &[Term]) -> BuiltinError {
    BuiltinError::Unbound {
        builtin: builtin.name().to_string(),
        args: args
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    }
}
