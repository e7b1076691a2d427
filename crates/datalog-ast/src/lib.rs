//! Term and literal model for the Datalog engine
//!
//! This crate defines the immutable values every other crate works on.
//!
//! # Key Components
//!
//! - **Term**: Variables, constants, or compound terms
//! - **Value**: Constant values (integers, floats, booleans, strings, atoms)
//! - **Predicate**: Plain, adorned, magic or labeled predicate identity
//! - **Literal**: Positive atoms, negated atoms, and builtin atoms
//! - **Rule** / **Query**: A head with a body, or a conjunctive body alone
//!
//! # Example
//!
//! ```ignore
//! use datalog_ast::{Atom, Literal, Rule, Term};
//!
//! // ancestor(X, Z) :- parent(X, Y), ancestor(Y, Z).
//! let rule = Rule::new(
//!     Atom::new("ancestor", vec![Term::var("X"), Term::var("Z")]),
//!     vec![
//!         Literal::positive(Atom::new("parent", vec![Term::var("X"), Term::var("Y")])),
//!         Literal::positive(Atom::new("ancestor", vec![Term::var("Y"), Term::var("Z")])),
//!     ],
//! );
//! ```

mod literal;
mod predicate;
mod term;

pub use literal::{Atom, BuiltinAtom, Literal, Query, Rule};
pub use predicate::{AdornedPredicate, Adornment, Predicate, Signature};
pub use term::{is_anonymous, sym, Symbol, Term, Tuple, Value};
