//! Core data structures for evaluation: unification, relations, and the
//! fact database.

pub mod database;
pub mod relation;
pub mod unification;

pub use database::{FactDatabase, FactError};
pub use relation::{ArityMismatch, Relation};
pub use unification::{unify, unify_all, unify_atoms, Substitution};
