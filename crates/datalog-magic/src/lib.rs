//! Magic-sets optimisation
//!
//! Rewrites a rule set for one query so that bottom-up evaluation only
//! derives facts relevant to the query's constants.
//!
//! - [`sip`]: sideways information passing graphs of rule bodies
//! - [`adornment`]: binding-pattern specialisation of derived predicates
//! - [`magic`]: magic, labeled and seed rule generation

pub mod adornment;
pub mod magic;
pub mod sip;

pub use adornment::{AdornedProgram, AdornedRule};
pub use magic::{base_fact_rules, magic_atom, optimise, MagicSetsError, MagicSetsResult};
pub use sip::{order_literals, NodeId, Sip, SipEdge, HEAD};
