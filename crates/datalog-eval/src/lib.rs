//! Bottom-up evaluation of stratified Datalog programs
//!
//! - [`evaluation`]: stratified semi-naive and naive fixpoint computation
//! - [`grounding`]: body planning and rule firing
//! - [`query`]: answering a query against a model
//! - [`knowledge_base`]: validated programs answering queries through magic sets

pub mod config;
pub mod error;
pub mod evaluation;
pub mod grounding;
pub mod knowledge_base;
pub mod program;
pub mod query;

pub use config::{Configuration, DivideByZeroBehaviour, EvaluationStrategy};
pub use error::EvaluationError;
pub use evaluation::{evaluate, EvaluationContext, EvaluationStats, FixpointState};
pub use grounding::{
    ground_rule, ground_rule_semi_naive_with_delta, plan_body, satisfy_body, PlannedRule,
};
pub use knowledge_base::KnowledgeBase;
pub use program::{evaluate_program, Program};
pub use query::{evaluate_query, QueryResult};
