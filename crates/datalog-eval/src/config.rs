//! Evaluation configuration
//!
//! Every field has a default, so a partial JSON document is a complete
//! configuration:
//!
//! ```ignore
//! let config: Configuration = serde_json::from_str(r#"{ "strategy": "naive" }"#)?;
//! assert!(config.magic_sets);
//! ```

use datalog_safety::SafetyOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixpoint algorithm used for every stratum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStrategy {
    /// Each round only uses derivations involving the previous round's delta
    #[default]
    SemiNaive,
    /// Each round re-applies every rule to the whole database
    Naive,
}

/// What a division (or modulus) by zero inside a rule body does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivideByZeroBehaviour {
    /// Abort evaluation with a builtin error
    Stop,
    /// Drop the binding as if the builtin had failed
    #[default]
    Discard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub strategy: EvaluationStrategy,
    /// Rewrite programs with magic sets when executing queries
    pub magic_sets: bool,
    /// Upper bound on the number of tuples derived by one evaluation
    pub max_tuples: Option<usize>,
    /// Wall-clock limit, checked after every fixpoint round
    pub timeout_ms: Option<u64>,
    pub divide_by_zero: DivideByZeroBehaviour,
    pub safety: SafetyOptions,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            strategy: EvaluationStrategy::default(),
            magic_sets: true,
            max_tuples: None,
            timeout_ms: None,
            divide_by_zero: DivideByZeroBehaviour::default(),
            safety: SafetyOptions::default(),
        }
    }
}

impl Configuration {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
