//! Static analysis run before evaluation: rule safety and stratification.

pub mod safety;
pub mod stratification;

pub use safety::{
    check_builtins, check_program_safety, check_rule_safety, limited_variables, SafetyError,
    SafetyOptions,
};
pub use stratification::{stratify, Stratification, StratificationError, Stratum};
