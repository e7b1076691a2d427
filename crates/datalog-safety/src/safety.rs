//! Safety checking for Datalog rules
//!
//! A rule is safe when every variable it needs to be ground is *limited*:
//! its value is fixed once the positive body literals (and the builtins that
//! can compute values) have been evaluated. Safety guarantees that firing a
//! rule only ever produces ground, finite results.
//!
//! # Limited Variables
//!
//! Computed as a fixpoint over the rule body. A variable is limited if it
//! 1. appears in a positive ordinary literal,
//! 2. appears on one side of an equality whose other side is limited, or
//! 3. appears in an arithmetic builtin whose other arguments are all limited
//!    (only when [`SafetyOptions::ternary_targets_imply_limited`] is set).
//!
//! # Safety Rules
//!
//! A rule is safe if all variables in the head and in builtin literals are
//! limited, and all variables of negated literals are limited unless
//! [`SafetyOptions::allow_unlimited_in_negation`] is set. Variables starting
//! with `_` are anonymous and never need to be limited.
//!
//! # Example
//!
//! ```ignore
//! // Safe:   p(U, V, W) :- r(V, W), EQUAL(U, a).
//! // Unsafe: bad(X) :- not good(X).  // X appears only in negation
//! ```

use datalog_ast::{is_anonymous, Literal, Rule, Symbol};
use datalog_builtins::{BindingPattern, BuiltinRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Knobs for the safety analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyOptions {
    /// Treat variables occurring only inside a negated literal as
    /// existentially quantified within that literal
    pub allow_unlimited_in_negation: bool,
    /// Let arithmetic builtins limit their one unknown argument
    pub ternary_targets_imply_limited: bool,
}

impl Default for SafetyOptions {
    fn default() -> Self {
        SafetyOptions {
            allow_unlimited_in_negation: false,
            ternary_targets_imply_limited: true,
        }
    }
}

/// Error indicating a rule is unsafe or malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SafetyError {
    #[error("unsafe rule '{rule}': variable {variable} in {location} is not limited")]
    UnsafeRule {
        rule: String,
        variable: String,
        location: String,
    },
    #[error("unknown builtin {name} in rule '{rule}'")]
    UnknownBuiltin { rule: String, name: String },
    #[error("builtin {name} expects {expected} arguments, got {found} in rule '{rule}'")]
    BuiltinArity {
        rule: String,
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Compute the limited variables of a rule body
pub fn limited_variables(
    body: &[Literal],
    registry: &BuiltinRegistry,
    options: &SafetyOptions,
) -> BTreeSet<Symbol> {
    let mut limited: BTreeSet<Symbol> = body
        .iter()
        .filter(|literal| literal.is_positive())
        .flat_map(Literal::variables)
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for literal in body {
            let Literal::Builtin(builtin) = literal else {
                continue;
            };
            let Some(definition) = registry.get(&builtin.name) else {
                continue;
            };
            let binds = match definition.binding() {
                BindingPattern::Check => false,
                BindingPattern::Equality => true,
                BindingPattern::Solvable | BindingPattern::Function => {
                    options.ternary_targets_imply_limited
                }
            };
            if !binds {
                continue;
            }
            let bound: Vec<bool> = builtin
                .terms
                .iter()
                .map(|term| term.variables().iter().all(|v| limited.contains(v)))
                .collect();
            if !definition.binding().can_evaluate(&bound) {
                continue;
            }
            for var in builtin.variables() {
                changed |= limited.insert(var);
            }
        }
    }
    limited
}

fn unlimited<'a>(
    vars: impl IntoIterator<Item = Symbol> + 'a,
    limited: &'a BTreeSet<Symbol>,
) -> impl Iterator<Item = Symbol> + 'a {
    vars.into_iter()
        .filter(move |v| !is_anonymous(v) && !limited.contains(v))
}

/// Check that builtin literals name registered builtins with the right arity
pub fn check_builtins(rule: &Rule, registry: &BuiltinRegistry) -> Result<(), SafetyError> {
    for literal in &rule.body {
        let Literal::Builtin(builtin) = literal else {
            continue;
        };
        let Some(definition) = registry.get(&builtin.name) else {
            return Err(SafetyError::UnknownBuiltin {
                rule: rule.to_string(),
                name: builtin.name.as_str().to_string(),
            });
        };
        if definition.arity() != builtin.terms.len() {
            return Err(SafetyError::BuiltinArity {
                rule: rule.to_string(),
                name: builtin.name.as_str().to_string(),
                expected: definition.arity(),
                found: builtin.terms.len(),
            });
        }
    }
    Ok(())
}

/// Check if a rule is safe
pub fn check_rule_safety(
    rule: &Rule,
    registry: &BuiltinRegistry,
    options: &SafetyOptions,
) -> Result<(), SafetyError> {
    check_builtins(rule, registry)?;
    let limited = limited_variables(&rule.body, registry, options);

    let error = |variable: Symbol, location: String| SafetyError::UnsafeRule {
        rule: rule.to_string(),
        variable: variable.as_str().to_string(),
        location,
    };

    if let Some(var) = unlimited(rule.head.variables(), &limited).next() {
        return Err(error(var, "the head".to_string()));
    }

    for literal in &rule.body {
        match literal {
            Literal::Positive(_) => {}
            Literal::Negative(atom) => {
                if options.allow_unlimited_in_negation {
                    continue;
                }
                if let Some(var) = unlimited(atom.variables(), &limited).next() {
                    return Err(error(var, format!("negated literal {}", literal)));
                }
            }
            Literal::Builtin(builtin) => {
                if let Some(var) = unlimited(builtin.variables(), &limited).next() {
                    return Err(error(var, format!("builtin {}", literal)));
                }
            }
        }
    }

    Ok(())
}

/// Check if all rules in a program are safe
pub fn check_program_safety(
    rules: &[Rule],
    registry: &BuiltinRegistry,
    options: &SafetyOptions,
) -> Result<(), SafetyError> {
    for rule in rules {
        check_rule_safety(rule, registry, options)?;
    }
    Ok(())
}
