//! Registry of builtins, keyed by name

use crate::builtins::{Arithmetic, ArithmeticOp, CompOp, Comparison, Equality};
use crate::Builtin;
use datalog_ast::{sym, Symbol};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name to builtin lookup, passed explicitly to safety analysis and evaluation
#[derive(Clone, Default)]
pub struct BuiltinRegistry {
    builtins: HashMap<Symbol, Arc<dyn Builtin>>,
}

impl BuiltinRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard comparison, equality and arithmetic builtins
    ///
    /// Registered under their long names (`EQUAL`, `LESS`, `ADD`, ...) and the
    /// short aliases `EQ`, `NE`, `LT`, `LE`, `GT`, `GE`.
    pub fn standard() -> Self {
        let mut registry = BuiltinRegistry::new();
        registry.register(Equality);
        for (name, op) in [
            ("NOT_EQUAL", CompOp::NotEqual),
            ("LESS", CompOp::Less),
            ("LESS_EQUAL", CompOp::LessEqual),
            ("GREATER", CompOp::Greater),
            ("GREATER_EQUAL", CompOp::GreaterEqual),
        ] {
            registry.register(Comparison::new(name, op));
        }
        for (name, op) in [
            ("ADD", ArithmeticOp::Add),
            ("SUBTRACT", ArithmeticOp::Subtract),
            ("MULTIPLY", ArithmeticOp::Multiply),
            ("DIVIDE", ArithmeticOp::Divide),
            ("MODULUS", ArithmeticOp::Modulus),
        ] {
            registry.register(Arithmetic::new(name, op));
        }
        for (alias, name) in [
            ("EQ", "EQUAL"),
            ("NE", "NOT_EQUAL"),
            ("LT", "LESS"),
            ("LE", "LESS_EQUAL"),
            ("GT", "GREATER"),
            ("GE", "GREATER_EQUAL"),
        ] {
            registry.alias(alias, name);
        }
        registry
    }

    /// Register a builtin under its own name, replacing any previous one
    pub fn register(&mut self, builtin: impl Builtin + 'static) {
        self.builtins.insert(sym(builtin.name()), Arc::new(builtin));
    }

    /// Make `alias` resolve to the builtin registered as `name`
    ///
    /// Returns false if `name` is unknown.
    pub fn alias(&mut self, alias: &str, name: &str) -> bool {
        match self.builtins.get(&sym(name)).cloned() {
            Some(builtin) => {
                self.builtins.insert(sym(alias), builtin);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &Symbol) -> Option<&dyn Builtin> {
        self.builtins.get(name).map(|b| b.as_ref())
    }

    pub fn contains(&self, name: &Symbol) -> bool {
        self.builtins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builtins.is_empty()
    }
}

impl fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.builtins.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("BuiltinRegistry")
            .field("builtins", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BindingPattern;
    use datalog_ast::Term;

    #[test]
    fn test_standard_registry_has_aliases() {
        let registry = BuiltinRegistry::standard();
        let eq = registry.get(&sym("EQ")).unwrap();
        assert_eq!(eq.name(), "EQUAL");
        assert_eq!(eq.binding(), BindingPattern::Equality);
        assert!(registry.contains(&sym("MODULUS")));
        assert!(registry.get(&sym("CONCAT")).is_none());
    }

    #[test]
    fn test_alias_to_unknown_builtin_fails() {
        let mut registry = BuiltinRegistry::new();
        assert!(!registry.alias("EQ", "EQUAL"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_custom_builtin() {
        #[derive(Debug)]
        struct IsEven;

        impl Builtin for IsEven {
            fn name(&self) -> &str {
                "EVEN"
            }
            fn arity(&self) -> usize {
                1
            }
            fn binding(&self) -> BindingPattern {
                BindingPattern::Check
            }
            fn evaluate(&self, args: &[Term]) -> Result<Option<Vec<Term>>, crate::BuiltinError> {
                Ok(match &args[0] {
                    Term::Constant(datalog_ast::Value::Integer(i)) if i % 2 == 0 => {
                        Some(args.to_vec())
                    }
                    _ => None,
                })
            }
        }

        let mut registry = BuiltinRegistry::standard();
        registry.register(IsEven);
        let even = registry.get(&sym("EVEN")).unwrap();
        assert_eq!(even.evaluate(&[Term::int(4)]), Ok(Some(vec![Term::int(4)])));
        assert_eq!(even.evaluate(&[Term::int(3)]), Ok(None));
    }
}
