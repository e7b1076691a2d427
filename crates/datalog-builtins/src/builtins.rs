//! Standard builtins: equality, comparisons, and arithmetic
//!
//! # Supported Built-ins
//!
//! - **Equality**: `EQUAL(X, Y)` unifies its arguments, so it can bind one
//!   side from the other. Numbers compare by value (`1` equals `1.0`).
//! - **Comparisons**: `NOT_EQUAL`, `LESS`, `LESS_EQUAL`, `GREATER`,
//!   `GREATER_EQUAL` test two bound arguments. Numbers compare by value,
//!   strings, atoms and booleans only against their own kind.
//! - **Arithmetic**: `ADD(X, Y, Z)` holds when `X + Y = Z`, likewise
//!   `SUBTRACT`, `MULTIPLY`, `DIVIDE` and `MODULUS`. Any one argument of
//!   the first four can be solved for; `MODULUS` only computes `Z`.

use crate::numeric::{Checked, Numeric};
use crate::{check_arity, unbound, BindingPattern, Builtin, BuiltinError};
use datalog_ast::{Term, Value};
use datalog_core::{unify, Substitution};
use std::cmp::Ordering;

/// `EQUAL(X, Y)`
#[derive(Debug, Clone, Copy)]
pub struct Equality;

impl Builtin for Equality {
    fn name(&self) -> &str {
        "EQUAL"
    }

    fn arity(&self) -> usize {
        2
    }

    fn binding(&self) -> BindingPattern {
        BindingPattern::Equality
    }

    fn evaluate(&self, args: &[Term]) -> Result<Option<Vec<Term>>, BuiltinError> {
        check_arity(self, args)?;
        let (left, right) = (&args[0], &args[1]);
        if left.is_ground() && right.is_ground() {
            let equal = match (Numeric::from_term(left), Numeric::from_term(right)) {
                (Some(l), Some(r)) => l.equals(r),
                _ => left == right,
            };
            return Ok(equal.then(|| args.to_vec()));
        }

        let mut subst = Substitution::new();
        if !unify(left, right, &mut subst) {
            return Ok(None);
        }
        let completed = subst.apply_all(args);
        if completed.iter().all(Term::is_ground) {
            Ok(Some(completed))
        } else {
            Err(unbound(self, args))
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompOp {
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl CompOp {
    fn holds(self, ordering: Option<Ordering>) -> bool {
        match self {
            CompOp::NotEqual => ordering != Some(Ordering::Equal),
            CompOp::Less => ordering == Some(Ordering::Less),
            CompOp::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            CompOp::Greater => ordering == Some(Ordering::Greater),
            CompOp::GreaterEqual => {
                matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
            }
        }
    }
}

/// A two-argument test such as `LESS(X, Y)`
#[derive(Debug, Clone)]
pub struct Comparison {
    name: String,
    op: CompOp,
}

impl Comparison {
    pub fn new(name: &str, op: CompOp) -> Self {
        Comparison {
            name: name.to_string(),
            op,
        }
    }
}

/// Order two ground terms, or `None` when they are not comparable
fn compare_terms(left: &Term, right: &Term) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (Numeric::from_term(left), Numeric::from_term(right)) {
        return l.compare(r);
    }
    match (left, right) {
        (Term::Constant(Value::String(l)), Term::Constant(Value::String(r)))
        | (Term::Constant(Value::Atom(l)), Term::Constant(Value::Atom(r))) => {
            Some(l.as_str().cmp(r.as_str()))
        }
        (Term::Constant(Value::Boolean(l)), Term::Constant(Value::Boolean(r))) => Some(l.cmp(r)),
        _ => (left == right).then_some(Ordering::Equal),
    }
}

impl Builtin for Comparison {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        2
    }

    fn binding(&self) -> BindingPattern {
        BindingPattern::Check
    }

    fn evaluate(&self, args: &[Term]) -> Result<Option<Vec<Term>>, BuiltinError> {
        check_arity(self, args)?;
        if !args.iter().all(Term::is_ground) {
            return Err(unbound(self, args));
        }
        let ordering = compare_terms(&args[0], &args[1]);
        Ok(self.op.holds(ordering).then(|| args.to_vec()))
    }
}

/// Arithmetic operators, read as `X op Y = Z`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
}

/// A three-argument arithmetic relation such as `ADD(X, Y, Z)`
#[derive(Debug, Clone)]
pub struct Arithmetic {
    name: String,
    op: ArithmeticOp,
}

impl Arithmetic {
    pub fn new(name: &str, op: ArithmeticOp) -> Self {
        Arithmetic {
            name: name.to_string(),
            op,
        }
    }

    fn checked(&self, result: Checked) -> Result<Option<Numeric>, BuiltinError> {
        match result {
            Checked::Value(n) => Ok(Some(n)),
            Checked::Overflow => Err(BuiltinError::Overflow {
                builtin: self.name.clone(),
            }),
            Checked::DivideByZero => Err(BuiltinError::DivideByZero {
                builtin: self.name.clone(),
            }),
        }
    }

    /// Z from X and Y
    fn forward(&self, x: Numeric, y: Numeric) -> Result<Option<Numeric>, BuiltinError> {
        self.checked(match self.op {
            ArithmeticOp::Add => x.add(y),
            ArithmeticOp::Subtract => x.sub(y),
            ArithmeticOp::Multiply => x.mul(y),
            ArithmeticOp::Divide => x.div(y),
            ArithmeticOp::Modulus => x.modulo(y),
        })
    }

    /// X from Y and Z
    fn solve_first(&self, y: Numeric, z: Numeric) -> Result<Option<Numeric>, BuiltinError> {
        match self.op {
            ArithmeticOp::Add => self.checked(z.sub(y)),
            ArithmeticOp::Subtract => self.checked(z.add(y)),
            ArithmeticOp::Multiply => Ok(z.div_exact(y)),
            ArithmeticOp::Divide => self.checked(z.mul(y)),
            ArithmeticOp::Modulus => Ok(None),
        }
    }

    /// Y from X and Z
    fn solve_second(&self, x: Numeric, z: Numeric) -> Result<Option<Numeric>, BuiltinError> {
        match self.op {
            ArithmeticOp::Add => self.checked(z.sub(x)),
            ArithmeticOp::Subtract => self.checked(x.sub(z)),
            ArithmeticOp::Multiply => Ok(z.div_exact(x)),
            ArithmeticOp::Divide => Ok(x.div_exact(z)),
            ArithmeticOp::Modulus => Ok(None),
        }
    }
}

impl Builtin for Arithmetic {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        3
    }

    fn binding(&self) -> BindingPattern {
        match self.op {
            ArithmeticOp::Modulus => BindingPattern::Function,
            _ => BindingPattern::Solvable,
        }
    }

    fn evaluate(&self, args: &[Term]) -> Result<Option<Vec<Term>>, BuiltinError> {
        check_arity(self, args)?;
        let ground: Vec<bool> = args.iter().map(Term::is_ground).collect();
        if !self.binding().can_evaluate(&ground) {
            return Err(unbound(self, args));
        }
        // A ground argument that is not a number can never satisfy the relation
        let numbers: Vec<Option<Numeric>> = args.iter().map(Numeric::from_term).collect();
        if ground.iter().zip(&numbers).any(|(g, n)| *g && n.is_none()) {
            return Ok(None);
        }

        let (position, solved) = match (numbers[0], numbers[1], numbers[2]) {
            (Some(x), Some(y), Some(z)) => {
                let holds = self.forward(x, y)?.is_some_and(|r| r.equals(z));
                return Ok(holds.then(|| args.to_vec()));
            }
            (Some(x), Some(y), None) => (2, self.forward(x, y)?),
            (None, Some(y), Some(z)) => (0, self.solve_first(y, z)?),
            (Some(x), None, Some(z)) => (1, self.solve_second(x, z)?),
            _ => return Err(unbound(self, args)),
        };

        let Some(value) = solved else {
            return Ok(None);
        };
        let mut subst = Substitution::new();
        if !unify(&args[position], &value.to_term(), &mut subst) {
            return Ok(None);
        }
        Ok(Some(subst.apply_all(args)).filter(|t| t.iter().all(Term::is_ground)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Term {
        Term::int(n)
    }

    fn var(name: &str) -> Term {
        Term::var(name)
    }

    fn add() -> Arithmetic {
        Arithmetic::new("ADD", ArithmeticOp::Add)
    }

    #[test]
    fn test_equality_binds_unbound_side() {
        let result = Equality.evaluate(&[var("U"), Term::atom("a")]).unwrap();
        assert_eq!(result, Some(vec![Term::atom("a"), Term::atom("a")]));

        let result = Equality.evaluate(&[int(3), var("X")]).unwrap();
        assert_eq!(result, Some(vec![int(3), int(3)]));
    }

    #[test]
    fn test_equality_on_ground_terms() {
        assert!(Equality.evaluate(&[int(1), Term::float(1.0)]).unwrap().is_some());
        assert_eq!(Equality.evaluate(&[Term::atom("a"), Term::atom("b")]).unwrap(), None);
        assert_eq!(Equality.evaluate(&[Term::atom("a"), int(1)]).unwrap(), None);
    }

    #[test]
    fn test_equality_destructures_compound_terms() {
        let pattern = Term::compound("f", vec![var("X"), Term::atom("b")]);
        let value = Term::compound("f", vec![Term::atom("a"), Term::atom("b")]);
        let result = Equality.evaluate(&[pattern, value.clone()]).unwrap();
        assert_eq!(result, Some(vec![value.clone(), value]));
    }

    #[test]
    fn test_equality_with_two_unbound_sides_is_an_error() {
        assert!(matches!(
            Equality.evaluate(&[var("X"), var("Y")]),
            Err(BuiltinError::Unbound { .. })
        ));
    }

    #[test]
    fn test_comparisons() {
        let less = Comparison::new("LESS", CompOp::Less);
        assert!(less.evaluate(&[int(1), int(2)]).unwrap().is_some());
        assert!(less.evaluate(&[int(2), int(1)]).unwrap().is_none());
        assert!(less.evaluate(&[int(1), Term::float(1.5)]).unwrap().is_some());
        assert!(less
            .evaluate(&[Term::atom("apple"), Term::atom("banana")])
            .unwrap()
            .is_some());
        // Mixed kinds never compare
        assert!(less.evaluate(&[int(1), Term::atom("a")]).unwrap().is_none());

        let ge = Comparison::new("GREATER_EQUAL", CompOp::GreaterEqual);
        assert!(ge.evaluate(&[int(2), int(2)]).unwrap().is_some());

        let ne = Comparison::new("NOT_EQUAL", CompOp::NotEqual);
        assert!(ne.evaluate(&[int(1), Term::atom("a")]).unwrap().is_some());
        assert!(ne.evaluate(&[int(1), Term::float(1.0)]).unwrap().is_none());
    }

    #[test]
    fn test_comparison_requires_bound_arguments() {
        let less = Comparison::new("LESS", CompOp::Less);
        assert!(matches!(
            less.evaluate(&[var("X"), int(1)]),
            Err(BuiltinError::Unbound { .. })
        ));
        assert!(matches!(
            less.evaluate(&[int(1)]),
            Err(BuiltinError::WrongArity { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_add_solves_any_position() {
        assert_eq!(
            add().evaluate(&[int(2), int(3), var("Z")]).unwrap(),
            Some(vec![int(2), int(3), int(5)])
        );
        assert_eq!(
            add().evaluate(&[var("X"), int(3), int(5)]).unwrap(),
            Some(vec![int(2), int(3), int(5)])
        );
        assert_eq!(
            add().evaluate(&[int(2), var("Y"), int(5)]).unwrap(),
            Some(vec![int(2), int(3), int(5)])
        );
        assert!(add().evaluate(&[int(2), int(3), int(6)]).unwrap().is_none());
    }

    #[test]
    fn test_subtract_and_divide_inverses() {
        let sub = Arithmetic::new("SUBTRACT", ArithmeticOp::Subtract);
        assert_eq!(
            sub.evaluate(&[int(10), var("Y"), int(4)]).unwrap(),
            Some(vec![int(10), int(6), int(4)])
        );
        let div = Arithmetic::new("DIVIDE", ArithmeticOp::Divide);
        assert_eq!(
            div.evaluate(&[var("X"), int(2), int(4)]).unwrap(),
            Some(vec![int(8), int(2), int(4)])
        );
        let mul = Arithmetic::new("MULTIPLY", ArithmeticOp::Multiply);
        assert!(mul.evaluate(&[int(2), var("Y"), int(7)]).unwrap().is_none());
    }

    #[test]
    fn test_divide_by_zero_is_an_error() {
        let div = Arithmetic::new("DIVIDE", ArithmeticOp::Divide);
        assert_eq!(
            div.evaluate(&[int(1), int(0), var("Z")]),
            Err(BuiltinError::DivideByZero {
                builtin: "DIVIDE".to_string()
            })
        );
        let modulus = Arithmetic::new("MODULUS", ArithmeticOp::Modulus);
        assert!(matches!(
            modulus.evaluate(&[int(1), int(0), var("Z")]),
            Err(BuiltinError::DivideByZero { .. })
        ));
    }

    #[test]
    fn test_modulus_only_computes_result() {
        let modulus = Arithmetic::new("MODULUS", ArithmeticOp::Modulus);
        assert_eq!(modulus.binding(), BindingPattern::Function);
        assert_eq!(
            modulus.evaluate(&[int(7), int(3), var("Z")]).unwrap(),
            Some(vec![int(7), int(3), int(1)])
        );
        assert!(matches!(
            modulus.evaluate(&[var("X"), int(3), int(1)]),
            Err(BuiltinError::Unbound { .. })
        ));
    }

    #[test]
    fn test_arithmetic_on_non_numbers_has_no_result() {
        assert_eq!(
            add().evaluate(&[Term::atom("a"), int(1), var("Z")]).unwrap(),
            None
        );
    }

    #[test]
    fn test_arithmetic_overflow() {
        assert!(matches!(
            add().evaluate(&[int(i64::MAX), int(1), var("Z")]),
            Err(BuiltinError::Overflow { .. })
        ));
    }
}
