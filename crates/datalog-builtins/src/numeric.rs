//! Numeric helpers shared by the comparison and arithmetic builtins
//!
//! Integers promote to floats when mixed with floats. Integer arithmetic is
//! checked; an overflow is reported instead of wrapping.

use datalog_ast::{Term, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    Int(i64),
    Float(f64),
}

/// Outcome of a checked operation
pub(crate) enum Checked {
    Value(Numeric),
    Overflow,
    DivideByZero,
}

impl Numeric {
    pub(crate) fn from_term(term: &Term) -> Option<Self> {
        match term {
            Term::Constant(Value::Integer(i)) => Some(Numeric::Int(*i)),
            Term::Constant(Value::Float(f)) => Some(Numeric::Float(*f)),
            _ => None,
        }
    }

    pub(crate) fn to_term(self) -> Term {
        match self {
            Numeric::Int(i) => Term::Constant(Value::Integer(i)),
            Numeric::Float(f) => Term::Constant(Value::Float(f)),
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    pub(crate) fn compare(self, other: Numeric) -> Option<Ordering> {
        match (self, other) {
            (Numeric::Int(l), Numeric::Int(r)) => Some(l.cmp(&r)),
            (l, r) => l.to_f64().partial_cmp(&r.to_f64()),
        }
    }

    pub(crate) fn add(self, other: Numeric) -> Checked {
        match (self, other) {
            (Numeric::Int(l), Numeric::Int(r)) => l.checked_add(r).into(),
            (l, r) => Checked::Value(Numeric::Float(l.to_f64() + r.to_f64())),
        }
    }

    pub(crate) fn sub(self, other: Numeric) -> Checked {
        match (self, other) {
            (Numeric::Int(l), Numeric::Int(r)) => l.checked_sub(r).into(),
            (l, r) => Checked::Value(Numeric::Float(l.to_f64() - r.to_f64())),
        }
    }

    pub(crate) fn mul(self, other: Numeric) -> Checked {
        match (self, other) {
            (Numeric::Int(l), Numeric::Int(r)) => l.checked_mul(r).into(),
            (l, r) => Checked::Value(Numeric::Float(l.to_f64() * r.to_f64())),
        }
    }

    pub(crate) fn div(self, other: Numeric) -> Checked {
        match (self, other) {
            (Numeric::Int(_), Numeric::Int(0)) => Checked::DivideByZero,
            (Numeric::Int(l), Numeric::Int(r)) => l.checked_div(r).into(),
            (l, r) => {
                let divisor = r.to_f64();
                if divisor == 0.0 {
                    Checked::DivideByZero
                } else {
                    Checked::Value(Numeric::Float(l.to_f64() / divisor))
                }
            }
        }
    }

    pub(crate) fn modulo(self, other: Numeric) -> Checked {
        match (self, other) {
            (Numeric::Int(_), Numeric::Int(0)) => Checked::DivideByZero,
            (Numeric::Int(l), Numeric::Int(r)) => l.checked_rem(r).into(),
            (l, r) => {
                let divisor = r.to_f64();
                if divisor == 0.0 {
                    Checked::DivideByZero
                } else {
                    Checked::Value(Numeric::Float(l.to_f64() % divisor))
                }
            }
        }
    }

    /// Exact integer division, used when solving a product for a factor
    pub(crate) fn div_exact(self, other: Numeric) -> Option<Numeric> {
        match (self, other) {
            (Numeric::Int(_), Numeric::Int(0)) => None,
            (Numeric::Int(l), Numeric::Int(r)) => {
                (l.checked_rem(r)? == 0).then(|| l.checked_div(r)).flatten().map(Numeric::Int)
            }
            (l, r) => {
                let divisor = r.to_f64();
                (divisor != 0.0).then(|| Numeric::Float(l.to_f64() / divisor))
            }
        }
    }

    pub(crate) fn equals(self, other: Numeric) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl From<Option<i64>> for Checked {
    fn from(value: Option<i64>) -> Self {
        match value {
            Some(i) => Checked::Value(Numeric::Int(i)),
            None => Checked::Overflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(checked: Checked) -> Option<Numeric> {
        match checked {
            Checked::Value(n) => Some(n),
            _ => None,
        }
    }

    #[test]
    fn test_mixed_promotion() {
        assert_eq!(
            value(Numeric::Int(1).add(Numeric::Float(0.5))),
            Some(Numeric::Float(1.5))
        );
        assert!(Numeric::Int(2).equals(Numeric::Float(2.0)));
    }

    #[test]
    fn test_integer_overflow_is_detected() {
        assert!(matches!(
            Numeric::Int(i64::MAX).add(Numeric::Int(1)),
            Checked::Overflow
        ));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            Numeric::Int(1).div(Numeric::Int(0)),
            Checked::DivideByZero
        ));
        assert!(matches!(
            Numeric::Float(1.0).modulo(Numeric::Int(0)),
            Checked::DivideByZero
        ));
    }

    #[test]
    fn test_div_exact() {
        assert_eq!(Numeric::Int(6).div_exact(Numeric::Int(3)), Some(Numeric::Int(2)));
        assert_eq!(Numeric::Int(7).div_exact(Numeric::Int(3)), None);
        assert_eq!(Numeric::Int(7).div_exact(Numeric::Int(0)), None);
    }
}
