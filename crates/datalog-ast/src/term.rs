//! Terms and constant values
//!
//! A term is a variable, a constant, or a compound term built from a
//! function symbol. Terms are immutable values compared structurally.

use internment::Intern;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Interned string for efficient storage and comparison
pub type Symbol = Intern<String>;

/// Intern a string as a [`Symbol`]
pub fn sym(name: &str) -> Symbol {
    Intern::new(name.to_string())
}

/// Constant values
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(Symbol),
    /// Atom (lowercase identifier used as a constant)
    Atom(Symbol),
}

impl Value {
    fn rank(&self) -> u8 {
        match self {
            Value::Integer(_) => 0,
            Value::Float(_) => 1,
            Value::Boolean(_) => 2,
            Value::String(_) => 3,
            Value::Atom(_) => 4,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Atom(a), Value::Atom(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::String(s) | Value::Atom(s) => s.hash(state),
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) | (Value::Atom(a), Value::Atom(b)) => {
                a.as_str().cmp(b.as_str())
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{:?}", s.as_str()),
            Value::Atom(a) => write!(f, "{}", a.as_str()),
        }
    }
}

/// A term can be a variable, constant, or compound term
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// Variable: unifies with anything (X, Y, _tmp)
    Variable(Symbol),
    /// Constant value
    Constant(Value),
    /// Compound term: functor with arguments (f(a, b))
    Compound(Symbol, Vec<Term>),
}

/// An ordered, fixed-arity sequence of terms
pub type Tuple = Vec<Term>;

impl Term {
    pub fn var(name: &str) -> Self {
        Term::Variable(sym(name))
    }

    /// An atom constant such as `john`
    pub fn atom(name: &str) -> Self {
        Term::Constant(Value::Atom(sym(name)))
    }

    pub fn int(value: i64) -> Self {
        Term::Constant(Value::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Term::Constant(Value::Float(value))
    }

    pub fn string(value: &str) -> Self {
        Term::Constant(Value::String(sym(value)))
    }

    pub fn compound(functor: &str, args: Vec<Term>) -> Self {
        Term::Compound(sym(functor), args)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// A term is ground when it contains no variables
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Constant(_) => true,
            Term::Compound(_, args) => args.iter().all(Term::is_ground),
        }
    }

    /// Collect the variables of this term into `out`, in order of appearance
    pub fn collect_variables(&self, out: &mut Vec<Symbol>) {
        match self {
            Term::Variable(v) => {
                if !out.contains(v) {
                    out.push(*v);
                }
            }
            Term::Constant(_) => {}
            Term::Compound(_, args) => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
        }
    }

    pub fn variables(&self) -> BTreeSet<Symbol> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out.into_iter().collect()
    }
}

/// Variables starting with `_` are anonymous
pub fn is_anonymous(var: &Symbol) -> bool {
    var.starts_with('_')
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{}", v.as_str()),
            Term::Constant(c) => write!(f, "{}", c),
            Term::Compound(functor, args) => {
                write!(f, "{}(", functor.as_str())?;
                write_terms(f, args)?;
                write!(f, ")")
            }
        }
    }
}

pub(crate) fn write_terms(f: &mut fmt::Formatter<'_>, terms: &[Term]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", term)?;
    }
    Ok(())
}
