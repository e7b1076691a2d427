//! Atoms, literals, rules and queries

use crate::predicate::{Predicate, Signature};
use crate::term::{is_anonymous, sym, write_terms, Symbol, Term};
use std::collections::BTreeSet;
use std::fmt;

/// An atom is a predicate applied to terms: `parent(john, mary)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    pub predicate: Predicate,
    pub terms: Vec<Term>,
}

impl Atom {
    /// Create an atom over a plain predicate whose arity is taken from `terms`
    pub fn new(name: &str, terms: Vec<Term>) -> Self {
        Atom {
            predicate: Predicate::Plain(Signature::new(sym(name), terms.len())),
            terms,
        }
    }

    pub fn with_predicate(predicate: Predicate, terms: Vec<Term>) -> Self {
        Atom { predicate, terms }
    }

    /// Variables in order of first appearance
    pub fn variables(&self) -> Vec<Symbol> {
        let mut out = Vec::new();
        for term in &self.terms {
            term.collect_variables(&mut out);
        }
        out
    }

    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(Term::is_ground)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate)?;
        write_terms(f, &self.terms)?;
        write!(f, ")")
    }
}

/// A builtin predicate applied to terms: `EQUAL(X, a)`, `ADD(X, Y, Z)`
///
/// The name is resolved against a builtin registry at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuiltinAtom {
    pub name: Symbol,
    pub terms: Vec<Term>,
}

impl BuiltinAtom {
    pub fn new(name: &str, terms: Vec<Term>) -> Self {
        BuiltinAtom {
            name: sym(name),
            terms,
        }
    }

    pub fn variables(&self) -> Vec<Symbol> {
        let mut out = Vec::new();
        for term in &self.terms {
            term.collect_variables(&mut out);
        }
        out
    }
}

impl fmt::Display for BuiltinAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name.as_str())?;
        write_terms(f, &self.terms)?;
        write!(f, ")")
    }
}

/// A body literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Literal {
    /// Positive atom: `parent(X, Y)`
    Positive(Atom),
    /// Negated atom: `not parent(X, Y)`
    Negative(Atom),
    /// Builtin: `LESS(X, 5)`
    Builtin(BuiltinAtom),
}

impl Literal {
    pub fn positive(atom: Atom) -> Self {
        Literal::Positive(atom)
    }

    pub fn negative(atom: Atom) -> Self {
        Literal::Negative(atom)
    }

    pub fn builtin(name: &str, terms: Vec<Term>) -> Self {
        Literal::Builtin(BuiltinAtom::new(name, terms))
    }

    /// Get the underlying atom from a literal (None for builtins)
    pub fn atom(&self) -> Option<&Atom> {
        match self {
            Literal::Positive(atom) | Literal::Negative(atom) => Some(atom),
            Literal::Builtin(_) => None,
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Literal::Positive(_))
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Literal::Negative(_))
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Literal::Builtin(_))
    }

    pub fn terms(&self) -> &[Term] {
        match self {
            Literal::Positive(atom) | Literal::Negative(atom) => &atom.terms,
            Literal::Builtin(builtin) => &builtin.terms,
        }
    }

    /// Variables in order of first appearance
    pub fn variables(&self) -> Vec<Symbol> {
        match self {
            Literal::Positive(atom) | Literal::Negative(atom) => atom.variables(),
            Literal::Builtin(builtin) => builtin.variables(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Positive(atom) => write!(f, "{}", atom),
            Literal::Negative(atom) => write!(f, "not {}", atom),
            Literal::Builtin(builtin) => write!(f, "{}", builtin),
        }
    }
}

/// A rule has a head and a body: `ancestor(X, Y) :- parent(X, Y).`
///
/// A rule with an empty body and a ground head is a fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rule {
    pub head: Atom,
    pub body: Vec<Literal>,
}

impl Rule {
    pub fn new(head: Atom, body: Vec<Literal>) -> Self {
        Rule { head, body }
    }

    pub fn fact(head: Atom) -> Self {
        Rule {
            head,
            body: Vec::new(),
        }
    }

    /// All variables of the rule, head first
    pub fn variables(&self) -> BTreeSet<Symbol> {
        let mut vars: BTreeSet<Symbol> = self.head.variables().into_iter().collect();
        for literal in &self.body {
            vars.extend(literal.variables());
        }
        vars
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        if !self.body.is_empty() {
            write!(f, " :- ")?;
            for (i, literal) in self.body.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", literal)?;
            }
        }
        write!(f, ".")
    }
}

/// A conjunctive query: `?- parent(X, mary), not dead(X).`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Query {
    pub body: Vec<Literal>,
}

impl Query {
    pub fn new(body: Vec<Literal>) -> Self {
        Query { body }
    }

    /// Answer variables in order of first appearance, anonymous ones excluded
    pub fn variables(&self) -> Vec<Symbol> {
        let mut out: Vec<Symbol> = Vec::new();
        for literal in &self.body {
            for var in literal.variables() {
                if !is_anonymous(&var) && !out.contains(&var) {
                    out.push(var);
                }
            }
        }
        out
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?- ")?;
        for (i, literal) in self.body.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", literal)?;
        }
        write!(f, ".")
    }
}
