//! Unification of terms
//!
//! Rule firing joins body literals by unifying their terms with stored
//! tuples. Stored tuples are ground, so most calls bind variables of a rule
//! against constants, but compound terms on both sides are supported.
//!
//! # Algorithm
//!
//! Robinson's unification with an occurs check to prevent infinite
//! structures. The wildcard variable `_` unifies with anything without
//! being bound.
//!
//! # Example
//!
//! ```ignore
//! // Unify parent(X, mary) with parent(john, Y)
//! // Result: X=john, Y=mary
//! let mut subst = Substitution::new();
//! assert!(unify_atoms(&pattern1, &pattern2, &mut subst));
//! ```

use datalog_ast::{Atom, Symbol, Term};
use std::collections::HashMap;

/// A substitution maps variables to terms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: HashMap<Symbol, Term>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable to a term
    pub fn bind(&mut self, var: Symbol, term: Term) {
        self.bindings.insert(var, term);
    }

    /// Get the binding for a variable
    pub fn get(&self, var: &Symbol) -> Option<&Term> {
        self.bindings.get(var)
    }

    pub fn contains(&self, var: &Symbol) -> bool {
        self.bindings.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Term)> {
        self.bindings.iter()
    }

    /// Apply substitution to a term
    pub fn apply(&self, term: &Term) -> Term {
        match term {
            Term::Variable(var) => match self.get(var) {
                // Bound terms may themselves mention variables
                Some(bound) => self.apply(bound),
                None => term.clone(),
            },
            Term::Constant(_) => term.clone(),
            Term::Compound(functor, args) => {
                Term::Compound(*functor, args.iter().map(|arg| self.apply(arg)).collect())
            }
        }
    }

    pub fn apply_all(&self, terms: &[Term]) -> Vec<Term> {
        terms.iter().map(|t| self.apply(t)).collect()
    }

    /// Apply substitution to an atom
    pub fn apply_atom(&self, atom: &Atom) -> Atom {
        Atom {
            predicate: atom.predicate.clone(),
            terms: self.apply_all(&atom.terms),
        }
    }
}

/// Unify two terms, extending `subst` on success
///
/// On failure `subst` may hold partial bindings; callers unify against a
/// clone when they need to backtrack.
pub fn unify(term1: &Term, term2: &Term, subst: &mut Substitution) -> bool {
    let t1 = subst.apply(term1);
    let t2 = subst.apply(term2);

    match (&t1, &t2) {
        (Term::Constant(v1), Term::Constant(v2)) => v1 == v2,

        (Term::Variable(var), _) | (_, Term::Variable(var)) if var.as_str() == "_" => true,

        (Term::Variable(a), Term::Variable(b)) if a == b => true,

        (Term::Variable(var), t) | (t, Term::Variable(var)) => {
            if occurs_check(var, t) {
                false
            } else {
                subst.bind(*var, t.clone());
                true
            }
        }

        (Term::Compound(f1, args1), Term::Compound(f2, args2)) => {
            f1 == f2 && args1.len() == args2.len() && unify_all(args1, args2, subst)
        }

        _ => false,
    }
}

/// Unify two term lists pairwise
pub fn unify_all(terms1: &[Term], terms2: &[Term], subst: &mut Substitution) -> bool {
    terms1.len() == terms2.len()
        && terms1
            .iter()
            .zip(terms2.iter())
            .all(|(t1, t2)| unify(t1, t2, subst))
}

/// Occurs check: does variable occur in term?
fn occurs_check(var: &Symbol, term: &Term) -> bool {
    match term {
        Term::Variable(v) => v == var,
        Term::Constant(_) => false,
        Term::Compound(_, args) => args.iter().any(|arg| occurs_check(var, arg)),
    }
}

/// Unify two atoms over the same predicate
pub fn unify_atoms(atom1: &Atom, atom2: &Atom, subst: &mut Substitution) -> bool {
    atom1.predicate == atom2.predicate && unify_all(&atom1.terms, &atom2.terms, subst)
}
