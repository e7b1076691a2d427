//! Fact database: one relation per predicate
//!
//! The evaluator keeps several of these at once: the full database at the
//! start of a round, the delta derived in the previous round, and the delta
//! being accumulated for the next one.

use crate::relation::{ArityMismatch, Relation};
use crate::unification::{unify_all, Substitution};
use datalog_ast::{Atom, Predicate, Term, Tuple};
use std::collections::HashMap;
use thiserror::Error;

/// A fact could not be stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactError {
    #[error(transparent)]
    Arity(#[from] ArityMismatch),
    #[error("fact '{fact}' is not ground")]
    NonGround { fact: String },
}

/// Relations keyed by predicate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactDatabase {
    relations: HashMap<Predicate, Relation>,
}

impl FactDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tuple for `predicate`, returning whether it was new
    pub fn insert(&mut self, predicate: &Predicate, tuple: Tuple) -> Result<bool, ArityMismatch> {
        let relation = self
            .relations
            .entry(predicate.clone())
            .or_insert_with(|| Relation::new(predicate.arity()));
        relation.add(tuple).map_err(|e| e.for_predicate(predicate))
    }

    /// Insert a ground atom as a fact; atoms with variables are rejected
    pub fn insert_atom(&mut self, atom: &Atom) -> Result<bool, FactError> {
        if !atom.is_ground() {
            return Err(FactError::NonGround {
                fact: atom.to_string(),
            });
        }
        Ok(self.insert(&atom.predicate, atom.terms.clone())?)
    }

    /// Merge a whole relation in under `predicate`
    pub fn insert_relation(
        &mut self,
        predicate: &Predicate,
        relation: &Relation,
    ) -> Result<usize, ArityMismatch> {
        if relation.arity() != predicate.arity() {
            return Err(ArityMismatch {
                predicate: Some(predicate.to_string()),
                expected: predicate.arity(),
                found: relation.arity(),
            });
        }
        let target = self
            .relations
            .entry(predicate.clone())
            .or_insert_with(|| Relation::new(predicate.arity()));
        target.extend(relation).map_err(|e| e.for_predicate(predicate))
    }

    /// Merge every relation of `other`, returning how many tuples were new
    pub fn merge(&mut self, other: &FactDatabase) -> Result<usize, ArityMismatch> {
        let mut added = 0;
        for (predicate, relation) in &other.relations {
            added += self.insert_relation(predicate, relation)?;
        }
        Ok(added)
    }

    pub fn relation(&self, predicate: &Predicate) -> Option<&Relation> {
        self.relations.get(predicate)
    }

    pub fn contains(&self, predicate: &Predicate, tuple: &[Term]) -> bool {
        self.relations
            .get(predicate)
            .is_some_and(|relation| relation.contains(tuple))
    }

    /// Whether `predicate` has any tuples
    pub fn has_tuples(&self, predicate: &Predicate) -> bool {
        self.relations
            .get(predicate)
            .is_some_and(|relation| !relation.is_empty())
    }

    /// Find every tuple matching `pattern`, extending `subst` for each match
    pub fn query(&self, pattern: &Atom, subst: &Substitution) -> Vec<Substitution> {
        let Some(relation) = self.relations.get(&pattern.predicate) else {
            return Vec::new();
        };
        let terms = subst.apply_all(&pattern.terms);
        relation
            .iter()
            .filter_map(|tuple| {
                let mut extended = subst.clone();
                unify_all(&terms, tuple, &mut extended).then_some(extended)
            })
            .collect()
    }

    /// Whether any tuple matches `pattern` under `subst`
    pub fn matches_any(&self, pattern: &Atom, subst: &Substitution) -> bool {
        let Some(relation) = self.relations.get(&pattern.predicate) else {
            return false;
        };
        let terms = subst.apply_all(&pattern.terms);
        if terms.iter().all(Term::is_ground) {
            return relation.contains(&terms);
        }
        relation
            .iter()
            .any(|tuple| unify_all(&terms, tuple, &mut Substitution::new()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Predicate, &Relation)> {
        self.relations.iter()
    }

    /// Total number of tuples over all predicates
    pub fn len(&self) -> usize {
        self.relations.values().map(Relation::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.values().all(Relation::is_empty)
    }
}
