//! Relations: arity-checked sets of tuples
//!
//! Tuples keep their insertion order so evaluation results are reproducible
//! across runs.

use datalog_ast::{Predicate, Term, Tuple};
use std::collections::HashSet;
use thiserror::Error;

/// A tuple did not have the arity its relation expects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "arity mismatch for {}: expected {expected} terms, got {found}",
    .predicate.as_deref().unwrap_or("relation")
)]
pub struct ArityMismatch {
    pub predicate: Option<String>,
    pub expected: usize,
    pub found: usize,
}

/// A set of tuples of one arity
#[derive(Debug, Clone, Default)]
pub struct Relation {
    arity: usize,
    tuples: Vec<Tuple>,
    members: HashSet<Tuple>,
}

impl Relation {
    pub fn new(arity: usize) -> Self {
        Relation {
            arity,
            tuples: Vec::new(),
            members: HashSet::new(),
        }
    }

    /// Build a relation from tuples, rejecting any of the wrong arity
    pub fn from_tuples(
        arity: usize,
        tuples: impl IntoIterator<Item = Tuple>,
    ) -> Result<Self, ArityMismatch> {
        let mut relation = Relation::new(arity);
        for tuple in tuples {
            relation.add(tuple)?;
        }
        Ok(relation)
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Insert a tuple, returning whether it was new
    pub fn add(&mut self, tuple: Tuple) -> Result<bool, ArityMismatch> {
        if tuple.len() != self.arity {
            return Err(ArityMismatch {
                predicate: None,
                expected: self.arity,
                found: tuple.len(),
            });
        }
        if self.members.contains(&tuple) {
            return Ok(false);
        }
        self.members.insert(tuple.clone());
        self.tuples.push(tuple);
        Ok(true)
    }

    pub fn contains(&self, tuple: &[Term]) -> bool {
        self.members.contains(tuple)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Add every tuple of `other`, returning how many were new
    pub fn extend(&mut self, other: &Relation) -> Result<usize, ArityMismatch> {
        let mut added = 0;
        for tuple in other.iter() {
            if self.add(tuple.clone())? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Tuples sorted, for order-independent comparison
    pub fn sorted(&self) -> Vec<Tuple> {
        let mut tuples = self.tuples.clone();
        tuples.sort();
        tuples
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.arity == other.arity && self.members == other.members
    }
}

impl Eq for Relation {}

impl<'a> IntoIterator for &'a Relation {
    type Item = &'a Tuple;
    type IntoIter = std::slice::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}

impl ArityMismatch {
    /// Attach the predicate whose relation rejected the tuple
    pub fn for_predicate(mut self, predicate: &Predicate) -> Self {
        self.predicate = Some(predicate.to_string());
        self
    }
}
