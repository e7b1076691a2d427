//! Predicates and binding patterns
//!
//! A plain predicate is identified by its symbol and arity. The magic-set
//! rewriting introduces three further kinds of predicates, all keyed by an
//! [`AdornedPredicate`]:
//!
//! - **Adorned**: `sg^bf`, the specialisation of `sg` for a binding pattern
//! - **Magic**: `magic_sg^bf`, the guard holding the bindings `sg^bf` is asked for
//! - **Labeled**: `label_sg_1^bf`, one partial contribution to a magic guard
//!
//! Magic and labeled predicates only store the bound positions, so their
//! relation arity is the number of BOUND adornments.

use crate::term::{sym, Symbol, Term};
use std::fmt;

/// Name and arity of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    pub symbol: Symbol,
    pub arity: usize,
}

impl Signature {
    pub fn new(symbol: Symbol, arity: usize) -> Self {
        Signature { symbol, arity }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.symbol.as_str(), self.arity)
    }
}

/// Binding annotation for one argument position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Adornment {
    Bound,
    Free,
}

impl Adornment {
    pub fn is_bound(self) -> bool {
        self == Adornment::Bound
    }
}

impl fmt::Display for Adornment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adornment::Bound => write!(f, "b"),
            Adornment::Free => write!(f, "f"),
        }
    }
}

/// A predicate signature together with one adornment per argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdornedPredicate {
    pub signature: Signature,
    pub adornment: Vec<Adornment>,
}

impl AdornedPredicate {
    pub fn new(signature: Signature, adornment: Vec<Adornment>) -> Self {
        debug_assert_eq!(signature.arity, adornment.len());
        AdornedPredicate {
            signature,
            adornment,
        }
    }

    /// Adorn `terms` for `signature`: a position is bound if its term is
    /// ground or all of its variables satisfy `is_bound`.
    pub fn from_terms(
        signature: Signature,
        terms: &[Term],
        is_bound: impl Fn(&Symbol) -> bool,
    ) -> Self {
        let adornment = terms
            .iter()
            .map(|term| {
                if term.variables().iter().all(&is_bound) {
                    Adornment::Bound
                } else {
                    Adornment::Free
                }
            })
            .collect();
        AdornedPredicate::new(signature, adornment)
    }

    pub fn bound_count(&self) -> usize {
        self.adornment.iter().filter(|a| a.is_bound()).count()
    }

    pub fn is_all_free(&self) -> bool {
        self.bound_count() == 0
    }

    /// Select the terms sitting at bound positions
    pub fn bound_terms(&self, terms: &[Term]) -> Vec<Term> {
        terms
            .iter()
            .zip(&self.adornment)
            .filter(|(_, a)| a.is_bound())
            .map(|(t, _)| t.clone())
            .collect()
    }

    fn pattern(&self) -> String {
        self.adornment.iter().map(|a| a.to_string()).collect()
    }
}

/// Predicate identity used for relation lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Predicate {
    Plain(Signature),
    Adorned(AdornedPredicate),
    Magic(AdornedPredicate),
    Labeled {
        predicate: AdornedPredicate,
        label: usize,
    },
}

impl Predicate {
    pub fn plain(name: &str, arity: usize) -> Self {
        Predicate::Plain(Signature::new(sym(name), arity))
    }

    /// The user-level signature this predicate was derived from
    pub fn signature(&self) -> Signature {
        match self {
            Predicate::Plain(signature) => *signature,
            Predicate::Adorned(p) | Predicate::Magic(p) | Predicate::Labeled { predicate: p, .. } => {
                p.signature
            }
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.signature().symbol
    }

    /// Number of terms stored per tuple
    pub fn arity(&self) -> usize {
        match self {
            Predicate::Plain(signature) => signature.arity,
            Predicate::Adorned(p) => p.signature.arity,
            Predicate::Magic(p) | Predicate::Labeled { predicate: p, .. } => p.bound_count(),
        }
    }

    pub fn adorned(&self) -> Option<&AdornedPredicate> {
        match self {
            Predicate::Adorned(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, Predicate::Plain(_))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Plain(signature) => write!(f, "{}", signature.symbol.as_str()),
            Predicate::Adorned(p) => {
                write!(f, "{}^{}", p.signature.symbol.as_str(), p.pattern())
            }
            Predicate::Magic(p) => {
                write!(f, "magic_{}^{}", p.signature.symbol.as_str(), p.pattern())
            }
            Predicate::Labeled { predicate, label } => write!(
                f,
                "label_{}_{}^{}",
                predicate.signature.symbol.as_str(),
                label,
                predicate.pattern()
            ),
        }
    }
}
