//! Sideways information passing graphs
//!
//! A SIP describes how variable bindings flow through one rule body. Its
//! nodes are the rule head (node 0) and the distinct body literals; an edge
//! `source -> target` is labeled with the variables `source` makes available
//! to `target`. The bound variables of a literal are the union of the labels
//! of its entering edges.
//!
//! # Construction
//!
//! 1. Order the body: positive literals keep their place, while negated and
//!    builtin literals wait until all of their variables are bound
//! 2. Walk the ordered body; for every variable of a literal, add an edge
//!    from each earlier passer of that variable (the head for the initially
//!    bound variables, and every earlier positive literal)
//! 3. Positive literals become passers of their variables; negated and
//!    builtin literals only consume bindings
//!
//! Identical literals share one node, and a literal never passes to itself.
//!
//! # Example
//!
//! ```ignore
//! // sg(X, Y) :- up(X, Z1), sg(Z1, Z2), flat(Z2, Y).  with X bound
//! let sip = Sip::new(&rule.head, &rule.body, &bound);
//! // edges: head -{X}-> up -{Z1}-> sg -{Z2}-> flat
//! assert_eq!(sip.bound_variables(sip.node_at(1)), btreeset![Z1]);
//! ```

use datalog_ast::{is_anonymous, Atom, Literal, Symbol};
use std::collections::{BTreeMap, BTreeSet};

/// Index of a node in a [`Sip`]
pub type NodeId = usize;

/// The head of the rule is always node 0
pub const HEAD: NodeId = 0;

/// An edge passing `variables` from `source` to `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SipEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub variables: BTreeSet<Symbol>,
}

/// Sideways information passing graph of one rule
#[derive(Debug, Clone)]
pub struct Sip {
    nodes: Vec<Literal>,
    edges: Vec<SipEdge>,
    incoming: Vec<Vec<usize>>,
    order: Vec<NodeId>,
    positions: Vec<NodeId>,
}

fn named_variables(literal: &Literal) -> impl Iterator<Item = Symbol> {
    literal
        .variables()
        .into_iter()
        .filter(|v| !is_anonymous(v))
}

/// Order a rule body so literals that only consume bindings come after the
/// literals binding their variables
///
/// Returns body positions. A consumer whose variables never all become bound
/// keeps its relative order at the end.
pub fn order_literals(body: &[Literal], known: &BTreeSet<Symbol>) -> Vec<usize> {
    let mut bound = known.clone();
    let mut order = Vec::with_capacity(body.len());
    let mut deferred: Vec<usize> = Vec::new();

    let ready = |literal: &Literal, bound: &BTreeSet<Symbol>| {
        named_variables(literal).all(|v| bound.contains(&v))
    };

    for (position, literal) in body.iter().enumerate() {
        if literal.is_positive() {
            order.push(position);
            bound.extend(named_variables(literal));
            deferred.retain(|&waiting| {
                if ready(&body[waiting], &bound) {
                    order.push(waiting);
                    false
                } else {
                    true
                }
            });
        } else if ready(literal, &bound) {
            order.push(position);
        } else {
            deferred.push(position);
        }
    }
    order.extend(deferred);
    order
}

impl Sip {
    /// Build the SIP of `head :- body` where `bound` is known on entry
    pub fn new(head: &Atom, body: &[Literal], bound: &BTreeSet<Symbol>) -> Self {
        let mut sip = Sip {
            nodes: vec![Literal::Positive(head.clone())],
            edges: Vec::new(),
            incoming: vec![Vec::new()],
            order: Vec::new(),
            positions: vec![HEAD; body.len()],
        };

        for position in order_literals(body, bound) {
            let literal = &body[position];
            let existing = sip.nodes[1..]
                .iter()
                .position(|n| n == literal)
                .map(|i| i + 1);
            let node = match existing {
                Some(node) => node,
                None => {
                    sip.nodes.push(literal.clone());
                    sip.incoming.push(Vec::new());
                    let node = sip.nodes.len() - 1;
                    sip.order.push(node);
                    node
                }
            };
            sip.positions[position] = node;
        }

        let mut passings: BTreeMap<Symbol, Vec<NodeId>> = bound
            .iter()
            .map(|var| (*var, vec![HEAD]))
            .collect();
        for index in 0..sip.order.len() {
            let node = sip.order[index];
            let literal = sip.nodes[node].clone();
            for var in named_variables(&literal) {
                let passers = passings.entry(var).or_default();
                for &source in passers.iter() {
                    if source != node {
                        add_edge(&mut sip.edges, &mut sip.incoming, source, node, var);
                    }
                }
                if literal.is_positive() && !passers.contains(&node) {
                    passers.push(node);
                }
            }
        }
        sip
    }

    /// The literal at a node; node 0 is the head as a positive literal
    pub fn literal(&self, node: NodeId) -> &Literal {
        &self.nodes[node]
    }

    /// Node of the literal at a position of the original body
    pub fn node_at(&self, position: usize) -> NodeId {
        self.positions[position]
    }

    /// Node holding a literal structurally equal to `literal`
    pub fn node_of(&self, literal: &Literal) -> Option<NodeId> {
        self.nodes[1..]
            .iter()
            .position(|n| n == literal)
            .map(|i| i + 1)
    }

    /// Body nodes in evaluation order
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn edges(&self) -> &[SipEdge] {
        &self.edges
    }

    /// Edges entering `node`, ordered by the position of their source
    pub fn edges_entering(&self, node: NodeId) -> Vec<&SipEdge> {
        let mut edges: Vec<&SipEdge> = self.incoming[node].iter().map(|&e| &self.edges[e]).collect();
        edges.sort_by_key(|edge| self.rank(edge.source));
        edges
    }

    /// Variables bound when `node` is reached
    pub fn bound_variables(&self, node: NodeId) -> BTreeSet<Symbol> {
        self.incoming[node]
            .iter()
            .flat_map(|&e| self.edges[e].variables.iter().copied())
            .collect()
    }

    /// Every node `node` transitively receives bindings from
    pub fn depends(&self, node: NodeId) -> BTreeSet<NodeId> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            for &e in &self.incoming[current] {
                let source = self.edges[e].source;
                if seen.insert(source) {
                    stack.push(source);
                }
            }
        }
        seen
    }

    /// Position of a node in evaluation order, with the head first
    pub fn rank(&self, node: NodeId) -> usize {
        if node == HEAD {
            return 0;
        }
        self.order
            .iter()
            .position(|&n| n == node)
            .map_or(usize::MAX, |i| i + 1)
    }
}

fn add_edge(
    edges: &mut Vec<SipEdge>,
    incoming: &mut [Vec<usize>],
    source: NodeId,
    target: NodeId,
    var: Symbol,
) {
    if let Some(&e) = incoming[target]
        .iter()
        .find(|&&e| edges[e].source == source)
    {
        edges[e].variables.insert(var);
        return;
    }
    edges.push(SipEdge {
        source,
        target,
        variables: BTreeSet::from([var]),
    });
    incoming[target].push(edges.len() - 1);
}
