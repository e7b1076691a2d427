//! Stratification analysis for programs with negation
//!
//! A program is stratifiable if no cycle of the predicate dependency graph
//! passes through a negated edge. Stratification assigns each predicate to a
//! stratum (layer): a predicate's rules may depend positively on predicates
//! of the same or lower strata, and negatively only on strictly lower ones.
//!
//! # Algorithm
//!
//! 1. Build the dependency graph as an arena of predicate nodes with
//!    adjacency lists of `(target, polarity)` edges
//! 2. Find strongly connected components (Tarjan); a negative edge inside a
//!    component is a cycle through negation
//! 3. Walk the components dependencies-first, giving each the longest path
//!    below it where negative edges count as one step
//!
//! # Example
//!
//! ```ignore
//! let stratification = stratify(&rules)?;
//! for rules_in_stratum in stratification.strata() {
//!     // Evaluate rules stratum by stratum
//! }
//! ```

use datalog_ast::{Literal, Predicate, Rule};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tracing::debug;

/// Rules evaluated together
pub type Stratum = Vec<Rule>;

/// Result of stratification analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stratification {
    /// Stratum of every predicate mentioned by the rules (0 = bottom)
    pub predicate_strata: HashMap<Predicate, usize>,
    /// Rules organized by the stratum of their head, in program order
    pub rules_by_stratum: Vec<Stratum>,
    /// Total number of strata
    pub num_strata: usize,
}

impl Stratification {
    pub fn strata(&self) -> impl Iterator<Item = &Stratum> {
        self.rules_by_stratum.iter()
    }

    pub fn stratum_of(&self, predicate: &Predicate) -> Option<usize> {
        self.predicate_strata.get(predicate).copied()
    }
}

/// Error during stratification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StratificationError {
    /// A predicate depends negatively on itself, directly or transitively
    #[error("program is not stratifiable: cycle through negation {}", display_cycle(.cycle))]
    NonStratifiable { cycle: Vec<Predicate> },
}

fn display_cycle(cycle: &[Predicate]) -> String {
    let mut names: Vec<String> = cycle.iter().map(|p| p.to_string()).collect();
    if let Some(first) = names.first().cloned() {
        names.push(first);
    }
    names.join(" -> ")
}

/// Dependency between predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Positive,
    Negative,
}

type NodeId = usize;

/// Predicate dependency graph: an edge `p -> q` means a rule for `p` uses `q`
#[derive(Debug, Clone, Default)]
struct DependencyGraph {
    nodes: Vec<Predicate>,
    index: HashMap<Predicate, NodeId>,
    edges: Vec<Vec<(NodeId, Polarity)>>,
}

impl DependencyGraph {
    fn from_rules(rules: &[Rule]) -> Self {
        let mut graph = DependencyGraph::default();
        for rule in rules {
            let head = graph.node(&rule.head.predicate);
            for literal in &rule.body {
                match literal {
                    Literal::Positive(atom) => {
                        let dep = graph.node(&atom.predicate);
                        graph.add_edge(head, dep, Polarity::Positive);
                    }
                    Literal::Negative(atom) => {
                        let dep = graph.node(&atom.predicate);
                        graph.add_edge(head, dep, Polarity::Negative);
                    }
                    // Builtins are computed, not derived
                    Literal::Builtin(_) => {}
                }
            }
        }
        graph
    }

    fn node(&mut self, predicate: &Predicate) -> NodeId {
        if let Some(&id) = self.index.get(predicate) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(predicate.clone());
        self.index.insert(predicate.clone(), id);
        self.edges.push(Vec::new());
        id
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId, polarity: Polarity) {
        if !self.edges[from].contains(&(to, polarity)) {
            self.edges[from].push((to, polarity));
        }
    }

    /// Strongly connected components, each emitted after every component it
    /// depends on
    fn components(&self) -> Vec<Vec<NodeId>> {
        Tarjan::new(self).run()
    }

    /// Shortest path from `from` to `to` that stays inside `component`
    fn path_within(
        &self,
        from: NodeId,
        to: NodeId,
        component: &[NodeId],
        component_of: &[usize],
    ) -> Vec<NodeId> {
        let target_component = component_of[to];
        let mut previous: HashMap<NodeId, NodeId> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        while let Some(node) = queue.pop_front() {
            if node == to {
                break;
            }
            for &(next, _) in &self.edges[node] {
                if component_of[next] == target_component
                    && next != from
                    && !previous.contains_key(&next)
                {
                    previous.insert(next, node);
                    queue.push_back(next);
                }
            }
        }
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            match previous.get(&current) {
                Some(&prev) => {
                    path.push(prev);
                    current = prev;
                }
                // Unreachable for nodes of one component
                None => return component.to_vec(),
            }
        }
        path.reverse();
        path
    }
}

/// Tarjan's SCC algorithm over a [`DependencyGraph`]
struct Tarjan<'a> {
    graph: &'a DependencyGraph,
    next_index: usize,
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<NodeId>,
    components: Vec<Vec<NodeId>>,
}

impl<'a> Tarjan<'a> {
    fn new(graph: &'a DependencyGraph) -> Self {
        let n = graph.nodes.len();
        Tarjan {
            graph,
            next_index: 0,
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            components: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Vec<NodeId>> {
        for node in 0..self.graph.nodes.len() {
            if self.index[node].is_none() {
                self.connect(node);
            }
        }
        self.components
    }

    fn visit(&mut self, node: NodeId) {
        self.index[node] = Some(self.next_index);
        self.lowlink[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;
    }

    /// Depth-first search from `root` with an explicit work stack of
    /// `(node, next edge to follow)`, so long dependency chains cannot
    /// exhaust the call stack
    fn connect(&mut self, root: NodeId) {
        let graph = self.graph;
        self.visit(root);
        let mut work: Vec<(NodeId, usize)> = vec![(root, 0)];

        while let Some((node, edge)) = work.pop() {
            if let Some(&(next, _)) = graph.edges[node].get(edge) {
                work.push((node, edge + 1));
                match self.index[next] {
                    None => {
                        self.visit(next);
                        work.push((next, 0));
                    }
                    Some(index) if self.on_stack[next] => {
                        self.lowlink[node] = self.lowlink[node].min(index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            // Every edge of `node` is done
            if let Some(&(parent, _)) = work.last() {
                self.lowlink[parent] = self.lowlink[parent].min(self.lowlink[node]);
            }
            if Some(self.lowlink[node]) == self.index[node] {
                let mut component = Vec::new();
                while let Some(member) = self.stack.pop() {
                    self.on_stack[member] = false;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                component.sort_unstable();
                self.components.push(component);
            }
        }
    }
}

/// Stratify a program
pub fn stratify(rules: &[Rule]) -> Result<Stratification, StratificationError> {
    if rules.is_empty() {
        return Ok(Stratification {
            predicate_strata: HashMap::new(),
            rules_by_stratum: vec![],
            num_strata: 0,
        });
    }

    let graph = DependencyGraph::from_rules(rules);
    let components = graph.components();

    let mut component_of = vec![0; graph.nodes.len()];
    for (c, component) in components.iter().enumerate() {
        for &node in component {
            component_of[node] = c;
        }
    }

    // A negative edge inside one component closes a cycle through negation
    for (c, component) in components.iter().enumerate() {
        for &node in component {
            for &(next, polarity) in &graph.edges[node] {
                if polarity == Polarity::Negative && component_of[next] == c {
                    let path = graph.path_within(next, node, component, &component_of);
                    let mut cycle = vec![graph.nodes[node].clone()];
                    cycle.extend(
                        path.into_iter()
                            .filter(|&n| n != node)
                            .map(|n| graph.nodes[n].clone()),
                    );
                    return Err(StratificationError::NonStratifiable { cycle });
                }
            }
        }
    }

    // Components come out dependencies-first
    let mut component_strata = vec![0usize; components.len()];
    for (c, component) in components.iter().enumerate() {
        let mut stratum = 0;
        for &node in component {
            for &(next, polarity) in &graph.edges[node] {
                let dep = component_of[next];
                if dep == c {
                    continue;
                }
                let required = match polarity {
                    Polarity::Positive => component_strata[dep],
                    Polarity::Negative => component_strata[dep] + 1,
                };
                stratum = stratum.max(required);
            }
        }
        component_strata[c] = stratum;
    }

    let predicate_strata: HashMap<Predicate, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(node, predicate)| (predicate.clone(), component_strata[component_of[node]]))
        .collect();

    let num_strata = predicate_strata.values().max().copied().unwrap_or(0) + 1;
    let mut rules_by_stratum: Vec<Stratum> = vec![Vec::new(); num_strata];
    for rule in rules {
        let stratum = predicate_strata
            .get(&rule.head.predicate)
            .copied()
            .unwrap_or(0);
        rules_by_stratum[stratum].push(rule.clone());
    }

    debug!(
        strata = num_strata,
        predicates = predicate_strata.len(),
        "stratified program"
    );

    Ok(Stratification {
        predicate_strata,
        rules_by_stratum,
        num_strata,
    })
}
