//! Declarative provider ordering.
//!
//! Each provider names the providers it must run after. The constraints are
//! resolved once into a linear order; providers not related by a constraint
//! keep their declaration order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::providers::errors::OrderingError;

/// One row of the ordering table.
#[derive(Debug, Clone, Copy)]
pub struct Declaration<'a> {
    pub name: &'a str,
    pub after: &'a [&'a str],
}

/// Resolve declarations into a linear order of declaration indices.
pub fn linearize(decls: &[Declaration<'_>]) -> Result<Vec<usize>, OrderingError> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let mut by_name: HashMap<&str, NodeIndex> = HashMap::new();

    for (index, decl) in decls.iter().enumerate() {
        let node = graph.add_node(index);
        if by_name.insert(decl.name, node).is_some() {
            return Err(OrderingError::DuplicateProvider(decl.name.to_string()));
        }
    }

    for (index, decl) in decls.iter().enumerate() {
        for predecessor in decl.after {
            let Some(&from) = by_name.get(predecessor) else {
                return Err(OrderingError::UnknownPredecessor {
                    provider: decl.name.to_string(),
                    predecessor: predecessor.to_string(),
                });
            };
            graph.add_edge(from, NodeIndex::new(index), ());
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        return Err(OrderingError::Cycle {
            provider: decls[graph[cycle.node_id()]].name.to_string(),
        });
    }

    // Kahn's algorithm, always releasing the earliest declared ready node.
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| {
            graph
                .neighbors_directed(n, petgraph::Direction::Incoming)
                .count()
        })
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(decls.len());
    while let Some(Reverse(index)) = ready.pop() {
        order.push(index);
        for next in graph.neighbors(NodeIndex::new(index)) {
            let next = next.index();
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    Ok(order)
}
