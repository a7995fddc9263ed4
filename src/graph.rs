//! Collaborator contracts consumed by the search engine
//!
//! The engine never looks inside a node. Everything it knows about the
//! problem comes through these traits: which nodes are adjacent to a node and
//! at what cost, and how far a node is estimated to be from the goal.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for node types the engine can search over
///
/// Nodes are cloned into worker tasks, so they must be `Send`. Any type that
/// satisfies the bounds gets this trait for free.
pub trait Node: Clone + Eq + Hash + Debug + Send + 'static {}

impl<T> Node for T where T: Clone + Eq + Hash + Debug + Send + 'static {}

/// A node reachable in one move, with the cost of that move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<N> {
    /// The adjacent node
    pub node: N,
    /// Edge cost, must be a non-negative number
    pub cost: f64,
}

impl<N> Neighbor<N> {
    pub fn new(node: N, cost: f64) -> Self {
        Self { node, cost }
    }
}

/// Trait for graphs supplied by the caller
///
/// `neighbors` may be called more than once for the same node and must
/// return the same answer each time.
pub trait Graph<N> {
    /// Enumerate the nodes adjacent to `node` together with their edge costs
    fn neighbors(&self, node: &N) -> Vec<Neighbor<N>>;
}

impl<N, F> Graph<N> for F
where
    F: Fn(&N) -> Vec<Neighbor<N>>,
{
    fn neighbors(&self, node: &N) -> Vec<Neighbor<N>> {
        self(node)
    }
}

/// Trait for heuristic distance estimates
///
/// Heuristics run on worker threads, hence `Send + Sync`. For the returned
/// cost to be optimal the estimate must never exceed the true remaining cost;
/// this is not checked.
pub trait Heuristic<N>: Send + Sync {
    /// Estimated cost of the cheapest path from `node` to `goal`
    fn estimate(&self, node: &N, goal: &N) -> f64;
}

impl<N, F> Heuristic<N> for F
where
    F: Fn(&N, &N) -> f64 + Send + Sync,
{
    fn estimate(&self, node: &N, goal: &N) -> f64 {
        self(node, goal)
    }
}

/// Heuristic that always estimates zero, turning A* into Dijkstra
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl<N> Heuristic<N> for ZeroHeuristic {
    fn estimate(&self, _node: &N, _goal: &N) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(node: &u32) -> Vec<Neighbor<u32>> {
        let mut out = vec![Neighbor::new(node + 1, 1.0)];
        if *node > 0 {
            out.push(Neighbor::new(node - 1, 1.0));
        }
        out
    }

    #[test]
    fn test_closure_graph() {
        let graph = line;
        let neighbors = graph.neighbors(&0u32);
        assert_eq!(neighbors, vec![Neighbor::new(1, 1.0)]);
        assert_eq!(graph.neighbors(&3u32).len(), 2);
    }

    #[test]
    fn test_closure_heuristic() {
        let h = |a: &i32, b: &i32| f64::from((a - b).abs());
        assert_eq!(h.estimate(&2, &7), 5.0);
        assert_eq!(Heuristic::<i32>::estimate(&ZeroHeuristic, &2, &7), 0.0);
    }
}
