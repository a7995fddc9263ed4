//! Mutable search state and the relaxation rule
//!
//! Owned by exactly one thread of control for the whole run: the
//! orchestrator or the stepper. Workers never see it.

use crate::graph::Node;
use crate::search::frontier::{Frontier, FrontierItem};
use crate::search::parallel::channel::RelaxProposal;
use std::collections::{HashMap, HashSet};

/// What applying a proposal did to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relaxation {
    /// Target already finalized; proposal discarded
    Closed,
    /// Target already has an equal or cheaper g-score
    NotImproved,
    /// Target was not in the frontier and has been pushed
    Inserted,
    /// Target was in the frontier and its score was tightened in place
    Tightened,
    /// g-score and predecessor improved but the frontier item kept its
    /// f-score (only possible with an inconsistent heuristic)
    Recorded,
}

impl Relaxation {
    pub fn improved(self) -> bool {
        matches!(
            self,
            Relaxation::Inserted | Relaxation::Tightened | Relaxation::Recorded
        )
    }
}

/// Frontier, g-scores, predecessor links and the closed set of one run
#[derive(Debug, Clone)]
pub struct SearchState<N: Node> {
    start: N,
    frontier: Frontier<N>,
    g_score: HashMap<N, f64>,
    came_from: HashMap<N, N>,
    closed: HashSet<N>,
    expanded_nodes: usize,
    stale_pops: usize,
    proposals: usize,
    relaxations: usize,
}

impl<N: Node> SearchState<N> {
    /// Seed a fresh state with the start node at g-score 0
    pub fn new(start: N, start_f_score: f64) -> Self {
        let mut frontier = Frontier::new();
        frontier.push(start.clone(), 0.0, start_f_score);
        let mut g_score = HashMap::new();
        g_score.insert(start.clone(), 0.0);
        Self {
            start,
            frontier,
            g_score,
            came_from: HashMap::new(),
            closed: HashSet::new(),
            expanded_nodes: 0,
            stale_pops: 0,
            proposals: 0,
            relaxations: 0,
        }
    }

    /// Pop the cheapest open node and close it.
    ///
    /// Entries for nodes that are already closed are dropped and the pop is
    /// retried; they do not count as expansions. Returns `None` once the
    /// frontier is exhausted.
    pub fn pop_next(&mut self) -> Option<FrontierItem<N>> {
        while let Some(item) = self.frontier.pop_min() {
            if self.closed.contains(&item.node) {
                self.stale_pops += 1;
                continue;
            }
            self.closed.insert(item.node.clone());
            self.expanded_nodes += 1;
            return Some(item);
        }
        None
    }

    /// Apply one worker proposal with the improve-if-better rule
    pub fn relax(&mut self, proposal: RelaxProposal<N>) -> Relaxation {
        self.proposals += 1;
        if self.closed.contains(&proposal.to) {
            return Relaxation::Closed;
        }
        if let Some(&known) = self.g_score.get(&proposal.to)
            && proposal.g_score >= known
        {
            return Relaxation::NotImproved;
        }

        self.relaxations += 1;
        self.g_score.insert(proposal.to.clone(), proposal.g_score);
        self.came_from.insert(proposal.to.clone(), proposal.from);

        if !self.frontier.contains(&proposal.to) {
            self.frontier
                .push(proposal.to, proposal.g_score, proposal.f_score);
            Relaxation::Inserted
        } else if self
            .frontier
            .improve(&proposal.to, proposal.g_score, proposal.f_score)
        {
            Relaxation::Tightened
        } else {
            Relaxation::Recorded
        }
    }

    /// Path from the start node to `target` by following predecessor links.
    ///
    /// Returns just `[target]` when `target` is the start, and an empty path
    /// if the predecessor chain does not lead back to the start.
    pub fn path_to(&self, target: &N) -> Vec<N> {
        let mut path = vec![target.clone()];
        let mut current = target;
        while *current != self.start {
            match self.came_from.get(current) {
                // a chain longer than the map itself means a cycle
                Some(previous) if path.len() <= self.came_from.len() => {
                    path.push(previous.clone());
                    current = previous;
                }
                _ => return Vec::new(),
            }
        }
        path.reverse();
        path
    }

    pub fn frontier(&self) -> &Frontier<N> {
        &self.frontier
    }

    pub fn closed(&self) -> &HashSet<N> {
        &self.closed
    }

    pub fn came_from(&self) -> &HashMap<N, N> {
        &self.came_from
    }

    pub fn is_closed(&self, node: &N) -> bool {
        self.closed.contains(node)
    }

    /// Best known cost from the start; `None` means not reached yet
    pub fn g_score(&self, node: &N) -> Option<f64> {
        self.g_score.get(node).copied()
    }

    pub fn expanded_nodes(&self) -> usize {
        self.expanded_nodes
    }

    pub fn stale_pops(&self) -> usize {
        self.stale_pops
    }

    /// Number of proposals applied, improving or not
    pub fn proposals(&self) -> usize {
        self.proposals
    }

    pub fn relaxations(&self) -> usize {
        self.relaxations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(from: char, to: char, g_score: f64, f_score: f64) -> RelaxProposal<char> {
        RelaxProposal {
            from,
            to,
            g_score,
            f_score,
        }
    }

    #[test]
    fn test_new_seeds_start() {
        let state = SearchState::new('s', 4.0);
        assert_eq!(state.g_score(&'s'), Some(0.0));
        assert_eq!(state.frontier().len(), 1);
        assert_eq!(state.frontier().peek_min().unwrap().f_score, 4.0);
        assert!(state.closed().is_empty());
    }

    #[test]
    fn test_relax_inserts_then_tightens() {
        let mut state = SearchState::new('s', 0.0);
        state.pop_next();

        assert_eq!(state.relax(proposal('s', 'a', 5.0, 6.0)), Relaxation::Inserted);
        assert_eq!(state.relax(proposal('s', 'a', 7.0, 8.0)), Relaxation::NotImproved);
        assert_eq!(state.relax(proposal('b', 'a', 3.0, 4.0)), Relaxation::Tightened);

        assert_eq!(state.g_score(&'a'), Some(3.0));
        assert_eq!(state.came_from().get(&'a'), Some(&'b'));
        assert_eq!(state.frontier().get(&'a').unwrap().f_score, 4.0);
        assert_eq!(state.relaxations(), 2);
        assert_eq!(state.proposals(), 3);
    }

    #[test]
    fn test_relax_discards_closed_target() {
        let mut state = SearchState::new('s', 0.0);
        state.pop_next();
        assert_eq!(state.relax(proposal('a', 's', 0.0, 0.0)), Relaxation::Closed);
        assert!(state.came_from().is_empty());
    }

    #[test]
    fn test_relaxation_improved() {
        assert!(Relaxation::Inserted.improved());
        assert!(Relaxation::Tightened.improved());
        assert!(Relaxation::Recorded.improved());
        assert!(!Relaxation::Closed.improved());
        assert!(!Relaxation::NotImproved.improved());
    }

    #[test]
    fn test_pop_next_closes_and_counts() {
        let mut state = SearchState::new('s', 0.0);
        let item = state.pop_next().unwrap();
        assert_eq!(item.node, 's');
        assert!(state.is_closed(&'s'));
        assert_eq!(state.expanded_nodes(), 1);
        assert!(state.pop_next().is_none());
        assert_eq!(state.expanded_nodes(), 1);
    }

    #[test]
    fn test_path_to_follows_predecessors() {
        let mut state = SearchState::new('s', 0.0);
        state.pop_next();
        state.relax(proposal('s', 'a', 1.0, 1.0));
        state.pop_next();
        state.relax(proposal('a', 'g', 2.0, 2.0));

        assert_eq!(state.path_to(&'g'), vec!['s', 'a', 'g']);
        assert_eq!(state.path_to(&'s'), vec!['s']);
        assert!(state.path_to(&'z').is_empty());
    }
}
