//! Priority frontier (open set) for A* search
//!
//! A binary min-heap keyed by f-score with a side index from node to heap
//! slot. Each item also records its own slot, so an improved item can be
//! restored to heap order in O(log n) without searching for it. At most one
//! live item exists per node.

use crate::graph::Node;
use std::collections::HashMap;

/// A node waiting in the frontier
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierItem<N> {
    /// The node itself
    pub node: N,
    /// Best known cost from the start
    pub g_score: f64,
    /// g-score plus heuristic estimate to the goal
    pub f_score: f64,
    position: usize,
}

impl<N> FrontierItem<N> {
    /// Slot of this item in the heap at the time it was read
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Min-ordered frontier with decrease-key
#[derive(Debug, Clone)]
pub struct Frontier<N: Node> {
    heap: Vec<FrontierItem<N>>,
    index: HashMap<N, usize>,
}

impl<N: Node> Default for Frontier<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Node> Frontier<N> {
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Look up the live item for `node`, if any
    pub fn get(&self, node: &N) -> Option<&FrontierItem<N>> {
        self.index.get(node).map(|&pos| &self.heap[pos])
    }

    /// Item with the smallest f-score, without removing it
    pub fn peek_min(&self) -> Option<&FrontierItem<N>> {
        self.heap.first()
    }

    /// Nodes currently in the frontier, in heap order (not sorted)
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.heap.iter().map(|item| &item.node)
    }

    /// Insert a node that is not yet in the frontier.
    ///
    /// Returns false and leaves the frontier untouched if the node already
    /// has a live item; use [`Frontier::improve`] for that case.
    pub fn push(&mut self, node: N, g_score: f64, f_score: f64) -> bool {
        if self.index.contains_key(&node) {
            return false;
        }
        let position = self.heap.len();
        self.index.insert(node.clone(), position);
        self.heap.push(FrontierItem {
            node,
            g_score,
            f_score,
            position,
        });
        self.sift_up(position);
        true
    }

    /// Remove and return the item with the smallest f-score
    pub fn pop_min(&mut self) -> Option<FrontierItem<N>> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let item = self.heap.pop()?;
        self.index.remove(&item.node);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(item)
    }

    /// Tighten the scores of a live item in place.
    ///
    /// Only applies when `f_score` is strictly smaller than the stored one.
    /// Returns whether the item changed.
    pub fn improve(&mut self, node: &N, g_score: f64, f_score: f64) -> bool {
        let Some(&position) = self.index.get(node) else {
            return false;
        };
        let item = &mut self.heap[position];
        if f_score >= item.f_score {
            return false;
        }
        item.g_score = g_score;
        item.f_score = f_score;
        self.fix(position);
        true
    }

    /// Re-establish heap order around the item at `position` after its
    /// score changed.
    pub fn fix(&mut self, position: usize) {
        if position >= self.heap.len() {
            return;
        }
        let settled = self.sift_up(position);
        self.sift_down(settled);
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.heap[a].position = a;
        self.heap[b].position = b;
        if let Some(slot) = self.index.get_mut(&self.heap[a].node) {
            *slot = a;
        }
        if let Some(slot) = self.index.get_mut(&self.heap[b].node) {
            *slot = b;
        }
    }

    fn sift_up(&mut self, mut idx: usize) -> usize {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.heap[idx].f_score < self.heap[parent].f_score {
                self.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
        idx
    }

    fn sift_down(&mut self, mut idx: usize) {
        let n = self.heap.len();
        loop {
            let left = idx * 2 + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let mut best = left;
            if right < n && self.heap[right].f_score < self.heap[left].f_score {
                best = right;
            }
            if self.heap[best].f_score < self.heap[idx].f_score {
                self.swap(idx, best);
                idx = best;
            } else {
                break;
            }
        }
    }
}
