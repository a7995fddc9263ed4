//! Search result types and statistics

use std::fmt::Debug;
use std::time::Duration;

/// Result of a run-to-completion search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<N> {
    /// Nodes from start to goal inclusive; empty when no path was found
    pub path: Vec<N>,
    /// Sum of edge costs along `path`
    pub total_cost: f64,
    /// Number of nodes closed during the run
    pub expanded_nodes: usize,
    /// Whether the goal was reached
    pub found: bool,
    /// Statistics from the run
    pub statistics: SearchStatistics,
}

impl<N> SearchResult<N> {
    /// Create a result for a run that reached the goal
    pub fn found(path: Vec<N>, total_cost: f64, statistics: SearchStatistics) -> Self {
        Self {
            path,
            total_cost,
            expanded_nodes: statistics.expanded_nodes,
            found: true,
            statistics,
        }
    }

    /// Create a result for a run whose frontier ran empty
    pub fn not_found(expanded_nodes: usize) -> Self {
        Self {
            path: Vec::new(),
            total_cost: 0.0,
            expanded_nodes,
            found: false,
            statistics: SearchStatistics {
                expanded_nodes,
                ..Default::default()
            },
        }
    }

    /// Number of edges on the path
    pub fn path_len(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Statistics from a search run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStatistics {
    /// Number of worker threads in the pool
    pub workers: usize,
    /// Number of nodes closed
    pub expanded_nodes: usize,
    /// Number of proposals received from workers
    pub proposals_evaluated: usize,
    /// Number of proposals that improved a g-score
    pub relaxations: usize,
    /// Frontier pops discarded because the node was already closed
    pub stale_pops: usize,
    /// Wall-clock time of the run
    pub elapsed_time: Duration,
}

impl SearchStatistics {
    /// Get expanded nodes per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.expanded_nodes as f64 / secs
        }
    }

    /// Get the share of proposals that improved a g-score (0.0 to 1.0)
    pub fn relaxation_rate(&self) -> f64 {
        if self.proposals_evaluated == 0 {
            0.0
        } else {
            self.relaxations as f64 / self.proposals_evaluated as f64
        }
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Workers: {}\n", self.workers));
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!("Expanded nodes: {}\n", self.expanded_nodes));
        s.push_str(&format!("Throughput: {:.0} nodes/sec\n", self.throughput()));
        s.push_str(&format!(
            "Proposals evaluated: {}\n",
            self.proposals_evaluated
        ));
        if self.proposals_evaluated > 0 {
            s.push_str(&format!(
                "Relaxation rate: {:.2}%\n",
                self.relaxation_rate() * 100.0
            ));
        }
        if self.stale_pops > 0 {
            s.push_str(&format!("Stale pops: {}\n", self.stale_pops));
        }
        s
    }
}

impl<N: Debug> std::fmt::Display for SearchResult<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.found {
            writeln!(f, "Path found!")?;
            writeln!(f, "Total cost: {}", self.total_cost)?;
            writeln!(f, "Path ({} nodes):", self.path.len())?;
            for node in &self.path {
                writeln!(f, "  {:?}", node)?;
            }
        } else {
            writeln!(f, "No path found.")?;
        }
        writeln!(f, "Expanded nodes: {}", self.expanded_nodes)
    }
}
