//! Failure outcomes of a search or a single step

use thiserror::Error;

/// Why a search or step did not produce a result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// The frontier ran empty before the goal was reached.
    #[error("no path found after expanding {expanded_nodes} nodes")]
    NotFound { expanded_nodes: usize },

    /// The cancellation token fired while the search was in progress.
    #[error("search canceled")]
    Canceled,

    /// The graph reported an edge cost that is negative or not a number.
    #[error("invalid edge cost {cost}: edge costs must be non-negative numbers")]
    InvalidEdgeCost { cost: f64 },

    /// The worker pool stopped answering, either because it was shut down or
    /// because a worker thread panicked.
    #[error("worker pool disconnected")]
    PoolDisconnected,

    /// A worker thread could not be started.
    #[error("failed to spawn worker thread: {reason}")]
    WorkerSpawn { reason: String },
}

impl SearchError {
    /// Number of nodes expanded before the search gave up, for not-found outcomes
    pub fn expanded_nodes(&self) -> Option<usize> {
        match self {
            SearchError::NotFound { expanded_nodes } => Some(*expanded_nodes),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SearchError::NotFound { .. })
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, SearchError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_nodes_only_for_not_found() {
        assert_eq!(
            SearchError::NotFound { expanded_nodes: 7 }.expanded_nodes(),
            Some(7)
        );
        assert_eq!(SearchError::Canceled.expanded_nodes(), None);
        assert!(SearchError::Canceled.is_canceled());
        assert!(!SearchError::Canceled.is_not_found());
    }

    #[test]
    fn test_error_messages() {
        let err = SearchError::NotFound { expanded_nodes: 3 };
        assert_eq!(err.to_string(), "no path found after expanding 3 nodes");

        let err = SearchError::InvalidEdgeCost { cost: -1.0 };
        assert!(err.to_string().contains("-1"));
    }
}
