//! Orchestrator: owns the search state and drives the worker pool.

use crate::graph::{Graph, Heuristic, Node};
use crate::search::config::SearchConfig;
use crate::search::error::SearchError;
use crate::search::parallel::channel::ExpandTask;
use crate::search::parallel::pool::WorkerPool;
use crate::search::result::{SearchResult, SearchStatistics};
use crate::search::state::SearchState;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Outcome of one orchestrator iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum Expansion<N> {
    /// The frontier is empty.
    Exhausted,
    /// The goal was popped; `cost` is its final g-score.
    Goal { node: N, cost: f64 },
    /// A non-goal node was closed and its neighbors relaxed.
    Expanded { node: N, neighbors: usize },
}

/// Run one iteration: pop, close, goal-check, fan out, relax.
///
/// Shared by [`search`] and the stepper so both follow exactly the same rules.
pub(crate) fn expand_next<N, G>(
    state: &mut SearchState<N>,
    graph: &G,
    goal: &N,
    pool: &WorkerPool<N>,
) -> Result<Expansion<N>, SearchError>
where
    N: Node,
    G: Graph<N> + ?Sized,
{
    if pool.is_cancelled() {
        return Err(SearchError::Canceled);
    }

    let Some(item) = state.pop_next() else {
        return Ok(Expansion::Exhausted);
    };
    let node = item.node;
    let g_score = state.g_score(&node).unwrap_or(item.g_score);

    if node == *goal {
        return Ok(Expansion::Goal {
            node,
            cost: g_score,
        });
    }

    let neighbors = graph.neighbors(&node);
    if let Some(bad) = neighbors.iter().find(|n| !(n.cost >= 0.0)) {
        warn!(from = ?node, to = ?bad.node, cost = bad.cost, "rejecting edge cost");
        return Err(SearchError::InvalidEdgeCost { cost: bad.cost });
    }

    let count = neighbors.len();
    let tasks: Vec<ExpandTask<N>> = neighbors
        .into_iter()
        .map(|neighbor| ExpandTask {
            from: node.clone(),
            to: neighbor.node,
            edge_cost: neighbor.cost,
            from_g_score: g_score,
            goal: goal.clone(),
        })
        .collect();

    let mut improved = 0usize;
    pool.evaluate(tasks, |proposal| {
        let outcome = state.relax(proposal);
        trace!(?outcome, "relaxation");
        if outcome.improved() {
            improved += 1;
        }
    })?;

    debug!(
        node = ?node,
        g = g_score,
        neighbors = count,
        improved,
        frontier = state.frontier().len(),
        "expanded"
    );
    Ok(Expansion::Expanded {
        node,
        neighbors: count,
    })
}

/// Collect run statistics from a state.
pub(crate) fn statistics<N: Node>(
    state: &SearchState<N>,
    workers: usize,
    elapsed_time: Duration,
) -> SearchStatistics {
    SearchStatistics {
        workers,
        expanded_nodes: state.expanded_nodes(),
        proposals_evaluated: state.proposals(),
        relaxations: state.relaxations(),
        stale_pops: state.stale_pops(),
        elapsed_time,
    }
}

/// Run A* from `start` to `goal` until it finishes.
///
/// Spawns a worker pool of `config.num_workers` threads for the duration of
/// the call and shuts it down before returning.
///
/// # Errors
///
/// - [`SearchError::NotFound`] when the goal is unreachable.
/// - [`SearchError::Canceled`] when `config.cancel` fires first.
/// - [`SearchError::InvalidEdgeCost`] when the graph reports a negative or
///   NaN edge cost.
pub fn search<N, G, H>(
    graph: &G,
    start: N,
    goal: N,
    heuristic: H,
    config: &SearchConfig,
) -> Result<SearchResult<N>, SearchError>
where
    N: Node,
    G: Graph<N> + ?Sized,
    H: Heuristic<N> + 'static,
{
    let start_time = Instant::now();
    let heuristic = Arc::new(heuristic);
    let mut state = SearchState::new(start.clone(), heuristic.estimate(&start, &goal));
    let mut pool = WorkerPool::spawn(config.num_workers, heuristic, &config.cancel)?;

    let outcome = loop {
        match expand_next(&mut state, graph, &goal, &pool) {
            Ok(Expansion::Expanded { .. }) => continue,
            Ok(Expansion::Goal { node, cost }) => {
                let path = state.path_to(&node);
                let stats = statistics(&state, pool.num_workers(), start_time.elapsed());
                break Ok(SearchResult::found(path, cost, stats));
            }
            Ok(Expansion::Exhausted) => {
                break Err(SearchError::NotFound {
                    expanded_nodes: state.expanded_nodes(),
                });
            }
            Err(err) => break Err(err),
        }
    };
    pool.shutdown();

    match &outcome {
        Ok(result) => info!(
            cost = result.total_cost,
            expanded = result.expanded_nodes,
            path_len = result.path.len(),
            "goal reached"
        ),
        Err(err) => info!(%err, "search ended without a path"),
    }
    outcome
}
