//! Incremental A* driven one expansion per call
//!
//! A [`Stepper`] keeps the search state and a worker pool alive between
//! calls. Each [`Stepper::step`] performs one orchestrator iteration and
//! returns a [`StepSnapshot`] of the state afterwards, which is what a
//! visualizer or debugger needs to replay the search.
//!
//! Once the stepper reaches a terminal state every further call returns the
//! same terminal snapshot without touching the state, so callers may keep
//! polling safely.

use crate::graph::{Graph, Heuristic, Node};
use crate::search::config::SearchConfig;
use crate::search::error::SearchError;
use crate::search::parallel::coordinator::{Expansion, expand_next};
use crate::search::parallel::pool::WorkerPool;
use crate::search::state::SearchState;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Lifecycle of a stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperState {
    /// More expansions are possible
    Running,
    /// The goal was popped; terminal
    GoalFound,
    /// The frontier ran empty; terminal
    Exhausted,
    /// Cancellation was observed; every further step fails
    Canceled,
    /// A step failed for another reason; every further step fails
    Failed,
}

impl StepperState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StepperState::Running)
    }
}

/// Observable state after one step.
///
/// `open` and `closed` are sets: their iteration order carries no meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSnapshot<N: Node> {
    /// Node expanded by this step; `None` when the step found the frontier empty
    pub current: Option<N>,
    /// Nodes currently in the frontier
    pub open: HashSet<N>,
    /// Nodes whose cost is final
    pub closed: HashSet<N>,
    /// Predecessor of every reached node on its best known path
    pub came_from: HashMap<N, N>,
    pub done: bool,
    pub found: bool,
    /// Start-to-goal path; empty unless `found`
    pub path: Vec<N>,
    /// Number of expansions performed so far
    pub step_index: usize,
}

/// Step-at-a-time A* search over a graph `G`
pub struct Stepper<N: Node, G> {
    graph: G,
    goal: N,
    state: SearchState<N>,
    pool: WorkerPool<N>,
    status: StepperState,
    step_index: usize,
    terminal: Option<StepSnapshot<N>>,
    failure: Option<SearchError>,
}

impl<N, G> Stepper<N, G>
where
    N: Node,
    G: Graph<N>,
{
    /// Seed the search at `start` and start the worker pool.
    pub fn new<H>(
        graph: G,
        start: N,
        goal: N,
        heuristic: H,
        config: &SearchConfig,
    ) -> Result<Self, SearchError>
    where
        H: Heuristic<N> + 'static,
    {
        let heuristic = Arc::new(heuristic);
        let state = SearchState::new(start.clone(), heuristic.estimate(&start, &goal));
        let pool = WorkerPool::spawn(config.num_workers, heuristic, &config.cancel)?;
        debug!(start = ?start, goal = ?goal, workers = pool.num_workers(), "stepper created");

        Ok(Self {
            graph,
            goal,
            state,
            pool,
            status: StepperState::Running,
            step_index: 0,
            terminal: None,
            failure: None,
        })
    }

    /// Advance by one expansion and report the resulting state.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Canceled`] once cancellation has been observed,
    /// on this call and every later one. Other failures (such as an invalid
    /// edge cost) are likewise sticky.
    pub fn step(&mut self) -> Result<StepSnapshot<N>, SearchError> {
        match self.status {
            StepperState::Running => {}
            StepperState::GoalFound | StepperState::Exhausted => {
                if let Some(snapshot) = &self.terminal {
                    return Ok(snapshot.clone());
                }
            }
            StepperState::Canceled => return Err(SearchError::Canceled),
            StepperState::Failed => {
                return Err(self
                    .failure
                    .clone()
                    .unwrap_or(SearchError::PoolDisconnected));
            }
        }

        match expand_next(&mut self.state, &self.graph, &self.goal, &self.pool) {
            Ok(Expansion::Expanded { node, .. }) => {
                self.step_index += 1;
                Ok(self.snapshot(Some(node), Vec::new()))
            }
            Ok(Expansion::Goal { node, cost }) => {
                self.step_index += 1;
                self.status = StepperState::GoalFound;
                let path = self.state.path_to(&node);
                info!(cost, steps = self.step_index, "stepper reached goal");
                Ok(self.finish(Some(node), path))
            }
            Ok(Expansion::Exhausted) => {
                self.status = StepperState::Exhausted;
                info!(steps = self.step_index, "stepper exhausted frontier");
                Ok(self.finish(None, Vec::new()))
            }
            Err(err) => {
                self.status = if err.is_canceled() {
                    StepperState::Canceled
                } else {
                    StepperState::Failed
                };
                self.failure = Some(err.clone());
                self.pool.shutdown();
                Err(err)
            }
        }
    }

    /// Step until a terminal state and return the final snapshot.
    pub fn run_to_completion(&mut self) -> Result<StepSnapshot<N>, SearchError> {
        loop {
            let snapshot = self.step()?;
            if snapshot.done {
                return Ok(snapshot);
            }
        }
    }

    pub fn state(&self) -> StepperState {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Read-only view of the underlying search state
    pub fn search_state(&self) -> &SearchState<N> {
        &self.state
    }

    /// Stop the worker pool and release the stepper.
    ///
    /// Dropping the stepper has the same effect.
    pub fn close(mut self) {
        self.pool.shutdown();
        debug!(steps = self.step_index, "stepper closed");
    }

    fn finish(&mut self, current: Option<N>, path: Vec<N>) -> StepSnapshot<N> {
        let snapshot = self.snapshot(current, path);
        self.terminal = Some(snapshot.clone());
        // no more expansions will be requested
        self.pool.shutdown();
        snapshot
    }

    fn snapshot(&self, current: Option<N>, path: Vec<N>) -> StepSnapshot<N> {
        let done = self.status.is_terminal();
        StepSnapshot {
            current,
            open: self.state.frontier().nodes().cloned().collect(),
            closed: self.state.closed().clone(),
            came_from: self.state.came_from().clone(),
            done,
            found: self.status == StepperState::GoalFound,
            path,
            step_index: self.step_index,
        }
    }
}
