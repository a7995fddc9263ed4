//! Fixed pool of stateless evaluator threads.
//!
//! Workers read one [`ExpandTask`], compute the tentative g- and f-score for
//! that neighbor, and hand back a [`RelaxProposal`]. They never touch search
//! state. A worker exits when the run is cancelled or when the pool drops
//! its end of the channels.

use crate::graph::{Heuristic, Node};
use crate::search::error::SearchError;
use crate::search::parallel::channel::{
    CancelToken, ExpandTask, OrchestratorChannels, RelaxProposal, WorkerChannels, create_channels,
};
use crossbeam_channel::select;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// Compute the proposal for one task.
pub fn evaluate_task<N, H>(heuristic: &H, task: ExpandTask<N>) -> RelaxProposal<N>
where
    H: Heuristic<N> + ?Sized,
{
    let g_score = task.from_g_score + task.edge_cost;
    let f_score = g_score + heuristic.estimate(&task.to, &task.goal);
    RelaxProposal {
        from: task.from,
        to: task.to,
        g_score,
        f_score,
    }
}

/// Handle to a running set of worker threads.
///
/// Dropping the pool shuts it down and joins every worker.
pub struct WorkerPool<N: Node> {
    channels: Option<OrchestratorChannels<N>>,
    handles: Vec<JoinHandle<()>>,
    cancel: CancelToken,
    num_workers: usize,
}

impl<N: Node> WorkerPool<N> {
    /// Start `num_workers` threads evaluating tasks with `heuristic`.
    pub fn spawn<H>(
        num_workers: usize,
        heuristic: Arc<H>,
        cancel: &CancelToken,
    ) -> Result<Self, SearchError>
    where
        H: Heuristic<N> + 'static,
    {
        let num_workers = num_workers.max(1);
        let (orchestrator, worker_channels) = create_channels(num_workers, cancel);

        let mut pool = Self {
            channels: Some(orchestrator),
            handles: Vec::with_capacity(num_workers),
            cancel: cancel.clone(),
            num_workers,
        };

        for (worker_id, channels) in worker_channels.into_iter().enumerate() {
            let heuristic = Arc::clone(&heuristic);
            let handle = thread::Builder::new()
                .name(format!("astar-worker-{worker_id}"))
                .spawn(move || run_worker(worker_id, heuristic.as_ref(), channels))
                .map_err(|err| SearchError::WorkerSpawn {
                    reason: err.to_string(),
                })?;
            pool.handles.push(handle);
        }

        debug!(num_workers, "worker pool started");
        Ok(pool)
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Whether the run this pool serves has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the pool still has live channels to its workers.
    pub fn is_running(&self) -> bool {
        self.channels.is_some()
    }

    /// Whether a worker died while evaluating a task.
    pub fn is_broken(&self) -> bool {
        self.channels
            .as_ref()
            .is_some_and(|channels| channels.failed.is_cancelled())
    }

    /// Hand every task to the workers and feed each proposal to `apply` as it
    /// arrives.
    ///
    /// Returns once exactly one proposal per task has been applied. Dispatch
    /// and collection are interleaved, so a node may have more neighbors than
    /// there are workers. The arrival order of proposals is unspecified.
    ///
    /// A worker that panics leaves its proposal unanswered; the call then
    /// fails with [`SearchError::PoolDisconnected`] instead of waiting for it.
    pub fn evaluate<F>(&self, tasks: Vec<ExpandTask<N>>, mut apply: F) -> Result<usize, SearchError>
    where
        F: FnMut(RelaxProposal<N>),
    {
        let channels = self.channels.as_ref().ok_or(SearchError::PoolDisconnected)?;
        let expected = tasks.len();
        let mut pending = tasks.into_iter();
        let mut next = pending.next();
        let mut received = 0;

        while received < expected {
            if self.cancel.is_cancelled() {
                return Err(SearchError::Canceled);
            }
            if channels.failed.is_cancelled() {
                return Err(SearchError::PoolDisconnected);
            }
            match next.take() {
                Some(task) => select! {
                    send(channels.tasks, task.clone()) -> res => {
                        res.map_err(|_| SearchError::PoolDisconnected)?;
                        next = pending.next();
                    }
                    recv(channels.proposals) -> msg => {
                        next = Some(task);
                        apply(msg.map_err(|_| SearchError::PoolDisconnected)?);
                        received += 1;
                    }
                    recv(self.cancel.signal()) -> _ => return Err(SearchError::Canceled),
                    recv(channels.failed.signal()) -> _ => return Err(SearchError::PoolDisconnected),
                },
                None => select! {
                    recv(channels.proposals) -> msg => {
                        apply(msg.map_err(|_| SearchError::PoolDisconnected)?);
                        received += 1;
                    }
                    recv(self.cancel.signal()) -> _ => return Err(SearchError::Canceled),
                    recv(channels.failed.signal()) -> _ => return Err(SearchError::PoolDisconnected),
                },
            }
        }

        Ok(received)
    }

    /// Stop all workers and wait for them to exit. Idempotent.
    pub fn shutdown(&mut self) {
        // Disconnecting both channels wakes every worker, busy or idle.
        if self.channels.take().is_none() && self.handles.is_empty() {
            return;
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        debug!(num_workers = self.num_workers, "worker pool stopped");
    }
}

impl<N: Node> Drop for WorkerPool<N> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Fires the pool's `failed` token if the worker unwinds.
struct PanicGuard<'a> {
    worker_id: usize,
    failed: &'a CancelToken,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            warn!(worker_id = self.worker_id, "worker panicked");
            self.failed.cancel();
        }
    }
}

fn run_worker<N, H>(worker_id: usize, heuristic: &H, channels: WorkerChannels<N>)
where
    N: Node,
    H: Heuristic<N> + ?Sized,
{
    let _guard = PanicGuard {
        worker_id,
        failed: &channels.failed,
    };
    let mut evaluated = 0u64;
    loop {
        if channels.cancel.is_cancelled() {
            break;
        }
        let task = select! {
            recv(channels.tasks) -> msg => match msg {
                Ok(task) => task,
                Err(_) => break,
            },
            recv(channels.cancel.signal()) -> _ => break,
        };

        let proposal = evaluate_task(heuristic, task);
        trace!(worker_id, to = ?proposal.to, g = proposal.g_score, f = proposal.f_score, "proposal");
        evaluated += 1;

        select! {
            send(channels.proposals, proposal) -> res => {
                if res.is_err() {
                    break;
                }
            }
            recv(channels.cancel.signal()) -> _ => break,
        }
    }
    trace!(worker_id, evaluated, "worker exiting");
}
