//! Messages and signals shared between the orchestrator and the workers.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Request from the orchestrator to evaluate one neighbor.
#[derive(Debug, Clone)]
pub struct ExpandTask<N> {
    /// Node being expanded.
    pub from: N,
    /// Neighbor to evaluate.
    pub to: N,
    /// Edge cost from `from` to `to`.
    pub edge_cost: f64,
    /// Current g-score of `from`.
    pub from_g_score: f64,
    /// Search goal, passed to the heuristic.
    pub goal: N,
}

/// A worker's suggested update for one neighbor.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxProposal<N> {
    pub from: N,
    pub to: N,
    /// Tentative cost of reaching `to` through `from`.
    pub g_score: f64,
    /// Tentative g-score plus heuristic estimate from `to` to the goal.
    pub f_score: f64,
}

/// Channel endpoints held by each worker.
pub struct WorkerChannels<N> {
    /// Receive tasks from the orchestrator.
    pub tasks: Receiver<ExpandTask<N>>,
    /// Send proposals back to the orchestrator.
    pub proposals: Sender<RelaxProposal<N>>,
    /// Run-level cancellation.
    pub cancel: CancelToken,
    /// Pool-private token a worker fires when it dies mid-task.
    pub failed: CancelToken,
}

/// Channel endpoints held by the orchestrator.
pub struct OrchestratorChannels<N> {
    pub tasks: Sender<ExpandTask<N>>,
    pub proposals: Receiver<RelaxProposal<N>>,
    /// Fired by any worker that panics.
    pub failed: CancelToken,
}

/// Create the rendezvous channels for a pool of `num_workers` workers.
///
/// Both directions are zero-capacity: a send completes only when the other
/// side receives. Every endpoint also shares a fresh `failed` token; firing
/// it leaves the caller's `cancel` untouched.
pub fn create_channels<N>(
    num_workers: usize,
    cancel: &CancelToken,
) -> (OrchestratorChannels<N>, Vec<WorkerChannels<N>>) {
    let (task_tx, task_rx) = bounded(0);
    let (proposal_tx, proposal_rx) = bounded(0);
    let failed = CancelToken::new();

    let workers = (0..num_workers)
        .map(|_| WorkerChannels {
            tasks: task_rx.clone(),
            proposals: proposal_tx.clone(),
            cancel: cancel.clone(),
            failed: failed.clone(),
        })
        .collect();

    let orchestrator = OrchestratorChannels {
        tasks: task_tx,
        proposals: proposal_rx,
        failed,
    };

    (orchestrator, workers)
}

#[derive(Debug)]
struct CancelInner {
    cancelled: AtomicBool,
    // Dropped on cancel, which disconnects `signal` for every clone.
    trigger: Mutex<Option<Sender<()>>>,
}

/// Cooperative cancellation signal, cheap to clone and share across threads.
///
/// Besides the flag check, [`CancelToken::signal`] exposes a receiver that
/// becomes ready (disconnected) the moment the token is cancelled, so a
/// thread blocked in `select!` wakes up instead of waiting forever.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
    signal: Receiver<()>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = bounded(0);
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
            }),
            signal,
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Receiver that never yields a message and disconnects on cancel.
    pub fn signal(&self) -> &Receiver<()> {
        &self.signal
    }
}
