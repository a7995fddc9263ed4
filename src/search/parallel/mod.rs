//! Worker-pool execution for neighbor evaluation.
//!
//! # Architecture
//!
//! The parallel search system consists of:
//! - A **coordinator** that owns the frontier and search state and runs the
//!   A* loop on a single thread
//! - A fixed set of **workers** that turn expansion tasks into relaxation
//!   proposals without touching any shared state
//! - A **channel system**: one rendezvous channel for tasks, one for
//!   proposals, and a cancellation token every blocking point listens to
//!
//! # Example
//!
//! ```ignore
//! use astar_pool::search::{SearchConfig, search};
//!
//! let config = SearchConfig::default().with_workers(4);
//! let result = search(&graph, start, goal, heuristic, &config)?;
//! ```

pub mod channel;
pub mod coordinator;
pub mod pool;

pub use channel::{CancelToken, ExpandTask, RelaxProposal};
pub use coordinator::{Expansion, search};
pub use pool::WorkerPool;
