//! Generic A* search with a channel-based worker pool.
//!
//! The engine runs in one of two modes:
//!
//! - [`search`]: run to completion and get a [`SearchResult`].
//! - [`Stepper`]: advance one expansion at a time and inspect a
//!   [`StepSnapshot`] after each, for visualizers and debuggers.
//!
//! A single orchestrating thread owns the frontier and all search state;
//! a fixed pool of worker threads evaluates the tentative cost of each
//! neighbor and sends back proposals over channels.
//!
//! The caller supplies the problem through [`Graph`] and [`Heuristic`]. The
//! heuristic must be admissible (and consistent) for the returned cost to be
//! optimal; this is not checked.

pub mod graph;
pub mod grid;
pub mod search;

pub use graph::{Graph, Heuristic, Neighbor, Node, ZeroHeuristic};
pub use search::{
    CancelToken, SearchConfig, SearchError, SearchResult, SearchStatistics, StepSnapshot, Stepper,
    StepperState, search,
};
