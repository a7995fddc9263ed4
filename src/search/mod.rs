//! A* search engine
//!
//! Two entry points share one iteration rule:
//! - [`search`]: run to completion and return a [`SearchResult`]
//! - [`Stepper`]: advance one expansion per call and observe a
//!   [`StepSnapshot`] after each
//!
//! Both own their [`SearchState`] on the calling thread and hand per-neighbor
//! cost evaluation to a [`WorkerPool`].

pub mod config;
pub mod error;
pub mod frontier;
pub mod parallel;
pub mod result;
pub mod state;
pub mod stepper;

pub use config::SearchConfig;
pub use error::SearchError;
pub use frontier::{Frontier, FrontierItem};
pub use parallel::{CancelToken, Expansion, WorkerPool, search};
pub use result::{SearchResult, SearchStatistics};
pub use state::{Relaxation, SearchState};
pub use stepper::{StepSnapshot, Stepper, StepperState};
