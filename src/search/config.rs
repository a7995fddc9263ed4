//! Configuration for a search run or stepper

use crate::search::parallel::channel::CancelToken;

/// Configuration shared by [`search`](crate::search::search) and
/// [`Stepper`](crate::search::Stepper).
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of worker threads evaluating neighbors.
    pub num_workers: usize,
    /// Cancellation signal observed by the orchestrator and the workers.
    pub cancel: CancelToken,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            cancel: CancelToken::new(),
        }
    }
}

impl SearchConfig {
    /// Set the number of workers; zero is clamped to one.
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    /// Set the number of workers from an Option, keeping the default on None.
    pub fn with_workers_option(self, num_workers: Option<usize>) -> Self {
        match num_workers {
            Some(n) => self.with_workers(n),
            None => self,
        }
    }

    /// Use `cancel` as the cancellation signal for the run.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert!(config.num_workers >= 1);
        assert!(!config.cancel.is_cancelled());
    }

    #[test]
    fn test_config_builder() {
        let cancel = CancelToken::new();
        let config = SearchConfig::default()
            .with_workers(4)
            .with_cancel(cancel.clone());

        assert_eq!(config.num_workers, 4);
        cancel.cancel();
        assert!(config.cancel.is_cancelled());
    }

    #[test]
    fn test_minimum_workers() {
        let config = SearchConfig::default().with_workers(0);
        assert_eq!(config.num_workers, 1);
    }

    #[test]
    fn test_workers_option() {
        let default_workers = SearchConfig::default().num_workers;
        assert_eq!(
            SearchConfig::default().with_workers_option(None).num_workers,
            default_workers
        );
        assert_eq!(
            SearchConfig::default().with_workers_option(Some(3)).num_workers,
            3
        );
    }
}
