//! Configuration for batch graph construction.

/// Controls how a [`BuildSession`](crate::driver::BuildSession) processes a
/// batch of methods.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Abort the batch on the first failed method (default: true).
    ///
    /// When disabled, failed methods are logged, reported and skipped.
    pub strict: bool,

    /// Build graphs for different methods on worker threads (default: true).
    pub parallel: bool,

    /// Smallest batch that is worth distributing across threads (default: 8).
    pub min_parallel_methods: usize,

    /// Keep a DOT rendering of every built graph (default: false).
    pub record_dot: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            strict: true,
            parallel: true,
            min_parallel_methods: 8,
            record_dot: false,
        }
    }
}

impl BuildConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that skips failing methods instead of aborting.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    /// Sets whether a failing method aborts the batch.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets whether methods are processed in parallel.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the smallest batch processed in parallel.
    #[must_use]
    pub fn with_min_parallel_methods(mut self, count: usize) -> Self {
        self.min_parallel_methods = count;
        self
    }

    /// Sets whether DOT renderings are kept.
    #[must_use]
    pub fn with_dot(mut self, record: bool) -> Self {
        self.record_dot = record;
        self
    }

    /// Returns `true` if a batch of `methods` methods should run in parallel.
    #[must_use]
    pub fn runs_parallel(&self, methods: usize) -> bool {
        self.parallel && methods >= self.min_parallel_methods.max(2)
    }
}
