use render::FrontendConfig;

/// Construction parameters for [`crate::initialize`].
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Worker thread count for the job scheduler. `None` defaults to
    /// hardware concurrency.
    pub worker_count: Option<usize>,
    pub frontend: FrontendConfig,
}
