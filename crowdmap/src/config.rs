/// Options for the apply path
///
/// # Examples
///
/// ```
/// use crowdmap::{BitmapBatch, Config};
///
/// let config = Config::default().with_run_optimize(true).with_pool_capacity(8);
/// let batch = BitmapBatch::with_config(config);
/// assert!(batch.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Run-length optimize each bitmap before it is encoded for storage
    pub run_optimize: bool,
    /// How many released accumulator bitmaps are kept for reuse
    pub pool_capacity: usize,
}

impl Config {
    pub const DEFAULT_POOL_CAPACITY: usize = 64;

    pub fn with_run_optimize(mut self, run_optimize: bool) -> Self {
        self.run_optimize = run_optimize;
        self
    }

    pub fn with_pool_capacity(mut self, pool_capacity: usize) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            run_optimize: false,
            pool_capacity: Self::DEFAULT_POOL_CAPACITY,
        }
    }
}
