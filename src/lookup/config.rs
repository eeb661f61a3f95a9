//! Configuration for the lookup engine.

use serde::{Deserialize, Serialize};

/// Configuration for [`LookupEngine`](super::engine::LookupEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Thread pool size for per-branch fuzzy search tasks.
    /// If None, uses the number of CPU cores.
    pub thread_pool_size: Option<usize>,

    /// Starting capacity of each branch result bin, used until query
    /// history provides a better estimate.
    pub initial_bin_capacity: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            thread_pool_size: None,
            initial_bin_capacity: 16,
        }
    }
}
