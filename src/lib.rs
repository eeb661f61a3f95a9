//! # Falcata
//!
//! A fast in-memory approximate string matching index for Rust.
//!
//! ## Features
//!
//! - Minimized word graph (DAWG) construction from sorted frequency lists
//! - Compact array encoding with O(word length) word/rank conversion
//! - Bounded fuzzy lookup with restricted-transposition edit distance
//! - Parallel per-branch search with a deterministic result set
//! - Compact variable-length integer serialization

pub mod codec;
pub mod dictionary;
pub mod error;
pub mod graph;
pub mod lookup;
pub mod util;

pub mod prelude {
    //! Convenient re-exports of the main types.

    pub use crate::codec::{read_graph, write_graph};
    pub use crate::dictionary::WordList;
    pub use crate::error::{FalcataError, Result};
    pub use crate::graph::{CompactGraph, EdgeRef, GraphBuilder};
    pub use crate::lookup::{LookupConfig, LookupEngine, LookupResult, LookupResults};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
