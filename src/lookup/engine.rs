//! The lookup engine: exact rank conversion and parallel fuzzy search.
//!
//! Fuzzy search is a depth-first walk of the compact graph synchronized
//! with a banded edit-distance matrix. The root's child subtrees are
//! independent, so the engine launches one task per root edge on its thread
//! pool; each task owns a private band, path buffer and result bin, and the
//! shared graph and query are read-only, so the fan-out needs no locks. The
//! implicit join of the parallel iterator makes `lookup` a blocking call
//! with no cross-query state.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{FalcataError, Result};
use crate::graph::{CompactGraph, EdgeRef};
use crate::lookup::band::EditBand;
use crate::lookup::config::LookupConfig;
use crate::lookup::results::{LookupResult, LookupResults};

/// Query engine over a finished [`CompactGraph`].
///
/// The engine holds the graph for as long as it exists; the graph is
/// immutable and shared read-only across all in-flight queries.
pub struct LookupEngine {
    graph: Arc<CompactGraph>,
    config: LookupConfig,
    thread_pool: Arc<ThreadPool>,
    /// Largest branch bin produced so far, sizing future bins.
    bin_high_water: AtomicUsize,
}

impl LookupEngine {
    /// Create an engine with the default configuration.
    pub fn new(graph: CompactGraph) -> Result<Self> {
        Self::with_config(graph, LookupConfig::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(graph: CompactGraph, config: LookupConfig) -> Result<Self> {
        let threads = config.thread_pool_size.unwrap_or_else(num_cpus::get);
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("falcata-lookup-{i}"))
            .build()
            .map_err(|e| FalcataError::internal(format!("failed to create thread pool: {e}")))?;

        Ok(LookupEngine {
            graph: Arc::new(graph),
            config,
            thread_pool: Arc::new(thread_pool),
            bin_high_water: AtomicUsize::new(0),
        })
    }

    /// The graph this engine answers queries over.
    pub fn graph(&self) -> &CompactGraph {
        &self.graph
    }

    /// Rank of a word, or `None` if it is not in the dictionary.
    pub fn get_index(&self, word: &str) -> Option<u32> {
        self.graph.word_index(word)
    }

    /// The word at a rank; `IndexOutOfRange` beyond the dictionary.
    pub fn get_word(&self, index: u32) -> Result<String> {
        self.graph.word_at(index)
    }

    /// Every dictionary word within `max_edits` restricted-transposition
    /// edits of `word`, with its stored count. Unordered; each entry appears
    /// at most once. `max_edits == 0` is a pure exact-match fast path.
    pub fn lookup(&self, word: &str, max_edits: u32) -> LookupResults {
        if max_edits == 0 {
            return match self.graph.word_index(word) {
                Some(rank) => LookupResults::single(LookupResult {
                    term: word.to_string(),
                    count: self.graph.word_counts()[rank as usize],
                }),
                None => LookupResults::empty(),
            };
        }

        let query: Vec<char> = word.chars().collect();

        // Each root edge starts an independent branch; its rank base is the
        // word count of everything scanned before it.
        let mut branches = Vec::new();
        let mut base = 0u32;
        for edge in self.graph.edges(self.graph.root()) {
            branches.push((edge, base));
            base += self.graph.words_through(edge);
        }
        if branches.is_empty() {
            return LookupResults::empty();
        }

        let bin_capacity = self
            .bin_high_water
            .load(Ordering::Relaxed)
            .max(self.config.initial_bin_capacity);
        let graph = &*self.graph;
        let query = &query;

        let bins: Vec<Vec<LookupResult>> = self.thread_pool.install(|| {
            branches
                .par_iter()
                .map(|&(edge, rank_base)| {
                    let mut walker = BranchWalker::new(graph, query, max_edits, bin_capacity);
                    walker.run(edge, rank_base);
                    walker.bin
                })
                .collect()
        });

        let results = LookupResults::from_bins(bins);
        self.bin_high_water
            .fetch_max(results.largest_bin(), Ordering::Relaxed);
        results
    }
}

/// One root-branch traversal: private band, path buffer and result bin.
struct BranchWalker<'a> {
    graph: &'a CompactGraph,
    query: &'a [char],
    max_depth: usize,
    band: EditBand,
    path: Vec<char>,
    bin: Vec<LookupResult>,
}

impl<'a> BranchWalker<'a> {
    fn new(graph: &'a CompactGraph, query: &'a [char], max_edits: u32, bin_capacity: usize) -> Self {
        BranchWalker {
            graph,
            query,
            max_depth: query.len().saturating_add(max_edits as usize),
            band: EditBand::new(query.len(), max_edits),
            path: Vec::new(),
            bin: Vec::with_capacity(bin_capacity),
        }
    }

    fn run(&mut self, edge: EdgeRef, rank_base: u32) {
        if !self.band.advance(1, edge.label, None, self.query) {
            return;
        }
        self.path.push(edge.label);
        if edge.is_terminal && self.band.accepts(1) {
            self.emit(rank_base);
        }
        self.descend(edge.target, 1, rank_base + u32::from(edge.is_terminal));
    }

    fn descend(&mut self, node: u32, depth: usize, rank_base: u32) {
        if depth >= self.max_depth {
            // Further insertions could not keep the total within budget.
            return;
        }
        let graph = self.graph;
        let prev = self.path.last().copied();
        let mut skipped = 0u32;
        for edge in graph.edges(node) {
            if self.band.advance(depth + 1, edge.label, prev, self.query) {
                self.path.push(edge.label);
                let rank = rank_base + skipped;
                if edge.is_terminal && self.band.accepts(depth + 1) {
                    self.emit(rank);
                }
                self.descend(edge.target, depth + 1, rank + u32::from(edge.is_terminal));
                self.path.pop();
            }
            skipped += graph.words_through(edge);
        }
    }

    fn emit(&mut self, rank: u32) {
        self.bin.push(LookupResult {
            term: self.path.iter().collect(),
            count: self.graph.word_counts()[rank as usize],
        });
    }
}
