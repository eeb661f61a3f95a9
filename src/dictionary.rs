//! Word/frequency list front end for graph construction.
//!
//! The graph builder wants strictly increasing input; this module provides
//! the common path from an unsorted word/count source (or a frequency file
//! on disk) to a finished [`CompactGraph`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;

use crate::error::Result;
use crate::graph::{CompactGraph, GraphBuilder};

/// An accumulating word/frequency list.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: AHashMap<String, u64>,
}

impl WordList {
    /// Create an empty word list.
    pub fn new() -> Self {
        WordList {
            words: AHashMap::new(),
        }
    }

    /// Add a word, accumulating counts across duplicate insertions.
    pub fn add(&mut self, word: &str, count: u64) {
        *self.words.entry(word.to_string()).or_insert(0) += count;
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when no words have been added.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Build a word list from word/count pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut list = WordList::new();
        for (word, count) in pairs {
            *list.words.entry(word.into()).or_insert(0) += count;
        }
        list
    }

    /// Load a frequency file with one "word count" entry per line.
    /// Blank and malformed lines are skipped.
    pub fn load_from_frequency_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut list = WordList::new();

        for line in reader.lines() {
            let line = line?;
            let mut parts = line.split_whitespace();
            if let (Some(word), Some(count)) = (parts.next(), parts.next())
                && let Ok(count) = count.parse::<u64>()
            {
                list.add(word, count);
            }
        }

        Ok(list)
    }

    /// Sort the words and build the compact graph.
    pub fn into_graph(self) -> Result<CompactGraph> {
        let mut entries: Vec<(String, u64)> = self.words.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut builder = GraphBuilder::new();
        for (word, count) in &entries {
            builder.insert(word, *count)?;
        }
        builder.finish()
    }
}
