//! The immutable compressed word graph.
//!
//! The graph is a set of parallel arrays in CSR form: `first_child_edge`
//! holds per-node offsets into the edge arrays, and each edge carries a
//! label, a target node, and a terminal flag ("a word ends on this edge").
//! A per-node reachable word count makes word/rank conversion O(word
//! length) without storing any strings, and a rank-indexed table holds the
//! stored frequency of every word.
//!
//! Terminality is a tagged representation in memory ([`EdgeRef`]); the
//! historical signed-integer wire form exists only at the serialization
//! boundary ([`CompactGraph::from_signed_parts`] and the codec).
//!
//! Once constructed the graph is immutable: it is built once, published, and
//! read by any number of concurrent queries.

use std::ops::Range;

use bit_vec::BitVec;

use crate::error::{FalcataError, Result};

/// A labeled edge of the compact graph, with terminality decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef {
    /// Character on the edge.
    pub label: char,
    /// Target node index.
    pub target: u32,
    /// Whether a dictionary word ends on this edge.
    pub is_terminal: bool,
}

/// Immutable array-form word graph produced by the builder or the codec.
#[derive(Debug, Clone)]
pub struct CompactGraph {
    /// Index of the root node.
    root: u32,
    /// CSR offsets: edges of node `n` occupy `first_child_edge[n] ..
    /// first_child_edge[n + 1]`.
    first_child_edge: Vec<u32>,
    /// Target node of each edge.
    edge_target: Vec<u32>,
    /// Terminal flag of each edge.
    edge_terminal: BitVec,
    /// Label of each edge, index-aligned with `edge_target`.
    edge_char: Vec<char>,
    /// Per-node count of words completing at or below the node's edges.
    reachable_terminals: Vec<u16>,
    /// Stored frequency of the word at each rank.
    word_count_table: Vec<u64>,
    /// Per-edge layout weight; construction artifact, may be empty.
    edge_weight: Vec<f32>,
}

impl CompactGraph {
    /// Construct a graph from its raw arrays, validating internal
    /// consistency.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        root: u32,
        first_child_edge: Vec<u32>,
        edge_target: Vec<u32>,
        edge_terminal: BitVec,
        edge_char: Vec<char>,
        reachable_terminals: Vec<u16>,
        word_count_table: Vec<u64>,
        edge_weight: Vec<f32>,
    ) -> Result<Self> {
        let node_count = reachable_terminals.len();

        if first_child_edge.len() != node_count + 1 {
            return Err(FalcataError::invalid_graph(format!(
                "offset array has {} entries for {node_count} nodes",
                first_child_edge.len()
            )));
        }
        if first_child_edge[0] != 0 {
            return Err(FalcataError::invalid_graph(
                "offset array does not start at zero",
            ));
        }
        if first_child_edge.windows(2).any(|w| w[0] > w[1]) {
            return Err(FalcataError::invalid_graph(
                "offset array is not monotonically non-decreasing",
            ));
        }

        let edge_count = first_child_edge[node_count] as usize;
        if edge_target.len() != edge_count
            || edge_char.len() != edge_count
            || edge_terminal.len() != edge_count
        {
            return Err(FalcataError::invalid_graph(format!(
                "edge arrays disagree: {edge_count} offsets, {} targets, {} labels, {} flags",
                edge_target.len(),
                edge_char.len(),
                edge_terminal.len()
            )));
        }
        if !edge_weight.is_empty() && edge_weight.len() != edge_count {
            return Err(FalcataError::invalid_graph(format!(
                "edge weight array has {} entries for {edge_count} edges",
                edge_weight.len()
            )));
        }
        if root as usize >= node_count {
            return Err(FalcataError::invalid_graph(format!(
                "root {root} out of bounds for {node_count} nodes"
            )));
        }

        for node in 0..node_count {
            let lo = first_child_edge[node] as usize;
            let hi = first_child_edge[node + 1] as usize;
            let mut below = 0u32;
            for e in lo..hi {
                let target = edge_target[e] as usize;
                if target >= node_count {
                    return Err(FalcataError::invalid_graph(format!(
                        "edge {e} targets node {target}, graph has {node_count}"
                    )));
                }
                if target <= node {
                    return Err(FalcataError::invalid_graph(format!(
                        "edge {e} targets node {target} at or before its source {node}: \
                         not a topological ordering"
                    )));
                }
                below += u32::from(edge_terminal.get(e).unwrap_or(false))
                    + reachable_terminals[target] as u32;
            }
            if below != reachable_terminals[node] as u32 {
                return Err(FalcataError::invalid_graph(format!(
                    "node {node} claims {} reachable words but its edges sum to {below}",
                    reachable_terminals[node]
                )));
            }
        }

        let word_count = reachable_terminals[root as usize] as usize;
        if word_count_table.len() != word_count {
            return Err(FalcataError::invalid_graph(format!(
                "word count table has {} entries, graph holds {word_count} words",
                word_count_table.len()
            )));
        }

        Ok(CompactGraph {
            root,
            first_child_edge,
            edge_target,
            edge_terminal,
            edge_char,
            reachable_terminals,
            word_count_table,
            edge_weight,
        })
    }

    /// Construct a graph from the signed wire arrays.
    ///
    /// On the wire every target id is shifted up by one and negated when the
    /// edge is terminal, so terminality of node zero stays representable.
    pub fn from_signed_parts(
        root: u32,
        first_child_edge: Vec<u32>,
        edge_target: Vec<i32>,
        edge_char: Vec<char>,
        reachable_terminals: Vec<u16>,
        word_count_table: Vec<u64>,
    ) -> Result<Self> {
        let mut targets = Vec::with_capacity(edge_target.len());
        let mut terminal = BitVec::from_elem(edge_target.len(), false);
        for (e, &signed) in edge_target.iter().enumerate() {
            let magnitude = signed.unsigned_abs();
            if magnitude == 0 {
                return Err(FalcataError::invalid_graph(format!(
                    "edge {e} has zero target magnitude in signed form"
                )));
            }
            targets.push(magnitude - 1);
            if signed < 0 {
                terminal.set(e, true);
            }
        }
        Self::from_parts(
            root,
            first_child_edge,
            targets,
            terminal,
            edge_char,
            reachable_terminals,
            word_count_table,
            Vec::new(),
        )
    }

    /// Index of the root node.
    pub fn root(&self) -> u32 {
        self.root
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.reachable_terminals.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edge_target.len()
    }

    /// Number of words in the dictionary.
    pub fn word_count(&self) -> usize {
        self.word_count_table.len()
    }

    /// CSR offset array.
    pub fn first_child_edges(&self) -> &[u32] {
        &self.first_child_edge
    }

    /// Per-node reachable word counts.
    pub fn reachable_terminal_counts(&self) -> &[u16] {
        &self.reachable_terminals
    }

    /// Rank-indexed word frequencies.
    pub fn word_counts(&self) -> &[u64] {
        &self.word_count_table
    }

    /// Per-edge layout weights; empty for deserialized graphs.
    pub fn edge_weights(&self) -> &[f32] {
        &self.edge_weight
    }

    fn edge_range(&self, node: u32) -> Range<usize> {
        let n = node as usize;
        if n + 1 >= self.first_child_edge.len() {
            return 0..0;
        }
        self.first_child_edge[n] as usize..self.first_child_edge[n + 1] as usize
    }

    fn edge_at(&self, e: usize) -> EdgeRef {
        EdgeRef {
            label: self.edge_char[e],
            target: self.edge_target[e],
            is_terminal: self.edge_terminal.get(e).unwrap_or(false),
        }
    }

    /// Outgoing edges of a node, in emission (scan) order.
    pub fn edges(&self, node: u32) -> impl Iterator<Item = EdgeRef> + '_ {
        self.edge_range(node).map(|e| self.edge_at(e))
    }

    /// All edges in index order.
    pub fn edge_refs(&self) -> impl Iterator<Item = EdgeRef> + '_ {
        (0..self.edge_count()).map(|e| self.edge_at(e))
    }

    /// Number of words whose paths continue through or end on an edge.
    pub fn words_through(&self, edge: EdgeRef) -> u32 {
        u32::from(edge.is_terminal) + self.reachable_terminals[edge.target as usize] as u32
    }

    /// Rank of a word in the dictionary, or `None` if absent.
    ///
    /// Descends from the root matching one character per edge. Edges skipped
    /// during the scan contribute their whole reachable word count to the
    /// running rank; terminal edges passed through contribute one.
    pub fn word_index(&self, word: &str) -> Option<u32> {
        let mut chars = word.chars();
        let mut current = chars.next()?;
        let mut node = self.root;
        let mut rank = 0u32;

        loop {
            let next = chars.next();
            let mut matched = None;
            for edge in self.edges(node) {
                if edge.label == current {
                    matched = Some(edge);
                    break;
                }
                rank += self.words_through(edge);
            }
            let edge = matched?;
            match next {
                None => return edge.is_terminal.then_some(rank),
                Some(c) => {
                    if edge.is_terminal {
                        rank += 1;
                    }
                    node = edge.target;
                    current = c;
                }
            }
        }
    }

    /// The word at a rank; inverse of [`word_index`](Self::word_index).
    ///
    /// Walks from the root choosing the first edge whose reachable word
    /// count covers the remaining budget, spending one on every terminal
    /// edge taken.
    pub fn word_at(&self, index: u32) -> Result<String> {
        if index as usize >= self.word_count() {
            return Err(FalcataError::index_out_of_range(format!(
                "rank {index} is outside the dictionary of {} words",
                self.word_count()
            )));
        }

        let mut remaining = index;
        let mut node = self.root;
        let mut word = String::new();

        loop {
            let mut advanced = false;
            for edge in self.edges(node) {
                let via = self.words_through(edge);
                if remaining < via {
                    word.push(edge.label);
                    if edge.is_terminal {
                        if remaining == 0 {
                            return Ok(word);
                        }
                        remaining -= 1;
                    }
                    node = edge.target;
                    advanced = true;
                    break;
                }
                remaining -= via;
            }
            if !advanced {
                return Err(FalcataError::internal(
                    "rank walk exhausted the graph before spending its budget",
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two words, "ab" (count table rank 0) and "b" (rank 1):
    ///
    /// ```text
    /// 0 --a--> 1 --b*--> 2
    /// 0 --b*-> 2
    /// ```
    fn two_word_graph() -> CompactGraph {
        CompactGraph::from_parts(
            0,
            vec![0, 2, 3, 3],
            vec![1, 2, 2],
            BitVec::from_fn(3, |e| e != 0),
            vec!['a', 'b', 'b'],
            vec![2, 1, 0],
            vec![10, 20],
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_word_index_and_word_at() {
        let graph = two_word_graph();
        assert_eq!(graph.word_index("ab"), Some(0));
        assert_eq!(graph.word_index("b"), Some(1));
        assert_eq!(graph.word_index("a"), None); // path exists, not terminal
        assert_eq!(graph.word_index("ba"), None);
        assert_eq!(graph.word_index(""), None);

        assert_eq!(graph.word_at(0).unwrap(), "ab");
        assert_eq!(graph.word_at(1).unwrap(), "b");
        assert!(matches!(
            graph.word_at(2),
            Err(FalcataError::IndexOutOfRange(_))
        ));
    }

    #[test]
    fn test_from_signed_parts() {
        // Same graph in wire form: ids shifted by one, negative = terminal.
        let graph = CompactGraph::from_signed_parts(
            0,
            vec![0, 2, 3, 3],
            vec![2, -3, -3],
            vec!['a', 'b', 'b'],
            vec![2, 1, 0],
            vec![10, 20],
        )
        .unwrap();
        assert_eq!(graph.word_index("ab"), Some(0));
        assert_eq!(graph.word_index("b"), Some(1));
    }

    #[test]
    fn test_zero_magnitude_rejected() {
        let result = CompactGraph::from_signed_parts(
            0,
            vec![0, 1, 1],
            vec![0],
            vec!['a'],
            vec![0, 0],
            vec![],
        );
        assert!(matches!(result, Err(FalcataError::InvalidGraphData(_))));
    }

    #[test]
    fn test_validation_rejects_bad_arrays() {
        // Offset array length mismatch.
        assert!(
            CompactGraph::from_parts(
                0,
                vec![0, 1],
                vec![1],
                BitVec::from_elem(1, true),
                vec!['a'],
                vec![1, 0, 0],
                vec![5],
                Vec::new(),
            )
            .is_err()
        );

        // Dangling target.
        assert!(
            CompactGraph::from_parts(
                0,
                vec![0, 1, 1],
                vec![7],
                BitVec::from_elem(1, true),
                vec!['a'],
                vec![1, 0],
                vec![5],
                Vec::new(),
            )
            .is_err()
        );

        // Self-loop breaks the topological ordering requirement.
        assert!(
            CompactGraph::from_parts(
                0,
                vec![0, 1, 1],
                vec![0],
                BitVec::from_elem(1, true),
                vec!['a'],
                vec![1, 0],
                vec![5],
                Vec::new(),
            )
            .is_err()
        );

        // Inconsistent reachable counts.
        assert!(
            CompactGraph::from_parts(
                0,
                vec![0, 1, 1],
                vec![1],
                BitVec::from_elem(1, true),
                vec!['a'],
                vec![2, 0],
                vec![5, 6],
                Vec::new(),
            )
            .is_err()
        );

        // Word count table shorter than the graph's word count.
        assert!(
            CompactGraph::from_parts(
                0,
                vec![0, 1, 1],
                vec![1],
                BitVec::from_elem(1, true),
                vec!['a'],
                vec![1, 0],
                vec![],
                Vec::new(),
            )
            .is_err()
        );
    }
}
