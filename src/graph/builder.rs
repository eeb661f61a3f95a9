//! Incremental DAWG construction.
//!
//! Words arrive in strictly increasing byte-lexicographic order. The builder
//! keeps the path of the previous word on a stack; when the next word
//! diverges, every entry below the shared prefix is minimized against a
//! registry of structurally unique nodes, folding identical suffixes into a
//! single subgraph. `finish` renumbers the minimized graph topologically and
//! emits the compact array form, with each node's edges ordered by
//! descending subtree weight so frequent branches are scanned first.

use std::cmp::Ordering;
use std::collections::VecDeque;

use ahash::AHashMap;
use bit_vec::BitVec;

use crate::error::{FalcataError, Result};
use crate::graph::compact::CompactGraph;
use crate::graph::node::{BuildEdge, NodeArena, NodeId, NodeKey};

/// One entry of the previous-word path stack.
#[derive(Debug, Clone, Copy)]
struct PathEntry {
    parent: NodeId,
    child: NodeId,
}

/// Builds a minimized word graph from a sorted word/frequency stream.
///
/// # Examples
///
/// ```
/// use falcata::graph::GraphBuilder;
///
/// let mut builder = GraphBuilder::new();
/// builder.insert("cat", 10).unwrap();
/// builder.insert("hat", 7).unwrap();
/// let graph = builder.finish().unwrap();
/// assert_eq!(graph.word_count(), 2);
/// ```
#[derive(Debug)]
pub struct GraphBuilder {
    arena: NodeArena,
    root: NodeId,
    registry: AHashMap<NodeKey, NodeId>,
    stack: Vec<PathEntry>,
    prev_chars: Vec<char>,
    prev_word: String,
    counts: Vec<u64>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        let mut arena = NodeArena::new();
        let root = arena.alloc();
        GraphBuilder {
            arena,
            root,
            registry: AHashMap::new(),
            stack: Vec::new(),
            prev_chars: Vec::new(),
            prev_word: String::new(),
            counts: Vec::new(),
        }
    }

    /// Number of words inserted so far.
    pub fn word_count(&self) -> usize {
        self.counts.len()
    }

    /// Insert the next word with its frequency count.
    ///
    /// Words must be presented in strictly increasing byte-lexicographic
    /// order; anything else is rejected with `OrderingViolation` before any
    /// state changes.
    pub fn insert(&mut self, word: &str, count: u64) -> Result<()> {
        if word.is_empty() {
            return Err(FalcataError::invalid_argument(
                "the empty word has no representation in the graph",
            ));
        }
        if !self.counts.is_empty() && word <= self.prev_word.as_str() {
            return Err(FalcataError::ordering_violation(format!(
                "{word:?} does not sort after {:?}",
                self.prev_word
            )));
        }

        let chars: Vec<char> = word.chars().collect();
        let common = self
            .prev_chars
            .iter()
            .zip(&chars)
            .take_while(|(a, b)| a == b)
            .count();
        self.minimize_to(common);

        let weight = (count as f64 + 1.0).log2() as f32;
        for entry in &self.stack {
            self.arena.get_mut(entry.child).weight += weight;
        }

        let mut parent = match self.stack.last() {
            Some(entry) => entry.child,
            None => self.root,
        };
        for &label in &chars[common..] {
            let child = self.arena.alloc();
            self.arena.get_mut(child).weight = weight;
            self.arena
                .get_mut(parent)
                .edges
                .push(BuildEdge { label, target: child });
            self.stack.push(PathEntry { parent, child });
            parent = child;
        }
        self.arena.get_mut(parent).terminal = true;

        self.counts.push(count);
        self.prev_chars = chars;
        self.prev_word.clear();
        self.prev_word.push_str(word);
        Ok(())
    }

    /// Pop and minimize stack entries until `depth` remain.
    fn minimize_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            let Some(entry) = self.stack.pop() else { break };
            let canonical = self.minimize_node(entry.child);
            if canonical != entry.child {
                let fold = self.arena.get(entry.child).weight;
                self.arena.get_mut(canonical).weight += fold;
                // The popped child is always the parent's most recent edge.
                if let Some(edge) = self.arena.get_mut(entry.parent).edges.last_mut() {
                    edge.target = canonical;
                }
            }
        }
    }

    /// Resolve a node to its structural representative, registering it if
    /// it is the first of its shape.
    fn minimize_node(&mut self, id: NodeId) -> NodeId {
        let key = self.arena.key_of(id);
        *self.registry.entry(key).or_insert(id)
    }

    /// Minimize the remainder, renumber, and emit the compact graph.
    pub fn finish(mut self) -> Result<CompactGraph> {
        self.minimize_to(0);

        let reach = self.reachable_word_counts();
        let (order, index_of) = self.topological_order();
        let node_count = order.len();

        let mut first_child_edge = Vec::with_capacity(node_count + 1);
        let mut edge_target = Vec::new();
        let mut edge_terminal = BitVec::new();
        let mut edge_char = Vec::new();
        let mut edge_weight = Vec::new();
        first_child_edge.push(0u32);

        for &old in &order {
            let node = self.arena.get(old);
            let mut edges: Vec<&BuildEdge> = node.edges.iter().collect();
            // Heaviest subtree first; ties break on the label so emission is
            // deterministic.
            edges.sort_by(|a, b| {
                self.arena
                    .get(b.target)
                    .weight
                    .partial_cmp(&self.arena.get(a.target).weight)
                    .unwrap_or(Ordering::Equal)
                    .then(a.label.cmp(&b.label))
            });
            for edge in edges {
                let target = self.arena.get(edge.target);
                edge_char.push(edge.label);
                edge_target.push(index_of[edge.target as usize]);
                edge_terminal.push(target.terminal);
                edge_weight.push(target.weight);
            }
            first_child_edge.push(edge_target.len() as u32);
        }

        let mut reachable_terminals = Vec::with_capacity(node_count);
        for &old in &order {
            let count = reach[old as usize];
            if count > u16::MAX as u32 {
                return Err(FalcataError::invalid_graph(format!(
                    "reachable word count {count} exceeds the compact format limit of {}",
                    u16::MAX
                )));
            }
            reachable_terminals.push(count as u16);
        }

        let word_count_table = self.assign_word_counts(
            index_of[self.root as usize],
            &first_child_edge,
            &edge_target,
            &edge_terminal,
            &edge_char,
            &reachable_terminals,
        )?;

        CompactGraph::from_parts(
            index_of[self.root as usize],
            first_child_edge,
            edge_target,
            edge_terminal,
            edge_char,
            reachable_terminals,
            word_count_table,
            edge_weight,
        )
    }

    /// Per-node count of words completing at or below each node's edges,
    /// computed by a memoized post-order traversal from the root.
    fn reachable_word_counts(&self) -> Vec<u32> {
        let n = self.arena.len();
        let mut reach = vec![0u32; n];
        let mut visited = vec![false; n];
        let mut stack: Vec<(NodeId, usize)> = vec![(self.root, 0)];
        visited[self.root as usize] = true;

        while let Some(frame) = stack.last_mut() {
            let (node, pos) = *frame;
            let edges = &self.arena.get(node).edges;
            if pos < edges.len() {
                frame.1 = pos + 1;
                let target = edges[pos].target;
                if !visited[target as usize] {
                    visited[target as usize] = true;
                    stack.push((target, 0));
                }
            } else {
                reach[node as usize] = edges
                    .iter()
                    .map(|e| {
                        u32::from(self.arena.get(e.target).terminal) + reach[e.target as usize]
                    })
                    .sum();
                stack.pop();
            }
        }

        reach
    }

    /// Dense renumbering where every node's id follows all of its parents'
    /// (Kahn's algorithm over the reachable subgraph, FIFO tie-breaking).
    /// Returns the old ids in new-id order and the old-to-new index map.
    fn topological_order(&self) -> (Vec<NodeId>, Vec<u32>) {
        let n = self.arena.len();
        let mut pending_parents = vec![0u32; n];
        let mut reachable = vec![false; n];
        let mut queue = VecDeque::new();

        reachable[self.root as usize] = true;
        queue.push_back(self.root);
        while let Some(node) = queue.pop_front() {
            for edge in &self.arena.get(node).edges {
                pending_parents[edge.target as usize] += 1;
                if !reachable[edge.target as usize] {
                    reachable[edge.target as usize] = true;
                    queue.push_back(edge.target);
                }
            }
        }

        let mut order = Vec::new();
        let mut index_of = vec![u32::MAX; n];
        queue.push_back(self.root);
        while let Some(node) = queue.pop_front() {
            index_of[node as usize] = order.len() as u32;
            order.push(node);
            for edge in &self.arena.get(node).edges {
                pending_parents[edge.target as usize] -= 1;
                if pending_parents[edge.target as usize] == 0 {
                    queue.push_back(edge.target);
                }
            }
        }

        (order, index_of)
    }

    /// Fill the rank-indexed word count table by walking the emitted arrays
    /// in character order, which visits terminals in insertion order, while
    /// carrying each path's scan-order rank.
    #[allow(clippy::too_many_arguments)]
    fn assign_word_counts(
        &self,
        root: u32,
        first_child_edge: &[u32],
        edge_target: &[u32],
        edge_terminal: &BitVec,
        edge_char: &[char],
        reachable_terminals: &[u16],
    ) -> Result<Vec<u64>> {
        struct Walk<'a> {
            first_child_edge: &'a [u32],
            edge_target: &'a [u32],
            edge_terminal: &'a BitVec,
            edge_char: &'a [char],
            reachable_terminals: &'a [u16],
            counts: &'a [u64],
            next: usize,
            table: Vec<Option<u64>>,
        }

        impl Walk<'_> {
            fn visit(&mut self, node: u32, base: u32) -> Result<()> {
                let lo = self.first_child_edge[node as usize] as usize;
                let hi = self.first_child_edge[node as usize + 1] as usize;

                // Scan-order rank contribution of every preceding sibling.
                let mut skipped = Vec::with_capacity(hi - lo);
                let mut acc = 0u32;
                for e in lo..hi {
                    skipped.push(acc);
                    acc += u32::from(self.edge_terminal.get(e).unwrap_or(false))
                        + self.reachable_terminals[self.edge_target[e] as usize] as u32;
                }

                let mut by_label: Vec<usize> = (lo..hi).collect();
                by_label.sort_by_key(|&e| self.edge_char[e]);

                for e in by_label {
                    let rank = base + skipped[e - lo];
                    let terminal = self.edge_terminal.get(e).unwrap_or(false);
                    if terminal {
                        if self.next >= self.counts.len() {
                            return Err(FalcataError::internal(
                                "more terminal paths than inserted words",
                            ));
                        }
                        let Some(slot) = self.table.get_mut(rank as usize) else {
                            return Err(FalcataError::internal(
                                "rank out of range during count assignment",
                            ));
                        };
                        if slot.is_some() {
                            return Err(FalcataError::internal(
                                "duplicate rank during count assignment",
                            ));
                        }
                        *slot = Some(self.counts[self.next]);
                        self.next += 1;
                    }
                    self.visit(self.edge_target[e], rank + u32::from(terminal))?;
                }
                Ok(())
            }
        }

        let mut walk = Walk {
            first_child_edge,
            edge_target,
            edge_terminal,
            edge_char,
            reachable_terminals,
            counts: &self.counts,
            next: 0,
            table: vec![None; self.counts.len()],
        };
        walk.visit(root, 0)?;

        if walk.next != self.counts.len() {
            return Err(FalcataError::internal(format!(
                "walked {} terminal paths for {} inserted words",
                walk.next,
                self.counts.len()
            )));
        }
        walk.table
            .into_iter()
            .map(|slot| slot.ok_or_else(|| FalcataError::internal("unassigned rank slot")))
            .collect()
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
