//! Persisted wire format for [`CompactGraph`].
//!
//! A graph serializes as magic bytes, a format version, and a sequence of
//! length-prefixed varint arrays: root index, edge offsets, edge targets,
//! edge labels (one UTF-8 string), reachable word counts, and word counts.
//!
//! Edge targets use the historical signed form: every node id is shifted up
//! by one and negated when the edge is terminal, which keeps terminality of
//! node zero representable. The sign encoding exists only here; in memory
//! the graph carries a tagged terminal bitmap. Edge weights are a
//! construction-time artifact and are not persisted.

use std::io::{Read, Write};

use crate::error::{FalcataError, Result};
use crate::graph::CompactGraph;
use crate::util::varint;

/// Magic bytes opening a serialized graph.
pub const MAGIC: [u8; 4] = *b"FLCG";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Serialize a graph, returning the number of bytes written.
pub fn write_graph<W: Write>(graph: &CompactGraph, writer: &mut W) -> Result<u64> {
    let mut written = 0u64;

    writer.write_all(&MAGIC)?;
    written += MAGIC.len() as u64;
    written += varint::write_u32(writer, FORMAT_VERSION)? as u64;
    written += varint::write_u32(writer, graph.root())? as u64;

    let offsets = graph.first_child_edges();
    written += varint::write_u64(writer, offsets.len() as u64)? as u64;
    for &offset in offsets {
        written += varint::write_u32(writer, offset)? as u64;
    }

    written += varint::write_u64(writer, graph.edge_count() as u64)? as u64;
    for edge in graph.edge_refs() {
        let mut signed = edge.target as i32 + 1;
        if edge.is_terminal {
            signed = -signed;
        }
        written += varint::write_u32(writer, varint::encode_zigzag32(signed))? as u64;
    }

    let labels: String = graph.edge_refs().map(|e| e.label).collect();
    written += varint::write_u64(writer, labels.len() as u64)? as u64;
    writer.write_all(labels.as_bytes())?;
    written += labels.len() as u64;

    let reach = graph.reachable_terminal_counts();
    written += varint::write_u64(writer, reach.len() as u64)? as u64;
    for &count in reach {
        written += varint::write_u32(writer, count as u32)? as u64;
    }

    let counts = graph.word_counts();
    written += varint::write_u64(writer, counts.len() as u64)? as u64;
    for &count in counts {
        written += varint::write_u64(writer, count)? as u64;
    }

    Ok(written)
}

/// Deserialize a graph written by [`write_graph`].
///
/// Structural problems in otherwise well-formed bytes surface as
/// `InvalidGraphData` through the graph's own validation.
pub fn read_graph<R: Read>(reader: &mut R) -> Result<CompactGraph> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(FalcataError::serialization("bad magic bytes"));
    }
    let version = varint::read_u32(reader)?;
    if version != FORMAT_VERSION {
        return Err(FalcataError::serialization(format!(
            "unsupported format version {version}"
        )));
    }

    let root = varint::read_u32(reader)?;

    let offset_len = varint::read_u64(reader)? as usize;
    let mut offsets = Vec::with_capacity(offset_len);
    for _ in 0..offset_len {
        offsets.push(varint::read_u32(reader)?);
    }

    let edge_count = varint::read_u64(reader)? as usize;
    let mut targets = Vec::with_capacity(edge_count);
    for _ in 0..edge_count {
        targets.push(varint::decode_zigzag32(varint::read_u32(reader)?));
    }

    let label_bytes = varint::read_u64(reader)? as usize;
    let mut buffer = vec![0u8; label_bytes];
    reader.read_exact(&mut buffer)?;
    let labels = String::from_utf8(buffer)
        .map_err(|_| FalcataError::serialization("edge labels are not valid UTF-8"))?;
    let labels: Vec<char> = labels.chars().collect();

    let reach_len = varint::read_u64(reader)? as usize;
    let mut reach = Vec::with_capacity(reach_len);
    for _ in 0..reach_len {
        let count = varint::read_u32(reader)?;
        let count = u16::try_from(count).map_err(|_| {
            FalcataError::serialization(format!("reachable word count {count} overflows u16"))
        })?;
        reach.push(count);
    }

    let word_count = varint::read_u64(reader)? as usize;
    let mut counts = Vec::with_capacity(word_count);
    for _ in 0..word_count {
        counts.push(varint::read_u64(reader)?);
    }

    CompactGraph::from_signed_parts(root, offsets, targets, labels, reach, counts)
}
