//! Integration tests for the persisted graph format.

use std::fs::File;
use std::io::{Cursor, Read, Write};

use tempfile::TempDir;

use falcata::codec::{read_graph, write_graph};
use falcata::dictionary::WordList;
use falcata::error::FalcataError;
use falcata::lookup::LookupEngine;

fn sample_words() -> Vec<(&'static str, u64)> {
    vec![
        ("apple", 512),
        ("apply", 64),
        ("banana", 9),
        ("band", 33),
        ("bandana", 2),
        ("canal", 17),
        ("candle", 90),
        ("candy", 41),
    ]
}

#[test]
fn test_file_round_trip_preserves_lookup() {
    let list = WordList::from_pairs(sample_words());
    let graph = list.into_graph().unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("words.flcg");

    let mut file = File::create(&path).unwrap();
    let written = write_graph(&graph, &mut file).unwrap();
    file.flush().unwrap();
    assert_eq!(written, std::fs::metadata(&path).unwrap().len());

    let mut file = File::open(&path).unwrap();
    let decoded = read_graph(&mut file).unwrap();

    // Exact behavior is identical after the round trip.
    for rank in 0..graph.word_count() as u32 {
        assert_eq!(decoded.word_at(rank).unwrap(), graph.word_at(rank).unwrap());
    }
    for (word, _) in sample_words() {
        assert_eq!(decoded.word_index(word), graph.word_index(word));
    }

    // And so is fuzzy behavior.
    let before = LookupEngine::new(graph).unwrap();
    let after = LookupEngine::new(decoded).unwrap();
    for query in ["appel", "bnad", "candel", "zzz"] {
        for max_edits in 0..=2 {
            let mut expected: Vec<(String, u64)> = before
                .lookup(query, max_edits)
                .into_iter()
                .map(|r| (r.term, r.count))
                .collect();
            let mut actual: Vec<(String, u64)> = after
                .lookup(query, max_edits)
                .into_iter()
                .map(|r| (r.term, r.count))
                .collect();
            expected.sort();
            actual.sort();
            assert_eq!(actual, expected, "query {query:?} at {max_edits}");
        }
    }
}

#[test]
fn test_empty_graph_round_trip() {
    let graph = WordList::new().into_graph().unwrap();
    let mut buffer = Vec::new();
    write_graph(&graph, &mut buffer).unwrap();
    let decoded = read_graph(&mut Cursor::new(buffer)).unwrap();
    assert_eq!(decoded.word_count(), 0);
    assert_eq!(decoded.word_index("anything"), None);
}

#[test]
fn test_rejects_garbage() {
    let mut garbage = Cursor::new(b"not a graph at all".to_vec());
    assert!(matches!(
        read_graph(&mut garbage),
        Err(FalcataError::Serialization(_))
    ));
}

#[test]
fn test_rejects_truncation_anywhere() {
    let list = WordList::from_pairs(sample_words());
    let graph = list.into_graph().unwrap();
    let mut buffer = Vec::new();
    write_graph(&graph, &mut buffer).unwrap();

    // Chop the stream at a spread of offsets; every prefix must fail
    // cleanly, never panic.
    for cut in (0..buffer.len()).step_by(buffer.len() / 13 + 1) {
        let mut truncated = Cursor::new(buffer[..cut].to_vec());
        assert!(read_graph(&mut truncated).is_err(), "prefix of {cut} bytes");
    }

    // An extra trailing byte is tolerated: readers stop at the last array.
    let mut padded = buffer.clone();
    padded.push(0xFF);
    let mut reader = Cursor::new(padded);
    assert!(read_graph(&mut reader).is_ok());
    let mut rest = Vec::new();
    reader.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, vec![0xFF]);
}
