//! Integration tests for graph construction and rank round-trips.

use falcata::error::FalcataError;
use falcata::graph::GraphBuilder;

fn build(words: &[(&str, u64)]) -> falcata::graph::CompactGraph {
    let mut builder = GraphBuilder::new();
    for &(word, count) in words {
        builder.insert(word, count).unwrap();
    }
    builder.finish().unwrap()
}

#[test]
fn test_word_rank_round_trip() {
    let words = [
        ("arc", 11u64),
        ("arch", 40),
        ("arches", 2),
        ("bar", 100),
        ("bard", 3),
        ("bars", 18),
        ("car", 77),
        ("card", 20),
        ("cards", 6),
        ("care", 52),
        ("cars", 31),
    ];
    let graph = build(&words);
    assert_eq!(graph.word_count(), words.len());

    // get_index(get_word(i)) == i for every valid rank.
    for rank in 0..words.len() as u32 {
        let word = graph.word_at(rank).unwrap();
        assert_eq!(graph.word_index(&word), Some(rank), "rank {rank} via {word:?}");
    }

    // Ranks are a permutation of 0..word_count.
    let mut ranks: Vec<u32> = words
        .iter()
        .map(|(word, _)| graph.word_index(word).unwrap())
        .collect();
    ranks.sort();
    let expected: Vec<u32> = (0..words.len() as u32).collect();
    assert_eq!(ranks, expected);

    // Counts land on the right ranks.
    for (word, count) in words {
        let rank = graph.word_index(word).unwrap();
        assert_eq!(graph.word_counts()[rank as usize], count);
    }
}

#[test]
fn test_absent_words_and_bad_ranks() {
    let graph = build(&[("left", 1), ("right", 2)]);

    assert_eq!(graph.word_index("lef"), None); // proper prefix
    assert_eq!(graph.word_index("lefts"), None); // extends past a word
    assert_eq!(graph.word_index("middle"), None);
    assert_eq!(graph.word_index(""), None);

    assert!(matches!(
        graph.word_at(2),
        Err(FalcataError::IndexOutOfRange(_))
    ));
    assert!(matches!(
        graph.word_at(u32::MAX),
        Err(FalcataError::IndexOutOfRange(_))
    ));
}

#[test]
fn test_minimization_shares_suffixes() {
    // Ten words, one shared "-ation" tail: the graph stays far smaller than
    // the trie.
    let words = [
        ("creation", 1u64),
        ("donation", 1),
        ("duration", 1),
        ("location", 1),
        ("migration", 1),
        ("narration", 1),
        ("rotation", 1),
        ("starvation", 1),
        ("vacation", 1),
        ("vibration", 1),
    ];
    let graph = build(&words);

    let trie_nodes: usize = 1 + words.iter().map(|(w, _)| w.len()).sum::<usize>();
    assert!(
        graph.node_count() * 2 < trie_nodes,
        "{} nodes is not minimized against a {trie_nodes}-node trie",
        graph.node_count()
    );

    for rank in 0..words.len() as u32 {
        let word = graph.word_at(rank).unwrap();
        assert_eq!(graph.word_index(&word), Some(rank));
    }
}

#[test]
fn test_builder_rejects_bad_input() {
    let mut builder = GraphBuilder::new();
    builder.insert("m", 1).unwrap();

    assert!(matches!(
        builder.insert("m", 1),
        Err(FalcataError::OrderingViolation(_))
    ));
    assert!(matches!(
        builder.insert("a", 1),
        Err(FalcataError::OrderingViolation(_))
    ));
    assert!(matches!(
        builder.insert("", 1),
        Err(FalcataError::InvalidArgument(_))
    ));

    // The builder is still usable after rejected inserts.
    builder.insert("n", 1).unwrap();
    let graph = builder.finish().unwrap();
    assert_eq!(graph.word_count(), 2);
}

#[test]
fn test_unicode_words() {
    let graph = build(&[("grü", 4), ("grün", 9), ("grüß", 2)]);
    assert_eq!(graph.word_count(), 3);
    for word in ["grü", "grün", "grüß"] {
        let rank = graph.word_index(word).unwrap();
        assert_eq!(graph.word_at(rank).unwrap(), word);
    }
}
