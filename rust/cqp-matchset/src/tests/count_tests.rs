use std::io;

use cqp_common::error::ErrorKind;
use cqp_corpus::{InMemoryAttribute, NormalizationFlags};
use itertools::Itertools;

use crate::{
    RangeSet,
    sort::{
        Anchor, AnchorPoint, CountOptions, FrequencyGroup, InterruptFlag, SortClause, SortOptions,
        count,
    },
};

fn run(
    set: &mut RangeSet,
    clause: &SortClause,
    words: &InMemoryAttribute,
    options: CountOptions,
) -> (Vec<FrequencyGroup>, String) {
    let mut out = Vec::new();
    let groups = count(
        set,
        clause,
        words,
        &SortOptions::default(),
        &options,
        &InterruptFlag::new(),
        &mut out,
    )
    .unwrap();
    (groups, String::from_utf8(out).unwrap())
}

fn singletons(n: i32) -> RangeSet {
    RangeSet::from_ranges("Last", (0..n).map(|p| (p, p))).unwrap()
}

#[test]
fn test_count_groups_by_frequency() {
    let words = InMemoryAttribute::from_text("word", "the cat the dog the cat a cat");
    let mut set = singletons(8);
    let (groups, text) = run(&mut set, &SortClause::new(), &words, CountOptions::new());

    assert_eq!(text, "3\tcat\n3\tthe\n1\ta\n1\tdog\n");
    assert_eq!(
        groups,
        vec![
            FrequencyGroup { first: 1, size: 3, representative: 1 },
            FrequencyGroup { first: 5, size: 3, representative: 0 },
            FrequencyGroup { first: 0, size: 1, representative: 6 },
            FrequencyGroup { first: 4, size: 1, representative: 3 },
        ]
    );
    assert_eq!(set.sort_index(), Some(&[6, 1, 5, 7, 3, 0, 2, 4][..]));
}

#[test]
fn test_count_threshold_and_first_index() {
    let words = InMemoryAttribute::from_text("word", "the cat the dog the cat a cat");
    let mut set = singletons(8);
    let options = CountOptions::new().min_frequency(2).show_first_index(true);
    let (groups, text) = run(&mut set, &SortClause::new(), &words, options);
    assert_eq!(groups.len(), 2);
    assert_eq!(text, "3\t1\tcat\n3\t5\tthe\n");
}

#[test]
fn test_count_ignores_tie_breaking() {
    let words = InMemoryAttribute::from_text("word", "Cat cat CAT dog");
    let mut set = singletons(4);
    let clause = SortClause::new()
        .flags(NormalizationFlags::IGNORE_CASE)
        .break_ties(true);
    let (groups, text) = run(&mut set, &clause, &words, CountOptions::new());
    assert_eq!(text, "3\tCat\n1\tdog\n");
    assert_eq!(groups[0].size, 3);
}

#[test]
fn test_count_prints_tokens_in_corpus_order() {
    let words = InMemoryAttribute::from_text("word", "the cat sat the cat");
    let mut set = RangeSet::from_ranges("Last", [(0, 1), (3, 4), (1, 2)]).unwrap();
    let clause = SortClause::new().reverse(true);
    let (_, text) = run(&mut set, &clause, &words, CountOptions::new());
    assert_eq!(text, "2\tthe cat\n1\tcat sat\n");
}

#[test]
fn test_count_on_context_window() {
    let words = InMemoryAttribute::from_text("word", "a x b x a x");
    let mut set = RangeSet::from_ranges("Last", [(1, 1), (3, 3), (5, 5)]).unwrap();
    let left = AnchorPoint::new(Anchor::MatchStart, -1);
    let clause = SortClause::new().window(left, left);
    let (_, text) = run(&mut set, &clause, &words, CountOptions::new());
    assert_eq!(text, "2\ta\n1\tb\n");
}

#[test]
fn test_count_of_empty_set() {
    let words = InMemoryAttribute::from_text("word", "a b");
    let mut set = RangeSet::new("Empty");
    let (groups, text) = run(&mut set, &SortClause::new(), &words, CountOptions::new());
    assert!(groups.is_empty());
    assert!(text.is_empty());
}

#[test]
fn test_interrupted_count_writes_nothing() {
    let words = InMemoryAttribute::from_text("word", "a b a");
    let mut set = singletons(3);
    let interrupt = InterruptFlag::new();
    interrupt.interrupt();
    let mut out = Vec::new();
    let err = count(
        &mut set,
        &SortClause::new(),
        &words,
        &SortOptions::default(),
        &CountOptions::new(),
        &interrupt,
        &mut out,
    )
    .unwrap_err();
    assert!(err.is_interrupted());
    assert!(out.is_empty());
    assert!(set.sort_index().is_none());
}

struct BrokenPipe;

impl io::Write for BrokenPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_count_reports_write_errors() {
    let words = InMemoryAttribute::from_text("word", "a b a");
    let mut set = singletons(3);
    let err = count(
        &mut set,
        &SortClause::new(),
        &words,
        &SortOptions::default(),
        &CountOptions::new(),
        &InterruptFlag::new(),
        &mut BrokenPipe,
    )
    .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Io { .. }));
}

#[test]
fn test_random_group_sizes() {
    fastrand::seed(5150);
    let tokens = (0..500).map(|_| format!("w{}", fastrand::u8(0..20))).collect_vec();
    let words = InMemoryAttribute::from_tokens("word", tokens.iter().map(String::as_str));
    let mut set = singletons(500);
    let (groups, text) = run(&mut set, &SortClause::new(), &words, CountOptions::new());

    assert_eq!(groups.iter().map(|g| g.size).sum::<usize>(), 500);
    assert!(groups.iter().tuple_windows().all(|(a, b)| a.size >= b.size));
    assert_eq!(text.lines().count(), groups.len());
    let expected = tokens.iter().counts();
    for group in &groups {
        assert_eq!(expected[&tokens[group.representative]], group.size);
    }
}
