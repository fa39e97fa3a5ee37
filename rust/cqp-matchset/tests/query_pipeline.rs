//! A query's life cycle: match lists combined, frozen into a named set,
//! disambiguated, sorted and counted.

use cqp_corpus::InMemoryAttribute;
use cqp_matchset::{
    Interval, MatchList, RangeSet, RangeSetOp, SetOp,
    match_list::apply_setop,
    range_set::apply_range_setop,
    sort::{
        Anchor, AnchorPoint, CountOptions, InterruptFlag, SortClause, SortOptions, count,
        sort_range_set,
    },
};

const TEXT: &str = "the old man and the sea and the old sea";

#[test]
fn test_match_lists_to_range_set() {
    let words = InMemoryAttribute::from_text("word", TEXT);
    let the = MatchList::from_positions(vec![0, 4, 7]);
    let old = MatchList::from_positions(vec![1, 8]);

    let mut hits = the.clone();
    apply_setop(&mut hits, SetOp::Union, Some(&old), None).unwrap();
    assert_eq!(hits.starts(), &[0, 1, 4, 7, 8]);

    // hits that are not "the"
    let not_the = the.clone().invert();
    apply_setop(&mut hits, SetOp::Intersection, Some(&not_the), Some(&words)).unwrap();
    assert_eq!(hits.starts(), &[1, 8]);

    let frozen = RangeSet::from_match_list("Hits", &hits).unwrap();
    assert_eq!(frozen.ranges(), &[Interval::at(1), Interval::at(8)]);
}

#[test]
fn test_disambiguate_sort_and_count() {
    let words = InMemoryAttribute::from_text("word", TEXT);
    let mut phrases =
        RangeSet::from_ranges("NP", [(7, 9), (0, 1), (4, 5), (0, 2), (7, 8)]).unwrap();
    apply_range_setop(&mut phrases, RangeSetOp::MaximalMatches, None, None).unwrap();
    assert_eq!(
        phrases.ranges(),
        &[Interval::new(0, 2), Interval::new(4, 5), Interval::new(7, 9)]
    );

    let head = AnchorPoint::new(Anchor::MatchEnd, 0);
    let by_head = SortClause::new().window(head, head).descending(true);
    sort_range_set(
        &mut phrases,
        &by_head,
        &words,
        &SortOptions::default(),
        &InterruptFlag::new(),
    )
    .unwrap();
    // heads: man, sea, sea
    assert_eq!(phrases.sort_index(), Some(&[1, 2, 0][..]));

    let first = AnchorPoint::new(Anchor::MatchStart, 0);
    let mut out = Vec::new();
    count(
        &mut phrases,
        &SortClause::new().window(first, head),
        &words,
        &SortOptions::default(),
        &CountOptions::new(),
        &InterruptFlag::new(),
        &mut out,
    )
    .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "1\tthe old man\n1\tthe old sea\n1\tthe sea\n"
    );
}
