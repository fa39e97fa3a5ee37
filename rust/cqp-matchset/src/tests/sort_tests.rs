use std::cell::Cell;

use cqp_common::{
    Cpos, Result,
    error::{Error, ErrorKind},
};
use cqp_corpus::{InMemoryAttribute, NormalizationFlags, TokenAttribute, TokenId};
use itertools::Itertools;

use crate::{
    RangeSet,
    sort::{
        Anchor, AnchorPoint, InterruptFlag, SortClause, SortOptions, clear_sort, randomize,
        sort_range_set, try_sort_by,
    },
};

fn corpus(text: &str) -> InMemoryAttribute {
    InMemoryAttribute::from_text("word", text)
}

fn singletons(n: i32) -> RangeSet {
    RangeSet::from_ranges("Last", (0..n).map(|p| (p, p))).unwrap()
}

fn sorted(set: &mut RangeSet, clause: &SortClause, attribute: &dyn TokenAttribute) -> Vec<usize> {
    sort_range_set(
        set,
        clause,
        attribute,
        &SortOptions::default(),
        &InterruptFlag::new(),
    )
    .unwrap();
    set.sort_index().unwrap().to_vec()
}

#[test]
fn test_sort_sets_display_order_only() {
    let words = corpus("b a c C a b");
    let mut set = singletons(6);
    let before = set.ranges().to_vec();
    assert_eq!(sorted(&mut set, &SortClause::new(), &words), vec![3, 1, 4, 0, 5, 2]);
    assert_eq!(set.ranges(), &before[..]);
}

#[test]
fn test_case_folding_and_tie_breaking() {
    let words = corpus("b a c C a b");
    let mut set = singletons(6);

    let folded = SortClause::new().flags(NormalizationFlags::IGNORE_CASE);
    assert_eq!(sorted(&mut set, &folded, &words), vec![1, 4, 0, 5, 2, 3]);

    let tie_broken = folded.clone().break_ties(true);
    assert_eq!(sorted(&mut set, &tie_broken, &words), vec![1, 4, 0, 5, 3, 2]);
}

#[test]
fn test_descending_keeps_ties_stable() {
    let words = corpus("b a c C a b");
    let mut set = singletons(6);
    let clause = SortClause::new().descending(true);
    assert_eq!(sorted(&mut set, &clause, &words), vec![2, 0, 5, 1, 4, 3]);
}

#[test]
fn test_diacritic_folding() {
    let words = corpus("é e f");
    let mut set = singletons(3);
    assert_eq!(sorted(&mut set, &SortClause::new(), &words), vec![1, 2, 0]);
    let folded = SortClause::new().flags(NormalizationFlags::IGNORE_DIACRITICS);
    assert_eq!(sorted(&mut set, &folded, &words), vec![0, 1, 2]);
}

#[test]
fn test_shorter_window_sorts_first() {
    let words = corpus("x y x x y");
    let mut set = RangeSet::from_ranges("Last", [(0, 1), (2, 2), (2, 3), (3, 4)]).unwrap();
    // storage: (0,1) "x y", (2,3) "x x", (2,2) "x", (3,4) "x y"
    assert_eq!(sorted(&mut set, &SortClause::new(), &words), vec![2, 1, 0, 3]);
}

#[test]
fn test_window_offsets_are_clamped() {
    let words = corpus("d c b a");
    let mut set = singletons(4);
    let right = AnchorPoint::new(Anchor::MatchEnd, 1);
    let clause = SortClause::new().window(right, right);
    // right neighbours: c b a a(clamped)
    assert_eq!(sorted(&mut set, &clause, &words), vec![2, 3, 1, 0]);
}

#[test]
fn test_reverse_sort() {
    let words = corpus("ab ba ca");
    let mut set = singletons(3);
    assert_eq!(sorted(&mut set, &SortClause::new(), &words), vec![0, 1, 2]);
    let reversed = SortClause::new().reverse(true);
    assert_eq!(sorted(&mut set, &reversed, &words), vec![1, 2, 0]);

    let words = corpus("p q q p");
    let mut set = RangeSet::from_ranges("Last", [(0, 1), (2, 3)]).unwrap();
    assert_eq!(sorted(&mut set, &SortClause::new(), &words), vec![0, 1]);
    assert_eq!(sorted(&mut set, &reversed, &words), vec![1, 0]);
}

#[test]
fn test_keyword_anchor() {
    let words = corpus("a b c d e");
    let mut set = RangeSet::from_unordered(
        "Last",
        vec![(0, 0).into(), (1, 1).into(), (2, 2).into()],
        None,
        Some(vec![4, -1, 3]),
        false,
    )
    .unwrap();
    let at_keyword = AnchorPoint::new(Anchor::Keyword, 0);
    let clause = SortClause::new().window(at_keyword, at_keyword);
    // keywords: e, undefined (empty window), d
    assert_eq!(sorted(&mut set, &clause, &words), vec![1, 2, 0]);
}

#[test]
fn test_missing_anchor_vector_is_rejected() {
    let words = corpus("a b c");
    let mut set = singletons(3);
    set.sort_index = Some(vec![2, 1, 0]);
    let at_target = AnchorPoint::new(Anchor::Target, 0);
    let clause = SortClause::new().window(at_target, at_target);
    let err = sort_range_set(
        &mut set,
        &clause,
        &words,
        &SortOptions::default(),
        &InterruptFlag::new(),
    )
    .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Precondition { .. }));
    assert_eq!(set.sort_index(), Some(&[2, 1, 0][..]));
}

#[test]
fn test_id_cache_does_not_change_order() {
    fastrand::seed(99);
    let tokens = (0..400).map(|_| format!("w{}", fastrand::u8(0..12))).collect_vec();
    let words = InMemoryAttribute::from_tokens("word", tokens.iter().map(String::as_str));
    let ranges = (0..300)
        .map(|_| {
            let start = fastrand::i32(0..396);
            (start, start + fastrand::i32(0..4))
        })
        .collect_vec();

    let mut cached = RangeSet::from_ranges("A", ranges.iter().copied()).unwrap();
    let mut uncached = cached.copy_as("B");
    let interrupt = InterruptFlag::new();
    let clause = SortClause::new();
    sort_range_set(&mut cached, &clause, &words, &SortOptions::new(), &interrupt).unwrap();
    sort_range_set(
        &mut uncached,
        &clause,
        &words,
        &SortOptions::new().cache_ids(false),
        &interrupt,
    )
    .unwrap();
    assert_eq!(cached.sort_index(), uncached.sort_index());

    let expected = (0..cached.len())
        .sorted_by_key(|&i| {
            let r = cached.range(i);
            (r.start..=r.end)
                .map(|p| tokens[p as usize].clone())
                .collect_vec()
        })
        .collect_vec();
    assert_eq!(cached.sort_index(), Some(&expected[..]));
}

#[test]
fn test_interrupted_before_start() {
    let words = corpus("b a c");
    let mut set = singletons(3);
    set.sort_index = Some(vec![0, 2, 1]);
    let before = set.ranges().to_vec();
    let interrupt = InterruptFlag::new();
    interrupt.interrupt();
    let err = sort_range_set(
        &mut set,
        &SortClause::new(),
        &words,
        &SortOptions::default(),
        &interrupt,
    )
    .unwrap_err();
    assert!(err.is_interrupted());
    assert!(set.sort_index().is_none());
    assert_eq!(set.ranges(), &before[..]);

    interrupt.rearm();
    assert!(interrupt.is_running());
}

/// Interrupts the sort after a number of id lookups.
struct Tripwire<'a> {
    inner: &'a InMemoryAttribute,
    flag: InterruptFlag,
    remaining: Cell<usize>,
}

impl TokenAttribute for Tripwire<'_> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn size(&self) -> Cpos {
        self.inner.size()
    }

    fn lexicon_size(&self) -> usize {
        self.inner.lexicon_size()
    }

    fn cpos_to_id(&self, cpos: Cpos) -> Result<TokenId> {
        match self.remaining.get() {
            0 => self.flag.interrupt(),
            n => self.remaining.set(n - 1),
        }
        self.inner.cpos_to_id(cpos)
    }

    fn id_to_str(&self, id: TokenId) -> Result<&str> {
        self.inner.id_to_str(id)
    }
}

#[test]
fn test_interrupted_mid_sort() {
    fastrand::seed(7);
    let tokens = (0..200).map(|_| format!("w{}", fastrand::u8(..))).collect_vec();
    let words = InMemoryAttribute::from_tokens("word", tokens.iter().map(String::as_str));
    let interrupt = InterruptFlag::new();
    let tripwire = Tripwire {
        inner: &words,
        flag: interrupt.clone(),
        remaining: Cell::new(50),
    };

    let mut set = singletons(200);
    let before = set.ranges().to_vec();
    let err = sort_range_set(
        &mut set,
        &SortClause::new(),
        &tripwire,
        &SortOptions::new().cache_ids(false),
        &interrupt,
    )
    .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Interrupted { .. }));
    assert!(set.sort_index().is_none());
    assert_eq!(set.ranges(), &before[..]);
}

#[test]
fn test_interrupt_at_any_point_leaves_set_valid() {
    for seed in [1, 2, 3, 4] {
        fastrand::seed(seed);
        let tokens = (0..2000).map(|_| format!("w{}", fastrand::u16(..500))).collect_vec();
        let words = InMemoryAttribute::from_tokens("word", tokens.iter().map(String::as_str));
        let mut set = singletons(2000);
        let before = set.ranges().to_vec();

        for trip_after in (0..20000).step_by(97) {
            let interrupt = InterruptFlag::new();
            let tripwire = Tripwire {
                inner: &words,
                flag: interrupt.clone(),
                remaining: Cell::new(trip_after),
            };
            let err = sort_range_set(
                &mut set,
                &SortClause::new(),
                &tripwire,
                &SortOptions::new().cache_ids(false),
                &interrupt,
            )
            .unwrap_err();
            assert!(err.is_interrupted(), "seed {seed}, trip after {trip_after}: {err}");
            assert!(set.sort_index().is_none());
            assert_eq!(set.ranges(), &before[..]);
        }

        let order = sorted(&mut set, &SortClause::new(), &words);
        let keys = order.iter().map(|&i| tokens[i].as_str()).collect_vec();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }
}

/// Fails to resolve the string of one lexicon entry.
struct Unreadable<'a> {
    inner: &'a InMemoryAttribute,
    broken: TokenId,
}

impl TokenAttribute for Unreadable<'_> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn size(&self) -> Cpos {
        self.inner.size()
    }

    fn lexicon_size(&self) -> usize {
        self.inner.lexicon_size()
    }

    fn cpos_to_id(&self, cpos: Cpos) -> Result<TokenId> {
        self.inner.cpos_to_id(cpos)
    }

    fn id_to_str(&self, id: TokenId) -> Result<&str> {
        if id == self.broken {
            return Err(Error::invalid_arg("id", format!("lexicon entry {id} is unreadable")));
        }
        self.inner.id_to_str(id)
    }
}

#[test]
fn test_lookup_failure_resets_sort() {
    let words = corpus("d b a c b a d");
    let broken = words.cpos_to_id(1).unwrap();
    let unreadable = Unreadable {
        inner: &words,
        broken,
    };

    for cache_ids in [true, false] {
        let mut set = singletons(7);
        set.sort_index = Some(vec![6, 5, 4, 3, 2, 1, 0]);
        let before = set.ranges().to_vec();
        let err = sort_range_set(
            &mut set,
            &SortClause::new(),
            &unreadable,
            &SortOptions::new().cache_ids(cache_ids),
            &InterruptFlag::new(),
        )
        .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        assert!(!err.is_interrupted());
        assert!(set.sort_index().is_none());
        assert_eq!(set.ranges(), &before[..]);
    }
}

#[test]
fn test_try_sort_by_is_stable() {
    fastrand::seed(99);
    for n in [0, 1, 2, 15, 16, 17, 31, 33, 100, 1000] {
        let items = (0..n).map(|i| (fastrand::u8(..8), i)).collect_vec();
        let mut ours = items.clone();
        try_sort_by(&mut ours, |a, b| Ok(a.0.cmp(&b.0))).unwrap();
        let mut std_sorted = items;
        std_sorted.sort_by_key(|item| item.0);
        assert_eq!(ours, std_sorted, "n = {n}");
    }
}

#[test]
fn test_try_sort_by_stops_at_first_error() {
    let mut items = (0..100).rev().collect_vec();
    let calls = Cell::new(0);
    let err = try_sort_by(&mut items, |a: i32, b: i32| {
        calls.set(calls.get() + 1);
        if calls.get() > 40 {
            return Err(Error::interrupted("sort"));
        }
        Ok(a.cmp(&b))
    })
    .unwrap_err();
    assert!(err.is_interrupted());
    assert_eq!(calls.get(), 41);
    assert_eq!(items.iter().copied().sorted().collect_vec(), (0..100).collect_vec());
}

#[test]
fn test_seeded_randomize_is_reproducible() {
    let mut a = RangeSet::from_ranges("A", (0..100).map(|p| (p, p + 1))).unwrap();
    let mut b = a.copy_as("B");
    let interrupt = InterruptFlag::new();

    randomize(&mut a, Some(42), &interrupt).unwrap();
    randomize(&mut b, Some(42), &interrupt).unwrap();
    let order = a.sort_index().unwrap().to_vec();
    assert_eq!(Some(&order[..]), b.sort_index());
    assert_eq!(order.iter().copied().sorted().collect_vec(), (0..100).collect_vec());
    assert_ne!(order, (0..100).collect_vec());

    randomize(&mut b, Some(43), &interrupt).unwrap();
    assert_ne!(Some(&order[..]), b.sort_index());
}

#[test]
fn test_unseeded_randomize_is_a_permutation() {
    let mut set = singletons(64);
    let interrupt = InterruptFlag::new();
    randomize(&mut set, None, &interrupt).unwrap();
    let order = set.sort_index().unwrap().iter().copied().sorted().collect_vec();
    assert_eq!(order, (0..64).collect_vec());

    clear_sort(&mut set);
    assert!(set.sort_index().is_none());
    assert_eq!(set.display_order().collect_vec(), (0..64).collect_vec());

    interrupt.interrupt();
    let err = randomize(&mut set, Some(1), &interrupt).unwrap_err();
    assert!(err.is_interrupted());
    assert!(set.sort_index().is_none());
}
