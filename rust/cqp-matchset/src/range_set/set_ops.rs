//! Set operations and match disambiguation on range sets.

use std::cmp::Ordering;

use cqp_bitfield::Bitfield;
use cqp_common::{Cpos, Result, error::Error, verify_arg};

use super::RangeSet;
use crate::interval::{Interval, canonical_order, try_with_capacity};

/// Operation selector for [`apply_range_setop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RangeSetOp {
    /// Adds the (eligible) entries of the second set.
    Union,
    /// Keeps the entries also present in the second set.
    Intersection,
    /// Keeps the entries absent from the second set.
    Diff,
    /// Keeps the entries not contained in another entry.
    MaximalMatches,
    /// Keeps the entries containing no other entry.
    MinimalMatches,
    /// Keeps the shortest entry per start, then the earliest start per end.
    LeftMaximalMatches,
    /// Greedy leftmost selection of non-overlapping entries.
    NonOverlapping,
    /// Drops exact duplicates.
    Uniq,
    /// Compacts deleted entries out of the set.
    Reduce,
}

impl RangeSetOp {
    fn takes_operand(&self) -> bool {
        matches!(
            self,
            RangeSetOp::Union | RangeSetOp::Intersection | RangeSetOp::Diff
        )
    }
}

/// Applies `op` to `corpus1` in place.
///
/// `corpus2` is the second operand of `Union`, `Intersection` and `Diff`.
/// `restrictor` is only accepted by `Union`: when given, it holds one bit per
/// entry of `corpus2`, and only entries whose bit is set are added.
///
/// The disambiguation strategies and `Uniq` expect `corpus1` in canonical
/// order (see [`range_sort`](super::range_sort)). Every operation that changes
/// `corpus1` drops its sort index and notifies its observer.
pub fn apply_range_setop(
    corpus1: &mut RangeSet,
    op: RangeSetOp,
    corpus2: Option<&RangeSet>,
    restrictor: Option<&Bitfield>,
) -> Result<()> {
    if restrictor.is_some() && op != RangeSetOp::Union {
        return Err(Error::invalid_operation(format!("{op:?} with a restrictor")));
    }
    let before = corpus1.len();
    match (op.takes_operand(), corpus2) {
        (true, Some(corpus2)) => match op {
            RangeSetOp::Union => union(corpus1, corpus2, restrictor)?,
            RangeSetOp::Intersection => filter_by_membership(corpus1, corpus2, true),
            _ => filter_by_membership(corpus1, corpus2, false),
        },
        (true, None) => {
            return Err(Error::invalid_arg(
                "corpus2",
                format!("{op:?} requires a second operand"),
            ));
        }
        (false, Some(_)) => {
            return Err(Error::invalid_arg(
                "corpus2",
                format!("{op:?} takes no second operand"),
            ));
        }
        (false, None) => {
            match op {
                RangeSetOp::MaximalMatches => keep_maximal(&mut corpus1.ranges),
                RangeSetOp::MinimalMatches => keep_minimal(&mut corpus1.ranges),
                RangeSetOp::LeftMaximalMatches => {
                    keep_shortest_per_start(&mut corpus1.ranges);
                    corpus1.reduce();
                    keep_earliest_per_end(&mut corpus1.ranges);
                }
                RangeSetOp::NonOverlapping => keep_non_overlapping(&mut corpus1.ranges),
                RangeSetOp::Uniq => drop_duplicates(&mut corpus1.ranges),
                _ => {}
            }
            corpus1.reduce();
            corpus1.touch();
        }
    }
    log::debug!(
        "range set {}: {op:?} {before} -> {} entries",
        corpus1.name(),
        corpus1.len()
    );
    Ok(())
}

fn union(corpus1: &mut RangeSet, corpus2: &RangeSet, restrictor: Option<&Bitfield>) -> Result<()> {
    if let Some(restrictor) = restrictor {
        verify_arg!(restrictor, restrictor.element_count() == corpus2.len());
    }
    let eligible = |j: usize| {
        !corpus2.ranges[j].is_deleted() && restrictor.is_none_or(|bits| bits.get(j))
    };
    let next_eligible = |mut j: usize| {
        while j < corpus2.len() && !eligible(j) {
            j += 1;
        }
        j
    };
    let next_live = |mut i: usize| {
        while i < corpus1.len() && corpus1.ranges[i].is_deleted() {
            i += 1;
        }
        i
    };

    if next_eligible(0) == corpus2.len() {
        return Ok(());
    }

    let a = &*corpus1;
    let b = corpus2;
    let capacity = a.len() + b.len();
    let mut ranges = try_with_capacity::<Interval>(capacity)?;
    let both_targets = a.targets.is_some() && b.targets.is_some();
    let both_keywords = a.keywords.is_some() && b.keywords.is_some();
    let mut targets: Option<Vec<Cpos>> = match both_targets {
        true => Some(try_with_capacity(capacity)?),
        false => None,
    };
    let mut keywords: Option<Vec<Cpos>> = match both_keywords {
        true => Some(try_with_capacity(capacity)?),
        false => None,
    };

    let mut emit = |src: &RangeSet, k: usize| {
        ranges.push(src.ranges[k]);
        push_anchor(&mut targets, src.targets.as_deref(), k);
        push_anchor(&mut keywords, src.keywords.as_deref(), k);
    };

    let mut i = next_live(0);
    let mut j = next_eligible(0);
    while i < a.len() && j < b.len() {
        match canonical_order(&a.ranges[i], &b.ranges[j]) {
            Ordering::Less => {
                emit(a, i);
                i = next_live(i + 1);
            }
            Ordering::Greater => {
                emit(b, j);
                j = next_eligible(j + 1);
            }
            Ordering::Equal => {
                emit(a, i);
                i = next_live(i + 1);
                j = next_eligible(j + 1);
            }
        }
    }
    while i < a.len() {
        emit(a, i);
        i = next_live(i + 1);
    }
    while j < b.len() {
        emit(b, j);
        j = next_eligible(j + 1);
    }

    ranges.shrink_to_fit();
    corpus1.ranges = ranges;
    corpus1.targets = targets;
    corpus1.keywords = keywords;
    corpus1.sort_index = None;
    corpus1.touch();
    Ok(())
}

fn push_anchor(dst: &mut Option<Vec<Cpos>>, src: Option<&[Cpos]>, k: usize) {
    if let (Some(dst), Some(src)) = (dst, src) {
        dst.push(src[k]);
    }
}

/// Deletes the entries of `corpus1` whose membership in `corpus2` differs
/// from `keep_members`, then compacts.
fn filter_by_membership(corpus1: &mut RangeSet, corpus2: &RangeSet, keep_members: bool) {
    let other = &corpus2.ranges;
    let mut j = 0;
    for r in corpus1.ranges.iter_mut() {
        if r.is_deleted() {
            continue;
        }
        while j < other.len() && other[j].start < r.start {
            j += 1;
        }
        let found = other[j..]
            .iter()
            .take_while(|o| o.start == r.start)
            .any(|o| o.end == r.end);
        if found != keep_members {
            r.delete();
        }
    }
    corpus1.reduce();
    corpus1.touch();
}

/// Runs the mark/probe scan: for every live mark `i`, calls `visit(ranges, i,
/// j)` for every live probe `j > i` while `probe(mark, candidate)` holds.
/// Deleted probes are stepped over. The visitor returns `false` to stop
/// probing from `i`.
fn scan<P, V>(ranges: &mut [Interval], probe: P, mut visit: V)
where
    P: Fn(&Interval, &Interval) -> bool,
    V: FnMut(&mut [Interval], usize, usize) -> bool,
{
    for i in 0..ranges.len() {
        let mut j = i + 1;
        while j < ranges.len() && !ranges[i].is_deleted() {
            if !ranges[j].is_deleted()
                && !(probe(&ranges[i], &ranges[j]) && visit(ranges, i, j))
            {
                break;
            }
            j += 1;
        }
    }
}

fn overlaps(mark: &Interval, candidate: &Interval) -> bool {
    candidate.start <= mark.end
}

fn same_start(mark: &Interval, candidate: &Interval) -> bool {
    candidate.start == mark.start
}

fn keep_maximal(ranges: &mut [Interval]) {
    scan(ranges, overlaps, |r, i, j| {
        if r[j].end <= r[i].end {
            r[j].delete();
        } else if r[j].start == r[i].start {
            r[i].delete();
            return false;
        }
        true
    });
}

fn keep_minimal(ranges: &mut [Interval]) {
    scan(ranges, overlaps, |r, i, j| {
        if r[j].end <= r[i].end {
            r[i].delete();
            return false;
        }
        if r[j].start == r[i].start {
            r[j].delete();
        }
        true
    });
}

fn keep_shortest_per_start(ranges: &mut [Interval]) {
    scan(ranges, same_start, |r, i, j| {
        if r[j].end >= r[i].end {
            r[j].delete();
            true
        } else {
            r[i].delete();
            false
        }
    });
}

fn keep_earliest_per_end(ranges: &mut [Interval]) {
    scan(ranges, overlaps, |r, i, j| {
        if r[j].end == r[i].end {
            r[j].delete();
        }
        true
    });
}

fn keep_non_overlapping(ranges: &mut [Interval]) {
    scan(ranges, overlaps, |r, _, j| {
        r[j].delete();
        true
    });
}

fn drop_duplicates(ranges: &mut [Interval]) {
    scan(ranges, same_start, |r, i, j| {
        if r[j].end == r[i].end {
            r[j].delete();
        }
        true
    });
}
