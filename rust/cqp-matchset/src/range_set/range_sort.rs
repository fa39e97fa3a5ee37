//! Canonical ordering of range sets.

use cqp_common::{Cpos, Result};

use super::RangeSet;
use crate::interval::{canonical_order, try_with_capacity};

/// Sorts the entries of `set` into canonical order: ascending start, ties by
/// descending end. The sort is stable, so exact duplicates keep their
/// relative order.
///
/// With `make_sort_index`, the set receives a sort index under which the
/// display order reproduces the order before the sort. A sort index present
/// beforehand described the old storage layout and is discarded.
pub fn range_sort(set: &mut RangeSet, make_sort_index: bool) -> Result<()> {
    if set.sort_index.take().is_some() {
        log::warn!(
            "range set {}: discarding stale sort index before canonical sort",
            set.name()
        );
    }

    let n = set.len();
    let mut perm = try_with_capacity::<usize>(n)?;
    perm.extend(0..n);
    perm.sort_by(|&a, &b| canonical_order(&set.ranges[a], &set.ranges[b]));

    let moved = perm.iter().enumerate().any(|(p, &old)| p != old);
    if moved {
        let mut ranges = try_with_capacity(n)?;
        ranges.extend(perm.iter().map(|&old| set.ranges[old]));
        set.ranges = ranges;
        set.targets = set.targets.as_deref().map(|t| gather(t, &perm)).transpose()?;
        set.keywords = set.keywords.as_deref().map(|k| gather(k, &perm)).transpose()?;
    }

    if make_sort_index {
        let mut index = try_with_capacity::<usize>(n)?;
        index.resize(n, 0);
        for (p, &old) in perm.iter().enumerate() {
            index[old] = p;
        }
        set.sort_index = Some(index);
    }
    log::trace!("range set {}: sorted {n} entries (moved: {moved})", set.name());
    if moved {
        set.touch();
    }
    Ok(())
}

fn gather(column: &[Cpos], perm: &[usize]) -> Result<Vec<Cpos>> {
    let mut out = try_with_capacity(perm.len())?;
    out.extend(perm.iter().map(|&old| column[old]));
    Ok(out)
}
