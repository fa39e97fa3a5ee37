//! Token-based ordering of range sets.
//!
//! Sorting never moves entries: it computes a permutation that becomes the
//! set's sort index (its display order). Entries are compared by the token
//! strings of a window around each match, as described by a [`SortClause`].
//! Besides the in-process comparison sort, the ordering can be delegated to
//! an external line sorter ([`SortBackend::External`]), randomized
//! ([`randomize`]), or turned into a frequency table ([`count`]).
//!
//! All long-running calls poll an [`InterruptFlag`]. An interrupted call
//! leaves the entries untouched, drops the sort index and reports
//! [`ErrorKind::Interrupted`](cqp_common::error::ErrorKind::Interrupted).

mod clause;
mod comparator;
mod external;
mod group;
mod interrupt;
mod options;
mod random;

use std::cmp::Ordering;

use cqp_common::Result;
use cqp_corpus::TokenAttribute;

use crate::{interval::try_with_capacity, range_set::RangeSet};
use comparator::SortContext;

pub use clause::{Anchor, AnchorPoint, SortClause};
pub use group::{FrequencyGroup, count};
pub use interrupt::InterruptFlag;
pub use options::{CountOptions, ExternalSortConfig, SortBackend, SortOptions};
pub use random::randomize;

/// Sorts `set` by the token windows described by `clause`, on `attribute`.
///
/// On success the set's sort index holds the new display order. If the
/// clause refers to anchors the set lacks, nothing changes. Any other failure
/// (interruption, external sorter error, attribute lookup error) drops the
/// sort index, restoring the default order, and is returned.
pub fn sort_range_set(
    set: &mut RangeSet,
    clause: &SortClause,
    attribute: &dyn TokenAttribute,
    options: &SortOptions,
    interrupt: &InterruptFlag,
) -> Result<()> {
    clause.validate(set)?;
    match compute_order(set, clause, attribute, options, interrupt) {
        Ok(perm) => {
            log::debug!(
                "range set {}: sorted {} entries on {}",
                set.name(),
                perm.len(),
                attribute.name()
            );
            set.sort_index = Some(perm);
            Ok(())
        }
        Err(e) => {
            set.reset_sort();
            log::warn!("sort of {} failed, default order restored: {e}", set.name());
            Err(e)
        }
    }
}

fn compute_order(
    set: &RangeSet,
    clause: &SortClause,
    attribute: &dyn TokenAttribute,
    options: &SortOptions,
    interrupt: &InterruptFlag,
) -> Result<Vec<usize>> {
    let normalizer = options.get_normalizer().as_ref();
    match options.get_backend() {
        SortBackend::InProcess => {
            let ctx = SortContext::new(
                "sort",
                set,
                clause,
                attribute,
                normalizer,
                interrupt,
                options.get_cache_ids(),
            )?;
            let perm = stable_order(set.len(), &ctx)?;
            ctx.check_interrupt()?;
            Ok(perm)
        }
        SortBackend::External(config) => {
            let ctx =
                SortContext::new("sort", set, clause, attribute, normalizer, interrupt, false)?;
            let normalize = |key: &str| normalizer.normalize(key, clause.flags).into_owned();
            let perm = external::external_order(set.len(), &ctx, clause, normalize, config)?;
            ctx.check_interrupt()?;
            Ok(perm)
        }
    }
}

/// Stable comparison sort of `0..n` under `ctx`.
fn stable_order(n: usize, ctx: &SortContext<'_>) -> Result<Vec<usize>> {
    let mut perm = try_with_capacity(n)?;
    perm.extend(0..n);
    try_sort_by(&mut perm, |a, b| ctx.compare(a, b))?;
    Ok(perm)
}

/// Entries sorted by insertion before the merge passes start.
const INSERTION_RUN: usize = 16;

/// Stable merge sort under a comparison that may fail.
///
/// Stops at the first failed comparison and returns its error; `items` is
/// then left in some permutation of its input.
pub(crate) fn try_sort_by<T: Copy>(
    items: &mut [T],
    mut compare: impl FnMut(T, T) -> Result<Ordering>,
) -> Result<()> {
    for run in items.chunks_mut(INSERTION_RUN) {
        for i in 1..run.len() {
            let mut j = i;
            while j > 0 && compare(run[j - 1], run[j])? == Ordering::Greater {
                run.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    let n = items.len();
    if n <= INSERTION_RUN {
        return Ok(());
    }
    let mut merged = try_with_capacity::<T>(n)?;
    let mut width = INSERTION_RUN;
    while width < n {
        merged.clear();
        for lo in (0..n).step_by(2 * width) {
            let mid = (lo + width).min(n);
            let hi = (lo + 2 * width).min(n);
            merge_runs(&items[lo..mid], &items[mid..hi], &mut merged, &mut compare)?;
        }
        items.copy_from_slice(&merged);
        width *= 2;
    }
    Ok(())
}

fn merge_runs<T: Copy>(
    left: &[T],
    right: &[T],
    out: &mut Vec<T>,
    compare: &mut impl FnMut(T, T) -> Result<Ordering>,
) -> Result<()> {
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if compare(left[i], right[j])? == Ordering::Greater {
            out.push(right[j]);
            j += 1;
        } else {
            out.push(left[i]);
            i += 1;
        }
    }
    out.extend_from_slice(&left[i..]);
    out.extend_from_slice(&right[j..]);
    Ok(())
}

/// Restores the default order of `set` (sorting with no clause).
pub fn clear_sort(set: &mut RangeSet) {
    set.reset_sort();
}
