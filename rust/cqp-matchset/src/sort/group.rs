//! Frequency counts over sort keys.

use std::{cmp::Ordering, io::Write};

use cqp_common::{Result, error::Error, verify_data};
use cqp_corpus::TokenAttribute;

use super::{
    InterruptFlag, SortClause, comparator::SortContext, options::CountOptions,
    options::SortOptions, stable_order, try_sort_by,
};
use crate::{interval::try_with_capacity, range_set::RangeSet};

/// A run of entries with equal sort keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrequencyGroup {
    /// Display line of the group's first entry under the new sort index.
    pub first: usize,
    /// Number of entries in the group.
    pub size: usize,
    /// Storage index of the group's first entry.
    pub representative: usize,
}

/// Counts how often each distinct sort key occurs in `set`.
///
/// The set is sorted by `clause` without tie breaking, so entries with equal
/// keys end up adjacent, and its sort index is set to that order. Groups are
/// reported by descending size; groups of equal size follow the clause's
/// order of their keys. Groups smaller than `count_options.min_frequency`
/// are omitted.
///
/// For every reported group one line is written to `out`:
/// `size TAB [first TAB] tokens`, where `tokens` are the group key's tokens in
/// corpus order, separated by spaces.
///
/// Counting always runs in process; the backend of `options` is ignored.
pub fn count(
    set: &mut RangeSet,
    clause: &SortClause,
    attribute: &dyn TokenAttribute,
    options: &SortOptions,
    count_options: &CountOptions,
    interrupt: &InterruptFlag,
    out: &mut dyn Write,
) -> Result<Vec<FrequencyGroup>> {
    clause.validate(set)?;
    let clause = clause.clone().break_ties(false);

    let (perm, groups, lines) = match group_entries(
        set,
        &clause,
        attribute,
        options,
        count_options,
        interrupt,
    ) {
        Ok(grouped) => grouped,
        Err(e) => {
            set.reset_sort();
            log::warn!("count on {} failed, default order restored: {e}", set.name());
            return Err(e);
        }
    };
    log::debug!(
        "range set {}: {} entries in {} groups",
        set.name(),
        perm.len(),
        groups.len()
    );
    set.sort_index = Some(perm);

    let io_err = |e| Error::io("writing frequency table", e);
    for (group, tokens) in groups.iter().zip(&lines) {
        if count_options.show_first_index {
            writeln!(out, "{}\t{}\t{tokens}", group.size, group.first).map_err(io_err)?;
        } else {
            writeln!(out, "{}\t{tokens}", group.size).map_err(io_err)?;
        }
    }
    out.flush().map_err(io_err)?;
    Ok(groups)
}

type Grouping = (Vec<usize>, Vec<FrequencyGroup>, Vec<String>);

fn group_entries(
    set: &RangeSet,
    clause: &SortClause,
    attribute: &dyn TokenAttribute,
    options: &SortOptions,
    count_options: &CountOptions,
    interrupt: &InterruptFlag,
) -> Result<Grouping> {
    let ctx = SortContext::new(
        "count",
        set,
        clause,
        attribute,
        options.get_normalizer().as_ref(),
        interrupt,
        options.get_cache_ids(),
    )?;
    let perm = stable_order(set.len(), &ctx)?;

    let mut groups = Vec::new();
    let mut first = 0;
    for p in 1..=perm.len() {
        if p == perm.len() || ctx.compare(perm[first], perm[p])? != Ordering::Equal {
            groups.push(FrequencyGroup {
                first,
                size: p - first,
                representative: perm[first],
            });
            first = p;
        }
    }
    verify_data!(
        groups,
        groups.iter().map(|g| g.size).sum::<usize>() == perm.len()
    );

    try_sort_by(&mut groups, |a, b| match b.size.cmp(&a.size) {
        Ordering::Equal => ctx.compare(a.representative, b.representative),
        ord => Ok(ord),
    })?;
    groups.retain(|g| g.size >= count_options.min_frequency);

    let mut lines = try_with_capacity(groups.len())?;
    for group in &groups {
        lines.push(ctx.tokens(group.representative, true)?.join(" "));
    }
    ctx.check_interrupt()?;
    Ok((perm, groups, lines))
}
