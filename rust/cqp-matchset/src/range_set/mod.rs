//! Named, materialized match sets (subcorpora).

pub mod range_sort;
pub mod set_ops;

use std::{ops::Range, sync::Arc};

use cqp_bitfield::Bitfield;
use cqp_common::{Cpos, Result, error::Error, verify_arg};

use crate::{
    interval::{Interval, try_with_capacity},
    match_list::MatchList,
    observer::MutationObserver,
};

pub use range_sort::range_sort;
pub use set_ops::{RangeSetOp, apply_range_setop};

/// A materialized set of matches bound to a named subcorpus.
///
/// Entries are stored as `(start, end)` ranges with optional per-entry target
/// and keyword anchors, kept in canonical order (ascending start, ties by
/// descending end). A `RangeSet` is never inverted.
///
/// The optional sort index is a permutation of the storage indices defining
/// the display order: display line `k` shows entry `sort_index[k]`. Any
/// structural change of the entries drops it.
#[derive(Clone, Default)]
pub struct RangeSet {
    name: String,
    pub(crate) ranges: Vec<Interval>,
    pub(crate) targets: Option<Vec<Cpos>>,
    pub(crate) keywords: Option<Vec<Cpos>>,
    pub(crate) sort_index: Option<Vec<usize>>,
    observer: Option<Arc<dyn MutationObserver>>,
}

impl RangeSet {
    /// Creates an empty set.
    pub fn new(name: impl Into<String>) -> RangeSet {
        RangeSet {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Creates a set from `(start, end)` pairs, putting them in canonical order.
    pub fn from_ranges(
        name: impl Into<String>,
        ranges: impl IntoIterator<Item = (Cpos, Cpos)>,
    ) -> Result<RangeSet> {
        let ranges = ranges.into_iter().map(Interval::from).collect();
        RangeSet::from_unordered(name, ranges, None, None, false)
    }

    /// Imports externally supplied match data in arbitrary order.
    ///
    /// The entries are sorted into canonical order. With `keep_order`, the
    /// resulting sort index displays them in the order they were supplied.
    pub fn from_unordered(
        name: impl Into<String>,
        ranges: Vec<Interval>,
        targets: Option<Vec<Cpos>>,
        keywords: Option<Vec<Cpos>>,
        keep_order: bool,
    ) -> Result<RangeSet> {
        for range in &ranges {
            range.validate()?;
        }
        if let Some(targets) = &targets {
            verify_arg!(targets, targets.len() == ranges.len());
        }
        if let Some(keywords) = &keywords {
            verify_arg!(keywords, keywords.len() == ranges.len());
        }
        let mut set = RangeSet {
            name: name.into(),
            ranges,
            targets,
            keywords,
            ..Default::default()
        };
        range_sort(&mut set, keep_order)?;
        Ok(set)
    }

    /// Freezes a match list into a named set.
    ///
    /// Inverted lists have to be materialized (complemented) first. Deleted
    /// entries are dropped, positions-only entries become single-position
    /// ranges, and the result is put into canonical order.
    pub fn from_match_list(name: impl Into<String>, list: &MatchList) -> Result<RangeSet> {
        if list.is_inverted() {
            return Err(Error::precondition(
                "an inverted match list must be materialized before it is stored",
            ));
        }
        let live = list.starts().iter().filter(|&&s| s >= 0).count();
        let mut ranges = try_with_capacity(live)?;
        let mut targets = list.targets().map(|_| Vec::with_capacity(live));
        let mut keywords = list.keywords().map(|_| Vec::with_capacity(live));
        for i in 0..list.len() {
            if list.is_deleted(i) {
                continue;
            }
            ranges.push(list.interval(i));
            if let (Some(dst), Some(src)) = (&mut targets, list.targets()) {
                dst.push(src[i]);
            }
            if let (Some(dst), Some(src)) = (&mut keywords, list.keywords()) {
                dst.push(src[i]);
            }
        }
        RangeSet::from_unordered(name, ranges, targets, keywords, false)
    }

    /// Returns a deep copy bound to `name`, without the mutation observer.
    pub fn copy_as(&self, name: impl Into<String>) -> RangeSet {
        RangeSet {
            name: name.into(),
            ranges: self.ranges.clone(),
            targets: self.targets.clone(),
            keywords: self.keywords.clone(),
            sort_index: self.sort_index.clone(),
            observer: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The entries in storage order.
    pub fn ranges(&self) -> &[Interval] {
        &self.ranges
    }

    #[inline]
    pub fn range(&self, i: usize) -> Interval {
        self.ranges[i]
    }

    pub fn targets(&self) -> Option<&[Cpos]> {
        self.targets.as_deref()
    }

    pub fn keywords(&self) -> Option<&[Cpos]> {
        self.keywords.as_deref()
    }

    /// Target anchor of entry `i`, if the set carries targets.
    pub fn target(&self, i: usize) -> Option<Cpos> {
        self.targets.as_ref().map(|t| t[i])
    }

    /// Keyword anchor of entry `i`, if the set carries keywords.
    pub fn keyword(&self, i: usize) -> Option<Cpos> {
        self.keywords.as_ref().map(|k| k[i])
    }

    pub fn sort_index(&self) -> Option<&[usize]> {
        self.sort_index.as_deref()
    }

    /// Storage indices in display order.
    pub fn display_order(&self) -> impl Iterator<Item = usize> + '_ {
        let sorted = self.sort_index.as_deref().map(|idx| idx.iter().copied());
        let default = sorted.is_none().then(|| 0..self.len());
        sorted.into_iter().flatten().chain(default.into_iter().flatten())
    }

    /// Drops the sort index, restoring the default (storage) order.
    pub fn reset_sort(&mut self) {
        self.sort_index = None;
    }

    pub fn set_observer(&mut self, observer: Arc<dyn MutationObserver>) {
        self.observer = Some(observer);
    }

    /// Notifies the observer that the set has changed.
    pub fn touch(&self) {
        if let Some(observer) = &self.observer {
            observer.touched(&self.name);
        }
    }

    /// Deletes the entries whose bit is set in `selection`.
    ///
    /// `selection` is indexed by storage position and must cover exactly the
    /// entries of the set. Returns the number of deleted entries.
    pub fn delete_selected(&mut self, selection: &Bitfield) -> Result<usize> {
        self.delete_where(selection, true)
    }

    /// Deletes the entries whose bit is cleared in `selection`.
    pub fn keep_selected(&mut self, selection: &Bitfield) -> Result<usize> {
        self.delete_where(selection, false)
    }

    fn delete_where(&mut self, selection: &Bitfield, value: bool) -> Result<usize> {
        verify_arg!(selection, selection.element_count() == self.len());
        let mut deleted = 0;
        for (i, range) in self.ranges.iter_mut().enumerate() {
            if selection.get(i) == value {
                range.delete();
                deleted += 1;
            }
        }
        if deleted > 0 {
            self.reduce();
            self.touch();
        }
        Ok(deleted)
    }

    /// Deletes a contiguous block of display lines.
    ///
    /// Lines are numbered in display order, so with an active sort index they
    /// need not be contiguous in storage.
    pub fn delete_lines(&mut self, lines: Range<usize>) -> Result<usize> {
        verify_arg!(lines, lines.start <= lines.end && lines.end <= self.len());
        if lines.is_empty() {
            return Ok(0);
        }
        let victims: Vec<usize> = self
            .display_order()
            .skip(lines.start)
            .take(lines.len())
            .collect();
        for &i in &victims {
            self.ranges[i].delete();
        }
        self.reduce();
        self.touch();
        Ok(victims.len())
    }

    /// Removes deleted entries from the range, target and keyword vectors.
    ///
    /// Always drops the sort index. Returns the number of removed entries.
    pub(crate) fn reduce(&mut self) -> usize {
        let before = self.len();
        let mut w = 0;
        for r in 0..before {
            if self.ranges[r].is_deleted() {
                continue;
            }
            self.ranges[w] = self.ranges[r];
            if let Some(targets) = &mut self.targets {
                targets[w] = targets[r];
            }
            if let Some(keywords) = &mut self.keywords {
                keywords[w] = keywords[r];
            }
            w += 1;
        }
        self.sort_index = None;

        if w == 0 {
            self.ranges = Vec::new();
            self.targets = self.targets.as_ref().map(|_| Vec::new());
            self.keywords = self.keywords.as_ref().map(|_| Vec::new());
        } else {
            self.ranges.truncate(w);
            if let Some(targets) = &mut self.targets {
                targets.truncate(w);
            }
            if let Some(keywords) = &mut self.keywords {
                keywords.truncate(w);
            }
        }
        before - w
    }
}

impl std::fmt::Debug for RangeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeSet")
            .field("name", &self.name)
            .field("ranges", &self.ranges)
            .field("targets", &self.targets)
            .field("keywords", &self.keywords)
            .field("sort_index", &self.sort_index)
            .finish_non_exhaustive()
    }
}
