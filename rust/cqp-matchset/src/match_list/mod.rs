//! Match lists: in-flight query results.
//!
//! A [`MatchList`] stores matches as parallel vectors: `start` positions, and
//! optionally `end`, `target` and `keyword` positions. A list without end
//! positions is an *initial* list of single positions. A list may be
//! *inverted*, in which case it denotes every corpus position except the
//! listed ones; the complement is only materialized when an operation needs
//! it.

mod gaps;
pub mod set_ops;

use cqp_common::{Cpos, Result, verify_arg};

use crate::interval::Interval;

pub use gaps::{Gaps, gaps};
pub use set_ops::{SetOp, apply_setop};

/// A possibly inverted list of matches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchList {
    pub(crate) start: Vec<Cpos>,
    pub(crate) end: Option<Vec<Cpos>>,
    pub(crate) target: Option<Vec<Cpos>>,
    pub(crate) keyword: Option<Vec<Cpos>>,
    pub(crate) whole_corpus: bool,
    pub(crate) inverted: bool,
}

impl MatchList {
    /// Creates an empty, non-inverted list of single positions.
    pub fn new() -> MatchList {
        MatchList::default()
    }

    /// Creates the inverted empty list, which denotes the whole corpus.
    pub fn everything() -> MatchList {
        MatchList {
            inverted: true,
            ..Default::default()
        }
    }

    /// Creates an initial list of single corpus positions.
    pub fn from_positions(positions: Vec<Cpos>) -> MatchList {
        MatchList {
            start: positions,
            ..Default::default()
        }
    }

    /// Creates a list of intervals from parallel start and end vectors.
    pub fn from_spans(start: Vec<Cpos>, end: Vec<Cpos>) -> Result<MatchList> {
        verify_arg!(end, end.len() == start.len());
        Ok(MatchList {
            start,
            end: Some(end),
            ..Default::default()
        })
    }

    /// Creates a list of intervals.
    pub fn from_intervals(intervals: impl IntoIterator<Item = Interval>) -> MatchList {
        let (start, end) = intervals.into_iter().map(|r| (r.start, r.end)).unzip();
        MatchList {
            start,
            end: Some(end),
            ..Default::default()
        }
    }

    /// Attaches a target anchor per match.
    pub fn with_targets(mut self, target: Vec<Cpos>) -> Result<MatchList> {
        verify_arg!(target, target.len() == self.start.len());
        self.target = Some(target);
        Ok(self)
    }

    /// Attaches a keyword anchor per match.
    pub fn with_keywords(mut self, keyword: Vec<Cpos>) -> Result<MatchList> {
        verify_arg!(keyword, keyword.len() == self.start.len());
        self.keyword = Some(keyword);
        Ok(self)
    }

    /// Marks the list as inverted (denoting the complement of its entries).
    pub fn invert(mut self) -> MatchList {
        self.inverted = !self.inverted;
        self.whole_corpus = false;
        self
    }

    /// Number of listed entries (tombstones included).
    #[inline]
    pub fn len(&self) -> usize {
        self.start.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.is_empty()
    }

    /// `true` if the list holds single positions only.
    #[inline]
    pub fn is_initial(&self) -> bool {
        self.end.is_none()
    }

    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// `true` if the list is known to cover the whole corpus without gaps.
    ///
    /// The flag is advisory; `false` does not prove the opposite.
    #[inline]
    pub fn is_whole_corpus(&self) -> bool {
        self.whole_corpus
    }

    pub fn starts(&self) -> &[Cpos] {
        &self.start
    }

    pub fn ends(&self) -> Option<&[Cpos]> {
        self.end.as_deref()
    }

    pub fn targets(&self) -> Option<&[Cpos]> {
        self.target.as_deref()
    }

    pub fn keywords(&self) -> Option<&[Cpos]> {
        self.keyword.as_deref()
    }

    /// Returns the span of entry `i`; single positions yield `(p, p)`.
    #[inline]
    pub fn interval(&self, i: usize) -> Interval {
        let start = self.start[i];
        match &self.end {
            Some(end) => Interval::new(start, end[i]),
            None => Interval::at(start),
        }
    }

    /// Iterates over the spans of all entries, tombstones included.
    pub fn intervals(&self) -> impl Iterator<Item = Interval> + '_ {
        (0..self.len()).map(|i| self.interval(i))
    }

    /// Marks entry `i` as deleted; a later [`SetOp::Reduce`] removes it.
    pub fn delete(&mut self, i: usize) {
        self.start[i] = -1;
        if let Some(end) = &mut self.end {
            end[i] = -1;
        }
        self.whole_corpus = false;
    }

    /// `true` if entry `i` is a tombstone.
    #[inline]
    pub fn is_deleted(&self, i: usize) -> bool {
        self.start[i] < 0
    }

    /// Index of the first live entry at or after `i`.
    #[inline]
    pub(crate) fn skip_deleted(&self, mut i: usize) -> usize {
        while i < self.len() && self.is_deleted(i) {
            i += 1;
        }
        i
    }
}
