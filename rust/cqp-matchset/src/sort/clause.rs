//! Sort clauses: which tokens of an entry are compared, and how.

use cqp_common::{Cpos, Result, error::Error};
use cqp_corpus::NormalizationFlags;

use crate::range_set::RangeSet;

/// Position of an entry a sort window is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    MatchStart,
    MatchEnd,
    Keyword,
    Target,
}

/// An anchor plus a token offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnchorPoint {
    pub anchor: Anchor,
    pub offset: Cpos,
}

impl AnchorPoint {
    pub const fn new(anchor: Anchor, offset: Cpos) -> AnchorPoint {
        AnchorPoint { anchor, offset }
    }

    /// Resolves the anchor for entry `i` of `set`.
    ///
    /// Returns `None` if the anchor is undefined for that entry (negative
    /// target or keyword) or the set lacks the anchor vector.
    pub fn resolve(&self, set: &RangeSet, i: usize) -> Option<Cpos> {
        let base = match self.anchor {
            Anchor::MatchStart => set.range(i).start,
            Anchor::MatchEnd => set.range(i).end,
            Anchor::Keyword => set.keyword(i)?,
            Anchor::Target => set.target(i)?,
        };
        (base >= 0).then(|| base.saturating_add(self.offset))
    }
}

/// Describes one sort key: the token window of each entry, compared on some
/// attribute.
///
/// The default clause compares the matched tokens (`match` to `matchend`) in
/// ascending order, without normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortClause {
    pub start: AnchorPoint,
    pub end: AnchorPoint,
    pub descending: bool,
    /// Walk the window from its end backward and compare strings reversed
    /// (sorting by suffix).
    pub reverse: bool,
    pub flags: NormalizationFlags,
    /// Break ties of a normalized comparison with an unnormalized one.
    pub break_ties: bool,
}

impl Default for SortClause {
    fn default() -> Self {
        SortClause {
            start: AnchorPoint::new(Anchor::MatchStart, 0),
            end: AnchorPoint::new(Anchor::MatchEnd, 0),
            descending: false,
            reverse: false,
            flags: NormalizationFlags::empty(),
            break_ties: false,
        }
    }
}

impl SortClause {
    pub fn new() -> SortClause {
        SortClause::default()
    }

    /// Sets the window bounds.
    pub fn window(mut self, start: AnchorPoint, end: AnchorPoint) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn flags(mut self, flags: NormalizationFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn break_ties(mut self, break_ties: bool) -> Self {
        self.break_ties = break_ties;
        self
    }

    /// Checks that every anchor the clause refers to exists in `set`.
    pub fn validate(&self, set: &RangeSet) -> Result<()> {
        for point in [self.start, self.end] {
            let missing = match point.anchor {
                Anchor::Keyword => set.keywords().is_none(),
                Anchor::Target => set.targets().is_none(),
                _ => false,
            };
            if missing {
                return Err(Error::precondition(format!(
                    "range set {} has no {:?} anchors to sort on",
                    set.name(),
                    point.anchor
                )));
            }
        }
        Ok(())
    }

    /// Whether the comparison applies any normalization.
    pub(crate) fn normalized(&self) -> bool {
        !self.flags.is_empty()
    }
}
