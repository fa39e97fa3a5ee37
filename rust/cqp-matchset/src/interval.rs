//! Corpus-position intervals.

use std::cmp::Ordering;

use cqp_common::{Cpos, Result, error::Error};

/// An inclusive span `[start, end]` of corpus positions.
///
/// An interval whose `start` is negative is a tombstone: it has been deleted
/// and is waiting to be compacted out by a reduce pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: Cpos,
    pub end: Cpos,
}

impl Interval {
    /// The canonical deleted interval.
    pub const TOMBSTONE: Interval = Interval { start: -1, end: -1 };

    #[inline]
    pub const fn new(start: Cpos, end: Cpos) -> Interval {
        Interval { start, end }
    }

    /// A single-position interval.
    #[inline]
    pub const fn at(pos: Cpos) -> Interval {
        Interval {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.start < 0
    }

    #[inline]
    pub fn delete(&mut self) {
        *self = Interval::TOMBSTONE;
    }

    /// Number of positions covered.
    #[inline]
    pub fn len(&self) -> usize {
        if self.is_deleted() || self.end < self.start {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `other` lies within `self`.
    #[inline]
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Checks that the interval is a valid live span.
    pub fn validate(&self) -> Result<()> {
        if self.start < 0 || self.end < self.start {
            return Err(Error::invalid_arg(
                "interval",
                format!("({}, {}) is not a valid span", self.start, self.end),
            ));
        }
        Ok(())
    }
}

impl From<(Cpos, Cpos)> for Interval {
    fn from((start, end): (Cpos, Cpos)) -> Self {
        Interval { start, end }
    }
}

/// Canonical range set order: ascending start, ties by descending end.
///
/// For equal starts the longer interval sorts first, which the containment
/// scans of the disambiguation strategies depend on.
#[inline]
pub fn canonical_order(a: &Interval, b: &Interval) -> Ordering {
    a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end))
}

/// Allocates an empty vector able to hold `capacity` items, reporting
/// allocation failure as an error.
pub(crate) fn try_with_capacity<T>(capacity: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tombstone() {
        let mut i = Interval::new(3, 7);
        assert!(!i.is_deleted());
        assert_eq!(i.len(), 5);
        i.delete();
        assert!(i.is_deleted());
        assert_eq!(i, Interval::TOMBSTONE);
        assert!(i.is_empty());
    }

    #[test]
    fn test_canonical_order_prefers_longer_on_equal_start() {
        let mut v = vec![Interval::new(0, 2), Interval::new(3, 4), Interval::new(0, 5)];
        v.sort_by(canonical_order);
        assert_eq!(
            v,
            vec![Interval::new(0, 5), Interval::new(0, 2), Interval::new(3, 4)]
        );
    }

    #[test]
    fn test_validate() {
        assert!(Interval::new(0, 0).validate().is_ok());
        assert!(Interval::new(2, 1).validate().is_err());
        assert!(Interval::TOMBSTONE.validate().is_err());
    }
}
