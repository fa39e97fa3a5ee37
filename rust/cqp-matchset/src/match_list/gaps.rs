//! Uncovered stretches of the corpus.

use std::iter::Peekable;

use cqp_common::Cpos;

use crate::interval::Interval;

/// Returns an iterator over the maximal intervals of `[0, size)` that are not
/// covered by `covered`.
///
/// `covered` is expected in ascending order of `start`. Overlapping or
/// adjacent intervals are coalesced on the fly; tombstones, intervals that lie
/// behind the cursor, and positions at or beyond `size` are skipped.
///
/// O(n) over the input, constant extra memory.
pub fn gaps<I>(size: Cpos, covered: I) -> Gaps<I::IntoIter>
where
    I: IntoIterator<Item = Interval>,
{
    Gaps {
        it: covered.into_iter().peekable(),
        size,
        cursor: 0,
    }
}

/// Iterator adapter implementing [`gaps`].
pub struct Gaps<I>
where
    I: Iterator<Item = Interval>,
{
    it: Peekable<I>,
    size: Cpos,
    /// First position not yet known to be covered or emitted.
    cursor: Cpos,
}

impl<I> Iterator for Gaps<I>
where
    I: Iterator<Item = Interval>,
{
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        loop {
            if self.cursor >= self.size {
                return None;
            }

            let Some(r) = self.it.peek().copied() else {
                // tail gap
                let gap = Interval::new(self.cursor, self.size - 1);
                self.cursor = self.size;
                return Some(gap);
            };

            if r.is_deleted() || r.end < r.start || r.end < self.cursor {
                self.it.next();
                continue;
            }

            if r.start > self.cursor {
                let gap_end = r.start.min(self.size);
                let gap = Interval::new(self.cursor, gap_end - 1);
                self.cursor = gap_end;
                return Some(gap);
            }

            // r.start <= cursor <= r.end
            self.cursor = self.cursor.max(r.end.saturating_add(1));
            self.it.next();
        }
    }
}
