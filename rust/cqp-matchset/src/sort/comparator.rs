//! Token-window comparison shared by sorting and counting.

use std::cmp::Ordering;

use cqp_common::{Cpos, Result, error::Error};
use cqp_corpus::{NormalizationFlags, TextNormalizer, TokenAttribute, TokenId};

use super::{clause::SortClause, interrupt::InterruptFlag};
use crate::{interval::try_with_capacity, range_set::RangeSet};

/// The tokens of one entry that take part in the comparison, in walk order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Window {
    first: Cpos,
    len: usize,
    step: Cpos,
}

impl Window {
    const EMPTY: Window = Window {
        first: 0,
        len: 0,
        step: 1,
    };

    #[inline]
    fn position(&self, k: usize) -> Cpos {
        self.first + self.step * k as Cpos
    }
}

/// Number of leading window positions whose ids are cached per entry.
const CACHED_POSITIONS: usize = 2;

/// State of one sort or count call.
///
/// Resolves every entry's window up front and optionally caches the token
/// ids of its first positions. Comparisons fail once the interrupt flag is
/// cleared, so a sort driven by [`SortContext::compare`] stops early.
pub(crate) struct SortContext<'a> {
    operation: &'static str,
    attribute: &'a dyn TokenAttribute,
    normalizer: &'a dyn TextNormalizer,
    interrupt: &'a InterruptFlag,
    descending: bool,
    reverse: bool,
    flags: NormalizationFlags,
    break_ties: bool,
    windows: Vec<Window>,
    id_cache: Option<Vec<TokenId>>,
}

impl<'a> SortContext<'a> {
    pub(crate) fn new(
        operation: &'static str,
        set: &RangeSet,
        clause: &SortClause,
        attribute: &'a dyn TokenAttribute,
        normalizer: &'a dyn TextNormalizer,
        interrupt: &'a InterruptFlag,
        cache_ids: bool,
    ) -> Result<SortContext<'a>> {
        let size = attribute.size();
        let mut windows = try_with_capacity(set.len())?;
        windows.extend((0..set.len()).map(|i| resolve_window(set, clause, i, size)));

        let id_cache = if cache_ids {
            let mut cache = try_with_capacity(CACHED_POSITIONS * windows.len())?;
            for w in &windows {
                for k in 0..CACHED_POSITIONS {
                    let id = if k < w.len {
                        attribute.cpos_to_id(w.position(k))?
                    } else {
                        -1
                    };
                    cache.push(id);
                }
            }
            Some(cache)
        } else {
            None
        };

        Ok(SortContext {
            operation,
            attribute,
            normalizer,
            interrupt,
            descending: clause.descending,
            reverse: clause.reverse,
            flags: clause.flags,
            break_ties: clause.break_ties,
            windows,
            id_cache,
        })
    }

    /// Compares entries `a` and `b` under the clause.
    ///
    /// Fails with `Interrupted` once the interrupt flag is cleared, and with
    /// the attribute's error when a token lookup fails.
    pub(crate) fn compare(&self, a: usize, b: usize) -> Result<Ordering> {
        self.check_interrupt()?;
        let mut ord = self.compare_windows(a, b, self.flags)?;
        if ord == Ordering::Equal && self.break_ties && !self.flags.is_empty() {
            ord = self.compare_windows(a, b, NormalizationFlags::empty())?;
        }
        Ok(if self.descending { ord.reverse() } else { ord })
    }

    fn compare_windows(&self, a: usize, b: usize, flags: NormalizationFlags) -> Result<Ordering> {
        let (wa, wb) = (self.windows[a], self.windows[b]);
        for k in 0..wa.len.min(wb.len) {
            let (ia, ib) = (self.id_at(a, k)?, self.id_at(b, k)?);
            if ia == ib {
                continue;
            }
            let sa = self.attribute.id_to_str(ia)?;
            let sb = self.attribute.id_to_str(ib)?;
            let ord = self.normalizer.compare(sa, sb, flags, self.reverse);
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(wa.len.cmp(&wb.len))
    }

    #[inline]
    fn id_at(&self, i: usize, k: usize) -> Result<TokenId> {
        if let Some(cache) = self.id_cache.as_ref().filter(|_| k < CACHED_POSITIONS) {
            return Ok(cache[i * CACHED_POSITIONS + k]);
        }
        self.attribute.cpos_to_id(self.windows[i].position(k))
    }

    /// Token strings of entry `i`'s window, in walk order or, with
    /// `corpus_order`, in ascending corpus order.
    pub(crate) fn tokens(&self, i: usize, corpus_order: bool) -> Result<Vec<&'a str>> {
        let w = self.windows[i];
        let mut tokens = try_with_capacity(w.len)?;
        for k in 0..w.len {
            tokens.push(self.attribute.cpos_to_str(w.position(k))?);
        }
        if corpus_order && w.step < 0 {
            tokens.reverse();
        }
        Ok(tokens)
    }

    /// The line-sortable key of entry `i`: window tokens in walk order joined
    /// by spaces, each token reversed for a reverse clause. Tabs and line
    /// breaks inside tokens are replaced by spaces.
    pub(crate) fn key_text(&self, i: usize) -> Result<String> {
        let mut key = String::new();
        for (k, token) in self.tokens(i, false)?.into_iter().enumerate() {
            if k > 0 {
                key.push(' ');
            }
            let token = if self.reverse {
                std::borrow::Cow::Owned(self.normalizer.reverse(token))
            } else {
                std::borrow::Cow::Borrowed(token)
            };
            key.extend(token.chars().map(|c| match c {
                '\t' | '\n' | '\r' => ' ',
                c => c,
            }));
        }
        Ok(key)
    }

    pub(crate) fn check_interrupt(&self) -> Result<()> {
        if self.interrupt.is_running() {
            Ok(())
        } else {
            Err(Error::interrupted(self.operation))
        }
    }
}

/// Resolves and clamps the window of entry `i`.
///
/// An undefined anchor, an empty corpus, or a start beyond the end yields an
/// empty window.
fn resolve_window(set: &RangeSet, clause: &SortClause, i: usize, size: Cpos) -> Window {
    let (Some(start), Some(end)) = (clause.start.resolve(set, i), clause.end.resolve(set, i))
    else {
        return Window::EMPTY;
    };
    if size <= 0 {
        return Window::EMPTY;
    }
    let start = start.clamp(0, size - 1);
    let end = end.clamp(0, size - 1);
    if start > end {
        return Window::EMPTY;
    }
    let len = (end - start) as usize + 1;
    if clause.reverse {
        Window {
            first: end,
            len,
            step: -1,
        }
    } else {
        Window {
            first: start,
            len,
            step: 1,
        }
    }
}
