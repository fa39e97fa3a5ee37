//! Set operations on match lists.

use std::cmp::Ordering;

use cqp_common::{Cpos, Result, error::Error, verify_data};
use cqp_corpus::TokenAttribute;

use super::{MatchList, gaps::gaps};
use crate::interval::{Interval, try_with_capacity};

/// Operation selector for [`apply_setop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SetOp {
    /// `list1 ∪ list2`.
    Union,
    /// `list1 ∩ list2`.
    Intersection,
    /// Positions of the corpus not matched by `list1`.
    Complement,
    /// `list1` becomes a deep copy of `list2`.
    Identity,
    /// Drops consecutive duplicate entries of `list1`.
    Uniq,
    /// Compacts deleted entries out of `list1`.
    Reduce,
}

impl SetOp {
    /// `true` for the operations that combine two lists.
    pub fn is_binary(&self) -> bool {
        matches!(self, SetOp::Union | SetOp::Intersection | SetOp::Identity)
    }
}

/// Applies `op` to `list1`, storing the result in `list1`.
///
/// `list2` is the second operand of the binary operations and must be `None`
/// for the others. `corpus` is the default token attribute of the active
/// corpus; it supplies the corpus size whenever a complement has to be
/// materialized, and may be `None` otherwise.
///
/// The result is computed separately and committed only on success: on error
/// `list1` is left unchanged.
pub fn apply_setop(
    list1: &mut MatchList,
    op: SetOp,
    list2: Option<&MatchList>,
    corpus: Option<&dyn TokenAttribute>,
) -> Result<()> {
    let result = match (op.is_binary(), list2) {
        (true, Some(list2)) => match op {
            SetOp::Union => union(list1, list2, corpus)?,
            SetOp::Intersection => intersection(list1, list2, corpus)?,
            _ => list2.clone(),
        },
        (true, None) => {
            return Err(Error::invalid_arg(
                "list2",
                format!("{op:?} requires a second operand"),
            ));
        }
        (false, Some(_)) => {
            return Err(Error::invalid_arg(
                "list2",
                format!("{op:?} takes no second operand"),
            ));
        }
        (false, None) => match op {
            SetOp::Complement => complement(list1, corpus)?,
            SetOp::Uniq => uniq(list1)?,
            _ => reduce(list1)?,
        },
    };
    log::trace!(
        "setop {op:?}: {} entries (inverted: {})",
        result.len(),
        result.inverted
    );
    *list1 = result;
    Ok(())
}

fn union(a: &MatchList, b: &MatchList, corpus: Option<&dyn TokenAttribute>) -> Result<MatchList> {
    if (a.is_empty() && a.inverted) || (b.is_empty() && b.inverted) {
        return Ok(MatchList::everything());
    }
    if a.is_empty() {
        return Ok(b.clone());
    }
    if b.is_empty() {
        return Ok(a.clone());
    }
    match (a.inverted, b.inverted) {
        (true, true) => {
            // ¬A ∪ ¬B = ¬(A ∩ B)
            let mut result = merge_intersection(a, b)?;
            result.inverted = true;
            Ok(result)
        }
        (true, false) => merge_union(&materialize(a, corpus)?, b),
        (false, true) => merge_union(a, &materialize(b, corpus)?),
        (false, false) => merge_union(a, b),
    }
}

fn intersection(
    a: &MatchList,
    b: &MatchList,
    corpus: Option<&dyn TokenAttribute>,
) -> Result<MatchList> {
    if (a.is_empty() && !a.inverted) || (b.is_empty() && !b.inverted) {
        return Ok(MatchList::new());
    }
    if a.is_empty() {
        return Ok(b.clone());
    }
    if b.is_empty() {
        return Ok(a.clone());
    }
    match (a.inverted, b.inverted) {
        (true, true) => {
            // ¬A ∩ ¬B = ¬(A ∪ B)
            let mut result = merge_union(a, b)?;
            result.inverted = true;
            Ok(result)
        }
        (true, false) => merge_intersection(&materialize(a, corpus)?, b),
        (false, true) => merge_intersection(a, &materialize(b, corpus)?),
        (false, false) => merge_intersection(a, b),
    }
}

/// Entry order used by the merges: ascending start, then ascending end.
#[inline]
fn merge_order(a: &Interval, b: &Interval) -> Ordering {
    a.start.cmp(&b.start).then(a.end.cmp(&b.end))
}

fn merge_union(a: &MatchList, b: &MatchList) -> Result<MatchList> {
    let mut out = ListBuilder::with_capacity(
        a.len() + b.len(),
        a.end.is_some() || b.end.is_some(),
        a.target.is_some() && b.target.is_some(),
        a.keyword.is_some() && b.keyword.is_some(),
    )?;

    let mut i = a.skip_deleted(0);
    let mut j = b.skip_deleted(0);
    while i < a.len() && j < b.len() {
        match merge_order(&a.interval(i), &b.interval(j)) {
            Ordering::Less => {
                out.push_from(a, i);
                i = a.skip_deleted(i + 1);
            }
            Ordering::Greater => {
                out.push_from(b, j);
                j = b.skip_deleted(j + 1);
            }
            Ordering::Equal => {
                out.push_from(a, i);
                i = a.skip_deleted(i + 1);
                j = b.skip_deleted(j + 1);
            }
        }
    }
    while i < a.len() {
        out.push_from(a, i);
        i = a.skip_deleted(i + 1);
    }
    while j < b.len() {
        out.push_from(b, j);
        j = b.skip_deleted(j + 1);
    }
    Ok(out.finish())
}

fn merge_intersection(a: &MatchList, b: &MatchList) -> Result<MatchList> {
    let mut out = ListBuilder::with_capacity(
        a.len().min(b.len()),
        a.end.is_some() || b.end.is_some(),
        a.target.is_some(),
        a.keyword.is_some(),
    )?;

    let mut i = a.skip_deleted(0);
    let mut j = b.skip_deleted(0);
    while i < a.len() && j < b.len() {
        match merge_order(&a.interval(i), &b.interval(j)) {
            Ordering::Less => i = a.skip_deleted(i + 1),
            Ordering::Greater => j = b.skip_deleted(j + 1),
            Ordering::Equal => {
                out.push_from(a, i);
                i = a.skip_deleted(i + 1);
                j = b.skip_deleted(j + 1);
            }
        }
    }
    Ok(out.finish())
}

fn complement(list: &MatchList, corpus: Option<&dyn TokenAttribute>) -> Result<MatchList> {
    if list.inverted {
        let mut result = list.clone();
        result.inverted = false;
        result.whole_corpus = false;
        return Ok(result);
    }
    complement_entries(list, corpus)
}

/// Turns an inverted operand into the explicit list of what it denotes.
fn materialize(list: &MatchList, corpus: Option<&dyn TokenAttribute>) -> Result<MatchList> {
    debug_assert!(list.inverted);
    complement_entries(list, corpus)
}

/// Computes the corpus positions (or maximal gaps, for interval lists) not
/// covered by the listed entries, ignoring the `inverted` flag.
fn complement_entries(list: &MatchList, corpus: Option<&dyn TokenAttribute>) -> Result<MatchList> {
    let corpus = corpus.ok_or_else(|| {
        Error::precondition("complement requires the default token attribute of the corpus")
    })?;
    if list.target.is_some() || list.keyword.is_some() {
        return Err(Error::precondition(
            "complement of a match list with target or keyword anchors",
        ));
    }

    let size = corpus.size().max(0);
    let live = list.start.iter().filter(|&&s| s >= 0).count();
    let whole_corpus = live == 0;

    let result = if list.is_initial() {
        let mut positions = try_with_capacity::<Cpos>((size as usize).saturating_sub(live))?;
        positions.extend(gaps(size, list.intervals()).flat_map(|gap| gap.start..=gap.end));
        if whole_corpus {
            verify_data!(positions, positions.len() == size as usize);
        }
        MatchList {
            start: positions,
            whole_corpus,
            ..Default::default()
        }
    } else {
        let mut start = Vec::new();
        let mut end = Vec::new();
        for gap in gaps(size, list.intervals()) {
            start.push(gap.start);
            end.push(gap.end);
        }
        MatchList {
            start,
            end: Some(end),
            whole_corpus,
            ..Default::default()
        }
    };
    log::debug!(
        "complement over {size} positions: {} entries -> {} entries",
        list.len(),
        result.len()
    );
    Ok(result)
}

fn uniq(list: &MatchList) -> Result<MatchList> {
    let mut out = ListBuilder::like(list)?;
    let mut last: Option<Interval> = None;
    for i in 0..list.len() {
        let r = list.interval(i);
        if r.is_deleted() {
            out.push_from(list, i);
            continue;
        }
        let duplicate = match last {
            Some(prev) if list.is_initial() => prev.start == r.start,
            Some(prev) => prev == r,
            None => false,
        };
        if !duplicate {
            out.push_from(list, i);
            last = Some(r);
        }
    }
    Ok(out.finish())
}

fn reduce(list: &MatchList) -> Result<MatchList> {
    let mut out = ListBuilder::like(list)?;
    for i in 0..list.len() {
        if !list.is_deleted(i) {
            out.push_from(list, i);
        }
    }
    Ok(out.finish())
}

/// Accumulates the parallel vectors of a result list.
struct ListBuilder {
    start: Vec<Cpos>,
    end: Option<Vec<Cpos>>,
    target: Option<Vec<Cpos>>,
    keyword: Option<Vec<Cpos>>,
}

impl ListBuilder {
    fn with_capacity(
        capacity: usize,
        with_end: bool,
        with_target: bool,
        with_keyword: bool,
    ) -> Result<ListBuilder> {
        let column = |present: bool| -> Result<Option<Vec<Cpos>>> {
            if present {
                Ok(Some(try_with_capacity(capacity)?))
            } else {
                Ok(None)
            }
        };
        Ok(ListBuilder {
            start: try_with_capacity(capacity)?,
            end: column(with_end)?,
            target: column(with_target)?,
            keyword: column(with_keyword)?,
        })
    }

    fn like(list: &MatchList) -> Result<ListBuilder> {
        ListBuilder::with_capacity(
            list.len(),
            list.end.is_some(),
            list.target.is_some(),
            list.keyword.is_some(),
        )
    }

    /// Appends entry `i` of `src`. Anchor columns the builder carries must be
    /// present in `src`.
    fn push_from(&mut self, src: &MatchList, i: usize) {
        let r = src.interval(i);
        self.start.push(r.start);
        if let Some(end) = &mut self.end {
            end.push(r.end);
        }
        if let (Some(dst), Some(col)) = (&mut self.target, &src.target) {
            dst.push(col[i]);
        }
        if let (Some(dst), Some(col)) = (&mut self.keyword, &src.keyword) {
            dst.push(col[i]);
        }
    }

    fn finish(self) -> MatchList {
        fn fit(mut v: Vec<Cpos>) -> Vec<Cpos> {
            if v.is_empty() {
                return Vec::new();
            }
            v.shrink_to_fit();
            v
        }
        MatchList {
            start: fit(self.start),
            end: self.end.map(fit),
            target: self.target.map(fit),
            keyword: self.keyword.map(fit),
            whole_corpus: false,
            inverted: false,
        }
    }
}
