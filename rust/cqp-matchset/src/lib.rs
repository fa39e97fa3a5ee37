//! Match-set and subcorpus algebra.
//!
//! Query results are ordered collections of corpus-position intervals. This
//! crate provides the two representations they live in and the operations
//! defined on them:
//!
//! - [`MatchList`]: the lightweight, possibly inverted result of query
//!   evaluation, combined with [`match_list::apply_setop`] (union,
//!   intersection, complement, identity, uniq, reduce).
//! - [`RangeSet`]: a materialized result bound to a named subcorpus, combined
//!   and disambiguated with [`range_set::apply_range_setop`] and put into
//!   canonical order by [`range_set::range_sort`].
//! - [`sort`]: token-based sorting, randomized ordering, external sort
//!   delegation and frequency counting over a [`RangeSet`].
//!
//! All operations mutate their first operand in place and either commit the
//! whole result or leave the operand unchanged.
//!
//! # Example
//!
//! ```rust
//! use cqp_matchset::{Interval, RangeSet, RangeSetOp, range_set::apply_range_setop};
//!
//! let mut set = RangeSet::from_ranges("Last", [(0, 5), (1, 2), (6, 8)]).unwrap();
//! apply_range_setop(&mut set, RangeSetOp::MaximalMatches, None, None).unwrap();
//! assert_eq!(set.ranges(), &[Interval::new(0, 5), Interval::new(6, 8)]);
//! ```

pub mod interval;
pub mod match_list;
pub mod observer;
pub mod range_set;
pub mod sort;
#[cfg(test)]
mod tests;

pub use cqp_common::Cpos;
pub use interval::Interval;
pub use match_list::{MatchList, SetOp};
pub use observer::MutationObserver;
pub use range_set::{RangeSet, RangeSetOp};
