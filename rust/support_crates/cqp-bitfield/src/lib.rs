//! Selection masks over the entries of a match set.
//!
//! A [`Bitfield`] holds one bit per entry of a range set (its "element
//! count"). Hosts use it to mark lines for deletion, and the range set union
//! uses it as a restrictor that gates which entries of the second operand are
//! eligible for inclusion.

pub mod bitfield;

pub use bitfield::{Bitfield, BitfieldIter};
