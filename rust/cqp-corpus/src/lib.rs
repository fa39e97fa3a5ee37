//! Corpus-side services consumed by the match-set engine.
//!
//! The engine never loads or stores corpus data itself. It talks to the corpus
//! through a small set of contracts:
//!
//! - [`TokenAttribute`]: position-to-id and id-to-string lookups on a token
//!   attribute, plus the corpus size used for complements and clamping.
//! - [`TextNormalizer`]: canonicalization of token strings (case and
//!   diacritic folding, reversal) for sort comparisons.
//!
//! [`InMemoryAttribute`] is a dictionary-encoded token stream that satisfies the
//! attribute contract for embedding hosts and tests.

pub mod attribute;
pub mod memory;
pub mod normalize;

pub use attribute::{TokenAttribute, TokenId};
pub use memory::InMemoryAttribute;
pub use normalize::{DefaultNormalizer, NormalizationFlags, TextNormalizer};
