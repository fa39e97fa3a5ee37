//! Token attribute contract.

use cqp_common::{Cpos, Result};

/// Interned dictionary id of a token string.
pub type TokenId = i32;

/// Read access to a positional token attribute (e.g. `word` or `lemma`).
///
/// Every corpus position `0..size()` carries exactly one token id, and every
/// id maps to exactly one string. Two positions with equal ids therefore have
/// equal strings, which the sort comparator relies on to skip string
/// comparisons.
pub trait TokenAttribute {
    /// Name of the attribute.
    fn name(&self) -> &str;

    /// Number of corpus positions (one past the maximum corpus position).
    fn size(&self) -> Cpos;

    /// Number of distinct token strings.
    fn lexicon_size(&self) -> usize;

    /// Returns the token id at `cpos`.
    fn cpos_to_id(&self, cpos: Cpos) -> Result<TokenId>;

    /// Returns the string of token id `id`.
    fn id_to_str(&self, id: TokenId) -> Result<&str>;

    /// Returns the token string at `cpos`.
    fn cpos_to_str(&self, cpos: Cpos) -> Result<&str> {
        self.id_to_str(self.cpos_to_id(cpos)?)
    }

    /// Maximum valid corpus position, `-1` for an empty corpus.
    fn max_cpos(&self) -> Cpos {
        self.size() - 1
    }
}
