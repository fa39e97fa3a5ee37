//! Dictionary-encoded in-memory token attribute.

use ahash::AHashMap;
use cqp_common::{Cpos, Result, error::Error};

use crate::attribute::{TokenAttribute, TokenId};

/// A token attribute held entirely in memory.
///
/// Tokens are interned in first-seen order, so the id of a string is the
/// number of distinct strings that occurred before its first occurrence.
#[derive(Clone, Debug)]
pub struct InMemoryAttribute {
    name: String,
    ids: Vec<TokenId>,
    lexicon: Vec<String>,
    lookup: AHashMap<String, TokenId>,
}

impl InMemoryAttribute {
    /// Creates an empty attribute.
    pub fn new(name: impl Into<String>) -> InMemoryAttribute {
        InMemoryAttribute {
            name: name.into(),
            ids: Vec::new(),
            lexicon: Vec::new(),
            lookup: AHashMap::new(),
        }
    }

    /// Builds an attribute from a token sequence.
    pub fn from_tokens<'a>(
        name: impl Into<String>,
        tokens: impl IntoIterator<Item = &'a str>,
    ) -> InMemoryAttribute {
        let mut attribute = InMemoryAttribute::new(name);
        for token in tokens {
            attribute.push(token);
        }
        attribute
    }

    /// Builds an attribute from whitespace-separated text.
    pub fn from_text(name: impl Into<String>, text: &str) -> InMemoryAttribute {
        InMemoryAttribute::from_tokens(name, text.split_whitespace())
    }

    /// Appends a token at the next corpus position and returns its id.
    pub fn push(&mut self, token: &str) -> TokenId {
        let id = match self.lookup.get(token) {
            Some(&id) => id,
            None => {
                let id = self.lexicon.len() as TokenId;
                self.lexicon.push(token.to_string());
                self.lookup.insert(token.to_string(), id);
                id
            }
        };
        self.ids.push(id);
        id
    }

    /// Returns the id of `token`, if it occurs in the attribute.
    pub fn str_to_id(&self, token: &str) -> Option<TokenId> {
        self.lookup.get(token).copied()
    }
}

impl TokenAttribute for InMemoryAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> Cpos {
        self.ids.len() as Cpos
    }

    fn lexicon_size(&self) -> usize {
        self.lexicon.len()
    }

    fn cpos_to_id(&self, cpos: Cpos) -> Result<TokenId> {
        usize::try_from(cpos)
            .ok()
            .and_then(|i| self.ids.get(i).copied())
            .ok_or_else(|| {
                Error::invalid_arg(
                    "cpos",
                    format!("{cpos} outside of attribute '{}' (size {})", self.name, self.ids.len()),
                )
            })
    }

    fn id_to_str(&self, id: TokenId) -> Result<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.lexicon.get(i))
            .map(String::as_str)
            .ok_or_else(|| {
                Error::invalid_arg(
                    "id",
                    format!("{id} not in lexicon of attribute '{}'", self.name),
                )
            })
    }
}
