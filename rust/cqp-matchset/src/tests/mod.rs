mod count_tests;
mod sort_tests;

use cqp_corpus::InMemoryAttribute;

/// A corpus of `n` tokens `t0 t1 ...`, all distinct.
pub(crate) fn distinct_corpus(n: usize) -> InMemoryAttribute {
    let tokens: Vec<String> = (0..n).map(|i| format!("t{i}")).collect();
    InMemoryAttribute::from_tokens("word", tokens.iter().map(String::as_str))
}
