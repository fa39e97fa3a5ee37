//! Token string canonicalization for sort comparisons.
//!
//! Sort keys may be compared with case and/or diacritics folded away. The
//! folding operates character by character: a character maps to exactly one
//! character, so folded strings are compared without allocating. Characters
//! whose case mapping expands into several code points are left unchanged.

use std::{borrow::Cow, cmp::Ordering};

use bitflags::bitflags;

bitflags! {
    /// Normalizations applied to token strings before comparison.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NormalizationFlags: u32 {
        /// Ignore case differences (`%c`).
        const IGNORE_CASE = 1;
        /// Ignore diacritics on Latin letters (`%d`).
        const IGNORE_DIACRITICS = 2;
    }
}

/// Canonicalization rules for token strings.
///
/// The default methods are expressed in terms of [`TextNormalizer::fold_char`],
/// so an implementation only has to describe how a single character folds.
pub trait TextNormalizer: Send + Sync {
    /// Maps a character to its canonical form under `flags`.
    fn fold_char(&self, c: char, flags: NormalizationFlags) -> char;

    /// Returns `s` with every character folded under `flags`.
    fn normalize<'a>(&self, s: &'a str, flags: NormalizationFlags) -> Cow<'a, str> {
        if flags.is_empty() || s.chars().all(|c| self.fold_char(c, flags) == c) {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(s.chars().map(|c| self.fold_char(c, flags)).collect())
        }
    }

    /// Returns `s` with its characters in reverse order.
    fn reverse(&self, s: &str) -> String {
        s.chars().rev().collect()
    }

    /// Compares two strings after folding.
    ///
    /// With `reversed`, the strings are compared from their last character
    /// backwards, which orders tokens by their endings.
    fn compare(
        &self,
        lhs: &str,
        rhs: &str,
        flags: NormalizationFlags,
        reversed: bool,
    ) -> Ordering {
        match (flags.is_empty(), reversed) {
            (true, false) => lhs.cmp(rhs),
            (true, true) => compare_chars(lhs.chars().rev(), rhs.chars().rev(), char::cmp),
            (false, false) => compare_chars(lhs.chars(), rhs.chars(), |&l, &r| {
                self.fold_char(l, flags).cmp(&self.fold_char(r, flags))
            }),
            (false, true) => compare_chars(lhs.chars().rev(), rhs.chars().rev(), |&l, &r| {
                self.fold_char(l, flags).cmp(&self.fold_char(r, flags))
            }),
        }
    }
}

/// Unicode case folding and Latin diacritic folding.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNormalizer;

impl TextNormalizer for DefaultNormalizer {
    fn fold_char(&self, c: char, flags: NormalizationFlags) -> char {
        let c = if flags.contains(NormalizationFlags::IGNORE_CASE) {
            to_upper(c)
        } else {
            c
        };
        if flags.contains(NormalizationFlags::IGNORE_DIACRITICS) {
            strip_diacritic(c)
        } else {
            c
        }
    }
}

/// Converts a character into its upper case variant, ignoring the special
/// casing characters (those that expand into several code points when upper
/// cased), which are returned unchanged.
///
/// 'ß' (lower Eszett) maps to 'ẞ' (upper Eszett).
fn to_upper(c: char) -> char {
    if c == 'ß' {
        'ẞ'
    } else if c.is_lowercase() {
        let mut uppercase_char = c.to_uppercase();
        match (uppercase_char.next(), uppercase_char.next()) {
            (Some(ch), None) => ch,
            _ => c,
        }
    } else {
        c
    }
}

/// Maps a precomposed Latin letter to its base letter.
fn strip_diacritic(c: char) -> char {
    if c.is_ascii() {
        return c;
    }
    match c {
        'À'..='Å' | 'Ā' | 'Ă' | 'Ą' => 'A',
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'Ç' | 'Ć' | 'Ĉ' | 'Ċ' | 'Č' => 'C',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'Ď' | 'Đ' => 'D',
        'ď' | 'đ' => 'd',
        'È'..='Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => 'E',
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => 'G',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'Ĥ' | 'Ħ' => 'H',
        'ĥ' | 'ħ' => 'h',
        'Ì'..='Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => 'I',
        'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'Ĵ' => 'J',
        'ĵ' => 'j',
        'Ķ' => 'K',
        'ķ' => 'k',
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => 'L',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' => 'N',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'Ò'..='Ö' | 'Ø' | 'Ō' | 'Ŏ' | 'Ő' => 'O',
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'Ŕ' | 'Ŗ' | 'Ř' => 'R',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => 'S',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'Ţ' | 'Ť' | 'Ŧ' => 'T',
        'ţ' | 'ť' | 'ŧ' => 't',
        'Ù'..='Ü' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => 'U',
        'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'Ŵ' => 'W',
        'ŵ' => 'w',
        'Ý' | 'Ŷ' | 'Ÿ' => 'Y',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'Ź' | 'Ż' | 'Ž' => 'Z',
        'ź' | 'ż' | 'ž' => 'z',
        _ => c,
    }
}

/// Compares two character sequences element by element using `cmp`.
///
/// A sequence that is a prefix of the other sorts first.
fn compare_chars<L, R, P>(mut lhs: L, mut rhs: R, cmp: P) -> Ordering
where
    L: Iterator<Item = char>,
    R: Iterator<Item = char>,
    P: Fn(&char, &char) -> Ordering,
{
    loop {
        let lch = match lhs.next() {
            None => {
                if rhs.next().is_none() {
                    return Ordering::Equal;
                } else {
                    return Ordering::Less;
                }
            }
            Some(val) => val,
        };
        let rch = match rhs.next() {
            None => return Ordering::Greater,
            Some(val) => val,
        };
        match cmp(&lch, &rch) {
            Ordering::Equal => (),
            non_eq => return non_eq,
        }
    }
}
