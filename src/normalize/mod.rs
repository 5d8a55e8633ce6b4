//! Input normalization.
//!
//! Canonicalizes unicode composition, digit/letter width, dash glyphs and
//! whitespace. Kanji numerals are left alone: only the stages that know
//! whether a numeral is part of a town name or a block number convert them.

pub mod kanji;

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use self::kanji::is_kanji_numeral;

/// The one separator every dash-like glyph folds to.
pub const SEPARATOR: char = '-';

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Glyphs that always mean "dash".
const DASHES: &[char] = &[
    '-', '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}',
    '\u{FF0D}', '\u{FE63}', '\u{FE58}', '\u{2043}', '\u{23AF}', '\u{23E4}', '\u{2500}',
    '\u{2501}',
];

/// Prolonged sound marks, which are dashes only next to numerals.
const LENGTH_MARKS: &[char] = &['\u{30FC}', '\u{FF70}'];

/// Normalize a raw address string.
///
/// Pure and idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(input: &str) -> String {
    let chars: Vec<char> = input.nfc().map(fold_width).collect();

    let mut out = String::with_capacity(input.len());
    for (i, &c) in chars.iter().enumerate() {
        let c = if DASHES.contains(&c) {
            SEPARATOR
        } else if LENGTH_MARKS.contains(&c) && length_mark_is_dash(&chars, i) {
            SEPARATOR
        } else {
            c
        };
        out.push(c);
    }

    WHITESPACE_RE.replace_all(out.trim(), " ").into_owned()
}

/// Fold full-width ASCII digits and latin letters, and the ideographic space.
fn fold_width(c: char) -> char {
    match c {
        '０'..='９' | 'Ａ'..='Ｚ' | 'ａ'..='ｚ' => {
            char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
        }
        '\u{3000}' => ' ',
        _ => c,
    }
}

fn length_mark_is_dash(chars: &[char], i: usize) -> bool {
    let prev = i.checked_sub(1).map(|p| chars[p]);
    let next = chars.get(i + 1).copied();

    if prev.is_some_and(is_numeral) {
        return true;
    }
    next.is_some_and(|n| n.is_ascii_digit()) && !prev.is_some_and(is_kana)
}

/// Arabic digit or kanji numeral character.
pub fn is_numeral(c: char) -> bool {
    c.is_ascii_digit() || is_kanji_numeral(c)
}

fn is_kana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{FF66}'..='\u{FF9F}')
}
