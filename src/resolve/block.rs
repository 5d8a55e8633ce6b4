//! Block/gō/banchi tokenizer.
//!
//! Runs on the text after a matched town and turns the leading numeric part
//! into dash-joined components: `四十五番地1` → `45-1`, `一四━Ａ二二` (after
//! normalization `一四-A二二`) → `14-A22`. Parsing stops at the first token that
//! does not fit; that token and everything after it is returned untouched.

use crate::normalize::kanji::{is_kanji_numeral, parse_kanji_number};
use crate::normalize::{is_numeral, SEPARATOR};

/// Unit suffixes that act as separators and are dropped. Longest first.
pub const UNIT_SUFFIXES: [&str; 4] = ["丁目", "番地", "番", "号"];

/// Joins two numerals (`1番地の2`) but only between numerals.
const NUMERAL_JOINER: char = 'の';

/// Leading components parsed from a block string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTokens<'t> {
    /// Normalized components, e.g. ["14", "A22"]
    pub components: Vec<String>,
    /// Unconsumed text, exactly as given
    pub rest: &'t str,
}

impl BlockTokens<'_> {
    /// Components joined with the canonical separator.
    pub fn joined(&self) -> String {
        self.components.join("-")
    }
}

/// Parse the leading block components of `text`.
///
/// Returns `None` when not even one component fits the grammar.
pub fn tokenize(text: &str) -> Option<BlockTokens<'_>> {
    let mut pos = skip_spaces(text, 0);
    // 豊洲1-2-27: the dash left behind by a bare chōme numeral
    if text[pos..].starts_with(SEPARATOR) && parse_component(text, pos + 1).is_some() {
        pos += 1;
    }

    let mut components = Vec::new();
    let mut end = pos;

    while let Some((component, after)) = parse_component(text, pos) {
        components.push(component);
        pos = after;
        end = after;

        if let Some(unit) = unit_at(&text[pos..]) {
            pos += unit.len();
            end = pos;
            // 1番地の2, 2番-3
            if let Some(joiner) = joiner_at(text, pos) {
                pos += joiner;
            }
            continue;
        }

        match joiner_at(text, pos) {
            Some(joiner) => pos += joiner,
            None => break,
        }
    }

    if components.is_empty() {
        return None;
    }

    Some(BlockTokens {
        components,
        rest: &text[end..],
    })
}

/// Leading arabic or kanji numeral of `text` and its byte length.
pub fn leading_numeral(text: &str) -> Option<(u32, usize)> {
    let digits = run_len(text, |c| c.is_ascii_digit());
    if digits > 0 {
        return text[..digits].parse().ok().map(|n| (n, digits));
    }

    let kanji = run_len(text, is_kanji_numeral);
    if kanji > 0 {
        return parse_kanji_number(&text[..kanji]).map(|n| (n, kanji));
    }
    None
}

/// A dash or の that is followed by another component. Returns its byte length.
fn joiner_at(text: &str, pos: usize) -> Option<usize> {
    let c = text[pos..].chars().next()?;
    if c != SEPARATOR && c != NUMERAL_JOINER {
        return None;
    }
    let after = pos + c.len_utf8();
    parse_component(text, after).map(|_| c.len_utf8())
}

fn unit_at(text: &str) -> Option<&'static str> {
    UNIT_SUFFIXES.into_iter().find(|u| text.starts_with(u))
}

/// One component at `pos`: optional letter/katakana prefix, a numeral,
/// optional latin suffix letter.
fn parse_component(text: &str, pos: usize) -> Option<(String, usize)> {
    let tail = &text[pos..];
    let mut chars = tail.chars();
    let first = chars.next()?;
    let mut out = String::new();
    let mut cursor = pos;

    if (first.is_ascii_alphabetic() || is_katakana(first)) && chars.next().is_some_and(is_numeral) {
        out.push(first);
        cursor += first.len_utf8();
    }

    let rest = &text[cursor..];
    let digits = run_len(rest, |c| c.is_ascii_digit());
    if digits > 0 {
        out.push_str(&rest[..digits]);
        cursor += digits;
    } else {
        let kanji = run_len(rest, is_kanji_numeral);
        if kanji == 0 {
            return None;
        }
        let value = parse_kanji_number(&rest[..kanji])?;
        cursor += kanji;
        // 二本松: a kanji numeral that runs into a word is not a block number
        if !is_boundary(text, cursor) {
            return None;
        }
        out.push_str(&value.to_string());
    }

    let mut after = text[cursor..].chars();
    if let Some(letter) = after.next().filter(char::is_ascii_alphabetic) {
        if is_boundary(text, cursor + letter.len_utf8()) {
            out.push(letter);
            cursor += letter.len_utf8();
        }
    }

    Some((out, cursor))
}

/// End of text, a space, a separator, a unit suffix or a numeral joiner.
fn is_boundary(text: &str, pos: usize) -> bool {
    let tail = &text[pos..];
    match tail.chars().next() {
        None | Some(' ') | Some(SEPARATOR) => true,
        Some(NUMERAL_JOINER) => tail[NUMERAL_JOINER.len_utf8()..]
            .chars()
            .next()
            .is_some_and(is_numeral),
        Some(_) => unit_at(tail).is_some(),
    }
}

fn run_len(text: &str, pred: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|(_, c)| !pred(*c))
        .map_or(text.len(), |(i, _)| i)
}

fn skip_spaces(text: &str, pos: usize) -> usize {
    pos + run_len(&text[pos..], |c| c == ' ')
}

fn is_katakana(c: char) -> bool {
    matches!(c, '\u{30A1}'..='\u{30FA}')
}
