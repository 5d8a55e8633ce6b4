//! Prefecture matcher.

use crate::dictionary::Dictionary;
use crate::models::PrefectureId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefectureMatch<'t> {
    pub prefecture: PrefectureId,
    pub rest: &'t str,
}

/// Longest full prefecture name at the start of `text`.
///
/// Abbreviations (東京 for 東京都) never match; callers fall back to
/// inferring the prefecture from the city.
pub fn match_prefecture<'t>(dict: &Dictionary, text: &'t str) -> Option<PrefectureMatch<'t>> {
    dict.match_prefecture_prefix(text)
        .map(|(prefecture, rest)| PrefectureMatch { prefecture, rest })
}
