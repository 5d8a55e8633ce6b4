//! City matcher.
//!
//! Without a prefecture scope a city name can exist in several prefectures
//! (府中市 is in both 東京都 and 広島県). The candidate whose town set also
//! matches the remainder wins; otherwise the lowest prefecture code, then the
//! lowest city code.

use tracing::debug;

use super::town;
use crate::dictionary::{CityMatch, Dictionary};
use crate::models::PrefectureId;

/// Best city at the start of `text`, optionally limited to one prefecture.
pub fn match_city<'t>(
    dict: &Dictionary,
    scope: Option<PrefectureId>,
    text: &'t str,
) -> Option<CityMatch<'t>> {
    let candidates = dict.match_city(scope, text);
    if candidates.len() <= 1 {
        return candidates.into_iter().next();
    }

    debug!(
        "Ambiguous city {:?}: {} candidates",
        dict.city(candidates[0].city).name,
        candidates.len()
    );

    let chosen = candidates
        .iter()
        .find(|c| town::match_town(dict, c.city, c.rest).is_some())
        .unwrap_or(&candidates[0]);

    debug!(
        "Picked {}{} (city code {})",
        dict.prefecture(chosen.prefecture).name,
        dict.city(chosen.city).name,
        dict.city(chosen.city).code
    );
    Some(*chosen)
}
