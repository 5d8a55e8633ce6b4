//! Town matcher.
//!
//! Matches against every spelling the dictionary registered for a town and
//! always reports the record's stored name. Also accepts a bare chōme numeral
//! after a chōme base name: `小石川1` resolves to 小石川一丁目.

use tracing::debug;

use super::block::{leading_numeral, UNIT_SUFFIXES};
use crate::dictionary::Dictionary;
use crate::models::{CityId, TownId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TownMatch<'t> {
    pub town: TownId,
    pub rest: &'t str,
}

/// Longest town match at the start of `text` within `city`.
pub fn match_town<'t>(dict: &Dictionary, city: CityId, text: &'t str) -> Option<TownMatch<'t>> {
    let direct = dict
        .match_town(city, text)
        .map(|(town, rest)| TownMatch { town, rest });
    let chome = match_bare_chome(dict, city, text);

    match (direct, chome) {
        // The one that consumed more text wins
        (Some(direct), Some(chome)) if chome.rest.len() < direct.rest.len() => Some(chome),
        (Some(direct), _) => Some(direct),
        (None, chome) => chome,
    }
}

/// `<base><numeral>` with no unit suffix, where `<base><numeral>丁目` exists.
fn match_bare_chome<'t>(dict: &Dictionary, city: CityId, text: &'t str) -> Option<TownMatch<'t>> {
    for base in dict.match_chome_bases(city, text) {
        let after = base.rest.trim_start_matches(' ');
        let Some((number, len)) = leading_numeral(after) else {
            continue;
        };
        let tail = &after[len..];
        if UNIT_SUFFIXES.iter().any(|unit| tail.starts_with(unit)) {
            continue;
        }

        if let Some(town) = dict.chome_town(city, base.value, number) {
            debug!(
                "Bare chōme numeral {} resolved to {}",
                number,
                dict.town(town).name
            );
            return Some(TownMatch { town, rest: tail });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixture;

    fn town_of(dict: &Dictionary, city: &str, text: &str) -> Option<(String, String)> {
        let city = dict.match_city(None, city)[0].city;
        match_town(dict, city, text).map(|m| (dict.town(m.town).name.clone(), m.rest.to_string()))
    }

    #[test]
    fn test_alias_reports_stored_name() {
        let dict = fixture();
        assert_eq!(
            town_of(&dict, "西多摩郡奥多摩町", "海沢"),
            Some(("海澤".into(), "".into()))
        );
        assert_eq!(
            town_of(&dict, "大崎市", "古川大崎東亞"),
            Some(("古川大崎字東亜".into(), "".into()))
        );
        assert_eq!(
            town_of(&dict, "安城市", "柿さき町"),
            Some(("柿碕町".into(), "".into()))
        );
    }

    #[test]
    fn test_arabic_chome() {
        let dict = fixture();
        assert_eq!(
            town_of(&dict, "江東区", "豊洲 1丁目2-27"),
            Some(("豊洲一丁目".into(), "2-27".into()))
        );
    }

    #[test]
    fn test_bare_chome_numeral() {
        let dict = fixture();
        assert_eq!(
            town_of(&dict, "文京区", "小石川1"),
            Some(("小石川一丁目".into(), "".into()))
        );
        assert_eq!(
            town_of(&dict, "文京区", "小石川1ビル名"),
            Some(("小石川一丁目".into(), "ビル名".into()))
        );
        assert_eq!(
            town_of(&dict, "江東区", "豊洲 四-2-27"),
            Some(("豊洲四丁目".into(), "-2-27".into()))
        );
    }

    #[test]
    fn test_bare_chome_rejects_units_and_unknown_numbers() {
        let dict = fixture();
        assert_eq!(town_of(&dict, "文京区", "小石川2番地"), None);
        assert_eq!(town_of(&dict, "文京区", "小石川9"), None);
    }

    #[test]
    fn test_space_inside_town_name() {
        let dict = fixture();
        assert_eq!(
            town_of(&dict, "七尾市", "藤橋町 亥 45-1"),
            Some(("藤橋町亥".into(), " 45-1".into()))
        );
    }

    #[test]
    fn test_unmatched_town() {
        let dict = fixture();
        assert_eq!(town_of(&dict, "滝川市", "一の坂町西"), None);
    }
}
