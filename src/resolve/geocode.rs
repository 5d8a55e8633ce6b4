//! Geocode attachment.

use super::Matched;
use crate::dictionary::{Dictionary, Entity};
use crate::models::GeoPoint;

/// Point for the most specific matched entity, falling back to ancestors.
///
/// A block record contributes its own point only when it has one; its
/// `level` then rates that point (8 for a complete parcel record).
pub fn attach(dict: &Dictionary, matched: &Matched) -> Option<GeoPoint> {
    if let (Some(town), Some(block)) = (matched.town, &matched.block) {
        if let Some(record) = block.record {
            return dict.geocode(Entity::Block {
                town,
                point: record.point,
                level: block.level(),
            });
        }
    }

    let entity = match (matched.town, matched.city, matched.prefecture) {
        (Some(town), _, _) => Entity::Town(town),
        (None, Some(city), _) => Entity::City(city),
        (None, None, Some(prefecture)) => Entity::Prefecture(prefecture),
        (None, None, None) => return None,
    };
    dict.geocode(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::BlockRecord;
    use crate::resolve::{city, town, BlockMatch};
    use crate::test_utils::fixture;

    fn matched_town(dict: &Dictionary, text: &str) -> Matched {
        let city = city::match_city(dict, None, text).unwrap();
        let town = town::match_town(dict, city.city, city.rest).unwrap();
        Matched {
            prefecture: Some(city.prefecture),
            city: Some(city.city),
            town: Some(town.town),
            block: None,
        }
    }

    #[test]
    fn test_parcel_point() {
        let dict = fixture();
        let mut matched = matched_town(&dict, "江東区豊洲一丁目");
        matched.block = Some(BlockMatch {
            components: 2,
            record: dict.match_block(matched.town.unwrap(), &["2".into(), "27".into()]),
        });

        let point = attach(&dict, &matched).unwrap();
        assert_eq!(point.level, 8);
        assert_eq!(point.lat, 35.661166758);
        assert_eq!(point.lng, 139.793685144);
    }

    #[test]
    fn test_record_without_point_falls_back_to_city() {
        let dict = fixture();
        let mut matched = matched_town(&dict, "七尾市藤橋町亥");
        matched.block = Some(BlockMatch {
            components: 2,
            record: Some(BlockRecord {
                components: 2,
                point: None,
            }),
        });

        let point = attach(&dict, &matched).unwrap();
        assert_eq!(point.level, 2);
        assert_eq!(point.lat, 37.043108);
    }

    #[test]
    fn test_unrecorded_block_uses_town_point() {
        let dict = fixture();
        let mut matched = matched_town(&dict, "町田市木曽東四丁目");
        matched.block = Some(BlockMatch {
            components: 2,
            record: None,
        });
        assert_eq!(attach(&dict, &matched).unwrap().level, 3);
    }

    #[test]
    fn test_nothing_matched() {
        let dict = fixture();
        assert_eq!(attach(&dict, &Matched::default()), None);
    }
}
