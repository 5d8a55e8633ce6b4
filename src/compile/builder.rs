//! Assembles table rows into the dictionary interchange format.

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use std::collections::BTreeMap;
use tracing::warn;

use jusho::models::{BlockData, CityData, Coordinate, DictionaryData, PrefectureData, TownData};

use crate::tables::{split_aliases, BlockRow, CityRow, PrefectureRow, TownRow};

fn coordinate(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinate> {
    Some(Coordinate {
        lat: lat?,
        lng: lng?,
    })
}

fn merge_aliases(into: &mut Vec<String>, column: &str) {
    for alias in split_aliases(column) {
        if !into.contains(&alias) {
            into.push(alias);
        }
    }
}

/// Collects rows keyed by administrative code; output is ordered by code.
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    prefectures: BTreeMap<String, PrefectureData>,
    cities: BTreeMap<String, CityData>,
    city_prefecture: HashMap<String, String>,
    /// (city code, town name) → index into that city's towns
    town_slots: HashMap<(String, String), usize>,
}

impl DictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_town(&mut self, row: TownRow) {
        let pref = self
            .prefectures
            .entry(row.pref_code.clone())
            .or_insert_with(|| PrefectureData::new(&row.pref_code, &row.pref_name));
        if pref.name != row.pref_name {
            warn!(
                "Prefecture {} named both {} and {}",
                row.pref_code, pref.name, row.pref_name
            );
        }

        let city = self
            .cities
            .entry(row.city_code.clone())
            .or_insert_with(|| CityData::new(&row.city_code, &row.city_name));
        self.city_prefecture
            .entry(row.city_code.clone())
            .or_insert_with(|| row.pref_code.clone());

        let point = coordinate(row.lat, row.lng);
        let key = (row.city_code, row.town_name);
        match self.town_slots.get(&key) {
            Some(&slot) => {
                // Same town listed again: keep the first point, union the aliases
                let town = &mut city.towns[slot];
                merge_aliases(&mut town.aliases, &row.aliases);
                if town.point.is_none() {
                    town.point = point;
                }
            }
            None => {
                let mut town = TownData::new(&key.1);
                merge_aliases(&mut town.aliases, &row.aliases);
                town.point = point;
                self.town_slots.insert(key, city.towns.len());
                city.towns.push(town);
            }
        }
    }

    /// Returns false when the block's town is unknown.
    pub fn add_block(&mut self, row: BlockRow) -> bool {
        let key = (row.city_code, row.town_name);
        let (Some(&slot), Some(city)) = (self.town_slots.get(&key), self.cities.get_mut(&key.0))
        else {
            return false;
        };

        city.towns[slot].blocks.push(BlockData {
            number: row.number,
            point: coordinate(row.lat, row.lng),
        });
        true
    }

    /// Returns false when the city is unknown.
    pub fn add_city_details(&mut self, row: CityRow) -> bool {
        let Some(city) = self.cities.get_mut(&row.city_code) else {
            return false;
        };
        merge_aliases(&mut city.aliases, &row.aliases);
        if let Some(point) = coordinate(row.lat, row.lng) {
            city.point = Some(point);
        }
        true
    }

    /// Returns false when the prefecture is unknown.
    pub fn add_prefecture_details(&mut self, row: PrefectureRow) -> bool {
        let Some(pref) = self.prefectures.get_mut(&row.pref_code) else {
            return false;
        };
        if let Some(point) = coordinate(row.lat, row.lng) {
            pref.point = Some(point);
        }
        true
    }

    pub fn finish(mut self, generated_at: DateTime<Utc>) -> DictionaryData {
        for (code, city) in self.cities {
            if let Some(pref) = self
                .city_prefecture
                .get(&code)
                .and_then(|p| self.prefectures.get_mut(p))
            {
                pref.cities.push(city);
            }
        }

        DictionaryData {
            generated_at: Some(generated_at),
            prefectures: self.prefectures.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn town(pref: (&str, &str), city: (&str, &str), name: &str, aliases: &str) -> TownRow {
        TownRow {
            pref_code: pref.0.into(),
            pref_name: pref.1.into(),
            city_code: city.0.into(),
            city_name: city.1.into(),
            town_name: name.into(),
            aliases: aliases.into(),
            lat: None,
            lng: None,
        }
    }

    #[test]
    fn test_groups_by_code_in_order() {
        let mut builder = DictionaryBuilder::new();
        builder.add_town(town(("34", "広島県"), ("342084", "府中市"), "栗柄町", ""));
        builder.add_town(town(("13", "東京都"), ("132063", "府中市"), "宮町一丁目", ""));
        builder.add_town(town(("13", "東京都"), ("131083", "江東区"), "豊洲一丁目", ""));

        let data = builder.finish(Utc::now());
        assert_eq!(data.prefectures.len(), 2);
        assert_eq!(data.prefectures[0].code, "13");
        let codes: Vec<&str> = data.prefectures[0]
            .cities
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(codes, vec!["131083", "132063"]);
        assert!(data.generated_at.is_some());
    }

    #[test]
    fn test_repeated_town_merges_aliases() {
        let mut builder = DictionaryBuilder::new();
        let aichi = ("23", "愛知県");
        let anjo = ("232122", "安城市");
        builder.add_town(town(aichi, anjo, "柿碕町", "柿さき町"));
        builder.add_town(town(aichi, anjo, "柿碕町", "柿崎町|柿さき町"));

        let data = builder.finish(Utc::now());
        let towns = &data.prefectures[0].cities[0].towns;
        assert_eq!(towns.len(), 1);
        assert_eq!(towns[0].aliases, vec!["柿さき町", "柿崎町"]);
    }

    #[test]
    fn test_blocks_and_details_attach_to_known_records() {
        let mut builder = DictionaryBuilder::new();
        builder.add_town(town(("17", "石川県"), ("172022", "七尾市"), "藤橋町亥", ""));

        assert!(builder.add_block(BlockRow {
            city_code: "172022".into(),
            town_name: "藤橋町亥".into(),
            number: "45-1".into(),
            lat: None,
            lng: None,
        }));
        assert!(!builder.add_block(BlockRow {
            city_code: "172022".into(),
            town_name: "藤橋町".into(),
            number: "1".into(),
            lat: None,
            lng: None,
        }));
        assert!(builder.add_city_details(CityRow {
            city_code: "172022".into(),
            aliases: String::new(),
            lat: Some(37.043108),
            lng: Some(136.967296),
        }));
        assert!(!builder.add_prefecture_details(PrefectureRow {
            pref_code: "99".into(),
            lat: Some(0.0),
            lng: Some(0.0),
        }));

        let data = builder.finish(Utc::now());
        let city = &data.prefectures[0].cities[0];
        assert_eq!(city.point.map(|p| p.lat), Some(37.043108));
        assert_eq!(city.towns[0].blocks[0].number, "45-1");
    }
}
