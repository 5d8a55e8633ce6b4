//! Dictionary interchange format.
//!
//! This is what dictionary sources produce and what the `compile` binary
//! writes. [`Dictionary::build`](crate::dictionary::Dictionary::build) turns it
//! into the indexed, read-only structure used by the resolver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinate;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryData {
    /// When the tables were compiled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,

    pub prefectures: Vec<PrefectureData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefectureData {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<Coordinate>,
    #[serde(default)]
    pub cities: Vec<CityData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityData {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<Coordinate>,
    #[serde(default)]
    pub towns: Vec<TownData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TownData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<Coordinate>,
    /// Known block/parcel numbers (住居表示 or 地番)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<BlockData>,
}

/// A block or parcel record, keyed by its canonical dash-joined number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockData {
    /// e.g. "2-27" or "45-1"
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<Coordinate>,
}

impl PrefectureData {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            point: None,
            cities: Vec::new(),
        }
    }
}

impl CityData {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            aliases: Vec::new(),
            point: None,
            towns: Vec::new(),
        }
    }
}

impl TownData {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            point: None,
            blocks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{
            "prefectures": [{
                "code": "13",
                "name": "東京都",
                "cities": [{
                    "code": "131083",
                    "name": "江東区",
                    "towns": [{
                        "name": "豊洲一丁目",
                        "blocks": [{"number": "2-27", "point": {"lat": 35.66, "lng": 139.79}}]
                    }]
                }]
            }]
        }"#;

        let data: DictionaryData = serde_json::from_str(json).unwrap();
        assert!(data.generated_at.is_none());
        let town = &data.prefectures[0].cities[0].towns[0];
        assert!(town.aliases.is_empty());
        assert!(town.point.is_none());
        assert_eq!(town.blocks[0].number, "2-27");
        assert!(town.blocks[0].point.is_some());
    }
}
