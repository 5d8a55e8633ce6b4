//! Read-only geographic dictionary.
//!
//! Built once from [`DictionaryData`] and never mutated afterwards, so any
//! number of resolutions may share it without locking.

mod cache;
mod index;
mod source;

pub use cache::DictionaryCache;
pub use index::{match_prefix, PrefixIndex, PrefixMatch};
pub use source::{ConfiguredSource, DictionarySource, FileSource, HttpSource, StaticSource};

use chrono::{DateTime, Utc};
use hashbrown::{HashMap, HashSet};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::{
    City, CityId, Coordinate, DictionaryData, GeoPoint, Level, Prefecture, PrefectureId, Town,
    TownId,
};
use crate::normalize::kanji::{is_kanji_numeral, parse_kanji_number};
use crate::normalize::normalize;

const PREFECTURE_SUFFIXES: [char; 4] = ['都', '道', '府', '県'];
const CHOME: &str = "丁目";
const OAZA: &str = "大字";
const AZA: char = '字';
/// Shortest ōaza base or koaza name around a 字 marker
const AZA_PART_MIN: usize = 2;

/// A city matched at the start of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityMatch<'t> {
    pub city: CityId,
    pub prefecture: PrefectureId,
    pub rest: &'t str,
}

/// Chōme towns sharing one base name within a city, e.g. 豊洲 → {1: 豊洲一丁目, ...}
#[derive(Debug, Clone, Default)]
struct ChomeIndex {
    bases: PrefixIndex<u32>,
    numbers: Vec<HashMap<u32, TownId>>,
    base_ids: HashMap<String, u32>,
}

impl ChomeIndex {
    fn insert(&mut self, base: &str, number: u32, town: TownId) {
        let next = self.numbers.len() as u32;
        let id = *self.base_ids.entry(base.to_string()).or_insert_with(|| {
            self.bases.insert(base, next);
            next
        });
        if id == next {
            self.numbers.push(HashMap::new());
        }
        self.numbers[id as usize].entry(number).or_insert(town);
    }
}

/// Dictionary record backing a block string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockRecord {
    /// How many leading components the record covers
    pub components: usize,
    pub point: Option<Coordinate>,
}

/// Entity whose coordinate is looked up by [`Dictionary::geocode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity {
    Prefecture(PrefectureId),
    City(CityId),
    Town(TownId),
    /// A block record of `town`; `level` is the precision its own point carries
    Block {
        town: TownId,
        point: Option<Coordinate>,
        level: Level,
    },
}

/// Immutable, indexed collection of prefectures, cities, towns and blocks.
#[derive(Debug)]
pub struct Dictionary {
    generated_at: Option<DateTime<Utc>>,
    prefectures: Vec<Prefecture>,
    cities: Vec<City>,
    towns: Vec<Town>,
    prefecture_index: PrefixIndex<PrefectureId>,
    /// All cities regardless of prefecture
    city_index: PrefixIndex<CityId>,
    cities_by_prefecture: Vec<PrefixIndex<CityId>>,
    towns_by_city: Vec<PrefixIndex<TownId>>,
    chome_by_city: Vec<ChomeIndex>,
    blocks_by_town: Vec<HashMap<String, Option<Coordinate>>>,
}

impl Dictionary {
    /// Validate and index dictionary data.
    pub fn build(data: DictionaryData) -> Result<Self> {
        let mut dict = Dictionary {
            generated_at: data.generated_at,
            prefectures: Vec::new(),
            cities: Vec::new(),
            towns: Vec::new(),
            prefecture_index: PrefixIndex::new(),
            city_index: PrefixIndex::new(),
            cities_by_prefecture: Vec::new(),
            towns_by_city: Vec::new(),
            chome_by_city: Vec::new(),
            blocks_by_town: Vec::new(),
        };

        let mut prefecture_codes = HashSet::new();
        let mut city_codes = HashSet::new();

        for pref in data.prefectures {
            if !pref.name.ends_with(PREFECTURE_SUFFIXES) {
                return Err(Error::InvalidDictionary(format!(
                    "prefecture name '{}' lacks an administrative suffix",
                    pref.name
                )));
            }
            if !prefecture_codes.insert(pref.code.clone()) {
                return Err(Error::InvalidDictionary(format!(
                    "duplicate prefecture code {}",
                    pref.code
                )));
            }

            let pref_id = PrefectureId(dict.prefectures.len() as u32);
            dict.prefecture_index.insert(&normalize(&pref.name), pref_id);
            dict.prefectures.push(Prefecture {
                code: pref.code,
                name: pref.name,
                point: pref.point,
            });
            let mut scoped_cities = PrefixIndex::new();

            for city in pref.cities {
                if city.name.is_empty() {
                    return Err(Error::InvalidDictionary(format!(
                        "city {} has an empty name",
                        city.code
                    )));
                }
                if !city_codes.insert(city.code.clone()) {
                    return Err(Error::InvalidDictionary(format!(
                        "duplicate city code {}",
                        city.code
                    )));
                }

                let city_id = CityId(dict.cities.len() as u32);
                for spelling in std::iter::once(&city.name).chain(&city.aliases) {
                    let key = normalize(spelling);
                    scoped_cities.insert(&key, city_id);
                    dict.city_index.insert(&key, city_id);
                }

                let mut towns = PrefixIndex::new();
                let mut chome = ChomeIndex::default();
                let mut seen_towns = HashSet::new();

                for town in city.towns {
                    if town.name.is_empty() {
                        return Err(Error::InvalidDictionary(format!(
                            "city {} has a town with an empty name",
                            city.name
                        )));
                    }
                    if !seen_towns.insert(town.name.clone()) {
                        warn!("Skipping duplicate town {} in {}", town.name, city.name);
                        continue;
                    }

                    let town_id = TownId(dict.towns.len() as u32);
                    for spelling in town_spellings(&town.name, &town.aliases) {
                        towns.insert(&spelling, town_id);
                        if let Some((base, number)) = split_chome(&spelling) {
                            chome.insert(base, number, town_id);
                        }
                    }

                    dict.blocks_by_town.push(
                        town.blocks
                            .into_iter()
                            .map(|b| (normalize(&b.number), b.point))
                            .collect(),
                    );
                    dict.towns.push(Town {
                        name: town.name,
                        city: city_id,
                        aliases: town.aliases,
                        point: town.point,
                    });
                }

                towns.finish();
                chome.bases.finish();
                dict.towns_by_city.push(towns);
                dict.chome_by_city.push(chome);
                dict.cities.push(City {
                    code: city.code,
                    name: city.name,
                    prefecture: pref_id,
                    aliases: city.aliases,
                    point: city.point,
                });
            }

            scoped_cities.finish();
            dict.cities_by_prefecture.push(scoped_cities);
        }

        dict.prefecture_index.finish();
        dict.city_index.finish();

        info!(
            "Dictionary built: {} prefectures, {} cities, {} towns",
            dict.prefectures.len(),
            dict.cities.len(),
            dict.towns.len()
        );

        Ok(dict)
    }

    /// Longest prefecture name at the start of `text`.
    pub fn match_prefecture_prefix<'t>(&self, text: &'t str) -> Option<(PrefectureId, &'t str)> {
        self.prefecture_index
            .longest(text)
            .first()
            .map(|m| (m.value, m.rest))
    }

    /// Cities tied for the longest match at the start of `text`, ordered by
    /// prefecture code then city code.
    ///
    /// With `scope` set only that prefecture's cities are considered.
    pub fn match_city<'t>(&self, scope: Option<PrefectureId>, text: &'t str) -> Vec<CityMatch<'t>> {
        let index = match scope {
            Some(pref) => &self.cities_by_prefecture[pref.index()],
            None => &self.city_index,
        };

        let mut found: Vec<CityMatch<'t>> = index
            .longest(text)
            .into_iter()
            .map(|m| CityMatch {
                city: m.value,
                prefecture: self.city(m.value).prefecture,
                rest: m.rest,
            })
            .collect();

        found.sort_by(|a, b| {
            let ka = (&self.prefecture(a.prefecture).code, &self.city(a.city).code);
            let kb = (&self.prefecture(b.prefecture).code, &self.city(b.city).code);
            ka.cmp(&kb)
        });
        found
    }

    /// Longest town spelling (canonical, alias or derived) at the start of `text`.
    pub fn match_town<'t>(&self, city: CityId, text: &'t str) -> Option<(TownId, &'t str)> {
        self.towns_by_city[city.index()]
            .longest(text)
            .first()
            .map(|m| (m.value, m.rest))
    }

    /// Chōme base names of `city` prefixing `text`, longest first.
    ///
    /// Returns the base key length and the remaining text for each.
    pub fn match_chome_bases<'t>(&self, city: CityId, text: &'t str) -> Vec<PrefixMatch<'t, u32>> {
        self.chome_by_city[city.index()].bases.matches(text)
    }

    /// Town stored as `<base><number>丁目`.
    pub fn chome_town(&self, city: CityId, base: u32, number: u32) -> Option<TownId> {
        self.chome_by_city[city.index()]
            .numbers
            .get(base as usize)?
            .get(&number)
            .copied()
    }

    /// Longest leading run of `components` recorded as a block of `town`.
    pub fn match_block(&self, town: TownId, components: &[String]) -> Option<BlockRecord> {
        let blocks = &self.blocks_by_town[town.index()];
        if blocks.is_empty() {
            return None;
        }

        (1..=components.len()).rev().find_map(|n| {
            let key = components[..n].join("-");
            blocks.get(&key).map(|point| BlockRecord {
                components: n,
                point: *point,
            })
        })
    }

    /// Best available coordinate for `entity`, falling back through its
    /// ancestors. The point's level says which record supplied it.
    pub fn geocode(&self, entity: Entity) -> Option<GeoPoint> {
        match entity {
            Entity::Block { town, point, level } => point
                .map(|c| GeoPoint::new(c, level))
                .or_else(|| self.geocode(Entity::Town(town))),
            Entity::Town(id) => {
                let town = self.town(id);
                town.point
                    .map(|c| GeoPoint::new(c, Level::Town))
                    .or_else(|| self.geocode(Entity::City(town.city)))
            }
            Entity::City(id) => {
                let city = self.city(id);
                city.point
                    .map(|c| GeoPoint::new(c, Level::City))
                    .or_else(|| self.geocode(Entity::Prefecture(city.prefecture)))
            }
            Entity::Prefecture(id) => self
                .prefecture(id)
                .point
                .map(|c| GeoPoint::new(c, Level::Prefecture)),
        }
    }

    pub fn prefecture(&self, id: PrefectureId) -> &Prefecture {
        &self.prefectures[id.index()]
    }

    pub fn city(&self, id: CityId) -> &City {
        &self.cities[id.index()]
    }

    pub fn town(&self, id: TownId) -> &Town {
        &self.towns[id.index()]
    }

    pub fn prefectures(&self) -> impl Iterator<Item = &Prefecture> {
        self.prefectures.iter()
    }

    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    pub fn town_count(&self) -> usize {
        self.towns.len()
    }

    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }
}

/// Every key under which a town is indexed, normalized.
///
/// Besides the stored name and the record's aliases this derives, from each
/// spelling itself, the arabic chōme form and the form without aza markers.
fn town_spellings(name: &str, aliases: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |s: String| {
        if !s.is_empty() && !out.contains(&s) {
            out.push(s);
        }
    };

    for spelling in std::iter::once(name).chain(aliases.iter().map(String::as_str)) {
        let spelling = normalize(spelling);
        let stripped = strip_aza_markers(&spelling);
        for variant in [spelling, stripped] {
            if let Some(arabic) = arabic_chome(&variant) {
                push(arabic);
            }
            push(variant);
        }
    }
    out
}

/// 古川大崎字東亜 → 古川大崎東亜, 大字篠原 → 篠原
///
/// Only a leading 大字 and a 字 between an ōaza base and a koaza name are
/// markers. A 字 inside a word (十文字町, 八文字) stays.
fn strip_aza_markers(name: &str) -> String {
    let name = name.strip_prefix(OAZA).unwrap_or(name);
    let chars: Vec<char> = name.chars().collect();

    chars
        .iter()
        .enumerate()
        .filter(|&(i, &c)| {
            !(c == AZA && i >= AZA_PART_MIN && chars.len() - i - 1 >= AZA_PART_MIN)
        })
        .map(|(_, &c)| c)
        .collect()
}

/// Split `<base><numeral>丁目` into base and chōme number.
fn split_chome(name: &str) -> Option<(&str, u32)> {
    let head = name.strip_suffix(CHOME)?;
    let numeral_start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_kanji_numeral(*c) || c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;

    let (base, numeral) = head.split_at(numeral_start);
    if base.is_empty() {
        return None;
    }
    let number = if numeral.chars().all(|c| c.is_ascii_digit()) {
        numeral.parse().ok()?
    } else {
        parse_kanji_number(numeral)?
    };
    Some((base, number))
}

/// 豊洲一丁目 → 豊洲1丁目
fn arabic_chome(name: &str) -> Option<String> {
    let (base, number) = split_chome(name)?;
    let arabic = format!("{base}{number}{CHOME}");
    (arabic != name).then_some(arabic)
}
