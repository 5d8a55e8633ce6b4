//! Administrative hierarchy records held by the dictionary.

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair as stored in the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Index of a prefecture inside a [`Dictionary`](crate::dictionary::Dictionary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrefectureId(pub(crate) u32);

/// Index of a city inside a [`Dictionary`](crate::dictionary::Dictionary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CityId(pub(crate) u32);

/// Index of a town inside a [`Dictionary`](crate::dictionary::Dictionary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TownId(pub(crate) u32);

macro_rules! id_index {
    ($($id:ident),*) => {
        $(
            impl $id {
                pub(crate) fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

id_index!(PrefectureId, CityId, TownId);

/// One of the 47 prefectures (都道府県).
#[derive(Debug, Clone)]
pub struct Prefecture {
    /// Two-digit administrative code, e.g. "13"
    pub code: String,
    /// Canonical name ending in 都/道/府/県
    pub name: String,
    pub point: Option<Coordinate>,
}

/// Municipality (市区町村), possibly a composite city+ward name.
#[derive(Debug, Clone)]
pub struct City {
    /// Administrative code, e.g. "131083"
    pub code: String,
    pub name: String,
    pub prefecture: PrefectureId,
    /// Accepted alternative spellings (variant kanji)
    pub aliases: Vec<String>,
    pub point: Option<Coordinate>,
}

/// Town, chōme or aza inside a city.
///
/// `name` is the canonical spelling reported in results; every alias maps back
/// to it.
#[derive(Debug, Clone)]
pub struct Town {
    pub name: String,
    pub city: CityId,
    pub aliases: Vec<String>,
    pub point: Option<Coordinate>,
}
