//! Resolution output types.

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Deepest resolution level: a block string backed by a dictionary record.
pub const MAX_LEVEL: u8 = 8;

/// Resolution ladder, ordered by depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    /// Nothing matched
    Unmatched,
    Prefecture,
    City,
    /// Town/chōme/aza name resolved
    Town,
    /// One block component, unknown to the dictionary
    Block,
    /// Block plus gō/banchi components, unknown to the dictionary
    BlockDetail,
    /// The dictionary knows the first block component
    RecordedBlock,
    /// The dictionary knows a longer proper prefix of the components
    RecordedPrefix,
    /// The dictionary knows the complete block/parcel number
    RecordedParcel,
}

impl Level {
    pub fn as_u8(self) -> u8 {
        match self {
            Level::Unmatched => 0,
            Level::Prefecture => 1,
            Level::City => 2,
            Level::Town => 3,
            Level::Block => 4,
            Level::BlockDetail => 5,
            Level::RecordedBlock => 6,
            Level::RecordedPrefix => 7,
            Level::RecordedParcel => 8,
        }
    }
}

/// Geocoded point attached to a resolved address.
///
/// `level` rates how precisely the coordinate pins the address and is
/// independent of [`ResolvedAddress::level`]: a parcel-exact point reports 8,
/// a city centroid reports 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub level: u8,
}

impl GeoPoint {
    pub fn new(coordinate: Coordinate, level: Level) -> Self {
        Self {
            lat: coordinate.lat,
            lng: coordinate.lng,
            level: level.as_u8(),
        }
    }
}

/// Structured result of resolving one free-form address.
///
/// Created fresh for every call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedAddress {
    /// Prefecture (都道府県)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref: Option<String>,

    /// City or ward, possibly composite (e.g. 横浜市港北区)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Town in the dictionary's stored orthography (e.g. 豊洲一丁目)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,

    /// Dash-joined block/gō/banchi string (e.g. 2-27)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,

    /// Text no stage consumed (building names, unknown places)
    pub other: String,

    /// Resolution depth, 0 to 8
    pub level: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<GeoPoint>,
}

impl ResolvedAddress {
    /// Rebuild a single address string from the matched components.
    pub fn to_address_string(&self) -> String {
        let mut out = String::new();
        for part in [&self.pref, &self.city, &self.town, &self.addr]
            .into_iter()
            .flatten()
        {
            out.push_str(part);
        }
        if !self.other.is_empty() {
            if !out.is_empty() && self.addr.is_some() {
                out.push(' ');
            }
            out.push_str(&self.other);
        }
        out
    }
}

/// Per-call resolution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Deepest level the engine attempts (0 to 8).
    pub level: u8,
}

impl ResolveOptions {
    pub fn with_level(level: u8) -> Self {
        Self {
            level: level.min(MAX_LEVEL),
        }
    }

    pub(crate) fn cap(&self) -> u8 {
        self.level.min(MAX_LEVEL)
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { level: MAX_LEVEL }
    }
}
