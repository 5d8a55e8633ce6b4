//! Core data models for address resolution.

pub mod address;
pub mod admin;
pub mod data;

pub use address::{GeoPoint, Level, ResolveOptions, ResolvedAddress, MAX_LEVEL};
pub use admin::{City, CityId, Coordinate, Prefecture, PrefectureId, Town, TownId};
pub use data::{BlockData, CityData, DictionaryData, PrefectureData, TownData};
