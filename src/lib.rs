//! Jusho - Japanese address normalization and resolution
//!
//! Free-form address strings are normalized and matched against a read-only
//! administrative dictionary: prefecture, city, town, then block numbers.
//! The library is shared by the `query` server and the `compile` tool.

pub mod config;
pub mod dictionary;
pub mod error;
pub mod models;
pub mod normalize;
pub mod resolve;

#[cfg(test)]
pub(crate) mod test_utils;

pub use dictionary::{
    ConfiguredSource, Dictionary, DictionaryCache, DictionarySource, FileSource, HttpSource,
    StaticSource,
};
pub use error::{Error, LoadError, Result};
pub use models::{DictionaryData, GeoPoint, Level, ResolveOptions, ResolvedAddress, MAX_LEVEL};
pub use normalize::normalize;
pub use resolve::{resolve, resolve_all, AddressResolver};
