//! Fixture dictionary shared by the integration tests.

#![allow(dead_code)]

use jusho::models::DictionaryData;
use jusho::{Dictionary, ResolveOptions, ResolvedAddress};

pub const FIXTURE_JSON: &str = include_str!("../fixtures/dictionary.json");

pub fn fixture_data() -> DictionaryData {
    serde_json::from_str(FIXTURE_JSON).expect("fixture dictionary is valid JSON")
}

pub fn dictionary() -> Dictionary {
    Dictionary::build(fixture_data()).expect("fixture dictionary builds")
}

pub fn resolve(dict: &Dictionary, address: &str) -> ResolvedAddress {
    jusho::resolve(dict, address, &ResolveOptions::default())
}

pub fn resolve_at(dict: &Dictionary, address: &str, level: u8) -> ResolvedAddress {
    jusho::resolve(dict, address, &ResolveOptions::with_level(level))
}
