//! Shared fixtures for unit tests.

use crate::dictionary::Dictionary;
use crate::models::DictionaryData;

/// The same fixture dictionary the integration tests use.
pub(crate) fn fixture_data() -> DictionaryData {
    serde_json::from_str(include_str!("../tests/fixtures/dictionary.json"))
        .expect("fixture dictionary is valid JSON")
}

pub(crate) fn fixture() -> Dictionary {
    Dictionary::build(fixture_data()).expect("fixture dictionary builds")
}
