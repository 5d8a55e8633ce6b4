//! Resolution pipeline.
//!
//! Each stage takes the remainder left by the previous one and either
//! consumes a prefix of it or hands it on untouched. Whatever nothing
//! consumed becomes `other`.

pub mod block;
pub mod city;
pub mod geocode;
pub mod level;
pub mod prefecture;
pub mod town;

use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::dictionary::{BlockRecord, Dictionary, DictionaryCache, DictionarySource};
use crate::error::Result;
use crate::models::{CityId, Level, PrefectureId, ResolveOptions, ResolvedAddress, TownId};
use crate::normalize::normalize;

/// Entities matched so far.
#[derive(Debug, Clone, Default)]
pub struct Matched {
    pub prefecture: Option<PrefectureId>,
    pub city: Option<CityId>,
    pub town: Option<TownId>,
    pub block: Option<BlockMatch>,
}

/// Tokenized block string and the dictionary record backing it, if any.
#[derive(Debug, Clone)]
pub struct BlockMatch {
    pub components: usize,
    pub record: Option<BlockRecord>,
}

/// Resolve one free-form address against a loaded dictionary.
///
/// Never fails: unmatched input lowers the level and ends up in `other`.
pub fn resolve(dict: &Dictionary, input: &str, options: &ResolveOptions) -> ResolvedAddress {
    let text = normalize(input);
    let cap = options.cap();
    let mut matched = Matched::default();

    let other = run_stages(dict, &text, cap, &mut matched);

    let level = level::assign(&matched).as_u8().min(cap);
    let point = geocode::attach(dict, &matched);

    let mut result = ResolvedAddress {
        pref: matched
            .prefecture
            .map(|id| dict.prefecture(id).name.clone()),
        city: matched.city.map(|id| dict.city(id).name.clone()),
        town: matched.town.map(|id| dict.town(id).name.clone()),
        addr: None,
        other: String::new(),
        level,
        point,
    };

    match other {
        Residual::Text(rest) => result.other = rest.trim().to_string(),
        Residual::Block { addr, rest } => {
            result.addr = Some(addr);
            result.other = rest.trim().to_string();
        }
    }

    debug!("Resolved {:?} to level {}", input, result.level);
    result
}

/// Resolve many addresses in parallel.
pub fn resolve_all<A: AsRef<str> + Sync>(
    dict: &Dictionary,
    addresses: &[A],
    options: &ResolveOptions,
) -> Vec<ResolvedAddress> {
    addresses
        .par_iter()
        .map(|address| resolve(dict, address.as_ref(), options))
        .collect()
}

/// What is left after the last stage that matched.
enum Residual<'t> {
    Text(std::borrow::Cow<'t, str>),
    Block { addr: String, rest: &'t str },
}

fn run_stages<'t>(dict: &Dictionary, text: &'t str, cap: u8, matched: &mut Matched) -> Residual<'t> {
    let untouched = |rest: &'t str| Residual::Text(rest.into());

    if cap < Level::Prefecture.as_u8() {
        return untouched(text);
    }

    let mut rest = text;
    if let Some(m) = prefecture::match_prefecture(dict, text) {
        matched.prefecture = Some(m.prefecture);
        rest = m.rest;
    }

    if cap < Level::City.as_u8() {
        return untouched(rest);
    }

    let Some(city) = city::match_city(dict, matched.prefecture, rest) else {
        debug!("No city in {:?}", rest);
        return untouched(rest);
    };
    matched.prefecture = Some(city.prefecture);
    matched.city = Some(city.city);
    rest = city.rest;

    if cap < Level::Town.as_u8() {
        return untouched(rest);
    }

    let Some(town) = town::match_town(dict, city.city, rest) else {
        debug!("No town of {} in {:?}", dict.city(city.city).name, rest);
        return untouched(rest);
    };
    matched.town = Some(town.town);
    rest = town.rest;

    let Some(tokens) = block::tokenize(rest) else {
        return untouched(rest);
    };

    if cap < Level::Block.as_u8() {
        // Block numbers are converted but not reported as an address
        let converted = format!("{} {}", tokens.joined(), tokens.rest.trim());
        return Residual::Text(converted.into());
    }

    matched.block = Some(BlockMatch {
        components: tokens.components.len(),
        record: dict.match_block(town.town, &tokens.components),
    });

    Residual::Block {
        addr: tokens.joined(),
        rest: tokens.rest,
    }
}

/// Resolver backed by a lazily loaded, shared dictionary.
///
/// The first call loads the dictionary; concurrent first calls share that
/// load and its outcome. A failed load is reported to every caller waiting on
/// it and retried on the next call.
pub struct AddressResolver<S> {
    cache: DictionaryCache<S>,
}

impl<S: DictionarySource + 'static> AddressResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            cache: DictionaryCache::new(source),
        }
    }

    pub async fn resolve(&self, address: &str, options: &ResolveOptions) -> Result<ResolvedAddress> {
        let dict = self.cache.get().await?;
        Ok(resolve(&dict, address, options))
    }

    /// Resolve a batch on the blocking pool, in parallel.
    pub async fn resolve_batch(
        &self,
        addresses: Vec<String>,
        options: ResolveOptions,
    ) -> Result<Vec<ResolvedAddress>> {
        let dict = self.cache.get().await?;
        let results =
            tokio::task::spawn_blocking(move || resolve_all(&dict, &addresses, &options)).await?;
        Ok(results)
    }

    /// The dictionary, loading it if necessary.
    pub async fn dictionary(&self) -> Result<Arc<Dictionary>> {
        self.cache.get().await
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.is_loaded()
    }
}
