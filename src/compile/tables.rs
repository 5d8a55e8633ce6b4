//! Administrative CSV tables consumed by the compiler.

use anyhow::{Context, Result};
use csv::{Reader, ReaderBuilder};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Table files found under an input directory, in path order.
#[derive(Debug, Default)]
pub struct TableSet {
    pub towns: Vec<PathBuf>,
    pub blocks: Vec<PathBuf>,
    pub cities: Vec<PathBuf>,
    pub prefectures: Vec<PathBuf>,
}

impl TableSet {
    pub fn len(&self) -> usize {
        self.towns.len() + self.blocks.len() + self.cities.len() + self.prefectures.len()
    }
}

/// Find `towns*.csv`, `blocks*.csv`, `cities*.csv` and `prefs*.csv`
/// (each optionally `.gz`) anywhere below `dir`.
pub fn discover(dir: &Path) -> Result<TableSet> {
    let mut tables = TableSet::default();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.context("Failed to walk input directory")?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let stem = name.strip_suffix(".gz").unwrap_or(name);
        if !stem.ends_with(".csv") {
            continue;
        }

        let bucket = if stem.starts_with("towns") {
            &mut tables.towns
        } else if stem.starts_with("blocks") {
            &mut tables.blocks
        } else if stem.starts_with("cities") {
            &mut tables.cities
        } else if stem.starts_with("prefs") {
            &mut tables.prefectures
        } else {
            debug!("Ignoring {}", entry.path().display());
            continue;
        };
        bucket.push(entry.into_path());
    }

    Ok(tables)
}

/// CSV reader over a plain or gzip-compressed table with a header row.
pub fn open_table(path: &Path) -> Result<Reader<Box<dyn Read>>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    Ok(ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader))
}

#[derive(Debug, Clone, Deserialize)]
pub struct TownRow {
    pub pref_code: String,
    pub pref_name: String,
    pub city_code: String,
    pub city_name: String,
    pub town_name: String,
    /// `|`-separated alternative spellings
    #[serde(default)]
    pub aliases: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockRow {
    pub city_code: String,
    pub town_name: String,
    pub number: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityRow {
    pub city_code: String,
    #[serde(default)]
    pub aliases: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrefectureRow {
    pub pref_code: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Split a `|`-separated alias column.
pub fn split_aliases(column: &str) -> impl Iterator<Item = String> + '_ {
    column
        .split('|')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
}
