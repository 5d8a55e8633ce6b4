//! Dictionary compiler.
//!
//! Reads administrative CSV tables, assembles them into the dictionary
//! interchange format, checks that the result indexes cleanly and writes it
//! as JSON (gzip-compressed when the output name ends in `.gz`).

mod builder;
mod tables;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use flate2::write::GzEncoder;
use flate2::Compression;
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use jusho::models::DictionaryData;
use jusho::Dictionary;

use crate::builder::DictionaryBuilder;
use crate::tables::{discover, open_table, BlockRow, CityRow, PrefectureRow, TownRow};

#[derive(Parser, Debug)]
#[command(name = "compile")]
#[command(about = "Compile administrative CSV tables into a jusho dictionary")]
struct Args {
    /// Directory searched recursively for towns/blocks/cities/prefs CSV files
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (.json or .json.gz)
    #[arg(short, long, default_value = "dictionary.json.gz")]
    output: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Jusho Dictionary Compiler");
    info!("Input: {}", args.input.display());

    let tables = discover(&args.input)?;
    if tables.towns.is_empty() {
        anyhow::bail!("No towns*.csv tables under {}", args.input.display());
    }
    info!(
        "Found {} tables ({} town, {} block, {} city, {} prefecture)",
        tables.len(),
        tables.towns.len(),
        tables.blocks.len(),
        tables.cities.len(),
        tables.prefectures.len()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} rows ({per_sec}) {msg}")?,
    );

    let mut builder = DictionaryBuilder::new();

    // Towns first: every other table attaches to records they create
    for path in &tables.towns {
        for_each_row(path, &pb, |row: TownRow| {
            builder.add_town(row);
            true
        })?;
    }

    let mut skipped = 0usize;
    for path in &tables.cities {
        skipped += for_each_row(path, &pb, |row: CityRow| builder.add_city_details(row))?;
    }
    for path in &tables.prefectures {
        skipped += for_each_row(path, &pb, |row: PrefectureRow| {
            builder.add_prefecture_details(row)
        })?;
    }
    for path in &tables.blocks {
        skipped += for_each_row(path, &pb, |row: BlockRow| builder.add_block(row))?;
    }
    pb.finish_with_message("done");

    if skipped > 0 {
        warn!("Skipped {} rows referring to unknown records", skipped);
    }

    let data = builder.finish(Utc::now());

    // Refuse to write something the resolver would reject
    let dictionary = Dictionary::build(data.clone()).context("Compiled dictionary is invalid")?;
    info!(
        "Compiled {} cities and {} towns",
        dictionary.city_count(),
        dictionary.town_count()
    );

    write_dictionary(&data, &args.output)?;
    info!("Wrote {}", args.output.display());

    Ok(())
}

/// Feed every row of `path` to `handle`; returns how many it rejected.
fn for_each_row<R, F>(path: &Path, pb: &ProgressBar, mut handle: F) -> Result<usize>
where
    R: DeserializeOwned,
    F: FnMut(R) -> bool,
{
    pb.set_message(path.display().to_string());
    let mut reader = open_table(path)?;
    let mut rejected = 0;

    for (line, row) in reader.deserialize::<R>().enumerate() {
        let row = row.with_context(|| format!("{}: bad row {}", path.display(), line + 2))?;
        if !handle(row) {
            rejected += 1;
        }
        pb.inc(1);
    }

    Ok(rejected)
}

fn write_dictionary(data: &DictionaryData, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);

    if path.extension().is_some_and(|e| e == "gz") {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        serde_json::to_writer(&mut encoder, data)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = writer;
        serde_json::to_writer(&mut writer, data)?;
        writer.flush()?;
    }

    Ok(())
}
