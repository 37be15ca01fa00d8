use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use jmdict_db::{LoadMode, load_index};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let dict_path = args
        .next()
        .map(PathBuf::from)
        .context("usage: cargo run -p jmdict-db --example stats -- <dict.json> [kana.csv]")?;
    let kana_path = args.next().map(PathBuf::from);

    let index = load_index(&dict_path, kana_path.as_deref(), LoadMode::Mmap)
        .with_context(|| format!("loading dictionary from {}", dict_path.display()))?;
    let stats = index.stats();

    println!("Dictionary: {}", dict_path.display());
    println!("Entries          : {}", stats.entries);
    println!("Archaic-only     : {}", stats.archaic_only_entries);
    println!("Kanji keys       : {}", stats.kanji_keys);
    println!("Reading keys     : {}", stats.reading_keys);

    // Largest buckets first: these are the lookups that need narrowing.
    println!("Kanji bucket sizes (size: keys):");
    for (size, keys) in stats.kanji_buckets.iter().rev().take(10) {
        println!("  {size:>4}: {keys}");
    }
    println!("Reading bucket sizes (size: keys):");
    for (size, keys) in stats.reading_buckets.iter().rev().take(10) {
        println!("  {size:>4}: {keys}");
    }

    for form in ["亀", "日本"] {
        let hits = index.lookup_by_kanji(form).map_or(0, <[_]>::len);
        println!("Kanji '{form}' candidates: {hits}");
    }

    Ok(())
}
