//! Load JMdict and build the lookup indices the resolver works from.
//!
//! The dictionary is a JSON file, either a plain list of
//! [`DictionaryEntry`] records or a jmdict-simplified export, read through a
//! memory map or an owned buffer ([`LoadMode`]). Readings are keyed through a
//! [`KanaNormalizer`] so katakana and hiragana spellings meet in one bucket.
//!
//! Everything here runs once at start-up; afterwards the
//! [`DictionaryIndex`] is immutable and can be shared across threads.
//!
//! # Example
//! ```no_run
//! use jmdict_db::{LoadMode, load_index};
//!
//! # fn main() -> Result<(), jmdict_db::LoadError> {
//! let index = load_index("JMdict_e.json", None, LoadMode::Mmap)?;
//! if let Some(ids) = index.lookup_by_kanji("亀") {
//!     for id in ids {
//!         println!("{id}: {:?}", index[*id].readings);
//!     }
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p jmdict-db --example stats -- <dict.json>`.

pub mod index;
pub mod kana;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use jmdict_types::{DictionaryEntry, Sense};
use memmap2::Mmap;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub use index::{DictionaryIndex, IndexStats, MAX_ENTRIES};
pub use kana::KanaNormalizer;

/// Strategy for reading the dictionary file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file and deserialize from the mapping.
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

impl LoadMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

/// Start-up failures. The index cannot be partially built, so any of these is
/// fatal to the caller.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dictionary {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{}:{line}: {reason}", .path.display())]
    KanaTable {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("{} holds {count} entries, more than the {max} an index can address", .path.display(), max = MAX_ENTRIES)]
    TooManyEntries { path: PathBuf, count: usize },
    #[error("kana table maps {from} to {to}, which is itself mapped to {next}")]
    ChainedKana { from: char, to: char, next: char },
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Load the dictionary and kana table and build the index in one go.
///
/// Without a kana table the built-in katakana → hiragana mapping is used.
pub fn load_index(
    dict_path: impl AsRef<Path>,
    kana_path: Option<&Path>,
    mode: LoadMode,
) -> Result<DictionaryIndex, LoadError> {
    let normalizer = match kana_path {
        Some(path) => {
            let table = KanaNormalizer::load(path)?;
            info!("loaded {} kana pairs from {}", table.len(), path.display());
            table
        }
        None => KanaNormalizer::katakana_to_hiragana(),
    };

    let entries = load_entries(dict_path, mode)?;

    let start = Instant::now();
    let index = DictionaryIndex::build(entries, normalizer);
    let stats = index.stats();
    info!(
        "indexed {} entries ({} kanji keys, {} reading keys) in {} ms",
        stats.entries,
        stats.kanji_keys,
        stats.reading_keys,
        start.elapsed().as_millis()
    );
    Ok(index)
}

/// Deserialize every entry of a dictionary file, in file order.
pub fn load_entries(path: impl AsRef<Path>, mode: LoadMode) -> Result<Vec<DictionaryEntry>, LoadError> {
    let path = path.as_ref();
    let start = Instant::now();
    let buffer = load_file(path, mode)?;
    let entries = parse_entries(buffer.as_slice()).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    check_entry_count(path, entries.len())?;
    info!(
        "loaded {} entries from {} in {} ms",
        entries.len(),
        path.display(),
        start.elapsed().as_millis()
    );
    Ok(entries)
}

/// Parse dictionary JSON already held in memory.
///
/// A document starting with `[` is a bare entry list; an object is either a
/// jmdict-simplified export (`words`) or a wrapped list (`entries`).
pub fn parse_entries(bytes: &[u8]) -> Result<Vec<DictionaryEntry>, serde_json::Error> {
    let first = bytes.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'[') {
        return serde_json::from_slice(bytes);
    }

    let file: DictionaryFile = serde_json::from_slice(bytes)?;
    match (file.words, file.entries) {
        (Some(words), _) => Ok(SimplifiedFile {
            tags: file.tags,
            words,
        }
        .into_entries()),
        (None, Some(entries)) => Ok(entries),
        (None, None) => Err(serde::de::Error::custom(
            "expected an entry list, `entries` or `words`",
        )),
    }
}

fn check_entry_count(path: &Path, count: usize) -> Result<(), LoadError> {
    if count > MAX_ENTRIES {
        return Err(LoadError::TooManyEntries {
            path: path.to_path_buf(),
            count,
        });
    }
    Ok(())
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer, LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    match mode {
        LoadMode::Mmap => unsafe { Mmap::map(&file) }.map(Buffer::Mmap).map_err(io_err),
        LoadMode::Owned => {
            let mut buf = Vec::new();
            file.read_to_end(&mut buf).map_err(io_err)?;
            Ok(Buffer::Owned(buf))
        }
    }
}

// Object-shaped dictionary files. Streamed straight from the buffer, so
// errors keep their line and column.
#[derive(Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    tags: HashMap<String, String>,
    words: Option<Vec<SimplifiedWord>>,
    entries: Option<Vec<DictionaryEntry>>,
}

// jmdict-simplified export: tag codes (`n`, `v5r`, `arch`) are expanded
// through the file's own `tags` table.
struct SimplifiedFile {
    tags: HashMap<String, String>,
    words: Vec<SimplifiedWord>,
}

#[derive(Deserialize)]
struct SimplifiedWord {
    #[serde(default)]
    kanji: Vec<SimplifiedText>,
    #[serde(default)]
    kana: Vec<SimplifiedText>,
    #[serde(default)]
    sense: Vec<SimplifiedSense>,
}

#[derive(Deserialize)]
struct SimplifiedText {
    text: String,
}

#[derive(Deserialize)]
struct SimplifiedSense {
    #[serde(rename = "partOfSpeech", default)]
    part_of_speech: Vec<String>,
    #[serde(default)]
    misc: Vec<String>,
    #[serde(default)]
    gloss: Vec<SimplifiedGloss>,
}

#[derive(Deserialize)]
struct SimplifiedGloss {
    #[serde(default = "english")]
    lang: String,
    text: String,
}

fn english() -> String {
    "eng".to_string()
}

impl SimplifiedFile {
    fn into_entries(self) -> Vec<DictionaryEntry> {
        let tags = self.tags;
        let expand = |codes: Vec<String>| -> Vec<String> {
            codes
                .into_iter()
                .map(|code| tags.get(&code).cloned().unwrap_or(code))
                .collect()
        };

        self.words
            .into_iter()
            .map(|word| DictionaryEntry {
                kanji: word.kanji.into_iter().map(|k| k.text).collect(),
                readings: word.kana.into_iter().map(|k| k.text).collect(),
                senses: word
                    .sense
                    .into_iter()
                    .map(|sense| Sense {
                        pos: expand(sense.part_of_speech),
                        misc: expand(sense.misc),
                        glosses: sense
                            .gloss
                            .into_iter()
                            .filter(|g| g.lang == "eng")
                            .map(|g| g.text)
                            .collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_wrapped_lists() {
        let bare = r#"[{"kanji":["亀"],"readings":["かめ"],"senses":[{"pos":["noun (common) (futsuumeishi)"],"glosses":["turtle"]}]}]"#.as_bytes();
        let wrapped = r#"{"entries":[{"readings":["これ"],"senses":[{"pos":["pronoun"],"glosses":["this"]}]}]}"#.as_bytes();
        assert_eq!(parse_entries(bare).unwrap()[0].kanji, vec!["亀".to_string()]);
        assert_eq!(parse_entries(wrapped).unwrap()[0].readings, vec!["これ".to_string()]);
    }

    #[test]
    fn expands_simplified_tags_and_keeps_english() {
        let json = r#"{
            "tags": {"n": "noun (common) (futsuumeishi)", "arch": "archaic"},
            "words": [{
                "id": "1",
                "kanji": [{"common": true, "text": "亀", "tags": []}],
                "kana": [{"common": true, "text": "かめ", "tags": [], "appliesToKanji": ["*"]}],
                "sense": [{
                    "partOfSpeech": ["n", "unknown-tag"],
                    "misc": ["arch"],
                    "gloss": [{"lang": "eng", "text": "tortoise"}, {"lang": "ger", "text": "Schildkröte"}]
                }]
            }]
        }"#;
        let entries = parse_entries(json.as_bytes()).unwrap();
        let sense = &entries[0].senses[0];
        assert_eq!(sense.pos, vec!["noun (common) (futsuumeishi)", "unknown-tag"]);
        assert_eq!(sense.misc, vec!["archaic"]);
        assert_eq!(sense.glosses, vec!["tortoise"]);
        assert!(entries[0].is_archaic_only());
    }

    #[test]
    fn rejects_non_dictionary_json() {
        assert!(parse_entries(br#"{"hello": 1}"#).is_err());
        assert!(parse_entries(b"not json").is_err());
    }

    #[test]
    fn malformed_entry_reports_its_position() {
        let json = "[\n  {\"kanji\": [\"亀\"]},\n  {\"readings\": [\"かめ\"]},\n  {\"kanji\": 5}\n]";
        let err = parse_entries(json.as_bytes()).unwrap_err();
        assert_eq!(err.line(), 4);
        assert!(err.column() > 0);

        let wrapped = "{\"entries\": [\n{\"kanji\": 5}]}";
        assert_eq!(parse_entries(wrapped.as_bytes()).unwrap_err().line(), 2);
    }

    #[test]
    fn leading_whitespace_before_bare_list() {
        let entries = parse_entries(b"\n  [ ]").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn entry_count_is_bounded_by_id_width() {
        let path = Path::new("JMdict_e.json");
        assert!(check_entry_count(path, MAX_ENTRIES).is_ok());
        let err = check_entry_count(path, MAX_ENTRIES + 1).unwrap_err();
        assert!(matches!(err, LoadError::TooManyEntries { .. }));
    }

    #[test]
    fn parses_load_mode() {
        assert_eq!(LoadMode::parse("MMAP"), Some(LoadMode::Mmap));
        assert_eq!(LoadMode::parse("owned"), Some(LoadMode::Owned));
        assert_eq!(LoadMode::parse("lazy"), None);
    }
}
