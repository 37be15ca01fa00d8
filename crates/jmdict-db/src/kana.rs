use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use tracing::{debug, warn};

use crate::LoadError;

const KATAKANA_FIRST: u32 = 0x30A1; // ァ
const KATAKANA_LAST: u32 = 0x30F6; // ヶ
const HIRAGANA_OFFSET: u32 = 0x60;

/// Character-for-character substitution table used to compare readings
/// regardless of script.
///
/// Every output character of the table is a fixed point, so
/// `normalize(normalize(s)) == normalize(s)` and the character count of the
/// input is preserved.
#[derive(Clone, Debug, Default)]
pub struct KanaNormalizer {
    table: HashMap<char, char>,
}

impl KanaNormalizer {
    /// Build from `(input, output)` pairs.
    ///
    /// A repeated input keeps its first mapping. A table in which an output
    /// is itself rewritten to another character is rejected.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (char, char)>,
    {
        let mut table = HashMap::new();
        for (from, to) in pairs {
            match table.entry(from) {
                Entry::Vacant(slot) => {
                    slot.insert(to);
                }
                Entry::Occupied(existing) => {
                    if *existing.get() != to {
                        warn!(
                            "kana table maps {from} twice ({} and {to}); keeping the first",
                            existing.get()
                        );
                    }
                }
            }
        }

        for (&from, &to) in &table {
            if let Some(&next) = table.get(&to)
                && next != to
            {
                return Err(LoadError::ChainedKana { from, to, next });
            }
        }

        Ok(Self { table })
    }

    /// Katakana U+30A1..=U+30F6 onto their hiragana counterparts.
    pub fn katakana_to_hiragana() -> Self {
        let table = (KATAKANA_FIRST..=KATAKANA_LAST)
            .filter_map(|cp| {
                let kata = char::from_u32(cp)?;
                let hira = char::from_u32(cp - HIRAGANA_OFFSET)?;
                Some((kata, hira))
            })
            .collect();
        Self { table }
    }

    /// Load a `romaji,hiragana,katakana` table, skipping `#` comments and
    /// blank lines. Rows whose kana are not single characters (digraphs such
    /// as `kya`) are dropped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_table(path, &text)
    }

    fn parse_table(path: &Path, text: &str) -> Result<Self, LoadError> {
        let mut pairs = Vec::new();
        let mut dropped = 0usize;
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<&str> = line.split(',').map(str::trim).collect();
            if cols.len() < 3 {
                return Err(LoadError::KanaTable {
                    path: path.to_path_buf(),
                    line: lineno + 1,
                    reason: format!("expected romaji,hiragana,katakana, got {} column(s)", cols.len()),
                });
            }
            match (single_char(cols[2]), single_char(cols[1])) {
                (Some(kata), Some(hira)) => pairs.push((kata, hira)),
                _ => {
                    dropped += 1;
                    debug!("{}:{} skipping multi-character row {line}", path.display(), lineno + 1);
                }
            }
        }
        debug!("kana table {}: {} pairs, {dropped} dropped", path.display(), pairs.len());
        Self::from_pairs(pairs)
    }

    pub fn normalize(&self, text: &str) -> String {
        text.chars().map(|c| self.map_char(c)).collect()
    }

    /// Compare two strings as if both had been normalized, without allocating.
    pub fn eq_normalized(&self, a: &str, b: &str) -> bool {
        a.chars()
            .map(|c| self.map_char(c))
            .eq(b.chars().map(|c| self.map_char(c)))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn map_char(&self, c: char) -> char {
        self.table.get(&c).copied().unwrap_or(c)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &["カメ", "かめ", "テレビ", "ヴァイオリン", "亀ガメ", "", "abcー", "ヵヶ"];

    #[test]
    fn builtin_table_maps_katakana() {
        let kana = KanaNormalizer::katakana_to_hiragana();
        assert_eq!(kana.normalize("カメ"), "かめ");
        assert_eq!(kana.normalize("テレビ"), "てれび");
        assert_eq!(kana.normalize("ヴ"), "ゔ");
        assert_eq!(kana.normalize("ヶ"), "ゖ");
        assert_eq!(kana.normalize("亀ー"), "亀ー");
    }

    #[test]
    fn normalize_is_idempotent_and_length_preserving() {
        let kana = KanaNormalizer::katakana_to_hiragana();
        for s in SAMPLES {
            let once = kana.normalize(s);
            assert_eq!(kana.normalize(&once), once, "{s}");
            assert_eq!(once.chars().count(), s.chars().count(), "{s}");
        }
    }

    #[test]
    fn eq_normalized_ignores_script() {
        let kana = KanaNormalizer::katakana_to_hiragana();
        assert!(kana.eq_normalized("テレビ", "てれび"));
        assert!(kana.eq_normalized("てれび", "テレビ"));
        assert!(!kana.eq_normalized("テレビ", "てれ"));
    }

    #[test]
    fn rejects_chained_mappings() {
        let err = KanaNormalizer::from_pairs([('a', 'b'), ('b', 'c')]).unwrap_err();
        assert!(matches!(err, LoadError::ChainedKana { from: 'a', to: 'b', next: 'c' }));
        assert!(KanaNormalizer::from_pairs([('a', 'b'), ('b', 'b')]).is_ok());
    }

    #[test]
    fn duplicate_inputs_keep_first() {
        let kana = KanaNormalizer::from_pairs([('カ', 'か'), ('カ', 'が')]).unwrap();
        assert_eq!(kana.normalize("カ"), "か");
        assert_eq!(kana.len(), 1);
    }

    #[test]
    fn parses_table_and_drops_digraphs() {
        let text = "# romaji,hiragana,katakana\na,あ,ア\n\nkya,きゃ,キャ\nka,か,カ\n";
        let kana = KanaNormalizer::parse_table(Path::new("kana.csv"), text).unwrap();
        assert_eq!(kana.len(), 2);
        assert_eq!(kana.normalize("アカキャ"), "あかキャ");
    }

    #[test]
    fn short_rows_are_an_error() {
        let err = KanaNormalizer::parse_table(Path::new("kana.csv"), "a,あ,ア\nka,か\n").unwrap_err();
        assert!(matches!(err, LoadError::KanaTable { line: 2, .. }));
    }
}
