//! Shared types for resolving tokenizer output against JMdict.
//!
//! Dictionary records ([`DictionaryEntry`], [`Sense`]) mirror the structure of
//! JMdict after deserialization: an entry carries its kanji forms, its reading
//! forms and an ordered list of senses, each with part-of-speech labels, misc
//! annotations and glosses. Entries have no identity of their own beyond their
//! position in the loaded collection, which [`EntryId`] captures.
//!
//! [`Fragment`] is the tokenizer side: one morpheme with its base form,
//! reading and IPADIC grammatical tags. [`parse_mecab_output`] turns the text
//! output of MeCab (or any IPADIC-compatible analyzer) into fragments.
//!
//! ```rust
//! use jmdict_types::{Fragment, parse_mecab_output};
//!
//! let frags = parse_mecab_output("亀\t名詞,一般,*,*,*,*,亀,カメ,カメ\nEOS\n");
//! assert_eq!(frags.len(), 1);
//! assert_eq!(frags[0].base_form, "亀");
//! assert_eq!(frags[0].sub1.as_deref(), Some("一般"));
//! assert_eq!(frags[0].sub2, None);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of an entry in the loaded dictionary collection.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u32);

impl EntryId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One JMdict entry: written forms, readings and senses.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    #[serde(default)]
    pub kanji: Vec<String>,
    #[serde(default)]
    pub readings: Vec<String>,
    #[serde(default)]
    pub senses: Vec<Sense>,
}

impl DictionaryEntry {
    /// Senses with at least one part-of-speech label starting with `prefix`,
    /// paired with their position in [`DictionaryEntry::senses`].
    pub fn senses_matching<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (usize, &'a Sense)> + 'a {
        self.senses
            .iter()
            .enumerate()
            .filter(move |(_, sense)| sense.matches_pos(prefix))
    }

    /// True when the entry has senses and all of them are marked archaic.
    pub fn is_archaic_only(&self) -> bool {
        !self.senses.is_empty() && self.senses.iter().all(Sense::is_archaic)
    }
}

/// A single meaning of an entry.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Sense {
    #[serde(default)]
    pub pos: Vec<String>,
    #[serde(default)]
    pub misc: Vec<String>,
    #[serde(default)]
    pub glosses: Vec<String>,
}

impl Sense {
    /// Dictionary labels are finer grained than tokenizer classes, so the
    /// comparison is by prefix.
    pub fn matches_pos(&self, prefix: &str) -> bool {
        self.pos.iter().any(|label| label.starts_with(prefix))
    }

    pub fn is_archaic(&self) -> bool {
        self.misc
            .iter()
            .any(|m| m.contains("archaic") || m == "archaism")
    }
}

/// One morpheme as produced by an IPADIC-style tokenizer.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    pub surface: String,
    pub base_form: String,
    #[serde(default)]
    pub reading: String,
    pub category: String,
    #[serde(default)]
    pub sub1: Option<String>,
    #[serde(default)]
    pub sub2: Option<String>,
    #[serde(default)]
    pub conjugation: Option<String>,
}

impl Fragment {
    /// Build a fragment from a surface string and its IPADIC feature CSV
    /// (`品詞,細分類1,細分類2,細分類3,活用型,活用形,原形,読み,発音`).
    ///
    /// Unknown words carry only seven columns and `*` as base form; the surface
    /// stands in for whatever is missing.
    pub fn from_ipadic(surface: &str, feature: &str) -> Self {
        let cols: Vec<&str> = feature.split(',').collect();
        let col = |i: usize| cols.get(i).copied().and_then(unset);

        Self {
            surface: surface.to_string(),
            base_form: col(6).unwrap_or(surface).to_string(),
            reading: col(7).unwrap_or(surface).to_string(),
            category: col(0).unwrap_or_default().to_string(),
            sub1: col(1).map(str::to_string),
            sub2: col(2).map(str::to_string),
            conjugation: col(4).map(str::to_string),
        }
    }
}

/// Parse MeCab's default output format: one `surface\tfeature` line per
/// morpheme, sentences terminated by `EOS`.
pub fn parse_mecab_output(text: &str) -> Vec<Fragment> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty() && *line != "EOS")
        .filter_map(|line| line.split_once('\t'))
        .map(|(surface, feature)| Fragment::from_ipadic(surface, feature))
        .collect()
}

fn unset(field: &str) -> Option<&str> {
    match field.trim() {
        "" | "*" => None,
        value => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sense(pos: &[&str], misc: &[&str]) -> Sense {
        Sense {
            pos: pos.iter().map(|s| s.to_string()).collect(),
            misc: misc.iter().map(|s| s.to_string()).collect(),
            glosses: vec!["x".into()],
        }
    }

    #[test]
    fn parses_conjugated_verb_feature() {
        let frag = Fragment::from_ipadic("走っ", "動詞,自立,*,*,五段・ラ行,連用タ接続,走る,ハシッ,ハシッ");
        assert_eq!(frag.surface, "走っ");
        assert_eq!(frag.base_form, "走る");
        assert_eq!(frag.reading, "ハシッ");
        assert_eq!(frag.category, "動詞");
        assert_eq!(frag.sub1.as_deref(), Some("自立"));
        assert_eq!(frag.sub2, None);
        assert_eq!(frag.conjugation.as_deref(), Some("五段・ラ行"));
    }

    #[test]
    fn unknown_word_falls_back_to_surface() {
        let frag = Fragment::from_ipadic("ぴえん", "名詞,一般,*,*,*,*,*");
        assert_eq!(frag.base_form, "ぴえん");
        assert_eq!(frag.reading, "ぴえん");
        assert_eq!(frag.conjugation, None);
    }

    #[test]
    fn mecab_output_skips_eos_and_blank_lines() {
        let text = "亀\t名詞,一般,*,*,*,*,亀,カメ,カメ\r\n。\t記号,句点,*,*,*,*,。,。,。\nEOS\n\nbroken line\n";
        let frags = parse_mecab_output(text);
        assert_eq!(frags.len(), 2);
        assert_eq!(frags[1].category, "記号");
    }

    #[test]
    fn pos_matching_is_by_prefix() {
        let s = sense(&["Godan verb with 'ru' ending (irregular verb)"], &[]);
        assert!(s.matches_pos("Godan verb with 'ru' ending"));
        assert!(!s.matches_pos("Ichidan verb"));
        assert!(!Sense::default().matches_pos("noun"));
    }

    #[test]
    fn archaic_only_needs_every_sense() {
        let mut entry = DictionaryEntry {
            kanji: vec![],
            readings: vec!["けり".into()],
            senses: vec![sense(&["particle"], &["archaic"]), sense(&["particle"], &["archaism"])],
        };
        assert!(entry.is_archaic_only());
        entry.senses.push(sense(&["particle"], &[]));
        assert!(!entry.is_archaic_only());
        assert!(!DictionaryEntry::default().is_archaic_only());
    }

    #[test]
    fn entry_defaults_missing_fields() {
        let entry: DictionaryEntry =
            serde_json::from_str(r#"{"readings":["かめ"],"senses":[{"glosses":["turtle"]}]}"#)
                .unwrap();
        assert!(entry.kanji.is_empty());
        assert!(entry.senses[0].pos.is_empty());
        assert_eq!(entry.senses_matching("noun").count(), 0);
    }
}
