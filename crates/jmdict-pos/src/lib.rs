//! Translate IPADIC grammatical tags into JMdict part-of-speech labels.
//!
//! A tokenizer describes a morpheme with a category (`名詞`, `動詞`, ...), up to
//! two sub-categories and a conjugation class (`五段・ラ行`). JMdict describes
//! senses with English labels (`Godan verb with 'ru' ending`). This crate
//! parses the tag tuple into a [`PartOfSpeech`] and hands back the label
//! *prefix* to match senses against; JMdict is finer grained than IPADIC
//! (transitivity, irregular subclasses), so callers compare with
//! `starts_with`.
//!
//! Tags with no dictionary counterpart (symbols, proper nouns, irregular
//! verbs) classify to `None`.
//!
//! # Example
//! ```
//! use jmdict_pos::{PartOfSpeech, map};
//!
//! assert_eq!(map("名詞", Some("代名詞"), None, None), Some("pronoun"));
//! assert_eq!(
//!     map("動詞", Some("自立"), None, Some("五段・ラ行特殊")),
//!     Some("Godan verb - -aru special class"),
//! );
//! assert_eq!(map("記号", Some("句点"), None, None), None);
//! assert!(PartOfSpeech::classify("助詞", None, None, None).is_some());
//! ```
//!
//! For a runnable demo, see `mecab | cargo run -p jmdict-pos --example classify`.

use std::fmt;

use jmdict_types::Fragment;

/// Dictionary-relevant role of a morpheme.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PartOfSpeech {
    Particle,
    Noun(NounClass),
    Verb(VerbClass),
    AuxiliaryVerb,
    Adjective,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NounClass {
    Common,
    Pronoun,
    Suffix,
    Counter,
    Numeral,
    VerbalNoun,
    AdjectivalNoun,
    Adverbial,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum VerbClass {
    Ichidan,
    Godan(GodanRow),
    /// なさる, いらっしゃる and friends.
    GodanAru,
    /// 行く: its te/ta forms are irregular.
    GodanIkuYuku,
}

/// Kana row of a Godan verb's final syllable.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum GodanRow {
    U,
    Ku,
    Gu,
    Su,
    Tsu,
    Nu,
    Bu,
    Mu,
    Ru,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Category {
    Particle,
    Noun,
    Verb,
    AuxiliaryVerb,
    Adjective,
    Symbol,
}

const CATEGORIES: &[(&str, Category)] = &[
    ("助詞", Category::Particle),
    ("名詞", Category::Noun),
    ("動詞", Category::Verb),
    ("助動詞", Category::AuxiliaryVerb),
    ("形容詞", Category::Adjective),
    ("記号", Category::Symbol),
];

const NOUN_CLASSES: &[(&str, NounClass)] = &[
    ("一般", NounClass::Common),
    ("代名詞", NounClass::Pronoun),
    ("接尾", NounClass::Suffix),
    ("数", NounClass::Numeral),
    ("サ変接続", NounClass::VerbalNoun),
    ("形容動詞語幹", NounClass::AdjectivalNoun),
    ("副詞可能", NounClass::Adverbial),
];

const COUNTER_SUFFIX: &str = "助数詞";

const ICHIDAN: &str = "一段";
const GODAN: &str = "五段";
const CONJUGATION_SEP: char = '・';

// Checked before the plain rows: both start with a row name.
const GODAN_SPECIAL: &[(&str, VerbClass)] = &[
    ("ラ行特殊", VerbClass::GodanAru),
    ("カ行促音便", VerbClass::GodanIkuYuku),
];

// IPADIC splits some rows further (ワ行促音便, カ行イ音便, ラ行アル); those
// share the row's label.
const GODAN_ROWS: &[(&str, GodanRow)] = &[
    ("ワ行", GodanRow::U),
    ("カ行", GodanRow::Ku),
    ("ガ行", GodanRow::Gu),
    ("サ行", GodanRow::Su),
    ("タ行", GodanRow::Tsu),
    ("ナ行", GodanRow::Nu),
    ("バ行", GodanRow::Bu),
    ("マ行", GodanRow::Mu),
    ("ラ行", GodanRow::Ru),
];

impl PartOfSpeech {
    /// Parse an IPADIC tag tuple. Unset fields are `None` (IPADIC writes `*`).
    pub fn classify(
        category: &str,
        sub1: Option<&str>,
        sub2: Option<&str>,
        conjugation: Option<&str>,
    ) -> Option<Self> {
        match exact(CATEGORIES, category)? {
            Category::Particle => Some(PartOfSpeech::Particle),
            Category::Noun => noun_class(sub1, sub2).map(PartOfSpeech::Noun),
            Category::Verb => verb_class(conjugation?).map(PartOfSpeech::Verb),
            Category::AuxiliaryVerb => Some(PartOfSpeech::AuxiliaryVerb),
            Category::Adjective => Some(PartOfSpeech::Adjective),
            Category::Symbol => None,
        }
    }

    pub fn of(fragment: &Fragment) -> Option<Self> {
        Self::classify(
            &fragment.category,
            fragment.sub1.as_deref(),
            fragment.sub2.as_deref(),
            fragment.conjugation.as_deref(),
        )
    }

    /// JMdict label prefix for this role.
    pub fn label(self) -> &'static str {
        match self {
            PartOfSpeech::Particle => "particle",
            PartOfSpeech::AuxiliaryVerb => "auxiliary verb",
            PartOfSpeech::Adjective => "adjective (keiyoushi)",
            PartOfSpeech::Noun(class) => match class {
                NounClass::Common => "noun (common) (futsuumeishi)",
                NounClass::Pronoun => "pronoun",
                NounClass::Suffix => "noun, used as a suffix",
                NounClass::Counter => "counter",
                NounClass::Numeral => "numeric",
                NounClass::VerbalNoun => "noun or participle which takes the aux. verb suru",
                NounClass::AdjectivalNoun => "adjectival nouns or quasi-adjectives (keiyodoshi)",
                NounClass::Adverbial => "adverbial noun (fukushitekimeishi)",
            },
            PartOfSpeech::Verb(class) => match class {
                VerbClass::Ichidan => "Ichidan verb",
                VerbClass::GodanAru => "Godan verb - -aru special class",
                VerbClass::GodanIkuYuku => "Godan verb - Iku/Yuku special class",
                VerbClass::Godan(row) => match row {
                    GodanRow::U => "Godan verb with 'u' ending",
                    GodanRow::Ku => "Godan verb with 'ku' ending",
                    GodanRow::Gu => "Godan verb with 'gu' ending",
                    GodanRow::Su => "Godan verb with 'su' ending",
                    GodanRow::Tsu => "Godan verb with 'tsu' ending",
                    GodanRow::Nu => "Godan verb with 'nu' ending",
                    GodanRow::Bu => "Godan verb with 'bu' ending",
                    GodanRow::Mu => "Godan verb with 'mu' ending",
                    GodanRow::Ru => "Godan verb with 'ru' ending",
                },
            },
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label prefix for a tag tuple, or `None` when the dictionary has no
/// counterpart.
pub fn map(
    category: &str,
    sub1: Option<&str>,
    sub2: Option<&str>,
    conjugation: Option<&str>,
) -> Option<&'static str> {
    PartOfSpeech::classify(category, sub1, sub2, conjugation).map(PartOfSpeech::label)
}

/// [`map`] applied to a fragment's tags.
pub fn map_fragment(fragment: &Fragment) -> Option<&'static str> {
    PartOfSpeech::of(fragment).map(PartOfSpeech::label)
}

fn noun_class(sub1: Option<&str>, sub2: Option<&str>) -> Option<NounClass> {
    match (exact(NOUN_CLASSES, sub1?)?, sub2) {
        (NounClass::Suffix, Some(COUNTER_SUFFIX)) => Some(NounClass::Counter),
        (class, _) => Some(class),
    }
}

fn verb_class(conjugation: &str) -> Option<VerbClass> {
    if conjugation == ICHIDAN
        || conjugation
            .strip_prefix(ICHIDAN)
            .is_some_and(|rest| rest.starts_with(CONJUGATION_SEP))
    {
        return Some(VerbClass::Ichidan);
    }

    let row = conjugation
        .strip_prefix(GODAN)?
        .strip_prefix(CONJUGATION_SEP)?;
    prefixed(GODAN_SPECIAL, row).or_else(|| prefixed(GODAN_ROWS, row).map(VerbClass::Godan))
}

fn exact<T: Copy>(table: &[(&str, T)], tag: &str) -> Option<T> {
    table.iter().find(|(key, _)| *key == tag).map(|(_, v)| *v)
}

fn prefixed<T: Copy>(table: &[(&str, T)], tag: &str) -> Option<T> {
    table
        .iter()
        .find(|(key, _)| tag.starts_with(key))
        .map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    type Row = (&'static str, Option<&'static str>, Option<&'static str>, Option<&'static str>, &'static str);

    const TABLE: &[Row] = &[
        ("助詞", Some("格助詞"), Some("一般"), None, "particle"),
        ("助詞", None, None, None, "particle"),
        ("名詞", Some("一般"), None, None, "noun (common) (futsuumeishi)"),
        ("名詞", Some("代名詞"), Some("一般"), None, "pronoun"),
        ("名詞", Some("接尾"), Some("一般"), None, "noun, used as a suffix"),
        ("名詞", Some("接尾"), Some("助数詞"), None, "counter"),
        ("名詞", Some("数"), None, None, "numeric"),
        ("名詞", Some("サ変接続"), None, None, "noun or participle which takes the aux. verb suru"),
        ("名詞", Some("形容動詞語幹"), None, None, "adjectival nouns or quasi-adjectives (keiyodoshi)"),
        ("名詞", Some("副詞可能"), None, None, "adverbial noun (fukushitekimeishi)"),
        ("動詞", Some("自立"), None, Some("一段"), "Ichidan verb"),
        ("動詞", Some("自立"), None, Some("一段・クレル"), "Ichidan verb"),
        ("動詞", Some("自立"), None, Some("五段・ワ行促音便"), "Godan verb with 'u' ending"),
        ("動詞", Some("自立"), None, Some("五段・ワ行ウ音便"), "Godan verb with 'u' ending"),
        ("動詞", Some("自立"), None, Some("五段・カ行イ音便"), "Godan verb with 'ku' ending"),
        ("動詞", Some("自立"), None, Some("五段・カ行促音便"), "Godan verb - Iku/Yuku special class"),
        ("動詞", Some("自立"), None, Some("五段・カ行促音便ユク"), "Godan verb - Iku/Yuku special class"),
        ("動詞", Some("自立"), None, Some("五段・ガ行"), "Godan verb with 'gu' ending"),
        ("動詞", Some("自立"), None, Some("五段・サ行"), "Godan verb with 'su' ending"),
        ("動詞", Some("自立"), None, Some("五段・タ行"), "Godan verb with 'tsu' ending"),
        ("動詞", Some("自立"), None, Some("五段・ナ行"), "Godan verb with 'nu' ending"),
        ("動詞", Some("自立"), None, Some("五段・バ行"), "Godan verb with 'bu' ending"),
        ("動詞", Some("自立"), None, Some("五段・マ行"), "Godan verb with 'mu' ending"),
        ("動詞", Some("自立"), None, Some("五段・ラ行"), "Godan verb with 'ru' ending"),
        ("動詞", Some("自立"), None, Some("五段・ラ行アル"), "Godan verb with 'ru' ending"),
        ("動詞", Some("自立"), None, Some("五段・ラ行特殊"), "Godan verb - -aru special class"),
        ("助動詞", None, None, Some("特殊・ダ"), "auxiliary verb"),
        ("形容詞", Some("自立"), None, Some("形容詞・アウオ段"), "adjective (keiyoushi)"),
    ];

    const UNMAPPED: &[(&str, Option<&str>, Option<&str>, Option<&str>)] = &[
        ("記号", Some("句点"), None, None),
        ("記号", Some("一般"), None, None),
        ("記号", None, None, Some("一段")),
        ("名詞", Some("固有名詞"), Some("人名"), None),
        ("名詞", Some("非自立"), None, None),
        ("名詞", None, None, None),
        ("動詞", Some("自立"), None, None),
        ("動詞", Some("自立"), None, Some("サ変・スル")),
        ("動詞", Some("自立"), None, Some("カ変・来ル")),
        ("動詞", Some("自立"), None, Some("五段")),
        ("動詞", Some("自立"), None, Some("五段・ヤ行")),
        ("副詞", Some("一般"), None, None),
        ("フィラー", None, None, None),
        ("", None, None, None),
    ];

    #[test]
    fn maps_every_documented_class() {
        for (category, sub1, sub2, conj, label) in TABLE {
            assert_eq!(
                map(category, *sub1, *sub2, *conj),
                Some(*label),
                "{category} {sub1:?} {sub2:?} {conj:?}"
            );
        }
    }

    #[test]
    fn unmapped_tags_yield_none() {
        for (category, sub1, sub2, conj) in UNMAPPED {
            assert_eq!(
                map(category, *sub1, *sub2, *conj),
                None,
                "{category} {sub1:?} {sub2:?} {conj:?}"
            );
        }
    }

    #[test]
    fn mapping_is_deterministic() {
        for (category, sub1, sub2, conj, _) in TABLE {
            let first = map(category, *sub1, *sub2, *conj);
            for _ in 0..3 {
                assert_eq!(map(category, *sub1, *sub2, *conj), first);
            }
        }
    }

    #[test]
    fn labels_are_distinct_per_class() {
        let classes: HashSet<PartOfSpeech> = TABLE
            .iter()
            .filter_map(|(c, s1, s2, conj, _)| PartOfSpeech::classify(c, *s1, *s2, *conj))
            .collect();
        let labels: HashSet<&str> = classes.iter().map(|p| p.label()).collect();
        assert_eq!(classes.len(), labels.len());
        assert_eq!(classes.len(), 23);
    }

    #[test]
    fn classifies_fragments() {
        let frag = Fragment::from_ipadic("亀", "名詞,一般,*,*,*,*,亀,カメ,カメ");
        assert_eq!(
            PartOfSpeech::of(&frag),
            Some(PartOfSpeech::Noun(NounClass::Common))
        );
        assert_eq!(map_fragment(&frag), Some("noun (common) (futsuumeishi)"));
        assert_eq!(
            PartOfSpeech::Verb(VerbClass::Godan(GodanRow::Ru)).to_string(),
            "Godan verb with 'ru' ending"
        );
    }
}
