use std::borrow::Cow;
use std::collections::HashSet;

use jmdict_db::DictionaryIndex;
use jmdict_pos::PartOfSpeech;
use jmdict_types::{EntryId, Fragment, parse_mecab_output};
use serde::Serialize;
use tracing::{debug, trace};

/// Source of fragments for [`resolve_text`].
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Fragment>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<Fragment>,
{
    fn tokenize(&self, text: &str) -> Vec<Fragment> {
        self(text)
    }
}

/// Input that has already been through `mecab` (default output format).
#[derive(Clone, Copy, Debug, Default)]
pub struct MecabOutput;

impl Tokenizer for MecabOutput {
    fn tokenize(&self, text: &str) -> Vec<Fragment> {
        parse_mecab_output(text)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// One entry had senses for the fragment's part of speech.
    Single,
    /// Several entries did; all of them are kept.
    Merged,
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchedSense {
    /// Position within the entry's senses.
    pub index: usize,
    pub pos: Vec<String>,
    pub glosses: Vec<String>,
}

/// One dictionary entry that survived narrowing, with only its matching senses.
#[derive(Clone, Debug, Serialize)]
pub struct EntryMatch {
    pub entry: EntryId,
    pub kanji: Vec<String>,
    pub readings: Vec<String>,
    pub senses: Vec<MatchedSense>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedEntry {
    pub surface: String,
    pub base_form: String,
    pub part_of_speech: &'static str,
    pub resolution: Resolution,
    /// Contributing entries in index order. Never empty.
    pub matches: Vec<EntryMatch>,
}

impl ResolvedEntry {
    /// Kanji forms of every contributing entry, first occurrence kept.
    pub fn kanji_forms(&self) -> Vec<&str> {
        union(self.matches.iter().flat_map(|m| &m.kanji))
    }

    pub fn reading_forms(&self) -> Vec<&str> {
        union(self.matches.iter().flat_map(|m| &m.readings))
    }

    pub fn glosses(&self) -> Vec<&str> {
        union(
            self.matches
                .iter()
                .flat_map(|m| &m.senses)
                .flat_map(|s| &s.glosses),
        )
    }
}

/// Pick the dictionary sense(s) for one fragment, or `None` to skip it.
///
/// Candidates come from the kanji index (base form) and fall back to the
/// reading index. Several candidates are first narrowed to those sharing the
/// fragment's reading, unless none do, and then to those with a sense for the
/// fragment's part of speech.
pub fn resolve(fragment: &Fragment, index: &DictionaryIndex) -> Option<ResolvedEntry> {
    let Some(pos) = PartOfSpeech::of(fragment) else {
        trace!(
            base_form = %fragment.base_form,
            category = %fragment.category,
            "skip: no dictionary part of speech"
        );
        return None;
    };
    let label = pos.label();
    let reading = index.normalizer().normalize(&fragment.reading);

    let Some(candidates) = index
        .lookup_by_kanji(&fragment.base_form)
        .or_else(|| index.lookup_by_reading(&reading))
    else {
        trace!(base_form = %fragment.base_form, %reading, "skip: not in dictionary");
        return None;
    };

    let candidates = narrow_by_reading(index, candidates, &reading);
    let matches: Vec<EntryMatch> = candidates
        .iter()
        .filter_map(|&id| match_entry(index, id, label))
        .collect();

    let resolution = match matches.len() {
        0 => {
            trace!(
                base_form = %fragment.base_form,
                candidates = candidates.len(),
                "skip: no sense labelled {label}"
            );
            return None;
        }
        1 => Resolution::Single,
        n => {
            debug!(base_form = %fragment.base_form, entries = n, "merging entries for {label}");
            Resolution::Merged
        }
    };

    Some(ResolvedEntry {
        surface: fragment.surface.clone(),
        base_form: fragment.base_form.clone(),
        part_of_speech: label,
        resolution,
        matches,
    })
}

/// Resolve fragments in order, dropping the ones that skip.
pub fn resolve_all<'a, I>(fragments: I, index: &DictionaryIndex) -> Vec<ResolvedEntry>
where
    I: IntoIterator<Item = &'a Fragment>,
{
    fragments
        .into_iter()
        .filter_map(|frag| resolve(frag, index))
        .collect()
}

pub fn resolve_text<T>(text: &str, tokenizer: &T, index: &DictionaryIndex) -> Vec<ResolvedEntry>
where
    T: Tokenizer + ?Sized,
{
    let fragments = tokenizer.tokenize(text);
    resolve_all(&fragments, index)
}

fn narrow_by_reading<'a>(
    index: &DictionaryIndex,
    candidates: &'a [EntryId],
    reading: &str,
) -> Cow<'a, [EntryId]> {
    if candidates.len() < 2 {
        return Cow::Borrowed(candidates);
    }

    let kana = index.normalizer();
    let narrowed: Vec<EntryId> = candidates
        .iter()
        .copied()
        .filter(|&id| {
            index
                .entry(id)
                .is_some_and(|e| e.readings.iter().any(|r| kana.eq_normalized(r, reading)))
        })
        .collect();

    if narrowed.is_empty() {
        Cow::Borrowed(candidates)
    } else {
        Cow::Owned(narrowed)
    }
}

fn match_entry(index: &DictionaryIndex, id: EntryId, label: &str) -> Option<EntryMatch> {
    let entry = index.entry(id)?;
    let senses: Vec<MatchedSense> = entry
        .senses_matching(label)
        .map(|(idx, sense)| MatchedSense {
            index: idx,
            pos: sense.pos.clone(),
            glosses: sense.glosses.clone(),
        })
        .collect();
    if senses.is_empty() {
        return None;
    }
    Some(EntryMatch {
        entry: id,
        kanji: entry.kanji.clone(),
        readings: entry.readings.clone(),
        senses,
    })
}

fn union<'a>(items: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    items
        .map(String::as_str)
        .filter(|s| seen.insert(*s))
        .collect()
}
