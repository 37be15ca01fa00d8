use std::collections::{BTreeMap, HashMap};
use std::ops::Index;

use jmdict_types::{DictionaryEntry, EntryId};
use serde::Serialize;
use tracing::warn;

use crate::kana::KanaNormalizer;

/// Largest number of entries an index can address.
pub const MAX_ENTRIES: usize = u32::MAX as usize;

/// Immutable kanji/reading lookup over a loaded dictionary.
///
/// Buckets list entries in load order; callers rely on that order as the
/// only tie-break between homographs.
pub struct DictionaryIndex {
    entries: Vec<DictionaryEntry>,
    normalizer: KanaNormalizer,
    by_kanji: HashMap<String, Vec<EntryId>>,
    by_reading: HashMap<String, Vec<EntryId>>,
}

/// Shape of an index, mostly useful to judge how ambiguous lookups are.
///
/// Archaic-only entries are counted in the bucket histograms like any other
/// entry, since they stay candidates during lookups; `archaic_only_entries`
/// reports how many there are.
#[derive(Clone, Debug, Default, Serialize)]
pub struct IndexStats {
    pub entries: usize,
    pub kanji_keys: usize,
    pub reading_keys: usize,
    /// Bucket size → number of kanji keys with that many entries.
    pub kanji_buckets: BTreeMap<usize, usize>,
    /// Bucket size → number of reading keys with that many entries.
    pub reading_buckets: BTreeMap<usize, usize>,
    pub archaic_only_entries: usize,
}

impl DictionaryIndex {
    /// Index every kanji form verbatim and every reading after normalization.
    ///
    /// Ids are `u32`: entries past [`MAX_ENTRIES`] are dropped with a warning.
    /// [`crate::load_entries`] rejects such files up front.
    pub fn build(mut entries: Vec<DictionaryEntry>, normalizer: KanaNormalizer) -> Self {
        if entries.len() > MAX_ENTRIES {
            warn!("dropping {} entries past the id limit", entries.len() - MAX_ENTRIES);
            entries.truncate(MAX_ENTRIES);
        }

        let mut by_kanji: HashMap<String, Vec<EntryId>> = HashMap::new();
        let mut by_reading: HashMap<String, Vec<EntryId>> = HashMap::new();

        for (id, entry) in (0..u32::MAX).map(EntryId).zip(&entries) {
            for form in &entry.kanji {
                push_unique(by_kanji.entry(form.clone()).or_default(), id);
            }
            for reading in &entry.readings {
                push_unique(
                    by_reading.entry(normalizer.normalize(reading)).or_default(),
                    id,
                );
            }
        }

        Self {
            entries,
            normalizer,
            by_kanji,
            by_reading,
        }
    }

    pub fn lookup_by_kanji(&self, form: &str) -> Option<&[EntryId]> {
        self.by_kanji.get(form).map(Vec::as_slice)
    }

    /// `normalized` must already have gone through [`Self::normalizer`].
    pub fn lookup_by_reading(&self, normalized: &str) -> Option<&[EntryId]> {
        self.by_reading.get(normalized).map(Vec::as_slice)
    }

    pub fn entry(&self, id: EntryId) -> Option<&DictionaryEntry> {
        self.entries.get(id.index())
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    /// The table the reading keys were built with.
    pub fn normalizer(&self) -> &KanaNormalizer {
        &self.normalizer
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            entries: self.entries.len(),
            kanji_keys: self.by_kanji.len(),
            reading_keys: self.by_reading.len(),
            kanji_buckets: histogram(&self.by_kanji),
            reading_buckets: histogram(&self.by_reading),
            archaic_only_entries: self
                .entries
                .iter()
                .filter(|e| e.is_archaic_only())
                .count(),
        }
    }
}

impl Index<EntryId> for DictionaryIndex {
    type Output = DictionaryEntry;

    fn index(&self, id: EntryId) -> &DictionaryEntry {
        &self.entries[id.index()]
    }
}

// Readings that collapse under normalization (カゲツ/かげつ) take one slot.
fn push_unique(bucket: &mut Vec<EntryId>, id: EntryId) {
    if bucket.last() != Some(&id) {
        bucket.push(id);
    }
}

fn histogram(map: &HashMap<String, Vec<EntryId>>) -> BTreeMap<usize, usize> {
    let mut out = BTreeMap::new();
    for bucket in map.values() {
        *out.entry(bucket.len()).or_insert(0) += 1;
    }
    out
}
