// Kotoba – Word puzzle search tools for Japanese and English
// Copyright (C) 2025  Neil Roberts
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use super::anagram::letter_key;
use super::error::{Result, SearchError};
use super::kana;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use unicode_normalization::UnicodeNormalization;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    Japanese,
    English,
}

impl Language {
    pub fn normalize(self, text: &str) -> String {
        match self {
            Language::Japanese => kana::normalize(text),
            Language::English => text.nfkc().collect::<String>().to_lowercase(),
        }
    }

    /// Short name used for report directories and manifests
    pub fn code(self) -> &'static str {
        match self {
            Language::Japanese => "jp",
            Language::English => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        match code {
            "jp" => Some(Language::Japanese),
            "en" => Some(Language::English),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct DictionaryDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub language: Language,
    pub file_name: &'static str,
}

pub static DEFINITIONS: [DictionaryDefinition; 2] = [
    DictionaryDefinition {
        key: "buta",
        name: "ぶた辞書",
        description: "ひらがなの単語リスト",
        language: Language::Japanese,
        file_name: "buta.txt",
    },
    DictionaryDefinition {
        key: "cefr",
        name: "CEFR-J word list",
        description: "English vocabulary graded by CEFR level",
        language: Language::English,
        file_name: "cefr.txt",
    },
];

pub fn definition(key: &str) -> Result<&'static DictionaryDefinition> {
    DEFINITIONS.iter()
        .find(|definition| definition.key == key)
        .ok_or_else(|| SearchError::NotFound(key.to_string()))
}

/// A normalized word list along with the indices used to search it.
/// The indices are built once and never modified afterwards.
pub struct Dictionary {
    definition: &'static DictionaryDefinition,
    words: Vec<String>,
    exact: HashSet<String>,
    // Words keyed by their sorted letters. The values are indices
    // into `words`.
    anagrams: HashMap<String, Vec<usize>>,
    by_length: HashMap<usize, Vec<usize>>,
}

impl Dictionary {
    pub fn from_text(
        definition: &'static DictionaryDefinition,
        text: &str,
    ) -> Dictionary {
        let words = text.split(|ch| ch == '\n' || ch == '\r')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| definition.language.normalize(line))
            .collect::<Vec<String>>();

        let mut exact = HashSet::with_capacity(words.len());
        let mut anagrams = HashMap::<String, Vec<usize>>::new();
        let mut by_length = HashMap::<usize, Vec<usize>>::new();

        for (index, word) in words.iter().enumerate() {
            exact.insert(word.clone());
            anagrams.entry(letter_key(word)).or_default().push(index);
            by_length.entry(word.chars().count()).or_default().push(index);
        }

        Dictionary {
            definition,
            words,
            exact,
            anagrams,
            by_length,
        }
    }

    pub fn definition(&self) -> &'static DictionaryDefinition {
        self.definition
    }

    pub fn language(&self) -> Language {
        self.definition.language
    }

    pub fn normalize(&self, text: &str) -> String {
        self.definition.language.normalize(text)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Membership test for an already normalized word
    pub fn contains(&self, word: &str) -> bool {
        self.exact.contains(word)
    }

    /// Words whose sorted letters are `key`, in dictionary order
    pub fn anagram_bucket<'a>(
        &'a self,
        key: &str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.indexed_words(self.anagrams.get(key))
    }

    /// Words with exactly `length` characters, in dictionary order
    pub fn words_of_length(
        &self,
        length: usize,
    ) -> impl Iterator<Item = &str> + '_ {
        self.indexed_words(self.by_length.get(&length))
    }

    fn indexed_words<'a>(
        &'a self,
        indices: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a str> + 'a {
        indices.into_iter()
            .flatten()
            .map(|&index| self.words[index].as_str())
    }
}

/// Loads dictionaries on first use and keeps them until they are
/// evicted. Callers get a shared handle so a search that is running
/// keeps its dictionary even if the store drops it.
pub struct DictionaryStore {
    data_dir: PathBuf,
    cache: Mutex<HashMap<&'static str, Arc<Dictionary>>>,
}

impl DictionaryStore {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> DictionaryStore {
        DictionaryStore {
            data_dir: data_dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<&'static str, Arc<Dictionary>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached dictionary or reads it from the data
    /// directory. The cache isn’t locked while the file is read so
    /// other dictionaries stay available. If two threads load the same
    /// dictionary at once, both get the copy that was cached first.
    pub fn load(&self, key: &str) -> Result<Arc<Dictionary>> {
        let definition = definition(key)?;

        if let Some(dictionary) = self.cache().get(definition.key) {
            return Ok(Arc::clone(dictionary));
        }

        let path = self.data_dir.join(definition.file_name);
        let start = Instant::now();

        let text = std::fs::read_to_string(&path).map_err(|source| {
            SearchError::Load { path: path.clone(), source }
        })?;

        let dictionary = Dictionary::from_text(definition, &text);

        tracing::info!(
            dictionary = definition.key,
            words = dictionary.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "loaded dictionary"
        );

        Ok(Arc::clone(
            self.cache()
                .entry(definition.key)
                .or_insert_with(|| Arc::new(dictionary)),
        ))
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.cache().contains_key(key)
    }

    /// Returns whether the dictionary was loaded
    pub fn unload(&self, key: &str) -> bool {
        self.cache().remove(key).is_some()
    }

    pub fn unload_all(&self) {
        self.cache().clear();
    }
}

#[cfg(test)]
pub(crate) fn japanese(text: &str) -> Dictionary {
    Dictionary::from_text(&DEFINITIONS[0], text)
}

#[cfg(test)]
pub(crate) fn english(text: &str) -> Dictionary {
    Dictionary::from_text(&DEFINITIONS[1], text)
}
