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

use super::anagram::exact_anagrams;
use super::dictionary::{Dictionary, Language};
use super::error::{Result, SearchError};
use super::kana::{KanaToken, KANA_RING_LENGTH};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const SHIFT_EXACT_RESULT_MAXCOUNT: usize = 1000;
pub const SHIFT_ANAGRAM_RESULT_MAXCOUNT: usize = 3000;
pub const SHIFT_TOTAL_RESULT_MAXCOUNT: usize = 5000;

const ALPHABET_LENGTH: usize = 26;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize,
)]
pub enum MatchType {
    // Declared first so that exact matches sort first
    #[serde(rename = "完全一致")]
    Exact,
    #[serde(rename = "アナグラム")]
    Anagram,
}

impl MatchType {
    pub fn label(self) -> &'static str {
        match self {
            MatchType::Exact => "完全一致",
            MatchType::Anagram => "アナグラム",
        }
    }

    pub fn from_label(label: &str) -> Option<MatchType> {
        match label {
            "完全一致" => Some(MatchType::Exact),
            "アナグラム" => Some(MatchType::Anagram),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShiftSearchResult {
    pub result_word: String,
    pub shift: usize,
    pub match_type: MatchType,
    /// The shifted input that led to the result
    pub source_word: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShiftLimits {
    pub exact: usize,
    pub anagram: usize,
    pub total: usize,
}

impl Default for ShiftLimits {
    fn default() -> ShiftLimits {
        ShiftLimits {
            exact: SHIFT_EXACT_RESULT_MAXCOUNT,
            anagram: SHIFT_ANAGRAM_RESULT_MAXCOUNT,
            total: SHIFT_TOTAL_RESULT_MAXCOUNT,
        }
    }
}

impl ShiftLimits {
    pub fn unbounded() -> ShiftLimits {
        ShiftLimits {
            exact: usize::MAX,
            anagram: usize::MAX,
            total: usize::MAX,
        }
    }
}

/// Shared flag used to stop a shift search from another thread. The
/// search checks it before trying each shift.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> CancelFlag {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

enum Letters {
    // Positions in a..z
    Latin(Vec<u8>),
    Kana(Vec<KanaToken>),
}

/// A normalized word split into letters that can be rotated around
/// the alphabet of its language.
pub struct ShiftCipher {
    letters: Letters,
}

impl ShiftCipher {
    pub fn new(language: Language, word: &str) -> Result<ShiftCipher> {
        let letters = match language {
            Language::English => {
                word.chars()
                    .map(|ch| match ch {
                        'a'..='z' => Ok(ch as u8 - b'a'),
                        _ => Err(SearchError::InvalidAlphabet {
                            ch,
                            alphabet: "英小文字 (a-z)",
                        }),
                    })
                    .collect::<Result<Vec<u8>>>()
                    .map(Letters::Latin)?
            },
            Language::Japanese => {
                word.chars()
                    .map(|ch| {
                        KanaToken::decompose(ch).ok_or(
                            SearchError::InvalidAlphabet {
                                ch,
                                alphabet: "ひらがな",
                            }
                        )
                    })
                    .collect::<Result<Vec<KanaToken>>>()
                    .map(Letters::Kana)?
            },
        };

        Ok(ShiftCipher { letters })
    }

    /// Number of shifts that a search tries. Shifts run from 1 up to
    /// and including this number.
    pub fn shift_count(&self) -> usize {
        match self.letters {
            Letters::Latin(_) => ALPHABET_LENGTH - 1,
            Letters::Kana(_) => KANA_RING_LENGTH,
        }
    }

    pub fn shift(&self, shift: usize) -> String {
        match &self.letters {
            Letters::Latin(letters) => {
                letters.iter()
                    .map(|&letter| {
                        let shifted = (letter as usize + shift) % ALPHABET_LENGTH;
                        (b'a' + shifted as u8) as char
                    })
                    .collect()
            },
            Letters::Kana(tokens) => {
                tokens.iter()
                    .map(|token| token.rotate(shift).compose())
                    .collect()
            },
        }
    }
}

pub fn shift_word(language: Language, word: &str, shift: usize) -> Result<String> {
    ShiftCipher::new(language, word).map(|cipher| cipher.shift(shift))
}

pub struct ShiftRequest<'a> {
    pub dictionary: &'a Dictionary,
    pub input: &'a str,
    pub include_anagram: bool,
    pub limits: ShiftLimits,
    pub cancel: Option<&'a CancelFlag>,
}

impl<'a> ShiftRequest<'a> {
    pub fn new(dictionary: &'a Dictionary, input: &'a str) -> ShiftRequest<'a> {
        ShiftRequest {
            dictionary,
            input,
            include_anagram: true,
            limits: ShiftLimits::default(),
            cancel: None,
        }
    }
}

#[derive(Debug)]
pub struct ShiftOutcome {
    pub normalized_input: String,
    pub results: Vec<ShiftSearchResult>,
    pub limit_reached: bool,
}

struct Collector {
    limits: ShiftLimits,
    seen: HashSet<(String, usize, MatchType)>,
    results: Vec<ShiftSearchResult>,
    n_exact: usize,
    n_anagram: usize,
}

impl Collector {
    // Returns true if one of the limits has been reached
    fn add(
        &mut self,
        result_word: &str,
        shift: usize,
        match_type: MatchType,
        source_word: &str,
    ) -> bool {
        if !self.seen.insert((result_word.to_string(), shift, match_type)) {
            return false;
        }

        self.results.push(ShiftSearchResult {
            result_word: result_word.to_string(),
            shift,
            match_type,
            source_word: source_word.to_string(),
        });

        match match_type {
            MatchType::Exact => self.n_exact += 1,
            MatchType::Anagram => self.n_anagram += 1,
        }

        self.n_exact >= self.limits.exact
            || self.n_anagram >= self.limits.anagram
            || self.results.len() >= self.limits.total
    }
}

/// Rotates every letter of the input by each possible shift and looks
/// up the shifted words in the dictionary, optionally along with
/// their anagrams.
pub fn run_shift_search(request: &ShiftRequest) -> Result<ShiftOutcome> {
    let dictionary = request.dictionary;
    let normalized_input = dictionary.normalize(request.input.trim());

    if normalized_input.is_empty() {
        return Err(SearchError::EmptyInput);
    }

    let cipher = ShiftCipher::new(dictionary.language(), &normalized_input)?;

    let mut collector = Collector {
        limits: request.limits,
        seen: HashSet::new(),
        results: Vec::new(),
        n_exact: 0,
        n_anagram: 0,
    };
    let mut limit_reached = false;

    'shifts: for shift in 1..=cipher.shift_count() {
        if request.cancel.is_some_and(CancelFlag::is_cancelled) {
            return Err(SearchError::Cancelled);
        }

        let shifted = cipher.shift(shift);

        if dictionary.contains(&shifted)
            && collector.add(&shifted, shift, MatchType::Exact, &shifted)
        {
            limit_reached = true;
            break;
        }

        if request.include_anagram {
            for word in exact_anagrams(dictionary, &shifted) {
                if collector.add(word, shift, MatchType::Anagram, &shifted) {
                    limit_reached = true;
                    break 'shifts;
                }
            }
        }

        tracing::debug!(
            shift,
            shifted = shifted.as_str(),
            results = collector.results.len()
        );
    }

    if limit_reached {
        tracing::warn!(
            input = normalized_input.as_str(),
            results = collector.results.len(),
            "shift search stopped at the result limit"
        );
    }

    let mut results = collector.results;

    results.sort_by(|a, b| {
        a.shift.cmp(&b.shift)
            .then(a.match_type.cmp(&b.match_type))
            .then_with(|| a.result_word.cmp(&b.result_word))
    });

    Ok(ShiftOutcome {
        normalized_input,
        results,
        limit_reached,
    })
}
