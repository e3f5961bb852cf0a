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

use super::dictionary::Dictionary;
use super::error::{Result, SearchError};

/// Maximum number of words returned by the anagram, pattern and
/// regex searches.
pub const ANAGRAM_RESULT_MAXCOUNT: usize = 200;

pub fn is_wildcard(ch: char) -> bool {
    ch == '?' || ch == '？'
}

/// The letters of the word sorted by code point. Words with the same
/// key are anagrams of each other.
pub fn letter_key(word: &str) -> String {
    sorted_letters(word).into_iter().collect()
}

fn sorted_letters(word: &str) -> Vec<char> {
    let mut letters = word.chars().collect::<Vec<char>>();
    letters.sort_unstable();
    letters
}

// Counts the letters of `word` that aren’t covered by `available`.
// Both lists must be sorted. Gives up as soon as the count goes over
// `budget`.
fn excess_letters(word: &[char], available: &[char], budget: usize) -> usize {
    let mut available = available.iter().peekable();
    let mut excess = 0;

    for &ch in word {
        while available.next_if(|&&a| a < ch).is_some() {}

        if available.next_if(|&&a| a == ch).is_none() {
            excess += 1;

            if excess > budget {
                break;
            }
        }
    }

    excess
}

/// Words that are exact anagrams of `word`, which must already be
/// normalized.
pub fn exact_anagrams<'a>(
    dictionary: &'a Dictionary,
    word: &str,
) -> impl Iterator<Item = &'a str> + 'a {
    dictionary.anagram_bucket(&letter_key(word))
}

fn fuzzy_anagrams(
    dictionary: &Dictionary,
    letters: &[char],
    n_wildcards: usize,
) -> Vec<String> {
    let mut results = Vec::new();

    for length in letters.len()..=letters.len() + n_wildcards {
        for word in dictionary.words_of_length(length) {
            let word_letters = sorted_letters(word);

            if excess_letters(&word_letters, letters, n_wildcards)
                <= n_wildcards
            {
                results.push(word.to_string());

                if results.len() >= ANAGRAM_RESULT_MAXCOUNT {
                    return results;
                }
            }
        }
    }

    results
}

/// Finds the words that can be made from the letters of the input.
/// Each `?` in the input can stand in for any one letter. A wildcard
/// can also stand in for a given letter that the word doesn’t use so
/// with wildcards the results can be shorter than the input. They
/// are ordered by length and then by dictionary order.
pub fn find_anagrams(dictionary: &Dictionary, input: &str) -> Result<Vec<String>> {
    let input = dictionary.normalize(input.trim());

    if input.is_empty() {
        return Err(SearchError::EmptyInput);
    }

    let n_wildcards = input.chars().filter(|&ch| is_wildcard(ch)).count();

    if n_wildcards == 0 {
        return Ok(exact_anagrams(dictionary, &input)
                  .take(ANAGRAM_RESULT_MAXCOUNT)
                  .map(str::to_string)
                  .collect());
    }

    let mut letters = input.chars()
        .filter(|&ch| !is_wildcard(ch))
        .collect::<Vec<char>>();
    letters.sort_unstable();

    Ok(fuzzy_anagrams(dictionary, &letters, n_wildcards))
}
