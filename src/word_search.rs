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

use super::anagram::{self, ANAGRAM_RESULT_MAXCOUNT};
use super::dictionary::Dictionary;
use super::error::{Result, SearchError};
use super::pattern;
use regex::Regex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    Anagram,
    Crossword,
    Pattern,
    Regex,
    Exact,
}

/// Tests every word against a user-supplied regular expression. The
/// expression isn’t anchored so it can match any part of the word.
pub fn find_regex(dictionary: &Dictionary, input: &str) -> Result<Vec<String>> {
    let input = input.trim();

    if input.is_empty() {
        return Err(SearchError::EmptyInput);
    }

    let regex = Regex::new(input)?;

    Ok(dictionary.words()
       .iter()
       .filter(|word| regex.is_match(word))
       .take(ANAGRAM_RESULT_MAXCOUNT)
       .cloned()
       .collect())
}

pub fn find_exact(dictionary: &Dictionary, input: &str) -> Result<Option<String>> {
    let word = dictionary.normalize(input.trim());

    if word.is_empty() {
        return Err(SearchError::EmptyInput);
    }

    Ok(dictionary.contains(&word).then_some(word))
}

pub fn search(
    dictionary: &Dictionary,
    mode: SearchMode,
    input: &str,
) -> Result<Vec<String>> {
    match mode {
        SearchMode::Anagram => anagram::find_anagrams(dictionary, input),
        SearchMode::Crossword => pattern::find_crossword(dictionary, input),
        SearchMode::Pattern => pattern::find_patternword(dictionary, input),
        SearchMode::Regex => find_regex(dictionary, input),
        SearchMode::Exact => {
            find_exact(dictionary, input).map(|word| word.into_iter().collect())
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::super::dictionary::{english, japanese};

    #[test]
    fn regex() {
        let dictionary = english("apple\nbanana\ncherry\npineapple");

        assert_eq!(
            find_regex(&dictionary, "apple").unwrap(),
            &["apple", "pineapple"],
        );
        assert_eq!(
            find_regex(&dictionary, " ^a.*e$ ").unwrap(),
            &["apple"],
        );
        assert_eq!(
            find_regex(&dictionary, "(an){2}").unwrap(),
            &["banana"],
        );
        assert!(find_regex(&dictionary, "^z").unwrap().is_empty());
    }

    #[test]
    fn bad_regex() {
        let dictionary = english("apple");

        assert!(matches!(
            find_regex(&dictionary, "(ap"),
            Err(SearchError::RegexCompile(_)),
        ));
        assert!(matches!(
            find_regex(&dictionary, ""),
            Err(SearchError::EmptyInput),
        ));
    }

    #[test]
    fn regex_cap() {
        let words = (0..1000)
            .map(|i| format!("n{}", i))
            .collect::<Vec<String>>()
            .join("\n");
        let dictionary = english(&words);

        assert_eq!(
            find_regex(&dictionary, "^n").unwrap().len(),
            ANAGRAM_RESULT_MAXCOUNT,
        );
    }

    #[test]
    fn exact() {
        let dictionary = japanese("りんご\nみかん");

        assert_eq!(
            find_exact(&dictionary, "リンゴ").unwrap().as_deref(),
            Some("りんご"),
        );
        assert_eq!(find_exact(&dictionary, "ぶどう").unwrap(), None);
        assert!(matches!(
            find_exact(&dictionary, "  "),
            Err(SearchError::EmptyInput),
        ));
    }

    #[test]
    fn dispatch() {
        let dictionary = japanese("しんぶんし\nしんぶん\nぶんし");

        assert_eq!(
            search(&dictionary, SearchMode::Exact, "しんぶん").unwrap(),
            &["しんぶん"],
        );
        assert!(
            search(&dictionary, SearchMode::Exact, "ぶん").unwrap().is_empty(),
        );
        assert_eq!(
            search(&dictionary, SearchMode::Anagram, "しぶん").unwrap(),
            &["ぶんし"],
        );
        assert_eq!(
            search(&dictionary, SearchMode::Crossword, "??ぶ??").unwrap(),
            &["しんぶんし"],
        );
        assert_eq!(
            search(&dictionary, SearchMode::Pattern, "12?2").unwrap(),
            &["しんぶん"],
        );
        assert_eq!(
            search(&dictionary, SearchMode::Regex, "んし$").unwrap(),
            &["しんぶんし", "ぶんし"],
        );
    }

    #[test]
    fn no_words_of_length() {
        let dictionary = japanese("ねこ\nいぬ");

        for mode in [
            SearchMode::Anagram,
            SearchMode::Crossword,
            SearchMode::Pattern,
            SearchMode::Exact,
        ] {
            assert!(search(&dictionary, mode, "あいうえお").unwrap().is_empty());
            assert!(search(&dictionary, mode, "あい?えお").unwrap().is_empty());
        }
    }
}
