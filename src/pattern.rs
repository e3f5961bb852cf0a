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

use super::anagram::{is_wildcard, ANAGRAM_RESULT_MAXCOUNT};
use super::dictionary::{Dictionary, Language};
use super::error::{Result, SearchError};
use super::kana::{self, Mark};
use regex::Regex;

/// Appends `ch` to a regular expression so that it only matches
/// itself. Every literal character that goes into a generated
/// expression passes through here.
pub fn escape_literal(ch: char, regex: &mut String) {
    let mut buf = [0u8; 4];
    regex.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
}

/// Finds words of the same length as the pattern where each `?`
/// can be any letter and every other character must match exactly.
pub fn find_crossword(
    dictionary: &Dictionary,
    input: &str,
) -> Result<Vec<String>> {
    let pattern = dictionary.normalize(input.trim());

    if pattern.is_empty() {
        return Err(SearchError::EmptyInput);
    }

    let mut source = String::from("^");

    for ch in pattern.chars() {
        if is_wildcard(ch) {
            source.push('.');
        } else {
            escape_literal(ch, &mut source);
        }
    }

    source.push('$');

    let regex = Regex::new(&source)?;

    Ok(dictionary.words_of_length(pattern.chars().count())
       .filter(|word| regex.is_match(word))
       .take(ANAGRAM_RESULT_MAXCOUNT)
       .map(str::to_string)
       .collect())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotKind {
    Any,
    Literal(char),
    // Index of the capture group that this slot binds or refers to
    Group(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    kind: SlotKind,
    mark: Option<Mark>,
}

/// A parsed pattern where digits stand for letters. The same digit
/// must be the same letter everywhere it appears. `?` is any letter
/// and a voiced sound mark after a slot means the letter in that slot
/// must carry the mark.
#[derive(Debug)]
pub struct PatternWord {
    slots: Vec<Slot>,
}

fn digit_value(ch: char) -> Option<usize> {
    match ch {
        '0'..='9' => Some(ch as usize - '0' as usize),
        '０'..='９' => Some(ch as usize - '０' as usize),
        _ => None,
    }
}

fn marked_chars(mark: Mark) -> impl Iterator<Item = char> {
    kana::KANA_RING.chars()
        .filter_map(move |base| kana::with_mark(base, mark))
}

impl PatternWord {
    pub fn parse(language: Language, input: &str) -> Result<PatternWord> {
        let mut slots = Vec::<Slot>::new();
        // Capture group allocated to each digit so far
        let mut groups = [None::<usize>; 10];
        let mut n_groups = 0;

        for ch in input.trim().chars() {
            if let Some(mark) = Mark::from_marker(ch) {
                let Some(slot) = slots.last_mut()
                else {
                    return Err(SearchError::InvalidPattern(
                        format!("「{}」の前に文字がありません", ch)
                    ));
                };

                if slot.mark.is_some() {
                    return Err(SearchError::InvalidPattern(
                        format!("「{}」が重なっています", ch)
                    ));
                }

                match slot.kind {
                    SlotKind::Literal(base) => {
                        let Some(marked) = kana::with_mark(base, mark)
                        else {
                            return Err(SearchError::InvalidPattern(
                                format!("「{}」に「{}」は付けられません", base, ch)
                            ));
                        };
                        slot.kind = SlotKind::Literal(marked);
                    },
                    SlotKind::Any | SlotKind::Group(_) => slot.mark = Some(mark),
                }
            } else if is_wildcard(ch) {
                slots.push(Slot { kind: SlotKind::Any, mark: None });
            } else if let Some(digit) = digit_value(ch) {
                let group = match groups[digit] {
                    Some(group) => group,
                    None => {
                        let group = n_groups;
                        groups[digit] = Some(group);
                        n_groups += 1;
                        group
                    },
                };

                slots.push(Slot { kind: SlotKind::Group(group), mark: None });
            } else {
                for literal in language.normalize(&ch.to_string()).chars() {
                    slots.push(Slot {
                        kind: SlotKind::Literal(literal),
                        mark: None,
                    });
                }
            }
        }

        Ok(PatternWord { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn matches(&self, word: &str) -> bool {
        let mut captures = Vec::<char>::new();
        let mut word_chars = word.chars();

        for slot in self.slots.iter() {
            let Some(ch) = word_chars.next()
            else {
                return false;
            };

            if slot.mark.is_some_and(|mark| Mark::of(ch) != mark) {
                return false;
            }

            match slot.kind {
                SlotKind::Any => (),
                SlotKind::Literal(literal) => {
                    if ch != literal {
                        return false;
                    }
                },
                SlotKind::Group(group) => {
                    // Groups are numbered in order of first appearance
                    match captures.get(group) {
                        Some(&captured) => {
                            if captured != ch {
                                return false;
                            }
                        },
                        None => captures.push(ch),
                    }
                },
            }
        }

        word_chars.next().is_none()
    }

    /// The equivalent regular expression using back-references. The
    /// `regex` crate can’t run these so this is only for display.
    pub fn to_regex_string(&self) -> String {
        let mut regex = String::from("^");
        let mut n_seen_groups = 0;

        for slot in self.slots.iter() {
            let class = slot.mark.map(|mark| {
                format!("[{}]", marked_chars(mark).collect::<String>())
            });

            match slot.kind {
                SlotKind::Any => {
                    regex.push_str(class.as_deref().unwrap_or("."));
                },
                SlotKind::Literal(ch) => escape_literal(ch, &mut regex),
                SlotKind::Group(group) => {
                    if group >= n_seen_groups {
                        n_seen_groups += 1;
                        regex.push('(');
                        regex.push_str(class.as_deref().unwrap_or("."));
                        regex.push(')');
                    } else {
                        regex.push_str(&format!("\\{}", group + 1));
                    }
                },
            }
        }

        regex.push('$');

        regex
    }
}

/// Searches with a pattern where digits act as letters that must
/// repeat. See `PatternWord`.
pub fn find_patternword(
    dictionary: &Dictionary,
    input: &str,
) -> Result<Vec<String>> {
    let pattern = PatternWord::parse(dictionary.language(), input)?;

    if pattern.is_empty() {
        return Err(SearchError::EmptyInput);
    }

    tracing::debug!(regex = %pattern.to_regex_string(), "pattern search");

    Ok(dictionary.words_of_length(pattern.len())
       .filter(|word| pattern.matches(word))
       .take(ANAGRAM_RESULT_MAXCOUNT)
       .map(str::to_string)
       .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use super::super::dictionary::{english, japanese};

    fn escaped(ch: char) -> String {
        let mut s = String::new();
        escape_literal(ch, &mut s);
        s
    }

    #[test]
    fn escape() {
        assert_eq!(escaped('a'), "a");
        assert_eq!(escaped('あ'), "あ");
        assert_eq!(escaped('.'), "\\.");
        assert_eq!(escaped('?'), "\\?");
        assert_eq!(escaped('('), "\\(");
        assert_eq!(escaped('\\'), "\\\\");
        assert_eq!(escaped('$'), "\\$");

        for ch in ".*+?()[]{}|^$\\-".chars() {
            let regex = Regex::new(&format!("^{}$", escaped(ch))).unwrap();
            assert!(regex.is_match(&ch.to_string()));
            assert!(!regex.is_match("x"));
        }
    }

    #[test]
    fn crossword() {
        let dictionary = japanese("しんぶんし\nしんぶん\nかんぶんし\nシンブンシ");

        assert_eq!(
            find_crossword(&dictionary, "し?ぶ?し").unwrap(),
            &["しんぶんし", "しんぶんし"],
        );
        assert_eq!(
            find_crossword(&dictionary, "？？？？？").unwrap(),
            &["しんぶんし", "かんぶんし", "しんぶんし"],
        );
        assert_eq!(
            find_crossword(&dictionary, "シ?ブ?").unwrap(),
            &["しんぶん"],
        );
        assert!(find_crossword(&dictionary, "??").unwrap().is_empty());
    }

    #[test]
    fn crossword_literal_metacharacters() {
        let dictionary = english("abc\na.c\na+c");

        assert_eq!(find_crossword(&dictionary, "a.c").unwrap(), &["a.c"]);
        assert_eq!(
            find_crossword(&dictionary, "a?c").unwrap(),
            &["abc", "a.c", "a+c"],
        );
    }

    #[test]
    fn backreferences() {
        let dictionary = japanese(
            "しんぶんし\nしんぶんか\nととぶとと\nかんぶんか\nしんぶん",
        );

        assert_eq!(
            find_patternword(&dictionary, "１２？２１").unwrap(),
            &["しんぶんし", "ととぶとと", "かんぶんか"],
        );
        assert_eq!(
            find_patternword(&dictionary, "1?ぶ?1").unwrap(),
            &["しんぶんし", "ととぶとと", "かんぶんか"],
        );
        assert_eq!(
            find_patternword(&dictionary, "し2ぶ2?").unwrap(),
            &["しんぶんし", "しんぶんか"],
        );
        assert!(find_patternword(&dictionary, "1111").unwrap().is_empty());
    }

    #[test]
    fn regex_string() {
        let pattern = PatternWord::parse(Language::Japanese, "１２？２１").unwrap();
        assert_eq!(pattern.to_regex_string(), "^(.)(.).\\2\\1$");

        let pattern = PatternWord::parse(Language::English, "a.3?3").unwrap();
        assert_eq!(pattern.to_regex_string(), "^a\\.(.).\\1$");

        let pattern = PatternWord::parse(Language::Japanese, "?゜").unwrap();
        assert_eq!(pattern.to_regex_string(), "^[ぱぴぷぺぽ]$");
    }

    #[test]
    fn diacritic_markers() {
        let dictionary = japanese("がき\nかき\nがいが\nかいか\nぱん\nはん");

        assert_eq!(find_patternword(&dictionary, "?゛?").unwrap(), &["がき"]);
        assert_eq!(find_patternword(&dictionary, "か゛き").unwrap(), &["がき"]);
        assert_eq!(find_patternword(&dictionary, "1?1゛").unwrap(), &["がいが"]);
        assert_eq!(find_patternword(&dictionary, "ﾊﾟﾝ").unwrap(), &["ぱん"]);
        assert_eq!(find_patternword(&dictionary, "?゜?").unwrap(), &["ぱん"]);
        assert_eq!(
            find_patternword(&dictionary, "??").unwrap(),
            &["がき", "かき", "ぱん", "はん"],
        );
    }

    #[test]
    fn invalid_markers() {
        for pattern in ["゛あ", "?゛゛", "ぱ゜", "な゛"] {
            assert!(
                matches!(
                    PatternWord::parse(Language::Japanese, pattern),
                    Err(SearchError::InvalidPattern(_)),
                ),
                "{}",
                pattern,
            );
        }
    }

    #[test]
    fn cap() {
        let words = (0..300)
            .map(|i| format!("x{:03}", i))
            .collect::<Vec<String>>()
            .join("\n");
        let dictionary = english(&words);

        assert_eq!(
            find_patternword(&dictionary, "x???").unwrap().len(),
            ANAGRAM_RESULT_MAXCOUNT,
        );
        assert_eq!(
            find_crossword(&dictionary, "x???").unwrap().len(),
            ANAGRAM_RESULT_MAXCOUNT,
        );
    }

    #[test]
    fn empty() {
        let dictionary = english("abc");

        assert!(matches!(
            find_patternword(&dictionary, " "),
            Err(SearchError::EmptyInput),
        ));
        assert!(matches!(
            find_crossword(&dictionary, ""),
            Err(SearchError::EmptyInput),
        ));
    }
}
