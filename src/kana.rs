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

use unicode_normalization::UnicodeNormalization;

/// The ring of base kana that the shift cipher rotates over. The
/// order is significant: the interactive shift search and the report
/// generator both use this string so that shift values agree.
pub const KANA_RING: &str = "あいうえおかきくけこさしすせそたちつてと\
                             なにぬねのはひふへほまみむめもやゆよ\
                             らりるれろわん";

pub const KANA_RING_LENGTH: usize = 45;

static SMALL_KANA: [(char, char); 20] = [
    ('ぁ', 'あ'), ('ぃ', 'い'), ('ぅ', 'う'), ('ぇ', 'え'), ('ぉ', 'お'),
    ('っ', 'つ'), ('ゃ', 'や'), ('ゅ', 'ゆ'), ('ょ', 'よ'), ('ゎ', 'わ'),
    ('ァ', 'ア'), ('ィ', 'イ'), ('ゥ', 'ウ'), ('ェ', 'エ'), ('ォ', 'オ'),
    ('ッ', 'ツ'), ('ャ', 'ヤ'), ('ュ', 'ユ'), ('ョ', 'ヨ'), ('ヮ', 'ワ'),
];

// Marked kana followed by the base kana it is made from
static DAKUTEN: [(char, char); 21] = [
    ('が', 'か'), ('ぎ', 'き'), ('ぐ', 'く'), ('げ', 'け'), ('ご', 'こ'),
    ('ざ', 'さ'), ('じ', 'し'), ('ず', 'す'), ('ぜ', 'せ'), ('ぞ', 'そ'),
    ('だ', 'た'), ('ぢ', 'ち'), ('づ', 'つ'), ('で', 'て'), ('ど', 'と'),
    ('ば', 'は'), ('び', 'ひ'), ('ぶ', 'ふ'), ('べ', 'へ'), ('ぼ', 'ほ'),
    ('ゔ', 'う'),
];

static HANDAKUTEN: [(char, char); 5] = [
    ('ぱ', 'は'), ('ぴ', 'ひ'), ('ぷ', 'ふ'), ('ぺ', 'へ'), ('ぽ', 'ほ'),
];

fn fold_small_kana(ch: char) -> char {
    SMALL_KANA.iter()
        .find(|&&(small, _)| small == ch)
        .map(|&(_, base)| base)
        .unwrap_or(ch)
}

fn katakana_to_hiragana(ch: char) -> char {
    match ch {
        'ァ'..='ヶ' | 'ヽ'..='ヾ' => {
            char::from_u32(ch as u32 - 0x60).unwrap_or(ch)
        },
        _ => ch,
    }
}

/// Converts Japanese text to the canonical form used for comparing
/// words: small kana become full size, the text is NFKC-folded and
/// lowercased and katakana becomes hiragana.
pub fn normalize(text: &str) -> String {
    let folded = text.chars().map(fold_small_kana).collect::<String>();

    // Half-width small katakana only become small hiragana after the
    // NFKC and katakana steps so the small kana are folded again at
    // the end.
    folded.nfkc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .map(katakana_to_hiragana)
        .map(fold_small_kana)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    None,
    Dakuten,
    Handakuten,
}

impl Mark {
    /// Returns the mark carried by any character, whether or not its
    /// base is part of the kana ring.
    pub fn of(ch: char) -> Mark {
        if DAKUTEN.iter().any(|&(marked, _)| marked == ch) {
            Mark::Dakuten
        } else if HANDAKUTEN.iter().any(|&(marked, _)| marked == ch) {
            Mark::Handakuten
        } else {
            Mark::None
        }
    }

    /// Recognises the spacing, combining and half-width forms of the
    /// voiced and semi-voiced sound marks.
    pub fn from_marker(ch: char) -> Option<Mark> {
        match ch {
            '゛' | '\u{3099}' | 'ﾞ' => Some(Mark::Dakuten),
            '゜' | '\u{309a}' | 'ﾟ' => Some(Mark::Handakuten),
            _ => None,
        }
    }

    fn table(self) -> &'static [(char, char)] {
        match self {
            Mark::None => &[],
            Mark::Dakuten => &DAKUTEN,
            Mark::Handakuten => &HANDAKUTEN,
        }
    }
}

/// Returns the kana that results from adding `mark` to `base`, if
/// there is one.
pub fn with_mark(base: char, mark: Mark) -> Option<char> {
    if mark == Mark::None {
        return Some(base);
    }

    mark.table()
        .iter()
        .find(|&&(_, b)| b == base)
        .map(|&(marked, _)| marked)
}

/// A kana split into a base from the kana ring and a diacritic that
/// can be put back after the base has been rotated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KanaToken {
    pub base: char,
    pub mark: Mark,
}

fn ring_position(base: char) -> Option<usize> {
    KANA_RING.chars().position(|ch| ch == base)
}

impl KanaToken {
    pub fn decompose(ch: char) -> Option<KanaToken> {
        if ring_position(ch).is_some() {
            return Some(KanaToken { base: ch, mark: Mark::None });
        }

        [Mark::Dakuten, Mark::Handakuten].into_iter()
            .find_map(|mark| {
                mark.table()
                    .iter()
                    .find(|&&(marked, _)| marked == ch)
                    .map(|&(_, base)| KanaToken { base, mark })
            })
    }

    pub fn rotate(self, shift: usize) -> KanaToken {
        // Tokens are only built by decompose so the base is in the ring
        let position = ring_position(self.base).unwrap_or(0);
        let rotated = (position + shift) % KANA_RING_LENGTH;

        KanaToken {
            base: KANA_RING.chars().nth(rotated).unwrap_or(self.base),
            mark: self.mark,
        }
    }

    /// Puts the mark back on the base. If the base has no form with
    /// that mark then the plain base is used.
    pub fn compose(self) -> char {
        with_mark(self.base, self.mark).unwrap_or(self.base)
    }
}
