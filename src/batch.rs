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
use super::report::{ReportHeader, ReportRow, ReportWriter};
use super::shift::{run_shift_search, MatchType, ShiftLimits, ShiftRequest};
use chrono::{SubsecRound, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const PROGRESS_INTERVAL: usize = 1000;

#[derive(Debug)]
pub struct ReportSummary {
    pub path: PathBuf,
    pub header: ReportHeader,
}

pub fn default_report_path(
    out_dir: &Path,
    language: Language,
    length: usize,
) -> PathBuf {
    out_dir.join(language.code()).join(format!("length-{}.md", length))
}

/// All of the report rows for one input word. Shift 0 rows are the
/// other words that are anagrams of the input. The rest come from a
/// shift search without any result limits.
pub fn word_rows(dictionary: &Dictionary, word: &str) -> Result<Vec<ReportRow>> {
    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    for anagram in exact_anagrams(dictionary, word) {
        if anagram != word && seen.insert(anagram) {
            rows.push(ReportRow {
                input_word: word.to_string(),
                shift: 0,
                shifted_word: anagram.to_string(),
                match_type: MatchType::Anagram,
            });
        }
    }

    let mut request = ShiftRequest::new(dictionary, word);
    request.include_anagram = true;
    request.limits = ShiftLimits::unbounded();

    let outcome = match run_shift_search(&request) {
        Ok(outcome) => outcome,
        Err(SearchError::InvalidAlphabet { ch, .. }) => {
            // Words with letters outside of the alphabet can’t be
            // shifted but they still get their anagram rows
            tracing::debug!(word, %ch, "skipping shifts");
            return Ok(rows);
        },
        Err(e) => return Err(e),
    };

    rows.extend(outcome.results.into_iter().map(|result| ReportRow {
        input_word: word.to_string(),
        shift: result.shift,
        shifted_word: result.result_word,
        match_type: result.match_type,
    }));

    Ok(rows)
}

/// Runs every word of the given length through the shift search and
/// writes the hits to a report at `path`. If `limit` is given only
/// that many words are tried.
pub fn generate_report(
    dictionary: &Dictionary,
    length: usize,
    limit: Option<usize>,
    path: &Path,
) -> Result<ReportSummary> {
    // Reports store times to the millisecond
    let started_at = Utc::now().trunc_subsecs(3);

    let targets = dictionary.words()
        .iter()
        .filter(|word| word.chars().count() == length)
        .collect::<Vec<&String>>();
    let n_executed = limit.map_or(targets.len(), |limit| limit.min(targets.len()));

    tracing::info!(
        dictionary = dictionary.definition().key,
        length,
        targets = targets.len(),
        executed = n_executed,
        "generating report"
    );

    let mut writer = ReportWriter::create(path)?;

    for (word_num, word) in targets.iter().take(n_executed).enumerate() {
        for row in word_rows(dictionary, word)? {
            writer.write_row(&row)?;
        }

        if (word_num + 1) % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                words = word_num + 1,
                of = n_executed,
                rows = writer.n_rows(),
                "progress"
            );
        }
    }

    let header = ReportHeader {
        dictionary: dictionary.definition().key.to_string(),
        language: dictionary.language(),
        length,
        target_word_count: targets.len(),
        executed_word_count: n_executed,
        total_hit_rows: writer.n_rows(),
        started_at,
        generated_at: Utc::now().trunc_subsecs(3),
    };

    let path = writer.commit(header.clone())?;

    tracing::info!(
        path = %path.display(),
        rows = header.total_hit_rows,
        "wrote report"
    );

    Ok(ReportSummary { path, header })
}

#[cfg(test)]
mod test {
    use super::*;
    use super::super::dictionary::{english, japanese};
    use super::super::report::read_report;
    use super::super::shift::ShiftOutcome;

    fn shift_triples(outcome: &ShiftOutcome) -> HashSet<(usize, MatchType, String)> {
        outcome.results.iter()
            .map(|r| (r.shift, r.match_type, r.result_word.clone()))
            .collect()
    }

    #[test]
    fn report_path() {
        assert_eq!(
            default_report_path(Path::new("reports"), Language::Japanese, 4),
            Path::new("reports/jp/length-4.md"),
        );
    }

    #[test]
    fn zero_shift_rows() {
        let dictionary = english("act\ncat\ntac\ncat\ndog");

        let rows = word_rows(&dictionary, "cat").unwrap();
        let zero = rows.iter()
            .filter(|row| row.shift == 0)
            .map(|row| row.shifted_word.as_str())
            .collect::<Vec<_>>();

        assert_eq!(zero, &["act", "tac"]);
        assert!(rows.iter().all(|row| row.input_word == "cat"));
    }

    #[test]
    fn agrees_with_shift_search() {
        let dictionary = japanese(
            "いぬ\nぬい\nうね\nねう\nえの\nがき\nざし\nしざ\nねこ\nこね",
        );

        for word in dictionary.words() {
            let rows = word_rows(&dictionary, word).unwrap();

            let from_rows = rows.iter()
                .filter(|row| row.shift > 0)
                .map(|row| (row.shift, row.match_type, row.shifted_word.clone()))
                .collect::<HashSet<_>>();

            let outcome = run_shift_search(&ShiftRequest::new(&dictionary, word))
                .unwrap();
            assert!(!outcome.limit_reached);

            assert_eq!(from_rows, shift_triples(&outcome), "{}", word);

            let zero_shift = rows.iter()
                .filter(|row| row.shift == 0)
                .map(|row| row.shifted_word.as_str())
                .collect::<HashSet<_>>();
            let anagrams = exact_anagrams(&dictionary, word)
                .filter(|anagram| anagram != word)
                .collect::<HashSet<_>>();
            assert_eq!(zero_shift, anagrams);
        }
    }

    #[test]
    fn unshiftable_words_keep_anagrams() {
        let dictionary = japanese("らーめん\nめーらん");

        let rows = word_rows(&dictionary, "らーめん").unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shift, 0);
        assert_eq!(rows[0].shifted_word, "めーらん");
    }

    #[test]
    fn generate() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = english("hello\nczggj\nabc\nbcd\ncab\nhi");
        let path = default_report_path(dir.path(), Language::English, 3);

        let summary = generate_report(&dictionary, 3, None, &path).unwrap();

        assert_eq!(summary.path, path);
        assert_eq!(summary.header.target_word_count, 3);
        assert_eq!(summary.header.executed_word_count, 3);

        let report = read_report(&path).unwrap();
        assert_eq!(report.header, summary.header);
        assert_eq!(report.rows.len(), summary.header.total_hit_rows);

        let expected = ["abc", "bcd", "cab"].iter()
            .flat_map(|word| word_rows(&dictionary, word).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(report.rows, expected);

        assert!(report.rows.contains(&ReportRow {
            input_word: "abc".to_string(),
            shift: 1,
            shifted_word: "bcd".to_string(),
            match_type: MatchType::Exact,
        }));
        assert!(report.rows.contains(&ReportRow {
            input_word: "abc".to_string(),
            shift: 0,
            shifted_word: "cab".to_string(),
            match_type: MatchType::Anagram,
        }));
    }

    #[test]
    fn limit() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = english("hello\nczggj\nworld");
        let path = dir.path().join("five.md");

        let summary = generate_report(&dictionary, 5, Some(1), &path).unwrap();

        assert_eq!(summary.header.target_word_count, 3);
        assert_eq!(summary.header.executed_word_count, 1);

        let report = read_report(&path).unwrap();
        assert!(report.rows.iter().all(|row| row.input_word == "hello"));
        assert!(report.rows.contains(&ReportRow {
            input_word: "hello".to_string(),
            shift: 21,
            shifted_word: "czggj".to_string(),
            match_type: MatchType::Exact,
        }));
    }

    #[test]
    fn empty_length() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = japanese("いぬ\nねこ");
        let path = dir.path().join("jp").join("length-9.md");

        let summary = generate_report(&dictionary, 9, None, &path).unwrap();

        assert_eq!(summary.header.target_word_count, 0);
        assert_eq!(summary.header.executed_word_count, 0);
        assert_eq!(summary.header.total_hit_rows, 0);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("- targetWordCount: 0\n"));
        assert!(text.contains("- totalHitRows: 0\n"));
        assert!(text.ends_with("|---|---:|---|---|\n"));

        assert!(read_report(&path).unwrap().rows.is_empty());
    }
}
