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

// A report is a Markdown file with a list of “- key: value” header
// lines followed by a table with one row per hit. The header can
// only be written once all of the rows are known so the rows are
// first streamed to a side file and then copied after the header
// into a staging file which finally replaces the report.

use super::dictionary::Language;
use super::error::{Result, SearchError};
use super::shift::MatchType;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::NamedTempFile;
use thiserror::Error;

pub const TABLE_HEADER: &str = "| inputWord | shift | shiftedWord | matchType |";
pub const TABLE_SEPARATOR: &str = "|---|---:|---|---|";

#[derive(Debug, Error)]
pub enum ReportParseError {
    #[error("missing header “{0}”")]
    MissingKey(&'static str),
    #[error("invalid value “{value}” for header “{key}”")]
    BadValue { key: &'static str, value: String },
    #[error("line {0}: invalid table row")]
    BadRow(usize),
}

pub fn timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportHeader {
    pub dictionary: String,
    pub language: Language,
    pub length: usize,
    pub target_word_count: usize,
    pub executed_word_count: usize,
    pub total_hit_rows: usize,
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

static HEADER_LINE_REGEX: OnceLock<Regex> = OnceLock::new();
static TITLE_LENGTH_REGEX: OnceLock<Regex> = OnceLock::new();

fn header_line_regex() -> &'static Regex {
    HEADER_LINE_REGEX.get_or_init(|| {
        Regex::new(r"^- (\w+): (.*)$").expect("header regex")
    })
}

fn title_length_regex() -> &'static Regex {
    TITLE_LENGTH_REGEX.get_or_init(|| {
        Regex::new(r"^# .* length (\d+)\s*$").expect("title regex")
    })
}

impl ReportHeader {
    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "# Shift search report: {} length {}",
            self.dictionary,
            self.length,
        )?;
        writeln!(out)?;
        writeln!(out, "- dictionary: {}", self.dictionary)?;
        writeln!(out, "- language: {}", self.language.code())?;
        writeln!(out, "- length: {}", self.length)?;
        writeln!(out, "- targetWordCount: {}", self.target_word_count)?;
        writeln!(out, "- executedWordCount: {}", self.executed_word_count)?;
        writeln!(out, "- totalHitRows: {}", self.total_hit_rows)?;
        writeln!(out, "- startedAt: {}", timestamp(&self.started_at))?;
        writeln!(out, "- generatedAt: {}", timestamp(&self.generated_at))?;
        writeln!(out)?;
        writeln!(out, "{}", TABLE_HEADER)?;
        writeln!(out, "{}", TABLE_SEPARATOR)
    }

    /// Picks the header values out of the text. Lines are matched
    /// individually so their order doesn’t matter and lines that
    /// aren’t recognised are skipped.
    pub fn parse<'a>(
        text: &'a str,
    ) -> std::result::Result<ReportHeader, ReportParseError> {
        let line_regex = header_line_regex();
        let title_regex = title_length_regex();

        let mut values = HashMap::<&str, &'a str>::new();
        let mut title_length = None;

        for line in text.lines() {
            let line = line.trim_end();

            if let Some(captures) = line_regex.captures(line) {
                if let (Some(key), Some(value)) = (captures.get(1), captures.get(2)) {
                    values.insert(key.as_str(), value.as_str().trim());
                }
            } else if let Some(captures) = title_regex.captures(line) {
                title_length = captures.get(1).map(|m| m.as_str());
            }
        }

        type ParseResult<T> = std::result::Result<T, ReportParseError>;

        let get = |key: &'static str| -> ParseResult<&'a str> {
            values.get(key)
                .copied()
                .ok_or(ReportParseError::MissingKey(key))
        };
        let bad_value = |key: &'static str, value: &str| {
            ReportParseError::BadValue { key, value: value.to_string() }
        };
        let count = |key: &'static str| -> ParseResult<usize> {
            let value = get(key)?;
            value.parse::<usize>().map_err(|_| bad_value(key, value))
        };
        let time = |key: &'static str| -> ParseResult<DateTime<Utc>> {
            let value = get(key)?;
            DateTime::parse_from_rfc3339(value)
                .map(|time| time.with_timezone(&Utc))
                .map_err(|_| bad_value(key, value))
        };

        let language = get("language")?;
        let language = Language::from_code(language)
            .ok_or_else(|| bad_value("language", language))?;

        // Older reports only have the length in the title
        let length = match values.get("length").copied().or(title_length) {
            Some(value) => {
                value.parse::<usize>().map_err(|_| bad_value("length", value))?
            },
            None => return Err(ReportParseError::MissingKey("length")),
        };

        Ok(ReportHeader {
            dictionary: get("dictionary")?.to_string(),
            language,
            length,
            target_word_count: count("targetWordCount")?,
            executed_word_count: count("executedWordCount")?,
            total_hit_rows: count("totalHitRows")?,
            started_at: time("startedAt")?,
            generated_at: time("generatedAt")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub input_word: String,
    pub shift: usize,
    /// The dictionary word that was found
    pub shifted_word: String,
    pub match_type: MatchType,
}

fn escape_cell(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for ch in text.chars() {
        if ch == '\\' || ch == '|' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    escaped
}

// Splits a table line on the pipes that aren’t escaped. Returns None
// if the line doesn’t start and end with a pipe.
fn split_cells(line: &str) -> Option<Vec<String>> {
    let inner = line.trim().strip_prefix('|')?;

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars();
    let mut closed = false;

    while let Some(ch) = chars.next() {
        closed = false;

        match ch {
            '\\' => cell.push(chars.next()?),
            '|' => {
                cells.push(cell.trim().to_string());
                cell.clear();
                closed = true;
            },
            _ => cell.push(ch),
        }
    }

    closed.then_some(cells)
}

impl ReportRow {
    pub fn to_line(&self) -> String {
        format!(
            "| {} | {} | {} | {} |",
            escape_cell(&self.input_word),
            self.shift,
            escape_cell(&self.shifted_word),
            self.match_type.label(),
        )
    }

    pub fn parse_line(line: &str) -> Option<ReportRow> {
        let cells = split_cells(line)?;

        let [input_word, shift, shifted_word, match_type] = cells.as_slice()
        else {
            return None;
        };

        Some(ReportRow {
            input_word: input_word.clone(),
            shift: shift.parse().ok()?,
            shifted_word: shifted_word.clone(),
            match_type: MatchType::from_label(match_type)?,
        })
    }
}

#[derive(Debug)]
pub struct Report {
    pub header: ReportHeader,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn parse(text: &str) -> std::result::Result<Report, ReportParseError> {
        let header = ReportHeader::parse(text)?;
        let mut rows = Vec::new();
        let mut in_table = false;

        for (line_num, line) in text.lines().enumerate() {
            if !in_table {
                in_table = line.trim() == TABLE_SEPARATOR;
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }

            match ReportRow::parse_line(line) {
                Some(row) => rows.push(row),
                None => return Err(ReportParseError::BadRow(line_num + 1)),
            }
        }

        Ok(Report { header, rows })
    }
}

fn report_error(path: &Path, source: ReportParseError) -> SearchError {
    SearchError::Report { path: path.to_path_buf(), source }
}

pub fn read_report(path: &Path) -> Result<Report> {
    let text = std::fs::read_to_string(path)?;

    Report::parse(&text).map_err(|e| report_error(path, e))
}

/// Reads only as far as the start of the table so that big reports
/// don’t have to be loaded.
pub fn read_report_header(path: &Path) -> Result<ReportHeader> {
    let mut text = String::new();

    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;

        if line.trim() == TABLE_HEADER {
            break;
        }

        text.push_str(&line);
        text.push('\n');
    }

    ReportHeader::parse(&text).map_err(|e| report_error(path, e))
}

fn rows_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".rows.tmp");
    PathBuf::from(name)
}

/// Writes a report in two phases. Rows go to a side file as they are
/// found and `commit` puts the header and the rows together. Until
/// then nothing is written to the report path. If the writer is
/// dropped without committing the side file is left behind.
pub struct ReportWriter {
    path: PathBuf,
    rows_path: PathBuf,
    rows: BufWriter<File>,
    n_rows: usize,
}

impl ReportWriter {
    pub fn create(path: &Path) -> Result<ReportWriter> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let rows_path = rows_path(path);
        let rows = BufWriter::new(File::create(&rows_path)?);

        Ok(ReportWriter {
            path: path.to_path_buf(),
            rows_path,
            rows,
            n_rows: 0,
        })
    }

    pub fn write_row(&mut self, row: &ReportRow) -> Result<()> {
        writeln!(self.rows, "{}", row.to_line())?;
        self.n_rows += 1;
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Writes the final report. The row count in the header is taken
    /// from the rows that were actually written.
    pub fn commit(self, mut header: ReportHeader) -> Result<PathBuf> {
        header.total_hit_rows = self.n_rows;

        self.rows.into_inner().map_err(|e| e.into_error())?.sync_all()?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir)?;

        {
            let mut out = BufWriter::new(staged.as_file_mut());
            header.write_to(&mut out)?;
            io::copy(&mut File::open(&self.rows_path)?, &mut out)?;
            out.flush()?;
        }

        staged.persist(&self.path).map_err(|e| e.error)?;

        std::fs::remove_file(&self.rows_path)?;

        Ok(self.path)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn sample_header() -> ReportHeader {
        ReportHeader {
            dictionary: "buta".to_string(),
            language: Language::Japanese,
            length: 3,
            target_word_count: 12,
            executed_word_count: 10,
            total_hit_rows: 2,
            started_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
            generated_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 31, 5).unwrap(),
        }
    }

    fn row(input: &str, shift: usize, shifted: &str, match_type: MatchType) -> ReportRow {
        ReportRow {
            input_word: input.to_string(),
            shift,
            shifted_word: shifted.to_string(),
            match_type,
        }
    }

    #[test]
    fn regexes_are_shared() {
        assert!(std::ptr::eq(header_line_regex(), header_line_regex()));
        assert!(std::ptr::eq(title_length_regex(), title_length_regex()));
        assert!(header_line_regex().is_match("- totalHitRows: 3"));
        assert!(title_length_regex().is_match("# Shift search report: buta length 3"));
    }

    #[test]
    fn header_text() {
        let mut text = Vec::new();
        sample_header().write_to(&mut text).unwrap();

        assert_eq!(
            String::from_utf8(text).unwrap(),
            "# Shift search report: buta length 3\n\
             \n\
             - dictionary: buta\n\
             - language: jp\n\
             - length: 3\n\
             - targetWordCount: 12\n\
             - executedWordCount: 10\n\
             - totalHitRows: 2\n\
             - startedAt: 2025-03-01T09:30:00.000Z\n\
             - generatedAt: 2025-03-01T09:31:05.000Z\n\
             \n\
             | inputWord | shift | shiftedWord | matchType |\n\
             |---|---:|---|---|\n",
        );
    }

    #[test]
    fn header_round_trip() {
        let mut text = Vec::new();
        sample_header().write_to(&mut text).unwrap();

        let parsed = ReportHeader::parse(&String::from_utf8(text).unwrap())
            .unwrap();

        assert_eq!(parsed, sample_header());
    }

    #[test]
    fn header_in_any_order() {
        let text = "# Shift search report: cefr length 7\n\
                    - generatedAt: 2025-03-01T10:00:00.000Z\n\
                    - note: something else\n\
                    - totalHitRows: 0\n\
                    - dictionary: cefr\n\
                    - executedWordCount: 3\n\
                    - startedAt: 2025-03-01T09:00:00.000Z\n\
                    - language: en\n\
                    - targetWordCount: 3\n";

        let header = ReportHeader::parse(text).unwrap();

        assert_eq!(header.dictionary, "cefr");
        assert_eq!(header.language, Language::English);
        assert_eq!(header.length, 7);
        assert_eq!(header.executed_word_count, 3);
        assert_eq!(header.total_hit_rows, 0);
    }

    #[test]
    fn header_errors() {
        assert!(matches!(
            ReportHeader::parse("- dictionary: buta\n- language: jp\n"),
            Err(ReportParseError::MissingKey("length")),
        ));
        assert!(matches!(
            ReportHeader::parse(
                "- dictionary: buta\n- language: fr\n- length: 3\n",
            ),
            Err(ReportParseError::BadValue { key: "language", .. }),
        ));
    }

    #[test]
    fn row_lines() {
        let line = row("ねこ", 3, "へさ", MatchType::Exact).to_line();
        assert_eq!(line, "| ねこ | 3 | へさ | 完全一致 |");

        let line = row("a|b", 0, "b\\a", MatchType::Anagram).to_line();
        assert_eq!(line, "| a\\|b | 0 | b\\\\a | アナグラム |");
    }

    #[test]
    fn row_round_trip() {
        let lines = [
            "| ねこ | 3 | へさ | 完全一致 |",
            "| a\\|b | 0 | b\\\\a | アナグラム |",
            "| \\|\\| | 45 | x\\| | アナグラム |",
        ];

        for line in lines {
            let row = ReportRow::parse_line(line).unwrap();
            assert_eq!(row.to_line(), line);
        }

        let row = ReportRow::parse_line(lines[1]).unwrap();
        assert_eq!(row.input_word, "a|b");
        assert_eq!(row.shifted_word, "b\\a");
    }

    #[test]
    fn bad_rows() {
        assert!(ReportRow::parse_line("| a | 1 | b |").is_none());
        assert!(ReportRow::parse_line("| a | x | b | 完全一致 |").is_none());
        assert!(ReportRow::parse_line("| a | 1 | b | exact |").is_none());
        assert!(ReportRow::parse_line("a | 1 | b | 完全一致 |").is_none());
        assert!(ReportRow::parse_line("| a | 1 | b | 完全一致").is_none());
        assert!(ReportRow::parse_line("| a | 1 | b | 完全一致 \\|").is_none());
    }

    #[test]
    fn write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jp").join("length-3.md");

        let mut writer = ReportWriter::create(&path).unwrap();

        // Nothing is visible at the report path until the commit
        assert!(!path.exists());

        writer.write_row(&row("ねこ", 3, "へさ", MatchType::Exact)).unwrap();
        writer.write_row(&row("ねこ", 0, "こね", MatchType::Anagram)).unwrap();
        writer.write_row(&row("ねこ", 4, "ほし", MatchType::Anagram)).unwrap();

        let mut header = sample_header();
        header.total_hit_rows = 99;

        assert_eq!(writer.commit(header).unwrap(), path);

        assert!(!rows_path(&path).exists());

        let report = read_report(&path).unwrap();
        assert_eq!(report.header.total_hit_rows, 3);
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[1], row("ねこ", 0, "こね", MatchType::Anagram));

        let header = read_report_header(&path).unwrap();
        assert_eq!(header, report.header);

        let entries = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn abandoned_writer_leaves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("length-4.md");

        {
            let mut writer = ReportWriter::create(&path).unwrap();
            writer.write_row(&row("いぬ", 1, "うね", MatchType::Exact)).unwrap();
        }

        assert!(!path.exists());
        assert!(rows_path(&path).exists());
    }

    #[test]
    fn rerun_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("length-2.md");

        let mut writer = ReportWriter::create(&path).unwrap();
        writer.write_row(&row("ab", 1, "bc", MatchType::Exact)).unwrap();
        writer.commit(sample_header()).unwrap();

        let writer = ReportWriter::create(&path).unwrap();
        writer.commit(sample_header()).unwrap();

        let report = read_report(&path).unwrap();
        assert_eq!(report.header.total_hit_rows, 0);
        assert!(report.rows.is_empty());
    }
}
