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

use super::dictionary::Language;
use super::error::{Result, SearchError};
use super::report::{read_report_header, timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const INDEX_FILE_NAME: &str = "index.md";

const LANGUAGES: [Language; 2] = [Language::Japanese, Language::English];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestReport {
    pub language: String,
    pub length: usize,
    pub dictionary: String,
    pub target_word_count: usize,
    pub executed_word_count: usize,
    pub total_hit_rows: usize,
    pub started_at: String,
    pub generated_at: String,
    /// Relative to the reports directory, always with forward slashes
    pub path: String,
    pub size_bytes: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageGroup {
    pub report_count: usize,
    pub target_word_count: usize,
    pub executed_word_count: usize,
    pub total_hit_rows: usize,
    pub lengths: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub generated_at: String,
    pub report_count: usize,
    pub groups: BTreeMap<String, LanguageGroup>,
    pub reports: Vec<ManifestReport>,
}

fn scan_language(
    reports_dir: &Path,
    language: Language,
    reports: &mut Vec<ManifestReport>,
) -> Result<()> {
    let dir = reports_dir.join(language.code());

    if !dir.is_dir() {
        return Ok(());
    }

    let mut paths = std::fs::read_dir(&dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<PathBuf>>>()?;
    paths.retain(|path| path.extension().is_some_and(|ext| ext == "md"));
    paths.sort();

    for path in paths {
        let header = match read_report_header(&path) {
            Ok(header) => header,
            Err(e @ SearchError::Report { .. }) => {
                tracing::warn!("skipping {}", e);
                continue;
            },
            Err(e) => return Err(e),
        };

        if header.language != language {
            tracing::warn!(
                path = %path.display(),
                "report language doesn’t match its directory"
            );
        }

        let file_name = path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        reports.push(ManifestReport {
            language: header.language.code().to_string(),
            length: header.length,
            dictionary: header.dictionary,
            target_word_count: header.target_word_count,
            executed_word_count: header.executed_word_count,
            total_hit_rows: header.total_hit_rows,
            started_at: timestamp(&header.started_at),
            generated_at: timestamp(&header.generated_at),
            path: format!("{}/{}", language.code(), file_name),
            size_bytes: std::fs::metadata(&path)?.len(),
        });
    }

    Ok(())
}

/// Collects the headers of every report under the `jp` and `en`
/// subdirectories of `reports_dir`.
pub fn build_manifest(reports_dir: &Path) -> Result<Manifest> {
    let mut reports = Vec::new();

    for language in LANGUAGES {
        scan_language(reports_dir, language, &mut reports)?;
    }

    reports.sort_by(|a, b| {
        a.language.cmp(&b.language).then(a.length.cmp(&b.length))
    });

    let mut groups = LANGUAGES.iter()
        .map(|language| (language.code().to_string(), LanguageGroup::default()))
        .collect::<BTreeMap<String, LanguageGroup>>();

    for report in reports.iter() {
        let group = groups.entry(report.language.clone()).or_default();

        group.report_count += 1;
        group.target_word_count += report.target_word_count;
        group.executed_word_count += report.executed_word_count;
        group.total_hit_rows += report.total_hit_rows;
        group.lengths.push(report.length);
    }

    Ok(Manifest {
        generated_at: timestamp(&Utc::now()),
        report_count: reports.len(),
        groups,
        reports,
    })
}

pub fn write_index(manifest: &Manifest, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "# Shift search reports")?;
    writeln!(out)?;
    writeln!(out, "- generatedAt: {}", manifest.generated_at)?;
    writeln!(out, "- reportCount: {}", manifest.report_count)?;

    for (language, group) in manifest.groups.iter() {
        writeln!(out)?;
        writeln!(out, "## {}", language)?;
        writeln!(out)?;

        if group.report_count == 0 {
            writeln!(out, "No reports.")?;
            continue;
        }

        writeln!(
            out,
            "| length | dictionary | targetWordCount | executedWordCount \
             | totalHitRows | sizeBytes | report |",
        )?;
        writeln!(out, "|---:|---|---:|---:|---:|---:|---|")?;

        for report in manifest.reports.iter().filter(|r| &r.language == language) {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} | [{}]({}) |",
                report.length,
                report.dictionary,
                report.target_word_count,
                report.executed_word_count,
                report.total_hit_rows,
                report.size_bytes,
                report.path,
                report.path,
            )?;
        }

        writeln!(
            out,
            "| **total** | | {} | {} | {} | | |",
            group.target_word_count,
            group.executed_word_count,
            group.total_hit_rows,
        )?;
    }

    Ok(())
}

/// Writes `manifest.json` and `index.md` into the reports directory
pub fn write_manifest(reports_dir: &Path, manifest: &Manifest) -> Result<()> {
    std::fs::create_dir_all(reports_dir)?;

    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(reports_dir.join(MANIFEST_FILE_NAME), json + "\n")?;

    let mut index = BufWriter::new(File::create(reports_dir.join(INDEX_FILE_NAME))?);
    write_index(manifest, &mut index)?;
    index.flush()?;

    Ok(())
}
