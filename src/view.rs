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

// Turns the manifest into the files that the web pages load. Small
// reports are converted to JSON so they can be shown directly and big
// ones are left as a link to the Markdown file.

use super::error::{Result, SearchError};
use super::manifest::{LanguageGroup, Manifest, ManifestReport, MANIFEST_FILE_NAME};
use super::report::{read_report, timestamp, ReportRow};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub const DEFAULT_EXTERNAL_ROW_THRESHOLD: usize = 10_000;
pub const VIEW_MANIFEST_FILE_NAME: &str = "view-manifest.json";
pub const DATA_DIR_NAME: &str = "data";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Internal,
    External,
}

#[derive(Clone, Debug)]
pub struct ViewOptions {
    /// Reports with more rows than this are delivered as a link
    pub external_row_threshold: usize,
    pub external_base_url: Option<String>,
}

impl Default for ViewOptions {
    fn default() -> ViewOptions {
        ViewOptions {
            external_row_threshold: DEFAULT_EXTERNAL_ROW_THRESHOLD,
            external_base_url: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewReport {
    #[serde(flatten)]
    pub report: ManifestReport,
    pub report_key: String,
    pub delivery_type: DeliveryType,
    pub external_url: Option<String>,
    pub internal_data_file: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryCounts {
    pub internal_count: usize,
    pub external_count: usize,
    pub unresolved_external_count: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewManifest {
    pub generated_at: String,
    pub source_generated_at: String,
    pub external_row_threshold: usize,
    pub report_count: usize,
    pub delivery: DeliveryCounts,
    pub groups: BTreeMap<String, LanguageGroup>,
    pub reports: Vec<ViewReport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InternalReport<'a> {
    report_key: &'a str,
    #[serde(flatten)]
    report: &'a ManifestReport,
    rows: &'a [ReportRow],
}

pub fn report_key(report: &ManifestReport) -> String {
    format!("{}-{}", report.language, report.length)
}

// Two reports can share a language and length if one was written
// with a custom file name. The later ones get the file name added to
// their key so that their data files don’t overwrite each other.
fn unique_report_key(report: &ManifestReport, used: &mut HashSet<String>) -> String {
    let key = report_key(report);

    if used.insert(key.clone()) {
        return key;
    }

    let stem = Path::new(&report.path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = format!("{}-{}", key, stem);
    let mut key = base.clone();
    let mut n = 2;

    while !used.insert(key.clone()) {
        key = format!("{}-{}", base, n);
        n += 1;
    }

    tracing::warn!(
        path = report.path.as_str(),
        key = key.as_str(),
        "duplicate report key"
    );

    key
}

pub fn delivery_type(total_hit_rows: usize, threshold: usize) -> DeliveryType {
    if total_hit_rows <= threshold {
        DeliveryType::Internal
    } else {
        DeliveryType::External
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

pub fn read_manifest(reports_dir: &Path) -> Result<Manifest> {
    let path = reports_dir.join(MANIFEST_FILE_NAME);

    if !path.is_file() {
        return Err(SearchError::ManifestMissing(path));
    }

    Ok(serde_json::from_reader(BufReader::new(File::open(&path)?))?)
}

/// Reads the manifest from `reports_dir` and writes the view manifest
/// and the JSON data for the internal reports into `view_dir`.
pub fn build_view(
    reports_dir: &Path,
    view_dir: &Path,
    options: &ViewOptions,
) -> Result<ViewManifest> {
    let manifest = read_manifest(reports_dir)?;

    std::fs::create_dir_all(view_dir.join(DATA_DIR_NAME))?;

    let mut delivery = DeliveryCounts::default();
    let mut reports = Vec::with_capacity(manifest.reports.len());
    let mut used_keys = HashSet::new();

    for report in manifest.reports.iter() {
        let key = unique_report_key(report, &mut used_keys);
        let delivery_type = delivery_type(
            report.total_hit_rows,
            options.external_row_threshold,
        );

        let mut view_report = ViewReport {
            report: report.clone(),
            report_key: key.clone(),
            delivery_type,
            external_url: None,
            internal_data_file: None,
        };

        match delivery_type {
            DeliveryType::Internal => {
                let parsed = read_report(&reports_dir.join(&report.path))?;
                let data_file = format!("{}/{}.json", DATA_DIR_NAME, key);

                write_json(
                    &view_dir.join(&data_file),
                    &InternalReport {
                        report_key: &key,
                        report,
                        rows: &parsed.rows,
                    },
                )?;

                delivery.internal_count += 1;
                view_report.internal_data_file = Some(data_file);
            },
            DeliveryType::External => {
                delivery.external_count += 1;

                view_report.external_url = options.external_base_url
                    .as_deref()
                    .map(|base| {
                        format!("{}/{}", base.trim_end_matches('/'), report.path)
                    });

                if view_report.external_url.is_none() {
                    delivery.unresolved_external_count += 1;
                    tracing::warn!(report = key.as_str(), "no URL for external report");
                }
            },
        }

        reports.push(view_report);
    }

    let view = ViewManifest {
        generated_at: timestamp(&Utc::now()),
        source_generated_at: manifest.generated_at,
        external_row_threshold: options.external_row_threshold,
        report_count: reports.len(),
        delivery,
        groups: manifest.groups,
        reports,
    };

    write_json(&view_dir.join(VIEW_MANIFEST_FILE_NAME), &view)?;

    tracing::info!(
        internal = view.delivery.internal_count,
        external = view.delivery.external_count,
        "wrote view manifest"
    );

    Ok(view)
}
