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

use super::report::ReportParseError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("辞書「{0}」は登録されていません")]
    NotFound(String),

    #[error("{}: 辞書を読み込めませんでした: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("「{ch}」は{alphabet}で使えない文字です")]
    InvalidAlphabet { ch: char, alphabet: &'static str },

    #[error("検索する文字を入力してください")]
    EmptyInput,

    #[error("正規表現が正しくありません: {0}")]
    RegexCompile(#[from] regex::Error),

    #[error("パターンが正しくありません: {0}")]
    InvalidPattern(String),

    #[error("{}: manifest not found, run report-index first", .0.display())]
    ManifestMissing(PathBuf),

    #[error("{}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: ReportParseError,
    },

    #[error("search cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
