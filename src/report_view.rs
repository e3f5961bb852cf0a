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

use clap::Parser;
use kotoba::logging;
use kotoba::view::{build_view, ViewOptions, DEFAULT_EXTERNAL_ROW_THRESHOLD};
use std::path::PathBuf;
use std::process::ExitCode;

/// Builds the data files for the report viewer from manifest.json
#[derive(Parser, Debug)]
#[command(name = "report-view")]
struct Args {
    #[arg(long, default_value = "reports")]
    reports_dir: PathBuf,

    #[arg(long, default_value = "reports/view")]
    view_dir: PathBuf,

    /// Reports with more rows than this are linked instead of
    /// converted
    #[arg(long, default_value_t = DEFAULT_EXTERNAL_ROW_THRESHOLD)]
    external_row_threshold: usize,

    /// Base URL for the linked reports
    #[arg(long)]
    external_base_url: Option<String>,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(args.verbose, args.quiet);

    let options = ViewOptions {
        external_row_threshold: args.external_row_threshold,
        external_base_url: args.external_base_url,
    };

    match build_view(&args.reports_dir, &args.view_dir, &options) {
        Ok(view) => {
            println!(
                "{}: {} internal, {} external ({} without URL)",
                args.view_dir.display(),
                view.delivery.internal_count,
                view.delivery.external_count,
                view.delivery.unresolved_external_count,
            );
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        },
    }
}
