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
use kotoba::manifest::{build_manifest, write_manifest};
use std::path::PathBuf;
use std::process::ExitCode;

/// Collects the headers of the shift search reports into
/// manifest.json and index.md
#[derive(Parser, Debug)]
#[command(name = "report-index")]
struct Args {
    #[arg(long, default_value = "reports")]
    reports_dir: PathBuf,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(args.verbose, args.quiet);

    let result = build_manifest(&args.reports_dir).and_then(|manifest| {
        write_manifest(&args.reports_dir, &manifest)?;
        Ok(manifest)
    });

    match result {
        Ok(manifest) => {
            println!(
                "{}: {} reports",
                args.reports_dir.display(),
                manifest.report_count,
            );
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("{}: {}", args.reports_dir.display(), e);
            ExitCode::FAILURE
        },
    }
}
