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
use kotoba::batch::{default_report_path, generate_report};
use kotoba::dictionary::DictionaryStore;
use kotoba::logging;
use std::path::PathBuf;
use std::process::ExitCode;

/// Runs every word of the given lengths through the shift search and
/// writes a Markdown report for each length
#[derive(Parser, Debug)]
#[command(name = "shift-report")]
struct Args {
    /// Dictionary to use (buta or cefr)
    #[arg(short, long)]
    dictionary: String,

    /// Word lengths to report on, separated by commas
    #[arg(short, long, required = true, value_delimiter = ',')]
    length: Vec<usize>,

    /// Directory in which to put the reports
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Report file name. Only allowed with a single length.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Maximum number of words to search for each length
    #[arg(long)]
    limit: Option<usize>,

    /// Directory containing the word lists
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(args.verbose, args.quiet);

    if args.out.is_some() && args.length.len() != 1 {
        eprintln!("--out can only be used with a single length");
        return ExitCode::FAILURE;
    }

    let store = DictionaryStore::new(args.data_dir.clone());

    let dictionary = match store.load(&args.dictionary) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        },
    };

    for &length in args.length.iter() {
        let path = args.out.clone().unwrap_or_else(|| {
            default_report_path(&args.out_dir, dictionary.language(), length)
        });

        match generate_report(&dictionary, length, args.limit, &path) {
            Ok(summary) => {
                println!(
                    "{}: {} words, {} rows",
                    summary.path.display(),
                    summary.header.executed_word_count,
                    summary.header.total_hit_rows,
                );
            },
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        }
    }

    ExitCode::SUCCESS
}
