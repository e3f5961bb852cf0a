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

use clap::{Parser, Subcommand};
use kotoba::dictionary::{Dictionary, DictionaryStore};
use kotoba::shift::{run_shift_search, ShiftRequest};
use kotoba::word_search::{self, SearchMode};
use kotoba::{logging, SearchError};
use std::path::PathBuf;
use std::process::ExitCode;

/// Searches a word list for anagrams, crossword patterns and shifted
/// words
#[derive(Parser, Debug)]
#[command(name = "kotoba-search")]
struct Args {
    /// Dictionary to search (buta or cefr)
    #[arg(short, long)]
    dictionary: String,

    /// Directory containing the word lists
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Words made from the letters of the input. “?” stands for any
    /// letter.
    Anagram { input: String },
    /// Words matching a pattern where “?” is any letter
    Crossword { input: String },
    /// Words matching a pattern where equal digits are equal letters
    Pattern { input: String },
    /// Words matching a regular expression
    Regex { input: String },
    /// Checks whether the word is in the dictionary
    Exact { input: String },
    /// Words that the input turns into when its letters are shifted
    Shift {
        input: String,

        /// Only report shifted words that are in the dictionary
        #[arg(long)]
        no_anagram: bool,
    },
}

fn run_shift(
    dictionary: &Dictionary,
    input: &str,
    no_anagram: bool,
) -> Result<usize, SearchError> {
    let mut request = ShiftRequest::new(dictionary, input);
    request.include_anagram = !no_anagram;

    let outcome = run_shift_search(&request)?;

    for result in outcome.results.iter() {
        println!(
            "{}\t{}\t{}",
            result.shift,
            result.match_type.label(),
            result.result_word,
        );
    }

    if outcome.limit_reached {
        eprintln!("結果が多すぎるため、検索を途中で打ち切りました");
    }

    Ok(outcome.results.len())
}

fn run(args: &Args) -> Result<usize, SearchError> {
    let store = DictionaryStore::new(args.data_dir.clone());
    let dictionary = store.load(&args.dictionary)?;

    let (mode, input) = match &args.mode {
        Mode::Anagram { input } => (SearchMode::Anagram, input),
        Mode::Crossword { input } => (SearchMode::Crossword, input),
        Mode::Pattern { input } => (SearchMode::Pattern, input),
        Mode::Regex { input } => (SearchMode::Regex, input),
        Mode::Exact { input } => (SearchMode::Exact, input),
        Mode::Shift { input, no_anagram } => {
            return run_shift(&dictionary, input, *no_anagram);
        },
    };

    let results = word_search::search(&dictionary, mode, input)?;

    for word in results.iter() {
        println!("{}", word);
    }

    Ok(results.len())
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(args.verbose, args.quiet);

    match run(&args) {
        Ok(0) => {
            println!("no results");
            ExitCode::SUCCESS
        },
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        },
    }
}
