#![forbid(unsafe_code)]
//! # lyric_corpus CLI
//!
//! Command-line front end for the `lyric_corpus` crate. Each subcommand runs
//! one analysis, prints the top rows to stdout and writes the full result to
//! a timestamped export file.
//!
//! ## Example
//! ```bash
//! cargo run --release -- ngrams path/to/lyrics --n 3 --export-format csv
//! cargo run --release -- keywords --study study.tsv --reference reference.tsv
//! ```
//!
//! Set `RUST_LOG=debug` for per-step statistics.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use log::error;
use lyric_corpus::{
    Corpus, ExportFormat, Exportable, FrequencyTable, NGramOptions, Result, compute_keywords,
    concordance_many, concordance_symmetric, dispersion_many, export, load_corpus, ngrams,
    print_failed_files, read_frequency_table, render, render_with, save_export,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Output format for export (txt, csv, tsv, json)
    #[arg(long, global = true, default_value = "txt")]
    export_format: ExportFormat,

    /// Directory export files are written to
    #[arg(long, global = true, default_value = ".")]
    out_dir: PathBuf,

    /// Number of rows printed to stdout
    #[arg(long, global = true, default_value_t = 20)]
    top: usize,

    /// Prefix CSV/TSV text cells that a spreadsheet would read as formulas
    #[arg(long, global = true)]
    spreadsheet_safe: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Keywords of a study frequency table against a reference table
    Keywords {
        /// Tab-separated study frequency table
        #[arg(long)]
        study: PathBuf,
        /// Tab-separated reference frequency table
        #[arg(long)]
        reference: PathBuf,
        /// Study corpus size, if not the sum of the table's frequencies
        #[arg(long)]
        study_total: Option<u64>,
        /// Reference corpus size, if not the sum of the table's frequencies
        #[arg(long)]
        reference_total: Option<u64>,
    },
    /// Keyword-in-context lines
    Concordance {
        /// Corpus directory of .txt files or .json corpus file
        corpus: PathBuf,
        /// Keyword to look up (repeatable)
        #[arg(long, required = true)]
        keyword: Vec<String>,
        /// Tokens of context to the left
        #[arg(long, default_value_t = 5)]
        left: usize,
        /// Tokens of context to the right (defaults to --left)
        #[arg(long)]
        right: Option<usize>,
    },
    /// N-gram frequencies
    Ngrams {
        /// Corpus directory of .txt files or .json corpus file
        corpus: PathBuf,
        /// Size of N (2 to 5)
        #[arg(long, default_value_t = 2)]
        n: usize,
        /// Minimum frequency for an n-gram to be reported
        #[arg(long, default_value_t = lyric_corpus::ngrams::DEFAULT_MIN_FREQUENCY)]
        min_frequency: usize,
        /// Maximum number of n-grams reported
        #[arg(long, default_value_t = lyric_corpus::ngrams::DEFAULT_MAX_RESULTS)]
        max_results: usize,
    },
    /// Dispersion of words across documents
    Dispersion {
        /// Corpus directory of .txt files or .json corpus file
        corpus: PathBuf,
        /// Word to measure (repeatable)
        #[arg(long, required = true)]
        word: Vec<String>,
    },
    /// Frequency table of a corpus
    Frequency {
        /// Corpus directory of .txt files or .json corpus file
        corpus: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(had_failed_files) => {
            if had_failed_files {
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Runs the selected subcommand. Returns whether any corpus file was skipped.
fn run(cli: Cli) -> Result<bool> {
    let out = cli.output;
    match cli.command {
        Command::Keywords {
            study,
            reference,
            study_total,
            reference_total,
        } => {
            let study_table = with_total(read_frequency_table(&study)?, study_total);
            let reference_table = with_total(read_frequency_table(&reference)?, reference_total);
            let results = compute_keywords(&study_table, &reference_table)?;
            emit(&results, &out, &stem_of(&study))?;
            Ok(false)
        }
        Command::Concordance {
            corpus,
            keyword,
            left,
            right,
        } => {
            let (loaded, failed) = open_corpus(&corpus)?;
            let lines: Vec<_> = match (keyword.as_slice(), right) {
                ([single], None) => concordance_symmetric(&loaded, single, left)?,
                _ => concordance_many(&loaded, &keyword, left, right.unwrap_or(left))?
                    .into_iter()
                    .flatten()
                    .collect(),
            };
            if lines.is_empty() {
                println!("No occurrences of {} found.", keyword.join(", "));
            }
            emit(&lines, &out, &stem_of(&corpus))?;
            Ok(failed)
        }
        Command::Ngrams {
            corpus,
            n,
            min_frequency,
            max_results,
        } => {
            let (loaded, failed) = open_corpus(&corpus)?;
            let options = NGramOptions::new(n)
                .min_frequency(min_frequency)
                .max_results(max_results);
            let analysis = ngrams(&loaded, &options)?;
            println!(
                "{n}-grams: {} windows, {} distinct, {} reported",
                analysis.total_ngrams,
                analysis.unique_ngrams,
                analysis.ngrams.len()
            );
            if out.export_format == ExportFormat::Json {
                // keep the coverage totals alongside the rows
                print_top(&analysis.ngrams, out.top)?;
                let content = export::to_json(&analysis)?;
                let path = save_export(
                    &content,
                    &out.out_dir,
                    &stem_of(&corpus),
                    "ngrams",
                    out.export_format,
                )?;
                println!("Results written to {}", path.display());
            } else {
                emit(&analysis.ngrams, &out, &stem_of(&corpus))?;
            }
            Ok(failed)
        }
        Command::Dispersion { corpus, word } => {
            let (loaded, failed) = open_corpus(&corpus)?;
            let results = dispersion_many(&loaded, &word)?;
            emit(&results, &out, &stem_of(&corpus))?;
            Ok(failed)
        }
        Command::Frequency { corpus } => {
            let (loaded, failed) = open_corpus(&corpus)?;
            let table = FrequencyTable::from_corpus(&loaded);
            let entries: Vec<_> = table.ranked().into_iter().cloned().collect();
            emit(&entries, &out, &stem_of(&corpus))?;
            Ok(failed)
        }
    }
}

fn with_total(table: FrequencyTable, total: Option<u64>) -> FrequencyTable {
    match total {
        Some(n) => table.with_total_tokens(n),
        None => table,
    }
}

fn open_corpus(path: &Path) -> Result<(Corpus, bool)> {
    let load = load_corpus(path)?;
    let failed = !load.failed_files.is_empty();
    if failed {
        print_failed_files(&load.failed_files);
    }
    Ok((load.corpus, failed))
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty() && s != ".")
        .unwrap_or_else(|| "corpus".to_string())
}

fn print_top<T: Exportable>(rows: &[T], top: usize) -> Result<()> {
    let shown = &rows[..rows.len().min(top)];
    print!("{}", render(shown, ExportFormat::Txt)?);
    Ok(())
}

fn emit<T: Exportable>(rows: &[T], out: &OutputArgs, stem: &str) -> Result<()> {
    print_top(rows, out.top)?;
    let content = render_with(rows, out.export_format, out.spreadsheet_safe)?;
    let path = save_export(&content, &out.out_dir, stem, T::KIND, out.export_format)?;
    println!("Results written to {}", path.display());
    Ok(())
}
