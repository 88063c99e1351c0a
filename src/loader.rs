//! Loading corpora and frequency tables from disk.
//!
//! A corpus is either a `.json` file holding an array of documents
//! (`{"tokens": [...], "artist": ..., "title": ..., "album": ...}`) or a
//! directory of `.txt` lyrics, one song per file, named `Artist - Title.txt`.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::corpus::{Corpus, DocumentInput, DocumentMetadata};
use crate::error::{AnalysisError, Result};
use crate::frequency::FrequencyTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct CorpusLoad {
    pub corpus: Corpus,
    pub failed_files: Vec<FailedFile>,
}

/// Splits text into lower-cased word tokens.
///
/// Anything that is not alphanumeric or an apostrophe separates words, and
/// apostrophes at either end of a word are stripped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' || c == '’' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| c == '\'' || c == '’'))
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Parses `Artist - Title` into metadata. Without the separator the whole
/// stem is the title.
pub fn metadata_from_stem(stem: &str) -> DocumentMetadata {
    match stem.split_once(" - ") {
        Some((artist, title)) => DocumentMetadata::new(artist.trim(), title.trim()),
        None => DocumentMetadata::new("", stem.trim()),
    }
}

/// `.txt` files under `path`, sorted by path. A file path is returned as-is.
pub fn collect_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|x| x.to_str())
                .map(|x| x.eq_ignore_ascii_case("txt"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

pub fn load_corpus(path: &Path) -> Result<CorpusLoad> {
    if !path.exists() {
        return Err(AnalysisError::io(
            "opening corpus",
            io::Error::new(io::ErrorKind::NotFound, path.display().to_string()),
        ));
    }
    let is_json = path
        .extension()
        .and_then(|x| x.to_str())
        .map(|x| x.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if path.is_file() && is_json {
        return load_corpus_json(path).map(|corpus| CorpusLoad {
            corpus,
            failed_files: Vec::new(),
        });
    }
    Ok(load_corpus_dir(path))
}

pub fn load_corpus_json(path: &Path) -> Result<Corpus> {
    let file = File::open(path).map_err(|e| AnalysisError::io("opening corpus json", e))?;
    let inputs: Vec<DocumentInput> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AnalysisError::json("parsing corpus json", e))?;
    Ok(Corpus::new(inputs))
}

/// Reads every `.txt` file under `path` as one document. Unreadable files are
/// reported in `failed_files` and skipped.
pub fn load_corpus_dir(path: &Path) -> CorpusLoad {
    let mut inputs = Vec::new();
    let mut failed_files = Vec::new();

    for file in collect_files(path) {
        match fs::read_to_string(&file) {
            Ok(text) => {
                let stem = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                inputs.push(DocumentInput::new(tokenize(&text), metadata_from_stem(&stem)));
            }
            Err(e) => {
                log::warn!("skipping {}: {e}", file.display());
                failed_files.push(FailedFile {
                    path: file,
                    reason: e.to_string(),
                });
            }
        }
    }

    CorpusLoad {
        corpus: Corpus::new(inputs),
        failed_files,
    }
}

pub fn read_frequency_table(path: &Path) -> Result<FrequencyTable> {
    let file = File::open(path).map_err(|e| AnalysisError::io("opening frequency table", e))?;
    FrequencyTable::read_tsv(BufReader::new(file))
}

/// Prints skipped files to stderr.
pub fn print_failed_files(failed: &[FailedFile]) {
    eprintln!("\nWarning: the following files could not be read:");
    for f in failed {
        eprintln!("  {}: {}", f.path.display(), f.reason);
    }
}
