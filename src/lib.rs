#![forbid(unsafe_code)]
//! # lyric_corpus
//!
//! Corpus analytics over collections of song lyrics. A [`Corpus`] is an
//! ordered, immutable token stream split into documents; four independent
//! engines run over it:
//!
//! - [`compute_keywords`]: log-likelihood and mutual information of a study
//!   frequency table against a reference table;
//! - [`concordance`]: keyword-in-context lines;
//! - [`ngrams`]: frequency of contiguous token sequences;
//! - [`dispersion`]: how evenly a word is spread across documents.
//!
//! The engines only read the corpus, so one instance can be shared between
//! threads without locking.
//!
//! ## Example
//! ```
//! use lyric_corpus::{Corpus, NGramOptions, concordance, ngrams};
//!
//! let corpus = Corpus::from_token_lists(vec![vec!["a", "b", "c"], vec!["d", "a", "e"]]);
//! let lines = concordance(&corpus, "a", 1, 1).unwrap();
//! assert_eq!(lines[1].left_context, "d");
//!
//! let bigrams = ngrams(&corpus, &NGramOptions::new(2).min_frequency(1)).unwrap();
//! assert_eq!(bigrams.total_ngrams, 4);
//! ```

pub mod cache;
pub mod concordance;
pub mod corpus;
pub mod dispersion;
pub mod error;
pub mod export;
pub mod frequency;
pub mod keywords;
pub mod loader;
pub mod ngrams;

pub use cache::AnnotationCache;
pub use concordance::{ConcordanceLine, concordance, concordance_many, concordance_symmetric};
pub use corpus::{Corpus, Document, DocumentInput, DocumentMetadata, normalize_token};
pub use dispersion::{DensityClass, DispersionResult, OccurrencePoint, dispersion, dispersion_many};
pub use error::{AnalysisError, CorpusSide, Result};
pub use export::{ExportFormat, Exportable, csv_safe_cell, render, render_with, save_export};
pub use frequency::{FrequencyEntry, FrequencyTable, total_tokens};
pub use keywords::{
    KeywordResult, Significance, compute_keywords, log_likelihood, mutual_information,
};
pub use loader::{
    CorpusLoad, FailedFile, collect_files, load_corpus, print_failed_files, read_frequency_table,
    tokenize,
};
pub use ngrams::{NGramAnalysis, NGramEntry, NGramOptions, NGramSample, ngrams};
