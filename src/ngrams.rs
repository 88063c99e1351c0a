//! N-gram extraction over a tokenized corpus.
//!
//! Windows never cross document boundaries. Each distinct n-gram keeps at most
//! [`SAMPLE_CAP`] sample occurrences.

use indexmap::IndexMap;
use serde::Serialize;

use crate::corpus::{Corpus, DocumentMetadata};
use crate::error::{AnalysisError, Result};

pub const MIN_N: usize = 2;
pub const MAX_N: usize = 5;
pub const DEFAULT_MIN_FREQUENCY: usize = 2;
pub const DEFAULT_MAX_RESULTS: usize = 500;
/// Sample occurrences retained per n-gram.
pub const SAMPLE_CAP: usize = 10;
/// Tokens of context kept on each side of a sample.
pub const SAMPLE_CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NGramOptions {
    pub n: usize,
    pub min_frequency: usize,
    pub max_results: usize,
}

impl NGramOptions {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn min_frequency(mut self, min_frequency: usize) -> Self {
        self.min_frequency = min_frequency;
        self
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

impl Default for NGramOptions {
    fn default() -> Self {
        Self::new(MIN_N)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NGramSample {
    /// The n-gram with up to three tokens either side, clipped at the document.
    pub context: String,
    pub source_document: DocumentMetadata,
    pub global_position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NGramEntry {
    pub tokens: Vec<String>,
    pub frequency: usize,
    pub samples: Vec<NGramSample>,
}

impl NGramEntry {
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NGramAnalysis {
    pub n: usize,
    /// Windows processed, before any filtering.
    pub total_ngrams: usize,
    /// Distinct n-grams, before any filtering.
    pub unique_ngrams: usize,
    pub ngrams: Vec<NGramEntry>,
}

/// Counts contiguous `n`-token sequences, keeps those with at least
/// `min_frequency` occurrences, sorts by descending frequency (ties in
/// first-seen order) and truncates to `max_results`.
pub fn ngrams(corpus: &Corpus, options: &NGramOptions) -> Result<NGramAnalysis> {
    let n = options.n;
    if !(MIN_N..=MAX_N).contains(&n) {
        return Err(AnalysisError::InvalidNGramSize { n });
    }

    // insertion order is first-seen order
    let mut counts: IndexMap<String, NGramEntry> = IndexMap::new();
    let mut total_ngrams = 0usize;

    for doc in corpus.documents() {
        let tokens = doc.tokens();
        for (i, window) in tokens.windows(n).enumerate() {
            total_ngrams += 1;
            let entry = counts
                .entry(window.join(" "))
                .or_insert_with(|| NGramEntry {
                    tokens: window.to_vec(),
                    frequency: 0,
                    samples: Vec::new(),
                });
            entry.frequency += 1;
            if entry.samples.len() < SAMPLE_CAP {
                let start = i.saturating_sub(SAMPLE_CONTEXT);
                let end = (i + n + SAMPLE_CONTEXT).min(tokens.len());
                entry.samples.push(NGramSample {
                    context: tokens[start..end].join(" "),
                    source_document: doc.metadata().clone(),
                    global_position: doc.corpus_offset() + i,
                });
            }
        }
    }

    let unique_ngrams = counts.len();
    let mut entries: Vec<NGramEntry> = counts.into_values().collect();
    entries.retain(|e| e.frequency >= options.min_frequency);
    // stable: equal frequencies stay in first-seen order
    entries.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    entries.truncate(options.max_results);

    log::debug!(
        "{n}-grams: {total_ngrams} windows, {unique_ngrams} distinct, {} reported",
        entries.len()
    );

    Ok(NGramAnalysis {
        n,
        total_ngrams,
        unique_ngrams,
        ngrams: entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq_of(a: &NGramAnalysis, text: &str) -> Option<usize> {
        a.ngrams.iter().find(|e| e.text() == text).map(|e| e.frequency)
    }

    #[test]
    fn bigrams_over_abab() {
        let c = Corpus::from_token_lists(vec![vec!["a", "b", "a", "b"]]);
        let a = ngrams(&c, &NGramOptions::new(2).min_frequency(1)).unwrap();
        assert_eq!(a.total_ngrams, 3);
        assert_eq!(a.unique_ngrams, 2);
        assert_eq!(freq_of(&a, "a b"), Some(2));
        assert_eq!(freq_of(&a, "b a"), Some(1));
        assert_eq!(a.ngrams[0].text(), "a b");
    }

    #[test]
    fn default_floor_filters_singletons() {
        let c = Corpus::from_token_lists(vec![vec!["a", "b", "a", "b"]]);
        let a = ngrams(&c, &NGramOptions::new(2)).unwrap();
        assert_eq!(a.ngrams.len(), 1);
        assert_eq!(a.unique_ngrams, 2);
    }

    #[test]
    fn windows_do_not_cross_documents() {
        let c = Corpus::from_token_lists(vec![vec!["x", "y"], vec!["z", "w"], vec!["q"]]);
        let a = ngrams(&c, &NGramOptions::new(2).min_frequency(1)).unwrap();
        assert_eq!(a.total_ngrams, 2);
        assert_eq!(freq_of(&a, "y z"), None);
    }

    #[test]
    fn n_out_of_range_is_error() {
        let c = Corpus::from_token_lists(vec![vec!["a", "b"]]);
        for n in [0, 1, 6] {
            assert!(matches!(
                ngrams(&c, &NGramOptions::new(n)),
                Err(AnalysisError::InvalidNGramSize { n: got }) if got == n
            ));
        }
        assert!(ngrams(&c, &NGramOptions::new(5)).is_ok());
    }

    #[test]
    fn ties_keep_first_seen_order_and_truncate() {
        let c = Corpus::from_token_lists(vec![vec!["c", "d", "a", "b", "c", "d", "a", "b"]]);
        let a = ngrams(&c, &NGramOptions::new(2).max_results(2)).unwrap();
        let texts: Vec<String> = a.ngrams.iter().map(NGramEntry::text).collect();
        assert_eq!(texts, vec!["c d", "d a"]);
        assert_eq!(a.unique_ngrams, 4);
    }

    #[test]
    fn samples_are_capped_and_contextualised() {
        let tokens: Vec<String> = (0..30).flat_map(|_| ["la", "la"]).map(String::from).collect();
        let mut docs = vec![vec!["oi".to_string(), "tchê".to_string(), "la".to_string()]];
        docs.push(tokens);
        let c = Corpus::from_token_lists(docs);
        let a = ngrams(&c, &NGramOptions::new(2)).unwrap();
        let la_la = a.ngrams.iter().find(|e| e.text() == "la la").unwrap();
        assert_eq!(la_la.frequency, 59);
        assert_eq!(la_la.samples.len(), SAMPLE_CAP);
        assert_eq!(la_la.samples[0].global_position, 3);
        assert_eq!(la_la.samples[0].context, "la la la la la");
        assert_eq!(la_la.samples[4].context, "la la la la la la la la");
    }

    #[test]
    fn sample_context_clips_at_document_start() {
        let c = Corpus::from_token_lists(vec![vec!["a", "b", "c", "d", "e", "f", "a", "b"]]);
        let a = ngrams(&c, &NGramOptions::new(2)).unwrap();
        let ab = &a.ngrams[0];
        assert_eq!(ab.text(), "a b");
        assert_eq!(ab.samples[0].context, "a b c d e");
        assert_eq!(ab.samples[1].context, "d e f a b");
        assert_eq!(ab.samples[1].global_position, 6);
    }
}
