//! Lexical dispersion: how evenly a word is spread across documents.
//!
//! The coefficient is `D = 1 - cv / sqrt(k - 1)`, where `cv` is the coefficient
//! of variation of the per-document frequencies and `k` the document count,
//! clamped to `[0, 1]`.
//!
//! Boundary rules:
//! - a word that never occurs has `D = 0`, no points and `Low` density;
//! - in a corpus of at most one document a word that occurs has `D = 1`.

use rayon::prelude::*;
use serde::Serialize;

use crate::corpus::{Corpus, DocumentMetadata, normalize_token};
use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DensityClass {
    High,
    Medium,
    Low,
}

impl DensityClass {
    pub fn from_coefficient(d: f64) -> Self {
        if d > 0.7 {
            DensityClass::High
        } else if d > 0.4 {
            DensityClass::Medium
        } else {
            DensityClass::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DensityClass::High => "High",
            DensityClass::Medium => "Medium",
            DensityClass::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccurrencePoint {
    /// `absolute_position / total_tokens`, in `[0, 1)`.
    pub normalized_position: f64,
    pub absolute_position: usize,
    pub source_document: DocumentMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispersionResult {
    pub word: String,
    pub total_occurrences: usize,
    pub occurrence_points: Vec<OccurrencePoint>,
    pub dispersion_coefficient: f64,
    pub documents_containing_word: usize,
    pub density_class: DensityClass,
}

pub fn dispersion(corpus: &Corpus, word: &str) -> Result<DispersionResult> {
    let word = normalize_token(word);
    if word.is_empty() {
        return Err(AnalysisError::EmptyKeyword);
    }

    let total_tokens = corpus.total_tokens() as f64;
    let mut per_document: Vec<usize> = Vec::with_capacity(corpus.document_count());
    let mut points = Vec::new();

    for doc in corpus.documents() {
        let mut count = 0usize;
        for (i, token) in doc.tokens().iter().enumerate() {
            if *token == word {
                count += 1;
                let absolute_position = doc.corpus_offset() + i;
                points.push(OccurrencePoint {
                    normalized_position: absolute_position as f64 / total_tokens,
                    absolute_position,
                    source_document: doc.metadata().clone(),
                });
            }
        }
        per_document.push(count);
    }

    let total_occurrences = points.len();
    let documents_containing_word = per_document.iter().filter(|&&f| f > 0).count();
    let dispersion_coefficient = coefficient(&per_document, total_occurrences);

    log::debug!(
        "dispersion for {word:?}: {total_occurrences} hits in {documents_containing_word} documents, D={dispersion_coefficient:.4}"
    );

    Ok(DispersionResult {
        word,
        total_occurrences,
        occurrence_points: points,
        dispersion_coefficient,
        documents_containing_word,
        density_class: DensityClass::from_coefficient(dispersion_coefficient),
    })
}

/// Runs [`dispersion`] for several words in parallel, in input order.
pub fn dispersion_many<S>(corpus: &Corpus, words: &[S]) -> Result<Vec<DispersionResult>>
where
    S: AsRef<str> + Sync,
{
    words
        .par_iter()
        .map(|w| dispersion(corpus, w.as_ref()))
        .collect()
}

fn coefficient(per_document: &[usize], total_occurrences: usize) -> f64 {
    if total_occurrences == 0 {
        return 0.0;
    }
    let k = per_document.len();
    if k <= 1 {
        return 1.0;
    }
    let kf = k as f64;
    let expected = total_occurrences as f64 / kf;
    let variance = per_document
        .iter()
        .map(|&f| (f as f64 - expected).powi(2))
        .sum::<f64>()
        / kf;
    let cv = variance.sqrt() / expected;
    (1.0 - cv / (kf - 1.0).sqrt()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::DocumentInput;

    #[test]
    fn single_document_is_fully_dispersed() {
        let c = Corpus::from_token_lists(vec![vec!["a", "b", "a"]]);
        let r = dispersion(&c, "a").unwrap();
        assert_eq!(r.total_occurrences, 2);
        assert_eq!(r.dispersion_coefficient, 1.0);
        assert_eq!(r.density_class, DensityClass::High);
        assert_eq!(r.documents_containing_word, 1);
    }

    #[test]
    fn absent_word_is_zero() {
        let c = Corpus::from_token_lists(vec![vec!["a"], vec!["b"]]);
        let r = dispersion(&c, "zzz").unwrap();
        assert_eq!(r.total_occurrences, 0);
        assert_eq!(r.dispersion_coefficient, 0.0);
        assert!(r.occurrence_points.is_empty());
        assert_eq!(r.density_class, DensityClass::Low);
        assert_eq!(r.documents_containing_word, 0);
    }

    #[test]
    fn empty_corpus_is_not_found() {
        let c = Corpus::default();
        let r = dispersion(&c, "a").unwrap();
        assert_eq!(r.dispersion_coefficient, 0.0);
    }

    #[test]
    fn even_spread_is_one() {
        let c = Corpus::from_token_lists(vec![vec!["a", "x"], vec!["y", "a"], vec!["a"]]);
        let r = dispersion(&c, "A").unwrap();
        assert!((r.dispersion_coefficient - 1.0).abs() < 1e-12);
        assert_eq!(r.documents_containing_word, 3);
    }

    #[test]
    fn concentrated_word_is_zero() {
        let c = Corpus::from_token_lists(vec![vec!["a", "a"], vec!["b", "c"]]);
        let r = dispersion(&c, "a").unwrap();
        // f = [2, 0], expected 1, sd 1, cv 1, D = 1 - 1/1
        assert!(r.dispersion_coefficient.abs() < 1e-12);
        assert_eq!(r.density_class, DensityClass::Low);
    }

    #[test]
    fn partial_spread_is_medium() {
        // f = [1, 1, 1, 0]: expected 0.75, sd ~0.433, cv ~0.577, D ~0.667
        let c = Corpus::from_token_lists(vec![vec!["a"], vec!["a"], vec!["a"], vec!["b"]]);
        let r = dispersion(&c, "a").unwrap();
        let expected = 1.0 - (1.0f64 / 3.0).sqrt() / 3f64.sqrt();
        assert!((r.dispersion_coefficient - expected).abs() < 1e-12);
        assert_eq!(r.density_class, DensityClass::Medium);
    }

    #[test]
    fn points_carry_positions_and_sources() {
        let c = Corpus::new(vec![
            DocumentInput::new(["x", "y"], DocumentMetadata::new("A", "One")),
            DocumentInput::new(["y", "z"], DocumentMetadata::new("B", "Two")),
        ]);
        let r = dispersion(&c, "y").unwrap();
        let positions: Vec<usize> = r.occurrence_points.iter().map(|p| p.absolute_position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert_eq!(r.occurrence_points[0].normalized_position, 0.25);
        assert_eq!(r.occurrence_points[1].normalized_position, 0.5);
        assert_eq!(r.occurrence_points[1].source_document.title, "Two");
    }

    #[test]
    fn density_bands() {
        assert_eq!(DensityClass::from_coefficient(0.71), DensityClass::High);
        assert_eq!(DensityClass::from_coefficient(0.7), DensityClass::Medium);
        assert_eq!(DensityClass::from_coefficient(0.4), DensityClass::Low);
    }

    #[test]
    fn blank_word_is_error() {
        let c = Corpus::from_token_lists(vec![vec!["a"]]);
        assert!(dispersion(&c, " ").is_err());
        let many = dispersion_many(&c, &["a", "b"]).unwrap();
        assert_eq!(many[0].total_occurrences, 1);
        assert_eq!(many[1].total_occurrences, 0);
    }
}
