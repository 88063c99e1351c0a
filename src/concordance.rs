//! Keyword-in-context concordancing.

use rayon::prelude::*;
use serde::Serialize;

use crate::corpus::{Corpus, DocumentMetadata, normalize_token};
use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcordanceLine {
    pub keyword: String,
    pub left_context: String,
    pub right_context: String,
    pub source_document: DocumentMetadata,
    pub position_in_document: usize,
}

/// Every occurrence of `keyword` with up to `left_window` tokens before and
/// `right_window` tokens after it, clipped at document edges.
///
/// Lines come in document order, then position order. No occurrence yields an
/// empty list; an empty or whitespace-only keyword is an error.
pub fn concordance(
    corpus: &Corpus,
    keyword: &str,
    left_window: usize,
    right_window: usize,
) -> Result<Vec<ConcordanceLine>> {
    let keyword = normalize_token(keyword);
    if keyword.is_empty() {
        return Err(AnalysisError::EmptyKeyword);
    }

    let mut lines = Vec::new();
    for doc in corpus.documents() {
        let tokens = doc.tokens();
        for (i, token) in tokens.iter().enumerate() {
            if *token != keyword {
                continue;
            }
            let start = i.saturating_sub(left_window);
            let end = (i + 1).saturating_add(right_window).min(tokens.len());
            lines.push(ConcordanceLine {
                keyword: keyword.clone(),
                left_context: tokens[start..i].join(" "),
                right_context: tokens[i + 1..end].join(" "),
                source_document: doc.metadata().clone(),
                position_in_document: i,
            });
        }
    }

    log::debug!("concordance for {keyword:?}: {} lines", lines.len());
    Ok(lines)
}

/// [`concordance`] with the same window on both sides.
pub fn concordance_symmetric(
    corpus: &Corpus,
    keyword: &str,
    window: usize,
) -> Result<Vec<ConcordanceLine>> {
    concordance(corpus, keyword, window, window)
}

/// Runs [`concordance`] for several keywords in parallel. Output order follows
/// `keywords`; the first invalid keyword fails the whole batch.
pub fn concordance_many<S>(
    corpus: &Corpus,
    keywords: &[S],
    left_window: usize,
    right_window: usize,
) -> Result<Vec<Vec<ConcordanceLine>>>
where
    S: AsRef<str> + Sync,
{
    keywords
        .par_iter()
        .map(|k| concordance(corpus, k.as_ref(), left_window, right_window))
        .collect()
}
