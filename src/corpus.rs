//! Tokenized corpus model.
//!
//! A [`Corpus`] is an ordered, immutable list of [`Document`]s. Every document
//! knows its `corpus_offset`, the number of tokens in all documents before it,
//! so a token's corpus-wide position is `corpus_offset + local_index` without
//! ever flattening the token stream.

use serde::{Deserialize, Serialize};

/// Attribution for a document. Opaque to the engines; copied into results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
}

impl DocumentMetadata {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }
}

/// One document as delivered by an upstream parser.
///
/// `tokens` may be missing (`null` in JSON); that is treated as an empty
/// document rather than an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentInput {
    #[serde(default)]
    pub tokens: Option<Vec<String>>,
    #[serde(flatten)]
    pub metadata: DocumentMetadata,
}

impl DocumentInput {
    pub fn new<I, S>(tokens: I, metadata: DocumentMetadata) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: Some(tokens.into_iter().map(Into::into).collect()),
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    tokens: Vec<String>,
    metadata: DocumentMetadata,
    corpus_offset: usize,
}

impl Document {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn corpus_offset(&self) -> usize {
        self.corpus_offset
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    documents: Vec<Document>,
    total_tokens: usize,
}

impl Corpus {
    /// Builds a corpus in one pass, normalizing tokens and assigning offsets.
    ///
    /// Tokens that are empty after normalization are dropped, so they never
    /// occupy a corpus position.
    pub fn new<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = DocumentInput>,
    {
        let mut documents = Vec::new();
        let mut offset = 0usize;
        let mut dropped = 0usize;

        for input in inputs {
            let raw = input.tokens.unwrap_or_default();
            let raw_len = raw.len();
            let tokens: Vec<String> = raw
                .iter()
                .map(|t| normalize_token(t))
                .filter(|t| !t.is_empty())
                .collect();
            dropped += raw_len - tokens.len();

            let len = tokens.len();
            documents.push(Document {
                tokens,
                metadata: input.metadata,
                corpus_offset: offset,
            });
            offset += len;
        }

        if dropped > 0 {
            log::debug!("dropped {dropped} empty tokens while building corpus");
        }
        log::debug!(
            "built corpus with {} documents and {} tokens",
            documents.len(),
            offset
        );

        Self {
            documents,
            total_tokens: offset,
        }
    }

    /// Convenience constructor for pre-tokenized text without attribution.
    pub fn from_token_lists<I, D, S>(lists: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            lists
                .into_iter()
                .map(|tokens| DocumentInput::new(tokens, DocumentMetadata::default())),
        )
    }

    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn document_at(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    /// Corpus-wide position of token `local_index` in document `document_index`.
    pub fn global_position(&self, document_index: usize, local_index: usize) -> Option<usize> {
        let doc = self.documents.get(document_index)?;
        if local_index < doc.token_count() {
            Some(doc.corpus_offset + local_index)
        } else {
            None
        }
    }
}

/// Lower-cases and trims a token.
pub fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase()
}
