//! Frequency tables.
//!
//! Tables come from tab-separated exports with the columns
//! `type, pos, headword, rank, freq, range, norm_freq, norm_range`, or are
//! derived directly from a [`Corpus`]. Malformed rows are dropped silently.
//!
//! Ranks are always assigned here: a stable sort on descending frequency, so
//! equal frequencies keep their input order. The rank column of a source file
//! is read but not trusted.

use std::io::Read;

use indexmap::IndexMap;
use indexmap::map::Values;
use rayon::prelude::*;
use serde::Serialize;

use crate::corpus::{Corpus, normalize_token};
use crate::error::{AnalysisError, Result};

const COL_HEADWORD: usize = 2;
const COL_FREQ: usize = 4;
const COL_RANGE: usize = 5;
const COL_NORM_FREQ: usize = 6;
const COL_NORM_RANGE: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyEntry {
    pub headword: String,
    pub rank: usize,
    pub frequency: u64,
    pub range: u64,
    pub norm_frequency: f64,
    pub norm_range: f64,
}

impl FrequencyEntry {
    pub fn new(headword: impl Into<String>, frequency: u64) -> Self {
        Self {
            headword: headword.into(),
            rank: 0,
            frequency,
            range: 0,
            norm_frequency: 0.0,
            norm_range: 0.0,
        }
    }

    /// Parses one tabular row. Returns `None` for rows without a headword or
    /// with a missing, non-numeric or non-positive frequency.
    pub fn parse_row(fields: &[&str]) -> Option<Self> {
        let headword = normalize_token(fields.get(COL_HEADWORD)?);
        if headword.is_empty() {
            return None;
        }
        let frequency = parse_count(fields.get(COL_FREQ)?)?;
        if frequency == 0 {
            return None;
        }
        Some(Self {
            headword,
            rank: 0,
            frequency,
            range: fields.get(COL_RANGE).and_then(|s| parse_count(s)).unwrap_or(0),
            norm_frequency: fields.get(COL_NORM_FREQ).map_or(0.0, |s| parse_float(s)),
            norm_range: fields.get(COL_NORM_RANGE).map_or(0.0, |s| parse_float(s)),
        })
    }
}

/// Sum of all frequencies: the corpus size used as LL/MI denominator.
/// Saturates at `u64::MAX` instead of overflowing.
pub fn total_tokens<'a, I>(entries: I) -> u64
where
    I: IntoIterator<Item = &'a FrequencyEntry>,
{
    entries
        .into_iter()
        .fold(0u64, |acc, e| acc.saturating_add(e.frequency))
}

#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: IndexMap<String, FrequencyEntry>,
    total_tokens: u64,
}

impl FrequencyTable {
    /// Builds a table from entries in input order.
    ///
    /// Invalid entries are dropped. A repeated headword replaces the earlier
    /// entry in place: the position is the first occurrence's, the values are
    /// the last occurrence's.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = FrequencyEntry>,
    {
        let mut kept: IndexMap<String, FrequencyEntry> = IndexMap::new();
        let mut dropped = 0usize;
        let mut replaced = 0usize;

        for mut entry in entries {
            entry.headword = normalize_token(&entry.headword);
            if entry.headword.is_empty() || entry.frequency == 0 {
                dropped += 1;
                continue;
            }
            // IndexMap::insert keeps the slot of an existing key
            if kept.insert(entry.headword.clone(), entry).is_some() {
                replaced += 1;
            }
        }

        if dropped > 0 || replaced > 0 {
            log::debug!("frequency table: dropped {dropped} invalid rows, replaced {replaced} duplicates");
        }

        assign_ranks(&mut kept);
        let total_tokens = total_tokens(kept.values());
        Self {
            entries: kept,
            total_tokens,
        }
    }

    /// Builds a table from already-split rows, skipping malformed ones.
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut malformed = 0usize;
        let entries: Vec<FrequencyEntry> = rows
            .into_iter()
            .filter_map(|row| {
                let fields: Vec<&str> = row.as_ref().iter().map(AsRef::as_ref).collect();
                let parsed = FrequencyEntry::parse_row(&fields);
                if parsed.is_none() {
                    malformed += 1;
                }
                parsed
            })
            .collect();
        if malformed > 0 {
            log::debug!("frequency table: skipped {malformed} malformed rows");
        }
        Self::from_entries(entries)
    }

    /// Reads a tab-separated frequency export.
    ///
    /// Only I/O failures are errors; undecodable rows are skipped.
    pub fn read_tsv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in rdr.records() {
            match record {
                Ok(r) => rows.push(r.iter().map(str::to_string).collect()),
                Err(e) if e.is_io_error() => {
                    return Err(AnalysisError::csv("reading frequency table", e));
                }
                Err(e) => log::debug!("frequency table: skipping undecodable row: {e}"),
            }
        }
        Ok(Self::from_rows(rows))
    }

    /// Word counts over a tokenized corpus, in order of first appearance.
    ///
    /// `range` is the number of documents containing the word, `norm_frequency`
    /// is per million tokens and `norm_range` is the share of documents.
    pub fn from_corpus(corpus: &Corpus) -> Self {
        // word -> (frequency, range, last document seen)
        let mut counts: IndexMap<&str, (u64, u64, usize)> = IndexMap::new();

        for (doc_index, doc) in corpus.documents().iter().enumerate() {
            for token in doc.tokens() {
                let slot = counts.entry(token.as_str()).or_insert((0, 0, usize::MAX));
                slot.0 = slot.0.saturating_add(1);
                if slot.2 != doc_index {
                    slot.1 += 1;
                    slot.2 = doc_index;
                }
            }
        }

        let total = corpus.total_tokens() as f64;
        let docs = corpus.document_count() as f64;
        let entries: Vec<FrequencyEntry> = counts
            .into_iter()
            .map(|(word, (frequency, range, _))| FrequencyEntry {
                headword: word.to_string(),
                rank: 0,
                frequency,
                range,
                norm_frequency: frequency as f64 * 1_000_000.0 / total,
                norm_range: range as f64 / docs,
            })
            .collect();
        Self::from_entries(entries)
    }

    /// Overrides the corpus size used as the statistics denominator.
    pub fn with_total_tokens(mut self, total_tokens: u64) -> Self {
        self.total_tokens = total_tokens;
        self
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// Entries in input order.
    pub fn entries(&self) -> Values<'_, String, FrequencyEntry> {
        self.entries.values()
    }

    pub fn par_entries(&self) -> impl IndexedParallelIterator<Item = &FrequencyEntry> + '_ {
        self.entries.par_values()
    }

    pub fn get(&self, headword: &str) -> Option<&FrequencyEntry> {
        self.entries.get(headword)
    }

    /// Frequency of `headword`, 0 when absent.
    pub fn frequency_of(&self, headword: &str) -> u64 {
        self.get(headword).map_or(0, |e| e.frequency)
    }

    /// Entries ordered by rank.
    pub fn ranked(&self) -> Vec<&FrequencyEntry> {
        let mut out: Vec<&FrequencyEntry> = self.entries.values().collect();
        out.sort_by_key(|e| e.rank);
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn assign_ranks(entries: &mut IndexMap<String, FrequencyEntry>) {
    let mut order: Vec<(usize, u64)> = entries
        .values()
        .map(|e| e.frequency)
        .enumerate()
        .collect();
    // stable: equal frequencies keep input order
    order.sort_by(|a, b| b.1.cmp(&a.1));
    for (rank, (i, _)) in order.into_iter().enumerate() {
        if let Some((_, entry)) = entries.get_index_mut(i) {
            entry.rank = rank + 1;
        }
    }
}

fn parse_count(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 {
        Some(f as u64)
    } else {
        None
    }
}

fn parse_float(s: &str) -> f64 {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}
