//! Export of analysis results as TXT, CSV, TSV or JSON.
//!
//! Column order for delimited formats follows the field order of each result
//! type. Cells are written verbatim unless spreadsheet-safe output is asked
//! for, in which case text cells go through [`csv_safe_cell`] so spreadsheet
//! applications do not evaluate them as formulas. Numeric cells are never
//! altered.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use clap::ValueEnum;
use serde::Serialize;

use crate::concordance::ConcordanceLine;
use crate::corpus::DocumentMetadata;
use crate::dispersion::DispersionResult;
use crate::error::{AnalysisError, Result};
use crate::frequency::FrequencyEntry;
use crate::keywords::KeywordResult;
use crate::ngrams::NGramEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }
}

/// A result row that can be written as one line of a table.
pub trait Exportable: Serialize {
    /// Suffix used in export file names, e.g. `keywords`.
    const KIND: &'static str;

    fn headers() -> &'static [&'static str];

    /// Cells of one row. With `spreadsheet_safe`, text cells are passed
    /// through [`csv_safe_cell`].
    fn record(&self, spreadsheet_safe: bool) -> Vec<String>;
}

/// Neutralises cells that a spreadsheet would read as a formula by prefixing
/// a single quote. Cells that already start with a quote are left alone.
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}

fn text(cell: String, spreadsheet_safe: bool) -> String {
    if spreadsheet_safe {
        csv_safe_cell(cell)
    } else {
        cell
    }
}

fn num(v: f64) -> String {
    format!("{v:.6}")
}

fn source(meta: &DocumentMetadata) -> String {
    format!("{}/{}", meta.artist, meta.title)
}

/// Separator between items packed into one cell.
const LIST_SEPARATOR: &str = " | ";

impl Exportable for KeywordResult {
    const KIND: &'static str = "keywords";

    fn headers() -> &'static [&'static str] {
        &[
            "word",
            "study_frequency",
            "reference_frequency",
            "log_likelihood",
            "mutual_information",
            "significance",
        ]
    }

    fn record(&self, safe: bool) -> Vec<String> {
        vec![
            text(self.word.clone(), safe),
            self.study_frequency.to_string(),
            self.reference_frequency.to_string(),
            num(self.log_likelihood),
            num(self.mutual_information),
            self.significance.as_str().to_string(),
        ]
    }
}

impl Exportable for ConcordanceLine {
    const KIND: &'static str = "concordance";

    fn headers() -> &'static [&'static str] {
        &[
            "keyword",
            "left_context",
            "right_context",
            "artist",
            "title",
            "album",
            "position_in_document",
        ]
    }

    fn record(&self, safe: bool) -> Vec<String> {
        let src = &self.source_document;
        vec![
            text(self.keyword.clone(), safe),
            text(self.left_context.clone(), safe),
            text(self.right_context.clone(), safe),
            text(src.artist.clone(), safe),
            text(src.title.clone(), safe),
            text(src.album.clone().unwrap_or_default(), safe),
            self.position_in_document.to_string(),
        ]
    }
}

impl Exportable for NGramEntry {
    const KIND: &'static str = "ngrams";

    fn headers() -> &'static [&'static str] {
        &["ngram", "frequency", "samples"]
    }

    fn record(&self, safe: bool) -> Vec<String> {
        // position@artist/title@context
        let samples: Vec<String> = self
            .samples
            .iter()
            .map(|s| format!("{}@{}@{}", s.global_position, source(&s.source_document), s.context))
            .collect();
        vec![
            text(self.text(), safe),
            self.frequency.to_string(),
            text(samples.join(LIST_SEPARATOR), safe),
        ]
    }
}

impl Exportable for DispersionResult {
    const KIND: &'static str = "dispersion";

    fn headers() -> &'static [&'static str] {
        &[
            "word",
            "total_occurrences",
            "occurrence_points",
            "dispersion_coefficient",
            "documents_containing_word",
            "density_class",
        ]
    }

    fn record(&self, safe: bool) -> Vec<String> {
        // absolute@normalized@artist/title
        let points: Vec<String> = self
            .occurrence_points
            .iter()
            .map(|p| {
                format!(
                    "{}@{}@{}",
                    p.absolute_position,
                    num(p.normalized_position),
                    source(&p.source_document)
                )
            })
            .collect();
        vec![
            text(self.word.clone(), safe),
            self.total_occurrences.to_string(),
            text(points.join(LIST_SEPARATOR), safe),
            num(self.dispersion_coefficient),
            self.documents_containing_word.to_string(),
            self.density_class.as_str().to_string(),
        ]
    }
}

impl Exportable for FrequencyEntry {
    const KIND: &'static str = "frequency";

    fn headers() -> &'static [&'static str] {
        &[
            "headword",
            "rank",
            "frequency",
            "range",
            "norm_frequency",
            "norm_range",
        ]
    }

    fn record(&self, safe: bool) -> Vec<String> {
        vec![
            text(self.headword.clone(), safe),
            self.rank.to_string(),
            self.frequency.to_string(),
            self.range.to_string(),
            num(self.norm_frequency),
            num(self.norm_range),
        ]
    }
}

/// Writes a header row plus one row per result with RFC 4180 quoting.
pub fn write_delimited<W, T>(
    writer: W,
    rows: &[T],
    delimiter: u8,
    spreadsheet_safe: bool,
) -> Result<()>
where
    W: Write,
    T: Exportable,
{
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    wtr.write_record(T::headers())
        .map_err(|e| AnalysisError::csv("writing header", e))?;
    for row in rows {
        wtr.write_record(row.record(spreadsheet_safe))
            .map_err(|e| AnalysisError::csv("writing row", e))?;
    }
    wtr.flush()
        .map_err(|e| AnalysisError::io("flushing export", e))?;
    Ok(())
}

/// Plain-text listing: one `header: value` line group per row.
pub fn write_txt<W, T>(mut writer: W, rows: &[T]) -> Result<()>
where
    W: Write,
    T: Exportable,
{
    let headers = T::headers();
    for row in rows {
        let fields: Vec<String> = headers
            .iter()
            .zip(row.record(false))
            .map(|(h, v)| format!("{h}: {v}"))
            .collect();
        writeln!(writer, "{}", fields.join(", "))
            .map_err(|e| AnalysisError::io("writing text export", e))?;
    }
    Ok(())
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| AnalysisError::json("serialising export", e))
}

/// Renders `rows` in `format` with every cell verbatim. JSON is the array of
/// rows as serialised by serde.
pub fn render<T: Exportable>(rows: &[T], format: ExportFormat) -> Result<String> {
    render_with(rows, format, false)
}

/// Like [`render`], but CSV and TSV text cells can be made spreadsheet-safe.
/// TXT and JSON output is never altered.
pub fn render_with<T: Exportable>(
    rows: &[T],
    format: ExportFormat,
    spreadsheet_safe: bool,
) -> Result<String> {
    let mut buf = Vec::new();
    match format {
        ExportFormat::Txt => write_txt(&mut buf, rows)?,
        ExportFormat::Csv => write_delimited(&mut buf, rows, b',', spreadsheet_safe)?,
        ExportFormat::Tsv => write_delimited(&mut buf, rows, b'\t', spreadsheet_safe)?,
        ExportFormat::Json => return to_json(rows),
    }
    // csv and our own writers only ever emit the UTF-8 we handed them
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes `content` to `<out_dir>/<stem>_<YYYYMMDD_HHMMSS>_<kind>.<ext>`.
pub fn save_export(
    content: &str,
    out_dir: &Path,
    stem: &str,
    kind: &str,
    format: ExportFormat,
) -> Result<PathBuf> {
    let local: DateTime<Local> = Local::now();
    let filename = format!(
        "{stem}_{}_{kind}.{}",
        local.format("%Y%m%d_%H%M%S"),
        format.extension()
    );
    let path = out_dir.join(filename);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .map_err(|e| AnalysisError::io("creating export file", e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| AnalysisError::io("writing export file", e))?;

    log::info!("wrote {}", path.display());
    Ok(path)
}
