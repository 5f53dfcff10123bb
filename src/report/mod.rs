//! Report building: chart rendering and PDF layout.

pub mod chart;
pub mod document;
mod glyphs;
pub mod metrics;

pub use chart::{plan_chart, render_chart, ChartImage, ChartLine, ChartPlan};
pub use document::{
    build_document, build_document_dated, layout_document, ChartPlacement, DocumentLayout,
    Element, PageLayout, TableCell, TextRun,
};
pub use metrics::FontStyle;

use std::fs;
use std::path::{Path, PathBuf};

use time::Date;

use crate::config;
use crate::error::Result;
use crate::models::{InterestSeries, ReportMetadata};

/// A finished, downloadable report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Report {
    /// Build the PDF for `series` and name it after the metadata keywords.
    pub fn build(
        series: &InterestSeries,
        metadata: &ReportMetadata,
        chart: &ChartImage,
        export_date: Date,
    ) -> Result<Self> {
        let bytes = build_document_dated(series, metadata, chart, export_date)?;
        Ok(Self {
            file_name: report_file_name(&metadata.keywords),
            mime: config::REPORT_MIME,
            bytes,
        })
    }

    /// Write the report into `dir` (created if needed) and return the file path.
    ///
    /// Writes to a temp file first and renames on success, so a failed write
    /// never leaves a truncated PDF behind.
    pub fn save_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let dest = dir.join(&self.file_name);
        let tmp_dest = dest.with_extension("pdf.tmp");

        let result = fs::write(&tmp_dest, &self.bytes).and_then(|_| fs::rename(&tmp_dest, &dest));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_dest);
            return Err(e.into());
        }
        log::info!("Report saved to {}", dest.display());
        Ok(dest)
    }
}

/// `{keywords}_trend.pdf`, keywords joined by `_`, with characters that are
/// unsafe in file names replaced by `-`.
pub fn report_file_name(keywords: &[String]) -> String {
    let stem: String = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() { "report".to_string() } else { stem };
    format!("{stem}_trend.pdf")
}
