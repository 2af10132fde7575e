//! Exporting arranged pages as a new PDF.
//!
//! An export runs in two phases. Collecting snapshots the page order and
//! resolves every source document, re-reading it from disk when configured
//! to, and checks that each referenced page still exists. Writing assembles
//! and serialises the output and, for the `save_*` calls, commits it to
//! disk. A failure while collecting happens before any output exists.
//!
//! ```text
//! Idle -> Collecting -> Writing -> Done
//!             |            |
//!             +------------+-----> Failed
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use pdfdeck::arrange::Workspace;
//! use pdfdeck::merge::MergeExporter;
//! use std::path::Path;
//!
//! # async fn example(workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
//! let mut exporter = MergeExporter::new();
//! let (report, stats) = exporter
//!     .save_workspace(workspace, Path::new("merged.pdf"))
//!     .await?;
//! println!("{} pages, {}", report.pages, stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::arrange::{ColumnId, DocumentId, PageRef, Workspace};
use crate::config::{CompressionLevel, Config, OverwriteMode};
use crate::error::{PdfDeckError, Result};
use crate::io::{PdfReader, PdfWriter, SourceDocument, WriteOptions, WriteStatistics};
use crate::merge::pages::PageAssembler;
use crate::utils::format_file_size;

/// Phase of the most recent export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    /// No export has run yet.
    #[default]
    Idle,
    /// Resolving sources and checking referenced pages.
    Collecting,
    /// Assembling and writing the output.
    Writing,
    /// The last export succeeded.
    Done,
    /// The last export failed.
    Failed,
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Collecting => "collecting",
            Self::Writing => "writing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a finished export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Number of pages in the output.
    pub pages: usize,

    /// Number of distinct source documents used.
    pub sources: usize,

    /// Size of the serialised output in bytes.
    pub byte_size: u64,

    /// Time spent resolving sources.
    pub collect_time: Duration,

    /// Time spent assembling the output.
    pub write_time: Duration,
}

impl ExportReport {
    /// Format output size as human-readable string.
    pub fn format_byte_size(&self) -> String {
        format_file_size(self.byte_size)
    }
}

/// An exported PDF held in memory.
#[derive(Debug, Clone)]
pub struct ExportedPdf {
    /// The serialised document.
    pub bytes: Vec<u8>,

    /// What went into it.
    pub report: ExportReport,
}

/// Page order and source handles captured before any await point.
struct ExportPlan {
    pages: Vec<PageRef>,
    sources: Vec<SourceDocument>,
}

/// Turns column arrangements into PDF files.
#[derive(Debug, Clone)]
pub struct MergeExporter {
    reader: PdfReader,
    writer: PdfWriter,
    assembler: PageAssembler,
    overwrite_mode: OverwriteMode,
    reload_sources: bool,
    state: ExportState,
    #[cfg(test)]
    history: Vec<ExportState>,
}

impl Default for MergeExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeExporter {
    /// Create an exporter with default settings.
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Create an exporter from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            reader: PdfReader::new(),
            writer: PdfWriter::with_options(WriteOptions {
                atomic: config.atomic_writes,
                ..WriteOptions::default()
            }),
            assembler: PageAssembler::new(config.compression),
            overwrite_mode: config.overwrite_mode,
            reload_sources: config.reload_sources,
            state: ExportState::Idle,
            #[cfg(test)]
            history: Vec::new(),
        }
    }

    /// Use `compression` for subsequent exports.
    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.assembler = PageAssembler::new(compression);
        self
    }

    /// Phase of the current or most recent export.
    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Export the pages of one column, in column order.
    pub async fn export_column(
        &mut self,
        workspace: &Workspace,
        column: ColumnId,
    ) -> Result<ExportedPdf> {
        let pages = workspace.column(column)?.page_refs().collect();
        let plan = snapshot(workspace, pages);
        let exported = self.assemble(plan).await?;
        self.transition(ExportState::Done);
        Ok(exported)
    }

    /// Export every column concatenated in workspace column order.
    ///
    /// The result depends only on the current column order and each
    /// column's page order.
    pub async fn export_workspace(&mut self, workspace: &Workspace) -> Result<ExportedPdf> {
        let plan = snapshot(workspace, workspace.merged_page_refs());
        let exported = self.assemble(plan).await?;
        self.transition(ExportState::Done);
        Ok(exported)
    }

    /// Export one column and write it to `path`.
    ///
    /// # Errors
    ///
    /// Everything [`export_column`](Self::export_column) reports, plus
    /// [`PdfDeckError::OutputExists`] under `NoClobber` and
    /// [`PdfDeckError::ExportIo`] if `path` cannot be written. No partial
    /// file is left behind in either case.
    pub async fn save_column(
        &mut self,
        workspace: &Workspace,
        column: ColumnId,
        path: &Path,
    ) -> Result<(ExportReport, WriteStatistics)> {
        self.writer.check_destination(path, self.overwrite_mode)?;
        let pages = workspace.column(column)?.page_refs().collect();
        let exported = self.assemble(snapshot(workspace, pages)).await?;
        self.commit(exported, path).await
    }

    /// Export the whole workspace and write it to `path`.
    pub async fn save_workspace(
        &mut self,
        workspace: &Workspace,
        path: &Path,
    ) -> Result<(ExportReport, WriteStatistics)> {
        self.writer.check_destination(path, self.overwrite_mode)?;
        let plan = snapshot(workspace, workspace.merged_page_refs());
        let exported = self.assemble(plan).await?;
        self.commit(exported, path).await
    }

    /// Collect and assemble `plan`, leaving the exporter in `Writing`.
    async fn assemble(&mut self, plan: ExportPlan) -> Result<ExportedPdf> {
        self.transition(ExportState::Collecting);
        let collect_start = Instant::now();
        let sources = match self.collect(&plan).await {
            Ok(sources) => sources,
            Err(e) => return Err(self.fail(e)),
        };
        let collect_time = collect_start.elapsed();

        self.transition(ExportState::Writing);
        let write_start = Instant::now();
        let source_count = sources.len();
        let assembler = self.assembler.clone();
        let pages = plan.pages;
        let page_count = pages.len();

        let assembled = task::spawn_blocking(move || assembler.assemble_to_bytes(&pages, &sources))
            .await
            .map_err(|e| PdfDeckError::export_failed(format!("Export task failed: {e}")))
            .and_then(|result| result);
        let bytes = match assembled {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(e)),
        };

        let report = ExportReport {
            pages: page_count,
            sources: source_count,
            byte_size: bytes.len() as u64,
            collect_time,
            write_time: write_start.elapsed(),
        };
        log::info!(
            "exported {} page(s) from {} source(s), {}",
            report.pages,
            report.sources,
            report.format_byte_size()
        );

        Ok(ExportedPdf { bytes, report })
    }

    /// Resolve every source of `plan` and check its referenced pages.
    async fn collect(&self, plan: &ExportPlan) -> Result<HashMap<DocumentId, Arc<Document>>> {
        let mut resolved = HashMap::with_capacity(plan.sources.len());

        for source in &plan.sources {
            let first_page = plan
                .pages
                .iter()
                .find(|page| page.document == source.id())
                .map_or(0, |page| page.page_index);

            let (document, page_count) = if self.reload_sources {
                let loaded = self.reader.load(source.path()).await.map_err(|e| {
                    missing_page(source.id(), source.path(), first_page, e.to_string())
                })?;
                (Arc::new(loaded.document), loaded.page_count)
            } else {
                (Arc::clone(source.document()), source.page_count())
            };

            if let Some(page) = plan
                .pages
                .iter()
                .find(|page| page.document == source.id() && page.page_index >= page_count)
            {
                return Err(missing_page(
                    source.id(),
                    source.path(),
                    page.page_index,
                    format!("source now has {page_count} page(s)"),
                ));
            }

            resolved.insert(source.id(), document);
        }

        if let Some(page) = plan
            .pages
            .iter()
            .find(|page| !resolved.contains_key(&page.document))
        {
            return Err(missing_page(
                page.document,
                Path::new(""),
                page.page_index,
                "source document is not loaded".to_string(),
            ));
        }

        Ok(resolved)
    }

    async fn commit(
        &mut self,
        exported: ExportedPdf,
        path: &Path,
    ) -> Result<(ExportReport, WriteStatistics)> {
        match self.writer.write_bytes(exported.bytes, path).await {
            Ok(stats) => {
                self.transition(ExportState::Done);
                Ok((exported.report, stats))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, error: PdfDeckError) -> PdfDeckError {
        log::warn!("export failed while {}: {error}", self.state);
        self.transition(ExportState::Failed);
        error
    }

    fn transition(&mut self, next: ExportState) {
        log::debug!("export state {} -> {}", self.state, next);
        self.state = next;
        #[cfg(test)]
        self.history.push(next);
    }
}

/// Capture `pages` and the sources they reference from `workspace`.
fn snapshot(workspace: &Workspace, pages: Vec<PageRef>) -> ExportPlan {
    let mut sources: Vec<SourceDocument> = Vec::new();
    for page in &pages {
        if sources.iter().any(|source| source.id() == page.document) {
            continue;
        }
        if let Some(source) = workspace.sources().get(page.document) {
            sources.push(source.clone());
        }
    }
    ExportPlan { pages, sources }
}

fn missing_page(
    document: DocumentId,
    path: &Path,
    page_index: usize,
    reason: String,
) -> PdfDeckError {
    PdfDeckError::SourcePageMissing {
        document,
        path: PathBuf::from(path),
        page_index,
        reason,
    }
}
