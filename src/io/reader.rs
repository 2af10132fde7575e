//! Loading source PDFs.
//!
//! This is the document-source side of the engine: it opens files, counts
//! their pages and hands out shared read-only handles that columns and
//! exports reference by [`DocumentId`].
//!
//! # Examples
//!
//! ```no_run
//! use pdfdeck::io::reader::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let (results, stats) = reader.load_all(&paths, 4).await;
//! println!("Loaded {} of {} files", stats.success_count, results.len());
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, Object};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::arrange::DocumentId;
use crate::error::{PdfDeckError, Result};
use crate::utils::{format_file_size, inherited_attribute};

/// A parsed PDF that has not been registered with a workspace yet.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

impl LoadedPdf {
    /// Wrap an in-memory document as if it had been loaded from `path`.
    pub fn from_document(document: Document, path: impl Into<PathBuf>) -> Self {
        let page_count = document.get_pages().len();
        Self {
            document,
            path: path.into(),
            page_count,
            load_time: Duration::ZERO,
            file_size: 0,
        }
    }

    /// File name used as a column title.
    pub fn title(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Turn into a shared handle with identity `id`.
    pub fn into_source(self, id: DocumentId) -> SourceDocument {
        SourceDocument {
            id,
            path: self.path,
            page_count: self.page_count,
            document: Arc::new(self.document),
        }
    }
}

/// Result of a load operation (success or failure).
pub type LoadResult = Result<LoadedPdf>;

/// Statistics for a batch load operation.
#[derive(Debug, Clone, Default)]
pub struct LoadStatistics {
    /// Number of PDFs successfully loaded.
    pub success_count: usize,

    /// Number of PDFs that failed to load.
    pub failure_count: usize,

    /// Total time taken for all loads.
    pub total_time: Duration,

    /// Total size of successfully loaded files.
    pub total_size: u64,

    /// Total number of pages loaded.
    pub total_pages: usize,
}

impl LoadStatistics {
    /// Create statistics from load results.
    pub fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut stats = Self {
            success_count: 0,
            failure_count: 0,
            total_time,
            total_size: 0,
            total_pages: 0,
        };

        for result in results {
            match result {
                Ok(loaded) => {
                    stats.success_count += 1;
                    stats.total_size += loaded.file_size;
                    stats.total_pages += loaded.page_count;
                }
                Err(_) => stats.failure_count += 1,
            }
        }

        stats
    }

    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Shared, read-only handle to a loaded source document.
///
/// Cloning is cheap; every clone points at the same parsed document, so
/// handles can be passed to export tasks on other threads.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    id: DocumentId,
    path: PathBuf,
    page_count: usize,
    document: Arc<Document>,
}

impl SourceDocument {
    /// Document identity.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Path the document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The parsed document.
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// Display information for the page at 0-based `page_index`.
    pub fn page_info(&self, page_index: usize) -> Result<PageInfo> {
        let out_of_range = || PdfDeckError::IndexOutOfRange {
            index: page_index,
            len: self.page_count,
        };
        // lopdf numbers pages from 1 with u32 keys
        let page_number = u32::try_from(page_index)
            .ok()
            .and_then(|index| index.checked_add(1))
            .ok_or_else(out_of_range)?;
        let page_id = self
            .document
            .get_pages()
            .get(&page_number)
            .copied()
            .ok_or_else(out_of_range)?;

        let media_box = inherited_attribute(&self.document, page_id, b"MediaBox")
            .and_then(|object| rect_size(&object));
        let rotation = inherited_attribute(&self.document, page_id, b"Rotate")
            .and_then(|object| object.as_i64().ok())
            .unwrap_or(0);

        let (width, height) = media_box.unwrap_or(US_LETTER);
        Ok(PageInfo {
            width,
            height,
            rotation: rotation.rem_euclid(360) as u16,
        })
    }
}

/// US Letter in points, the fallback when a page has no usable MediaBox.
const US_LETTER: (f32, f32) = (612.0, 792.0);

/// Display data a preview renderer needs for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInfo {
    /// MediaBox width in points.
    pub width: f32,
    /// MediaBox height in points.
    pub height: f32,
    /// Clockwise rotation in degrees (0, 90, 180 or 270).
    pub rotation: u16,
}

fn rect_size(object: &Object) -> Option<(f32, f32)> {
    let values = object.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut coords = [0.0f32; 4];
    for (slot, value) in coords.iter_mut().zip(values) {
        *slot = value.as_float().ok()?;
    }
    Some(((coords[2] - coords[0]).abs(), (coords[3] - coords[1]).abs()))
}

/// PDF reader for source documents.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// - [`PdfDeckError::FileNotFound`] if nothing exists at `path`
    /// - [`PdfDeckError::DocumentOpen`] if the file cannot be read or parsed
    /// - [`PdfDeckError::EncryptedPdf`] if the document is encrypted
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let path_buf = path.to_path_buf();
        let start = Instant::now();

        match tokio::fs::metadata(&path_buf).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(PdfDeckError::document_open(path_buf, "not a file")),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PdfDeckError::file_not_found(path_buf));
            }
            Err(e) => return Err(PdfDeckError::document_open(path_buf, e.to_string())),
        }

        let bytes = tokio::fs::read(&path_buf)
            .await
            .map_err(|e| PdfDeckError::document_open(path_buf.clone(), e.to_string()))?;
        let file_size = bytes.len() as u64;

        // Parsing is CPU-bound
        let document = task::spawn_blocking(move || Document::load_mem(&bytes))
            .await
            .map_err(|e| PdfDeckError::other(format!("Load task failed: {e}")))?
            .map_err(|e| {
                let err_msg = e.to_string();
                if err_msg.contains("encrypt") || err_msg.contains("password") {
                    PdfDeckError::encrypted_pdf(path_buf.clone())
                } else {
                    PdfDeckError::document_open(path_buf.clone(), err_msg)
                }
            })?;

        if document.trailer.has(b"Encrypt") {
            return Err(PdfDeckError::encrypted_pdf(path_buf));
        }

        let mut loaded = LoadedPdf::from_document(document, path_buf);
        loaded.load_time = start.elapsed();
        loaded.file_size = file_size;

        log::info!(
            "loaded {} ({} pages, {}) in {:?}",
            loaded.path.display(),
            loaded.page_count,
            format_file_size(loaded.file_size),
            loaded.load_time
        );

        Ok(loaded)
    }

    /// Load several PDFs with at most `jobs` reads in flight.
    ///
    /// Results come back in the same order as `paths`, one per path.
    pub async fn load_all(
        &self,
        paths: &[PathBuf],
        jobs: usize,
    ) -> (Vec<LoadResult>, LoadStatistics) {
        use futures::stream::{self, StreamExt};

        let start = Instant::now();
        let jobs = jobs.max(1);

        let tasks = paths.iter().map(|path| {
            let reader = self.clone();
            let path = path.clone();
            async move { reader.load(&path).await }
        });

        let results: Vec<LoadResult> = stream::iter(tasks).buffered(jobs).collect().await;

        let stats = LoadStatistics::from_results(&results, start.elapsed());
        (results, stats)
    }
}
