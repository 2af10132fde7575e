//! Writing exported PDFs to disk.
//!
//! Writes are atomic by default: bytes go to a sibling temp file that is
//! renamed over the destination only after a successful flush. Whatever
//! fails, no partial output file is left behind.
//!
//! # Examples
//!
//! ```no_run
//! use pdfdeck::io::writer::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! let stats = writer.write_bytes(bytes, Path::new("output.pdf")).await?;
//! println!("Wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::OverwriteMode;
use crate::error::{PdfDeckError, Result};
use crate::utils::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self {
            options: WriteOptions {
                atomic: false,
                ..Default::default()
            },
        }
    }

    /// Check the destination against an overwrite policy.
    ///
    /// `Prompt` is resolved by the front end before writing, so only
    /// `NoClobber` can refuse here.
    pub fn check_destination(&self, path: &Path, mode: OverwriteMode) -> Result<()> {
        if mode == OverwriteMode::NoClobber && path.exists() {
            return Err(PdfDeckError::OutputExists {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Write `bytes` to `path`.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`PdfDeckError::ExportIo`] if the destination cannot be
    /// created, written or renamed into place. No partial file remains.
    pub async fn write_bytes(&self, bytes: Vec<u8>, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        task::spawn_blocking(move || write_blocking(&bytes, path_buf, &options))
            .await
            .map_err(|e| PdfDeckError::other(format!("Write task failed: {e}")))?
    }
}

fn write_blocking(bytes: &[u8], path: PathBuf, options: &WriteOptions) -> Result<WriteStatistics> {
    let start = Instant::now();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| PdfDeckError::export_io(path.clone(), e))?;
    }

    let write_path = if options.atomic {
        temp_path_for(&path)
    } else {
        path.clone()
    };

    // only clean up entries this write created
    let owns_write_path = options.atomic || write_path.symlink_metadata().is_err();

    if let Err(e) = write_file(bytes, &write_path, options.buffer_size) {
        if owns_write_path {
            let _ = std::fs::remove_file(&write_path);
        }
        return Err(PdfDeckError::export_io(path, e));
    }

    if options.atomic
        && let Err(e) = std::fs::rename(&write_path, &path)
    {
        let _ = std::fs::remove_file(&write_path);
        return Err(PdfDeckError::export_io(path, e));
    }

    let write_time = start.elapsed();
    log::info!(
        "wrote {} ({}) in {:?}",
        path.display(),
        format_file_size(bytes.len() as u64),
        write_time
    );

    Ok(WriteStatistics {
        write_time,
        file_size: bytes.len() as u64,
        output_path: path,
    })
}

fn write_file(bytes: &[u8], path: &Path, buffer_size: usize) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::with_capacity(buffer_size, file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Sibling temp file in the destination's directory, so the final rename
/// never crosses filesystems.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()))
}
