//! Error types for pdfdeck.
//!
//! Every fallible operation in the crate returns [`PdfDeckError`]. The
//! variants fall into four groups:
//!
//! - **Open errors**: a source PDF could not be found, parsed or decrypted.
//! - **Contract violations**: bad indices or ids handed to the engine by a
//!   front end. These never describe a user mistake.
//! - **Export errors**: a source page vanished after load, a page could not
//!   be assembled, or the destination could not be written.
//! - **Configuration and generic I/O errors**.

use std::io;
use std::path::PathBuf;

use crate::arrange::{ColumnId, DocumentId, EntryId};

/// Result type alias for pdfdeck operations.
pub type Result<T> = std::result::Result<T, PdfDeckError>;

/// Main error type for pdfdeck operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfDeckError {
    /// Source file does not exist.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// Source file exists but is not a readable PDF.
    #[error("Failed to open PDF: {}\n  Reason: {reason}", .path.display())]
    DocumentOpen {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Source file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        .path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// An index outside a column's bounds was handed to the engine.
    #[error("Index {index} is out of range for a column of {len} page(s)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the column at the time of the request.
        len: usize,
    },

    /// No column with this id is open.
    #[error("Unknown column: {column}")]
    UnknownColumn {
        /// The missing column id.
        column: ColumnId,
    },

    /// No source document with this id is registered.
    #[error("Unknown source document: {document}")]
    UnknownDocument {
        /// The missing document id.
        document: DocumentId,
    },

    /// The dragged entry no longer exists in its origin column.
    #[error("Page entry {entry} no longer exists in column {column}")]
    EntryNotFound {
        /// The missing entry.
        entry: EntryId,
        /// Column that was searched.
        column: ColumnId,
    },

    /// A drag was started while another one is still active.
    #[error("A drag operation is already in progress")]
    DragInProgress,

    /// A drop was attempted for a drag that is not the active one.
    #[error("No matching drag operation is in progress")]
    NoActiveDrag,

    /// A page referenced by the arrangement no longer exists in its source.
    #[error(
        "Source page index {page_index} of document {document} is missing: {}\n  Reason: {reason}",
        .path.display()
    )]
    SourcePageMissing {
        /// Source document the page belongs to.
        document: DocumentId,
        /// Path the source was loaded from.
        path: PathBuf,
        /// 0-based page index inside the source.
        page_index: usize,
        /// What went wrong while resolving the page.
        reason: String,
    },

    /// Assembling one page of the output failed.
    #[error("Failed to write output page at position {position}\n  Reason: {reason}")]
    PageWriteFailed {
        /// 0-based position of the page in the output.
        position: usize,
        /// Details about the failure.
        reason: String,
    },

    /// Serializing the assembled output failed.
    #[error("Export failed: {reason}")]
    ExportFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Destination could not be written.
    #[error("Failed to write output file: {}\n  Reason: {source}", .path.display())]
    ExportIo {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Choose a different output path or change the overwrite mode",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// The global merge needs at least two open columns.
    #[error("Merging requires at least 2 loaded documents ({columns} open)")]
    ExportDisabled {
        /// Number of currently open columns.
        columns: usize,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfDeckError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PdfDeckError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a DocumentOpen error.
    pub fn document_open(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::DocumentOpen {
            path,
            reason: reason.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create a PageWriteFailed error.
    pub fn page_write_failed(position: usize, reason: impl Into<String>) -> Self {
        Self::PageWriteFailed {
            position,
            reason: reason.into(),
        }
    }

    /// Create an ExportFailed error.
    pub fn export_failed(reason: impl Into<String>) -> Self {
        Self::ExportFailed {
            reason: reason.into(),
        }
    }

    /// Create an ExportIo error.
    pub fn export_io(path: PathBuf, source: io::Error) -> Self {
        Self::ExportIo { path, source }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error means a source document could not be opened.
    pub fn is_document_open_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. } | Self::DocumentOpen { .. } | Self::EncryptedPdf { .. }
        )
    }

    /// Check if this error is a broken engine contract rather than a user-facing failure.
    ///
    /// Front ends should treat these as bugs in how they drive the engine.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. }
                | Self::UnknownColumn { .. }
                | Self::UnknownDocument { .. }
                | Self::EntryNotFound { .. }
                | Self::DragInProgress
                | Self::NoActiveDrag
        )
    }
}
