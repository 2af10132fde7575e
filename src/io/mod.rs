//! I/O operations for pdfdeck.
//!
//! - Loading source PDFs from disk ([`PdfReader`])
//! - Writing exported PDFs to disk ([`PdfWriter`])

pub mod reader;
pub mod writer;

pub use reader::{LoadResult, LoadStatistics, LoadedPdf, PageInfo, PdfReader, SourceDocument};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
